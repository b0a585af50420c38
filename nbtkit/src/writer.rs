//! Streaming, push-style writing of NBT data to any [`Write`] sink.

use std::convert::TryFrom;
use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::{Error, Result};
use crate::TagKind;

#[derive(Clone, Copy)]
enum Ctx {
    Root,
    Compound,
    List { remaining: usize },
}

struct Frame {
    ctx: Ctx,
    /// For list frames: the pinned element kind once the header is out.
    /// Elsewhere: the kind of the value currently being written.
    current: Option<TagKind>,
}

impl Frame {
    fn new(ctx: Ctx) -> Self {
        Frame { ctx, current: None }
    }
}

/// A push-style writer for the raw NBT wire format.
///
/// Inside a compound every value needs a [`name`](Self::name) first; inside
/// a list values are unnamed and must all share the list's element kind. At
/// the root the name defaults to the empty string, which is what a
/// conventional NBT file carries.
///
/// ```
/// use nbtkit::NbtWriter;
///
/// let mut out = Vec::new();
/// let mut writer = NbtWriter::new(&mut out);
/// writer.begin_compound().unwrap();
/// writer.name("score").unwrap().value_i32(17).unwrap();
/// writer.end_compound().unwrap();
/// writer.finish().unwrap();
/// ```
pub struct NbtWriter<W: Write> {
    out: W,
    stack: Vec<Frame>,
    next_name: Option<String>,
    /// Set by `begin_list`; the header goes out with the first value.
    pending_list: Option<usize>,
}

impl<W: Write> NbtWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            out: sink,
            stack: vec![Frame::new(Ctx::Root)],
            next_name: None,
            pending_list: None,
        }
    }

    /// Set the name for the next value. Chainable:
    /// `writer.name("x")?.value_i32(1)?`.
    pub fn name(&mut self, name: &str) -> Result<&mut Self> {
        if let Some(prev) = &self.next_name {
            return Err(Error::NameOutOfPlace(format!(
                "a name is already set: '{prev}'"
            )));
        }
        self.next_name = Some(name.to_owned());
        Ok(self)
    }

    pub fn begin_compound(&mut self) -> Result<()> {
        self.tag(TagKind::Compound)?;
        self.stack.push(Frame::new(Ctx::Compound));
        Ok(())
    }

    /// Writes the End tag and closes the current compound.
    pub fn end_compound(&mut self) -> Result<()> {
        if !self.in_compound() {
            return Err(Error::ContextMismatch("not in a compound".to_owned()));
        }
        self.stack.pop();
        self.tag(TagKind::End)?;
        self.after_value()
    }

    /// Open a list of `len` elements. The list header is written together
    /// with the first value, whose kind becomes the element kind.
    ///
    /// An empty list has no first value to take the kind from, so zero
    /// lengths must go through [`begin_list_of`](Self::begin_list_of).
    pub fn begin_list(&mut self, len: usize) -> Result<()> {
        if len == 0 {
            return Err(Error::ContextMismatch(
                "an empty list needs an explicit element kind, use begin_list_of".to_owned(),
            ));
        }
        self.tag(TagKind::List)?;
        self.stack.push(Frame::new(Ctx::List { remaining: len }));
        self.pending_list = Some(len);
        Ok(())
    }

    /// Open a list of `len` elements of a known kind. The header is
    /// written immediately.
    pub fn begin_list_of(&mut self, element_kind: TagKind, len: usize) -> Result<()> {
        if element_kind == TagKind::End && len > 0 {
            return Err(Error::ContextMismatch(
                "a non-empty list can not have element kind End".to_owned(),
            ));
        }
        self.tag(TagKind::List)?;
        self.out.write_u8(element_kind.into())?;
        self.out.write_i32::<BigEndian>(list_len(len)?)?;
        let mut frame = Frame::new(Ctx::List { remaining: len });
        frame.current = Some(element_kind);
        self.stack.push(frame);
        Ok(())
    }

    /// Close the current list. Lists are length-prefixed so nothing is
    /// written, but the list must have received exactly the declared
    /// number of values.
    pub fn end_list(&mut self) -> Result<()> {
        if !self.in_list() {
            return Err(Error::ContextMismatch("not in a list".to_owned()));
        }
        if self.pending_list.is_some() {
            return Err(Error::ContextMismatch(
                "list closed before any of its declared values were written".to_owned(),
            ));
        }
        if let Ctx::List { remaining } = self.top().ctx {
            if remaining > 0 {
                return Err(Error::ContextMismatch(format!(
                    "list closed with {remaining} of its declared values missing"
                )));
            }
        }
        self.stack.pop();
        self.after_value()
    }

    pub fn value_i8(&mut self, value: i8) -> Result<()> {
        self.tag(TagKind::Byte)?;
        self.out.write_i8(value)?;
        self.after_value()
    }

    pub fn value_i16(&mut self, value: i16) -> Result<()> {
        self.tag(TagKind::Short)?;
        self.out.write_i16::<BigEndian>(value)?;
        self.after_value()
    }

    pub fn value_i32(&mut self, value: i32) -> Result<()> {
        self.tag(TagKind::Int)?;
        self.out.write_i32::<BigEndian>(value)?;
        self.after_value()
    }

    pub fn value_i64(&mut self, value: i64) -> Result<()> {
        self.tag(TagKind::Long)?;
        self.out.write_i64::<BigEndian>(value)?;
        self.after_value()
    }

    pub fn value_f32(&mut self, value: f32) -> Result<()> {
        self.tag(TagKind::Float)?;
        self.out.write_f32::<BigEndian>(value)?;
        self.after_value()
    }

    pub fn value_f64(&mut self, value: f64) -> Result<()> {
        self.tag(TagKind::Double)?;
        self.out.write_f64::<BigEndian>(value)?;
        self.after_value()
    }

    pub fn value_str(&mut self, value: &str) -> Result<()> {
        self.tag(TagKind::String)?;
        self.write_string(value)?;
        self.after_value()
    }

    pub fn value_byte_array(&mut self, value: &[i8]) -> Result<()> {
        self.tag(TagKind::ByteArray)?;
        self.out.write_i32::<BigEndian>(list_len(value.len())?)?;
        for b in value {
            self.out.write_i8(*b)?;
        }
        self.after_value()
    }

    pub fn value_int_array(&mut self, value: &[i32]) -> Result<()> {
        self.tag(TagKind::IntArray)?;
        self.out.write_i32::<BigEndian>(list_len(value.len())?)?;
        for v in value {
            self.out.write_i32::<BigEndian>(*v)?;
        }
        self.after_value()
    }

    pub fn value_long_array(&mut self, value: &[i64]) -> Result<()> {
        self.tag(TagKind::LongArray)?;
        self.out.write_i32::<BigEndian>(list_len(value.len())?)?;
        for v in value {
            self.out.write_i64::<BigEndian>(*v)?;
        }
        self.after_value()
    }

    pub fn in_compound(&self) -> bool {
        matches!(self.top().ctx, Ctx::Compound)
    }

    pub fn in_list(&self) -> bool {
        matches!(self.top().ctx, Ctx::List { .. })
    }

    /// Flush and hand back the sink. Fails with
    /// [`IncompleteDocument`](Error::IncompleteDocument) if any compound or
    /// list is still open.
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        let open = self.stack.len() - 1;
        if open > 0 {
            return Err(Error::IncompleteDocument(open));
        }
        Ok(self.out)
    }

    fn top(&self) -> &Frame {
        self.stack.last().expect("frame stack never empties")
    }

    fn top_mut(&mut self) -> &mut Frame {
        self.stack.last_mut().expect("frame stack never empties")
    }

    /// Write the header for a value of `kind` at the current position:
    /// kind byte plus name in compounds, nothing inside a list beyond the
    /// first value, the deferred list header when one is pending.
    fn tag(&mut self, kind: TagKind) -> Result<()> {
        if self.pending_list.is_some() {
            // first value of a deferred list pins the element kind
            if self.next_name.is_some() {
                return Err(Error::NameOutOfPlace(
                    "values inside a list are unnamed".to_owned(),
                ));
            }
            let len = self.pending_list.take().unwrap();
            self.out.write_u8(kind.into())?;
            self.out.write_i32::<BigEndian>(list_len(len)?)?;
            self.top_mut().current = Some(kind);
            return Ok(());
        }

        if kind != TagKind::End {
            if let Ctx::List { remaining } = self.top().ctx {
                if remaining == 0 {
                    return Err(Error::ContextMismatch(
                        "list already has its declared number of values".to_owned(),
                    ));
                }
            }
            if let Some(pinned) = self.top().current {
                if pinned != kind {
                    return Err(Error::ContextMismatch(format!(
                        "wrong kind for this list: expected {pinned} but got {kind}"
                    )));
                }
                if self.next_name.is_some() {
                    return Err(Error::NameOutOfPlace(
                        "values inside a list are unnamed".to_owned(),
                    ));
                }
                return Ok(());
            }
        }

        // a list's pinned element kind survives the End of a nested
        // compound element; elsewhere `current` tracks the value in progress
        if !self.in_list() {
            self.top_mut().current = Some(kind);
        }
        self.out.write_u8(kind.into())?;

        if kind != TagKind::End && !self.in_list() {
            let name = match self.next_name.take() {
                Some(name) => name,
                // the root value's name defaults to the empty string
                None if self.stack.len() == 1 => String::new(),
                None => {
                    return Err(Error::NameOutOfPlace(
                        "a value in a compound needs a name, call name() first".to_owned(),
                    ))
                }
            };
            self.write_string(&name)?;
        } else if self.next_name.is_some() {
            return Err(Error::NameOutOfPlace(
                "a name is set but this position does not take one".to_owned(),
            ));
        }
        Ok(())
    }

    fn after_value(&mut self) -> Result<()> {
        let top = self.top_mut();
        match &mut top.ctx {
            Ctx::List { remaining } => {
                *remaining = remaining.saturating_sub(1);
            }
            _ => top.current = None,
        }
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        let encoded = cesu8::to_java_cesu8(value);
        let len = u16::try_from(encoded.len())
            .map_err(|_| Error::corrupt("string longer than 65535 encoded bytes"))?;
        self.out.write_u16::<BigEndian>(len)?;
        self.out.write_all(&encoded)?;
        Ok(())
    }
}

fn list_len(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| Error::corrupt("length does not fit in an i32"))
}
