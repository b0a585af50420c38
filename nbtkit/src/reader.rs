//! Streaming, pull-style reading of NBT data from any [`Read`] source.
//!
//! [`NbtReader`] tracks the stack of open compounds and lists and checks
//! every operation against it, so malformed documents and misuse both fail
//! with a precise error instead of producing garbage. It does not do
//! decompression; wrap the source in e.g. a `GzDecoder` first.

use std::convert::TryFrom;
use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{Error, Result};
use crate::input::LogInput;
use crate::TagKind;

/// Returned by [`NbtReader::name`] where the current element has no name:
/// inside lists, and on End tags.
pub const UNKNOWN_NAME: &str = "<unknown>";

#[derive(Clone, Copy)]
enum Ctx {
    Root,
    Compound,
    List { remaining: i32, len: i32 },
}

struct Frame {
    ctx: Ctx,
    /// Kind of the current element, resolved lazily by `peek`.
    kind: Option<TagKind>,
    /// Name of the current element, resolved at most once.
    name: Option<String>,
}

impl Frame {
    fn new(ctx: Ctx) -> Self {
        Frame {
            ctx,
            kind: None,
            name: None,
        }
    }
}

/// A pull-style reader over the raw NBT wire format.
///
/// The reader starts positioned at the root element; `peek` lazily reads
/// the root's kind and `name` its name. Values must be consumed with the
/// read method matching their kind, or passed over with [`skip`](Self::skip).
pub struct NbtReader<R: Read> {
    input: LogInput<R>,
    stack: Vec<Frame>,
}

impl<R: Read> NbtReader<R> {
    /// Create a reader over `source`. Works for byte slices too:
    /// `NbtReader::new(&bytes[..])`.
    pub fn new(source: R) -> Self {
        Self {
            input: LogInput::new(source),
            stack: vec![Frame::new(Ctx::Root)],
        }
    }

    /// Consume the reader, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.input.into_inner()
    }

    /// The kind of the current element. Inside a compound this reads (and
    /// remembers) the kind byte; inside a list no bytes are consumed.
    pub fn peek(&mut self) -> Result<TagKind> {
        if let Some(kind) = self.top().kind {
            return Ok(kind);
        }
        let kind = self.read_kind()?;
        self.top_mut().kind = Some(kind);
        Ok(kind)
    }

    /// The name of the current element. Valid between `peek` and the value
    /// read. Inside a list, and on End tags, returns [`UNKNOWN_NAME`].
    pub fn name(&mut self) -> Result<&str> {
        if self.top().name.is_none() {
            let name = if self.peek()? != TagKind::End {
                self.read_string()?
            } else {
                UNKNOWN_NAME.to_owned()
            };
            self.top_mut().name = Some(name);
        }
        Ok(self.top().name.as_deref().unwrap_or(UNKNOWN_NAME))
    }

    /// Whether the current compound or list has more elements.
    pub fn has_next(&mut self) -> Result<bool> {
        Ok(self.peek()? != TagKind::End)
    }

    /// Enter the compound at the current position.
    pub fn begin_compound(&mut self) -> Result<()> {
        self.check_state(Some(TagKind::Compound))?;
        self.stack.push(Frame::new(Ctx::Compound));
        Ok(())
    }

    /// Leave the current compound. The current element must be its End tag.
    pub fn end_compound(&mut self) -> Result<()> {
        self.check_state(Some(TagKind::End))?;
        if !self.in_compound() {
            return Err(Error::ContextMismatch(format!(
                "can not end compound, current element is not in a compound, at: {}",
                self.path()
            )));
        }
        self.stack.pop();
        self.advance();
        Ok(())
    }

    /// Enter the list at the current position, returning its length.
    ///
    /// An empty list reads as element kind End no matter what kind its
    /// header declares.
    pub fn begin_list(&mut self) -> Result<usize> {
        self.check_state(Some(TagKind::List))?;
        let element_kind = self.read_kind()?;
        let len = self.input.read_i32::<BigEndian>()?;
        if len < 0 {
            return Err(Error::NegativeLength(len));
        }
        if element_kind == TagKind::End && len > 0 {
            return Err(Error::corrupt(format!(
                "list of {} end tags at: {}",
                len,
                self.path()
            )));
        }

        let mut frame = Frame::new(Ctx::List {
            remaining: len,
            len,
        });
        frame.kind = Some(if len == 0 { TagKind::End } else { element_kind });
        frame.name = Some(UNKNOWN_NAME.to_owned());
        self.stack.push(frame);
        Ok(len as usize)
    }

    /// Leave the current list. All elements must have been consumed.
    pub fn end_list(&mut self) -> Result<()> {
        self.check_state(Some(TagKind::End))?;
        if !self.in_list() {
            return Err(Error::ContextMismatch(format!(
                "can not end list, current element is not in a list, at: {}",
                self.path()
            )));
        }
        self.stack.pop();
        self.advance();
        Ok(())
    }

    pub fn next_i8(&mut self) -> Result<i8> {
        self.check_state(Some(TagKind::Byte))?;
        self.advance();
        Ok(self.input.read_i8()?)
    }

    pub fn next_i16(&mut self) -> Result<i16> {
        self.check_state(Some(TagKind::Short))?;
        self.advance();
        Ok(self.input.read_i16::<BigEndian>()?)
    }

    pub fn next_i32(&mut self) -> Result<i32> {
        self.check_state(Some(TagKind::Int))?;
        self.advance();
        Ok(self.input.read_i32::<BigEndian>()?)
    }

    pub fn next_i64(&mut self) -> Result<i64> {
        self.check_state(Some(TagKind::Long))?;
        self.advance();
        Ok(self.input.read_i64::<BigEndian>()?)
    }

    pub fn next_f32(&mut self) -> Result<f32> {
        self.check_state(Some(TagKind::Float))?;
        self.advance();
        Ok(self.input.read_f32::<BigEndian>()?)
    }

    pub fn next_f64(&mut self) -> Result<f64> {
        self.check_state(Some(TagKind::Double))?;
        self.advance();
        Ok(self.input.read_f64::<BigEndian>()?)
    }

    pub fn next_string(&mut self) -> Result<String> {
        self.check_state(Some(TagKind::String))?;
        self.advance();
        self.read_string()
    }

    pub fn next_byte_array(&mut self) -> Result<Vec<i8>> {
        self.check_state(Some(TagKind::ByteArray))?;
        self.advance();
        let len = self.read_len()?;
        let mut buf = vec![0u8; len];
        self.input.read_exact(&mut buf)?;
        Ok(buf.into_iter().map(|b| b as i8).collect())
    }

    pub fn next_int_array(&mut self) -> Result<Vec<i32>> {
        self.check_state(Some(TagKind::IntArray))?;
        self.advance();
        let len = self.read_len()?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..len {
            data.push(self.input.read_i32::<BigEndian>()?);
        }
        Ok(data)
    }

    pub fn next_long_array(&mut self) -> Result<Vec<i64>> {
        self.check_state(Some(TagKind::LongArray))?;
        self.advance();
        let len = self.read_len()?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..len {
            data.push(self.input.read_i64::<BigEndian>()?);
        }
        Ok(data)
    }

    /// Read any of the three array kinds as a byte array, casting elements.
    pub fn next_array_as_i8(&mut self) -> Result<Vec<i8>> {
        match self.peek()? {
            TagKind::ByteArray => self.next_byte_array(),
            TagKind::IntArray => Ok(self.next_int_array()?.into_iter().map(|v| v as i8).collect()),
            TagKind::LongArray => Ok(self.next_long_array()?.into_iter().map(|v| v as i8).collect()),
            found => Err(self.unexpected(TagKind::ByteArray, found)),
        }
    }

    /// Read any of the three array kinds as an int array, casting elements.
    pub fn next_array_as_i32(&mut self) -> Result<Vec<i32>> {
        match self.peek()? {
            TagKind::ByteArray => Ok(self.next_byte_array()?.into_iter().map(i32::from).collect()),
            TagKind::IntArray => self.next_int_array(),
            TagKind::LongArray => Ok(self.next_long_array()?.into_iter().map(|v| v as i32).collect()),
            found => Err(self.unexpected(TagKind::IntArray, found)),
        }
    }

    /// Read any of the three array kinds as a long array, casting elements.
    pub fn next_array_as_i64(&mut self) -> Result<Vec<i64>> {
        match self.peek()? {
            TagKind::ByteArray => Ok(self.next_byte_array()?.into_iter().map(i64::from).collect()),
            TagKind::IntArray => Ok(self.next_int_array()?.into_iter().map(i64::from).collect()),
            TagKind::LongArray => self.next_long_array(),
            found => Err(self.unexpected(TagKind::LongArray, found)),
        }
    }

    /// Skip over the current element, whatever it is.
    pub fn skip(&mut self) -> Result<()> {
        self.skip_out(0)
    }

    /// Skip over the current element, then additionally skip out of `out`
    /// enclosing compounds or lists, consuming their End.
    pub fn skip_out(&mut self, out: usize) -> Result<()> {
        let mut out = out as i64;
        if out == 0 && self.peek()? == TagKind::End {
            return Err(Error::ContextMismatch(format!(
                "can not skip an end tag at: {}",
                self.path()
            )));
        }

        loop {
            let kind = self.peek()?;
            match kind {
                TagKind::End => {
                    if self.in_list() {
                        self.end_list()?;
                    } else if self.in_compound() {
                        self.end_compound()?;
                    } else {
                        return Err(Error::ContextMismatch(
                            "can not skip out of the root".to_owned(),
                        ));
                    }
                    out -= 1;
                }

                TagKind::Byte
                | TagKind::Short
                | TagKind::Int
                | TagKind::Long
                | TagKind::Float
                | TagKind::Double => {
                    self.check_state(None)?;
                    self.input
                        .skip_bytes(kind.payload_size().unwrap() as u64)?;
                    self.advance();
                }

                TagKind::String => {
                    self.check_state(None)?;
                    self.skip_string()?;
                    self.advance();
                }

                TagKind::ByteArray => {
                    self.check_state(None)?;
                    let len = self.read_len()?;
                    self.input.skip_bytes(len as u64)?;
                    self.advance();
                }

                TagKind::IntArray => {
                    self.check_state(None)?;
                    let len = self.read_len()?;
                    self.input.skip_bytes(len as u64 * 4)?;
                    self.advance();
                }

                TagKind::LongArray => {
                    self.check_state(None)?;
                    let len = self.read_len()?;
                    self.input.skip_bytes(len as u64 * 8)?;
                    self.advance();
                }

                TagKind::Compound => {
                    self.begin_compound()?;
                    out += 1;
                }

                TagKind::List => {
                    let len = self.begin_list()?;
                    let element_kind = self.peek()?;
                    out += 1;

                    // lists of fixed-size scalars skip in one step
                    if let Some(size) = element_kind.payload_size() {
                        self.input.skip_bytes((size * len) as u64)?;
                        let top = self.top_mut();
                        if let Ctx::List { remaining, .. } = &mut top.ctx {
                            *remaining = 0;
                        }
                        top.kind = Some(TagKind::End);
                    }
                }
            }

            if out <= 0 {
                return Ok(());
            }
        }
    }

    /// Return the current element as raw NBT bytes, consuming it.
    ///
    /// The result is a complete named tag (kind byte, name, payload) that a
    /// fresh reader can parse on its own. The kind byte and name were
    /// already consumed from the stream, so they are reconstructed from the
    /// parsed state; for list elements and other nameless positions the
    /// name is the empty string.
    pub fn capture_raw(&mut self) -> Result<Vec<u8>> {
        let kind = self.peek()?;
        if kind == TagKind::End {
            return Err(Error::ContextMismatch(format!(
                "can not capture an end tag at: {}",
                self.path()
            )));
        }

        // resolve the real name before it gets skipped
        if self.top().name.is_none() {
            self.name()?;
        }
        let name = match self.top().name.as_deref() {
            None | Some(UNKNOWN_NAME) => String::new(),
            Some(n) => n.to_owned(),
        };

        let mut header = vec![u8::from(kind)];
        let encoded = cesu8::to_java_cesu8(&name);
        header.extend_from_slice(&(encoded.len() as u16).to_be_bytes());
        header.extend_from_slice(&encoded);

        self.input.start_log();
        self.input.log_raw(&header);
        self.skip()?;
        Ok(self.input.stop_log())
    }

    /// Number of elements left in the current list, 0 elsewhere.
    pub fn remaining_list_items(&self) -> usize {
        match self.top().ctx {
            Ctx::List { remaining, .. } => remaining.max(0) as usize,
            _ => 0,
        }
    }

    /// Whether the current element sits directly in a compound.
    pub fn in_compound(&self) -> bool {
        matches!(self.top().ctx, Ctx::Compound)
    }

    /// Whether the current element sits directly in a list.
    pub fn in_list(&self) -> bool {
        matches!(self.top().ctx, Ctx::List { .. })
    }

    /// A dotted path to the current element for diagnostics, e.g.
    /// `Data.Player.Inventory[3].id`. List positions show the element
    /// index; names that have not been read yet show as `?`.
    pub fn path(&self) -> String {
        let mut out = String::new();
        for (i, frame) in self.stack.iter().enumerate().skip(1) {
            match frame.ctx {
                Ctx::List { remaining, len } => {
                    out.push('[');
                    out.push_str(&(len - remaining).to_string());
                    out.push(']');
                }
                _ => {
                    if i > 1 {
                        out.push('.');
                    }
                    out.push_str(frame.name.as_deref().unwrap_or("?"));
                }
            }
        }
        out
    }

    fn top(&self) -> &Frame {
        self.stack.last().expect("frame stack never empties")
    }

    fn top_mut(&mut self) -> &mut Frame {
        self.stack.last_mut().expect("frame stack never empties")
    }

    /// Verify the current kind and make sure the stream is positioned at
    /// the payload, skipping the name if nobody asked for it.
    fn check_state(&mut self, expected: Option<TagKind>) -> Result<()> {
        let kind = self.peek()?;
        if let Some(expected) = expected {
            if kind != expected {
                return Err(self.unexpected(expected, kind));
            }
        }
        if self.top().name.is_none() {
            self.top_mut().name = Some(UNKNOWN_NAME.to_owned());
            if kind != TagKind::End {
                self.skip_string()?;
            }
        }
        Ok(())
    }

    /// Move past the current element: in a list, count it down; in a
    /// compound (or the root), forget its kind and name.
    fn advance(&mut self) {
        let top = self.top_mut();
        match &mut top.ctx {
            Ctx::List { remaining, .. } => {
                *remaining -= 1;
                if *remaining == 0 {
                    top.kind = Some(TagKind::End);
                }
            }
            _ => {
                top.kind = None;
                top.name = None;
            }
        }
    }

    fn unexpected(&self, expected: TagKind, found: TagKind) -> Error {
        Error::UnexpectedKind {
            expected,
            found,
            path: self.path(),
        }
    }

    fn read_kind(&mut self) -> Result<TagKind> {
        let id = self.input.read_u8()?;
        TagKind::try_from(id).map_err(|_| Error::InvalidTagId(id))
    }

    fn read_len(&mut self) -> Result<usize> {
        let len = self.input.read_i32::<BigEndian>()?;
        if len < 0 {
            return Err(Error::NegativeLength(len));
        }
        Ok(len as usize)
    }

    fn read_string(&mut self) -> Result<String> {
        let len = self.input.read_u16::<BigEndian>()? as usize;
        let mut buf = vec![0; len];
        self.input.read_exact(&mut buf)?;
        Ok(cesu8::from_java_cesu8(&buf)
            .map_err(|_| Error::InvalidUtf8)?
            .into_owned())
    }

    fn skip_string(&mut self) -> Result<()> {
        let len = self.input.read_u16::<BigEndian>()?;
        self.input.skip_bytes(len as u64)?;
        Ok(())
    }
}
