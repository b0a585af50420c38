//! Field-name to NBT-name conversion strategies.

/// How the reflective structure adapter derives an NBT name from a field
/// name when the field carries no explicit rename.
///
/// The strategy is applied when an adapter is built; changing it afterwards
/// does not affect adapters the engine has already constructed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum NamingStrategy {
    /// Use the field name as-is: `foo_bar -> foo_bar`, `fooBar -> fooBar`.
    #[default]
    FieldName,
    /// `fooBar -> foobar`
    LowerCase,
    /// `fooBar -> FOOBAR`
    UpperCase,
    /// `fooBar -> FooBar`, `_fooBar -> _FooBar`
    UpperCamelCase,
    /// `fooBar -> foo-bar` for delimiter `-`
    LowerCaseWithDelimiter(String),
    /// `fooBar -> FOO-BAR` for delimiter `-`
    UpperCaseWithDelimiter(String),
}

impl NamingStrategy {
    pub fn apply(&self, field_name: &str) -> String {
        match self {
            NamingStrategy::FieldName => field_name.to_owned(),
            NamingStrategy::LowerCase => field_name.to_lowercase(),
            NamingStrategy::UpperCase => field_name.to_uppercase(),
            NamingStrategy::UpperCamelCase => {
                transform_first_letter(field_name, |c| c.to_uppercase().collect())
            }
            NamingStrategy::LowerCaseWithDelimiter(delimiter) => {
                split_camel_case(field_name).join(delimiter).to_lowercase()
            }
            NamingStrategy::UpperCaseWithDelimiter(delimiter) => {
                split_camel_case(field_name).join(delimiter).to_uppercase()
            }
        }
    }
}

/// Split a camelCase name into its words: `fooBar -> [foo, Bar]`,
/// `FooBAR -> [Foo, B, A, R]`.
fn split_camel_case(input: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    for (i, c) in input.char_indices().skip(1) {
        if c.is_uppercase() {
            words.push(&input[start..i]);
            start = i;
        }
    }
    words.push(&input[start..]);
    words
}

/// Replace the first letter (not merely the first character) of `input`
/// using `op`.
fn transform_first_letter(input: &str, op: impl Fn(char) -> String) -> String {
    for (i, c) in input.char_indices() {
        if !c.is_alphabetic() {
            continue;
        }
        let mut out = String::with_capacity(input.len());
        out.push_str(&input[..i]);
        out.push_str(&op(c));
        out.push_str(&input[i + c.len_utf8()..]);
        return out;
    }
    input.to_owned()
}

/// The default transformer applied to incoming NBT names before field
/// lookup: lower-case the first letter, so `Difficulty` finds a field
/// named `difficulty`.
pub(crate) fn lower_first(name: &str) -> String {
    transform_first_letter(name, |c| c.to_lowercase().collect())
}
