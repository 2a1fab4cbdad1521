//! Command definitions
//!
//! A command is an ordered list of typed arguments; the first one is the verb.

use bytes::Bytes;

/// One command argument
///
/// Every variant except the two list kinds becomes exactly one wire block.
/// The list kinds expand in place into one block per element.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// UTF-8 text
    Text(String),

    /// Raw bytes, sent unchanged
    Bytes(Bytes),

    /// Signed integer (every signed width widens to this)
    Int(i64),

    /// Unsigned integer (every unsigned width widens to this)
    Uint(u64),

    /// Double precision float
    Float(f64),

    /// Single precision float, formatted at its own precision
    Float32(f32),

    /// Sent as "1" / "0"
    Bool(bool),

    /// Absence of a value, sent as an empty block
    Nil,

    /// Each element becomes its own block
    TextList(Vec<String>),

    /// Each element becomes its own block
    BytesList(Vec<Bytes>),
}

// =============================================================================
// Conversions
// =============================================================================

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Text(v.to_string())
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Text(v)
    }
}

impl From<&String> for Arg {
    fn from(v: &String) -> Self {
        Arg::Text(v.clone())
    }
}

impl From<&[u8]> for Arg {
    fn from(v: &[u8]) -> Self {
        Arg::Bytes(Bytes::copy_from_slice(v))
    }
}

impl<const N: usize> From<&[u8; N]> for Arg {
    fn from(v: &[u8; N]) -> Self {
        Arg::Bytes(Bytes::copy_from_slice(v))
    }
}

impl From<Vec<u8>> for Arg {
    fn from(v: Vec<u8>) -> Self {
        Arg::Bytes(Bytes::from(v))
    }
}

impl From<Bytes> for Arg {
    fn from(v: Bytes) -> Self {
        Arg::Bytes(v)
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $wide:ty; $($t:ty),*) => {
        $(
            impl From<$t> for Arg {
                fn from(v: $t) -> Self {
                    Arg::$variant(v as $wide)
                }
            }
        )*
    };
}

impl_from_int!(Int, i64; i8, i16, i32, i64, isize);
impl_from_int!(Uint, u64; u8, u16, u32, u64, usize);

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Float(v)
    }
}

impl From<f32> for Arg {
    fn from(v: f32) -> Self {
        Arg::Float32(v)
    }
}

impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        Arg::Bool(v)
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        v.map_or(Arg::Nil, Into::into)
    }
}

impl From<Vec<String>> for Arg {
    fn from(v: Vec<String>) -> Self {
        Arg::TextList(v)
    }
}

impl From<Vec<&str>> for Arg {
    fn from(v: Vec<&str>) -> Self {
        Arg::TextList(v.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Arg {
    fn from(v: &[&str]) -> Self {
        Arg::TextList(v.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<Vec<u8>>> for Arg {
    fn from(v: Vec<Vec<u8>>) -> Self {
        Arg::BytesList(v.into_iter().map(Bytes::from).collect())
    }
}

impl From<Vec<Bytes>> for Arg {
    fn from(v: Vec<Bytes>) -> Self {
        Arg::BytesList(v)
    }
}

// =============================================================================
// Command
// =============================================================================

/// A complete command, built once and consumed by `Connection::execute`
///
/// ```
/// use ssdbkv::protocol::Command;
///
/// let cmd = Command::new("setx").arg("key").arg(123456).arg(300);
/// assert_eq!(cmd.verb(), Some("setx"));
/// assert_eq!(cmd.args().len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    args: Vec<Arg>,
}

impl Command {
    /// Start a command with its verb
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            args: vec![Arg::Text(verb.into())],
        }
    }

    /// Build a command from an already assembled argument list
    pub fn from_args(args: Vec<Arg>) -> Self {
        Self { args }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments of the same kind
    pub fn args_from<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The verb, if the first argument is text
    pub fn verb(&self) -> Option<&str> {
        match self.args.first() {
            Some(Arg::Text(verb)) => Some(verb.as_str()),
            _ => None,
        }
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }
}

impl From<Vec<Arg>> for Command {
    fn from(args: Vec<Arg>) -> Self {
        Self::from_args(args)
    }
}
