//! Literal Values
//!
//! Parameter domains and argument tuples are made of literals. A literal keeps
//! its [`ValueKind`] so that hook and case signatures can be compared before
//! anything runs.

use std::fmt;

/// Kind of a literal value, used for signature checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Any integer type
    Int,
    /// Floating point
    Float,
    /// Boolean
    Bool,
    /// String
    Str,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
            ValueKind::Str => "str",
        };
        f.write_str(name)
    }
}

/// A literal parameter value or argument
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer literal, wide enough for every supported integer type
    Int(i128),
    /// Float literal
    Float(f64),
    /// Boolean literal
    Bool(bool),
    /// String literal
    Str(String),
}

impl Value {
    /// Kind of this literal
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::Str(_) => ValueKind::Str,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Str(v) => f.write_str(v),
        }
    }
}

/// Rust types usable as parameter values and arguments.
///
/// Every integer type maps to [`ValueKind::Int`], so a `u32` slot and an `i64`
/// hook argument are structurally compatible.
pub trait Literal: Clone + 'static {
    /// Kind this type is checked as
    const KIND: ValueKind;

    /// Convert into a literal
    fn into_value(self) -> Value;
}

/// Literals that can be read back out of an [`Args`] tuple.
///
/// `&'static str` is write-only; read strings back as `String`.
pub trait FromLiteral: Literal {
    /// Convert back, `None` if the kind or range does not fit
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! int_literal {
    ($($ty:ty),*) => {
        $(
            impl Literal for $ty {
                const KIND: ValueKind = ValueKind::Int;

                fn into_value(self) -> Value {
                    // Lossless: every listed type fits in i128
                    Value::Int(self as i128)
                }
            }

            impl FromLiteral for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Int(v) => <$ty>::try_from(*v).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

int_literal!(i32, i64, u32, u64, usize);

impl Literal for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl FromLiteral for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl Literal for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FromLiteral for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl Literal for String {
    const KIND: ValueKind = ValueKind::Str;

    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl FromLiteral for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl Literal for &'static str {
    const KIND: ValueKind = ValueKind::Str;

    fn into_value(self) -> Value {
        Value::Str(self.to_string())
    }
}

/// Ordered parameter list of a case or hook
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature(Vec<ValueKind>);

impl Signature {
    /// Signature with no parameters
    pub fn empty() -> Self {
        Self::default()
    }

    /// Signature from a list of kinds
    pub fn of(kinds: impl IntoIterator<Item = ValueKind>) -> Self {
        Self(kinds.into_iter().collect())
    }

    /// Parameter kinds in position order
    pub fn kinds(&self) -> &[ValueKind] {
        &self.0
    }

    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    /// Whether an argument tuple fits this signature
    pub fn accepts(&self, args: &Args) -> bool {
        self.0.len() == args.len()
            && self
                .0
                .iter()
                .zip(args.values())
                .all(|(kind, value)| *kind == value.kind())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<String> = self.0.iter().map(|k| k.to_string()).collect();
        write!(f, "({})", kinds.join(", "))
    }
}

/// One argument tuple passed to a case and its hooks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(Vec<Value>);

impl Args {
    /// The implicit empty tuple
    pub fn empty() -> Self {
        Self::default()
    }

    /// Tuple from literals
    pub fn new(values: impl IntoIterator<Item = Value>) -> Self {
        Self(values.into_iter().collect())
    }

    /// All values in position order
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the empty tuple
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw value at `index`
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Typed value at `index`
    ///
    /// Errors if the position is missing or holds a different kind; signature
    /// checks at registration make this unreachable for well-formed suites.
    pub fn get<L: FromLiteral>(&self, index: usize) -> anyhow::Result<L> {
        let value = self
            .0
            .get(index)
            .ok_or_else(|| anyhow::anyhow!("argument {} missing (tuple has {})", index, self.len()))?;
        L::from_value(value).ok_or_else(|| {
            anyhow::anyhow!(
                "argument {} is {} `{}`, expected {}",
                index,
                value.kind(),
                value,
                L::KIND
            )
        })
    }

    /// String value at `index`, borrowed from the tuple
    pub fn get_str(&self, index: usize) -> anyhow::Result<&str> {
        match self.0.get(index) {
            Some(Value::Str(v)) => Ok(v),
            Some(other) => anyhow::bail!(
                "argument {} is {} `{}`, expected str",
                index,
                other.kind(),
                other
            ),
            None => anyhow::bail!("argument {} missing (tuple has {})", index, self.len()),
        }
    }

    /// Signature this tuple satisfies
    pub fn signature(&self) -> Signature {
        Signature(self.0.iter().map(Value::kind).collect())
    }
}

impl fmt::Display for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.0.iter().map(|v| v.to_string()).collect();
        f.write_str(&values.join(", "))
    }
}

/// Build an [`Args`] tuple from heterogeneous literals.
///
/// ```ignore
/// let args = args![1024, "users", true];
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::empty()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Args::new([$($crate::Literal::into_value($value)),+])
    };
}
