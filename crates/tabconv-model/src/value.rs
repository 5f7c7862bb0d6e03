//! Cell values flowing through converters.
//!
//! A [`Value`] is either a scalar (absence marker, bool, integer, float,
//! string) or a nested list of values. Nested lists are how converters pass
//! row-of-rows structures between pipeline stages.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// An ordered sequence of values handed to or produced by one converter call.
///
/// Single values still travel as 1-element rows.
pub type Row = Vec<Value>;

/// A single cell value.
///
/// Equality, hashing and ordering are total: floats compare with
/// [`f64::total_cmp`] and values of different variants never compare equal
/// (`Int(1) != Float(1.0)`). Ordering across variants follows
/// [`ValueKind`] order, so any set of values can be sorted deterministically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// The absence marker. Never matches a fitted category.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

/// Variant tag of a [`Value`], in cross-variant sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    List,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Str(_) => ValueKind::Str,
            Self::List(_) => ValueKind::List,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Interpret the value as a finite real number.
    ///
    /// Integers, finite floats and booleans convert directly; strings are
    /// trimmed and parsed. Infinite and NaN results are rejected.
    pub fn to_finite_f64(&self) -> Option<f64> {
        let number = match self {
            Self::Bool(flag) => f64::from(u8::from(*flag)),
            Self::Int(value) => *value as f64,
            Self::Float(value) => *value,
            Self::Str(text) => text.trim().parse::<f64>().ok()?,
            Self::Null | Self::List(_) => return None,
        };
        number.is_finite().then_some(number)
    }

    /// Source-like rendering used by converter representations.
    ///
    /// Strings are quoted, the absence marker renders as `null`.
    pub fn repr(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Str(text) => format!("{text:?}"),
            Self::List(items) => {
                let inner: Vec<String> = items.iter().map(Value::repr).collect();
                format!("[{}]", inner.join(", "))
            }
            other => other.to_string(),
        }
    }
}

/// Whether a set of values has a natural order.
///
/// Homogeneous sets of booleans, integers, floats or strings sort; anything
/// containing the absence marker, nested lists or mixed variants keeps its
/// first-seen order.
pub fn is_sortable(values: &[Value]) -> bool {
    let Some(first) = values.first() else {
        return true;
    };
    let kind = first.kind();
    matches!(
        kind,
        ValueKind::Bool | ValueKind::Int | ValueKind::Float | ValueKind::Str
    ) && values.iter().all(|value| value.kind() == kind)
}

/// Deduplicate values keeping first-seen order, then sort when a natural
/// order exists.
pub fn unique_values<'a, I>(values: I) -> Vec<Value>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut seen = indexmap::IndexSet::new();
    for value in values {
        seen.insert(value.clone());
    }
    let mut unique: Vec<Value> = seen.into_iter().collect();
    if is_sortable(&unique) {
        unique.sort();
    }
    unique
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            (Self::List(a), Self::List(b)) => a.cmp(b),
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Self::Null => {}
            Self::Bool(flag) => flag.hash(state),
            Self::Int(value) => value.hash(state),
            Self::Float(value) => value.to_bits().hash(state),
            Self::Str(text) => text.hash(state),
            Self::List(items) => items.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Str(text) => f.write_str(text),
            Self::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
