//! The converter contract and the owned slot combinators hold converters in.
//!
//! A converter is fitted at most once against representative rows and then
//! transforms rows without further mutation. Every value travels inside a
//! [`Row`], so a single input is a 1-element row and a single output is
//! returned as a 1-element row.

use std::any::Any;
use std::fmt;

use tabconv_model::{Row, Value};

use crate::error::{ConvertError, Result};
use crate::infer::Infer;

/// Type-erasure helpers backing [`<dyn Converter>::downcast_ref`].
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A unit that fits itself to sample rows, names its outputs and maps rows.
///
/// `Display` renders a source-like representation such as
/// `Float(default=mean)` or `[Split(), Flatten()]`.
pub trait Converter: AsAny + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Short type name used in error messages and logs.
    fn name(&self) -> &'static str;

    /// Adapt internal state to representative rows.
    ///
    /// Called at most once, before any call to [`Converter::transform`].
    fn fit(&mut self, rows: &[Row]) -> Result<()> {
        let _ = rows;
        Ok(())
    }

    /// Map input labels to output labels. Defaults to passthrough.
    fn labels(&self, labels: &[Value]) -> Result<Row> {
        Ok(labels.to_vec())
    }

    /// Convert one row.
    fn transform(&self, row: &[Value]) -> Result<Row>;
}

impl dyn Converter {
    pub fn is<T: Converter>(&self) -> bool {
        AsAny::as_any(self).is::<T>()
    }

    pub fn downcast_ref<T: Converter>(&self) -> Option<&T> {
        AsAny::as_any(self).downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Converter>(&mut self) -> Option<&mut T> {
        AsAny::as_any_mut(self).downcast_mut::<T>()
    }

    /// Take ownership of the concrete converter. Check with [`Self::is`]
    /// first if the box must survive a mismatch.
    pub fn downcast<T: Converter>(self: Box<Self>) -> Option<Box<T>> {
        AsAny::into_any(self).downcast::<T>().ok()
    }
}

/// Owned position for a converter inside a combinator or profile.
///
/// A slot starts either with a concrete converter or with a pending
/// inference request. Fitting a pending slot replaces the request with the
/// inferred, fitted converter, so transform paths only ever see `Ready`.
#[derive(Debug)]
pub enum Slot {
    Pending(Infer),
    Ready(Box<dyn Converter>),
}

impl Slot {
    pub fn ready<C: Converter>(converter: C) -> Self {
        Self::Ready(Box::new(converter))
    }

    pub fn infer() -> Self {
        Self::Pending(Infer::default())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending(_) => "Infer",
            Self::Ready(converter) => converter.name(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// The concrete converter, once resolved.
    pub fn converter(&self) -> Option<&dyn Converter> {
        match self {
            Self::Pending(_) => None,
            Self::Ready(converter) => Some(converter.as_ref()),
        }
    }

    pub fn converter_mut(&mut self) -> Option<&mut dyn Converter> {
        match self {
            Self::Pending(_) => None,
            Self::Ready(converter) => Some(converter.as_mut()),
        }
    }

    pub fn get(&self) -> Result<&dyn Converter> {
        self.converter().ok_or_else(|| ConvertError::NotFitted {
            converter: "Infer",
            reason: "inference has not run yet".to_string(),
        })
    }

    pub fn fit(&mut self, rows: &[Row]) -> Result<()> {
        match self {
            Self::Pending(request) => {
                let resolved = request.resolve(rows)?;
                *self = Self::Ready(resolved);
            }
            Self::Ready(converter) => converter.fit(rows)?,
        }
        Ok(())
    }

    pub fn labels(&self, labels: &[Value]) -> Result<Row> {
        self.get()?.labels(labels)
    }

    pub fn transform(&self, row: &[Value]) -> Result<Row> {
        self.get()?.transform(row)
    }
}

impl<C: Converter> From<C> for Slot {
    fn from(converter: C) -> Self {
        Self::ready(converter)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending(request) => write!(f, "{request}"),
            Self::Ready(converter) => write!(f, "{converter}"),
        }
    }
}

/// The single value of a 1-element row.
pub(crate) fn unpack_single<'a>(row: &'a [Value], converter: &'static str) -> Result<&'a Value> {
    match row {
        [value] => Ok(value),
        _ => Err(ConvertError::ShapeMismatch {
            converter,
            expected: "a single value".to_string(),
            found: row.len(),
        }),
    }
}

/// The single values of a batch of 1-element rows.
pub(crate) fn unpack_rows<'a>(rows: &'a [Row], converter: &'static str) -> Result<Vec<&'a Value>> {
    rows.iter()
        .map(|row| unpack_single(row, converter))
        .collect()
}

/// Join labels into one, as used when many inputs collapse into one output.
pub(crate) fn join_labels(labels: &[Value]) -> Value {
    let joined: Vec<String> = labels.iter().map(ToString::to_string).collect();
    Value::Str(joined.join(", "))
}

/// Comma separated `repr` of each value.
pub(crate) fn repr_list<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a Value>,
{
    let parts: Vec<String> = values.into_iter().map(Value::repr).collect();
    parts.join(", ")
}
