//! Value normalization applied before fitting and transforming.

use std::fmt;
use std::sync::Arc;

use tabconv_model::{Record, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Failure reported by a custom pre-processing hook.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct HookError(pub String);

/// A custom pre-processing hook.
pub type HookFn = Arc<dyn Fn(&Value) -> Result<Value, HookError> + Send + Sync>;

/// Trim and lower-case strings and blank out non-finite floats.
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::Str(text) => Value::Str(text.trim().to_lowercase()),
        Value::Float(number) if !number.is_finite() => Value::Str(String::new()),
        other => other.clone(),
    }
}

/// How cell values are prepared before conversion.
#[derive(Clone, Default)]
pub enum Preprocessor {
    /// Values pass through untouched.
    Disabled,
    /// [`normalize`].
    #[default]
    Normalize,
    Custom(HookFn),
}

impl Preprocessor {
    pub fn custom<F>(hook: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, HookError> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(hook))
    }

    /// Prepare one value. A failing hook leaves the raw value in place.
    pub fn apply(&self, value: &Value) -> Value {
        match self {
            Self::Disabled => value.clone(),
            Self::Normalize => normalize(value),
            Self::Custom(hook) => match hook(value) {
                Ok(prepared) => prepared,
                Err(err) => {
                    warn!(error = %err, "pre-processing hook failed, keeping the raw value");
                    debug!(value = %value.repr(), "value rejected by pre-processing hook");
                    value.clone()
                }
            },
        }
    }

    pub fn apply_record(&self, record: &Record) -> Record {
        record
            .iter()
            .map(|(field, value)| (field.clone(), self.apply(value)))
            .collect()
    }

    pub fn apply_all(&self, records: &[Record]) -> Vec<Record> {
        if matches!(self, Self::Disabled) {
            return records.to_vec();
        }
        records.iter().map(|record| self.apply_record(record)).collect()
    }
}

impl fmt::Debug for Preprocessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::Normalize => f.write_str("Normalize"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
