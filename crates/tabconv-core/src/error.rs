//! Error types for converter fitting and transformation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while fitting, labelling or transforming.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// Transform-time use of state that only `fit` can provide.
    #[error("{converter} has not been fitted: {reason}")]
    NotFitted {
        converter: &'static str,
        reason: String,
    },

    /// Categorical value outside the fitted domain.
    #[error("{converter}: unknown value {value}; known values: [{known}]")]
    UnknownValue {
        converter: &'static str,
        value: String,
        known: String,
    },

    /// Converter output length disagrees with its label count.
    #[error(
        "key '{key}': {converter} produced {values} values but {labels} labels were computed"
    )]
    ArityMismatch {
        key: String,
        converter: String,
        values: usize,
        labels: usize,
    },

    /// Nothing to fit from.
    #[error("no sample values for {what}")]
    EmptySample { what: String },

    /// No inference rule applies to the sample.
    #[error("cannot infer a converter from values: {sample} ...")]
    Uninferrable { sample: String },

    /// Value of the wrong type or shape for the converter.
    #[error("{converter}: {message}")]
    InvalidValue {
        converter: &'static str,
        message: String,
    },

    /// Row width disagrees with what the converter expects.
    #[error("{converter}: expected {expected}, got a row of {found} values")]
    ShapeMismatch {
        converter: &'static str,
        expected: String,
        found: usize,
    },

    /// Converter constructed or configured with unusable parameters.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Pattern failed to compile.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A user supplied function failed.
    #[error("function {name} failed: {message}")]
    Function { name: String, message: String },

    /// Annotates an inner error with where it happened.
    #[error("{scope}: {converter} converter failed during {phase}: {source}")]
    Context {
        scope: String,
        converter: String,
        phase: Phase,
        #[source]
        source: Box<ConvertError>,
    },
}

/// Abstract error classification, stable across context annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFitted,
    UnknownValue,
    ArityMismatch,
    EmptySample,
    Uninferrable,
    InvalidValue,
    ShapeMismatch,
    InvalidConfig,
    Function,
}

/// The converter operation an error was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fit,
    Labels,
    Transform,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fit => "fit",
            Self::Labels => "label computation",
            Self::Transform => "transform",
        })
    }
}

impl ConvertError {
    /// Classification of the innermost error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFitted { .. } => ErrorKind::NotFitted,
            Self::UnknownValue { .. } => ErrorKind::UnknownValue,
            Self::ArityMismatch { .. } => ErrorKind::ArityMismatch,
            Self::EmptySample { .. } => ErrorKind::EmptySample,
            Self::Uninferrable { .. } => ErrorKind::Uninferrable,
            Self::InvalidValue { .. } => ErrorKind::InvalidValue,
            Self::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            Self::InvalidConfig { .. } | Self::InvalidPattern { .. } => ErrorKind::InvalidConfig,
            Self::Function { .. } => ErrorKind::Function,
            Self::Context { source, .. } => source.kind(),
        }
    }

    /// The innermost error, with all context annotations removed.
    pub fn root(&self) -> &ConvertError {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Wrap this error with the key or stage it was raised for.
    pub fn within(self, scope: impl Into<String>, converter: impl Into<String>, phase: Phase) -> Self {
        Self::Context {
            scope: scope.into(),
            converter: converter.into(),
            phase,
            source: Box::new(self),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_value(converter: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            converter,
            message: message.into(),
        }
    }
}

/// Result type for converter operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_sees_through_context() {
        let err = ConvertError::UnknownValue {
            converter: "Enumerate",
            value: "\"x\"".to_string(),
            known: "\"a\"".to_string(),
        }
        .within("stage 1", "Enumerate", Phase::Transform)
        .within("key 'gender'", "Pipeline", Phase::Transform);

        assert_eq!(err.kind(), ErrorKind::UnknownValue);
        assert!(matches!(err.root(), ConvertError::UnknownValue { .. }));
        assert!(err.to_string().starts_with(
            "key 'gender': Pipeline converter failed during transform: stage 1:"
        ));
    }

    #[test]
    fn error_kinds_use_snake_case() {
        let kinds: Vec<ErrorKind> =
            serde_json::from_str(r#"["unknown_value", "not_fitted"]"#).expect("parse kinds");
        assert_eq!(kinds, vec![ErrorKind::UnknownValue, ErrorKind::NotFitted]);
    }
}
