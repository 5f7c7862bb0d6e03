//! Shorthand descriptions of converters.
//!
//! Anywhere a converter is accepted, a [`ConverterSpec`] may be given
//! instead: a literal value, a lookup table, a plain function, a sequence,
//! an ordered fallback, or a request for inference.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tabconv_model::Value;

use crate::combinator::{Pipeline, Try};
use crate::converter::{Converter, Slot};
use crate::error::Result;
use crate::leaf::{Const, Function, Ignore, Map, ValueFn};

pub enum ConverterSpec {
    /// An already constructed converter.
    Converter(Box<dyn Converter>),
    /// Emit this value for every row.
    Const(Value),
    /// Static lookup table.
    Lookup(IndexMap<Value, Value>),
    /// Single-value function with inferred shaping.
    Function { name: String, func: ValueFn },
    /// Apply in order, each on the previous output.
    Sequence(Vec<ConverterSpec>),
    /// First candidate that does not fail wins.
    Fallback(Vec<ConverterSpec>),
    /// Choose a converter from the fit sample.
    Infer,
    /// Drop the input.
    Ignore,
}

impl ConverterSpec {
    pub fn lookup<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Self::Lookup(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub fn function<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self::Function {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn sequence<I>(specs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ConverterSpec>,
    {
        Self::Sequence(specs.into_iter().map(Into::into).collect())
    }

    pub fn fallback<I>(specs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ConverterSpec>,
    {
        Self::Fallback(specs.into_iter().map(Into::into).collect())
    }

    /// Turn the shorthand into a concrete slot.
    ///
    /// `Infer` becomes a pending slot; everything else is constructed now.
    pub fn resolve(self) -> Result<Slot> {
        let slot = match self {
            Self::Converter(converter) => Slot::Ready(converter),
            Self::Const(value) => Slot::ready(Const::new(value)),
            Self::Lookup(table) => Slot::ready(Map::new(table)?),
            Self::Function { name, func } => Slot::ready(Function::from_arc(name, func)),
            Self::Sequence(specs) => Slot::ready(Pipeline::new(specs)?),
            Self::Fallback(specs) => Slot::ready(Try::new(specs)?),
            Self::Infer => Slot::infer(),
            Self::Ignore => Slot::ready(Ignore),
        };
        Ok(slot)
    }
}

impl<C: Converter> From<C> for ConverterSpec {
    fn from(converter: C) -> Self {
        Self::Converter(Box::new(converter))
    }
}

impl From<Value> for ConverterSpec {
    fn from(value: Value) -> Self {
        Self::Const(value)
    }
}

impl From<Vec<ConverterSpec>> for ConverterSpec {
    fn from(specs: Vec<ConverterSpec>) -> Self {
        Self::Sequence(specs)
    }
}

impl fmt::Debug for ConverterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converter(converter) => f.debug_tuple("Converter").field(converter).finish(),
            Self::Const(value) => f.debug_tuple("Const").field(value).finish(),
            Self::Lookup(table) => f.debug_tuple("Lookup").field(table).finish(),
            Self::Function { name, .. } => f
                .debug_struct("Function")
                .field("name", name)
                .finish_non_exhaustive(),
            Self::Sequence(specs) => f.debug_tuple("Sequence").field(specs).finish(),
            Self::Fallback(specs) => f.debug_tuple("Fallback").field(specs).finish(),
            Self::Infer => f.write_str("Infer"),
            Self::Ignore => f.write_str("Ignore"),
        }
    }
}
