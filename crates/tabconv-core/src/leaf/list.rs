//! Delimited lists encoded as one 0/1 column per token.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tabconv_model::{Row, Value};

use crate::combinator::{ForEach, Pipeline};
use crate::converter::{Converter, Slot};
use crate::error::{ConvertError, Result};
use crate::leaf::categorical::{HandleUnknown, OneHot};
use crate::leaf::function::{Function, StrictFunction};
use crate::leaf::shape::{Flatten, Transpose};
use crate::leaf::text::{Split, Strip, strip_pattern};

/// Generic list delimiter: a comma with surrounding whitespace.
pub const LIST_DELIMITER: &str = r"\s*,\s*";

/// Tokens are trimmed of whitespace.
pub const LIST_STRIP: &str = r"\s+";

/// Natural language conjunctions, tried before the generic delimiter.
pub const AND_OR_DELIMITERS: &[&str] = &[
    r"\s*,\s*and\s+",
    r"\s+and\s+",
    r"\s*,\s*or\s+",
    r"\s+or\s+",
];

/// Trailing punctuation removed before whitespace.
pub const AND_OR_STRIP: &[&str] = &[r"\."];

/// Stage holding the per-token one-hot encoder.
const ONE_HOT_STAGE: usize = 5;

static LIST_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(LIST_DELIMITER).expect("valid list delimiter"));

static LIST_STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&strip_pattern(&[LIST_STRIP])).expect("valid list strip"));

static AND_OR_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    let patterns = and_or_patterns(AND_OR_DELIMITERS, LIST_DELIMITER, &[]);
    Regex::new(&patterns.join("|")).expect("valid conjunction delimiters")
});

static AND_OR_STRIP_RE: LazyLock<Regex> = LazyLock::new(|| {
    let patterns = and_or_patterns(AND_OR_STRIP, LIST_STRIP, &[]);
    Regex::new(&strip_pattern(&patterns)).expect("valid conjunction strip")
});

/// Built-in patterns, then the generic one, then caller extras.
fn and_or_patterns(builtin: &[&str], generic: &str, extra: &[String]) -> Vec<String> {
    builtin
        .iter()
        .copied()
        .chain([generic])
        .map(ToString::to_string)
        .chain(extra.iter().cloned())
        .collect()
}

/// One 0/1 column per distinct token of a delimited string.
///
/// Tokens are split, stripped and de-duplicated; empty tokens are dropped.
/// An empty or absent list encodes as all zeros, and tokens unseen during
/// fit contribute nothing.
#[derive(Debug)]
pub struct List {
    pipeline: Pipeline,
    delimiters: Vec<String>,
    strip: Vec<String>,
}

impl List {
    pub fn new() -> Self {
        Self::from_parts(
            Split::from_regex(LIST_SPLIT.clone()),
            Strip::from_regex(LIST_STRIP_RE.clone()),
            vec![LIST_DELIMITER.to_string()],
            vec![LIST_STRIP.to_string()],
        )
    }

    /// Custom delimiter and strip patterns.
    pub fn with_patterns<D, S>(delimiters: D, strip: S) -> Result<Self>
    where
        D: IntoIterator,
        D::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        let delimiters: Vec<String> = delimiters.into_iter().map(Into::into).collect();
        let strip: Vec<String> = strip.into_iter().map(Into::into).collect();
        if delimiters.is_empty() {
            return Err(ConvertError::invalid_config("List needs at least one delimiter"));
        }
        Ok(Self::from_parts(
            Split::new(&delimiters)?,
            Strip::new(&strip)?,
            delimiters,
            strip,
        ))
    }

    fn from_parts(
        split: Split,
        strip: Strip,
        delimiters: Vec<String>,
        strip_patterns: Vec<String>,
    ) -> Self {
        let stages: Vec<Slot> = vec![
            Slot::ready(split),
            Slot::ready(ForEach::new(strip)),
            Slot::ready(Flatten),
            Slot::ready(
                StrictFunction::new("drop_empty", drop_empty)
                    .with_labels(|labels| Ok(labels.to_vec())),
            ),
            Slot::ready(
                StrictFunction::new("append_absent", append_absent)
                    .with_labels(|labels| Ok(labels.to_vec())),
            ),
            Slot::ready(ForEach::new(
                OneHot::new().with_handle_unknown(HandleUnknown::Ignore),
            )),
            Slot::ready(Transpose),
            Slot::ready(ForEach::new(Function::new("max", max_of_list))),
            Slot::ready(Flatten),
        ];
        Self {
            pipeline: Pipeline::from_slots(stages),
            delimiters,
            strip: strip_patterns,
        }
    }

    /// Tokens observed during fit, one output column each.
    pub fn values(&self) -> Vec<&Value> {
        self.pipeline
            .stage(ONE_HOT_STAGE)
            .and_then(Slot::converter)
            .and_then(|stage| stage.downcast_ref::<ForEach>())
            .and_then(|for_each| for_each.inner().converter())
            .and_then(|inner| inner.downcast_ref::<OneHot>())
            .map(OneHot::values)
            .unwrap_or_default()
    }

    pub fn delimiters(&self) -> &[String] {
        &self.delimiters
    }

    fn normalize(row: &[Value]) -> Row {
        match row {
            [Value::Null] => vec![Value::from("")],
            other => other.to_vec(),
        }
    }
}

impl Default for List {
    fn default() -> Self {
        Self::new()
    }
}

fn drop_empty(row: &[Value]) -> Result<Row> {
    let mut seen = HashSet::new();
    Ok(row
        .iter()
        .filter(|token| token.as_str() != Some(""))
        .filter(|token| seen.insert(*token))
        .cloned()
        .collect())
}

fn append_absent(row: &[Value]) -> Result<Row> {
    let mut tokens = row.to_vec();
    tokens.push(Value::Null);
    Ok(tokens)
}

fn max_of_list(value: &Value) -> Result<Value> {
    value
        .as_list()
        .and_then(|items| items.iter().max())
        .cloned()
        .ok_or_else(|| ConvertError::Function {
            name: "max".to_string(),
            message: format!("expected a non-empty list, got {}", value.repr()),
        })
}

impl Converter for List {
    fn name(&self) -> &'static str {
        "List"
    }

    fn fit(&mut self, rows: &[Row]) -> Result<()> {
        let rows: Vec<Row> = rows.iter().map(|row| Self::normalize(row)).collect();
        self.pipeline.fit(&rows)
    }

    fn labels(&self, labels: &[Value]) -> Result<Row> {
        self.pipeline.labels(labels)
    }

    fn transform(&self, row: &[Value]) -> Result<Row> {
        self.pipeline.transform(&Self::normalize(row))
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut args = Vec::new();
        if self.delimiters != [LIST_DELIMITER] {
            args.push(format!("delimiter={:?}", self.delimiters));
        }
        if self.strip != [LIST_STRIP] {
            args.push(format!("strip={:?}", self.strip));
        }
        write!(f, "List({})", args.join(", "))
    }
}

/// [`List`] that also splits on "and"/"or" conjunctions and strips dots.
#[derive(Debug)]
pub struct ListAndOr {
    list: List,
    extra_delimiters: Vec<String>,
    extra_strip: Vec<String>,
}

impl ListAndOr {
    pub fn new() -> Self {
        Self {
            list: List::from_parts(
                Split::from_regex(AND_OR_SPLIT.clone()),
                Strip::from_regex(AND_OR_STRIP_RE.clone()),
                and_or_patterns(AND_OR_DELIMITERS, LIST_DELIMITER, &[]),
                and_or_patterns(AND_OR_STRIP, LIST_STRIP, &[]),
            ),
            extra_delimiters: Vec::new(),
            extra_strip: Vec::new(),
        }
    }

    /// Additional patterns, applied after the built-in ones.
    pub fn with_extra<D, S>(delimiters: D, strip: S) -> Result<Self>
    where
        D: IntoIterator,
        D::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        let extra_delimiters: Vec<String> = delimiters.into_iter().map(Into::into).collect();
        let extra_strip: Vec<String> = strip.into_iter().map(Into::into).collect();

        let all_delimiters = and_or_patterns(AND_OR_DELIMITERS, LIST_DELIMITER, &extra_delimiters);
        let all_strip = and_or_patterns(AND_OR_STRIP, LIST_STRIP, &extra_strip);

        Ok(Self {
            list: List::with_patterns(all_delimiters, all_strip)?,
            extra_delimiters,
            extra_strip,
        })
    }

    pub fn values(&self) -> Vec<&Value> {
        self.list.values()
    }
}

impl Default for ListAndOr {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for ListAndOr {
    fn name(&self) -> &'static str {
        "ListAndOr"
    }

    fn fit(&mut self, rows: &[Row]) -> Result<()> {
        self.list.fit(rows)
    }

    fn labels(&self, labels: &[Value]) -> Result<Row> {
        self.list.labels(labels)
    }

    fn transform(&self, row: &[Value]) -> Result<Row> {
        self.list.transform(row)
    }
}

impl fmt::Display for ListAndOr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut args = Vec::new();
        if !self.extra_delimiters.is_empty() {
            args.push(format!("delimiter={:?}", self.extra_delimiters));
        }
        if !self.extra_strip.is_empty() {
            args.push(format!("strip={:?}", self.extra_strip));
        }
        write!(f, "ListAndOr({})", args.join(", "))
    }
}
