//! Regex based string splitting and stripping.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tabconv_model::{Row, Value};

use crate::converter::{Converter, unpack_single};
use crate::error::{ConvertError, Result};

/// Comma, semicolon and pipe, with surrounding whitespace.
pub const DEFAULT_SPLIT_DELIMITERS: &[&str] = &[r"\s*,\s*", r"\s*;\s*", r"\s*\|\s*"];

/// Leading and trailing whitespace.
pub const DEFAULT_STRIP_PATTERNS: &[&str] = &[r"\s+"];

static DEFAULT_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&DEFAULT_SPLIT_DELIMITERS.join("|")).expect("valid default delimiters")
});

static DEFAULT_STRIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&strip_pattern(DEFAULT_STRIP_PATTERNS)).expect("valid default strip patterns")
});

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| ConvertError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

pub(crate) fn strip_pattern<S: AsRef<str>>(patterns: &[S]) -> String {
    let prefixes = patterns.iter().map(|p| format!("^(?:{})", p.as_ref()));
    let suffixes = patterns.iter().map(|p| format!("(?:{})$", p.as_ref()));
    prefixes.chain(suffixes).collect::<Vec<_>>().join("|")
}

fn expect_str<'a>(row: &'a [Value], converter: &'static str) -> Result<&'a str> {
    let value = unpack_single(row, converter)?;
    value.as_str().ok_or_else(|| {
        ConvertError::invalid_value(
            converter,
            format!("can only be applied to strings, got {}", value.repr()),
        )
    })
}

/// Splits a string on any of several delimiter patterns.
#[derive(Debug, Clone)]
pub struct Split {
    regex: Regex,
    custom: bool,
}

impl Split {
    pub(crate) fn from_regex(regex: Regex) -> Self {
        Self {
            regex,
            custom: false,
        }
    }

    pub fn new<I, S>(delimiters: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let delimiters: Vec<S> = delimiters.into_iter().collect();
        if delimiters.is_empty() {
            return Ok(Self::default());
        }
        let joined: Vec<&str> = delimiters.iter().map(AsRef::as_ref).collect();
        Ok(Self {
            regex: compile(&joined.join("|"))?,
            custom: true,
        })
    }
}

impl Default for Split {
    fn default() -> Self {
        Self {
            regex: DEFAULT_SPLIT.clone(),
            custom: false,
        }
    }
}

impl Converter for Split {
    fn name(&self) -> &'static str {
        "Split"
    }

    fn transform(&self, row: &[Value]) -> Result<Row> {
        let text = expect_str(row, "Split")?;
        Ok(self.regex.split(text).map(Value::from).collect())
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.custom {
            write!(f, "Split({:?})", self.regex.as_str())
        } else {
            f.write_str("Split()")
        }
    }
}

/// Removes leading and trailing matches of any configured pattern.
#[derive(Debug, Clone)]
pub struct Strip {
    regex: Regex,
    custom: bool,
}

impl Strip {
    pub(crate) fn from_regex(regex: Regex) -> Self {
        Self {
            regex,
            custom: false,
        }
    }

    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<S> = patterns.into_iter().collect();
        if patterns.is_empty() {
            return Ok(Self::default());
        }
        Ok(Self {
            regex: compile(&strip_pattern(&patterns))?,
            custom: true,
        })
    }
}

impl Default for Strip {
    fn default() -> Self {
        Self {
            regex: DEFAULT_STRIP.clone(),
            custom: false,
        }
    }
}

impl Converter for Strip {
    fn name(&self) -> &'static str {
        "Strip"
    }

    fn transform(&self, row: &[Value]) -> Result<Row> {
        let text = expect_str(row, "Strip")?;
        Ok(vec![Value::from(self.regex.replace_all(text, "").into_owned())])
    }
}

impl fmt::Display for Strip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.custom {
            write!(f, "Strip({:?})", self.regex.as_str())
        } else {
            f.write_str("Strip()")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn strings(values: &[&str]) -> Row {
        values.iter().map(|value| Value::from(*value)).collect()
    }

    #[test]
    fn default_split_covers_comma_semicolon_and_pipe() {
        let row = [Value::from("a, b;c | d")];
        assert_eq!(Split::default().transform(&row).expect("split"), strings(&["a", "b", "c", "d"]));
        assert_eq!(
            Split::default().transform(&[Value::from("")]).expect("split"),
            strings(&[""])
        );
    }

    #[test]
    fn split_rejects_non_strings() {
        let err = Split::default().transform(&[Value::Int(3)]).expect_err("invalid");
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn strip_only_touches_the_ends() {
        let strip = Strip::new([r"\.", r"\s+"]).expect("valid patterns");
        assert_eq!(
            strip.transform(&[Value::from("jane.")]).expect("strip"),
            strings(&["jane"])
        );
        assert_eq!(
            strip.transform(&[Value::from("  mr. x ")]).expect("strip"),
            strings(&["mr. x"])
        );
    }

    #[test]
    fn bad_patterns_are_configuration_errors() {
        let err = Split::new(["("]).expect_err("invalid");
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn representations() {
        assert_eq!(Split::default().to_string(), "Split()");
        assert_eq!(
            Split::new([r"\s*/\s*"]).expect("valid").to_string(),
            r#"Split("\\s*/\\s*")"#
        );
        assert_eq!(Strip::default().to_string(), "Strip()");
    }
}
