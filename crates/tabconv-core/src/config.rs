//! Serializable converter and profile configuration.
//!
//! A profile can be described in JSON and turned into a [`RecordProfile`]:
//!
//! ```json
//! {
//!   "ignore_undefined": false,
//!   "columns": {
//!     "age": { "type": "float", "default": "mean" },
//!     "sex": { "type": "map", "table": { "m": 0, "f": 1 } },
//!     "notes": { "type": "ignore" }
//!   },
//!   "groups": [
//!     { "fields": ["height", "weight"], "converter": { "type": "infer" } }
//!   ]
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tabconv_model::{Key, Value};

use crate::combinator::{ForEach, Parallel, Pipeline, Try};
use crate::error::{ErrorKind, Result};
use crate::leaf::{
    Binary, Const, Enumerate, Flatten, Float, FloatDefault, HandleUnknown, Id, LIST_DELIMITER,
    LIST_STRIP, Label, List, ListAndOr, Map, OneHot, Split, Strip, Transpose,
};
use crate::profile::{ProfileOptions, RecordProfile};
use crate::spec::ConverterSpec;

/// One converter, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ConverterConfig {
    Id,
    Ignore,
    Infer,
    Const {
        value: Value,
    },
    Label {
        labels: Vec<Value>,
    },
    Map {
        table: IndexMap<String, Value>,
        #[serde(default)]
        default: Option<Value>,
    },
    Float {
        #[serde(default)]
        default: Option<FloatDefault>,
    },
    Binary {
        #[serde(default)]
        positive: Vec<Value>,
        #[serde(default)]
        negative: Vec<Value>,
    },
    Enumerate {
        #[serde(default)]
        values: Option<Vec<Value>>,
    },
    OneHot {
        #[serde(default)]
        values: Option<Vec<Value>>,
        #[serde(default)]
        handle_unknown: HandleUnknown,
    },
    Split {
        #[serde(default)]
        delimiters: Vec<String>,
    },
    Strip {
        #[serde(default)]
        patterns: Vec<String>,
    },
    List {
        #[serde(default)]
        delimiters: Option<Vec<String>>,
        #[serde(default)]
        strip: Option<Vec<String>>,
    },
    ListAndOr {
        #[serde(default)]
        delimiters: Vec<String>,
        #[serde(default)]
        strip: Vec<String>,
    },
    Transpose,
    Flatten,
    Pipeline {
        stages: Vec<ConverterConfig>,
    },
    Parallel {
        converters: Vec<ConverterConfig>,
    },
    Try {
        candidates: Vec<ConverterConfig>,
        #[serde(default)]
        catch: Option<Vec<ErrorKind>>,
    },
    ForEach {
        converter: Box<ConverterConfig>,
    },
}

fn specs(configs: Vec<ConverterConfig>) -> Result<Vec<ConverterSpec>> {
    configs.into_iter().map(ConverterConfig::into_spec).collect()
}

impl ConverterConfig {
    /// Build the described converter.
    pub fn into_spec(self) -> Result<ConverterSpec> {
        let spec: ConverterSpec = match self {
            Self::Id => Id.into(),
            Self::Ignore => ConverterSpec::Ignore,
            Self::Infer => ConverterSpec::Infer,
            Self::Const { value } => Const::new(value).into(),
            Self::Label { labels } => Label::new(labels).into(),
            Self::Map { table, default } => {
                let map = Map::new(table)?;
                match default {
                    Some(default) => map.with_default(default).into(),
                    None => map.into(),
                }
            }
            Self::Float { default } => match default {
                Some(default) => Float::with_default(default)?.into(),
                None => Float::new().into(),
            },
            Self::Binary { positive, negative } => Binary::with_values(positive, negative).into(),
            Self::Enumerate { values } => match values {
                Some(values) => Enumerate::with_values(values).into(),
                None => Enumerate::new().into(),
            },
            Self::OneHot {
                values,
                handle_unknown,
            } => {
                let one_hot = match values {
                    Some(values) => OneHot::with_values(values),
                    None => OneHot::new(),
                };
                one_hot.with_handle_unknown(handle_unknown).into()
            }
            Self::Split { delimiters } => Split::new(delimiters)?.into(),
            Self::Strip { patterns } => Strip::new(patterns)?.into(),
            Self::List { delimiters, strip } => match (delimiters, strip) {
                (None, None) => List::new().into(),
                (delimiters, strip) => List::with_patterns(
                    delimiters.unwrap_or_else(|| vec![LIST_DELIMITER.to_string()]),
                    strip.unwrap_or_else(|| vec![LIST_STRIP.to_string()]),
                )?
                .into(),
            },
            Self::ListAndOr { delimiters, strip } => {
                if delimiters.is_empty() && strip.is_empty() {
                    ListAndOr::new().into()
                } else {
                    ListAndOr::with_extra(delimiters, strip)?.into()
                }
            }
            Self::Transpose => Transpose.into(),
            Self::Flatten => Flatten.into(),
            Self::Pipeline { stages } => Pipeline::new(specs(stages)?)?.into(),
            Self::Parallel { converters } => Parallel::new(specs(converters)?)?.into(),
            Self::Try { candidates, catch } => {
                let fallback = Try::new(specs(candidates)?)?;
                match catch {
                    Some(kinds) => fallback.with_catch(kinds).into(),
                    None => fallback.into(),
                }
            }
            Self::ForEach { converter } => ForEach::from_spec(converter.into_spec()?)?.into(),
        };
        Ok(spec)
    }
}

/// Several fields consumed together by one converter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupConfig {
    pub fields: Vec<Key>,
    pub converter: ConverterConfig,
}

/// A whole profile: per-column converters plus the undefined-field policies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    pub ignore_undefined: bool,
    pub ignore_uninferrable: bool,
    pub columns: IndexMap<String, ConverterConfig>,
    pub groups: Vec<GroupConfig>,
}

impl ProfileConfig {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn options(&self) -> ProfileOptions {
        ProfileOptions::default()
            .with_ignore_undefined(self.ignore_undefined)
            .with_ignore_uninferrable(self.ignore_uninferrable)
    }

    /// Build an unfitted profile. Columns come before groups.
    pub fn build(self) -> Result<RecordProfile> {
        let mut profile = RecordProfile::new().with_options(self.options());
        for (column, converter) in self.columns {
            profile.set(column, converter.into_spec()?)?;
        }
        for group in self.groups {
            profile.set(Key::Tuple(group.fields), group.converter.into_spec()?)?;
        }
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::Statistic;
    use tabconv_model::record;

    #[test]
    fn tagged_configs_parse() {
        let config: ConverterConfig =
            serde_json::from_str(r#"{"type": "float", "default": "mean"}"#).expect("parse");
        assert_eq!(
            config,
            ConverterConfig::Float {
                default: Some(FloatDefault::Statistic(Statistic::Mean)),
            }
        );

        let config: ConverterConfig = serde_json::from_str(
            r#"{"type": "pipeline", "stages": [{"type": "map", "table": {"div": "diverse"}}, {"type": "one_hot"}]}"#,
        )
        .expect("parse");
        let slot = config.into_spec().and_then(ConverterSpec::resolve).expect("build");
        assert_eq!(slot.to_string(), r#"[{"div": "diverse"}, OneHot()]"#);
    }

    #[test]
    fn unknown_types_are_rejected() {
        let parsed = serde_json::from_str::<ConverterConfig>(r#"{"type": "sparkle"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn bad_patterns_fail_to_build() {
        let config = ConverterConfig::Split {
            delimiters: vec!["(".to_string()],
        };
        let err = config.into_spec().expect_err("invalid regex");
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn profile_config_builds_a_working_profile() {
        let config = ProfileConfig::from_json(
            r#"{
                "ignore_undefined": true,
                "columns": {
                    "sex": {"type": "map", "table": {"m": 0, "f": 1}},
                    "dose": {"type": "float", "default": -1}
                },
                "groups": [
                    {
                        "fields": ["a", "b"],
                        "converter": {"type": "pipeline", "stages": [
                            {"type": "parallel", "converters": [{"type": "float"}, {"type": "float"}]},
                            {"type": "flatten"}
                        ]}
                    }
                ]
            }"#,
        )
        .expect("parse");
        let mut profile = config.build().expect("build");
        let records = vec![
            record([("sex", "m"), ("dose", "x"), ("a", "1"), ("b", "2"), ("note", "hi")]),
            record([("sex", "f"), ("dose", "2.5"), ("a", "3"), ("b", "4"), ("note", "yo")]),
        ];
        let output = profile.fit_transform(&records).expect("convert");
        assert_eq!(output[0]["sex"], Value::Int(0));
        assert_eq!(output[0]["dose"], Value::Float(-1.0));
        assert_eq!(output[1]["a"], Value::Float(3.0));
        assert_eq!(output[1]["b"], Value::Float(4.0));
        assert!(!output[0].contains_key("note"));
    }
}
