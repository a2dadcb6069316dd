//! Value functions applied in-order inside data sources.

use regex::Regex;

use crate::error::{MorphError, Result};
use crate::maps::Maps;

/// Letter-case target for [`Function::Case`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    Upper,
    Lower,
}

/// One step of a data source's value pipeline.
///
/// Functions are applied in registration order. A function returning `None`
/// filters the value out of the graph entirely; `Count` is the one stateful
/// variant and resets itself by record-counter comparison.
#[derive(Debug, Clone)]
pub enum Function {
    /// Replace the value with a constant.
    Constant { value: String },
    /// Upper- or lower-case the value.
    Case { mode: CaseMode },
    /// Strip leading and trailing whitespace.
    Trim,
    /// Replace every occurrence of `pattern` with `with` (group references
    /// like `$1` are expanded).
    Replace { pattern: Regex, with: String },
    /// Keep only values matching `pattern`. Without a `format` the whole
    /// match is forwarded; with one, `${1}`-style group references in it are
    /// expanded.
    Regexp {
        pattern: Regex,
        format: Option<String>,
    },
    /// Substitute the value through a named lookup table. Misses fall back to
    /// the table default, then `default`, then filter the value out.
    Lookup {
        map: String,
        default: Option<String>,
    },
    /// Number of values this source has seen in the current record.
    Count { count: u64, last_record: u64 },
}

impl Function {
    /// Create a fresh `Count` function.
    pub fn count() -> Self {
        Function::Count {
            count: 0,
            last_record: 0,
        }
    }

    /// Apply this function to `value`, returning the transformed value or
    /// `None` to filter it out.
    pub fn apply(&mut self, value: &str, maps: &Maps, record: u64) -> Result<Option<String>> {
        match self {
            Function::Constant { value: constant } => Ok(Some(constant.clone())),
            Function::Case { mode: CaseMode::Upper } => Ok(Some(value.to_uppercase())),
            Function::Case { mode: CaseMode::Lower } => Ok(Some(value.to_lowercase())),
            Function::Trim => Ok(Some(value.trim().to_string())),
            Function::Replace { pattern, with } => {
                Ok(Some(pattern.replace_all(value, with.as_str()).into_owned()))
            }
            Function::Regexp { pattern, format } => match pattern.captures(value) {
                None => Ok(None),
                Some(captures) => match format {
                    None => Ok(captures.get(0).map(|m| m.as_str().to_string())),
                    Some(format) => {
                        let mut expanded = String::new();
                        captures.expand(format, &mut expanded);
                        Ok(Some(expanded))
                    }
                },
            },
            Function::Lookup { map, default } => {
                let table = maps
                    .get(map)
                    .ok_or_else(|| MorphError::UnknownMap(map.clone()))?;
                Ok(table
                    .lookup(value)
                    .map(str::to_string)
                    .or_else(|| default.clone()))
            }
            Function::Count { count, last_record } => {
                if record > *last_record {
                    *count = 0;
                    *last_record = record;
                }
                *count += 1;
                Ok(Some(count.to_string()))
            }
        }
    }

    /// Clear stateful bookkeeping (stream reset).
    pub fn reset(&mut self) {
        if let Function::Count { count, last_record } = self {
            *count = 0;
            *last_record = 0;
        }
    }
}
