//! Declarative transformation definitions.
//!
//! A [`MorphDef`] is the serde form of a rule document: named lookup tables,
//! `$[name]` variables, and a tree of rules. It is compiled once into the
//! trie/graph structures by [`crate::graph::GraphBuilder`]; afterwards the
//! definition plays no further role at runtime.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{MorphError, Result};

/// A complete transformation definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MorphDef {
    /// Variables substituted into `$[name]` references at compile time.
    #[serde(default)]
    pub vars: HashMap<String, String>,
    /// Named lookup tables available to `lookup` functions.
    #[serde(default)]
    pub maps: HashMap<String, MapDef>,
    /// Top-level rules; their output goes straight downstream.
    ///
    /// Rules are written as plain single-key maps (`- data: {...}`); the
    /// adapter below covers the nested `sources`, `functions` and `condition`
    /// enums too, and is format-agnostic, so JSON input parses identically.
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub rules: Vec<RuleDef>,
}

impl MorphDef {
    /// Parse a definition from YAML.
    pub fn from_yaml(source: &str) -> Result<Self> {
        serde_yaml::from_str(source).map_err(|e| MorphError::Definition(e.to_string()))
    }

    /// Parse a definition from JSON.
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|e| MorphError::Definition(e.to_string()))
    }
}

/// An inline lookup table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapDef {
    #[serde(default)]
    pub entries: HashMap<String, String>,
    /// Value returned for missing keys, if any.
    #[serde(default)]
    pub default: Option<String>,
}

/// One rule: either a pattern-bound data source or a collector over nested
/// sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleDef {
    Data(DataDef),
    Any(CollectDef),
    Choose(CollectDef),
    Group(CollectDef),
    Range(CollectDef),
    Square(CollectDef),
    Tuples(CollectDef),
    EqualsFilter(CollectDef),
}

/// A data source bound to a path pattern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataDef {
    /// Path pattern this source is bound to (`?`, `*`, `[abc]`, `|`).
    pub source: String,
    /// Outgoing name override.
    #[serde(default)]
    pub name: Option<String>,
    /// Outgoing value override.
    #[serde(default)]
    pub value: Option<String>,
    /// Value functions applied in order before forwarding.
    #[serde(default)]
    pub functions: Vec<FunctionDef>,
    /// Condition source gating this one: until it fires within the record,
    /// values are forwarded without triggering emission.
    #[serde(default)]
    pub condition: Option<Box<DataDef>>,
}

/// Attributes shared by all collector rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectDef {
    /// Outgoing name override (required for all collectors except `group`).
    #[serde(default)]
    pub name: Option<String>,
    /// Outgoing value override.
    #[serde(default)]
    pub value: Option<String>,
    /// Upstream sources; their order defines slot numbers and thereby
    /// `choose` priority.
    #[serde(default)]
    pub sources: Vec<RuleDef>,
    /// Reset buffered state whenever the entity counter changes mid-record.
    #[serde(default)]
    pub same_entity: bool,
    /// Clear buffered state after each emission.
    #[serde(default)]
    pub reset: bool,
    /// Emit as soon as the completeness predicate is met instead of waiting
    /// for a scope boundary (`any` only).
    #[serde(default)]
    pub eager: bool,
    /// `"record"` (the default) or an entity path pattern to flush at.
    #[serde(default)]
    pub flush_with: Option<String>,

    /// `range`: signed step between expanded integers; must not be zero.
    #[serde(default)]
    pub increment: Option<i64>,
    /// `square`: pair formatting.
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub delimiter: Option<String>,
    #[serde(default)]
    pub postfix: Option<String>,
    /// `tuples`: minimum number of distinct contributing names.
    #[serde(default)]
    pub min_n: Option<usize>,
    /// `tuples`: separator joining the cross product.
    #[serde(default)]
    pub separator: Option<String>,
}

/// One value function of a data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionDef {
    Constant { value: String },
    Upcase,
    Downcase,
    Trim,
    Replace { pattern: String, with: String },
    Regexp { pattern: String, format: Option<String> },
    Lookup { map: String, default: Option<String> },
    Count,
}

/// Substitute `$[name]` references in `input` from `vars`.
///
/// An unresolved reference aborts graph construction.
pub fn resolve(input: &str, vars: &HashMap<String, String>) -> Result<String> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("$[") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find(']')
            .ok_or_else(|| MorphError::Variable(after.to_string()))?;
        let name = &after[..end];
        let value = vars
            .get(name)
            .ok_or_else(|| MorphError::Variable(name.to_string()))?;
        output.push_str(value);
        rest = &after[end + 1..];
    }
    output.push_str(rest);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_variables() {
        let mut vars = HashMap::new();
        vars.insert("field".to_string(), "title".to_string());
        vars.insert("out".to_string(), "dc.title".to_string());

        assert_eq!(
            resolve("record.$[field].value", &vars).unwrap(),
            "record.title.value"
        );
        assert_eq!(resolve("$[field]-$[out]", &vars).unwrap(), "title-dc.title");
        assert_eq!(resolve("no refs", &vars).unwrap(), "no refs");
    }

    #[test]
    fn test_unresolved_variable_fails() {
        let vars = HashMap::new();
        assert!(matches!(
            resolve("a.$[missing]", &vars),
            Err(MorphError::Variable(_))
        ));
        assert!(matches!(
            resolve("a.$[unclosed", &vars),
            Err(MorphError::Variable(_))
        ));
    }

    #[test]
    fn test_from_yaml_full_definition() {
        let def = MorphDef::from_yaml(
            r#"
vars:
  base: person
maps:
  codes:
    entries: { a: Audio }
    default: Unknown
rules:
  - data:
      source: "$[base].name"
      name: fullName
      functions:
        - trim
        - upcase
  - choose:
      name: date
      sources:
        - data: { source: exactDate }
        - data: { source: approxDate }
"#,
        )
        .unwrap();

        assert_eq!(def.vars.get("base").map(String::as_str), Some("person"));
        assert_eq!(
            def.maps["codes"].default.as_deref(),
            Some("Unknown")
        );
        assert_eq!(def.rules.len(), 2);
        match &def.rules[0] {
            RuleDef::Data(data) => {
                assert_eq!(data.source, "$[base].name");
                assert_eq!(data.functions.len(), 2);
            }
            other => panic!("expected data rule, got {other:?}"),
        }
        match &def.rules[1] {
            RuleDef::Choose(collect) => assert_eq!(collect.sources.len(), 2),
            other => panic!("expected choose rule, got {other:?}"),
        }
    }

    #[test]
    fn test_rules_parse_as_plain_single_key_maps() {
        // No YAML `!tag` syntax anywhere: every rule, nested source and
        // function is a plain map (or bare string for unit functions).
        let def = MorphDef::from_yaml(
            r#"
rules:
  - data: { source: a.b }
  - any:
      name: seen
      sources:
        - data: { source: c, functions: [trim] }
  - range:
      name: n
      increment: 2
      sources:
        - data: { source: d }
"#,
        )
        .unwrap();

        assert_eq!(def.rules.len(), 3);
        assert!(matches!(def.rules[0], RuleDef::Data(_)));
        match &def.rules[1] {
            RuleDef::Any(collect) => match &collect.sources[0] {
                RuleDef::Data(data) => {
                    assert!(matches!(data.functions[0], FunctionDef::Trim));
                }
                other => panic!("expected data source, got {other:?}"),
            },
            other => panic!("expected any rule, got {other:?}"),
        }
        match &def.rules[2] {
            RuleDef::Range(collect) => assert_eq!(collect.increment, Some(2)),
            other => panic!("expected range rule, got {other:?}"),
        }
    }

    #[test]
    fn test_from_json() {
        let def = MorphDef::from_json(
            r#"{"rules": [{"data": {"source": "a.b", "name": "x"}}]}"#,
        )
        .unwrap();
        assert_eq!(def.rules.len(), 1);
    }

    #[test]
    fn test_malformed_definition_is_rejected() {
        assert!(matches!(
            MorphDef::from_yaml("rules: {not: a list}"),
            Err(MorphError::Definition(_))
        ));
        assert!(matches!(
            MorphDef::from_yaml("rules:\n  - data: {sauce: typo}"),
            Err(MorphError::Definition(_))
        ));
    }

    #[test]
    fn test_condition_nests() {
        let def = MorphDef::from_yaml(
            r#"
rules:
  - data:
      source: a.b
      condition: { source: a.marker }
"#,
        )
        .unwrap();
        match &def.rules[0] {
            RuleDef::Data(data) => {
                assert_eq!(data.condition.as_ref().unwrap().source, "a.marker");
            }
            other => panic!("expected data rule, got {other:?}"),
        }
    }
}
