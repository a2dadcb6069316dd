//! Compilation of declarative definitions into the arena graph.

use std::collections::HashMap;

use regex::Regex;
use tracing::debug;

use crate::definition::{resolve, CollectDef, DataDef, FunctionDef, MapDef, MorphDef, RuleDef};
use crate::error::{MorphError, Result};
use crate::graph::collect::{
    AnyCollector, ChooseCollector, CollectBase, EqualsFilterCollector, GroupCollector,
    RangeCollector, SquareCollector, TuplesCollector,
};
use crate::graph::functions::{CaseMode, Function};
use crate::graph::node::{DataNode, GateState, Node, NodeKind, Receiver};
use crate::graph::{CompiledGraph, NodeId};
use crate::maps::{InMemoryMap, Maps};
use crate::router::PathRouter;
use crate::tries::WildcardTrie;

/// The collector variants, used for validation messages and construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Any,
    Choose,
    Group,
    Range,
    Square,
    Tuples,
    EqualsFilter,
}

impl Variant {
    fn label(self) -> &'static str {
        match self {
            Variant::Any => "any",
            Variant::Choose => "choose",
            Variant::Group => "group",
            Variant::Range => "range",
            Variant::Square => "square",
            Variant::Tuples => "tuples",
            Variant::EqualsFilter => "equals_filter",
        }
    }

    /// Whether the variant holds buffered state that flushes at a scope
    /// boundary.
    fn flushes(self) -> bool {
        !matches!(self, Variant::Group | Variant::EqualsFilter)
    }
}

/// Builds a [`CompiledGraph`] from a definition, failing fast on the first
/// invalid rule so that no partial graph is ever observable.
#[derive(Debug)]
pub struct GraphBuilder<'a> {
    vars: &'a HashMap<String, String>,
    nodes: Vec<Node>,
    router: PathRouter,
    record_flush: Vec<NodeId>,
    entity_flush: WildcardTrie<NodeId>,
}

impl<'a> GraphBuilder<'a> {
    /// Compile `def` into a graph and its lookup tables.
    pub fn build(def: &MorphDef) -> Result<(CompiledGraph, Maps)> {
        if def.rules.is_empty() {
            return Err(MorphError::Build(
                "definition contains no rules".to_string(),
            ));
        }
        let maps = compile_maps(&def.maps);
        let mut builder = GraphBuilder {
            vars: &def.vars,
            nodes: Vec::new(),
            router: PathRouter::new(),
            record_flush: Vec::new(),
            entity_flush: WildcardTrie::new(),
        };
        for rule in &def.rules {
            builder.add_rule(rule, Receiver::Output)?;
        }
        let GraphBuilder {
            nodes,
            router,
            record_flush,
            entity_flush,
            ..
        } = builder;
        debug!(
            nodes = nodes.len(),
            patterns = router.pattern_count(),
            "compiled transformation graph"
        );
        Ok((
            CompiledGraph {
                nodes,
                router,
                record_flush,
                entity_flush,
            },
            maps,
        ))
    }

    fn add_rule(&mut self, rule: &RuleDef, receiver: Receiver) -> Result<NodeId> {
        match rule {
            RuleDef::Data(def) => self.add_data(def, receiver),
            RuleDef::Any(def) => self.add_collect(Variant::Any, def, receiver),
            RuleDef::Choose(def) => self.add_collect(Variant::Choose, def, receiver),
            RuleDef::Group(def) => self.add_collect(Variant::Group, def, receiver),
            RuleDef::Range(def) => self.add_collect(Variant::Range, def, receiver),
            RuleDef::Square(def) => self.add_collect(Variant::Square, def, receiver),
            RuleDef::Tuples(def) => self.add_collect(Variant::Tuples, def, receiver),
            RuleDef::EqualsFilter(def) => self.add_collect(Variant::EqualsFilter, def, receiver),
        }
    }

    fn add_data(&mut self, def: &DataDef, receiver: Receiver) -> Result<NodeId> {
        let source = resolve(&def.source, self.vars)?;
        if source.is_empty() {
            return Err(MorphError::Build(
                "data rule has an empty source pattern".to_string(),
            ));
        }
        let functions = def
            .functions
            .iter()
            .map(|f| self.compile_function(f))
            .collect::<Result<Vec<_>>>()?;
        let gate = def.condition.as_ref().map(|_| GateState::default());
        let data = DataNode {
            name: self.resolve_opt(&def.name)?,
            value: self.resolve_opt(&def.value)?,
            functions,
            gate,
        };
        let id = self.push(NodeKind::Data(data), receiver);
        self.router.register(&source, id)?;
        if let Some(condition) = &def.condition {
            // The condition source feeds the gate, not the value path.
            self.add_data(condition, Receiver::Gate(id))?;
        }
        Ok(id)
    }

    fn add_collect(
        &mut self,
        variant: Variant,
        def: &CollectDef,
        receiver: Receiver,
    ) -> Result<NodeId> {
        let label = variant.label();
        let name = self.resolve_opt(&def.name)?;
        if name.is_none() && variant != Variant::Group {
            return Err(MorphError::Build(format!(
                "`{label}` collector requires a name"
            )));
        }
        if def.sources.is_empty() {
            return Err(MorphError::Build(format!(
                "`{label}` collector has no sources"
            )));
        }
        if def.eager && variant != Variant::Any {
            return Err(MorphError::Build(format!(
                "`{label}` collector does not support `eager`"
            )));
        }
        let base = CollectBase::new(name, self.resolve_opt(&def.value)?, def.same_entity, def.reset);

        let kind = match variant {
            Variant::Any => NodeKind::Any(AnyCollector::new(base, def.eager)),
            Variant::Choose => NodeKind::Choose(ChooseCollector::new(base)),
            Variant::Group => NodeKind::Group(GroupCollector::new(base)),
            Variant::Range => {
                let increment = def.increment.unwrap_or(1);
                if increment == 0 {
                    return Err(MorphError::Build(
                        "`range` increment must not be zero".to_string(),
                    ));
                }
                NodeKind::Range(RangeCollector::new(base, increment))
            }
            Variant::Square => NodeKind::Square(SquareCollector::new(
                base,
                self.resolve_or_default(&def.prefix)?,
                self.resolve_or_default(&def.delimiter)?,
                self.resolve_or_default(&def.postfix)?,
            )),
            Variant::Tuples => {
                let min_n = def.min_n.unwrap_or(1);
                if min_n == 0 {
                    return Err(MorphError::Build(
                        "`tuples` min_n must be at least 1".to_string(),
                    ));
                }
                NodeKind::Tuples(TuplesCollector::new(
                    base,
                    min_n,
                    self.resolve_or_default(&def.separator)?,
                ))
            }
            Variant::EqualsFilter => {
                NodeKind::EqualsFilter(EqualsFilterCollector::new(base, def.sources.len()))
            }
        };
        let id = self.push(kind, receiver);

        for (slot, source) in def.sources.iter().enumerate() {
            self.add_rule(source, Receiver::Node { id, slot })?;
        }

        // Flush wiring happens after the sources so that nested collectors
        // flush before this one at record close.
        if variant.flushes() {
            match def.flush_with.as_deref() {
                None | Some("record") => self.record_flush.push(id),
                Some(pattern) => {
                    let pattern = resolve(pattern, self.vars)?;
                    self.entity_flush.put(&pattern, id);
                }
            }
        } else if def.flush_with.is_some() {
            return Err(MorphError::Build(format!(
                "`{label}` collector does not support `flush_with`"
            )));
        }
        Ok(id)
    }

    fn compile_function(&self, def: &FunctionDef) -> Result<Function> {
        Ok(match def {
            FunctionDef::Constant { value } => Function::Constant {
                value: resolve(value, self.vars)?,
            },
            FunctionDef::Upcase => Function::Case {
                mode: CaseMode::Upper,
            },
            FunctionDef::Downcase => Function::Case {
                mode: CaseMode::Lower,
            },
            FunctionDef::Trim => Function::Trim,
            FunctionDef::Replace { pattern, with } => Function::Replace {
                pattern: self.compile_regex(pattern)?,
                with: resolve(with, self.vars)?,
            },
            FunctionDef::Regexp { pattern, format } => Function::Regexp {
                pattern: self.compile_regex(pattern)?,
                format: self.resolve_opt(format)?,
            },
            // Tables may be registered on the engine after construction, so
            // map names resolve at apply time, not here.
            FunctionDef::Lookup { map, default } => Function::Lookup {
                map: resolve(map, self.vars)?,
                default: self.resolve_opt(default)?,
            },
            FunctionDef::Count => Function::count(),
        })
    }

    fn compile_regex(&self, pattern: &str) -> Result<Regex> {
        let resolved = resolve(pattern, self.vars)?;
        Regex::new(&resolved).map_err(|_| MorphError::InvalidRegex(resolved))
    }

    fn resolve_opt(&self, value: &Option<String>) -> Result<Option<String>> {
        value
            .as_deref()
            .map(|v| resolve(v, self.vars))
            .transpose()
    }

    fn resolve_or_default(&self, value: &Option<String>) -> Result<String> {
        Ok(self.resolve_opt(value)?.unwrap_or_default())
    }

    fn push(&mut self, kind: NodeKind, receiver: Receiver) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node::new(id, kind, receiver));
        id
    }
}

fn compile_maps(defs: &HashMap<String, MapDef>) -> Maps {
    let mut maps = Maps::new();
    for (name, def) in defs {
        let mut table = match &def.default {
            Some(default) => InMemoryMap::with_default(default.clone()),
            None => InMemoryMap::new(),
        };
        for (key, value) in &def.entries {
            table.insert(key.clone(), value.clone());
        }
        maps.insert(name.clone(), Box::new(table));
    }
    maps
}
