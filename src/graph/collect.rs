//! Collector state machines over the shared receive/flush/emit protocol.

use std::collections::BTreeMap;

use crate::error::{MorphError, Result};
use crate::graph::node::{Emission, Message};

/// Shared bookkeeping composed into every collector.
///
/// Scope changes are detected purely by counter comparison: a counter value
/// strictly greater than the last seen one opens a new scope; lower or equal
/// values always mean "still inside the same scope".
#[derive(Debug, Clone, Default)]
pub struct CollectBase {
    /// Outgoing name override; replaces the incoming name when present.
    pub name: Option<String>,
    /// Outgoing value override; replaces the computed value when present.
    pub value: Option<String>,
    /// Also reset state when the entity counter changes mid-record.
    pub same_entity: bool,
    /// Clear buffered state after each emission.
    pub reset_on_emit: bool,
    last_record: u64,
    last_entity: u64,
}

impl CollectBase {
    pub fn new(
        name: Option<String>,
        value: Option<String>,
        same_entity: bool,
        reset_on_emit: bool,
    ) -> Self {
        Self {
            name,
            value,
            same_entity,
            reset_on_emit,
            last_record: 0,
            last_entity: 0,
        }
    }

    /// Advance the last-seen counters; true when the message opened a new
    /// scope and the collector must clear its buffered state first.
    fn adjust_scope(&mut self, record: u64, entity: u64) -> bool {
        let new_scope =
            record > self.last_record || (self.same_entity && entity > self.last_entity);
        self.last_record = self.last_record.max(record);
        self.last_entity = self.last_entity.max(entity);
        new_scope
    }

    fn labeled(&self, name: &str, value: &str) -> Emission {
        Emission {
            name: self.name.clone().unwrap_or_else(|| name.to_string()),
            value: self.value.clone().unwrap_or_else(|| value.to_string()),
            trigger: true,
        }
    }

    fn clear_counters(&mut self) {
        self.last_record = 0;
        self.last_entity = 0;
    }
}

/// Emits a fixed name/value pair once any input has arrived in the scope.
///
/// Idempotent within a scope: it never re-emits until cleared. By default the
/// emission happens at scope close; with `eager` set it happens on the first
/// triggering input instead.
#[derive(Debug, Clone)]
pub struct AnyCollector {
    pub base: CollectBase,
    pub eager: bool,
    received: bool,
    emitted: bool,
}

impl AnyCollector {
    pub fn new(base: CollectBase, eager: bool) -> Self {
        Self {
            base,
            eager,
            received: false,
            emitted: false,
        }
    }

    pub fn receive(&mut self, msg: &Message) -> Vec<Emission> {
        if self.base.adjust_scope(msg.record, msg.entity) {
            self.clear();
        }
        self.received = true;
        if self.eager && msg.trigger && !self.emitted {
            self.emitted = true;
            let emission = self.base.labeled("", "true");
            if self.base.reset_on_emit {
                self.clear();
            }
            return vec![emission];
        }
        Vec::new()
    }

    pub fn flush(&mut self, record: u64, entity: u64) -> Vec<Emission> {
        if self.base.adjust_scope(record, entity) {
            // State belongs to an aborted scope.
            self.clear();
            return Vec::new();
        }
        if self.received && !self.emitted {
            self.emitted = true;
            let emission = self.base.labeled("", "true");
            if self.base.reset_on_emit {
                self.clear();
            }
            return vec![emission];
        }
        Vec::new()
    }

    pub fn clear(&mut self) {
        self.received = false;
        self.emitted = false;
    }

    pub fn reset(&mut self) {
        self.clear();
        self.base.clear_counters();
    }
}

/// Remembers the value from the lowest-priority-numbered source that fired in
/// the scope and emits it at flush. Priority is slot order; ties are won by
/// the earlier arrival.
#[derive(Debug, Clone)]
pub struct ChooseCollector {
    pub base: CollectBase,
    best: Option<(usize, String, String)>,
}

impl ChooseCollector {
    pub fn new(base: CollectBase) -> Self {
        Self { base, best: None }
    }

    pub fn receive(&mut self, msg: &Message) -> Vec<Emission> {
        if self.base.adjust_scope(msg.record, msg.entity) {
            self.best = None;
        }
        let better = match &self.best {
            None => true,
            Some((slot, _, _)) => msg.slot < *slot,
        };
        if better {
            self.best = Some((msg.slot, msg.name.clone(), msg.value.clone()));
        }
        Vec::new()
    }

    pub fn flush(&mut self, record: u64, entity: u64) -> Vec<Emission> {
        if self.base.adjust_scope(record, entity) {
            self.best = None;
            return Vec::new();
        }
        match self.best.take() {
            Some((_, name, value)) => vec![self.base.labeled(&name, &value)],
            None => Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        self.best = None;
        self.base.clear_counters();
    }
}

/// Pure pass-through relabeling node: forwards every received value
/// immediately with the overrides applied, preserving the trigger flag.
#[derive(Debug, Clone)]
pub struct GroupCollector {
    pub base: CollectBase,
}

impl GroupCollector {
    pub fn new(base: CollectBase) -> Self {
        Self { base }
    }

    pub fn receive(&mut self, msg: &Message) -> Vec<Emission> {
        let mut emission = self.base.labeled(&msg.name, &msg.value);
        emission.trigger = msg.trigger;
        vec![emission]
    }
}

/// Consumes values pairwise as inclusive integer bounds and expands each pair
/// by a signed increment at flush.
#[derive(Debug, Clone)]
pub struct RangeCollector {
    pub base: CollectBase,
    increment: i64,
    pending: Option<i64>,
    expanded: Vec<i64>,
}

impl RangeCollector {
    pub fn new(base: CollectBase, increment: i64) -> Self {
        Self {
            base,
            increment,
            pending: None,
            expanded: Vec::new(),
        }
    }

    pub fn receive(&mut self, msg: &Message) -> Result<Vec<Emission>> {
        if self.base.adjust_scope(msg.record, msg.entity) {
            self.clear();
        }
        let bound: i64 = msg.value.trim().parse().map_err(|_| {
            MorphError::Data(format!("range bound is not an integer: `{}`", msg.value))
        })?;
        match self.pending.take() {
            None => self.pending = Some(bound),
            Some(start) => self.expand(start, bound),
        }
        Ok(Vec::new())
    }

    pub fn flush(&mut self, record: u64, entity: u64) -> Vec<Emission> {
        if self.base.adjust_scope(record, entity) {
            self.clear();
            return Vec::new();
        }
        let emissions = self
            .expanded
            .iter()
            .map(|n| self.base.labeled("", &n.to_string()))
            .collect();
        self.clear();
        emissions
    }

    /// Expand `start..=end`, stepping by the configured increment. A bound
    /// pair pointing against the increment's direction produces nothing.
    fn expand(&mut self, start: i64, end: i64) {
        let mut current = start;
        if self.increment > 0 {
            while current <= end {
                self.expanded.push(current);
                current += self.increment;
            }
        } else {
            while current >= end {
                self.expanded.push(current);
                current += self.increment;
            }
        }
    }

    fn clear(&mut self) {
        self.pending = None;
        self.expanded.clear();
    }

    pub fn reset(&mut self) {
        self.clear();
        self.base.clear_counters();
    }
}

/// Buffers values, sorts them at flush and produces every ordered pair
/// `prefix + a + delimiter + b + postfix` with `a` before `b` in sorted
/// order, consuming the last element against all predecessors repeatedly.
#[derive(Debug, Clone)]
pub struct SquareCollector {
    pub base: CollectBase,
    prefix: String,
    delimiter: String,
    postfix: String,
    buffer: Vec<String>,
}

impl SquareCollector {
    pub fn new(base: CollectBase, prefix: String, delimiter: String, postfix: String) -> Self {
        Self {
            base,
            prefix,
            delimiter,
            postfix,
            buffer: Vec::new(),
        }
    }

    pub fn receive(&mut self, msg: &Message) -> Vec<Emission> {
        if self.base.adjust_scope(msg.record, msg.entity) {
            self.buffer.clear();
        }
        self.buffer.push(msg.value.clone());
        Vec::new()
    }

    pub fn flush(&mut self, record: u64, entity: u64) -> Vec<Emission> {
        if self.base.adjust_scope(record, entity) {
            self.buffer.clear();
            return Vec::new();
        }
        let mut values = std::mem::take(&mut self.buffer);
        values.sort_unstable();
        let mut emissions = Vec::new();
        while let Some(last) = values.pop() {
            for first in &values {
                let value = format!(
                    "{}{}{}{}{}",
                    self.prefix, first, self.delimiter, last, self.postfix
                );
                emissions.push(self.base.labeled("", &value));
            }
        }
        emissions
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.base.clear_counters();
    }
}

/// Groups received values by incoming name and emits the full cross product
/// across all name-groups (sorted by name) once at least `min_n` distinct
/// names have contributed.
#[derive(Debug, Clone)]
pub struct TuplesCollector {
    pub base: CollectBase,
    min_n: usize,
    separator: String,
    groups: BTreeMap<String, Vec<String>>,
}

impl TuplesCollector {
    pub fn new(base: CollectBase, min_n: usize, separator: String) -> Self {
        Self {
            base,
            min_n,
            separator,
            groups: BTreeMap::new(),
        }
    }

    pub fn receive(&mut self, msg: &Message) -> Vec<Emission> {
        if self.base.adjust_scope(msg.record, msg.entity) {
            self.groups.clear();
        }
        self.groups
            .entry(msg.name.clone())
            .or_default()
            .push(msg.value.clone());
        Vec::new()
    }

    pub fn flush(&mut self, record: u64, entity: u64) -> Vec<Emission> {
        if self.base.adjust_scope(record, entity) {
            self.groups.clear();
            return Vec::new();
        }
        if self.groups.len() < self.min_n {
            self.groups.clear();
            return Vec::new();
        }
        let mut combinations = vec![String::new()];
        for (index, values) in self.groups.values().enumerate() {
            let mut next = Vec::with_capacity(combinations.len() * values.len());
            for combination in &combinations {
                for value in values {
                    if index == 0 {
                        next.push(value.clone());
                    } else {
                        next.push(format!("{combination}{}{value}", self.separator));
                    }
                }
            }
            combinations = next;
        }
        self.groups.clear();
        combinations
            .iter()
            .map(|value| self.base.labeled("", value))
            .collect()
    }

    pub fn reset(&mut self) {
        self.groups.clear();
        self.base.clear_counters();
    }
}

/// Buffers one value per upstream source and emits only if, once every source
/// has reported, all reported values are pairwise equal. One verdict per fill
/// of the slots.
#[derive(Debug, Clone)]
pub struct EqualsFilterCollector {
    pub base: CollectBase,
    slots: Vec<Option<String>>,
}

impl EqualsFilterCollector {
    pub fn new(base: CollectBase, source_count: usize) -> Self {
        Self {
            base,
            slots: vec![None; source_count],
        }
    }

    pub fn receive(&mut self, msg: &Message) -> Vec<Emission> {
        if self.base.adjust_scope(msg.record, msg.entity) {
            self.clear();
        }
        if msg.slot < self.slots.len() {
            self.slots[msg.slot] = Some(msg.value.clone());
        }
        if !msg.trigger || self.slots.iter().any(Option::is_none) {
            return Vec::new();
        }
        let mut reported = self.slots.iter().flatten();
        let verdict = match reported.next() {
            Some(first) if reported.all(|value| value == first) => {
                vec![self.base.labeled("", first)]
            }
            _ => Vec::new(),
        };
        self.clear();
        verdict
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    pub fn reset(&mut self) {
        self.clear();
        self.base.clear_counters();
    }
}
