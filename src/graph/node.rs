//! Graph nodes and the messages passed between them.

use crate::error::Result;
use crate::graph::collect::{
    AnyCollector, ChooseCollector, EqualsFilterCollector, GroupCollector, RangeCollector,
    SquareCollector, TuplesCollector,
};
use crate::graph::functions::Function;
use crate::graph::NodeId;
use crate::maps::Maps;

/// A named value travelling through the graph.
///
/// Every message carries the record/entity counters valid at the moment of
/// delivery; nodes use counter comparison, not event callbacks, to detect
/// scope changes. `slot` identifies the upstream source edge at the target
/// (registration order, which doubles as `Choose` priority). `trigger` is
/// false for values from a gated source whose condition has not fired yet:
/// such values are recorded but must not trigger emission.
#[derive(Debug, Clone)]
pub struct Message {
    pub target: NodeId,
    pub slot: usize,
    pub name: String,
    pub value: String,
    pub trigger: bool,
    pub record: u64,
    pub entity: u64,
}

/// A name/value pair leaving a node, routed through the node's receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub name: String,
    pub value: String,
    pub trigger: bool,
}

/// Where a node's emissions go. Every node has exactly one current receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// Another node in the arena, reached over the given source slot.
    Node { id: NodeId, slot: usize },
    /// The gate of a conditional source: emissions open it instead of
    /// carrying a value onward.
    Gate(NodeId),
    /// The engine output: emitted as a downstream literal.
    Output,
}

/// Gate state of a conditional source (short-circuit AND over two sources).
#[derive(Debug, Clone, Copy, Default)]
pub struct GateState {
    fired: bool,
    record: u64,
}

impl GateState {
    pub fn fire(&mut self, record: u64) {
        self.fired = true;
        self.record = record;
    }

    /// Open only if the condition fired within the same record.
    fn is_open(&self, record: u64) -> bool {
        self.fired && self.record == record
    }

    fn reset(&mut self) {
        self.fired = false;
        self.record = 0;
    }
}

/// A pattern-bound source: applies its function chain and overrides to every
/// routed literal, then forwards the result.
#[derive(Debug)]
pub struct DataNode {
    pub name: Option<String>,
    pub value: Option<String>,
    pub functions: Vec<Function>,
    pub gate: Option<GateState>,
}

impl DataNode {
    pub fn receive(&mut self, msg: &Message, maps: &Maps) -> Result<Vec<Emission>> {
        let mut value = msg.value.clone();
        for function in &mut self.functions {
            match function.apply(&value, maps, msg.record)? {
                Some(transformed) => value = transformed,
                None => return Ok(Vec::new()),
            }
        }
        let name = self.name.clone().unwrap_or_else(|| msg.name.clone());
        let value = self.value.clone().unwrap_or(value);
        let open = match &self.gate {
            None => true,
            Some(gate) => gate.is_open(msg.record),
        };
        Ok(vec![Emission {
            name,
            value,
            trigger: msg.trigger && open,
        }])
    }

    fn reset(&mut self) {
        for function in &mut self.functions {
            function.reset();
        }
        if let Some(gate) = &mut self.gate {
            gate.reset();
        }
    }
}

/// The polymorphic node payload; see spec'd collector variants in
/// [`crate::graph::collect`].
#[derive(Debug)]
pub enum NodeKind {
    Data(DataNode),
    Any(AnyCollector),
    Choose(ChooseCollector),
    Group(GroupCollector),
    Range(RangeCollector),
    Square(SquareCollector),
    Tuples(TuplesCollector),
    EqualsFilter(EqualsFilterCollector),
}

/// One node of the rule-evaluation graph.
#[derive(Debug)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub receiver: Receiver,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, receiver: Receiver) -> Self {
        Self { id, kind, receiver }
    }

    /// Deliver one message; returns the node's emissions.
    pub fn receive(&mut self, msg: &Message, maps: &Maps) -> Result<Vec<Emission>> {
        match &mut self.kind {
            NodeKind::Data(data) => data.receive(msg, maps),
            NodeKind::Any(collector) => Ok(collector.receive(msg)),
            NodeKind::Choose(collector) => Ok(collector.receive(msg)),
            NodeKind::Group(collector) => Ok(collector.receive(msg)),
            NodeKind::Range(collector) => collector.receive(msg),
            NodeKind::Square(collector) => Ok(collector.receive(msg)),
            NodeKind::Tuples(collector) => Ok(collector.receive(msg)),
            NodeKind::EqualsFilter(collector) => Ok(collector.receive(msg)),
        }
    }

    /// Forced evaluation at a scope boundary.
    pub fn flush(&mut self, record: u64, entity: u64) -> Vec<Emission> {
        match &mut self.kind {
            NodeKind::Any(collector) => collector.flush(record, entity),
            NodeKind::Choose(collector) => collector.flush(record, entity),
            NodeKind::Range(collector) => collector.flush(record, entity),
            NodeKind::Square(collector) => collector.flush(record, entity),
            NodeKind::Tuples(collector) => collector.flush(record, entity),
            // Data sources, groups and the eager equals filter hold no
            // flushable state.
            NodeKind::Data(_) | NodeKind::Group(_) | NodeKind::EqualsFilter(_) => Vec::new(),
        }
    }

    /// Open this node's condition gate (conditional sources only).
    pub fn fire_gate(&mut self, record: u64) {
        if let NodeKind::Data(data) = &mut self.kind {
            if let Some(gate) = &mut data.gate {
                gate.fire(record);
            }
        }
    }

    /// Discard all buffered state (stream reset).
    pub fn reset(&mut self) {
        match &mut self.kind {
            NodeKind::Data(data) => data.reset(),
            NodeKind::Any(collector) => collector.reset(),
            NodeKind::Choose(collector) => collector.reset(),
            NodeKind::Group(_) => {}
            NodeKind::Range(collector) => collector.reset(),
            NodeKind::Square(collector) => collector.reset(),
            NodeKind::Tuples(collector) => collector.reset(),
            NodeKind::EqualsFilter(collector) => collector.reset(),
        }
    }
}
