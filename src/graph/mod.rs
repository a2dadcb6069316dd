//! The rule-evaluation graph.
//!
//! Rules compile into an arena of [`Node`]s (`u32` ids). Values move through
//! the graph as [`Message`]s over an explicit work queue: a node's `receive`
//! or `flush` returns emissions, and the pump routes them onward, so no node
//! ever borrows another and each inbound event drives the entire reachable
//! subgraph synchronously before returning.

pub mod builder;
pub mod collect;
pub mod functions;
pub mod node;

use std::collections::VecDeque;

use crate::error::Result;
use crate::maps::Maps;
use crate::router::PathRouter;
use crate::tries::WildcardTrie;

pub use builder::GraphBuilder;
pub use node::{Emission, Message, Node, Receiver};

/// Unique identifier of a graph node.
pub type NodeId = u32;

/// A compiled rule-evaluation graph.
///
/// The routing tries are read-only after construction; all mutable state
/// (collector buffers, gates, stateful functions) lives inside the nodes and
/// belongs to this instance alone.
#[derive(Debug)]
pub struct CompiledGraph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) router: PathRouter,
    /// Collectors flushed at record close, nested ones first.
    pub(crate) record_flush: Vec<NodeId>,
    /// Collectors flushed when an entity whose path matches closes.
    pub(crate) entity_flush: WildcardTrie<NodeId>,
}

impl CompiledGraph {
    /// Number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of registered path patterns.
    pub fn pattern_count(&self) -> usize {
        self.router.pattern_count()
    }

    /// Route one literal to every bound source and drive the reachable
    /// subgraph. Emitted output literals are appended to `out`.
    pub(crate) fn dispatch(
        &mut self,
        path: &str,
        value: &str,
        record: u64,
        entity: u64,
        maps: &Maps,
        out: &mut Vec<(String, String)>,
    ) -> Result<()> {
        let mut queue: VecDeque<Message> = self
            .router
            .route(path)
            .into_iter()
            .map(|target| Message {
                target,
                slot: 0,
                name: path.to_string(),
                value: value.to_string(),
                trigger: true,
                record,
                entity,
            })
            .collect();
        self.pump(&mut queue, maps, out)
    }

    /// Flush every record-scoped collector, nested ones first.
    pub(crate) fn flush_record(
        &mut self,
        record: u64,
        entity: u64,
        maps: &Maps,
        out: &mut Vec<(String, String)>,
    ) -> Result<()> {
        let ids = self.record_flush.clone();
        self.flush_ids(&ids, record, entity, maps, out)
    }

    /// Flush collectors registered for the just-closed entity path.
    pub(crate) fn flush_entity(
        &mut self,
        path: &str,
        record: u64,
        entity: u64,
        maps: &Maps,
        out: &mut Vec<(String, String)>,
    ) -> Result<()> {
        let ids: Vec<NodeId> = self.entity_flush.get(path).into_iter().copied().collect();
        self.flush_ids(&ids, record, entity, maps, out)
    }

    /// Discard all per-instance mutable state.
    pub(crate) fn reset(&mut self) {
        for node in &mut self.nodes {
            node.reset();
        }
    }

    fn flush_ids(
        &mut self,
        ids: &[NodeId],
        record: u64,
        entity: u64,
        maps: &Maps,
        out: &mut Vec<(String, String)>,
    ) -> Result<()> {
        for &id in ids {
            let emissions = self.nodes[id as usize].flush(record, entity);
            let mut queue = VecDeque::new();
            self.route_emissions(id, emissions, record, entity, &mut queue, out);
            // Pump before the next flush so a downstream collector sees this
            // one's output before its own flush runs.
            self.pump(&mut queue, maps, out)?;
        }
        Ok(())
    }

    fn pump(
        &mut self,
        queue: &mut VecDeque<Message>,
        maps: &Maps,
        out: &mut Vec<(String, String)>,
    ) -> Result<()> {
        while let Some(msg) = queue.pop_front() {
            let emissions = self.nodes[msg.target as usize].receive(&msg, maps)?;
            self.route_emissions(msg.target, emissions, msg.record, msg.entity, queue, out);
        }
        Ok(())
    }

    fn route_emissions(
        &mut self,
        from: NodeId,
        emissions: Vec<Emission>,
        record: u64,
        entity: u64,
        queue: &mut VecDeque<Message>,
        out: &mut Vec<(String, String)>,
    ) {
        let receiver = self.nodes[from as usize].receiver;
        for emission in emissions {
            match receiver {
                // Non-triggering values are bookkeeping for collectors; they
                // never reach the output directly.
                Receiver::Output if !emission.trigger => {}
                Receiver::Output => out.push((emission.name, emission.value)),
                Receiver::Node { id, slot } => queue.push_back(Message {
                    target: id,
                    slot,
                    name: emission.name,
                    value: emission.value,
                    trigger: emission.trigger,
                    record,
                    entity,
                }),
                Receiver::Gate(id) => self.nodes[id as usize].fire_gate(record),
            }
        }
    }
}
