//! The transformation engine driving a compiled graph with stream events.

use tracing::{trace, warn};

use crate::definition::MorphDef;
use crate::error::Result;
use crate::event::StreamReceiver;
use crate::graph::{CompiledGraph, GraphBuilder};
use crate::maps::{LookupTable, Maps};

/// Reserved path under which the record identifier is dispatched.
pub const ID_PATH: &str = "_id";

/// A metadata transformation engine.
///
/// Consumes one ordered stream of record events, routes literal paths through
/// the compiled pattern tries to the bound rule graph, and forwards the
/// transformed stream to `R`. Strictly single-threaded and synchronous: each
/// inbound event drives the entire reachable subgraph before returning.
///
/// Record and entity counters increase monotonically for the lifetime of the
/// engine and are zeroed only by [`reset_stream`](StreamReceiver::reset_stream);
/// graph nodes detect scope changes by comparing them.
#[derive(Debug)]
pub struct Metamorph<R: StreamReceiver> {
    graph: CompiledGraph,
    maps: Maps,
    record_count: u64,
    entity_count: u64,
    in_record: bool,
    closed: bool,
    entity_stack: Vec<String>,
    downstream: R,
}

impl<R: StreamReceiver> Metamorph<R> {
    /// Compile `def` and attach `downstream` as the receiver of the
    /// transformed stream.
    pub fn new(def: &MorphDef, downstream: R) -> Result<Self> {
        let (graph, maps) = GraphBuilder::build(def)?;
        Ok(Self {
            graph,
            maps,
            record_count: 0,
            entity_count: 0,
            in_record: false,
            closed: false,
            entity_stack: Vec::new(),
            downstream,
        })
    }

    /// Compile a YAML definition; see [`MorphDef::from_yaml`].
    pub fn from_yaml(source: &str, downstream: R) -> Result<Self> {
        Self::new(&MorphDef::from_yaml(source)?, downstream)
    }

    /// Register an externally supplied lookup table, replacing any inline
    /// table of the same name.
    pub fn put_map(&mut self, name: impl Into<String>, table: Box<dyn LookupTable>) {
        self.maps.insert(name, table);
    }

    /// The downstream receiver.
    pub fn downstream(&self) -> &R {
        &self.downstream
    }

    pub fn downstream_mut(&mut self) -> &mut R {
        &mut self.downstream
    }

    /// Tear the engine apart, returning the downstream receiver.
    pub fn into_downstream(self) -> R {
        self.downstream
    }

    /// Current record count (diagnostics).
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    fn current_path(&self, name: &str) -> String {
        if self.entity_stack.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.entity_stack.join("."), name)
        }
    }

    fn dispatch(&mut self, path: &str, value: &str) -> Result<()> {
        trace!(path, "dispatching literal");
        let mut out = Vec::new();
        self.graph.dispatch(
            path,
            value,
            self.record_count,
            self.entity_count,
            &self.maps,
            &mut out,
        )?;
        self.forward(out)
    }

    fn flush_record_scope(&mut self) -> Result<()> {
        let mut out = Vec::new();
        self.graph
            .flush_record(self.record_count, self.entity_count, &self.maps, &mut out)?;
        self.forward(out)
    }

    fn forward(&mut self, out: Vec<(String, String)>) -> Result<()> {
        for (name, value) in out {
            self.downstream.literal(&name, &value)?;
        }
        Ok(())
    }
}

impl<R: StreamReceiver> StreamReceiver for Metamorph<R> {
    fn start_record(&mut self, identifier: &str) -> Result<()> {
        if self.in_record {
            // Corrective start-record from upstream: abort the unfinished
            // record without flushing it.
            warn!(identifier, "start-record while in record, aborting previous record");
            self.entity_stack.clear();
        }
        self.record_count += 1;
        self.in_record = true;
        self.downstream.start_record(identifier)?;
        self.dispatch(ID_PATH, identifier)
    }

    fn end_record(&mut self) -> Result<()> {
        if !self.in_record {
            warn!("end-record outside of a record, ignoring");
            return Ok(());
        }
        self.entity_stack.clear();
        self.flush_record_scope()?;
        self.in_record = false;
        self.downstream.end_record()
    }

    fn start_entity(&mut self, name: &str) -> Result<()> {
        if !self.in_record {
            warn!(name, "start-entity outside of a record, ignoring");
            return Ok(());
        }
        self.entity_count += 1;
        self.entity_stack.push(name.to_string());
        Ok(())
    }

    fn end_entity(&mut self) -> Result<()> {
        if self.entity_stack.is_empty() {
            warn!("end-entity outside of an entity, ignoring");
            return Ok(());
        }
        let path = self.entity_stack.join(".");
        let mut out = Vec::new();
        self.graph.flush_entity(
            &path,
            self.record_count,
            self.entity_count,
            &self.maps,
            &mut out,
        )?;
        self.forward(out)?;
        self.entity_stack.pop();
        Ok(())
    }

    fn literal(&mut self, name: &str, value: &str) -> Result<()> {
        if !self.in_record {
            warn!(name, "literal outside of a record, ignoring");
            return Ok(());
        }
        let path = self.current_path(name);
        self.dispatch(&path, value)
    }

    fn reset_stream(&mut self) -> Result<()> {
        self.record_count = 0;
        self.entity_count = 0;
        self.in_record = false;
        self.closed = false;
        self.entity_stack.clear();
        self.graph.reset();
        self.downstream.reset_stream()
    }

    fn close_stream(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.in_record {
            // One final flush pass for the record left open by upstream.
            self.entity_stack.clear();
            self.flush_record_scope()?;
            self.in_record = false;
            self.downstream.end_record()?;
        }
        self.downstream.close_stream()
    }
}
