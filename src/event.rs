//! The stream-event protocol shared by every stage of a pipeline.

use crate::error::Result;

/// Receiver of a flat stream of hierarchical record events.
///
/// A well-formed stream is `start_record (start_entity* literal* end_entity*)*
/// end_record` repeated, followed by `close_stream`. Receivers must recover
/// from a `start_record` arriving while a record is still open: upstream
/// modules occasionally emit a corrective `start_record` mid-stream, and this
/// aborts the unfinished record rather than raising an error.
///
/// All methods return `Result` so data errors propagate synchronously to the
/// caller of the triggering event.
pub trait StreamReceiver {
    fn start_record(&mut self, identifier: &str) -> Result<()>;
    fn end_record(&mut self) -> Result<()>;
    fn start_entity(&mut self, name: &str) -> Result<()>;
    fn end_entity(&mut self) -> Result<()>;
    fn literal(&mut self, name: &str, value: &str) -> Result<()>;

    /// Discard all buffered state; propagated transitively downstream.
    fn reset_stream(&mut self) -> Result<()> {
        Ok(())
    }

    /// Flush remaining state and close; propagated transitively downstream.
    fn close_stream(&mut self) -> Result<()> {
        Ok(())
    }
}

/// One recorded stream event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    StartRecord(String),
    EndRecord,
    StartEntity(String),
    EndEntity,
    Literal { name: String, value: String },
    ResetStream,
    CloseStream,
}

/// A receiver that records every event it sees.
///
/// Useful as the downstream end of a pipeline in tests and while debugging
/// rule definitions.
#[derive(Debug, Default)]
pub struct EventList {
    pub events: Vec<Event>,
}

impl EventList {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `(name, value)` pairs of all recorded literals, in order.
    pub fn literals(&self) -> Vec<(&str, &str)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Literal { name, value } => Some((name.as_str(), value.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Number of recorded events of any kind.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl StreamReceiver for EventList {
    fn start_record(&mut self, identifier: &str) -> Result<()> {
        self.events.push(Event::StartRecord(identifier.to_string()));
        Ok(())
    }

    fn end_record(&mut self) -> Result<()> {
        self.events.push(Event::EndRecord);
        Ok(())
    }

    fn start_entity(&mut self, name: &str) -> Result<()> {
        self.events.push(Event::StartEntity(name.to_string()));
        Ok(())
    }

    fn end_entity(&mut self) -> Result<()> {
        self.events.push(Event::EndEntity);
        Ok(())
    }

    fn literal(&mut self, name: &str, value: &str) -> Result<()> {
        self.events.push(Event::Literal {
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn reset_stream(&mut self) -> Result<()> {
        self.events.push(Event::ResetStream);
        Ok(())
    }

    fn close_stream(&mut self) -> Result<()> {
        self.events.push(Event::CloseStream);
        Ok(())
    }
}
