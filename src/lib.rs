//! Metamorph is a declarative metadata transformation engine.
//!
//! A transformation is described as a document of rules (YAML or JSON) that
//! bind dot-delimited path patterns to data sources, value functions, and
//! collectors. The document compiles once into a family of pattern tries and
//! a rule-evaluation graph; at runtime a [`Metamorph`] engine consumes a flat
//! stream of record events, routes each literal through the tries into the
//! graph, and forwards the transformed stream to a downstream
//! [`StreamReceiver`].
//!
//! # Quick start
//!
//! ```
//! use metamorph::{EventList, Metamorph, StreamReceiver};
//!
//! let definition = r#"
//! rules:
//!   - data:
//!       source: person.name
//!       name: fullName
//!       functions:
//!         - trim
//!         - upcase
//! "#;
//!
//! let mut morph = Metamorph::from_yaml(definition, EventList::new())?;
//! morph.start_record("1")?;
//! morph.start_entity("person")?;
//! morph.literal("name", "  Ada Lovelace ")?;
//! morph.end_entity()?;
//! morph.end_record()?;
//! morph.close_stream()?;
//!
//! assert_eq!(
//!     morph.downstream().literals(),
//!     vec![("fullName", "ADA LOVELACE")]
//! );
//! # Ok::<(), metamorph::MorphError>(())
//! ```
//!
//! # Architecture
//!
//! - [`tries`] — the path-matching structures: a dense [`tries::CharMap`]
//!   keyed by UTF-16 code units, exact/character-class/wildcard tries, and an
//!   Aho-Corasick multi-pattern substring scanner.
//! - [`router`] — classifies each registered pattern into the cheapest trie
//!   that can hold it and unions their answers per lookup.
//! - [`graph`] — the compiled rule graph: an arena of nodes driven by an
//!   explicit message queue, with collectors, value functions, and
//!   conditional gates.
//! - [`morph`] — the [`Metamorph`] engine tying stream events, routing, and
//!   graph evaluation together.
//! - [`definition`] — the serde document model and `$[var]` resolution.

#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod definition;
pub mod error;
pub mod event;
pub mod graph;
pub mod maps;
pub mod morph;
pub mod router;
pub mod tries;

pub use definition::MorphDef;
pub use error::{MorphError, Result};
pub use event::{Event, EventList, StreamReceiver};
pub use graph::CompiledGraph;
pub use maps::{InMemoryMap, LookupTable, Maps};
pub use morph::Metamorph;
pub use router::PathRouter;
pub use tries::{CharMap, ClassTrie, ExactTrie, SetScanner, WildcardTrie};
