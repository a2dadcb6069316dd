//! The path-matching trie family.
//!
//! Four matchers share one building block, the fixed-domain [`CharMap`]:
//!
//! - [`ExactTrie`] maps complete strings to one value each.
//! - [`ClassTrie`] additionally expands `[abc]` character classes at
//!   registration time.
//! - [`WildcardTrie`] supports `?`, `*` and `|` alternation and returns every
//!   registered value that matches an input.
//! - [`SetScanner`] finds every occurrence of every registered literal string
//!   in one pass over a text.
//!
//! All four are append-only after the build phase; lookups never mutate
//! structure, so compiled tries may be shared across engine instances.

pub mod char_map;
pub mod class;
pub mod exact;
pub mod scanner;
pub mod wildcard;

pub use char_map::CharMap;
pub use class::ClassTrie;
pub use exact::ExactTrie;
pub use scanner::{Matches, ScanMatch, SetScanner};
pub use wildcard::WildcardTrie;
