//! State module for the imported data model and crawl progress
//!
//! # Components
//!
//! - `Entry`: one structured lexicon entry with its sections and typed links
//! - `ScriptureRef`: a verse reference keyed by book slug, chapter and verse
//! - `NodeState`: tracks the state of individual queued ids during a run

mod entry;
mod node_state;

// Re-export main types
pub use entry::{EdgeType, Entry, EntryLinks, ScriptureRef, SectionKey};
pub use node_state::NodeState;
