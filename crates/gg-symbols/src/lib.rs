//! Symbol repertoire and selection for cell matching.
//!
//! [`tags`] defines the shape-category bitmask, [`repertoire`] the
//! built-in 8x8 coverage bitmaps, and [`map`] the selector-driven
//! [`map::SymbolMap`] that resolves to a flat candidate list.
pub mod map;
pub mod repertoire;
pub mod tags;

pub use map::{PreparedMap, Symbol, Symbol2, SymbolMap, SymbolsError};
pub use tags::SymbolTags;
