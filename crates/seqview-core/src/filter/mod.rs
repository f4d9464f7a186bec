//! Quick-filter facets and the predicate applied to sequence lists.

pub mod engine;
pub mod types;

pub use engine::FilterEngine;
pub use types::{Facet, FacetKind, FilterOption, FilterSelection};
