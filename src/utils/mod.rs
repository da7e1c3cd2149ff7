//! Shared utility functions.
//!
//! - `html`: table walking and text normalisation for parsed pages

mod html;

pub use html::{closest_ancestor, element_text, next_sibling_element, own_text, row_cells};
