//! Document Engine - Element registry, parallel arrays and tree operations.
//!
//! The engine manages the core data structures:
//! - Registry: Index allocation, key mapping
//! - Tree: Parent/child links, mutation, queries
//! - Arrays: Parallel SlotArrays for element state
//!
//! # Architecture
//!
//! Elements are NOT objects. They are indices into parallel arrays:
//!
//! ```text
//! Index 0: body   (parent=None, children=[1, 4])
//! Index 1: div    (parent=0, attrs={data-carousel}, classes=[ui-carousel])
//! Index 2: div    (parent=1, classes=[ui-carousel-slide], attrs={aria-hidden=false})
//! ```
//!
//! Widgets hold indices and read/write attributes through the tree API.

mod registry;
mod tree;
pub mod arrays;

pub use registry::*;
pub use tree::*;
