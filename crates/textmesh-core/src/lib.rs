//! Textmesh Core
//!
//! Shared utilities for the textmesh typesetting crates: logging bootstrap, profiling scopes,
//! hashed collections, a generational reuse pool, geometry primitives and colors.

pub mod alloc;
pub mod color;
pub mod geometry;
pub mod logging;
pub mod math;
pub mod profiling;

pub use color::Color;
pub use geometry::{Padding, Pos, Rect, Size};
