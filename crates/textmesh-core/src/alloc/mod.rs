//! Allocation and collection helpers.
//!
//! - Re-exports of hash collections using AHash
//! - [`Pool`], a recycling free list with generation stamps

pub mod pool;

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};
pub use pool::{Pool, Reusable, Stamp};
