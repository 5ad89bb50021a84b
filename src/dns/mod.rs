//! Reverse DNS resolution.
//!
//! Hostnames are best effort: a request never waits longer than the outer
//! deadline for one, and never fails because of one.

mod resolution;

// Re-export public API
pub use resolution::{BoundedResolver, ReverseLookup};
