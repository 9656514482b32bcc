//! Octree color quantization.
//!
//! Pixels go into an [`Octree`] whose levels split RGB space one bit-plane
//! at a time; the tree is then pruned level by level, and each remaining
//! leaf becomes a palette entry. [`Quantizer`] ties the steps together and
//! keeps lookups consistent with the depth the tree was pruned to.

pub mod octree;
pub mod quantize;

pub use octree::*;
pub use quantize::Quantizer;
