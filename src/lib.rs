//! Corolla: a proportional radial layout engine for multi-lobed petal charts.
//!
//! The crate computes geometry and apportionment only. Weighted risk
//! variables go in; a declarative [`scene::Scene`] of projection parameters
//! and draw marks comes out, ready for any vector-graphics backend. No state
//! survives a render and nothing here performs I/O.

#![deny(dead_code)]
#![deny(unused_imports)]

pub mod apportion;
pub mod geo;
pub mod layout;
pub mod petal;
pub mod scene;
pub mod score2;
