//! Contract bindings for the L1 bridge shutdown surface.
//!
//! All bindings are generated using alloy's `sol!` macro.

pub mod bridge;
