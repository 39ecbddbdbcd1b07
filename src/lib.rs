//! Memory Match (workspace facade crate).
//!
//! Exposes `memory_match::{types,core,runtime}` so hosts depend on one package
//! while the implementation lives in dedicated crates under `crates/`.

pub use memory_match_core as core;
pub use memory_match_runtime as runtime;
pub use memory_match_types as types;
