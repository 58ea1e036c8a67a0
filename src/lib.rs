//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (`core-service`, `core-playback`). Host applications can
//! depend on `lullaby-workspace` and enable `wasm` or `offline-cache` without
//! wiring each crate individually.
