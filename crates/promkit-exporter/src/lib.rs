//! promkit exporter library entry.
//!
//! Wires a [`promkit_core::Registry`] to host probes, a periodic sampler and
//! an axum HTTP surface. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod host;
pub mod obs;
pub mod ops;
pub mod router;
pub mod sampler;
