//! Top-level facade crate for promkit.
//!
//! Re-exports the metrics core and the exporter library so users can depend
//! on a single crate.

pub use promkit_core::*;

pub mod exporter {
    pub use promkit_exporter::*;
}
