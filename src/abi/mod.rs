//! Contract interface handling.
//!
//! # Data Flow
//! ```text
//! artifact directories
//!     → artifacts.rs (load JSON, sorted by path)
//!     → encoder.rs (function lookup, typed call data)
//!     → events.rs (EventRegistry, shared read-only across decodes)
//! ```

pub mod artifacts;
pub mod encoder;
pub mod events;

pub use artifacts::Artifact;
pub use encoder::CallEncoder;
pub use events::{render_outcome, DecodeOutcome, DecodedLog, EventRegistry};
