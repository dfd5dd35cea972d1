//! # Domain Layer
//!
//! Core business types for the multi-tenant project catalog and hybrid
//! search service. Contains only pure domain entities, value objects, and
//! ports — no database, HTTP, or filesystem code.
//!
//! ## Architecture
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`entities`] | Persistent and transient catalog entities |
//! | [`value_objects`] | Strong-typed ids and immutable query/filter shapes |
//! | [`ports`] | External provider port interfaces |
//! | [`constants`] | Fixed discovery and scoring tables |
//! | [`error`] | Domain error taxonomy |

/// Common macros
#[macro_use]
pub mod macros;

/// Fixed discovery and scoring tables
pub mod constants;
/// Persistent and transient catalog entities
pub mod entities;
/// Domain error taxonomy
pub mod error;
/// External provider port interfaces
pub mod ports;
/// Small stateless helpers shared across layers
pub mod utils;
/// Strong-typed ids and immutable query/filter shapes
pub mod value_objects;

pub use entities::*;
pub use error::{Error, Result};
pub use value_objects::*;
