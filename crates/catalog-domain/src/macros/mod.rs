//! Domain macros organized by usage context.
//!
//! - [`entities`]: strongly-typed id and shared-field entity macros.

#[macro_use]
mod entities;
