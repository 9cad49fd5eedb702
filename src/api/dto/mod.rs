//! Data Transfer Objects for REST request/response serialization.
//!
//! Snapshots travel in their persisted document form, so the browser
//! reads the same shape it exports and imports.

pub mod draw_dto;
pub mod roster_dto;
pub mod state_dto;

pub use draw_dto::*;
pub use roster_dto::*;
pub use state_dto::*;
