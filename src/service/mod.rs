//! Service layer: business logic orchestration.
//!
//! [`PickerService`] handles every editing action and class management,
//! [`DrawController`] runs draws through a [`WheelRenderer`], and the two
//! share a [`DrawGate`] so edits wait while the wheel spins.

pub mod draw_controller;
pub mod draw_gate;
pub mod picker_service;
pub mod renderer;

pub use draw_controller::{
    DrawController, DrawOutcome, DrawResult, DrawState, MIN_PRESENT_FOR_DRAW,
};
pub use draw_gate::{DrawGate, DrawPermit};
pub use picker_service::{ExportedDocument, PickerService};
pub use renderer::{BroadcastRenderer, REDUCED_MOTION_SETTLE, WheelRenderer};
