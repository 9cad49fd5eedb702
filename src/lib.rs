//! # rollcall
//!
//! Local classroom random name picker: a roster per class, absence
//! marking, uniformly random draws animated on a wheel, a short draw
//! history, and import/export of versioned JSON documents.
//!
//! The core is synchronous and owns all state in a single
//! [`domain::StateStore`]; the HTTP and WebSocket layers only translate UI
//! events into store operations and stream changes back to the browser.
//!
//! ## Architecture
//!
//! ```text
//! Browser (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── PickerService, DrawController (service/)
//!     ├── OcrClient → TextExtractor (ocr/)
//!     │
//!     ├── StateStore, EventBus (domain/)
//!     ├── derive_key, merge_names, RandomSource (domain/)
//!     │
//!     └── Codec, FileStore, PersistenceWriter (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod ocr;
pub mod persistence;
pub mod service;
pub mod ws;
