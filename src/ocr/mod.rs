//! Text recognition: an isolated worker in front of a [`TextExtractor`].
//!
//! [`OcrClient`] is the request/response handle used by the service layer,
//! [`CommandExtractor`] shells out to an OCR program, and
//! [`candidate_names`] turns the recognized text into names ready for the
//! normal add-names path. Recognition never edits the roster itself.

pub mod extractor;
pub mod text;
pub mod worker;

pub use extractor::{CommandExtractor, TextExtractor};
pub use text::candidate_names;
pub use worker::{DEFAULT_OCR_TIMEOUT, OcrClient};
