//! Request and response bodies for roster, absence, class and OCR endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Name, split_name_list};
use crate::error::PickerError;

/// Request body for `POST /names`.
///
/// Either `text` (a pasted list split on newlines, commas and semicolons)
/// or `names` (already split) must be present. Both may be combined.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AddNamesRequest {
    /// Pasted list of names.
    #[serde(default)]
    pub text: Option<String>,
    /// Individual names.
    #[serde(default)]
    pub names: Option<Vec<String>>,
}

impl AddNamesRequest {
    /// Flattens the request into raw names, `names` after `text`.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Validation`] if neither field is present.
    pub fn into_raw_names(self) -> Result<Vec<String>, PickerError> {
        if self.text.is_none() && self.names.is_none() {
            return Err(PickerError::Validation(
                "expected `text` or `names`".to_string(),
            ));
        }
        let mut raw = self
            .text
            .as_deref()
            .map(split_name_list)
            .unwrap_or_default();
        raw.extend(self.names.unwrap_or_default());
        Ok(raw)
    }
}

/// Request body for `PUT /absence/{key}`.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct AbsenceRequest {
    /// `true` to exclude the name from draws.
    pub absent: bool,
}

/// Request body for `PUT /class`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassRequest {
    /// Class or group to switch to.
    #[serde(alias = "class_identifier", alias = "classId")]
    pub class_identifier: String,
}

/// Response body for `GET /classes`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClassListResponse {
    /// The active class.
    pub current: String,
    /// Every known class, sorted.
    pub classes: Vec<String>,
}

/// Response body for `POST /ocr`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CandidatesResponse {
    /// Names found in the image, not yet added to the roster.
    pub candidates: Vec<Name>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn text_and_names_combine() {
        let req = AddNamesRequest {
            text: Some("Ada, Bea".to_string()),
            names: Some(vec!["Cid".to_string()]),
        };
        let Ok(raw) = req.into_raw_names() else {
            panic!("valid request");
        };
        assert_eq!(raw.len(), 3);
        assert_eq!(raw.last().map(String::as_str), Some("Cid"));
    }

    #[test]
    fn empty_request_is_rejected() {
        assert!(matches!(
            AddNamesRequest::default().into_raw_names(),
            Err(PickerError::Validation(_))
        ));
    }

    #[test]
    fn class_request_accepts_aliases() {
        let parsed: Result<ClassRequest, _> =
            serde_json::from_str(r#"{"classIdentifier":"4a"}"#);
        assert!(matches!(parsed, Ok(ref r) if r.class_identifier == "4a"));
        let parsed: Result<ClassRequest, _> = serde_json::from_str(r#"{"classId":"5b"}"#);
        assert!(matches!(parsed, Ok(ref r) if r.class_identifier == "5b"));
    }
}
