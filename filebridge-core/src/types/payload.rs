//! Upload payload (`POST /`)

use serde::{Deserialize, Serialize};

/// Errors from parsing an upload body
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Empty request body")]
    Empty,

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing fileName")]
    MissingFileName,
}

/// File sent by the browser client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingFilePayload {
    pub file_name: String,

    /// Plain text or base64; see [`crate::content::decode_content`]
    pub content: String,

    /// Destination folder relative to the project root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<String>,

    /// Directory of the target project; best-guess project when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_directory: Option<String>,
}

impl IncomingFilePayload {
    /// Parse and check a raw request body
    pub fn parse(body: &str) -> Result<Self, PayloadError> {
        if body.trim().is_empty() {
            return Err(PayloadError::Empty);
        }
        let payload: IncomingFilePayload = serde_json::from_str(body)?;
        if payload.file_name.trim().is_empty() {
            return Err(PayloadError::MissingFileName);
        }
        Ok(payload)
    }

    /// Folder path, with empty strings treated as absent
    pub fn folder(&self) -> Option<&str> {
        self.folder_path.as_deref().filter(|s| !s.is_empty())
    }

    /// Project directory, with empty strings treated as absent
    pub fn project_dir(&self) -> Option<&str> {
        self.project_directory.as_deref().filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_payload() {
        let payload = IncomingFilePayload::parse(r#"{"fileName":"Foo.txt","content":"aGVsbG8="}"#).unwrap();
        assert_eq!(payload.file_name, "Foo.txt");
        assert_eq!(payload.content, "aGVsbG8=");
        assert_eq!(payload.folder(), None);
        assert_eq!(payload.project_dir(), None);
    }

    #[test]
    fn test_parse_full_payload_with_escapes() {
        let body = r#"{
            "fileName": "LoginSteps.cs",
            "content": "line one\n\"quoted\"\ttab",
            "folderPath": "Features\\Steps",
            "projectDirectory": "C:\\repo\\App"
        }"#;
        let payload = IncomingFilePayload::parse(body).unwrap();
        assert_eq!(payload.content, "line one\n\"quoted\"\ttab");
        assert_eq!(payload.folder(), Some("Features\\Steps"));
        assert_eq!(payload.project_dir(), Some("C:\\repo\\App"));
    }

    #[test]
    fn test_empty_optional_fields_are_absent() {
        let payload = IncomingFilePayload::parse(
            r#"{"fileName":"a.txt","content":"x","folderPath":"","projectDirectory":null}"#,
        )
        .unwrap();
        assert_eq!(payload.folder(), None);
        assert_eq!(payload.project_dir(), None);
    }

    #[test]
    fn test_parse_rejects_incomplete_payloads() {
        assert!(matches!(IncomingFilePayload::parse("   "), Err(PayloadError::Empty)));
        assert!(matches!(
            IncomingFilePayload::parse(r#"{"fileName":"a.txt"}"#),
            Err(PayloadError::Json(_))
        ));
        assert!(matches!(
            IncomingFilePayload::parse(r#"{"fileName":"","content":"x"}"#),
            Err(PayloadError::MissingFileName)
        ));
        assert!(matches!(
            IncomingFilePayload::parse("not json"),
            Err(PayloadError::Json(_))
        ));
    }
}
