//! Serializable summaries of attached files.

use serde::{Deserialize, Serialize};

/// Name, size and MIME type of a file that was attached to a draft.
///
/// Live file contents cannot be written to durable storage, so this summary
/// is what survives a reload and what the UI shows ("`guide.pdf`, 2.1 MB").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileMetadata {
    /// File name as reported by the picker.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type, when known.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_type_field_name() {
        let meta = FileMetadata {
            name: "guide.pdf".to_string(),
            size: 2048,
            mime_type: Some("application/pdf".to_string()),
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["type"], "application/pdf");

        let untyped: FileMetadata =
            serde_json::from_str(r#"{"name":"a.bin","size":3}"#).unwrap();
        assert_eq!(untyped.mime_type, None);
    }
}
