use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::ProtocolError;
use crate::types::ContinuationToken;

/// Characters left untouched by `encodeURIComponent`; everything else is escaped.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes a slice of base64 text for transport.
///
/// Base64 output only ever needs `+`, `/` and `=` escaped, but the full
/// URI-component set is applied so the backend can decode with a standard
/// URL decoder.
pub fn encode_chunk_text(chunk: &str) -> String {
    utf8_percent_encode(chunk, URI_COMPONENT).to_string()
}

// ---------------------------------------------------------------------------
// Request / response payloads
// ---------------------------------------------------------------------------

/// Appends one chunk to a record attachment.
///
/// `file_id` is empty for the first chunk of an upload; the backend creates
/// the attachment and returns its id, which every later chunk carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveChunkRequest {
    pub parent_id: String,
    pub file_name: String,
    /// Base64 chunk text, already percent-encoded.
    pub base64_data: String,
    pub content_type: String,
    #[serde(default)]
    pub file_id: ContinuationToken,
}

impl SaveChunkRequest {
    /// Builds a request from a raw base64 chunk, percent-encoding it.
    pub fn new(
        parent_id: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        chunk: &str,
        file_id: &ContinuationToken,
    ) -> Self {
        Self {
            parent_id: parent_id.into(),
            file_name: file_name.into(),
            base64_data: encode_chunk_text(chunk),
            content_type: content_type.into(),
            file_id: file_id.clone(),
        }
    }
}

/// Reply to a [`SaveChunkRequest`].
///
/// Backends answer either with the bare record id as a JSON string or with
/// an object carrying it under `id` (or `fileId`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SaveChunkResponse {
    Bare(String),
    Object {
        #[serde(alias = "fileId")]
        id: String,
    },
}

impl SaveChunkResponse {
    /// Extracts the record id, rejecting an empty one.
    pub fn into_token(self) -> Result<ContinuationToken, ProtocolError> {
        let id = match self {
            SaveChunkResponse::Bare(id) | SaveChunkResponse::Object { id } => id,
        };
        if id.is_empty() {
            return Err(ProtocolError::MissingRecordId);
        }
        Ok(ContinuationToken::from(id))
    }
}

/// Parses a raw response body into the continuation token it carries.
pub fn parse_save_chunk_response(body: &[u8]) -> Result<ContinuationToken, ProtocolError> {
    let resp: SaveChunkResponse = serde_json::from_slice(body)?;
    resp.into_token()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_escapes_base64_specials() {
        assert_eq!(encode_chunk_text("ab+/cd=="), "ab%2B%2Fcd%3D%3D");
    }

    #[test]
    fn encode_keeps_uri_unreserved() {
        let unreserved = "AZaz09-_.!~*'()";
        assert_eq!(encode_chunk_text(unreserved), unreserved);
    }

    #[test]
    fn encode_empty_chunk() {
        assert_eq!(encode_chunk_text(""), "");
    }

    #[test]
    fn save_chunk_request_field_names() {
        let req = SaveChunkRequest::new(
            "001xx000003DGb2",
            "scan.pdf",
            "application/pdf",
            "JVBERi0=",
            &ContinuationToken::empty(),
        );
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"parentId\":\"001xx000003DGb2\""));
        assert!(json.contains("\"fileName\":\"scan.pdf\""));
        assert!(json.contains("\"base64Data\":\"JVBERi0%3D\""));
        assert!(json.contains("\"contentType\":\"application/pdf\""));
        assert!(json.contains("\"fileId\":\"\""));
    }

    #[test]
    fn save_chunk_request_carries_token() {
        let token = ContinuationToken::new("068xx0000001");
        let req = SaveChunkRequest::new("p", "f.pdf", "application/pdf", "AA", &token);
        assert_eq!(req.file_id, token);
        let json = serde_json::to_string(&req).unwrap();
        let parsed: SaveChunkRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, req);
    }

    #[test]
    fn parse_bare_string_response() {
        let token = parse_save_chunk_response(br#""068xx0000001""#).unwrap();
        assert_eq!(token.as_str(), "068xx0000001");
    }

    #[test]
    fn parse_object_response() {
        let token = parse_save_chunk_response(br#"{"id":"068xx0000002"}"#).unwrap();
        assert_eq!(token.as_str(), "068xx0000002");

        let token = parse_save_chunk_response(br#"{"fileId":"068xx0000003"}"#).unwrap();
        assert_eq!(token.as_str(), "068xx0000003");
    }

    #[test]
    fn parse_empty_id_rejected() {
        let err = parse_save_chunk_response(br#""""#).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingRecordId));
    }

    #[test]
    fn parse_garbage_rejected() {
        let err = parse_save_chunk_response(b"not json").unwrap_err();
        assert!(matches!(err, ProtocolError::Json(_)));
    }
}
