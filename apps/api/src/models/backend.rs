//! Upload and chat wire shapes of the analysis backend. Read-only views are
//! proxied as raw JSON and have no types here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifiers handed back by `POST /resume/upload`.
///
/// Key spellings vary between backend versions, so they are read by hand from
/// the raw body rather than through a derived struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadIdentifiers {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub profile_id: Option<String>,
}

impl UploadIdentifiers {
    pub fn from_body(body: &Value) -> Self {
        UploadIdentifiers {
            user_id: first_id(body, &["user_id", "userId", "id"]),
            session_id: first_id(body, &["session_id", "sessionId", "conversation_id"]),
            profile_id: first_id(body, &["profile_id", "profileId"]),
        }
    }
}

fn first_id(body: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match body.get(*key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub user_id: Option<&'a str>,
    pub session_id: Option<&'a str>,
    pub include_sources: bool,
    pub context: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub actions_taken: Vec<Value>,
    #[serde(default)]
    pub sources: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upload_identifiers_canonical_keys() {
        let ids = UploadIdentifiers::from_body(&json!({
            "user_id": "u-1",
            "session_id": "s-1",
            "profile_id": "p-1"
        }));
        assert_eq!(ids.user_id.as_deref(), Some("u-1"));
        assert_eq!(ids.session_id.as_deref(), Some("s-1"));
        assert_eq!(ids.profile_id.as_deref(), Some("p-1"));
    }

    #[test]
    fn test_upload_identifiers_alternate_spellings() {
        let ids = UploadIdentifiers::from_body(&json!({
            "id": 17,
            "conversation_id": "conv-9",
            "profileId": "prof-2"
        }));
        assert_eq!(ids.user_id.as_deref(), Some("17"));
        assert_eq!(ids.session_id.as_deref(), Some("conv-9"));
        assert_eq!(ids.profile_id.as_deref(), Some("prof-2"));
    }

    #[test]
    fn test_upload_identifiers_prefer_first_key() {
        let ids = UploadIdentifiers::from_body(&json!({ "user_id": "a", "userId": "b", "id": "c" }));
        assert_eq!(ids.user_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_upload_identifiers_missing() {
        let ids = UploadIdentifiers::from_body(&json!({ "status": "ok" }));
        assert_eq!(ids, UploadIdentifiers::default());
    }

    #[test]
    fn test_chat_reply_defaults_lists() {
        let reply: ChatReply = serde_json::from_value(json!({ "message": "hi" })).unwrap();
        assert_eq!(reply.message, "hi");
        assert!(reply.actions_taken.is_empty());
        assert!(reply.sources.is_empty());
    }

    #[test]
    fn test_chat_request_wire_shape() {
        let request = ChatRequest {
            message: "hello",
            user_id: Some("u"),
            session_id: None,
            include_sources: true,
            context: json!({}),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "message": "hello",
                "user_id": "u",
                "session_id": null,
                "include_sources": true,
                "context": {}
            })
        );
    }
}
