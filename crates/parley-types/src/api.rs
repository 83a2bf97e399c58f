use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::{Message, flexible_id};

// Required fields are modelled as `Option` so that a missing field maps to a
// 400 from the handler instead of an extractor rejection.

// -- Accounts --

#[derive(Debug, Deserialize)]
pub struct FindUserRequest {
    pub namelogin: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAccountRequest {
    pub id: Option<i64>,
    pub namelogin: Option<String>,
    pub nameshow: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub department: Option<String>,
    pub password: Option<String>,
    pub job: Option<String>,
}

// -- Chat --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChatRequest {
    /// Explicit conversation id. When present the message is appended to that
    /// conversation directly instead of resolving it by participants.
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "flexible_id")]
    pub user_id_sending: Option<String>,
    pub avatar: Option<String>,
    /// Sender login name.
    pub name: Option<String>,
    pub content: Option<String>,
    /// Login name of the other participant.
    pub user_click: Option<String>,
    #[serde(default, deserialize_with = "flexible_id")]
    pub user_id_sending_other: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChatResponse {
    pub conversation_id: i64,
    pub contents: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub struct DoubleUserRequest {
    pub namelogin1: Option<String>,
    pub namelogin2: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContentsResponse {
    pub contents: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLikedRequest {
    pub namelogin1: Option<String>,
    pub namelogin2: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub key: Option<Value>,
    /// Checked for presence only; the stored flag is always negated.
    #[serde(default, deserialize_with = "present")]
    pub liked: Option<Value>,
}

/// `None` only when the field is missing. An explicit `null` is kept as
/// `Some(Value::Null)`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Numeric coercion for a message key sent as a number or a numeric string.
pub fn numeric_key(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => return None,
    };
    if n.fract() != 0.0 || n < 0.0 || n > f64::from(u32::MAX) {
        return None;
    }
    Some(n as u32)
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_coercion() {
        assert_eq!(numeric_key(&json!(3)), Some(3));
        assert_eq!(numeric_key(&json!("3")), Some(3));
        assert_eq!(numeric_key(&json!(" 12 ")), Some(12));
        assert_eq!(numeric_key(&json!(2.0)), Some(2));
        assert_eq!(numeric_key(&json!(2.5)), None);
        assert_eq!(numeric_key(&json!("abc")), None);
        assert_eq!(numeric_key(&json!(-1)), None);
        assert_eq!(numeric_key(&json!(null)), None);
    }

    #[test]
    fn update_liked_keeps_explicit_null() {
        let req: UpdateLikedRequest = serde_json::from_value(json!({
            "namelogin1": "a",
            "namelogin2": "b",
            "key": null,
            "liked": null,
        }))
        .unwrap();
        assert_eq!(req.key, Some(Value::Null));
        assert_eq!(req.liked, Some(Value::Null));
        assert_eq!(numeric_key(&Value::Null), None);

        let req: UpdateLikedRequest =
            serde_json::from_value(json!({ "namelogin1": "a" })).unwrap();
        assert!(req.key.is_none());
        assert!(req.liked.is_none());
    }

    #[test]
    fn add_chat_request_uses_camel_case() {
        let req: AddChatRequest = serde_json::from_value(json!({
            "userIdSending": 7,
            "avatar": "a.png",
            "name": "alice",
            "content": "hi",
            "userClick": "bob",
            "userIdSendingOther": "8"
        }))
        .unwrap();
        assert_eq!(req.user_id_sending.as_deref(), Some("7"));
        assert_eq!(req.user_id_sending_other.as_deref(), Some("8"));
        assert_eq!(req.user_click.as_deref(), Some("bob"));
        assert!(req.id.is_none());
    }
}
