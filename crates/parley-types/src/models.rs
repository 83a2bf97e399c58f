use serde::{Deserialize, Deserializer, Serialize};

// -- Accounts --

/// Full account record, password included. Only returned by the login lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub namelogin: String,
    pub nameshow: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub department: Option<String>,
    pub job: Option<String>,
    pub password: Option<String>,
}

/// Public view of an account used by the member listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: i64,
    pub namelogin: String,
    pub nameshow: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub department: Option<String>,
    pub job: Option<String>,
}

impl From<Account> for AccountSummary {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            namelogin: a.namelogin,
            nameshow: a.nameshow,
            email: a.email,
            avatar: a.avatar,
            department: a.department,
            job: a.job,
        }
    }
}

// -- Conversations --

/// A two-party thread. `user` holds the participant login names and
/// `contents` the ordered message records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub user: Vec<String>,
    pub contents: Vec<Message>,
}

impl Conversation {
    /// True if both names appear in the participant list, in any order.
    /// Extra or duplicated entries are tolerated.
    pub fn has_participants(&self, a: &str, b: &str) -> bool {
        self.user.iter().any(|u| u == a) && self.user.iter().any(|u| u == b)
    }
}

/// One chat line. A `content` of `None` marks a placeholder for a
/// participant who has not written yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub key: u32,
    pub name: String,
    pub time: i64,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Sender identifier, kept for client-side correlation.
    #[serde(rename = "id", default, deserialize_with = "flexible_id")]
    pub sender_id: Option<String>,
}

/// Accepts an identifier sent either as a JSON string or a JSON number and
/// normalises it to a string.
pub fn flexible_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => Some(s),
        Some(Raw::Int(n)) => Some(n.to_string()),
        Some(Raw::Float(f)) => Some(f.to_string()),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_sender_id_accepts_numbers_and_strings() {
        let m: Message = serde_json::from_str(
            r#"{"key":1,"name":"alice","time":10,"liked":false,"avatar":null,"content":"hi","id":42}"#,
        )
        .unwrap();
        assert_eq!(m.sender_id.as_deref(), Some("42"));

        let m: Message =
            serde_json::from_str(r#"{"key":2,"name":"bob","time":10,"id":"u-7"}"#).unwrap();
        assert_eq!(m.sender_id.as_deref(), Some("u-7"));
        assert!(!m.liked);
        assert!(m.content.is_none());
    }

    #[test]
    fn message_serializes_sender_id_as_id() {
        let m = Message {
            key: 1,
            name: "alice".into(),
            time: 0,
            liked: true,
            avatar: None,
            content: None,
            sender_id: Some("9".into()),
        };
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["id"], "9");
        assert!(v["content"].is_null());
    }

    #[test]
    fn participant_match_ignores_order_and_extras() {
        let c = Conversation {
            id: 1,
            user: vec!["bob".into(), "alice".into(), "alice".into()],
            contents: vec![],
        };
        assert!(c.has_participants("alice", "bob"));
        assert!(c.has_participants("bob", "alice"));
        assert!(!c.has_participants("alice", "carol"));
    }
}
