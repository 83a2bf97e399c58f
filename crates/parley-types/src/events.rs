use serde::{Deserialize, Serialize};

use crate::models::Conversation;

/// Kind of write that produced a chat-table change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
}

/// A row change on the chat table, carrying the row as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatChange {
    pub kind: ChangeKind,
    pub record: Conversation,
}

/// Events sent over the realtime websocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GatewayEvent {
    /// Sent once when a connection is accepted
    Ready { connection_id: String },

    /// A conversation row was inserted or updated
    ChatChanged {
        kind: ChangeKind,
        record: Conversation,
    },
}

impl From<ChatChange> for GatewayEvent {
    fn from(change: ChatChange) -> Self {
        Self::ChatChanged {
            kind: change.kind,
            record: change.record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_change_event_shape() {
        let event = GatewayEvent::from(ChatChange {
            kind: ChangeKind::Insert,
            record: Conversation {
                id: 3,
                user: vec!["alice".into(), "bob".into()],
                contents: vec![],
            },
        });
        let v = serde_json::to_value(&event).unwrap();
        assert_eq!(v["type"], "ChatChanged");
        assert_eq!(v["data"]["kind"], "INSERT");
        assert_eq!(v["data"]["record"]["id"], 3);
        assert_eq!(v["data"]["record"]["user"][1], "bob");
    }
}
