//! Database row types. The chat table keeps its participant list and message
//! list as JSON text; decoding into API models happens here.
use parley_types::models::{Account, Conversation};
use rusqlite::Row;

use crate::Result;

pub struct ConversationRow {
    pub id: i64,
    pub user: String,
    pub contents: String,
    pub revision: i64,
}

impl ConversationRow {
    pub const COLUMNS: &'static str = "id, user, contents, revision";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user: row.get(1)?,
            contents: row.get(2)?,
            revision: row.get(3)?,
        })
    }

    pub fn decode(&self) -> Result<Conversation> {
        Ok(Conversation {
            id: self.id,
            user: serde_json::from_str(&self.user)?,
            contents: serde_json::from_str(&self.contents)?,
        })
    }
}

pub const ACCOUNT_COLUMNS: &str =
    "id, namelogin, nameshow, email, avatar, department, job, password";

pub fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        namelogin: row.get(1)?,
        nameshow: row.get(2)?,
        email: row.get(3)?,
        avatar: row.get(4)?,
        department: row.get(5)?,
        job: row.get(6)?,
        password: row.get(7)?,
    })
}

/// Insert payload for the `info` table. A missing `id` lets SQLite assign one.
pub struct NewAccount<'a> {
    pub id: Option<i64>,
    pub namelogin: &'a str,
    pub nameshow: Option<&'a str>,
    pub email: Option<&'a str>,
    pub avatar: Option<&'a str>,
    pub department: Option<&'a str>,
    pub job: Option<&'a str>,
    pub password: Option<&'a str>,
}
