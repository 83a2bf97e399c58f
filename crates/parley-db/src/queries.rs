use parley_types::events::{ChangeKind, ChatChange};
use parley_types::models::{AccountSummary, Account, Conversation, Message};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Transaction, TransactionBehavior};
use tracing::{debug, warn};

use crate::models::{ACCOUNT_COLUMNS, ConversationRow, NewAccount, account_from_row};
use crate::threads::{self, NewMessage};
use crate::{Database, Result, StoreError};

/// Conditional writes give up after this many lost races.
const WRITE_ATTEMPTS: usize = 3;

/// Each read-modify-write attempt holds the write lock from its scan to its
/// commit. Dropping the transaction rolls the attempt back.
fn begin(conn: &Connection) -> Result<Transaction<'_>> {
    Ok(Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?)
}

/// Result of an append: the conversation as persisted, and whether this call
/// created it.
#[derive(Debug, Clone)]
pub struct Appended {
    pub conversation: Conversation,
    pub created: bool,
}

impl Database {
    // -- Accounts --

    pub fn list_accounts(&self) -> Result<Vec<AccountSummary>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {ACCOUNT_COLUMNS} FROM info ORDER BY id"))?;
            let rows = stmt
                .query_map([], account_from_row)?
                .map(|r| r.map(AccountSummary::from))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Plaintext match on login name and password.
    pub fn find_account(&self, namelogin: &str, password: &str) -> Result<Option<Account>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!(
                        "SELECT {ACCOUNT_COLUMNS} FROM info WHERE namelogin = ?1 AND password = ?2"
                    ),
                    [namelogin, password],
                    account_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn create_account(&self, new: &NewAccount<'_>) -> Result<AccountSummary> {
        require(new.namelogin, "namelogin is required")?;

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO info (id, namelogin, nameshow, email, avatar, department, job, password)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    new.id,
                    new.namelogin,
                    new.nameshow,
                    new.email,
                    new.avatar,
                    new.department,
                    new.job,
                    new.password,
                ],
            )?;

            Ok(AccountSummary {
                id: new.id.unwrap_or_else(|| conn.last_insert_rowid()),
                namelogin: new.namelogin.to_string(),
                nameshow: new.nameshow.map(str::to_string),
                email: new.email.map(str::to_string),
                avatar: new.avatar.map(str::to_string),
                department: new.department.map(str::to_string),
                job: new.job.map(str::to_string),
            })
        })
    }

    // -- Conversations --

    pub fn list_conversations(&self) -> Result<Vec<Conversation>> {
        self.with_conn(|conn| Ok(load_threads(conn)?.conversations))
    }

    /// Conversations listing `namelogin` as a participant, case-insensitively.
    pub fn conversations_for(&self, namelogin: &str) -> Result<Vec<Conversation>> {
        let needle = namelogin.to_lowercase();
        let all = self.list_conversations()?;
        Ok(all
            .into_iter()
            .filter(|c| c.user.iter().any(|u| u.to_lowercase() == needle))
            .collect())
    }

    pub fn resolve_conversation(&self, a: &str, b: &str) -> Result<Conversation> {
        require(a, "both participant names are required")?;
        require(b, "both participant names are required")?;

        let all = self.list_conversations()?;
        threads::resolve(&all, a, b)
            .cloned()
            .ok_or(StoreError::NotFound("conversation"))
    }

    /// Append a chat line to the thread between `msg.sender` and `msg.other`,
    /// creating and seeding the thread on first contact.
    pub fn append_message(&self, msg: &NewMessage<'_>) -> Result<Appended> {
        require(msg.sender, "sender name is required")?;
        require(msg.other, "other participant name is required")?;
        let now = chrono::Utc::now().timestamp();

        let appended = self.with_conn(|conn| {
            for attempt in 1..=WRITE_ATTEMPTS {
                let tx = begin(conn)?;
                let mut loaded = load_threads(&tx)?;

                let Some(idx) =
                    threads::resolve_position(&loaded.conversations, msg.sender, msg.other)
                else {
                    let id = threads::next_conversation_id(&loaded.conversations)
                        .ok_or(StoreError::InvalidInput("no conversation id left to allocate"))?;
                    let conversation = Conversation {
                        id,
                        user: vec![msg.sender.to_string(), msg.other.to_string()],
                        contents: threads::seed_contents(msg, now),
                    };
                    let key = threads::pair_key(msg.sender, msg.other);
                    if insert_conversation(&tx, &conversation, &key)? {
                        tx.commit()?;
                        debug!(
                            "Created conversation {} for {} / {}",
                            conversation.id, msg.sender, msg.other
                        );
                        return Ok(Appended { conversation, created: true });
                    }
                    warn!("Conversation insert lost a race (attempt {})", attempt);
                    continue;
                };

                let revision = loaded.revisions[idx];
                let mut conversation = loaded.conversations.swap_remove(idx);
                threads::append(&mut conversation.contents, msg, now);

                if write_contents(&tx, conversation.id, revision, &conversation.contents)? {
                    tx.commit()?;
                    debug!(
                        "Appended to conversation {} ({} records)",
                        conversation.id,
                        conversation.contents.len()
                    );
                    return Ok(Appended { conversation, created: false });
                }
                warn!(
                    "Conversation {} changed during append (attempt {})",
                    conversation.id, attempt
                );
            }
            Err(StoreError::Conflict)
        })?;

        self.publish(ChatChange {
            kind: if appended.created { ChangeKind::Insert } else { ChangeKind::Update },
            record: appended.conversation.clone(),
        });
        Ok(appended)
    }

    /// Append a single line to the conversation with `id`, skipping
    /// participant resolution.
    pub fn append_to_conversation(&self, id: i64, msg: &NewMessage<'_>) -> Result<Appended> {
        require(msg.sender, "sender name is required")?;
        let now = chrono::Utc::now().timestamp();

        let conversation = self.with_conn(|conn| {
            for attempt in 1..=WRITE_ATTEMPTS {
                let tx = begin(conn)?;
                let row = tx
                    .query_row(
                        &format!("SELECT {} FROM chat WHERE id = ?1", ConversationRow::COLUMNS),
                        [id],
                        ConversationRow::from_row,
                    )
                    .optional()?
                    .ok_or(StoreError::NotFound("conversation"))?;

                let mut conversation = row.decode()?;
                threads::push(&mut conversation.contents, msg, now);

                if write_contents(&tx, id, row.revision, &conversation.contents)? {
                    tx.commit()?;
                    return Ok(conversation);
                }
                warn!("Conversation {} changed during append (attempt {})", id, attempt);
            }
            Err(StoreError::Conflict)
        })?;

        self.publish(ChatChange {
            kind: ChangeKind::Update,
            record: conversation.clone(),
        });
        Ok(Appended { conversation, created: false })
    }

    /// Flip `liked` on message `key` in the thread between `a` and `b` and
    /// return the message as stored.
    pub fn toggle_liked(&self, a: &str, b: &str, key: u32) -> Result<Message> {
        require(a, "both participant names are required")?;
        require(b, "both participant names are required")?;

        let conversation = self.with_conn(|conn| {
            for attempt in 1..=WRITE_ATTEMPTS {
                let tx = begin(conn)?;
                let mut loaded = load_threads(&tx)?;
                let idx = threads::resolve_position(&loaded.conversations, a, b)
                    .ok_or(StoreError::NotFound("conversation"))?;

                let revision = loaded.revisions[idx];
                let mut conversation = loaded.conversations.swap_remove(idx);
                if threads::toggle_liked(&mut conversation.contents, key).is_none() {
                    return Err(StoreError::NotFound("message"));
                }

                if write_contents(&tx, conversation.id, revision, &conversation.contents)? {
                    tx.commit()?;
                    return Ok(conversation);
                }
                warn!(
                    "Conversation {} changed during like toggle (attempt {})",
                    conversation.id, attempt
                );
            }
            Err(StoreError::Conflict)
        })?;

        let toggled = threads::between(&conversation.contents, a, b)
            .find(|m| m.key == key)
            .cloned();

        self.publish(ChatChange {
            kind: ChangeKind::Update,
            record: conversation,
        });
        toggled.ok_or(StoreError::NotFound("message"))
    }
}

fn require(value: &str, what: &'static str) -> Result<()> {
    if value.is_empty() {
        return Err(StoreError::InvalidInput(what));
    }
    Ok(())
}

struct Loaded {
    conversations: Vec<Conversation>,
    revisions: Vec<i64>,
}

/// Full scan of the chat table in id order.
fn load_threads(conn: &Connection) -> Result<Loaded> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM chat ORDER BY id",
        ConversationRow::COLUMNS
    ))?;
    let rows = stmt
        .query_map([], ConversationRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut loaded = Loaded {
        conversations: Vec::with_capacity(rows.len()),
        revisions: Vec::with_capacity(rows.len()),
    };
    for row in rows {
        loaded.conversations.push(row.decode()?);
        loaded.revisions.push(row.revision);
    }
    Ok(loaded)
}

/// Insert a new conversation. Returns `false` if the id or the pair key was
/// taken in the meantime.
fn insert_conversation(conn: &Connection, conversation: &Conversation, pair_key: &str) -> Result<bool> {
    let result = conn.execute(
        "INSERT INTO chat (id, user, contents, pair_key) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            conversation.id,
            serde_json::to_string(&conversation.user)?,
            serde_json::to_string(&conversation.contents)?,
            pair_key,
        ],
    );

    match result {
        Ok(_) => Ok(true),
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Conditional content write. Only succeeds if the row still carries
/// `revision`; bumps it on success.
fn write_contents(conn: &Connection, id: i64, revision: i64, contents: &[Message]) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE chat SET contents = ?1, revision = revision + 1 WHERE id = ?2 AND revision = ?3",
        rusqlite::params![serde_json::to_string(contents)?, id, revision],
    )?;
    Ok(changed == 1)
}
