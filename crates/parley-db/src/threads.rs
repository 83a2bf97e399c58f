//! Two-party thread rules: finding a conversation by its participants,
//! allocating ids, seeding a new thread and appending to or toggling an
//! existing one. Everything here is pure; `queries` does the persistence.

use parley_types::models::{Conversation, Message};

/// An outgoing chat line as received from a client.
#[derive(Debug, Clone)]
pub struct NewMessage<'a> {
    pub sender: &'a str,
    pub other: &'a str,
    pub avatar: Option<&'a str>,
    pub content: Option<&'a str>,
    pub sender_id: Option<&'a str>,
    pub other_sender_id: Option<&'a str>,
}

/// First conversation whose participant list contains both names.
/// `conversations` is expected in ascending id order.
pub fn resolve<'c>(conversations: &'c [Conversation], a: &str, b: &str) -> Option<&'c Conversation> {
    resolve_position(conversations, a, b).map(|i| &conversations[i])
}

/// Index form of [`resolve`].
pub fn resolve_position(conversations: &[Conversation], a: &str, b: &str) -> Option<usize> {
    conversations.iter().position(|c| c.has_participants(a, b))
}

/// `max(id) + 1`, or 1 for an empty table. `None` once the id space is used up.
pub fn next_conversation_id(conversations: &[Conversation]) -> Option<i64> {
    conversations.iter().map(|c| c.id).max().unwrap_or(0).checked_add(1)
}

/// Order-independent key for a participant pair.
pub fn pair_key(a: &str, b: &str) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{lo}\u{0}{hi}")
}

/// Contents of a brand new thread: the sender's line as key 1 and an empty
/// placeholder for the other participant as key 2.
pub fn seed_contents(msg: &NewMessage<'_>, now: i64) -> Vec<Message> {
    let mut contents = Vec::with_capacity(2);
    contents.push(sender_record(msg, 1, now));
    contents.push(placeholder_record(msg, 2, now));
    contents
}

/// Append the sender's line with key `len + 1`.
///
/// A thread whose list is empty (left behind by an interrupted write) gets
/// the other participant's placeholder right after, so it ends up shaped
/// like a freshly seeded one.
pub fn append(contents: &mut Vec<Message>, msg: &NewMessage<'_>, now: i64) {
    let was_empty = contents.is_empty();
    let sender_name = push(contents, msg, now).name.clone();

    if was_empty && sender_name == msg.sender {
        let placeholder = placeholder_record(msg, next_key(contents), now);
        contents.push(placeholder);
    }
}

/// Append only the sender's line with key `len + 1`.
pub fn push<'m>(contents: &'m mut Vec<Message>, msg: &NewMessage<'_>, now: i64) -> &'m Message {
    let record = sender_record(msg, next_key(contents), now);
    contents.push(record);
    &contents[contents.len() - 1]
}

/// Flip `liked` on the message with `key`. Returns `None` and leaves the list
/// untouched when no message carries that key.
pub fn toggle_liked(contents: &mut [Message], key: u32) -> Option<&Message> {
    let message = contents.iter_mut().find(|m| m.key == key)?;
    message.liked = !message.liked;
    Some(message)
}

/// Messages written by either participant, in stored order.
pub fn between<'m>(contents: &'m [Message], a: &str, b: &str) -> impl Iterator<Item = &'m Message> {
    contents.iter().filter(move |m| m.name == a || m.name == b)
}

fn next_key(contents: &[Message]) -> u32 {
    contents.len() as u32 + 1
}

fn sender_record(msg: &NewMessage<'_>, key: u32, now: i64) -> Message {
    Message {
        key,
        name: msg.sender.to_string(),
        time: now,
        liked: false,
        avatar: msg.avatar.map(str::to_string),
        content: msg.content.map(str::to_string),
        sender_id: msg.sender_id.map(str::to_string),
    }
}

fn placeholder_record(msg: &NewMessage<'_>, key: u32, now: i64) -> Message {
    Message {
        key,
        name: msg.other.to_string(),
        time: now,
        liked: false,
        avatar: None,
        content: None,
        sender_id: msg.other_sender_id.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hi<'a>(content: &'a str) -> NewMessage<'a> {
        NewMessage {
            sender: "alice",
            other: "bob",
            avatar: Some("alice.png"),
            content: Some(content),
            sender_id: Some("1"),
            other_sender_id: Some("2"),
        }
    }

    fn conv(id: i64, user: &[&str]) -> Conversation {
        Conversation {
            id,
            user: user.iter().map(|s| s.to_string()).collect(),
            contents: vec![],
        }
    }

    #[test]
    fn resolve_is_order_independent() {
        let all = vec![conv(1, &["carol", "dave"]), conv(2, &["alice", "bob"])];
        assert_eq!(resolve(&all, "alice", "bob").unwrap().id, 2);
        assert_eq!(resolve(&all, "bob", "alice").unwrap().id, 2);
        assert!(resolve(&all, "alice", "carol").is_none());
    }

    #[test]
    fn resolve_tolerates_extra_entries_and_picks_first() {
        let all = vec![
            conv(1, &["alice", "bob", "alice"]),
            conv(2, &["bob", "alice"]),
        ];
        assert_eq!(resolve(&all, "alice", "bob").unwrap().id, 1);
    }

    #[test]
    fn id_allocation() {
        assert_eq!(next_conversation_id(&[]), Some(1));
        let all = vec![conv(1, &[]), conv(3, &[]), conv(2, &[])];
        assert_eq!(next_conversation_id(&all), Some(4));
        assert_eq!(next_conversation_id(&[conv(i64::MAX, &[])]), None);
    }

    #[test]
    fn pair_key_ignores_order() {
        assert_eq!(pair_key("alice", "bob"), pair_key("bob", "alice"));
        assert_ne!(pair_key("alice", "bob"), pair_key("alice", "bobby"));
    }

    #[test]
    fn seeding_creates_two_sided_thread() {
        let contents = seed_contents(&hi("hi"), 100);
        assert_eq!(contents.len(), 2);

        assert_eq!(contents[0].key, 1);
        assert_eq!(contents[0].name, "alice");
        assert_eq!(contents[0].content.as_deref(), Some("hi"));
        assert_eq!(contents[0].sender_id.as_deref(), Some("1"));
        assert!(!contents[0].liked);

        assert_eq!(contents[1].key, 2);
        assert_eq!(contents[1].name, "bob");
        assert!(contents[1].content.is_none());
        assert_eq!(contents[1].sender_id.as_deref(), Some("2"));
    }

    #[test]
    fn append_keeps_prior_records_and_uses_next_key() {
        let mut contents = seed_contents(&hi("hi"), 100);
        let before = contents.clone();

        append(&mut contents, &hi("yo"), 200);

        assert_eq!(contents.len(), 3);
        assert_eq!(&contents[..2], &before[..]);
        assert_eq!(contents[2].key, 3);
        assert_eq!(contents[2].name, "alice");
        assert_eq!(contents[2].content.as_deref(), Some("yo"));
        assert_eq!(contents[2].time, 200);
    }

    #[test]
    fn append_to_empty_list_adds_placeholder() {
        let mut contents = Vec::new();
        append(&mut contents, &hi("hi"), 100);

        let keys: Vec<u32> = contents.iter().map(|m| m.key).collect();
        assert_eq!(keys, vec![1, 2]);
        assert_eq!(contents[1].name, "bob");
        assert!(contents[1].content.is_none());
    }

    #[test]
    fn toggle_twice_restores_value() {
        let mut contents = seed_contents(&hi("hi"), 100);
        assert!(toggle_liked(&mut contents, 1).unwrap().liked);
        assert!(!toggle_liked(&mut contents, 1).unwrap().liked);
    }

    #[test]
    fn toggle_unknown_key_leaves_list_alone() {
        let mut contents = seed_contents(&hi("hi"), 100);
        let before = contents.clone();
        assert!(toggle_liked(&mut contents, 9).is_none());
        assert_eq!(contents, before);
    }

    #[test]
    fn between_filters_by_sender_name() {
        let mut contents = seed_contents(&hi("hi"), 100);
        contents.push(Message {
            key: 3,
            name: "mallory".into(),
            time: 100,
            liked: false,
            avatar: None,
            content: Some("?".into()),
            sender_id: None,
        });
        let keys: Vec<u32> = between(&contents, "alice", "bob").map(|m| m.key).collect();
        assert_eq!(keys, vec![1, 2]);
    }
}
