use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};

use parley_db::threads::{self, NewMessage};
use parley_types::api::{
    AddChatRequest, AddChatResponse, ContentsResponse, DoubleUserRequest, UpdateLikedRequest,
    numeric_key,
};

use crate::extract::JsonBody;
use crate::state::with_db;
use crate::{ApiError, AppState};

/// Header carrying the login name for the per-user conversation listing.
const NAMELOGIN_HEADER: &str = "namelogin";

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}

pub async fn list_chats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let conversations = with_db(&state, |db| db.list_conversations()).await?;
    Ok(Json(conversations))
}

/// Send a chat line. Creates and seeds the thread on first contact between
/// the pair; 201 in that case, 200 for a plain append.
pub async fn add_chat(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AddChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let sender = required(req.name, "name is required")?;

    let appended = match req.id {
        Some(id) => {
            with_db(&state, move |db| {
                db.append_to_conversation(
                    id,
                    &NewMessage {
                        sender: &sender,
                        other: req.user_click.as_deref().unwrap_or_default(),
                        avatar: req.avatar.as_deref(),
                        content: req.content.as_deref(),
                        sender_id: req.user_id_sending.as_deref(),
                        other_sender_id: req.user_id_sending_other.as_deref(),
                    },
                )
            })
            .await?
        }
        None => {
            let other = required(req.user_click, "userClick is required")?;
            with_db(&state, move |db| {
                db.append_message(&NewMessage {
                    sender: &sender,
                    other: &other,
                    avatar: req.avatar.as_deref(),
                    content: req.content.as_deref(),
                    sender_id: req.user_id_sending.as_deref(),
                    other_sender_id: req.user_id_sending_other.as_deref(),
                })
            })
            .await?
        }
    };

    let status = if appended.created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(AddChatResponse {
            conversation_id: appended.conversation.id,
            contents: appended.conversation.contents,
        }),
    ))
}

pub async fn chats_for_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let namelogin = headers
        .get(NAMELOGIN_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest("namelogin is required".into()))?
        .to_string();

    let conversations = with_db(&state, move |db| db.conversations_for(&namelogin)).await?;
    Ok(Json(conversations))
}

/// Thread between two users, narrowed to lines written by either of them.
pub async fn chat_between(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<DoubleUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let a = required(req.namelogin1, "Both namelogin1 and namelogin2 are required")?;
    let b = required(req.namelogin2, "Both namelogin1 and namelogin2 are required")?;

    let contents = with_db(&state, move |db| {
        let conversation = db.resolve_conversation(&a, &b)?;
        Ok(threads::between(&conversation.contents, &a, &b).cloned().collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(ContentsResponse { contents }))
}

/// Flip the like flag on one message. `liked` only has to be present; the
/// stored value is always negated.
pub async fn update_liked(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UpdateLikedRequest>,
) -> Result<impl IntoResponse, ApiError> {
    const MISSING: &str = "namelogin1, namelogin2, key, and liked are required";

    let a = required(req.namelogin1, MISSING)?;
    let b = required(req.namelogin2, MISSING)?;
    let (Some(key), Some(_liked)) = (req.key, req.liked) else {
        return Err(ApiError::BadRequest(MISSING.into()));
    };

    // A key that is not numeric cannot match any message
    let key = numeric_key(&key).ok_or_else(|| ApiError::NotFound("message not found".into()))?;

    let message = with_db(&state, move |db| db.toggle_liked(&a, &b, key)).await?;
    Ok(Json(message))
}
