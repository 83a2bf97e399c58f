use axum::{Json, extract::State, response::IntoResponse};
use tracing::info;

use parley_db::models::NewAccount;
use parley_types::api::{FindUserRequest, NewAccountRequest};

use crate::extract::JsonBody;
use crate::state::with_db;
use crate::{ApiError, AppState};

/// Member directory. Passwords are never part of this listing.
pub async fn list_accounts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let accounts = with_db(&state, |db| db.list_accounts()).await?;
    Ok(Json(accounts))
}

/// Login lookup. Compares the plaintext password stored on the account.
pub async fn find_user(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<FindUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(namelogin), Some(password)) = (req.namelogin, req.password) else {
        return Err(ApiError::BadRequest("namelogin and password are required".into()));
    };

    let account = with_db(&state, move |db| db.find_account(&namelogin, &password))
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    Ok(Json(account))
}

pub async fn create_account(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<NewAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let created = with_db(&state, move |db| {
        db.create_account(&NewAccount {
            id: req.id,
            namelogin: req.namelogin.as_deref().unwrap_or_default(),
            nameshow: req.nameshow.as_deref(),
            email: req.email.as_deref(),
            avatar: req.avatar.as_deref(),
            department: req.department.as_deref(),
            job: req.job.as_deref(),
            password: req.password.as_deref(),
        })
    })
    .await
    .map_err(ApiError::into_bad_request)?;

    info!("Account {} ({}) signed up", created.namelogin, created.id);
    Ok(Json(created))
}
