use axum::extract::FromRequest;

use crate::ApiError;

/// `axum::Json` whose rejections (bad syntax, wrong field types, missing
/// content type) come back as a 400 with the usual `{"error": ...}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
