//! Request extractors whose rejections render as `{"detail": ...}`.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ServerError;

/// JSON request body. A missing content type, malformed JSON or a missing
/// field is a 400 [`ServerError::BadRequest`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct JsonBody<T>(pub T);

/// Path parameters. An id that does not parse is a 400
/// [`ServerError::BadRequest`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ServerError))]
pub struct PathParam<T>(pub T);
