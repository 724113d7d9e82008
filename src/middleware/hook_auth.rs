// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared-token authentication for CMS hooks.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Header carrying the publish hook token.
pub const PUBLISH_TOKEN_HEADER: &str = "x-publish-token";

/// Require the configured publish token on CMS routes.
pub async fn require_publish_token(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = request
        .headers()
        .get(PUBLISH_TOKEN_HEADER)
        .map(|value| value.as_bytes())
        .unwrap_or_default();

    let expected = state.config.publish_hook_token.as_bytes();
    let valid = !expected.is_empty() && bool::from(presented.ct_eq(expected));

    if !valid {
        tracing::warn!(
            has_header = request.headers().contains_key(PUBLISH_TOKEN_HEADER),
            "Blocked hook request with invalid token"
        );
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
