// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (hook authentication, security headers).

pub mod hook_auth;
pub mod security;

pub use hook_auth::require_publish_token;
