// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for command template dispatch.
//!
//! All errors implement `std::error::Error` via the `thiserror` crate for
//! consistent error handling.

use thiserror::Error;

/// Errors raised while expanding a command template.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DispatchError {
    /// A `${name}` placeholder has no value in scope.
    #[error("unresolved placeholder '${{{0}}}'")]
    UnresolvedPlaceholder(String),

    /// A `${` opened but never closed.
    #[error("unterminated '${{' placeholder")]
    UnterminatedPlaceholder,
}
