// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements the `Display` trait for human-readable
//! output and [`StructuredLog`] to attach the same data as structured
//! fields at the appropriate level.

use tracing::Span;

pub mod engine;
pub mod job;
pub mod validation;

/// Emit a message through `tracing` with structured fields.
///
/// Implementations choose the level (`log`) and may expose a span carrying
/// the same fields for instrumenting a region of work (`span`).
pub trait StructuredLog {
    /// Log the message at its canonical level with structured fields.
    fn log(&self);

    /// A span carrying this message's fields.
    fn span(&self, name: &str) -> Span;
}
