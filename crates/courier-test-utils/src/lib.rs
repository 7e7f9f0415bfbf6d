// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Courier integration tests.
//!
//! Provides mock adapters for fast, deterministic, CI-runnable tests without
//! external services.
//!
//! # Components
//!
//! - [`MockChannel`] - Scripted channel adapter with a call log
//! - [`MemoryHistory`] - In-memory history store
//! - [`FailingHistory`] - History store whose every operation fails

pub mod memory_history;
pub mod mock_channel;

pub use memory_history::{FailingHistory, MemoryHistory};
pub use mock_channel::{MockChannel, MockOutcome, SentMessage, valid_sid};
