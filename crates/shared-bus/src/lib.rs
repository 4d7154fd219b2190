//! # Shared Bus - Message Bus Administration
//!
//! Port through which setup phases manage message types (topics) on the
//! platform message bus.
//!
//! ```text
//! ┌──────────────────┐   init(endpoints)        ┌──────────────────┐
//! │ Setup phase      │ ───────────────────────→ │ MessageBusAdmin  │
//! │ (init/reset/     │   register / list /      │  - in-memory     │
//! │  cleanup)        │   deregister / purge     │  - kafka scripts │
//! └──────────────────┘ ←─────────────────────── └──────────────────┘
//!                         MessageBusError { kind, code, desc }
//! ```
//!
//! Failures carry a structured `MessageBusErrorKind`, so callers can treat
//! "topic already exists" as success without inspecting message text.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod admin;
pub mod error;
pub mod in_memory;

pub use admin::MessageBusAdmin;
pub use error::{MessageBusError, MessageBusErrorKind};
pub use in_memory::InMemoryMessageBus;

/// Partition count used when a caller does not specify one.
pub const DEFAULT_PARTITIONS: u32 = 1;
