//! Outbound adapters implementing domain ports.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of the driven port traits:
//!
//! - **memory**: in-process match store, message ledger and contact directory
//! - **notify**: notifier that writes delivery decisions to the trace log
//!
//! Adapters are thin translators that convert between domain types and
//! storage representations. They contain no business logic.

pub mod memory;
pub mod notify;
