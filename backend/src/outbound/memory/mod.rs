//! In-process adapters for the persistence ports.
//!
//! Each store keeps its records behind a `std::sync::Mutex`; no lock is held
//! across an `.await`. A poisoned lock is reported as a query failure so the
//! domain maps it like any other storage error.

mod contact_directory;
mod match_repository;
mod message_ledger;

use std::sync::{Mutex, MutexGuard};

pub use contact_directory::InMemoryContactDirectory;
pub use match_repository::InMemoryMatchRepository;
pub use message_ledger::InMemoryMessageLedger;

fn lock<'a, T>(mutex: &'a Mutex<T>, store: &str) -> Result<MutexGuard<'a, T>, String> {
    mutex
        .lock()
        .map_err(|_| format!("{store} lock poisoned by a panicked writer"))
}
