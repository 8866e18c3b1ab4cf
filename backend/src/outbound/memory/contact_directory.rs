//! In-memory implementation of [`ContactDirectory`].

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::UserAddress;
use crate::domain::ports::{ContactDirectory, ContactDirectoryError, NotificationContact};

use super::lock;

/// Contact directory populated in process.
#[derive(Debug, Default)]
pub struct InMemoryContactDirectory {
    contacts: Mutex<HashMap<UserAddress, NotificationContact>>,
}

impl InMemoryContactDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the contact for its address.
    ///
    /// # Errors
    ///
    /// Returns [`ContactDirectoryError::Query`] if the directory lock is
    /// poisoned.
    pub fn upsert(&self, contact: NotificationContact) -> Result<(), ContactDirectoryError> {
        let mut contacts =
            lock(&self.contacts, "contact directory").map_err(ContactDirectoryError::query)?;
        contacts.insert(contact.address.clone(), contact);
        Ok(())
    }
}

impl FromIterator<NotificationContact> for InMemoryContactDirectory {
    fn from_iter<I: IntoIterator<Item = NotificationContact>>(iter: I) -> Self {
        let contacts = iter
            .into_iter()
            .map(|contact| (contact.address.clone(), contact))
            .collect();
        Self {
            contacts: Mutex::new(contacts),
        }
    }
}

#[async_trait]
impl ContactDirectory for InMemoryContactDirectory {
    async fn find_contact(
        &self,
        address: &UserAddress,
    ) -> Result<Option<NotificationContact>, ContactDirectoryError> {
        let contacts =
            lock(&self.contacts, "contact directory").map_err(ContactDirectoryError::query)?;
        Ok(contacts.get(address).cloned())
    }
}
