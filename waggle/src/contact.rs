//! Direct-contact bookkeeping.
//!
//! The platform learns about a new direct counterpart through a
//! `publish_contacts` call, which must happen exactly once per counterpart.
//! The book records who is already published so the composer can gate the
//! call.

use std::collections::HashMap;

use tokio::sync::Mutex as TokioMutex;

use crate::models::DirectContact;

#[derive(Default)]
pub struct DirectContactBook {
    contacts: TokioMutex<HashMap<String, DirectContact>>,
}

impl DirectContactBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore the book from previously published contacts.
    pub fn with_contacts(contacts: impl IntoIterator<Item = DirectContact>) -> Self {
        let contacts = contacts
            .into_iter()
            .map(|contact| (contact.name.clone(), contact))
            .collect();
        Self {
            contacts: TokioMutex::new(contacts),
        }
    }

    pub async fn contains(&self, name: &str) -> bool {
        let contacts = self.contacts.lock().await;
        contacts.contains_key(name)
    }

    /// Record a counterpart. Returns `true` when the contact was new and
    /// therefore needs to be published.
    pub async fn record(&self, contact: DirectContact) -> bool {
        let mut contacts = self.contacts.lock().await;
        contacts.insert(contact.name.clone(), contact).is_none()
    }

    pub async fn list(&self) -> Vec<DirectContact> {
        let contacts = self.contacts.lock().await;
        let mut list: Vec<DirectContact> = contacts.values().cloned().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }
}
