//! Chat key resolution.
//!
//! A user's chat public key lives inside their on-chain profile metadata:
//! `posting_json_metadata` is a JSON document whose `profile` object may
//! carry the key under [`CHAT_KEY_FIELD`]. Absence at any level means the
//! user has not onboarded to chat; it is reported as a [`ResolutionError`]
//! and never escapes the resolver as a raw failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;
use waggle_crypto::PrivateKey;

use crate::directory::AccountLookup;
use crate::error::{ResolutionError, ValidationError};
use crate::models::{Channel, ChannelRole, Moderator};

/// Profile metadata field holding the chat public key.
pub const CHAT_KEY_FIELD: &str = "nsPubKey";

/// The active user's keypair, sourced externally (key import or onboarding).
#[derive(Clone)]
pub struct LocalKeys {
    private_key: PrivateKey,
    public_hex: String,
}

impl LocalKeys {
    pub fn new(private_key: PrivateKey) -> Self {
        let public_hex = private_key.public_key().to_hex();
        Self {
            private_key,
            public_hex,
        }
    }

    pub fn generate() -> Result<Self, waggle_crypto::Error> {
        Ok(Self::new(PrivateKey::generate()?))
    }

    pub fn from_pem(pem: &str) -> Result<Self, waggle_crypto::Error> {
        Ok(Self::new(PrivateKey::from_pem(pem)?))
    }

    /// Hex-encoded public key, as published in profile metadata.
    pub fn public_hex(&self) -> &str {
        &self.public_hex
    }

    /// PEM export for the key-management screen.
    pub fn reveal_pem(&self) -> Result<String, waggle_crypto::Error> {
        self.private_key.to_pem()
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }
}

/// Monotonic ticket source for suppressing stale async lookup results.
///
/// Input-driven lookups (username typed into the role dialog) may resolve
/// out of order; only the result belonging to the most recent ticket is
/// applied, everything older is discarded.
#[derive(Default)]
pub struct LookupSequence {
    issued: AtomicU64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LookupTicket(u64);

impl LookupSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a new lookup, superseding all previous ones.
    pub fn begin(&self) -> LookupTicket {
        LookupTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether a newer lookup has been started since this ticket was issued.
    pub fn is_stale(&self, ticket: LookupTicket) -> bool {
        ticket.0 != self.issued.load(Ordering::SeqCst)
    }
}

/// Resolves chat public keys from account profile metadata.
pub struct KeyResolver {
    lookup: Arc<dyn AccountLookup>,
    sequence: LookupSequence,
}

impl KeyResolver {
    pub fn new(lookup: Arc<dyn AccountLookup>) -> Self {
        Self {
            lookup,
            sequence: LookupSequence::new(),
        }
    }

    pub fn sequence(&self) -> &LookupSequence {
        &self.sequence
    }

    /// Resolve the chat public key of `username`.
    pub async fn resolve_chat_key(&self, username: &str) -> Result<String, ResolutionError> {
        let account = self
            .lookup
            .get_account_full(username)
            .await
            .map_err(|e| ResolutionError::Lookup(e.to_string()))?
            .ok_or_else(|| ResolutionError::NoAccount(username.to_owned()))?;
        let metadata = account
            .posting_json_metadata
            .filter(|raw| !raw.is_empty())
            .ok_or_else(|| ResolutionError::NoMetadata(username.to_owned()))?;
        let document: serde_json::Value = serde_json::from_str(&metadata)
            .map_err(|_| ResolutionError::MalformedMetadata(username.to_owned()))?;
        let key = document
            .get("profile")
            .and_then(|profile| profile.get(CHAT_KEY_FIELD))
            .and_then(|key| key.as_str())
            .ok_or_else(|| ResolutionError::NoChatKey(username.to_owned()))?;
        debug!(username, "Resolved chat public key");
        Ok(key.to_owned())
    }

    /// Resolve under a ticket, returning `None` when a newer lookup has
    /// superseded this one while it was in flight.
    pub async fn resolve_chat_key_latest(
        &self,
        ticket: LookupTicket,
        username: &str,
    ) -> Option<Result<String, ResolutionError>> {
        let result = self.resolve_chat_key(username).await;
        if self.sequence.is_stale(ticket) {
            debug!(username, "Discarding stale key lookup result");
            return None;
        }
        Some(result)
    }

    /// Vet a role-assignment candidate against a channel.
    ///
    /// Distinguishes a missing account, missing metadata, a missing chat key
    /// and an already assigned moderator, in that order; on success returns
    /// the moderator record ready to append.
    pub async fn vet_moderator(
        &self,
        channel: &Channel,
        username: &str,
        role: ChannelRole,
    ) -> Result<Moderator, crate::error::ChatError> {
        let pubkey = self.resolve_chat_key(username).await?;
        if channel.is_moderator(username) {
            return Err(ValidationError::DuplicateModerator(username.to_owned()).into());
        }
        Ok(Moderator {
            name: username.to_owned(),
            pubkey,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::AccountRecord;
    use crate::error::ChatError;
    use crate::models::ChannelId;
    use async_trait::async_trait;

    struct MapLookup(std::collections::HashMap<String, AccountRecord>);

    #[async_trait]
    impl AccountLookup for MapLookup {
        async fn get_account_full(
            &self,
            username: &str,
        ) -> Result<Option<AccountRecord>, anyhow::Error> {
            Ok(self.0.get(username).cloned())
        }
    }

    fn resolver_with(records: Vec<AccountRecord>) -> KeyResolver {
        let map = records
            .into_iter()
            .map(|record| (record.name.clone(), record))
            .collect();
        KeyResolver::new(Arc::new(MapLookup(map)))
    }

    fn onboarded(name: &str, key: &str) -> AccountRecord {
        AccountRecord {
            name: name.to_owned(),
            posting_json_metadata: Some(format!(
                "{{\"profile\":{{\"name\":\"{name}\",\"{CHAT_KEY_FIELD}\":\"{key}\"}}}}"
            )),
            created: None,
        }
    }

    #[tokio::test]
    async fn resolves_key_from_profile() {
        let resolver = resolver_with(vec![onboarded("alice", "02abc")]);
        assert_eq!(resolver.resolve_chat_key("alice").await.unwrap(), "02abc");
    }

    #[tokio::test]
    async fn missing_account_is_no_account() {
        let resolver = resolver_with(vec![]);
        assert!(matches!(
            resolver.resolve_chat_key("ghost").await,
            Err(ResolutionError::NoAccount(_))
        ));
    }

    #[tokio::test]
    async fn missing_metadata_is_no_metadata() {
        let resolver = resolver_with(vec![AccountRecord {
            name: "bob".to_owned(),
            posting_json_metadata: None,
            created: None,
        }]);
        assert!(matches!(
            resolver.resolve_chat_key("bob").await,
            Err(ResolutionError::NoMetadata(_))
        ));
    }

    #[tokio::test]
    async fn malformed_metadata_never_escapes() {
        let resolver = resolver_with(vec![AccountRecord {
            name: "carol".to_owned(),
            posting_json_metadata: Some("{not json".to_owned()),
            created: None,
        }]);
        assert!(matches!(
            resolver.resolve_chat_key("carol").await,
            Err(ResolutionError::MalformedMetadata(_))
        ));
    }

    #[tokio::test]
    async fn profile_without_key_is_not_onboarded() {
        let resolver = resolver_with(vec![AccountRecord {
            name: "dave".to_owned(),
            posting_json_metadata: Some("{\"profile\":{\"name\":\"dave\"}}".to_owned()),
            created: None,
        }]);
        assert!(matches!(
            resolver.resolve_chat_key("dave").await,
            Err(ResolutionError::NoChatKey(_))
        ));
    }

    #[tokio::test]
    async fn vet_rejects_existing_moderator() {
        let resolver = resolver_with(vec![onboarded("alice", "02abc")]);
        let mut channel = Channel::new(ChannelId::from("c1"), "general");
        channel.moderators.push(Moderator {
            name: "alice".to_owned(),
            pubkey: "02abc".to_owned(),
            role: ChannelRole::Mod,
        });
        assert!(matches!(
            resolver
                .vet_moderator(&channel, "alice", ChannelRole::Admin)
                .await,
            Err(ChatError::Validation(ValidationError::DuplicateModerator(_)))
        ));
    }

    #[tokio::test]
    async fn vet_accepts_new_candidate() {
        let resolver = resolver_with(vec![onboarded("erin", "02def")]);
        let channel = Channel::new(ChannelId::from("c1"), "general");
        let moderator = resolver
            .vet_moderator(&channel, "erin", ChannelRole::Mod)
            .await
            .unwrap();
        assert_eq!(moderator.pubkey, "02def");
        assert_eq!(moderator.role, ChannelRole::Mod);
    }

    #[tokio::test]
    async fn stale_ticket_result_is_discarded() {
        let resolver = resolver_with(vec![onboarded("alice", "02abc")]);
        let first = resolver.sequence().begin();
        let second = resolver.sequence().begin();
        assert!(
            resolver
                .resolve_chat_key_latest(first, "alice")
                .await
                .is_none()
        );
        assert!(
            resolver
                .resolve_chat_key_latest(second, "alice")
                .await
                .is_some()
        );
    }
}
