use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex as TokioMutex;
use tracing::{info, warn};

use crate::error::{ChatError, Result, ValidationError};
use crate::models::{Channel, ChannelId, ChannelPatch, ChannelRole, Moderator, Profile};
use crate::transport::MessageTransport;

use super::{ChannelListener, StubListener};

/// What to do with an optimistic local mutation when the transport refuses
/// to persist it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncPolicy {
    /// Restore the pre-mutation channel. Local and remote state converge,
    /// at the cost of losing the edit.
    #[default]
    Rollback,
    /// Keep the local mutation and flag the channel as out of sync; the
    /// caller decides when to retry.
    MarkDirty,
}

struct ChannelEntry {
    channel: Channel,
    dirty: bool,
}

/// In-memory store of known channels, direct and community.
///
/// Mutations apply optimistically to the local record, then persist through
/// the transport. The two are not atomic; a persistence failure is resolved
/// per the configured [`SyncPolicy`].
pub struct ChannelStore {
    channels: TokioMutex<HashMap<ChannelId, ChannelEntry>>,
    transport: Arc<dyn MessageTransport>,
    policy: SyncPolicy,
    listener: Arc<dyn ChannelListener>,
}

impl ChannelStore {
    pub fn new(transport: Arc<dyn MessageTransport>, policy: SyncPolicy) -> Self {
        Self::with_listener(transport, policy, Arc::new(StubListener))
    }

    pub fn with_listener<L>(
        transport: Arc<dyn MessageTransport>,
        policy: SyncPolicy,
        listener: Arc<L>,
    ) -> Self
    where
        L: ChannelListener + 'static,
    {
        Self {
            channels: TokioMutex::new(HashMap::new()),
            transport,
            policy,
            listener,
        }
    }

    /// Register a channel discovered by the transport. An already known id
    /// keeps the existing record untouched.
    pub async fn track(&self, channel: Channel) {
        let mut channels = self.channels.lock().await;
        channels
            .entry(channel.id.clone())
            .or_insert_with(|| ChannelEntry {
                channel,
                dirty: false,
            });
    }

    pub async fn get(&self, id: &ChannelId) -> Option<Channel> {
        let channels = self.channels.lock().await;
        channels.get(id).map(|entry| entry.channel.clone())
    }

    pub async fn list(&self) -> Vec<Channel> {
        let channels = self.channels.lock().await;
        let mut list: Vec<Channel> = channels
            .values()
            .map(|entry| entry.channel.clone())
            .collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        list
    }

    /// The community channel matching a community name, if one is tracked.
    pub async fn community_channel(&self, community_name: &str) -> Option<Channel> {
        let channels = self.channels.lock().await;
        channels
            .values()
            .map(|entry| &entry.channel)
            .find(|channel| channel.community_name.as_deref() == Some(community_name))
            .cloned()
    }

    /// Whether a previous mutation left this channel out of sync with the
    /// transport (MarkDirty policy).
    pub async fn is_dirty(&self, id: &ChannelId) -> bool {
        let channels = self.channels.lock().await;
        channels.get(id).is_some_and(|entry| entry.dirty)
    }

    /// Replace a channel's mutable metadata and persist the change.
    pub async fn update_channel(&self, id: &ChannelId, patch: ChannelPatch) -> Result<Channel> {
        let mut channels = self.channels.lock().await;
        let entry = channels
            .get_mut(id)
            .ok_or_else(|| ValidationError::UnknownChannel(id.to_string()))?;

        let old = entry.channel.clone();
        entry.channel.apply(patch);

        match self.transport.update_channel(&old, &entry.channel).await {
            Ok(()) => {
                entry.dirty = false;
                let updated = entry.channel.clone();
                drop(channels);
                info!(channel = %id, "Channel metadata updated");
                self.listener.on_channel_updated(updated.clone()).await;
                Ok(updated)
            }
            Err(e) => match self.policy {
                SyncPolicy::Rollback => {
                    entry.channel = old;
                    drop(channels);
                    warn!(channel = %id, error = %e, "Channel update rolled back");
                    Err(ChatError::Delivery(e))
                }
                SyncPolicy::MarkDirty => {
                    entry.dirty = true;
                    drop(channels);
                    warn!(channel = %id, error = %e, "Channel update kept locally, out of sync");
                    self.listener.on_out_of_sync(id.clone()).await;
                    Err(ChatError::Delivery(e))
                }
            },
        }
    }

    /// Append a moderator. Refused when one with the same name already holds
    /// a role in the channel.
    pub async fn add_moderator(&self, id: &ChannelId, moderator: Moderator) -> Result<Channel> {
        let mut patch = self.patch_for(id).await?;
        if patch.moderators.iter().any(|m| m.name == moderator.name) {
            return Err(ValidationError::DuplicateModerator(moderator.name).into());
        }
        patch.moderators.push(moderator);
        self.update_channel(id, patch).await
    }

    /// Replace a moderator's role in place, preserving list position.
    pub async fn update_moderator_role(
        &self,
        id: &ChannelId,
        name: &str,
        role: ChannelRole,
    ) -> Result<Channel> {
        let mut patch = self.patch_for(id).await?;
        let moderator = patch
            .moderators
            .iter_mut()
            .find(|m| m.name == name)
            .ok_or_else(|| ValidationError::UnknownModerator(name.to_owned()))?;
        moderator.role = role;
        self.update_channel(id, patch).await
    }

    /// Add a user to the removed-user set. Idempotent: blocking an already
    /// blocked user changes nothing and skips the transport.
    pub async fn block_user(&self, id: &ChannelId, pubkey: &str) -> Result<Channel> {
        let mut patch = self.patch_for(id).await?;
        if !patch.removed_user_ids.insert(pubkey.to_owned()) {
            return self.unchanged(id).await;
        }
        self.update_channel(id, patch).await
    }

    /// Remove a user from the removed-user set. Idempotent like
    /// [`ChannelStore::block_user`].
    pub async fn unblock_user(&self, id: &ChannelId, pubkey: &str) -> Result<Channel> {
        let mut patch = self.patch_for(id).await?;
        if !patch.removed_user_ids.remove(pubkey) {
            return self.unchanged(id).await;
        }
        self.update_channel(id, patch).await
    }

    /// Hide a message from the channel view.
    pub async fn hide_message(&self, id: &ChannelId, message_id: &str) -> Result<Channel> {
        let mut patch = self.patch_for(id).await?;
        if !patch.hidden_message_ids.insert(message_id.to_owned()) {
            return self.unchanged(id).await;
        }
        self.update_channel(id, patch).await
    }

    pub async fn unhide_message(&self, id: &ChannelId, message_id: &str) -> Result<Channel> {
        let mut patch = self.patch_for(id).await?;
        if !patch.hidden_message_ids.remove(message_id) {
            return self.unchanged(id).await;
        }
        self.update_channel(id, patch).await
    }

    /// Resolve display names for a channel's blocked users against the
    /// discovered profile map. Unknown pubkeys are skipped.
    pub async fn blocked_users(&self, id: &ChannelId, profiles: &[Profile]) -> Vec<Profile> {
        let Some(channel) = self.get(id).await else {
            return Vec::new();
        };
        profiles
            .iter()
            .filter(|profile| channel.removed_user_ids.contains(&profile.creator))
            .cloned()
            .collect()
    }

    async fn patch_for(&self, id: &ChannelId) -> Result<ChannelPatch> {
        let channels = self.channels.lock().await;
        channels
            .get(id)
            .map(|entry| entry.channel.to_patch())
            .ok_or_else(|| ValidationError::UnknownChannel(id.to_string()).into())
    }

    async fn unchanged(&self, id: &ChannelId) -> Result<Channel> {
        self.get(id)
            .await
            .ok_or_else(|| ValidationError::UnknownChannel(id.to_string()).into())
    }
}
