//! Left-channel tracking.
//!
//! Leaving a community channel is a view-level exit: the channel record
//! survives, its id just lands in the persisted left-channel list and the
//! channel disappears from listings. A user can keep viewing a channel they
//! are leaving mid-session, so the visibility predicate takes an
//! actively-viewing override.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::Mutex as TokioMutex;
use tracing::info;

use crate::error::{ChatError, Result};
use crate::models::{Channel, ChannelId};
use crate::transport::MessageTransport;

pub struct MembershipTracker {
    left: TokioMutex<BTreeSet<ChannelId>>,
    transport: Arc<dyn MessageTransport>,
}

impl MembershipTracker {
    pub fn new(transport: Arc<dyn MessageTransport>) -> Self {
        Self::with_left_channels(transport, Vec::new())
    }

    /// Restore a tracker from the externally persisted left-channel list.
    pub fn with_left_channels(
        transport: Arc<dyn MessageTransport>,
        ids: impl IntoIterator<Item = ChannelId>,
    ) -> Self {
        Self {
            left: TokioMutex::new(ids.into_iter().collect()),
            transport,
        }
    }

    /// Leave a channel and persist the updated list. Already left channels
    /// are a no-op without a transport call. A persistence failure restores
    /// the previous set.
    pub async fn leave_channel(&self, id: ChannelId) -> Result<()> {
        let mut left = self.left.lock().await;
        if !left.insert(id.clone()) {
            return Ok(());
        }
        let ids: Vec<ChannelId> = left.iter().cloned().collect();
        if let Err(e) = self.transport.update_left_channel_list(&ids).await {
            left.remove(&id);
            return Err(ChatError::Delivery(e));
        }
        info!(channel = %id, "Left channel");
        Ok(())
    }

    /// Apply a transport-level rejoin event. Local only: whoever emitted the
    /// event already changed the remote list.
    pub async fn rejoin_channel(&self, id: &ChannelId) {
        let mut left = self.left.lock().await;
        if left.remove(id) {
            info!(channel = %id, "Rejoined channel");
        }
    }

    pub async fn has_left(&self, id: &ChannelId) -> bool {
        let left = self.left.lock().await;
        left.contains(id)
    }

    /// A channel is visible unless it has been left, except while it is the
    /// one being actively viewed.
    pub async fn is_visible(&self, id: &ChannelId, actively_viewing: bool) -> bool {
        actively_viewing || !self.has_left(id).await
    }

    /// Filter a channel list down to the visible ones. `viewing` is the
    /// channel currently open, if any.
    pub async fn visible_channels(
        &self,
        channels: Vec<Channel>,
        viewing: Option<&ChannelId>,
    ) -> Vec<Channel> {
        let left = self.left.lock().await;
        channels
            .into_iter()
            .filter(|channel| Some(&channel.id) == viewing || !left.contains(&channel.id))
            .collect()
    }

    pub async fn left_channels(&self) -> Vec<ChannelId> {
        let left = self.left.lock().await;
        left.iter().cloned().collect()
    }
}
