use async_trait::async_trait;

use crate::models::{Channel, ChannelId};

#[async_trait]
pub trait ChannelListener: Send + Sync {
    /// A channel's metadata changed and the change was accepted locally.
    async fn on_channel_updated(&self, channel: Channel);

    /// A metadata change could not be persisted and the channel is now out
    /// of sync with the transport (MarkDirty policy only).
    async fn on_out_of_sync(&self, channel_id: ChannelId);
}

pub(crate) struct StubListener;

#[async_trait]
impl ChannelListener for StubListener {
    async fn on_channel_updated(&self, channel: Channel) {
        _ = channel;
    }

    async fn on_out_of_sync(&self, channel_id: ChannelId) {
        _ = channel_id;
    }
}
