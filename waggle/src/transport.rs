//! The message transport as consumed by the chat core.
//!
//! The core never implements delivery itself: it hands messages and metadata
//! changes to whatever [`MessageTransport`] the embedding application
//! injects, and treats every call as asynchronous and fallible.

use async_trait::async_trait;

use crate::error::DeliveryError;
use crate::models::{Attachment, Channel, ChannelId, ReplyRef};

#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Deliver an encrypted direct message to the holder of `recipient_pubkey`.
    async fn send_direct_message(
        &self,
        recipient_pubkey: &str,
        body: &str,
    ) -> Result<(), DeliveryError>;

    /// Publish a message into a community channel.
    ///
    /// The transport may reject a sender present in the channel's
    /// removed-user set, but callers must not rely on that: the block status
    /// is pre-checked client-side and a blocked send never reaches here.
    async fn send_public_message(
        &self,
        channel: &Channel,
        body: &str,
        attachments: &[Attachment],
        reply_to: Option<&ReplyRef>,
    ) -> Result<(), DeliveryError>;

    /// Persist a channel metadata change. `old` is the pre-mutation record,
    /// `updated` the desired state; the transport applies last-write-wins.
    async fn update_channel(&self, old: &Channel, updated: &Channel) -> Result<(), DeliveryError>;

    /// Persist the full left-channel list of the active user.
    async fn update_left_channel_list(&self, ids: &[ChannelId]) -> Result<(), DeliveryError>;

    /// Publish a new direct contact of the active user.
    async fn publish_contacts(&self, name: &str, pubkey: &str) -> Result<(), DeliveryError>;
}
