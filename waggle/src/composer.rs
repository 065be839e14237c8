//! Outbound message pipeline.
//!
//! Validation happens before any transport call: an empty body or a pending
//! upload placeholder blocks the send, and a sender present in a community
//! channel's removed-user set is refused client-side with a warning instead
//! of relying on transport-side rejection.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::contact::DirectContactBook;
use crate::error::{Result, ValidationError};
use crate::models::{Channel, DirectContact, Draft, SentReceipt};
use crate::transport::MessageTransport;
use crate::upload::UPLOADING_PLACEHOLDER;

pub struct MessageComposer {
    transport: Arc<dyn MessageTransport>,
    contacts: Arc<DirectContactBook>,
}

impl MessageComposer {
    pub fn new(transport: Arc<dyn MessageTransport>, contacts: Arc<DirectContactBook>) -> Self {
        Self {
            transport,
            contacts,
        }
    }

    /// Send a direct message to a counterpart.
    ///
    /// A counterpart not yet in the contact book is published through the
    /// transport after the first successful send; publication failure is
    /// logged but does not fail the send that already went out.
    pub async fn send_direct(
        &self,
        counterpart: &DirectContact,
        draft: Draft,
    ) -> Result<SentReceipt> {
        Self::validate(&draft)?;
        self.transport
            .send_direct_message(&counterpart.pubkey, &draft.body)
            .await?;
        debug!(counterpart = %counterpart.name, "Direct message sent");

        if !self.contacts.contains(&counterpart.name).await {
            match self
                .transport
                .publish_contacts(&counterpart.name, &counterpart.pubkey)
                .await
            {
                Ok(()) => {
                    self.contacts.record(counterpart.clone()).await;
                }
                Err(e) => {
                    warn!(counterpart = %counterpart.name, error = %e, "Contact publication failed");
                }
            }
        }
        Ok(SentReceipt::new())
    }

    /// Send a public message into a community channel on behalf of the
    /// holder of `sender_pubkey`.
    pub async fn send_public(
        &self,
        channel: &Channel,
        sender_pubkey: &str,
        draft: Draft,
    ) -> Result<SentReceipt> {
        Self::validate(&draft)?;
        if channel.is_blocked(sender_pubkey) {
            warn!(channel = %channel.id, "Send refused, sender is blocked in this channel");
            return Err(ValidationError::SenderBlocked.into());
        }
        self.transport
            .send_public_message(
                channel,
                &draft.body,
                &draft.attachments,
                draft.reply_to.as_ref(),
            )
            .await?;
        debug!(channel = %channel.id, "Public message sent");
        Ok(SentReceipt::new())
    }

    fn validate(draft: &Draft) -> Result<()> {
        if draft.body.is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }
        if draft.body.contains(UPLOADING_PLACEHOLDER) {
            return Err(ValidationError::PendingUpload.into());
        }
        Ok(())
    }
}
