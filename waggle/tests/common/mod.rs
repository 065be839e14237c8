use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use waggle::error::DeliveryError;
use waggle::models::{Attachment, Channel, ChannelId, ReplyRef};
use waggle::transport::MessageTransport;

/// Everything the core hands to the transport, recorded for assertions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportCall {
    DirectMessage {
        recipient: String,
        body: String,
    },
    PublicMessage {
        channel: ChannelId,
        body: String,
    },
    UpdateChannel {
        channel: ChannelId,
    },
    UpdateLeftChannels {
        ids: Vec<ChannelId>,
    },
    PublishContacts {
        name: String,
        pubkey: String,
    },
}

/// In-memory transport double with failure injection.
#[derive(Default)]
pub struct MemoryTransport {
    failing: AtomicBool,
    calls: Mutex<Vec<TransportCall>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: TransportCall) -> Result<(), DeliveryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DeliveryError::Unreachable("injected failure".to_owned()));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl MessageTransport for MemoryTransport {
    async fn send_direct_message(
        &self,
        recipient_pubkey: &str,
        body: &str,
    ) -> Result<(), DeliveryError> {
        self.record(TransportCall::DirectMessage {
            recipient: recipient_pubkey.to_owned(),
            body: body.to_owned(),
        })
    }

    async fn send_public_message(
        &self,
        channel: &Channel,
        body: &str,
        _attachments: &[Attachment],
        _reply_to: Option<&ReplyRef>,
    ) -> Result<(), DeliveryError> {
        self.record(TransportCall::PublicMessage {
            channel: channel.id.clone(),
            body: body.to_owned(),
        })
    }

    async fn update_channel(
        &self,
        _old: &Channel,
        updated: &Channel,
    ) -> Result<(), DeliveryError> {
        self.record(TransportCall::UpdateChannel {
            channel: updated.id.clone(),
        })
    }

    async fn update_left_channel_list(&self, ids: &[ChannelId]) -> Result<(), DeliveryError> {
        self.record(TransportCall::UpdateLeftChannels { ids: ids.to_vec() })
    }

    async fn publish_contacts(&self, name: &str, pubkey: &str) -> Result<(), DeliveryError> {
        self.record(TransportCall::PublishContacts {
            name: name.to_owned(),
            pubkey: pubkey.to_owned(),
        })
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(format!("{}=trace,waggle=trace", module_path!()))
        .try_init();
}
