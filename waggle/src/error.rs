//! Error taxonomy of the chat core.
//!
//! Lookup misses are non-fatal ([`ResolutionError`]), transport failures are
//! transient ([`DeliveryError`]), and local precondition failures block the
//! operation before any network call ([`ValidationError`]). Nothing here is
//! expected to escape to the rendering layer unhandled.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// A user, channel or key lookup found nothing usable. Treated as "has not
/// onboarded to chat", surfaced as a prompt rather than a failure.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("account {0} does not exist")]
    NoAccount(String),

    #[error("account {0} has no profile metadata")]
    NoMetadata(String),

    #[error("profile metadata of {0} is not valid JSON")]
    MalformedMetadata(String),

    #[error("account {0} has not joined the chat yet")]
    NoChatKey(String),

    #[error("lookup failed: {0}")]
    Lookup(String),
}

/// Message delivery or metadata persistence through the transport failed.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("recipient key could not be resolved")]
    RecipientUnresolved,

    #[error("network unreachable: {0}")]
    Unreachable(String),

    #[error("rejected by transport: {0}")]
    Rejected(String),
}

/// Local input failed a precondition. Raised before any transport call.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("unknown channel {0}")]
    UnknownChannel(String),

    #[error("{0} already holds a role in this channel")]
    DuplicateModerator(String),

    #[error("{0} holds no role in this channel")]
    UnknownModerator(String),

    #[error("message is empty")]
    EmptyMessage,

    #[error("an upload is still in progress")]
    PendingUpload,

    #[error("you have been blocked in this channel")]
    SenderBlocked,

    #[error("unsupported attachment type: {0}")]
    UnsupportedAttachment(String),
}

/// Attachment upload failure. Payload-too-large gets its own variant so the
/// caller can show a distinct message.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("image is too large")]
    TooLarge,

    #[error("upload failed: {0}")]
    Failed(String),
}
