pub mod channel;
pub mod composer;
pub mod contact;
pub mod directory;
pub mod error;
pub mod keys;
pub mod membership;
pub mod models;
pub mod session;
pub mod transport;
pub mod upload;

pub use channel::{ChannelListener, ChannelStore, SyncPolicy};
pub use composer::MessageComposer;
pub use contact::DirectContactBook;
pub use error::{ChatError, DeliveryError, ResolutionError, UploadError, ValidationError};
pub use keys::{CHAT_KEY_FIELD, KeyResolver, LocalKeys, LookupSequence, LookupTicket};
pub use membership::MembershipTracker;
pub use session::{ChatSession, SessionListener, SessionState, derive_state};
pub use transport::MessageTransport;
