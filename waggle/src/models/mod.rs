mod channel;
mod contact;
mod message;
mod types;

pub use channel::*;
pub use contact::*;
pub use message::*;
pub use types::*;
