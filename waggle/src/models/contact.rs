use serde::{Deserialize, Serialize};

/// A discovered chat profile: maps a chat public key back to the account
/// name that published it. Used to resolve display names for blocked users.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    // Hex-encoded chat public key the profile was published under.
    pub creator: String,
    pub name: String,
}

/// A user the active user has previously exchanged direct messages with.
///
/// Contacts are published through the transport at most once per new
/// counterpart, see `DirectContactBook`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectContact {
    pub name: String,
    pub pubkey: String,
}
