use std::collections::BTreeSet;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use super::{ChannelId, DateTime};

/// A direct or community conversation context.
///
/// Channels are created by the transport layer on first discovery and
/// mutated in place afterwards. Leaving a channel never deletes the record,
/// it only marks membership in the left-channel list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    pub about: String,
    // Set for community channels, `None` for direct ones.
    pub community_name: Option<String>,
    // Order is preserved for deterministic display only; privilege is
    // decided by role value.
    pub moderators: Vec<Moderator>,
    pub hidden_message_ids: BTreeSet<String>,
    pub removed_user_ids: BTreeSet<String>,
    pub created_at: DateTime,
}

impl Channel {
    pub fn new(id: ChannelId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            about: String::new(),
            community_name: None,
            moderators: Vec::new(),
            hidden_message_ids: BTreeSet::new(),
            removed_user_ids: BTreeSet::new(),
            created_at: DateTime::now(),
        }
    }

    pub fn with_community(mut self, community_name: impl Into<String>) -> Self {
        self.community_name = Some(community_name.into());
        self
    }

    pub fn is_community(&self) -> bool {
        self.community_name.is_some()
    }

    pub fn moderator(&self, name: &str) -> Option<&Moderator> {
        self.moderators.iter().find(|m| m.name == name)
    }

    pub fn is_moderator(&self, name: &str) -> bool {
        self.moderator(name).is_some()
    }

    /// Names of participants holding owner or admin privileges.
    pub fn admins(&self) -> Vec<String> {
        self.moderators
            .iter()
            .filter(|m| m.role >= ChannelRole::Admin)
            .map(|m| m.name.clone())
            .collect()
    }

    pub fn is_blocked(&self, pubkey: &str) -> bool {
        self.removed_user_ids.contains(pubkey)
    }

    /// Replace the mutable metadata fields from a patch, leaving identity
    /// and creation time untouched.
    pub fn apply(&mut self, patch: ChannelPatch) {
        self.name = patch.name;
        self.about = patch.about;
        self.moderators = patch.moderators;
        self.hidden_message_ids = patch.hidden_message_ids;
        self.removed_user_ids = patch.removed_user_ids;
    }

    /// A patch carrying the channel's current mutable metadata, ready to be
    /// modified and applied back.
    pub fn to_patch(&self) -> ChannelPatch {
        ChannelPatch {
            name: self.name.clone(),
            about: self.about.clone(),
            moderators: self.moderators.clone(),
            hidden_message_ids: self.hidden_message_ids.clone(),
            removed_user_ids: self.removed_user_ids.clone(),
        }
    }
}

/// Full replacement for a channel's mutable metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChannelPatch {
    pub name: String,
    pub about: String,
    pub moderators: Vec<Moderator>,
    pub hidden_message_ids: BTreeSet<String>,
    pub removed_user_ids: BTreeSet<String>,
}

/// A channel participant holding a role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moderator {
    // Unique within a channel.
    pub name: String,
    // Hex-encoded chat public key.
    pub pubkey: String,
    pub role: ChannelRole,
}

/// Channel privilege level, ordered from least to most privileged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelRole {
    Guest,
    Mod,
    Admin,
    Owner,
}

impl ChannelRole {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Mod => "mod",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }

    pub fn parse(value: &str) -> Result<Self, anyhow::Error> {
        match value {
            "guest" => Ok(Self::Guest),
            "mod" => Ok(Self::Mod),
            "admin" => Ok(Self::Admin),
            "owner" => Ok(Self::Owner),
            _ => Err(anyhow!("Unknown channel role: {}", value)),
        }
    }
}
