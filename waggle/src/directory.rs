//! Account and community directory lookups consumed from the host platform.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{Channel, ChannelId};

/// Account record as returned by the platform's full-account lookup.
///
/// Only the fields the chat core reads are modelled; the platform response
/// carries much more.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccountRecord {
    pub name: String,
    /// JSON-encoded posting metadata, expected to hold a `profile` object.
    pub posting_json_metadata: Option<String>,
    pub created: Option<String>,
}

/// Community record as returned by the platform's community lookup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommunityRecord {
    pub name: String,
    pub title: String,
    pub about: String,
    pub subscribers: u64,
    pub created_at: String,
}

/// Seed a channel record for a freshly discovered community.
///
/// The transport calls this on community join: the channel id comes from
/// the transport, everything else from the community record.
pub fn channel_from_community(id: ChannelId, community: &CommunityRecord) -> Channel {
    let mut channel = Channel::new(id, community.title.clone()).with_community(&community.name);
    channel.about = community.about.clone();
    channel
}

#[async_trait]
pub trait AccountLookup: Send + Sync {
    /// Fetch the full account record, `None` when the account does not exist.
    async fn get_account_full(&self, username: &str)
    -> Result<Option<AccountRecord>, anyhow::Error>;
}

#[async_trait]
pub trait CommunityLookup: Send + Sync {
    /// Fetch a community record, `None` when no such community exists.
    /// `viewer` is the active user, when one is logged in.
    async fn get_community(
        &self,
        name: &str,
        viewer: Option<&str>,
    ) -> Result<Option<CommunityRecord>, anyhow::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn community_seeds_a_community_channel() {
        let record = CommunityRecord {
            name: "hive-rust".to_owned(),
            title: "Rustaceans".to_owned(),
            about: "all things rust".to_owned(),
            subscribers: 128,
            created_at: "2023-01-01".to_owned(),
        };
        let channel = channel_from_community(ChannelId::from("chan-1"), &record);
        assert_eq!(channel.name, "Rustaceans");
        assert_eq!(channel.about, "all things rust");
        assert_eq!(channel.community_name.as_deref(), Some("hive-rust"));
        assert!(channel.moderators.is_empty());
    }
}
