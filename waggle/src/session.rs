//! Session coordination.
//!
//! Exactly one of four surfaces is active at a time, derived from the
//! session inputs: key onboarding, the private-key management view, the
//! chat room, or the idle default. The derivation is a pure function; the
//! [`ChatSession`] owns the inputs, re-derives after every change and
//! notifies its listener when the surface flips.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex as TokioMutex;
use tracing::{debug, info};

use crate::channel::ChannelStore;
use crate::error::Result;
use crate::keys::{KeyResolver, LocalKeys};
use crate::membership::MembershipTracker;
use crate::models::ChannelId;

/// The four mutually exclusive UI surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No local keypair: onboarding required.
    ImportKeys,
    /// The user asked to view or export the private key.
    ManageKey,
    /// A counterpart or a joined, non-left channel is selected.
    ChatRoom,
    /// Ready, nothing selected.
    Idle,
}

/// Inputs the state derivation depends on.
#[derive(Clone, Debug, Default)]
pub struct SessionInputs {
    pub has_active_user: bool,
    pub has_keys: bool,
    pub has_counterpart: bool,
    pub in_active_channel: bool,
    pub reveal_private_key: bool,
}

/// Pure surface selection. `ChatRoom` is only reachable with a resolved
/// keypair, and `ManageKey` overrides it while the reveal flag is set.
pub fn derive_state(inputs: &SessionInputs) -> SessionState {
    let is_ready = inputs.has_active_user && inputs.has_keys;
    if !is_ready {
        SessionState::ImportKeys
    } else if inputs.reveal_private_key {
        SessionState::ManageKey
    } else if inputs.has_counterpart || inputs.in_active_channel {
        SessionState::ChatRoom
    } else {
        SessionState::Idle
    }
}

#[async_trait]
pub trait SessionListener: Send + Sync {
    async fn on_state_changed(&self, state: SessionState);
}

struct StubListener;

#[async_trait]
impl SessionListener for StubListener {
    async fn on_state_changed(&self, state: SessionState) {
        _ = state;
    }
}

#[derive(Default)]
struct SessionInner {
    active_user: Option<String>,
    keys: Option<LocalKeys>,
    counterpart: Option<String>,
    current_channel: Option<ChannelId>,
    reveal_private_key: bool,
    last_state: Option<SessionState>,
}

/// Top-level coordinator over keys, channel membership and target
/// selection.
pub struct ChatSession {
    store: Arc<ChannelStore>,
    membership: Arc<MembershipTracker>,
    resolver: Arc<KeyResolver>,
    listener: Arc<dyn SessionListener>,
    inner: TokioMutex<SessionInner>,
}

impl ChatSession {
    pub fn new(
        store: Arc<ChannelStore>,
        membership: Arc<MembershipTracker>,
        resolver: Arc<KeyResolver>,
    ) -> Self {
        Self::with_listener(store, membership, resolver, Arc::new(StubListener))
    }

    pub fn with_listener<L>(
        store: Arc<ChannelStore>,
        membership: Arc<MembershipTracker>,
        resolver: Arc<KeyResolver>,
        listener: Arc<L>,
    ) -> Self
    where
        L: SessionListener + 'static,
    {
        Self {
            store,
            membership,
            resolver,
            listener,
            inner: TokioMutex::new(SessionInner::default()),
        }
    }

    pub async fn set_active_user(&self, username: Option<String>) {
        {
            let mut inner = self.inner.lock().await;
            inner.active_user = username;
        }
        self.refresh().await;
    }

    /// Attach the resolved local keypair, completing onboarding.
    pub async fn attach_keys(&self, keys: LocalKeys) {
        {
            let mut inner = self.inner.lock().await;
            info!(pubkey = %keys.public_hex(), "Local keypair attached");
            inner.keys = Some(keys);
        }
        self.refresh().await;
    }

    pub async fn keys(&self) -> Option<LocalKeys> {
        let inner = self.inner.lock().await;
        inner.keys.clone()
    }

    /// Select a direct counterpart by chat public key.
    pub async fn select_counterpart(&self, pubkey: Option<String>) {
        {
            let mut inner = self.inner.lock().await;
            inner.counterpart = pubkey;
            inner.current_channel = None;
        }
        self.refresh().await;
    }

    pub async fn counterpart(&self) -> Option<String> {
        let inner = self.inner.lock().await;
        inner.counterpart.clone()
    }

    pub async fn current_channel(&self) -> Option<ChannelId> {
        let inner = self.inner.lock().await;
        inner.current_channel.clone()
    }

    /// Toggle the private-key management view.
    pub async fn set_reveal_private_key(&self, reveal: bool) {
        {
            let mut inner = self.inner.lock().await;
            inner.reveal_private_key = reveal;
        }
        self.refresh().await;
    }

    /// Navigate to a profile or community page target.
    ///
    /// A target matching a tracked community channel opens that channel;
    /// anything else is treated as a username whose chat key is resolved
    /// into a direct counterpart. Resolution failure leaves the selection
    /// unchanged and surfaces as "not onboarded".
    pub async fn open_target(&self, target: &str) -> Result<SessionState> {
        if let Some(channel) = self.store.community_channel(target).await {
            {
                let mut inner = self.inner.lock().await;
                inner.current_channel = Some(channel.id.clone());
                inner.counterpart = None;
            }
            debug!(channel = %channel.id, "Opened community channel");
            self.refresh().await;
            return Ok(self.state().await);
        }

        let username = target.strip_prefix('@').unwrap_or(target);
        let pubkey = self.resolver.resolve_chat_key(username).await?;
        {
            let mut inner = self.inner.lock().await;
            inner.counterpart = Some(pubkey);
            inner.current_channel = None;
        }
        debug!(username, "Opened direct chat");
        self.refresh().await;
        Ok(self.state().await)
    }

    /// Drop the current selection, returning to the default surface.
    pub async fn close_target(&self) {
        {
            let mut inner = self.inner.lock().await;
            inner.counterpart = None;
            inner.current_channel = None;
        }
        self.refresh().await;
    }

    /// Current surface, derived from the live inputs.
    pub async fn state(&self) -> SessionState {
        derive_state(&self.inputs().await)
    }

    async fn inputs(&self) -> SessionInputs {
        let (active_user, has_keys, counterpart, current_channel, reveal) = {
            let inner = self.inner.lock().await;
            (
                inner.active_user.is_some(),
                inner.keys.is_some(),
                inner.counterpart.is_some(),
                inner.current_channel.clone(),
                inner.reveal_private_key,
            )
        };

        let in_active_channel = match current_channel {
            Some(id) => {
                self.store.get(&id).await.is_some() && !self.membership.has_left(&id).await
            }
            None => false,
        };

        SessionInputs {
            has_active_user: active_user,
            has_keys,
            has_counterpart: counterpart,
            in_active_channel,
            reveal_private_key: reveal,
        }
    }

    async fn refresh(&self) {
        let state = self.state().await;
        let changed = {
            let mut inner = self.inner.lock().await;
            if inner.last_state != Some(state) {
                inner.last_state = Some(state);
                true
            } else {
                false
            }
        };
        if changed {
            debug!(?state, "Session surface changed");
            self.listener.on_state_changed(state).await;
        }
    }
}
