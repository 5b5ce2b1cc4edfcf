//! Guild-to-player registry.
//!
//! The registry is the only cross-command shared mutable state in the crate:
//! a concurrent keyed map from guild id to its single live player, with
//! per-guild mutual exclusion provided by the per-player async mutex.

use crate::core::node::{AudioNode, VoiceConnector};
use crate::core::player::GuildPlayer;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// A live player, shared between the command that acquired it and the node
/// event task. Locked for the duration of each state transition only.
pub type SharedPlayer = Arc<Mutex<GuildPlayer>>;

/// Why a player could not be produced for a command.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// Creating a player requires the requesting member to be in a voice
    /// channel the bot can join.
    #[error("requesting member is not in a voice channel")]
    UserNotInVoiceChannel,

    /// The command requires an existing player and none is live.
    #[error("no live player for this guild")]
    BotNotConnected,

    /// Opening the voice connection failed mid-acquire.
    #[error(transparent)]
    Connect(#[from] crate::errors::Error),
}

impl AcquireError {
    /// The user-facing text for a failed acquisition, delivered ephemerally.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::UserNotInVoiceChannel => "You are not connected to a voice channel.",
            Self::BotNotConnected => "The bot is currently not connected.",
            _ => "Unknown error.",
        }
    }
}

/// Concurrent guild-to-player map enforcing at most one live player per guild.
pub struct PlayerRegistry {
    players: RwLock<HashMap<u64, SharedPlayer>>,
    node: Arc<dyn AudioNode>,
    voice: Arc<dyn VoiceConnector>,
}

impl PlayerRegistry {
    /// Creates an empty registry backed by the given collaborators.
    pub fn new(node: Arc<dyn AudioNode>, voice: Arc<dyn VoiceConnector>) -> Self {
        Self {
            players: RwLock::new(HashMap::new()),
            node,
            voice,
        }
    }

    /// Retrieves the guild's player, creating it when `join_if_absent` is set.
    ///
    /// Creation requires `user_channel` (the requesting member's current voice
    /// channel) and opens the voice connection before the player becomes
    /// visible to other commands. The returned handle is only meant to live
    /// for the remainder of one command.
    pub async fn acquire(
        &self,
        guild_id: u64,
        user_channel: Option<u64>,
        join_if_absent: bool,
    ) -> Result<SharedPlayer, AcquireError> {
        if let Some(player) = self.players.read().await.get(&guild_id) {
            return Ok(Arc::clone(player));
        }

        if !join_if_absent {
            return Err(AcquireError::BotNotConnected);
        }
        let Some(channel_id) = user_channel else {
            return Err(AcquireError::UserNotInVoiceChannel);
        };

        // The write lock is held across the handshake so two concurrent
        // acquires for one guild cannot open two voice connections.
        let mut players = self.players.write().await;
        if let Some(player) = players.get(&guild_id) {
            return Ok(Arc::clone(player));
        }

        let session = self.voice.connect(guild_id, channel_id).await?;
        info!(guild_id, channel_id, "opened voice connection");

        let player = Arc::new(Mutex::new(GuildPlayer::new(guild_id, channel_id, session)));
        players.insert(guild_id, Arc::clone(&player));
        Ok(player)
    }

    /// Returns the guild's live player without ever creating one.
    pub async fn get(&self, guild_id: u64) -> Option<SharedPlayer> {
        self.players.read().await.get(&guild_id).map(Arc::clone)
    }

    /// Tears the guild's player down: node player destroyed, voice connection
    /// closed, map entry dropped. A no-op when no player is live.
    pub async fn disconnect(&self, guild_id: u64) -> crate::errors::Result<()> {
        let removed = self.players.write().await.remove(&guild_id);
        if removed.is_some() {
            self.node.destroy(guild_id).await?;
            self.voice.disconnect(guild_id).await?;
            info!(guild_id, "closed voice connection");
        }
        Ok(())
    }

    /// Queue advancement for a track the node reports as naturally finished.
    pub async fn handle_track_end(&self, guild_id: u64) -> crate::errors::Result<()> {
        let Some(player) = self.get(guild_id).await else {
            return Ok(());
        };

        let mut player = player.lock().await;
        let session = player.session().clone();
        if let Some(next) = player.advance().cloned() {
            debug!(guild_id, track = %next.identifier, "advancing to next queued track");
            self.node.play(guild_id, &next, &session).await?;
        }
        Ok(())
    }
}
