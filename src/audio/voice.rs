//! Gateway-side voice connection handling.
//!
//! Songbird runs in gateway-only mode: it performs the voice-state handshake
//! with Discord and hands back the session/token/endpoint triple the audio
//! node needs. No audio is produced by this process.

use crate::core::node::{VoiceConnector, VoiceSession};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use songbird::Songbird;
use songbird::error::JoinError;
use std::sync::Arc;

/// [`VoiceConnector`] backed by a shared songbird manager.
pub struct SongbirdVoice {
    manager: Arc<Songbird>,
}

impl SongbirdVoice {
    /// Wraps the songbird manager registered on the gateway client.
    #[must_use]
    pub fn new(manager: Arc<Songbird>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl VoiceConnector for SongbirdVoice {
    async fn connect(&self, guild_id: u64, channel_id: u64) -> Result<VoiceSession> {
        let guild = serenity::GuildId::new(guild_id);
        let channel = serenity::ChannelId::new(channel_id);

        let (info, _call) = self.manager.join_gateway(guild, channel).await?;
        Ok(VoiceSession {
            session_id: info.session_id,
            token: info.token,
            endpoint: info.endpoint,
        })
    }

    async fn disconnect(&self, guild_id: u64) -> Result<()> {
        let guild = serenity::GuildId::new(guild_id);
        match self.manager.remove(guild).await {
            // Already gone is fine for an explicit disconnect
            Ok(()) | Err(JoinError::NoCall) => Ok(()),
            Err(err) => Err(Error::Voice(err)),
        }
    }
}
