//! Collaborator seams: the audio node and the voice gateway.
//!
//! The coordinator and registry only ever talk to these traits. Production
//! implementations live in `crate::audio`; tests substitute in-memory fakes.

use crate::core::track::TrackDescriptor;
use crate::errors::Result;
use async_trait::async_trait;

/// Voice-connection material handed from the gateway to the audio node.
///
/// Produced by the gateway-side voice handshake and forwarded verbatim when a
/// guild's node player is first started.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoiceSession {
    /// Voice session id assigned by the gateway
    pub session_id: String,
    /// Voice server token
    pub token: String,
    /// Voice server endpoint (`host:port`)
    pub endpoint: String,
}

/// Client for the external audio node: track resolution plus the per-guild
/// player operations.
#[async_trait]
pub trait AudioNode: Send + Sync {
    /// Resolves a free-text query to at most one playable track.
    async fn resolve(&self, query: &str) -> Result<Option<TrackDescriptor>>;

    /// Starts (or replaces) playback of `track` on the guild's node player.
    async fn play(
        &self,
        guild_id: u64,
        track: &TrackDescriptor,
        voice: &VoiceSession,
    ) -> Result<()>;

    /// Stops whatever the guild's node player is currently playing.
    async fn stop(&self, guild_id: u64) -> Result<()>;

    /// Destroys the guild's node player entirely.
    async fn destroy(&self, guild_id: u64) -> Result<()>;
}

/// Opens and closes per-guild voice connections on the Discord gateway.
#[async_trait]
pub trait VoiceConnector: Send + Sync {
    /// Joins `channel_id` in `guild_id` and returns the handshake material.
    async fn connect(&self, guild_id: u64, channel_id: u64) -> Result<VoiceSession>;

    /// Leaves the guild's voice channel, if connected.
    async fn disconnect(&self, guild_id: u64) -> Result<()>;
}
