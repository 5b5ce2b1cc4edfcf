//! Voice command coordinator.
//!
//! Turns one inbound command into zero or more player operations plus exactly
//! one acknowledgement, and exactly one history write on a successful play.
//! Precondition and resolution failures become ephemeral replies here;
//! collaborator failures propagate to the transport layer via `Result`.

use crate::core::history;
use crate::core::node::AudioNode;
use crate::core::registry::{AcquireError, PlayerRegistry, SharedPlayer};
use crate::errors::Result;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{instrument, warn};

/// A finished command acknowledgement, tagged with its audience.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Visible to every participant of the originating channel.
    Public(String),
    /// Visible only to the requester.
    Ephemeral(String),
}

impl Reply {
    /// The acknowledgement text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Public(text) | Self::Ephemeral(text) => text,
        }
    }

    /// Whether only the requester should see this reply.
    #[must_use]
    pub const fn is_ephemeral(&self) -> bool {
        matches!(self, Self::Ephemeral(_))
    }
}

/// Outcome of the HTTP play path, which never creates a player.
#[derive(Debug, PartialEq, Eq)]
pub enum ApiPlayOutcome {
    /// No live player for the guild; the HTTP path does not join voice.
    NoPlayer,
    /// The query resolved to nothing.
    NoTrack,
    /// The track was handed to the player (started or queued).
    Accepted {
        /// Title of the resolved track
        track_title: String,
    },
}

/// Maps inbound commands onto the guild's player lifecycle.
pub struct Coordinator {
    registry: Arc<PlayerRegistry>,
    node: Arc<dyn AudioNode>,
    db: DatabaseConnection,
}

impl Coordinator {
    /// Creates a coordinator over the given registry, node and history store.
    pub fn new(
        registry: Arc<PlayerRegistry>,
        node: Arc<dyn AudioNode>,
        db: DatabaseConnection,
    ) -> Self {
        Self { registry, node, db }
    }

    /// Acquires the guild's player or produces the ephemeral failure reply.
    async fn acquire_or_reply(
        &self,
        guild_id: u64,
        user_channel: Option<u64>,
        join_if_absent: bool,
    ) -> std::result::Result<SharedPlayer, Reply> {
        match self
            .registry
            .acquire(guild_id, user_channel, join_if_absent)
            .await
        {
            Ok(player) => Ok(player),
            Err(err) => {
                if let AcquireError::Connect(source) = &err {
                    warn!(guild_id, error = %source, "player acquisition failed");
                }
                Err(Reply::Ephemeral(err.user_message().to_string()))
            }
        }
    }

    /// Resolves `query` and plays or enqueues the result, joining the
    /// requesting member's voice channel when no player exists yet.
    #[instrument(skip(self))]
    pub async fn play(
        &self,
        guild_id: u64,
        user_channel: Option<u64>,
        query: &str,
    ) -> Result<Reply> {
        let player = match self.acquire_or_reply(guild_id, user_channel, true).await {
            Ok(player) => player,
            Err(reply) => return Ok(reply),
        };

        let Some(track) = self.node.resolve(query).await? else {
            return Ok(Reply::Ephemeral("😖 No results.".to_string()));
        };

        let (position, session) = {
            let mut player = player.lock().await;
            (player.enqueue(track.clone()), player.session().clone())
        };
        if position == 0 {
            self.node.play(guild_id, &track, &session).await?;
        }

        // Best effort: a failed history write never rolls playback back.
        if let Err(err) = history::record_play(&self.db, guild_id, &track).await {
            warn!(guild_id, error = %err, "failed to record play history");
        }

        Ok(Reply::Public(if position == 0 {
            format!("🔈 Playing: {}", track.uri)
        } else {
            format!("🔈 Added to queue: {}", track.uri)
        }))
    }

    /// Halts playback and empties the queue.
    #[instrument(skip(self))]
    pub async fn stop(&self, guild_id: u64) -> Result<Reply> {
        let player = match self.acquire_or_reply(guild_id, None, false).await {
            Ok(player) => player,
            Err(reply) => return Ok(reply),
        };

        player.lock().await.clear();
        self.node.stop(guild_id).await?;

        Ok(Reply::Public("🛑 Playback stopped.".to_string()))
    }

    /// Drops the current track and starts the next queued one, if any.
    #[instrument(skip(self))]
    pub async fn skip(&self, guild_id: u64) -> Result<Reply> {
        let player = match self.acquire_or_reply(guild_id, None, false).await {
            Ok(player) => player,
            Err(reply) => return Ok(reply),
        };

        let (next, session) = {
            let mut player = player.lock().await;
            if player.current().is_none() {
                return Ok(Reply::Public("Nothing playing!".to_string()));
            }
            (player.advance().cloned(), player.session().clone())
        };

        match next {
            Some(track) => {
                self.node.play(guild_id, &track, &session).await?;
                Ok(Reply::Public(format!("Skipped. Now playing: {}", track.uri)))
            }
            None => {
                self.node.stop(guild_id).await?;
                Ok(Reply::Public(
                    "Skipped. Stopped playing because the queue is now empty.".to_string(),
                ))
            }
        }
    }

    /// Renders the current track and pending queue.
    #[instrument(skip(self))]
    pub async fn show_queue(&self, guild_id: u64) -> Result<Reply> {
        let player = match self.acquire_or_reply(guild_id, None, false).await {
            Ok(player) => player,
            Err(reply) => return Ok(reply),
        };

        let rendered = player.lock().await.render_queue();
        Ok(Reply::Public(rendered))
    }

    /// Leaves the voice channel and destroys the guild's player.
    #[instrument(skip(self))]
    pub async fn disconnect(&self, guild_id: u64) -> Result<Reply> {
        if let Err(reply) = self.acquire_or_reply(guild_id, None, false).await {
            return Ok(reply);
        }

        self.registry.disconnect(guild_id).await?;
        Ok(Reply::Public("👋 Disconnected from voice channel.".to_string()))
    }

    /// Play path for the REST API: requires an existing player and reports a
    /// typed outcome instead of chat text.
    #[instrument(skip(self))]
    pub async fn play_existing(&self, guild_id: u64, query: &str) -> Result<ApiPlayOutcome> {
        let Some(player) = self.registry.get(guild_id).await else {
            return Ok(ApiPlayOutcome::NoPlayer);
        };

        let Some(track) = self.node.resolve(query).await? else {
            return Ok(ApiPlayOutcome::NoTrack);
        };

        let (position, session) = {
            let mut player = player.lock().await;
            (player.enqueue(track.clone()), player.session().clone())
        };
        if position == 0 {
            self.node.play(guild_id, &track, &session).await?;
        }

        if let Err(err) = history::record_play(&self.db, guild_id, &track).await {
            warn!(guild_id, error = %err, "failed to record play history");
        }

        Ok(ApiPlayOutcome::Accepted {
            track_title: track.title,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{NodeCall, TestHarness, setup_coordinator, test_track};

    const GUILD: u64 = 3;
    const CHANNEL: u64 = 77;

    async fn harness_with_track(query: &str, id: &str) -> TestHarness {
        let harness = setup_coordinator().await;
        harness.node.add_track(query, test_track(id)).await;
        harness
    }

    #[tokio::test]
    async fn test_commands_without_player_report_bot_not_connected() {
        let harness = setup_coordinator().await;

        for reply in [
            harness.coordinator.stop(GUILD).await.unwrap(),
            harness.coordinator.skip(GUILD).await.unwrap(),
            harness.coordinator.show_queue(GUILD).await.unwrap(),
            harness.coordinator.disconnect(GUILD).await.unwrap(),
        ] {
            assert_eq!(
                reply,
                Reply::Ephemeral("The bot is currently not connected.".to_string())
            );
        }
        assert!(harness.node.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_play_requires_member_voice_channel() {
        let harness = harness_with_track("song", "a").await;

        let reply = harness.coordinator.play(GUILD, None, "song").await.unwrap();

        assert_eq!(
            reply,
            Reply::Ephemeral("You are not connected to a voice channel.".to_string())
        );
        assert!(harness.node.recorded_calls().await.is_empty());
        assert_eq!(harness.history_len().await, 0);
    }

    #[tokio::test]
    async fn test_play_with_no_results() {
        let harness = setup_coordinator().await;

        let reply = harness
            .coordinator
            .play(GUILD, Some(CHANNEL), "nope")
            .await
            .unwrap();

        assert_eq!(reply, Reply::Ephemeral("😖 No results.".to_string()));
        assert!(harness.node.recorded_calls().await.is_empty());
        assert_eq!(harness.history_len().await, 0);
    }

    #[tokio::test]
    async fn test_play_starts_immediately_on_empty_queue() {
        let harness = harness_with_track("song", "a").await;

        let reply = harness
            .coordinator
            .play(GUILD, Some(CHANNEL), "song")
            .await
            .unwrap();

        let track = test_track("a");
        assert_eq!(reply, Reply::Public(format!("🔈 Playing: {}", track.uri)));
        assert_eq!(
            harness.node.recorded_calls().await,
            vec![NodeCall::Play {
                guild_id: GUILD,
                identifier: "a".to_string()
            }]
        );

        let rows = harness.history_rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].track_id, "a");
        assert_eq!(rows[0].track_title, track.title);
        assert_eq!(rows[0].guild_id, GUILD as i64);
    }

    #[tokio::test]
    async fn test_play_enqueues_behind_current_track() {
        let harness = harness_with_track("first", "a").await;
        harness.node.add_track("second", test_track("b")).await;

        harness
            .coordinator
            .play(GUILD, Some(CHANNEL), "first")
            .await
            .unwrap();
        let reply = harness
            .coordinator
            .play(GUILD, Some(CHANNEL), "second")
            .await
            .unwrap();

        assert_eq!(
            reply,
            Reply::Public(format!("🔈 Added to queue: {}", test_track("b").uri))
        );
        // Only the first track was started on the node
        assert_eq!(harness.node.recorded_calls().await.len(), 1);
        // Both plays were recorded
        assert_eq!(harness.history_len().await, 2);
    }

    #[tokio::test]
    async fn test_skip_with_nothing_playing() {
        let harness = setup_coordinator().await;
        harness
            .registry
            .acquire(GUILD, Some(CHANNEL), true)
            .await
            .unwrap();

        let reply = harness.coordinator.skip(GUILD).await.unwrap();

        assert_eq!(reply, Reply::Public("Nothing playing!".to_string()));
        assert!(harness.node.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_skip_advances_to_next_track() {
        let harness = harness_with_track("first", "a").await;
        harness.node.add_track("second", test_track("b")).await;
        harness
            .coordinator
            .play(GUILD, Some(CHANNEL), "first")
            .await
            .unwrap();
        harness
            .coordinator
            .play(GUILD, Some(CHANNEL), "second")
            .await
            .unwrap();

        let reply = harness.coordinator.skip(GUILD).await.unwrap();

        assert_eq!(
            reply,
            Reply::Public(format!("Skipped. Now playing: {}", test_track("b").uri))
        );
        assert_eq!(
            harness.node.recorded_calls().await.last().unwrap(),
            &NodeCall::Play {
                guild_id: GUILD,
                identifier: "b".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_skip_that_empties_the_queue() {
        let harness = harness_with_track("song", "a").await;
        harness
            .coordinator
            .play(GUILD, Some(CHANNEL), "song")
            .await
            .unwrap();

        let reply = harness.coordinator.skip(GUILD).await.unwrap();

        assert_eq!(
            reply,
            Reply::Public("Skipped. Stopped playing because the queue is now empty.".to_string())
        );
        assert_eq!(
            harness.node.recorded_calls().await.last().unwrap(),
            &NodeCall::Stop { guild_id: GUILD }
        );
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_and_writes_no_history() {
        let harness = harness_with_track("song", "a").await;
        harness
            .coordinator
            .play(GUILD, Some(CHANNEL), "song")
            .await
            .unwrap();
        let history_after_play = harness.history_len().await;

        let first = harness.coordinator.stop(GUILD).await.unwrap();
        let second = harness.coordinator.stop(GUILD).await.unwrap();

        assert_eq!(first, Reply::Public("🛑 Playback stopped.".to_string()));
        assert_eq!(second, first);
        assert_eq!(harness.history_len().await, history_after_play);
    }

    #[tokio::test]
    async fn test_show_queue_renders_current_and_pending() {
        let harness = harness_with_track("first", "a").await;
        harness.node.add_track("second", test_track("b")).await;
        harness.node.add_track("third", test_track("c")).await;
        for query in ["first", "second", "third"] {
            harness
                .coordinator
                .play(GUILD, Some(CHANNEL), query)
                .await
                .unwrap();
        }

        let reply = harness.coordinator.show_queue(GUILD).await.unwrap();

        assert_eq!(
            reply,
            Reply::Public(format!(
                "🎵 Current Queue:\nNow Playing: {}\n1. {}\n2. {}\n",
                test_track("a").uri,
                test_track("b").uri,
                test_track("c").uri
            ))
        );
    }

    #[tokio::test]
    async fn test_show_queue_on_idle_player() {
        let harness = setup_coordinator().await;
        harness
            .registry
            .acquire(GUILD, Some(CHANNEL), true)
            .await
            .unwrap();

        let reply = harness.coordinator.show_queue(GUILD).await.unwrap();

        assert_eq!(
            reply,
            Reply::Public("🎵 Current Queue:\nThe queue is empty.\n".to_string())
        );
    }

    #[tokio::test]
    async fn test_disconnect_destroys_player() {
        let harness = harness_with_track("song", "a").await;
        harness
            .coordinator
            .play(GUILD, Some(CHANNEL), "song")
            .await
            .unwrap();

        let reply = harness.coordinator.disconnect(GUILD).await.unwrap();

        assert_eq!(
            reply,
            Reply::Public("👋 Disconnected from voice channel.".to_string())
        );
        assert!(harness.registry.get(GUILD).await.is_none());
        assert_eq!(harness.voice.disconnected().await, vec![GUILD]);

        // The next command hits the empty registry again
        let reply = harness.coordinator.stop(GUILD).await.unwrap();
        assert!(reply.is_ephemeral());
    }

    #[tokio::test]
    async fn test_play_existing_requires_live_player() {
        let harness = harness_with_track("song", "a").await;

        let outcome = harness
            .coordinator
            .play_existing(GUILD, "song")
            .await
            .unwrap();

        assert_eq!(outcome, ApiPlayOutcome::NoPlayer);
        assert!(harness.node.recorded_calls().await.is_empty());
        assert_eq!(harness.history_len().await, 0);
    }

    #[tokio::test]
    async fn test_play_existing_accepts_track() {
        let harness = harness_with_track("song", "a").await;
        harness
            .registry
            .acquire(GUILD, Some(CHANNEL), true)
            .await
            .unwrap();

        let outcome = harness
            .coordinator
            .play_existing(GUILD, "song")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ApiPlayOutcome::Accepted {
                track_title: test_track("a").title
            }
        );
        assert_eq!(harness.history_len().await, 1);
    }

    #[tokio::test]
    async fn test_play_existing_with_unresolved_query() {
        let harness = setup_coordinator().await;
        harness
            .registry
            .acquire(GUILD, Some(CHANNEL), true)
            .await
            .unwrap();

        let outcome = harness
            .coordinator
            .play_existing(GUILD, "nope")
            .await
            .unwrap();

        assert_eq!(outcome, ApiPlayOutcome::NoTrack);
        assert_eq!(harness.history_len().await, 0);
    }
}
