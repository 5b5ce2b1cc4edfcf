//! Per-guild player state: current track, pending queue, voice connection.

use crate::core::node::VoiceSession;
use crate::core::track::TrackDescriptor;
use std::collections::VecDeque;

/// Per-guild audio playback session.
///
/// One `GuildPlayer` exists per connected guild, owned by the
/// [`PlayerRegistry`](crate::core::registry::PlayerRegistry). All methods are
/// pure state transitions; the coordinator and registry issue the matching
/// audio node commands around them.
#[derive(Debug)]
pub struct GuildPlayer {
    guild_id: u64,
    channel_id: u64,
    session: VoiceSession,
    current: Option<TrackDescriptor>,
    queue: VecDeque<TrackDescriptor>,
}

impl GuildPlayer {
    /// Creates a player for a freshly opened voice connection.
    #[must_use]
    pub const fn new(guild_id: u64, channel_id: u64, session: VoiceSession) -> Self {
        Self {
            guild_id,
            channel_id,
            session,
            current: None,
            queue: VecDeque::new(),
        }
    }

    /// The guild this player belongs to.
    #[must_use]
    pub const fn guild_id(&self) -> u64 {
        self.guild_id
    }

    /// The voice channel this player is connected to.
    #[must_use]
    pub const fn channel_id(&self) -> u64 {
        self.channel_id
    }

    /// Handshake material for the guild's voice connection.
    #[must_use]
    pub const fn session(&self) -> &VoiceSession {
        &self.session
    }

    /// The track currently playing, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&TrackDescriptor> {
        self.current.as_ref()
    }

    /// Number of pending tracks behind the current one.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Accepts a resolved track.
    ///
    /// Returns the queue position: `0` means the track starts playing
    /// immediately (nothing was playing), any other value is the 1-based
    /// position behind the tracks already pending.
    pub fn enqueue(&mut self, track: TrackDescriptor) -> usize {
        if self.current.is_none() {
            self.current = Some(track);
            0
        } else {
            self.queue.push_back(track);
            self.queue.len()
        }
    }

    /// Drops the current track and promotes the next pending one, if any.
    pub fn advance(&mut self) -> Option<&TrackDescriptor> {
        self.current = self.queue.pop_front();
        self.current.as_ref()
    }

    /// Halts playback entirely: current track and pending queue are dropped.
    pub fn clear(&mut self) {
        self.current = None;
        self.queue.clear();
    }

    /// Renders the queue for the `queue` command.
    ///
    /// Header line, then `Now Playing` when a track is active, then the
    /// pending tracks with 1-based indices; the empty-queue line appears only
    /// when nothing is playing and nothing is pending.
    #[must_use]
    pub fn render_queue(&self) -> String {
        use std::fmt::Write;

        let mut out = String::from("🎵 Current Queue:\n");
        if let Some(track) = &self.current {
            let _ = writeln!(out, "Now Playing: {}", track.uri);
        }
        for (index, track) in self.queue.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", index + 1, track.uri);
        }
        if self.current.is_none() && self.queue.is_empty() {
            out.push_str("The queue is empty.\n");
        }
        out
    }
}
