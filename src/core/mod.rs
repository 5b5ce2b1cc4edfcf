//! Core business logic - framework-agnostic playback coordination.
//!
//! Nothing in here knows about Discord interactions or HTTP; the transports
//! in `bot` and `api` translate inbound requests into calls on these types.

/// Voice command coordinator - one inbound command in, one acknowledgement out
pub mod coordinator;
/// Append-only play-history sink and its read queries
pub mod history;
/// Collaborator seams: audio node client and voice gateway connector
pub mod node;
/// Per-guild player state (current track, pending queue, voice connection)
pub mod player;
/// Guild-to-player registry with per-guild mutual exclusion
pub mod registry;
/// Resolved track descriptors
pub mod track;
