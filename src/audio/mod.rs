//! Production implementations of the audio collaborator seams.
//!
//! The audio node (a Lavalink v4 server) does all decoding and streaming;
//! this crate only resolves tracks, drives the node's per-guild players over
//! REST, and listens to its event socket. Voice-channel handshakes go through
//! songbird in gateway-only mode.

/// Node event socket (session handshake, track-end notifications)
pub mod events;
/// Lavalink v4 REST client
pub mod lavalink;
/// Songbird-backed voice connector
pub mod voice;
