//! Resolved track descriptors.

use serde::{Deserialize, Serialize};

/// A single playable track as returned by the audio node's resolver.
///
/// Treated as an immutable value once resolved. `encoded` is the node's
/// opaque representation of the track and is handed back verbatim when
/// playback is started.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    /// Resolver-assigned identifier (stable across repeated resolutions)
    pub identifier: String,
    /// Human-readable title
    pub title: String,
    /// Canonical URI, used in user-facing acknowledgements
    pub uri: String,
    /// Node-opaque encoded form
    pub encoded: String,
}
