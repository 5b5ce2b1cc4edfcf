//! REST client for a Lavalink v4 audio node.

use crate::config::settings::LavalinkConfig;
use crate::core::node::{AudioNode, VoiceSession};
use crate::core::track::TrackDescriptor;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;

/// Search prefix applied to free-text queries; direct URLs pass through.
const SEARCH_PREFIX: &str = "ytsearch:";

/// Lavalink v4 REST client.
///
/// The session id arrives over the event socket once the node accepts the
/// websocket handshake; player operations fail with
/// [`Error::NodeSessionMissing`] until then.
pub struct LavalinkNode {
    http: reqwest::Client,
    base: String,
    password: String,
    session: RwLock<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct LoadResult {
    #[serde(rename = "loadType")]
    load_type: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    encoded: String,
    info: ApiTrackInfo,
}

#[derive(Debug, Deserialize)]
struct ApiTrackInfo {
    identifier: String,
    title: String,
    uri: Option<String>,
}

/// Picks the single track a load response resolves to, if any.
fn pick_track(load_type: &str, data: serde_json::Value) -> Option<ApiTrack> {
    match load_type {
        "track" => serde_json::from_value(data).ok(),
        "search" => serde_json::from_value::<Vec<ApiTrack>>(data)
            .ok()
            .and_then(|mut tracks| {
                if tracks.is_empty() {
                    None
                } else {
                    Some(tracks.remove(0))
                }
            }),
        "playlist" => data
            .get("tracks")
            .cloned()
            .and_then(|tracks| serde_json::from_value::<Vec<ApiTrack>>(tracks).ok())
            .and_then(|mut tracks| {
                if tracks.is_empty() {
                    None
                } else {
                    Some(tracks.remove(0))
                }
            }),
        // "empty" and "error"
        _ => None,
    }
}

fn into_descriptor(track: ApiTrack) -> TrackDescriptor {
    let ApiTrack { encoded, info } = track;
    let uri = info.uri.unwrap_or_else(|| info.identifier.clone());
    TrackDescriptor {
        identifier: info.identifier,
        title: info.title,
        uri,
        encoded,
    }
}

impl LavalinkNode {
    /// Creates a client for the node at `config.address`.
    #[must_use]
    pub fn new(config: &LavalinkConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: format!("http://{}", config.address),
            password: config.password.clone(),
            session: RwLock::new(None),
        }
    }

    /// Called by the event socket once the node reports `ready`.
    pub async fn set_session(&self, session_id: String) {
        *self.session.write().await = Some(session_id);
    }

    async fn session_id(&self) -> Result<String> {
        self.session
            .read()
            .await
            .clone()
            .ok_or(Error::NodeSessionMissing)
    }

    fn player_url(&self, session: &str, guild_id: u64) -> String {
        format!("{}/v4/sessions/{session}/players/{guild_id}", self.base)
    }
}

#[async_trait]
impl AudioNode for LavalinkNode {
    async fn resolve(&self, query: &str) -> Result<Option<TrackDescriptor>> {
        let identifier = if query.starts_with("http://") || query.starts_with("https://") {
            query.to_string()
        } else {
            format!("{SEARCH_PREFIX}{query}")
        };

        let response: LoadResult = self
            .http
            .get(format!("{}/v4/loadtracks", self.base))
            .header(AUTHORIZATION, self.password.as_str())
            .query(&[("identifier", identifier.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(load_type = %response.load_type, "track load response");
        Ok(pick_track(&response.load_type, response.data).map(into_descriptor))
    }

    async fn play(
        &self,
        guild_id: u64,
        track: &TrackDescriptor,
        voice: &VoiceSession,
    ) -> Result<()> {
        let session = self.session_id().await?;
        let body = json!({
            "track": { "encoded": track.encoded },
            "voice": {
                "token": voice.token,
                "endpoint": voice.endpoint,
                "sessionId": voice.session_id,
            },
        });

        self.http
            .patch(self.player_url(&session, guild_id))
            .header(AUTHORIZATION, self.password.as_str())
            .query(&[("noReplace", "false")])
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn stop(&self, guild_id: u64) -> Result<()> {
        // No session yet means nothing was ever started on the node
        let Some(session) = self.session.read().await.clone() else {
            return Ok(());
        };

        self.http
            .patch(self.player_url(&session, guild_id))
            .header(AUTHORIZATION, self.password.as_str())
            .json(&json!({ "track": { "encoded": null } }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn destroy(&self, guild_id: u64) -> Result<()> {
        let Some(session) = self.session.read().await.clone() else {
            return Ok(());
        };

        self.http
            .delete(self.player_url(&session, guild_id))
            .header(AUTHORIZATION, self.password.as_str())
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    fn track_json(id: &str) -> serde_json::Value {
        json!({
            "encoded": format!("enc:{id}"),
            "info": {
                "identifier": id,
                "title": format!("{id} title"),
                "uri": format!("https://tracks.example/{id}"),
            },
        })
    }

    #[test]
    fn test_pick_track_single() {
        let track = pick_track("track", track_json("a")).unwrap();
        assert_eq!(track.info.identifier, "a");
    }

    #[test]
    fn test_pick_track_search_takes_first() {
        let track = pick_track("search", json!([track_json("a"), track_json("b")])).unwrap();
        assert_eq!(track.info.identifier, "a");
    }

    #[test]
    fn test_pick_track_playlist_takes_first() {
        let data = json!({ "info": {}, "tracks": [track_json("a"), track_json("b")] });
        let track = pick_track("playlist", data).unwrap();
        assert_eq!(track.info.identifier, "a");
    }

    #[test]
    fn test_pick_track_empty_and_error() {
        assert!(pick_track("empty", json!({})).is_none());
        assert!(pick_track("error", json!({"message": "boom"})).is_none());
        assert!(pick_track("search", json!([])).is_none());
    }

    #[test]
    fn test_descriptor_falls_back_to_identifier_without_uri() {
        let track: ApiTrack = serde_json::from_value(json!({
            "encoded": "enc:a",
            "info": { "identifier": "a", "title": "a title", "uri": null },
        }))
        .unwrap();

        let descriptor = into_descriptor(track);
        assert_eq!(descriptor.uri, "a");
        assert_eq!(descriptor.encoded, "enc:a");
    }
}
