//! Audio node event socket.
//!
//! Lavalink pushes a `ready` op carrying the session id required by the REST
//! player endpoints, then streams per-guild player events. Only track-end
//! events affect playback state here: a naturally finished track advances the
//! guild's queue.

use crate::audio::lavalink::LavalinkNode;
use crate::config::settings::LavalinkConfig;
use crate::core::registry::PlayerRegistry;
use crate::errors::{Error, Result};
use futures_util::StreamExt;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tracing::{debug, info, warn};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
#[serde(tag = "op")]
enum NodeMessage {
    #[serde(rename = "ready")]
    Ready {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    #[serde(rename = "event")]
    Event {
        #[serde(rename = "type")]
        kind: String,
        #[serde(rename = "guildId")]
        guild_id: String,
        #[serde(default)]
        reason: Option<String>,
    },
    #[serde(rename = "playerUpdate")]
    PlayerUpdate {},
    #[serde(rename = "stats")]
    Stats {},
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| Error::Config {
        message: format!("value not usable as a header: {value}"),
    })
}

/// Runs the node event loop until the process exits, reconnecting on failure.
pub async fn run(
    config: LavalinkConfig,
    user_id: u64,
    node: Arc<LavalinkNode>,
    registry: Arc<PlayerRegistry>,
) {
    loop {
        if let Err(err) = connect_and_listen(&config, user_id, &node, &registry).await {
            warn!(error = %err, "audio node socket closed, retrying");
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

async fn connect_and_listen(
    config: &LavalinkConfig,
    user_id: u64,
    node: &LavalinkNode,
    registry: &PlayerRegistry,
) -> Result<()> {
    let mut request = format!("ws://{}/v4/websocket", config.address).into_client_request()?;
    let headers = request.headers_mut();
    headers.insert("Authorization", header_value(&config.password)?);
    headers.insert("User-Id", header_value(&user_id.to_string())?);
    headers.insert(
        "Client-Name",
        header_value(concat!("jukebot/", env!("CARGO_PKG_VERSION")))?,
    );

    let (mut stream, _) = connect_async(request).await?;
    info!(address = %config.address, "connected to audio node");

    while let Some(message) = stream.next().await {
        let Message::Text(text) = message? else {
            continue;
        };
        let parsed: NodeMessage = match serde_json::from_str(text.as_str()) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(error = %err, "unrecognized node payload");
                continue;
            }
        };

        match parsed {
            NodeMessage::Ready { session_id } => {
                info!("audio node session ready");
                node.set_session(session_id).await;
            }
            NodeMessage::Event {
                kind,
                guild_id,
                reason,
            } if kind == "TrackEndEvent" => {
                let Ok(guild_id) = guild_id.parse::<u64>() else {
                    continue;
                };
                // Ends we caused ourselves (stop, replace, disconnect) have
                // already adjusted the queue and must not advance it again.
                if matches!(reason.as_deref(), Some("finished" | "loadFailed")) {
                    if let Err(err) = registry.handle_track_end(guild_id).await {
                        warn!(guild_id, error = %err, "queue advancement failed");
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}
