//! Shared test utilities for jukebot.
//!
//! Provides the in-memory database setup, fake collaborator implementations
//! that record every issued operation, and a pre-wired coordinator harness.

#![allow(clippy::expect_used)]

use crate::config;
use crate::core::coordinator::Coordinator;
use crate::core::node::{AudioNode, VoiceConnector, VoiceSession};
use crate::core::registry::PlayerRegistry;
use crate::core::track::TrackDescriptor;
use crate::entities::{PlayHistory, play_history};
use crate::errors::Result;
use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a deterministic track descriptor from a short id.
#[must_use]
pub fn test_track(id: &str) -> TrackDescriptor {
    TrackDescriptor {
        identifier: id.to_string(),
        title: format!("{id} title"),
        uri: format!("https://tracks.example/{id}"),
        encoded: format!("enc:{id}"),
    }
}

/// Builds a voice session as the fake connector would hand it out.
#[must_use]
pub fn test_session(guild_id: u64) -> VoiceSession {
    VoiceSession {
        session_id: format!("session-{guild_id}"),
        token: "token".to_string(),
        endpoint: "voice.example:443".to_string(),
    }
}

/// Every player-affecting call issued against the fake audio node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeCall {
    Play { guild_id: u64, identifier: String },
    Stop { guild_id: u64 },
    Destroy { guild_id: u64 },
}

/// In-memory audio node: resolves queries from a fixed catalog and records
/// every issued player operation.
#[derive(Default)]
pub struct FakeNode {
    catalog: Mutex<HashMap<String, TrackDescriptor>>,
    calls: Mutex<Vec<NodeCall>>,
}

impl FakeNode {
    /// Registers a track the resolver will return for `query`.
    pub async fn add_track(&self, query: &str, track: TrackDescriptor) {
        self.catalog.lock().await.insert(query.to_string(), track);
    }

    /// All player operations issued so far, in order.
    pub async fn recorded_calls(&self) -> Vec<NodeCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl AudioNode for FakeNode {
    async fn resolve(&self, query: &str) -> Result<Option<TrackDescriptor>> {
        Ok(self.catalog.lock().await.get(query).cloned())
    }

    async fn play(
        &self,
        guild_id: u64,
        track: &TrackDescriptor,
        _voice: &VoiceSession,
    ) -> Result<()> {
        self.calls.lock().await.push(NodeCall::Play {
            guild_id,
            identifier: track.identifier.clone(),
        });
        Ok(())
    }

    async fn stop(&self, guild_id: u64) -> Result<()> {
        self.calls.lock().await.push(NodeCall::Stop { guild_id });
        Ok(())
    }

    async fn destroy(&self, guild_id: u64) -> Result<()> {
        self.calls.lock().await.push(NodeCall::Destroy { guild_id });
        Ok(())
    }
}

/// Voice connector double; always succeeds and records the traffic.
#[derive(Default)]
pub struct FakeVoice {
    connected: Mutex<Vec<u64>>,
    disconnected: Mutex<Vec<u64>>,
}

impl FakeVoice {
    /// Guilds a connection was opened for, in order.
    pub async fn connected(&self) -> Vec<u64> {
        self.connected.lock().await.clone()
    }

    /// Guilds a connection was closed for, in order.
    pub async fn disconnected(&self) -> Vec<u64> {
        self.disconnected.lock().await.clone()
    }
}

#[async_trait]
impl VoiceConnector for FakeVoice {
    async fn connect(&self, guild_id: u64, _channel_id: u64) -> Result<VoiceSession> {
        self.connected.lock().await.push(guild_id);
        Ok(test_session(guild_id))
    }

    async fn disconnect(&self, guild_id: u64) -> Result<()> {
        self.disconnected.lock().await.push(guild_id);
        Ok(())
    }
}

/// A fully wired coordinator over fakes and an in-memory database.
pub struct TestHarness {
    pub coordinator: Arc<Coordinator>,
    pub registry: Arc<PlayerRegistry>,
    pub node: Arc<FakeNode>,
    pub voice: Arc<FakeVoice>,
    pub db: DatabaseConnection,
}

impl TestHarness {
    /// Number of history rows currently stored.
    pub async fn history_len(&self) -> usize {
        self.history_rows().await.len()
    }

    /// All history rows currently stored, unordered.
    pub async fn history_rows(&self) -> Vec<play_history::Model> {
        PlayHistory::find()
            .all(&self.db)
            .await
            .expect("history query failed")
    }
}

/// Sets up the complete test environment for coordinator-level tests.
pub async fn setup_coordinator() -> TestHarness {
    let db = setup_test_db().await.expect("test database setup failed");
    let node = Arc::new(FakeNode::default());
    let voice = Arc::new(FakeVoice::default());
    let registry = Arc::new(PlayerRegistry::new(
        Arc::clone(&node) as Arc<dyn AudioNode>,
        Arc::clone(&voice) as Arc<dyn VoiceConnector>,
    ));
    let coordinator = Arc::new(Coordinator::new(
        Arc::clone(&registry),
        Arc::clone(&node) as Arc<dyn AudioNode>,
        db.clone(),
    ));

    TestHarness {
        coordinator,
        registry,
        node,
        voice,
        db,
    }
}
