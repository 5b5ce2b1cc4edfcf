//! Play-history entity - one row per successfully issued play command.
//!
//! Rows are append-only: the coordinator inserts one right after the audio
//! node accepts a track, and nothing in the crate updates or deletes them
//! afterwards.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Play-history database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "play_history")]
pub struct Model {
    /// Unique identifier for the history row
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Resolver-assigned track identifier
    pub track_id: String,
    /// Human-readable track title
    pub track_title: String,
    /// When the track was submitted to the player (UTC)
    pub played_at: DateTimeUtc,
    /// Guild the track was played in (Discord snowflake, stored signed)
    pub guild_id: i64,
}

/// `PlayHistory` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
