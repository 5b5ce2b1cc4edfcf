//! History sink - append-only log of successfully played tracks.
//!
//! One row is written per accepted play command; nothing updates or deletes
//! rows afterwards. The read queries back the stats and history endpoints.

use crate::core::track::TrackDescriptor;
use crate::entities::{PlayHistory, play_history};
use crate::errors::Result;
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, prelude::*};

/// Page size used when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Hard cap on the history page size. Callers asking for more get this much.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Appends one history row for a track the player just accepted.
pub async fn record_play(
    db: &DatabaseConnection,
    guild_id: u64,
    track: &TrackDescriptor,
) -> Result<play_history::Model> {
    let row = play_history::ActiveModel {
        track_id: Set(track.identifier.clone()),
        track_title: Set(track.title.clone()),
        played_at: Set(chrono::Utc::now()),
        // Discord snowflakes fit in i64
        guild_id: Set(guild_id as i64),
        ..Default::default()
    };

    row.insert(db).await.map_err(Into::into)
}

/// One page of history, newest first.
///
/// `page` is 1-based; values below 1 are treated as 1. `page_size` is clamped
/// to [`MAX_PAGE_SIZE`].
pub async fn recent_page(
    db: &DatabaseConnection,
    page: u64,
    page_size: u64,
) -> Result<Vec<play_history::Model>> {
    let page = page.max(1);
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);

    PlayHistory::find()
        .order_by_desc(play_history::Column::PlayedAt)
        .order_by_desc(play_history::Column::Id)
        .offset((page - 1) * page_size)
        .limit(page_size)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Total number of history rows.
pub async fn total_plays(db: &DatabaseConnection) -> Result<u64> {
    PlayHistory::find().count(db).await.map_err(Into::into)
}

/// Number of distinct track identifiers across all history rows.
pub async fn unique_tracks(db: &DatabaseConnection) -> Result<u64> {
    let ids: Vec<String> = PlayHistory::find()
        .select_only()
        .column(play_history::Column::TrackId)
        .distinct()
        .into_tuple()
        .all(db)
        .await?;

    Ok(ids.len() as u64)
}
