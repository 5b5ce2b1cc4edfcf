//! Entity module - Contains all SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod play_history;

pub use play_history::{
    Column as PlayHistoryColumn, Entity as PlayHistory, Model as PlayHistoryModel,
};
