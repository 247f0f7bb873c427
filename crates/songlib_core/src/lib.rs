//! Core persistence and service layer for the song catalog.
//! This crate is the single source of truth for song invariants and
//! storage error translation.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{ConnectionParams, DatabaseLocation, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::song::{NewSong, Song, SongId, SongPatch, SongValidationError};
pub use repo::song_repo::{ErrorKind, RepoError, RepoResult, SongRepository, SqliteSongRepository};
pub use service::song_service::SongService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
