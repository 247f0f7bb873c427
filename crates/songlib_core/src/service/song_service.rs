//! Catalog use-case service.
//!
//! # Responsibility
//! - Provide the only song entry points other components may call.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic and returns repository errors
//!   unchanged in kind.

use crate::model::song::{NewSong, Song, SongId, SongPatch};
use crate::repo::song_repo::{RepoResult, SongRepository};

/// Use-case service wrapper for song catalog operations.
pub struct SongService<R: SongRepository> {
    repo: R,
}

impl<R: SongRepository> SongService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists every song in the catalog, ascending by id.
    pub fn list_songs(&self) -> RepoResult<Vec<Song>> {
        self.repo.list_songs()
    }

    /// Gets one song by id.
    pub fn get_song(&self, id: SongId) -> RepoResult<Song> {
        self.repo.get_song(id)
    }

    /// Adds a song and returns the stored record.
    pub fn add_song(&self, song: &NewSong) -> RepoResult<Song> {
        self.repo.create_song(song)
    }

    /// Merge-updates an existing song and returns the updated record.
    ///
    /// Returns repository-level not-found or validation errors unchanged.
    pub fn update_song(&self, id: SongId, patch: &SongPatch) -> RepoResult<Song> {
        self.repo.update_song(id, patch)
    }

    /// Hard-deletes a song by id.
    pub fn delete_song(&self, id: SongId) -> RepoResult<()> {
        self.repo.delete_song(id)
    }
}
