//! HTTP adapter for the song catalog.
//!
//! # Responsibility
//! - Map `/api/v1/songs` verbs and paths to catalog service calls.
//! - Stay independent of any web framework; hosts feed raw request parts
//!   into `SongApi::handle`.

pub mod api;
pub mod routes;

pub use api::{status_for, ApiResponse, ErrorResponse, SongApi, SuccessResponse};
pub use routes::{resolve, Method, Operation, Resolution, SONGS_PATH};
