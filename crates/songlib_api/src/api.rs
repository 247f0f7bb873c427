//! Request handling for the song HTTP surface.
//!
//! # Responsibility
//! - Bind raw request parts to catalog service calls.
//! - Serialize results into `{data}` / `{error, details}` envelopes.
//! - Map catalog error kinds to HTTP status codes.
//!
//! # Invariants
//! - Handling never panics; every failure becomes an error envelope.
//! - Not-found maps to 404, validation to 400, everything else to 500.

use crate::routes::{resolve, Operation, Resolution};
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use songlib_core::{
    ErrorKind, NewSong, RepoError, SongId, SongPatch, SongRepository, SongService,
};
use std::time::Instant;

const DELETED_MESSAGE: &str = "Song deleted successfully";

/// Status code and JSON body produced for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub data: T,
}

/// Error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Serialize)]
struct MessageBody {
    message: &'static str,
}

#[derive(Debug)]
struct Failure {
    status: u16,
    error: &'static str,
    details: Option<String>,
}

impl Failure {
    fn bad_request(error: &'static str, details: impl Into<String>) -> Self {
        Self {
            status: 400,
            error,
            details: Some(details.into()),
        }
    }

    fn from_repo(error: &'static str, err: &RepoError) -> Self {
        Self {
            status: status_for(err.kind()),
            error,
            details: Some(err.to_string()),
        }
    }

    fn into_response(self) -> ApiResponse {
        error_response(self.status, self.error, self.details)
    }
}

/// Returns the HTTP status used for a catalog error kind.
pub fn status_for(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::Validation => 400,
        ErrorKind::NotFound => 404,
        ErrorKind::Connection | ErrorKind::Storage => 500,
    }
}

/// HTTP-facing adapter over the catalog service.
pub struct SongApi<R: SongRepository> {
    service: SongService<R>,
}

impl<R: SongRepository> SongApi<R> {
    pub fn new(service: SongService<R>) -> Self {
        Self { service }
    }

    /// Handles one request and always returns a response.
    pub fn handle(&self, method: &str, path: &str, body: &[u8]) -> ApiResponse {
        let started_at = Instant::now();
        let response = match resolve(method, path) {
            Resolution::Matched { operation, id } => self
                .dispatch(operation, id, body)
                .unwrap_or_else(Failure::into_response),
            Resolution::MethodNotAllowed => error_response(405, "Method not allowed", None),
            Resolution::NotFound => error_response(404, "Route not found", None),
        };

        let duration_ms = started_at.elapsed().as_millis();
        if response.status >= 500 {
            warn!(
                "event=api_request module=api status={} method={method} path={path} duration_ms={duration_ms}",
                response.status
            );
        } else {
            info!(
                "event=api_request module=api status={} method={method} path={path} duration_ms={duration_ms}",
                response.status
            );
        }
        response
    }

    fn dispatch(
        &self,
        operation: Operation,
        id: Option<&str>,
        body: &[u8],
    ) -> Result<ApiResponse, Failure> {
        match operation {
            Operation::ListSongs => {
                let songs = self
                    .service
                    .list_songs()
                    .map_err(|err| Failure::from_repo("Failed to retrieve songs", &err))?;
                success(200, &songs)
            }
            Operation::GetSong => {
                let id = parse_song_id(id)?;
                let song = self
                    .service
                    .get_song(id)
                    .map_err(|err| Failure::from_repo("Failed to retrieve song", &err))?;
                success(200, &song)
            }
            Operation::AddSong => {
                let new_song: NewSong = decode_payload(body)?;
                let song = self
                    .service
                    .add_song(&new_song)
                    .map_err(|err| Failure::from_repo("Failed to add song", &err))?;
                success(201, &song)
            }
            Operation::UpdateSong => {
                let id = parse_song_id(id)?;
                let patch: SongPatch = decode_payload(body)?;
                let song = self
                    .service
                    .update_song(id, &patch)
                    .map_err(|err| Failure::from_repo("Failed to update song", &err))?;
                success(200, &song)
            }
            Operation::DeleteSong => {
                let id = parse_song_id(id)?;
                self.service
                    .delete_song(id)
                    .map_err(|err| Failure::from_repo("Failed to delete song", &err))?;
                success(
                    200,
                    &MessageBody {
                        message: DELETED_MESSAGE,
                    },
                )
            }
        }
    }
}

fn parse_song_id(raw: Option<&str>) -> Result<SongId, Failure> {
    let raw = raw.unwrap_or_default();
    match raw.parse::<SongId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(Failure::bad_request(
            "Invalid song id",
            format!("song id must be a positive integer, got `{raw}`"),
        )),
    }
}

fn decode_payload<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, Failure> {
    serde_json::from_slice(body)
        .map_err(|err| Failure::bad_request("Invalid request payload", err.to_string()))
}

fn success<T: Serialize>(status: u16, data: &T) -> Result<ApiResponse, Failure> {
    let body = serde_json::to_value(SuccessResponse { data }).map_err(|err| Failure {
        status: 500,
        error: "Failed to encode response",
        details: Some(err.to_string()),
    })?;
    Ok(ApiResponse { status, body })
}

fn error_response(status: u16, error: &str, details: Option<String>) -> ApiResponse {
    let envelope = ErrorResponse {
        error: error.to_string(),
        details,
    };
    let body = serde_json::to_value(&envelope).unwrap_or_else(|_| Value::Null);
    ApiResponse { status, body }
}
