//! Song repository contract and SQLite-backed storage gateway.
//!
//! # Responsibility
//! - Provide CRUD APIs over the canonical `songs` table.
//! - Keep SQL details inside the core persistence boundary.
//! - Translate driver failures into the catalog error taxonomy.
//!
//! # Invariants
//! - Write paths validate input before any SQL mutation.
//! - Missing keys surface as `RepoError::NotFound`, never as a silent
//!   zero-row success.
//! - `updated_at` is only ever raised, never lowered.
//! - List order is ascending by `id`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{open_with, ConnectionParams, DbError, DbResult};
use crate::model::song::{NewSong, Song, SongId, SongPatch, SongValidationError};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, error, info};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;
use std::time::Instant;

const SONG_COLUMNS: &[&str] = &[
    "id",
    "group_name",
    "song_name",
    "release_date",
    "text",
    "link",
    "created_at",
    "updated_at",
];

const SONG_SELECT_SQL: &str = "SELECT
    id,
    group_name,
    song_name,
    release_date,
    text,
    link,
    created_at,
    updated_at
FROM songs";

const SONG_RETURNING_SQL: &str = "RETURNING
    id,
    group_name,
    song_name,
    release_date,
    text,
    link,
    created_at,
    updated_at";

/// Current wall clock in epoch milliseconds, evaluated by the store.
const NOW_EPOCH_MS_SQL: &str = "CAST((julianday('now') - 2440587.5) * 86400000.0 AS INTEGER)";

pub type RepoResult<T> = Result<T, RepoError>;

/// Catalog-level failure category every caller can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Store unreachable or schema bootstrap failed. Fatal at startup.
    Connection,
    /// Requested key is absent.
    NotFound,
    /// Input rejected before reaching storage.
    Validation,
    /// Any other store-level failure.
    Storage,
}

/// Repository error for song persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Opening or bootstrapping the store failed.
    Connection(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    Validation(SongValidationError),
    NotFound(SongId),
    Db(DbError),
    /// Persisted row cannot be converted to a valid `Song`.
    InvalidData(String),
    /// A previous caller panicked while holding the connection.
    ConnectionPoisoned,
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => ErrorKind::Connection,
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Db(_) | Self::InvalidData(_) | Self::ConnectionPoisoned => ErrorKind::Storage,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(err) => write!(f, "song store unavailable: {err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "song repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "song repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "song repository requires column `{column}` in table `{table}`"
            ),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "song not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted song data: {message}"),
            Self::ConnectionPoisoned => write!(f, "song store connection is poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection(err) | Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SongValidationError> for RepoError {
    fn from(value: SongValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage gateway contract for song CRUD operations.
///
/// Every method is synchronous and durable: a successful write has been
/// committed by the time it returns.
pub trait SongRepository {
    /// Returns every persisted song, ascending by `id`.
    fn list_songs(&self) -> RepoResult<Vec<Song>>;
    /// Fetches exactly one song or fails with `NotFound`.
    fn get_song(&self, id: SongId) -> RepoResult<Song>;
    /// Persists a new song and returns it with store-managed fields set.
    fn create_song(&self, song: &NewSong) -> RepoResult<Song>;
    /// Merges supplied patch fields into an existing song and returns the
    /// row as written by that same statement.
    fn update_song(&self, id: SongId, patch: &SongPatch) -> RepoResult<Song>;
    /// Hard-deletes a song.
    fn delete_song(&self, id: SongId) -> RepoResult<()>;
}

/// SQLite-backed song repository owning the process-wide connection.
///
/// The connection is serialized behind a mutex, so one gateway can be shared
/// across request threads.
pub struct SqliteSongRepository {
    conn: Mutex<Connection>,
}

impl SqliteSongRepository {
    /// Opens the store, applies migrations and verifies the schema.
    ///
    /// Every failure is `ErrorKind::Connection`.
    pub fn initialize(params: &ConnectionParams) -> RepoResult<Self> {
        let conn = open_with(params).map_err(RepoError::Connection)?;
        Self::try_new(conn)
    }

    /// Wraps an already migrated connection.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_song_connection_ready(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn run<T: LoggedSongId>(
        &self,
        event: &'static str,
        song_id: Option<SongId>,
        operation: impl FnOnce(&Connection) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        let result = match self.conn.lock() {
            Ok(conn) => operation(&conn),
            Err(_) => Err(RepoError::ConnectionPoisoned),
        };

        let key = log_key(song_id, &result);
        let duration_ms = started_at.elapsed().as_millis();
        match &result {
            Ok(_) => debug!(
                "event={event} module=repo status=ok song_id={key} duration_ms={duration_ms}"
            ),
            Err(err) => match err.kind() {
                ErrorKind::NotFound => info!(
                    "event={event} module=repo status=not_found song_id={key} duration_ms={duration_ms}"
                ),
                ErrorKind::Validation => info!(
                    "event={event} module=repo status=rejected song_id={key} duration_ms={duration_ms} error={err}"
                ),
                ErrorKind::Connection | ErrorKind::Storage => error!(
                    "event={event} module=repo status=error song_id={key} duration_ms={duration_ms} error={err}"
                ),
            },
        }

        result
    }
}

impl SongRepository for SqliteSongRepository {
    fn list_songs(&self) -> RepoResult<Vec<Song>> {
        self.run("song_list", None, |conn| {
            let mut stmt = conn.prepare(&format!("{SONG_SELECT_SQL} ORDER BY id ASC;"))?;
            let mut rows = stmt.query([])?;
            let mut songs = Vec::new();

            while let Some(row) = rows.next()? {
                songs.push(parse_song_row(row)?);
            }

            Ok(songs)
        })
    }

    fn get_song(&self, id: SongId) -> RepoResult<Song> {
        self.run("song_get", Some(id), |conn| {
            let mut stmt = conn.prepare(&format!("{SONG_SELECT_SQL} WHERE id = ?1;"))?;
            let mut rows = stmt.query([id])?;
            let song = match rows.next()? {
                Some(row) => parse_song_row(row),
                None => Err(RepoError::NotFound(id)),
            };
            song
        })
    }

    fn create_song(&self, song: &NewSong) -> RepoResult<Song> {
        self.run("song_create", None, |conn| {
            song.validate()?;

            let mut stmt = conn.prepare(&format!(
                "INSERT INTO songs (
                    group_name,
                    song_name,
                    release_date,
                    text,
                    link
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                {SONG_RETURNING_SQL};"
            ))?;
            let mut rows = stmt.query(params![
                song.group_name.as_str(),
                song.song_name.as_str(),
                song.release_date.as_ref().map(format_release_date),
                song.text.as_str(),
                song.link.as_str(),
            ])?;

            let created = match rows.next()? {
                Some(row) => parse_song_row(row),
                None => Err(RepoError::InvalidData(
                    "insert into songs returned no row".to_string(),
                )),
            };
            created
        })
    }

    fn update_song(&self, id: SongId, patch: &SongPatch) -> RepoResult<Song> {
        self.run("song_update", Some(id), |conn| {
            patch.validate()?;

            let mut assignments: Vec<String> = Vec::new();
            let mut bind_values: Vec<Value> = Vec::new();

            let text_fields = [
                ("group_name", &patch.group_name),
                ("song_name", &patch.song_name),
                ("text", &patch.text),
                ("link", &patch.link),
            ];
            for (column, value) in text_fields {
                if let Some(value) = value {
                    assignments.push(format!("{column} = ?"));
                    bind_values.push(Value::Text(value.clone()));
                }
            }

            if let Some(release_date) = patch.release_date {
                assignments.push("release_date = ?".to_string());
                bind_values.push(match release_date {
                    Some(date) => Value::Text(format_release_date(&date)),
                    None => Value::Null,
                });
            }

            assignments.push(format!("updated_at = MAX(updated_at, {NOW_EPOCH_MS_SQL})"));
            bind_values.push(Value::Integer(id));

            let sql = format!(
                "UPDATE songs SET {} WHERE id = ? {SONG_RETURNING_SQL};",
                assignments.join(", ")
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(bind_values))?;

            let song = match rows.next()? {
                Some(row) => parse_song_row(row),
                None => Err(RepoError::NotFound(id)),
            };
            song
        })
    }

    fn delete_song(&self, id: SongId) -> RepoResult<()> {
        self.run("song_delete", Some(id), |conn| {
            let changed = conn.execute("DELETE FROM songs WHERE id = ?1;", [id])?;

            if changed == 0 {
                return Err(RepoError::NotFound(id));
            }

            Ok(())
        })
    }
}

fn parse_song_row(row: &Row<'_>) -> RepoResult<Song> {
    let release_date = match row.get::<_, Option<String>>("release_date")? {
        Some(value) => Some(parse_release_date(&value)?),
        None => None,
    };

    Ok(Song {
        id: row.get("id")?,
        group_name: row.get("group_name")?,
        song_name: row.get("song_name")?,
        release_date,
        text: row.get("text")?,
        link: row.get("link")?,
        created_at: parse_epoch_ms("created_at", row.get("created_at")?)?,
        updated_at: parse_epoch_ms("updated_at", row.get("updated_at")?)?,
    })
}

fn parse_epoch_ms(column: &str, value: i64) -> RepoResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid timestamp `{value}` in songs.{column}"))
    })
}

/// Release dates are caller-supplied, so they are kept as RFC 3339 text with
/// every fractional digit the caller sent.
fn format_release_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_release_date(value: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|err| {
            RepoError::InvalidData(format!(
                "invalid timestamp `{value}` in songs.release_date: {err}"
            ))
        })
}

/// Id reported in operation logs when the caller did not name one up front.
trait LoggedSongId {
    fn logged_song_id(&self) -> Option<SongId> {
        None
    }
}

impl LoggedSongId for Song {
    fn logged_song_id(&self) -> Option<SongId> {
        Some(self.id)
    }
}

impl LoggedSongId for Vec<Song> {}

impl LoggedSongId for () {}

fn log_key<T: LoggedSongId>(song_id: Option<SongId>, result: &RepoResult<T>) -> String {
    song_id
        .or_else(|| result.as_ref().ok().and_then(LoggedSongId::logged_song_id))
        .map_or_else(|| "none".to_string(), |id| id.to_string())
}

fn ensure_song_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn).map_err(RepoError::Connection)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "songs").map_err(RepoError::Connection)? {
        return Err(RepoError::MissingRequiredTable("songs"));
    }

    for &column in SONG_COLUMNS {
        if !table_has_column(conn, "songs", column).map_err(RepoError::Connection)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "songs",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> DbResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
