//! Static route table for the song HTTP surface.
//!
//! # Invariants
//! - Every route maps to exactly one catalog operation.
//! - A trailing slash is insignificant.

/// Base path for every song route.
pub const SONGS_PATH: &str = "/api/v1/songs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Parses an HTTP method token, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// Catalog operation selected by a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListSongs,
    GetSong,
    AddSong,
    UpdateSong,
    DeleteSong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathShape {
    /// `/api/v1/songs`
    Collection,
    /// `/api/v1/songs/{id}`
    Item,
}

struct RouteEntry {
    method: Method,
    shape: PathShape,
    operation: Operation,
}

const ROUTE_TABLE: &[RouteEntry] = &[
    RouteEntry {
        method: Method::Get,
        shape: PathShape::Collection,
        operation: Operation::ListSongs,
    },
    RouteEntry {
        method: Method::Get,
        shape: PathShape::Item,
        operation: Operation::GetSong,
    },
    RouteEntry {
        method: Method::Post,
        shape: PathShape::Collection,
        operation: Operation::AddSong,
    },
    RouteEntry {
        method: Method::Put,
        shape: PathShape::Item,
        operation: Operation::UpdateSong,
    },
    RouteEntry {
        method: Method::Delete,
        shape: PathShape::Item,
        operation: Operation::DeleteSong,
    },
];

/// Outcome of matching a request line against the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// `id` holds the raw, unparsed path segment for item routes.
    Matched {
        operation: Operation,
        id: Option<&'a str>,
    },
    /// Path is known but no route accepts this method.
    MethodNotAllowed,
    NotFound,
}

/// Resolves a method and path to a catalog operation.
pub fn resolve<'a>(method: &str, path: &'a str) -> Resolution<'a> {
    let Some((shape, id)) = classify_path(path) else {
        return Resolution::NotFound;
    };
    let Some(method) = Method::parse(method) else {
        return Resolution::MethodNotAllowed;
    };

    ROUTE_TABLE
        .iter()
        .find(|entry| entry.method == method && entry.shape == shape)
        .map_or(Resolution::MethodNotAllowed, |entry| Resolution::Matched {
            operation: entry.operation,
            id,
        })
}

fn classify_path(path: &str) -> Option<(PathShape, Option<&str>)> {
    let path = path.split_once('?').map_or(path, |(path, _)| path);
    let rest = path.trim_end_matches('/').strip_prefix(SONGS_PATH)?;
    if rest.is_empty() {
        return Some((PathShape::Collection, None));
    }

    let id = rest.strip_prefix('/')?;
    if id.is_empty() || id.contains('/') {
        return None;
    }
    Some((PathShape::Item, Some(id)))
}
