//! Song domain model.
//!
//! # Responsibility
//! - Define the persisted `Song` record returned to callers.
//! - Define write inputs (`NewSong`, `SongPatch`) that cannot carry
//!   store-managed fields.
//!
//! # Invariants
//! - `id`, `created_at` and `updated_at` are assigned by the store only.
//! - Every non-key field is optional; an all-default `NewSong` is valid.
//! - Text fields never contain NUL characters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned surrogate key. Monotonic and never reused.
pub type SongId = i64;

/// Persisted catalog record.
///
/// Instances are detached copies; mutating one never touches the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    /// Performer or group name. Not unique.
    pub group_name: String,
    /// Song title. Not unique.
    pub song_name: String,
    pub release_date: Option<DateTime<Utc>>,
    /// Lyrics or free-form body.
    pub text: String,
    /// Unvalidated URI reference.
    pub link: String,
    pub created_at: DateTime<Utc>,
    /// Last successful write. Never moves backward.
    pub updated_at: DateTime<Utc>,
}

/// Create input for a new song.
///
/// Unknown JSON fields are ignored, so clients echoing a full `Song` back
/// cannot smuggle in `id` or timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewSong {
    pub group_name: String,
    pub song_name: String,
    pub release_date: Option<DateTime<Utc>>,
    pub text: String,
    pub link: String,
}

impl NewSong {
    /// Creates an input with group and title set and every other field empty.
    pub fn new(group_name: impl Into<String>, song_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            song_name: song_name.into(),
            ..Self::default()
        }
    }

    /// Validates field-level invariants before persistence.
    pub fn validate(&self) -> Result<(), SongValidationError> {
        check_text("group_name", &self.group_name)?;
        check_text("song_name", &self.song_name)?;
        check_text("text", &self.text)?;
        check_text("link", &self.link)?;
        Ok(())
    }
}

/// Merge-update input.
///
/// # Semantics
/// - `None` leaves the stored value untouched.
/// - `Some("")` clears a text field.
/// - `release_date`: `None` untouched, `Some(None)` cleared, `Some(Some(_))`
///   replaced. On the wire that is absent / `null` / a timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub release_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl SongPatch {
    /// Returns whether the patch carries no field changes.
    pub fn is_empty(&self) -> bool {
        self.group_name.is_none()
            && self.song_name.is_none()
            && self.release_date.is_none()
            && self.text.is_none()
            && self.link.is_none()
    }

    /// Validates supplied fields. Omitted fields are not checked.
    pub fn validate(&self) -> Result<(), SongValidationError> {
        let fields = [
            ("group_name", &self.group_name),
            ("song_name", &self.song_name),
            ("text", &self.text),
            ("link", &self.link),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                check_text(field, value)?;
            }
        }
        Ok(())
    }
}

/// Field-level validation failure raised before any storage write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongValidationError {
    /// Text contains a NUL character, which the store cannot hold.
    NulCharacter { field: &'static str },
}

impl Display for SongValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NulCharacter { field } => {
                write!(f, "{field} must not contain NUL characters")
            }
        }
    }
}

impl Error for SongValidationError {}

fn check_text(field: &'static str, value: &str) -> Result<(), SongValidationError> {
    if value.contains('\0') {
        return Err(SongValidationError::NulCharacter { field });
    }
    Ok(())
}

// Present-but-null must stay distinguishable from absent.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::{NewSong, SongPatch, SongValidationError};

    #[test]
    fn default_new_song_is_valid() {
        assert!(NewSong::default().validate().is_ok());
    }

    #[test]
    fn new_song_rejects_nul_in_text() {
        let mut song = NewSong::new("Muse", "Uprising");
        song.text = "bad\0lyrics".to_string();
        assert_eq!(
            song.validate(),
            Err(SongValidationError::NulCharacter { field: "text" })
        );
    }

    #[test]
    fn patch_validation_skips_omitted_fields() {
        let patch = SongPatch {
            link: Some("https://example.com/\0".to_string()),
            ..SongPatch::default()
        };
        let err = patch.validate().unwrap_err();
        assert_eq!(err.to_string(), "link must not contain NUL characters");
        assert!(SongPatch::default().validate().is_ok());
    }

    #[test]
    fn default_patch_is_empty() {
        assert!(SongPatch::default().is_empty());
        let patch = SongPatch {
            release_date: Some(None),
            ..SongPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
