use chrono::{TimeZone, Utc};
use songlib_core::{NewSong, Song, SongPatch, SongValidationError};

#[test]
fn new_song_sets_defaults() {
    let song = NewSong::new("Muse", "Supermassive Black Hole");

    assert_eq!(song.group_name, "Muse");
    assert_eq!(song.song_name, "Supermassive Black Hole");
    assert_eq!(song.release_date, None);
    assert!(song.text.is_empty());
    assert!(song.link.is_empty());
    assert!(song.validate().is_ok());
}

#[test]
fn new_song_payload_ignores_store_managed_fields() {
    let json = serde_json::json!({
        "id": 99,
        "group_name": "Muse",
        "song_name": "Uprising",
        "created_at": "2001-01-01T00:00:00Z"
    });

    let song: NewSong = serde_json::from_value(json).unwrap();
    assert_eq!(song, NewSong::new("Muse", "Uprising"));
}

#[test]
fn empty_payload_decodes_to_default_new_song() {
    let song: NewSong = serde_json::from_str("{}").unwrap();
    assert_eq!(song, NewSong::default());
}

#[test]
fn song_serialization_uses_expected_wire_fields() {
    let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let song = Song {
        id: 1,
        group_name: "Muse".to_string(),
        song_name: "Supermassive Black Hole".to_string(),
        release_date: Some(Utc.with_ymd_and_hms(2006, 6, 19, 0, 0, 0).unwrap()),
        text: "Ooh baby, don't you know I suffer?".to_string(),
        link: "https://www.youtube.com/watch?v=Xsp3_a-PMTw".to_string(),
        created_at: created,
        updated_at: created,
    };

    let json = serde_json::to_value(&song).unwrap();
    assert_eq!(json["id"], 1);
    assert_eq!(json["group_name"], "Muse");
    assert_eq!(json["song_name"], "Supermassive Black Hole");
    assert_eq!(json["release_date"], "2006-06-19T00:00:00Z");
    assert_eq!(json["created_at"], "2024-05-01T12:00:00Z");
    assert_eq!(json["updated_at"], "2024-05-01T12:00:00Z");

    let decoded: Song = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, song);
}

#[test]
fn patch_distinguishes_absent_null_and_empty_fields() {
    let patch: SongPatch = serde_json::from_str(
        r#"{"song_name": "X", "text": "", "link": null, "release_date": null}"#,
    )
    .unwrap();

    assert_eq!(patch.song_name.as_deref(), Some("X"));
    assert_eq!(patch.text.as_deref(), Some(""));
    assert_eq!(patch.link, None);
    assert_eq!(patch.group_name, None);
    assert_eq!(patch.release_date, Some(None));
}

#[test]
fn patch_without_release_date_leaves_it_untouched() {
    let patch: SongPatch = serde_json::from_str(r#"{"group_name": "Muse"}"#).unwrap();
    assert_eq!(patch.release_date, None);

    let dated: SongPatch =
        serde_json::from_str(r#"{"release_date": "2009-09-14T00:00:00Z"}"#).unwrap();
    assert_eq!(
        dated.release_date,
        Some(Some(Utc.with_ymd_and_hms(2009, 9, 14, 0, 0, 0).unwrap()))
    );
}

#[test]
fn validate_rejects_nul_characters() {
    let mut song = NewSong::new("Mu\0se", "Uprising");
    assert_eq!(
        song.validate().unwrap_err(),
        SongValidationError::NulCharacter {
            field: "group_name"
        }
    );

    song.group_name = "Muse".to_string();
    assert!(song.validate().is_ok());
}
