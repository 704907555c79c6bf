use crate::builder::{self, BuildOutcome};
use crate::db::Database;
use crate::error::PlannerError;
use crate::metadata;
use crate::models::{AppSettings, Show, Song, StagedSong};
use crate::replacement;
use crate::rotation::{self, Availability};
use crate::segmenter::{self, HourSegment};
use chrono::{Local, Utc};
use serde::Serialize;
use std::sync::Mutex;
use tauri::{Manager, State};
use uuid::Uuid;

pub struct AppState {
    pub db: Mutex<Database>,
}

fn log(app: &tauri::AppHandle, level: &str, message: &str) {
    app.state::<crate::logging::LogState>()
        .add_log(level, message, app);
}

// ── Library ──────────────────────────────────────────────────────────

#[tauri::command]
pub async fn get_songs(state: State<'_, AppState>) -> Result<Vec<Song>, String> {
    let db = state.db.lock().map_err(|_| "Failed to lock DB".to_string())?;
    db.get_all_songs().map_err(|e| e.to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongAvailability {
    pub song_id: String,
    pub is_available: bool,
    pub reason: Option<String>,
}

/// Current eligibility verdict for every library song, for display.
#[tauri::command]
pub async fn get_song_availability(
    state: State<'_, AppState>,
) -> Result<Vec<SongAvailability>, String> {
    let db = state.db.lock().map_err(|_| "Failed to lock DB".to_string())?;
    let songs = db.get_all_songs().map_err(|e| e.to_string())?;
    let shows = db.get_all_shows().map_err(|e| e.to_string())?;

    Ok(songs
        .iter()
        .map(|song| {
            let Availability {
                is_available,
                reason,
            } = rotation::evaluate(song, &shows);
            SongAvailability {
                song_id: song.id.clone(),
                is_available,
                reason,
            }
        })
        .collect())
}

/// Reads tags and duration for each picked file. Per-file failures are
/// reported on the staged entry, never as a batch error.
#[tauri::command]
pub async fn stage_songs(paths: Vec<String>) -> Result<Vec<StagedSong>, String> {
    Ok(paths.iter().map(|p| metadata::stage_file(p)).collect())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
}

#[tauri::command]
pub async fn import_songs(
    app: tauri::AppHandle,
    staged: Vec<StagedSong>,
    state: State<'_, AppState>,
) -> Result<ImportSummary, String> {
    let db = state.db.lock().map_err(|_| "Failed to lock DB".to_string())?;
    let library = db.get_all_songs().map_err(|e| e.to_string())?;

    let now = Utc::now().timestamp_millis();
    let (changed, skipped) = merge_staged_songs(&staged, &library, now);
    let mut imported = 0;
    let mut updated = 0;
    for song in &changed {
        let existed = library.iter().any(|s| s.id == song.id);
        db.upsert_song(song).map_err(|e| e.to_string())?;
        if existed {
            updated += 1;
        } else {
            imported += 1;
        }
    }

    log(
        &app,
        "INFO",
        &format!(
            "Import finished: {} new, {} overwritten, {} skipped",
            imported, updated, skipped
        ),
    );
    Ok(ImportSummary {
        imported,
        updated,
        skipped,
    })
}

/// Applies staged entries against the library snapshot. An entry whose
/// trimmed (title, artist) pair matches an existing song case-insensitively
/// overwrites that song's file details and upload time while keeping its id
/// and show history; anything else becomes a new song. Entries missing a
/// title or artist are skipped.
fn merge_staged_songs(
    staged: &[StagedSong],
    library: &[Song],
    now: i64,
) -> (Vec<Song>, usize) {
    let mut changed: Vec<Song> = Vec::new();
    let mut skipped = 0;

    for entry in staged {
        let title = entry.title.trim();
        let artist = entry.artist.trim();
        if title.is_empty() || artist.is_empty() {
            skipped += 1;
            continue;
        }

        let existing = library.iter().find(|s| {
            s.title.trim().eq_ignore_ascii_case(title) && s.artist.trim().eq_ignore_ascii_case(artist)
        });

        match existing {
            Some(song) => changed.push(Song {
                file_name: Some(entry.file_name.clone()),
                duration_seconds: entry.duration_seconds,
                uploaded_at: now,
                ..song.clone()
            }),
            None => changed.push(Song {
                id: Uuid::new_v4().to_string(),
                title: title.to_string(),
                artist: artist.to_string(),
                uploaded_at: now,
                duration_seconds: entry.duration_seconds,
                file_name: Some(entry.file_name.clone()),
                last_used_in_show_details: None,
            }),
        }
    }

    (changed, skipped)
}

#[tauri::command]
pub async fn delete_song(
    app: tauri::AppHandle,
    song_id: String,
    state: State<'_, AppState>,
) -> Result<(), String> {
    let db = state.db.lock().map_err(|_| "Failed to lock DB".to_string())?;
    if db.get_song(&song_id).map_err(|e| e.to_string())?.is_none() {
        return Err(PlannerError::SongNotFound(song_id).to_string());
    }
    if db.song_in_any_show(&song_id).map_err(|e| e.to_string())? {
        return Err(PlannerError::SongInUse.to_string());
    }
    db.delete_song(&song_id).map_err(|e| e.to_string())?;
    log(&app, "INFO", &format!("Deleted song {} from library", song_id));
    Ok(())
}

// ── Shows ────────────────────────────────────────────────────────────

#[tauri::command]
pub async fn get_shows(state: State<'_, AppState>) -> Result<Vec<Show>, String> {
    let db = state.db.lock().map_err(|_| "Failed to lock DB".to_string())?;
    db.get_all_shows().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_show(show_id: String, state: State<'_, AppState>) -> Result<Show, String> {
    let db = state.db.lock().map_err(|_| "Failed to lock DB".to_string())?;
    db.get_show(&show_id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| PlannerError::ShowNotFound(show_id).to_string())
}

/// Hour-labelled display partitioning of a show's stored sequence.
#[tauri::command]
pub async fn get_show_segments(
    show_id: String,
    state: State<'_, AppState>,
) -> Result<Vec<HourSegment>, String> {
    let db = state.db.lock().map_err(|_| "Failed to lock DB".to_string())?;
    let show = db
        .get_show(&show_id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| PlannerError::ShowNotFound(show_id).to_string())?;
    let library = db.get_all_songs().map_err(|e| e.to_string())?;
    let settings = db.get_settings().map_err(|e| e.to_string())?;

    let resolved: Vec<Song> = show
        .song_ids
        .iter()
        .filter_map(|id| library.iter().find(|s| &s.id == id).cloned())
        .collect();

    Ok(segmenter::segment(
        &resolved,
        show.intended_hours.max(1),
        settings.target_song_minutes_per_hour,
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowBuildResult {
    pub show: Option<Show>,
    pub outcome: BuildOutcome,
}

#[tauri::command]
pub async fn create_show(
    app: tauri::AppHandle,
    hours: u32,
    state: State<'_, AppState>,
) -> Result<ShowBuildResult, String> {
    if hours == 0 {
        return Err("A show must cover at least one hour".to_string());
    }

    let db = state.db.lock().map_err(|_| "Failed to lock DB".to_string())?;
    let mut songs = db.get_all_songs().map_err(|e| e.to_string())?;
    let shows = db.get_all_shows().map_err(|e| e.to_string())?;
    let settings = db.get_settings().map_err(|e| e.to_string())?;

    let usable = rotation::usable_for_selection(&songs, &shows);
    let outcome = builder::build(&usable, hours, &settings);
    if matches!(outcome, BuildOutcome::Empty) {
        log(&app, "WARN", "Show creation aborted: no selectable songs");
        return Ok(ShowBuildResult {
            show: None,
            outcome,
        });
    }

    let show = Show {
        id: Uuid::new_v4().to_string(),
        name: format!("Radio Show ({}hr) - {}", hours, Local::now().format("%Y-%m-%d")),
        created_at: Utc::now().timestamp_millis(),
        song_ids: outcome.song_ids().to_vec(),
        total_duration_seconds: outcome.total_duration_seconds(),
        intended_hours: hours,
    };

    rotation::record_usage(&mut songs, &show.song_ids, &show);

    db.upsert_show(&show).map_err(|e| e.to_string())?;
    for song in songs.iter().filter(|s| show.song_ids.contains(&s.id)) {
        db.upsert_song(song).map_err(|e| e.to_string())?;
    }

    log(
        &app,
        "INFO",
        &format!(
            "Created \"{}\" with {} songs, total {}",
            show.name,
            show.song_ids.len(),
            builder::format_duration(show.total_duration_seconds)
        ),
    );
    Ok(ShowBuildResult {
        show: Some(show),
        outcome,
    })
}

/// Rebuilds an existing show's playlist from scratch with its original
/// intended hours. Songs dropped from the show keep their stale rotation
/// record; every newly selected song is stamped.
#[tauri::command]
pub async fn swap_show_playlist(
    app: tauri::AppHandle,
    show_id: String,
    state: State<'_, AppState>,
) -> Result<ShowBuildResult, String> {
    let db = state.db.lock().map_err(|_| "Failed to lock DB".to_string())?;
    let show = db
        .get_show(&show_id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| PlannerError::ShowNotFound(show_id).to_string())?;
    let mut songs = db.get_all_songs().map_err(|e| e.to_string())?;
    let shows = db.get_all_shows().map_err(|e| e.to_string())?;
    let settings = db.get_settings().map_err(|e| e.to_string())?;

    let usable = rotation::usable_for_selection(&songs, &shows);
    let outcome = builder::build(&usable, show.intended_hours.max(1), &settings);
    if matches!(outcome, BuildOutcome::Empty) {
        log(&app, "WARN", "Playlist swap aborted: no selectable songs");
        return Ok(ShowBuildResult {
            show: None,
            outcome,
        });
    }

    let updated = Show {
        song_ids: outcome.song_ids().to_vec(),
        total_duration_seconds: outcome.total_duration_seconds(),
        ..show
    };
    rotation::record_usage(&mut songs, &updated.song_ids, &updated);

    db.upsert_show(&updated).map_err(|e| e.to_string())?;
    for song in songs.iter().filter(|s| updated.song_ids.contains(&s.id)) {
        db.upsert_song(song).map_err(|e| e.to_string())?;
    }

    log(
        &app,
        "INFO",
        &format!(
            "Swapped playlist of \"{}\": {} songs, total {}",
            updated.name,
            updated.song_ids.len(),
            builder::format_duration(updated.total_duration_seconds)
        ),
    );
    Ok(ShowBuildResult {
        show: Some(updated),
        outcome,
    })
}

#[tauri::command]
pub async fn delete_show(
    app: tauri::AppHandle,
    show_id: String,
    state: State<'_, AppState>,
) -> Result<(), String> {
    let db = state.db.lock().map_err(|_| "Failed to lock DB".to_string())?;
    let show = db
        .get_show(&show_id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| PlannerError::ShowNotFound(show_id).to_string())?;
    // Songs used by this show keep their rotation record; availability
    // recovers through the evaluator's existence check.
    db.delete_show(&show.id).map_err(|e| e.to_string())?;
    log(&app, "INFO", &format!("Deleted show \"{}\"", show.name));
    Ok(())
}

// ── Slot replacement & reordering ────────────────────────────────────

#[tauri::command]
pub async fn suggest_replacements(
    show_id: String,
    song_id: String,
    state: State<'_, AppState>,
) -> Result<Vec<Song>, String> {
    let db = state.db.lock().map_err(|_| "Failed to lock DB".to_string())?;
    let show = db
        .get_show(&show_id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| PlannerError::ShowNotFound(show_id).to_string())?;
    let library = db.get_all_songs().map_err(|e| e.to_string())?;
    let shows = db.get_all_shows().map_err(|e| e.to_string())?;

    Ok(replacement::suggest(&show, &song_id, &library, &shows))
}

#[tauri::command]
pub async fn replace_show_song(
    app: tauri::AppHandle,
    show_id: String,
    old_song_id: String,
    new_song_id: String,
    state: State<'_, AppState>,
) -> Result<Show, String> {
    let db = state.db.lock().map_err(|_| "Failed to lock DB".to_string())?;
    let show = db
        .get_show(&show_id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| PlannerError::ShowNotFound(show_id).to_string())?;
    let mut library = db.get_all_songs().map_err(|e| e.to_string())?;
    if !library.iter().any(|s| s.id == new_song_id) {
        return Err(PlannerError::SongNotFound(new_song_id).to_string());
    }

    let updated = replacement::apply_replacement(&show, &old_song_id, &new_song_id, &library)
        .map_err(|e| e.to_string())?;
    // Only the incoming song gets stamped; the outgoing one keeps its record.
    rotation::record_usage(&mut library, &[new_song_id.clone()], &updated);

    db.upsert_show(&updated).map_err(|e| e.to_string())?;
    if let Some(song) = library.iter().find(|s| s.id == new_song_id) {
        db.upsert_song(song).map_err(|e| e.to_string())?;
    }

    log(
        &app,
        "INFO",
        &format!(
            "Replaced {} with {} in \"{}\"",
            old_song_id, new_song_id, updated.name
        ),
    );
    Ok(updated)
}

/// Drag-drop reorder: removes the dragged song and re-inserts it before the
/// drop target (or at the end if the target slot vanished). Pure positional
/// splice, no rotation stamping.
#[tauri::command]
pub async fn reorder_show_song(
    show_id: String,
    dragged_song_id: String,
    target_song_id: String,
    state: State<'_, AppState>,
) -> Result<Show, String> {
    let db = state.db.lock().map_err(|_| "Failed to lock DB".to_string())?;
    let show = db
        .get_show(&show_id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| PlannerError::ShowNotFound(show_id.clone()).to_string())?;

    let song_ids = splice_sequence(&show.song_ids, &dragged_song_id, &target_song_id)
        .ok_or_else(|| {
            PlannerError::SongNotInShow {
                show_id,
                song_id: dragged_song_id,
            }
            .to_string()
        })?;

    let library = db.get_all_songs().map_err(|e| e.to_string())?;
    let updated = Show {
        total_duration_seconds: Show::compute_total_duration(&song_ids, &library),
        song_ids,
        ..show
    };
    db.upsert_show(&updated).map_err(|e| e.to_string())?;
    Ok(updated)
}

/// Moves `dragged` in front of `target`. Returns None when the dragged id
/// is not in the sequence; a missing target appends to the end instead.
fn splice_sequence(song_ids: &[String], dragged: &str, target: &str) -> Option<Vec<String>> {
    if dragged == target {
        return Some(song_ids.to_vec());
    }
    let mut ids = song_ids.to_vec();
    let from = ids.iter().position(|id| id == dragged)?;
    let moved = ids.remove(from);
    match ids.iter().position(|id| id == target) {
        Some(to) => ids.insert(to, moved),
        None => ids.push(moved),
    }
    Some(ids)
}

// ── Settings ─────────────────────────────────────────────────────────

#[tauri::command]
pub async fn get_settings(state: State<'_, AppState>) -> Result<AppSettings, String> {
    let db = state.db.lock().map_err(|_| "Failed to lock DB".to_string())?;
    db.get_settings().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn update_settings(
    settings: AppSettings,
    state: State<'_, AppState>,
) -> Result<AppSettings, String> {
    if !(10..=60).contains(&settings.target_song_minutes_per_hour) {
        return Err(PlannerError::InvalidSettings(
            "targetSongMinutesPerHour must be between 10 and 60".to_string(),
        )
        .to_string());
    }
    if !(1..=20).contains(&settings.target_songs_per_hour) {
        return Err(PlannerError::InvalidSettings(
            "targetSongsPerHour must be between 1 and 20".to_string(),
        )
        .to_string());
    }
    let db = state.db.lock().map_err(|_| "Failed to lock DB".to_string())?;
    db.save_settings(&settings).map_err(|e| e.to_string())?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LastUsedInShow;

    fn staged(title: &str, artist: &str, duration: u32) -> StagedSong {
        StagedSong {
            file_path: format!("/music/{}.mp3", title),
            file_name: format!("{}.mp3", title),
            title: title.to_string(),
            artist: artist.to_string(),
            duration_seconds: duration,
            error: None,
        }
    }

    fn song(id: &str, title: &str, artist: &str) -> Song {
        Song {
            id: id.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            uploaded_at: 1,
            duration_seconds: 100,
            file_name: Some("old.mp3".to_string()),
            last_used_in_show_details: Some(LastUsedInShow {
                show_id: "sh1".to_string(),
                show_created_at: 1,
            }),
        }
    }

    #[test]
    fn merge_overwrites_matching_identity_keeping_history() {
        let library = vec![song("a", "Sunrise", "The Band")];
        let entries = vec![staged("sunrise", "the band", 245)];
        let (changed, skipped) = merge_staged_songs(&entries, &library, 999);
        assert_eq!(skipped, 0);
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].id, "a");
        assert_eq!(changed[0].duration_seconds, 245);
        assert_eq!(changed[0].uploaded_at, 999);
        // Show history survives re-import.
        assert!(changed[0].last_used_in_show_details.is_some());
    }

    #[test]
    fn merge_creates_new_songs_with_fresh_ids() {
        let library = vec![song("a", "Sunrise", "The Band")];
        let entries = vec![staged("Sunset", "The Band", 200)];
        let (changed, _) = merge_staged_songs(&entries, &library, 999);
        assert_eq!(changed.len(), 1);
        assert_ne!(changed[0].id, "a");
        assert!(changed[0].last_used_in_show_details.is_none());
    }

    #[test]
    fn merge_skips_entries_without_title_or_artist() {
        let entries = vec![staged("", "The Band", 200), staged("Sunset", "  ", 200)];
        let (changed, skipped) = merge_staged_songs(&entries, &[], 999);
        assert!(changed.is_empty());
        assert_eq!(skipped, 2);
    }

    #[test]
    fn splice_moves_dragged_before_target() {
        let ids: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let result = splice_sequence(&ids, "d", "b").unwrap();
        assert_eq!(result, vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn splice_appends_when_target_missing() {
        let ids: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let result = splice_sequence(&ids, "a", "zz").unwrap();
        assert_eq!(result, vec!["b", "c", "a"]);
    }

    #[test]
    fn splice_fails_when_dragged_missing() {
        let ids: Vec<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        assert!(splice_sequence(&ids, "zz", "a").is_none());
    }

    #[test]
    fn splice_is_noop_when_dragged_equals_target() {
        let ids: Vec<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(splice_sequence(&ids, "a", "a").unwrap(), vec!["a", "b"]);
    }
}
