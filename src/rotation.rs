use crate::models::{LastUsedInShow, Show, Song};
use serde::Serialize;

/// Number of most-recently created shows that form the cooldown window.
/// A song used in one of them is not eligible for reselection.
pub const ROTATION_WINDOW: usize = 4;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub is_available: bool,
    pub reason: Option<String>,
}

impl Availability {
    fn available() -> Self {
        Self {
            is_available: true,
            reason: None,
        }
    }

    fn unavailable(reason: String) -> Self {
        Self {
            is_available: false,
            reason: Some(reason),
        }
    }
}

/// Decides whether a song is currently eligible for selection.
///
/// While fewer than [`ROTATION_WINDOW`] shows exist, any usage in a
/// still-existing show blocks the song outright (cold-start rule). Once the
/// library holds at least [`ROTATION_WINDOW`] shows, the song is blocked only
/// if its recording show still exists and ranks within the window by
/// creation time. A deleted recording show always frees the song, and the
/// song's own record is never mutated here.
pub fn evaluate(song: &Song, shows: &[Show]) -> Availability {
    let Some(last_used) = &song.last_used_in_show_details else {
        return Availability::available();
    };

    let recording_show = shows.iter().find(|s| s.id == last_used.show_id);

    if shows.len() < ROTATION_WINDOW {
        return match recording_show {
            Some(show) => Availability::unavailable(format!(
                "Used in \"{}\" (fewer than {} total shows exist).",
                show.name, ROTATION_WINDOW
            )),
            None => Availability::available(),
        };
    }

    let Some(show) = recording_show else {
        return Availability::available();
    };

    // createdAt of the 4th most-recent show is the window floor.
    let mut created: Vec<i64> = shows.iter().map(|s| s.created_at).collect();
    created.sort_unstable_by(|a, b| b.cmp(a));
    let window_floor = created[ROTATION_WINDOW - 1];

    if last_used.show_created_at >= window_floor {
        Availability::unavailable(format!(
            "Recently used in \"{}\". Available after more shows.",
            show.name
        ))
    } else {
        Availability::available()
    }
}

/// Songs that are both available and have a known duration. Only these may
/// enter a new or swapped playlist.
pub fn usable_for_selection<'a>(songs: &'a [Song], shows: &[Show]) -> Vec<&'a Song> {
    songs
        .iter()
        .filter(|s| s.duration_seconds > 0 && evaluate(s, shows).is_available)
        .collect()
}

/// Stamps every song in `selected_ids` as last used by `show`, overwriting
/// any prior record unconditionally. There is no clearing counterpart:
/// records go stale and are re-interpreted by [`evaluate`] instead.
pub fn record_usage(songs: &mut [Song], selected_ids: &[String], show: &Show) {
    for song in songs.iter_mut() {
        if selected_ids.iter().any(|id| id == &song.id) {
            song.last_used_in_show_details = Some(LastUsedInShow {
                show_id: show.id.clone(),
                show_created_at: show.created_at,
            });
        }
    }
}
