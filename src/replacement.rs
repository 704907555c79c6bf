use crate::error::{PlannerError, Result};
use crate::models::{Show, Song};
use crate::rotation;

/// Candidate substitutes for one slot of a show, ordered by title
/// (case-insensitive; ties keep library order). A candidate must be
/// available, must not be the replaced song itself, must not already sit in
/// another slot of the show, and must have a known duration.
pub fn suggest(show: &Show, song_id_to_replace: &str, library: &[Song], shows: &[Show]) -> Vec<Song> {
    let other_slots: Vec<&String> = show
        .song_ids
        .iter()
        .filter(|id| id.as_str() != song_id_to_replace)
        .collect();

    let mut candidates: Vec<Song> = library
        .iter()
        .filter(|song| {
            song.id != song_id_to_replace
                && song.duration_seconds > 0
                && !other_slots.iter().any(|id| **id == song.id)
                && rotation::evaluate(song, shows).is_available
        })
        .cloned()
        .collect();

    candidates.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
    candidates
}

/// Overwrites the slot holding `old_song_id` with `new_song_id`, preserving
/// its position, and recomputes the show's total duration against the
/// library snapshot. The old song's rotation record is left as-is; stamping
/// the new song is the caller's next step.
pub fn apply_replacement(
    show: &Show,
    old_song_id: &str,
    new_song_id: &str,
    library: &[Song],
) -> Result<Show> {
    let index = show
        .song_ids
        .iter()
        .position(|id| id == old_song_id)
        .ok_or_else(|| PlannerError::SongNotInShow {
            show_id: show.id.clone(),
            song_id: old_song_id.to_string(),
        })?;

    let mut song_ids = show.song_ids.clone();
    song_ids[index] = new_song_id.to_string();

    let total = Show::compute_total_duration(&song_ids, library);
    Ok(Show {
        song_ids,
        total_duration_seconds: total,
        ..show.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LastUsedInShow;

    fn song(id: &str, title: &str, duration: u32) -> Song {
        Song {
            id: id.to_string(),
            title: title.to_string(),
            artist: "Artist".to_string(),
            uploaded_at: 0,
            duration_seconds: duration,
            file_name: None,
            last_used_in_show_details: None,
        }
    }

    fn show(id: &str, song_ids: &[&str]) -> Show {
        Show {
            id: id.to_string(),
            name: format!("Show {}", id),
            created_at: 100,
            song_ids: song_ids.iter().map(|s| s.to_string()).collect(),
            total_duration_seconds: 0,
            intended_hours: 1,
        }
    }

    #[test]
    fn suggest_filters_self_members_and_zero_duration() {
        let target = show("sh1", &["a", "b"]);
        let shows = vec![target.clone()];
        let library = vec![
            song("a", "Alpha", 100),   // the slot being replaced
            song("b", "Beta", 100),    // already in the show elsewhere
            song("c", "Gamma", 0),     // duration unknown
            song("d", "Delta", 100),   // valid
            song("e", "Epsilon", 100), // valid
        ];
        let result = suggest(&target, "a", &library, &shows);
        let ids: Vec<&str> = result.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "e"]); // Delta before Epsilon by title
    }

    #[test]
    fn suggest_excludes_songs_in_rotation_cooldown() {
        let target = show("sh1", &["a"]);
        let shows = vec![target.clone()];
        let mut cooling = song("b", "Beta", 100);
        cooling.last_used_in_show_details = Some(LastUsedInShow {
            show_id: "sh1".to_string(),
            show_created_at: 100,
        });
        let library = vec![song("a", "Alpha", 100), cooling, song("c", "Gamma", 100)];
        let result = suggest(&target, "a", &library, &shows);
        let ids: Vec<&str> = result.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[test]
    fn suggest_sorts_case_insensitively_with_stable_ties() {
        let target = show("sh1", &["x"]);
        let shows = vec![target.clone()];
        let library = vec![
            song("x", "Zed", 100),
            song("1", "banana", 100),
            song("2", "Apple", 100),
            song("3", "apple", 100), // same title, keeps library order after "2"
        ];
        let result = suggest(&target, "x", &library, &shows);
        let ids: Vec<&str> = result.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
    }

    #[test]
    fn suggest_may_be_empty() {
        let target = show("sh1", &["a"]);
        let shows = vec![target.clone()];
        let library = vec![song("a", "Alpha", 100)];
        assert!(suggest(&target, "a", &library, &shows).is_empty());
    }

    #[test]
    fn apply_replacement_preserves_slot_index() {
        let library = vec![song("a", "A", 100), song("b", "B", 200), song("c", "C", 300)];
        let target = show("sh1", &["a", "b"]);
        let updated = apply_replacement(&target, "b", "c", &library).unwrap();
        assert_eq!(updated.song_ids, vec!["a", "c"]);
        assert_eq!(updated.total_duration_seconds, 400);
    }

    #[test]
    fn apply_replacement_fails_when_old_song_absent() {
        let library = vec![song("a", "A", 100)];
        let target = show("sh1", &["a"]);
        let err = apply_replacement(&target, "missing", "a", &library).unwrap_err();
        assert!(matches!(err, PlannerError::SongNotInShow { .. }));
    }

    #[test]
    fn apply_replacement_replaces_first_occurrence_only() {
        // songIds permit duplicates; only the first matching slot changes.
        let library = vec![song("a", "A", 100), song("b", "B", 200)];
        let target = show("sh1", &["a", "a"]);
        let updated = apply_replacement(&target, "a", "b", &library).unwrap();
        assert_eq!(updated.song_ids, vec!["b", "a"]);
        assert_eq!(updated.total_duration_seconds, 300);
    }
}
