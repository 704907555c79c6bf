use crate::models::{AppSettings, ShowCreationMode, Song};
use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::Serialize;

/// Absolute floor for duration mode: a show must run at least 5 minutes per
/// intended hour even when the configured target would allow less.
const MIN_SECONDS_PER_HOUR: u32 = 5 * 60;

/// Outcome of assembling a playlist. `Empty` means the caller must not
/// create or mutate anything; `Partial` proceeds with a surfaced warning.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BuildOutcome {
    Exact {
        song_ids: Vec<String>,
        total_duration_seconds: u32,
    },
    Partial {
        song_ids: Vec<String>,
        total_duration_seconds: u32,
        message: String,
    },
    Empty,
}

impl BuildOutcome {
    pub fn song_ids(&self) -> &[String] {
        match self {
            BuildOutcome::Exact { song_ids, .. } | BuildOutcome::Partial { song_ids, .. } => {
                song_ids
            }
            BuildOutcome::Empty => &[],
        }
    }

    pub fn total_duration_seconds(&self) -> u32 {
        match self {
            BuildOutcome::Exact {
                total_duration_seconds,
                ..
            }
            | BuildOutcome::Partial {
                total_duration_seconds,
                ..
            } => *total_duration_seconds,
            BuildOutcome::Empty => 0,
        }
    }
}

/// Assembles a new song sequence for `hours` intended hours from the songs
/// that passed the usability filter. This is the only place randomness
/// enters the system: the candidate pool is run through an unbiased
/// Fisher-Yates shuffle before the deterministic scan.
pub fn build(usable_songs: &[&Song], hours: u32, settings: &AppSettings) -> BuildOutcome {
    let mut shuffled: Vec<&Song> = usable_songs.to_vec();
    shuffled.shuffle(&mut thread_rng());
    select_from(&shuffled, hours, settings)
}

/// The deterministic half of [`build`]: scans an already-ordered candidate
/// list and picks songs under the configured mode.
///
/// Duration mode greedily takes every song that still fits under the upper
/// target, probing past songs that would overflow. Count mode stops at the
/// first song that would break the duration cap, even if a later, shorter
/// song would still fit.
pub fn select_from(ordered: &[&Song], hours: u32, settings: &AppSettings) -> BuildOutcome {
    match settings.show_creation_mode {
        ShowCreationMode::Duration => select_by_duration(ordered, hours, settings),
        ShowCreationMode::Count => select_by_count(ordered, hours, settings),
    }
}

fn select_by_duration(ordered: &[&Song], hours: u32, settings: &AppSettings) -> BuildOutcome {
    let per_hour = settings.target_song_minutes_per_hour;
    let min_target = (MIN_SECONDS_PER_HOUR * hours).max(per_hour.saturating_sub(2) * hours * 60);
    let max_target = (per_hour + 2) * hours * 60;

    let mut song_ids = Vec::new();
    let mut total = 0u32;
    for song in ordered {
        if total + song.duration_seconds <= max_target {
            song_ids.push(song.id.clone());
            total += song.duration_seconds;
        }
    }

    if song_ids.is_empty() {
        return BuildOutcome::Empty;
    }

    if total < min_target {
        let message = format!(
            "Could not reach a total of at least {}. Best attempt for {}hr(s): {} with {} songs.",
            format_duration(min_target),
            hours,
            format_duration(total),
            song_ids.len()
        );
        BuildOutcome::Partial {
            song_ids,
            total_duration_seconds: total,
            message,
        }
    } else {
        BuildOutcome::Exact {
            song_ids,
            total_duration_seconds: total,
        }
    }
}

fn select_by_count(ordered: &[&Song], hours: u32, settings: &AppSettings) -> BuildOutcome {
    let target_count = (settings.target_songs_per_hour * hours) as usize;
    let cap = settings.target_song_minutes_per_hour * hours * 60;

    let mut song_ids = Vec::new();
    let mut total = 0u32;
    for song in ordered {
        if song_ids.len() >= target_count {
            break;
        }
        if total + song.duration_seconds > cap {
            // First overflow ends the scan; no probing for shorter songs.
            break;
        }
        song_ids.push(song.id.clone());
        total += song.duration_seconds;
    }

    if song_ids.is_empty() {
        return BuildOutcome::Empty;
    }

    if song_ids.len() < target_count {
        let message = format!(
            "Targeted {} songs, but only selected {} with a total duration of {} (duration cap {}).",
            target_count,
            song_ids.len(),
            format_duration(total),
            format_duration(cap)
        );
        BuildOutcome::Partial {
            song_ids,
            total_duration_seconds: total,
            message,
        }
    } else {
        BuildOutcome::Exact {
            song_ids,
            total_duration_seconds: total,
        }
    }
}

/// mm:ss rendering used in builder messages and command feedback.
pub fn format_duration(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShowCreationMode;

    fn song(id: &str, duration: u32) -> Song {
        Song {
            id: id.to_string(),
            title: id.to_string(),
            artist: "Artist".to_string(),
            uploaded_at: 0,
            duration_seconds: duration,
            file_name: None,
            last_used_in_show_details: None,
        }
    }

    fn settings(mode: ShowCreationMode, minutes: u32, count: u32) -> AppSettings {
        AppSettings {
            target_song_minutes_per_hour: minutes,
            show_creation_mode: mode,
            target_songs_per_hour: count,
        }
    }

    #[test]
    fn duration_mode_skips_overflowing_songs_and_keeps_probing() {
        // Target 52min/hr, 1hr: window [3000, 3240].
        let cfg = settings(ShowCreationMode::Duration, 52, 12);
        let songs = vec![
            song("a", 3000),
            song("b", 1000), // would overflow (4000 > 3240), skipped
            song("c", 200),  // still fits (3200 <= 3240)
        ];
        let refs: Vec<&Song> = songs.iter().collect();
        let outcome = select_from(&refs, 1, &cfg);
        match outcome {
            BuildOutcome::Exact {
                song_ids,
                total_duration_seconds,
            } => {
                assert_eq!(song_ids, vec!["a", "c"]);
                assert_eq!(total_duration_seconds, 3200);
            }
            other => panic!("expected Exact, got {:?}", other),
        }
    }

    #[test]
    fn duration_mode_undershoot_is_partial_with_all_usable_songs() {
        // Library totals 1030s, far below the 3000s floor.
        let cfg = settings(ShowCreationMode::Duration, 52, 12);
        let songs = vec![song("a", 180), song("b", 200), song("c", 150), song("d", 500)];
        let refs: Vec<&Song> = songs.iter().collect();
        match select_from(&refs, 1, &cfg) {
            BuildOutcome::Partial {
                song_ids,
                total_duration_seconds,
                message,
            } => {
                assert_eq!(song_ids.len(), 4);
                assert_eq!(total_duration_seconds, 1030);
                assert!(message.contains("4 songs"));
            }
            other => panic!("expected Partial, got {:?}", other),
        }
    }

    #[test]
    fn duration_mode_total_stays_within_band_for_any_permutation() {
        let cfg = settings(ShowCreationMode::Duration, 52, 12);
        let songs: Vec<Song> = (0..40)
            .map(|i| song(&format!("s{}", i), 120 + (i % 7) * 45))
            .collect();
        for _ in 0..20 {
            let refs: Vec<&Song> = songs.iter().collect();
            let outcome = build(&refs, 1, &cfg);
            let total = outcome.total_duration_seconds();
            assert!(total <= 3240, "total {} exceeds max target", total);
            if let BuildOutcome::Exact { .. } = outcome {
                assert!(total >= 3000, "Exact total {} below min target", total);
            }
        }
    }

    #[test]
    fn count_mode_halts_at_first_cap_overflow() {
        // Cap 600s, target 2 songs, order [d, a, b, c]: d fits (500),
        // a would reach 680 and ends the scan even though c (150) would fit.
        let cfg = settings(ShowCreationMode::Count, 10, 2);
        let songs = vec![song("d", 500), song("a", 180), song("b", 200), song("c", 150)];
        let refs: Vec<&Song> = songs.iter().collect();
        match select_from(&refs, 1, &cfg) {
            BuildOutcome::Partial {
                song_ids,
                total_duration_seconds,
                ..
            } => {
                assert_eq!(song_ids, vec!["d"]);
                assert_eq!(total_duration_seconds, 500);
            }
            other => panic!("expected Partial, got {:?}", other),
        }
    }

    #[test]
    fn count_mode_reaching_target_is_exact() {
        let cfg = settings(ShowCreationMode::Count, 52, 3);
        let songs = vec![song("a", 180), song("b", 200), song("c", 150), song("d", 500)];
        let refs: Vec<&Song> = songs.iter().collect();
        match select_from(&refs, 1, &cfg) {
            BuildOutcome::Exact {
                song_ids,
                total_duration_seconds,
            } => {
                assert_eq!(song_ids, vec!["a", "b", "c"]);
                assert_eq!(total_duration_seconds, 530);
            }
            other => panic!("expected Exact, got {:?}", other),
        }
    }

    #[test]
    fn count_mode_respects_cap_and_count_limits() {
        let cfg = settings(ShowCreationMode::Count, 52, 12);
        let songs: Vec<Song> = (0..40)
            .map(|i| song(&format!("s{}", i), 150 + (i % 5) * 60))
            .collect();
        for _ in 0..20 {
            let refs: Vec<&Song> = songs.iter().collect();
            let outcome = build(&refs, 1, &cfg);
            assert!(outcome.song_ids().len() <= 12);
            assert!(outcome.total_duration_seconds() <= 3120);
        }
    }

    #[test]
    fn no_candidates_is_empty() {
        let cfg = settings(ShowCreationMode::Duration, 52, 12);
        assert!(matches!(select_from(&[], 1, &cfg), BuildOutcome::Empty));
    }

    #[test]
    fn every_candidate_too_long_is_empty() {
        // Count mode, cap 600s: the very first song overflows.
        let cfg = settings(ShowCreationMode::Count, 10, 2);
        let songs = vec![song("a", 700), song("b", 800)];
        let refs: Vec<&Song> = songs.iter().collect();
        assert!(matches!(select_from(&refs, 1, &cfg), BuildOutcome::Empty));
    }

    #[test]
    fn duration_floor_honours_five_minutes_per_hour() {
        // 10 min/hr target would give a floor of 480s, but the absolute
        // floor of 300s/hr does not apply since 480 > 300. With 2 hours the
        // floor scales: max(600, 960) = 960.
        let cfg = settings(ShowCreationMode::Duration, 10, 12);
        let songs = vec![song("a", 700)];
        let refs: Vec<&Song> = songs.iter().collect();
        match select_from(&refs, 2, &cfg) {
            BuildOutcome::Partial {
                total_duration_seconds,
                ..
            } => assert_eq!(total_duration_seconds, 700),
            other => panic!("expected Partial, got {:?}", other),
        }
    }

    #[test]
    fn format_duration_pads_to_two_digits() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(61), "01:01");
        assert_eq!(format_duration(3240), "54:00");
    }
}
