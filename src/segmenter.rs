use crate::models::Song;
use serde::Serialize;

/// One display hour of a show. Purely presentational; stored order is never
/// touched.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourSegment {
    pub hour: u32,
    pub songs: Vec<Song>,
    pub total_duration_seconds: u32,
}

/// Partitions a show's resolved song sequence into `intended_hours`
/// hour-labelled segments. A segment closes once the next song would push
/// it past `target_song_minutes_per_hour`, provided it already holds a song
/// and fewer than `intended_hours - 1` segments are closed; everything left
/// over lands in the final segment, and missing hours are padded empty.
///
/// Concatenating the segments always reproduces the input sequence exactly.
pub fn segment(
    ordered_songs: &[Song],
    intended_hours: u32,
    target_song_minutes_per_hour: u32,
) -> Vec<HourSegment> {
    if intended_hours <= 1 {
        return vec![HourSegment {
            hour: 1,
            songs: ordered_songs.to_vec(),
            total_duration_seconds: ordered_songs.iter().map(|s| s.duration_seconds).sum(),
        }];
    }

    let target = target_song_minutes_per_hour * 60;
    let mut segments: Vec<HourSegment> = Vec::new();
    let mut current: Vec<Song> = Vec::new();
    let mut current_total = 0u32;

    for song in ordered_songs {
        let would_overflow = current_total + song.duration_seconds > target;
        let may_close = (segments.len() as u32) < intended_hours - 1;
        if !current.is_empty() && would_overflow && may_close {
            segments.push(HourSegment {
                hour: segments.len() as u32 + 1,
                songs: std::mem::take(&mut current),
                total_duration_seconds: current_total,
            });
            current_total = 0;
        }
        current.push(song.clone());
        current_total += song.duration_seconds;
    }

    if !current.is_empty() {
        segments.push(HourSegment {
            hour: segments.len() as u32 + 1,
            songs: current,
            total_duration_seconds: current_total,
        });
    }

    while (segments.len() as u32) < intended_hours {
        segments.push(HourSegment {
            hour: segments.len() as u32 + 1,
            songs: Vec::new(),
            total_duration_seconds: 0,
        });
    }

    segments
}
