use serde::{Deserialize, Serialize};

/// A song's last recorded usage: which show picked it, and when that show
/// was created. Never cleared once set; availability is derived from a live
/// re-check against the current show collection instead.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LastUsedInShow {
    pub show_id: String,
    pub show_created_at: i64, // Unix ms, createdAt of the show at time of use
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String, // UUID
    pub title: String,
    pub artist: String,
    pub uploaded_at: i64,      // Unix ms
    pub duration_seconds: u32, // 0 = duration unknown, song unusable for selection
    pub file_name: Option<String>,
    pub last_used_in_show_details: Option<LastUsedInShow>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    pub id: String, // UUID
    pub name: String,
    pub created_at: i64, // Unix ms
    pub song_ids: Vec<String>,
    pub total_duration_seconds: u32,
    pub intended_hours: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShowCreationMode {
    Duration,
    Count,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub target_song_minutes_per_hour: u32, // 10..=60
    pub show_creation_mode: ShowCreationMode,
    pub target_songs_per_hour: u32, // 1..=20
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            target_song_minutes_per_hour: 52,
            show_creation_mode: ShowCreationMode::Duration,
            target_songs_per_hour: 12,
        }
    }
}

/// A file picked for import, with whatever metadata extraction produced.
/// `error` carries per-file tag/duration failures; the batch never fails
/// as a whole.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StagedSong {
    pub file_path: String,
    pub file_name: String,
    pub title: String,
    pub artist: String,
    pub duration_seconds: u32,
    pub error: Option<String>,
}

impl Show {
    /// Sum of durations of the current sequence, resolved against a library
    /// snapshot. Ids that no longer resolve contribute nothing.
    pub fn compute_total_duration(song_ids: &[String], library: &[Song]) -> u32 {
        song_ids
            .iter()
            .map(|id| {
                library
                    .iter()
                    .find(|s| &s.id == id)
                    .map(|s| s.duration_seconds)
                    .unwrap_or(0)
            })
            .sum()
    }
}
