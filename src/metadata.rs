use anyhow::{Context, Result};
use lofty::prelude::*;
use lofty::read_from_path;
use lofty::tag::ItemKey;
use std::path::Path;

use crate::models::StagedSong;

/// Reads title, artist and duration (whole seconds) from an audio file.
pub fn read_song_metadata<P: AsRef<Path>>(path: P) -> Result<(String, String, u32)> {
    let tagged_file = read_from_path(path.as_ref()).context("Failed to read audio file")?;
    let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());

    let title = tag
        .and_then(|t| t.get_string(&ItemKey::TrackTitle))
        .unwrap_or("")
        .trim()
        .to_string();
    let artist = tag
        .and_then(|t| t.get_string(&ItemKey::TrackArtist))
        .unwrap_or("")
        .trim()
        .to_string();
    let duration = tagged_file.properties().duration().as_secs() as u32;

    Ok((title, artist, duration))
}

/// Turns a picked file into a staged import entry. Extraction failures do
/// not abort the batch; they land in `error` and the entry stays editable
/// in the import dialog. A zero duration is reported but still imports —
/// the song is just unusable for selection until it gets a real duration.
pub fn stage_file(path: &str) -> StagedSong {
    let file_name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string());

    match read_song_metadata(path) {
        Ok((title, artist, duration)) => {
            let mut problems = Vec::new();
            if title.is_empty() && artist.is_empty() {
                problems.push("No title/artist tags found.");
            }
            if duration == 0 {
                problems.push("Could not determine duration.");
            }
            StagedSong {
                file_path: path.to_string(),
                file_name,
                title,
                artist,
                duration_seconds: duration,
                error: if problems.is_empty() {
                    None
                } else {
                    Some(problems.join(" "))
                },
            }
        }
        Err(e) => StagedSong {
            file_path: path.to_string(),
            file_name,
            title: String::new(),
            artist: String::new(),
            duration_seconds: 0,
            error: Some(e.to_string()),
        },
    }
}
