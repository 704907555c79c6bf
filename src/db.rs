use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::models::{AppSettings, LastUsedInShow, Show, ShowCreationMode, Song};

const DB_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS songs (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        artist TEXT NOT NULL,
        uploaded_at INTEGER NOT NULL,
        duration_seconds INTEGER NOT NULL DEFAULT 0,
        file_name TEXT,
        last_used_show_id TEXT,
        last_used_show_created_at INTEGER
    );

    CREATE TABLE IF NOT EXISTS shows (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        total_duration_seconds INTEGER NOT NULL DEFAULT 0,
        intended_hours INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE IF NOT EXISTS show_songs (
        show_id TEXT NOT NULL,
        position INTEGER NOT NULL,
        song_id TEXT NOT NULL,
        PRIMARY KEY (show_id, position),
        FOREIGN KEY(show_id) REFERENCES shows(id)
    );

    CREATE TABLE IF NOT EXISTS settings (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        target_song_minutes_per_hour INTEGER NOT NULL,
        show_creation_mode TEXT NOT NULL,
        target_songs_per_hour INTEGER NOT NULL
    );
"#;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(DB_SCHEMA)?;
        Ok(Self { conn })
    }

    // ── Songs ────────────────────────────────────────────────────────

    pub fn get_all_songs(&self) -> Result<Vec<Song>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, artist, uploaded_at, duration_seconds, file_name,
             last_used_show_id, last_used_show_created_at
             FROM songs ORDER BY rowid ASC",
        )?;
        let songs = stmt
            .query_map([], row_to_song)?
            .collect::<Result<Vec<_>, rusqlite::Error>>()?;
        Ok(songs)
    }

    pub fn get_song(&self, id: &str) -> Result<Option<Song>> {
        let song = self
            .conn
            .query_row(
                "SELECT id, title, artist, uploaded_at, duration_seconds, file_name,
                 last_used_show_id, last_used_show_created_at
                 FROM songs WHERE id = ?1",
                params![id],
                row_to_song,
            )
            .optional()?;
        Ok(song)
    }

    pub fn upsert_song(&self, song: &Song) -> Result<()> {
        let (last_show_id, last_show_created_at) = match &song.last_used_in_show_details {
            Some(details) => (Some(details.show_id.as_str()), Some(details.show_created_at)),
            None => (None, None),
        };
        self.conn.execute(
            "INSERT INTO songs (
                id, title, artist, uploaded_at, duration_seconds, file_name,
                last_used_show_id, last_used_show_created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                title=excluded.title,
                artist=excluded.artist,
                uploaded_at=excluded.uploaded_at,
                duration_seconds=excluded.duration_seconds,
                file_name=excluded.file_name,
                last_used_show_id=excluded.last_used_show_id,
                last_used_show_created_at=excluded.last_used_show_created_at
            ",
            params![
                song.id,
                song.title,
                song.artist,
                song.uploaded_at,
                song.duration_seconds,
                song.file_name,
                last_show_id,
                last_show_created_at,
            ],
        )?;
        Ok(())
    }

    pub fn delete_song(&self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM songs WHERE id = ?1", params![id])?;
        Ok(())
    }

    pub fn song_in_any_show(&self, id: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM show_songs WHERE song_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // ── Shows ────────────────────────────────────────────────────────

    pub fn get_all_shows(&self) -> Result<Vec<Show>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, created_at, total_duration_seconds, intended_hours
             FROM shows ORDER BY rowid ASC",
        )?;
        let mut shows = stmt
            .query_map([], row_to_show)?
            .collect::<Result<Vec<_>, rusqlite::Error>>()?;
        for show in &mut shows {
            show.song_ids = self.get_show_song_ids(&show.id)?;
        }
        Ok(shows)
    }

    pub fn get_show(&self, id: &str) -> Result<Option<Show>> {
        let show = self
            .conn
            .query_row(
                "SELECT id, name, created_at, total_duration_seconds, intended_hours
                 FROM shows WHERE id = ?1",
                params![id],
                row_to_show,
            )
            .optional()?;
        match show {
            Some(mut show) => {
                show.song_ids = self.get_show_song_ids(&show.id)?;
                Ok(Some(show))
            }
            None => Ok(None),
        }
    }

    fn get_show_song_ids(&self, show_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT song_id FROM show_songs WHERE show_id = ?1 ORDER BY position ASC",
        )?;
        let ids = stmt
            .query_map(params![show_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, rusqlite::Error>>()?;
        Ok(ids)
    }

    /// Persists a show and its full sequence. The sequence rows are replaced
    /// wholesale; positions are the vector indices, so duplicate song ids in
    /// a sequence are representable.
    pub fn upsert_show(&self, show: &Show) -> Result<()> {
        self.conn.execute(
            "INSERT INTO shows (id, name, created_at, total_duration_seconds, intended_hours)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name=excluded.name,
                created_at=excluded.created_at,
                total_duration_seconds=excluded.total_duration_seconds,
                intended_hours=excluded.intended_hours
            ",
            params![
                show.id,
                show.name,
                show.created_at,
                show.total_duration_seconds,
                show.intended_hours,
            ],
        )?;

        self.conn.execute(
            "DELETE FROM show_songs WHERE show_id = ?1",
            params![show.id],
        )?;
        let mut stmt = self
            .conn
            .prepare("INSERT INTO show_songs (show_id, position, song_id) VALUES (?1, ?2, ?3)")?;
        for (position, song_id) in show.song_ids.iter().enumerate() {
            stmt.execute(params![show.id, position as i64, song_id])?;
        }
        Ok(())
    }

    pub fn delete_show(&self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM show_songs WHERE show_id = ?1", params![id])?;
        self.conn
            .execute("DELETE FROM shows WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn get_settings(&self) -> Result<AppSettings> {
        let settings = self
            .conn
            .query_row(
                "SELECT target_song_minutes_per_hour, show_creation_mode, target_songs_per_hour
                 FROM settings WHERE id = 1",
                [],
                |row| {
                    let mode: String = row.get(1)?;
                    Ok(AppSettings {
                        target_song_minutes_per_hour: row.get(0)?,
                        show_creation_mode: if mode == "count" {
                            ShowCreationMode::Count
                        } else {
                            ShowCreationMode::Duration
                        },
                        target_songs_per_hour: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(settings.unwrap_or_default())
    }

    pub fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        let mode = match settings.show_creation_mode {
            ShowCreationMode::Duration => "duration",
            ShowCreationMode::Count => "count",
        };
        self.conn.execute(
            "INSERT INTO settings (id, target_song_minutes_per_hour, show_creation_mode, target_songs_per_hour)
             VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                target_song_minutes_per_hour=excluded.target_song_minutes_per_hour,
                show_creation_mode=excluded.show_creation_mode,
                target_songs_per_hour=excluded.target_songs_per_hour
            ",
            params![
                settings.target_song_minutes_per_hour,
                mode,
                settings.target_songs_per_hour,
            ],
        )?;
        Ok(())
    }
}

fn row_to_song(row: &rusqlite::Row<'_>) -> std::result::Result<Song, rusqlite::Error> {
    let last_show_id: Option<String> = row.get(6)?;
    let last_show_created_at: Option<i64> = row.get(7)?;
    Ok(Song {
        id: row.get(0)?,
        title: row.get(1)?,
        artist: row.get(2)?,
        uploaded_at: row.get(3)?,
        duration_seconds: row.get(4)?,
        file_name: row.get(5)?,
        last_used_in_show_details: match (last_show_id, last_show_created_at) {
            (Some(show_id), Some(show_created_at)) => Some(LastUsedInShow {
                show_id,
                show_created_at,
            }),
            _ => None,
        },
    })
}

fn row_to_show(row: &rusqlite::Row<'_>) -> std::result::Result<Show, rusqlite::Error> {
    Ok(Show {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
        total_duration_seconds: row.get(3)?,
        intended_hours: row.get(4)?,
        song_ids: Vec::new(),
    })
}
