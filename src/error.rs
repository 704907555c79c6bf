/// Error conditions for the rotation/planning core.
///
/// All of these are local and recoverable: the command layer maps them to
/// strings and leaves both collections untouched.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("Show not found: {0}")]
    ShowNotFound(String),

    #[error("Song not found: {0}")]
    SongNotFound(String),

    #[error("Song {song_id} is not part of show {show_id}")]
    SongNotInShow { show_id: String, song_id: String },

    #[error("Song is used by one or more shows and cannot be deleted")]
    SongInUse,

    #[error("{0}")]
    InvalidSettings(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
