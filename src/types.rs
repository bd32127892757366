//! Shared catalog types.
//!
//! The scanner builds these, the emitter consumes them. Both sides rely on the
//! same invariants:
//!
//! - consoles and games are already in their final display order
//! - a game's title is never empty
//! - `cover`/`video` are only set when they point at an existing file inside
//!   the game folder

use std::fmt;
use std::path::PathBuf;

/// Everything discovered in one library root.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    /// The library root the catalog was scanned from.
    pub root: PathBuf,
    pub consoles: Vec<Console>,
}

impl Catalog {
    pub fn game_count(&self) -> usize {
        self.consoles.iter().map(|c| c.games.len()).sum()
    }
}

/// A top-level library folder, e.g. `SNES`.
#[derive(Debug, Clone, PartialEq)]
pub struct Console {
    /// Folder name, also the display name.
    pub name: String,
    pub games: Vec<Game>,
}

/// One game folder and its normalized metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub title: String,
    pub year: Option<i32>,
    pub publisher: Option<String>,
    pub region: Option<String>,
    /// Deduplicated and sorted.
    pub tags: Vec<String>,
    pub notes: Option<String>,
    /// Path relative to `folder`, `/`-separated.
    pub cover: Option<String>,
    /// Path relative to `folder`, `/`-separated.
    pub video: Option<String>,
    /// Source directory of the game.
    pub folder: PathBuf,
    /// Name of the source directory (used for stable URL slugs).
    pub folder_name: String,
}

impl Game {
    /// A game known only by its folder.
    pub fn from_folder(folder: PathBuf, folder_name: &str) -> Self {
        Self {
            title: folder_name.to_string(),
            year: None,
            publisher: None,
            region: None,
            tags: Vec::new(),
            notes: None,
            cover: None,
            video: None,
            folder,
            folder_name: folder_name.to_string(),
        }
    }

    pub fn media(&self, field: MediaField) -> Option<&str> {
        match field {
            MediaField::Cover => self.cover.as_deref(),
            MediaField::Video => self.video.as_deref(),
        }
    }
}

/// The two media references a game can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaField {
    Cover,
    Video,
}

impl MediaField {
    pub const ALL: [MediaField; 2] = [MediaField::Cover, MediaField::Video];

    /// Key in `game.json`, also the base name of the copied file in the site.
    pub fn key(&self) -> &'static str {
        match self {
            MediaField::Cover => "cover",
            MediaField::Video => "video",
        }
    }
}

impl fmt::Display for MediaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
