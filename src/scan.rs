//! Library scanning and catalog construction.
//!
//! Stage 1 of the build pipeline. Walks the library root to discover consoles
//! and games, producing a [`Catalog`] that the emitter consumes.
//!
//! ## Directory Structure
//!
//! ```text
//! library/                         # Library root
//! ├── config.toml                  # Site configuration (optional)
//! ├── SNES/                        # Console (folder name = display name)
//! │   ├── Super Metroid/           # Game
//! │   │   ├── game.json            # Metadata (optional)
//! │   │   └── cover.jpg
//! │   └── Chrono Trigger/          # Game without metadata → title from folder
//! └── Mega Drive/
//!     └── Sonic the Hedgehog/
//!         ├── game.json
//!         └── intro.mp4
//! ```
//!
//! ## Rules
//!
//! - Only directories become consoles and games; loose files are ignored
//! - Hidden and system entries are skipped (see [`naming::is_hidden`])
//! - Every listing is sorted with [`naming::sort_key`], never filesystem order
//!
//! ## Error Tolerance
//!
//! Only an unreadable library root is fatal. Problems local to one console or
//! game become [`ScanWarning`]s: the affected game falls back to folder-name
//! data (or the unreadable directory is skipped) and scanning continues.

use crate::metadata::{self, GameMetadata, MetadataLoad};
use crate::naming;
use crate::types::{Catalog, Console, Game, MediaField};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Library root not found: {0}")]
    LibraryRootNotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Non-fatal problems collected during a scan.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanWarning {
    #[error("Malformed game.json in {folder}: {detail}")]
    MetadataParse { folder: PathBuf, detail: String },
    #[error("Missing {field} '{reference}' in {folder}")]
    MissingMediaReference {
        folder: PathBuf,
        field: MediaField,
        reference: String,
    },
    #[error("Cannot read directory {path}: {detail}")]
    UnreadableDirectory { path: PathBuf, detail: String },
}

/// Result of a scan: the catalog plus everything that went wrong along the way.
#[derive(Debug)]
pub struct ScanReport {
    pub catalog: Catalog,
    pub warnings: Vec<ScanWarning>,
}

pub fn scan(root: &Path) -> Result<ScanReport, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::LibraryRootNotFound(root.to_path_buf()));
    }

    let mut warnings = Vec::new();
    let mut consoles = Vec::new();

    for (name, path) in collect_subdirs(root, &mut warnings)? {
        let games: Vec<Game> = match collect_subdirs(&path, &mut warnings) {
            Ok(game_dirs) => game_dirs
                .into_iter()
                .map(|(game_name, game_dir)| load_game(game_dir, &game_name, &mut warnings))
                .collect(),
            Err(e) => {
                log::warn!("Skipping console {}: {}", path.display(), e);
                warnings.push(ScanWarning::UnreadableDirectory {
                    path,
                    detail: e.to_string(),
                });
                continue;
            }
        };
        log::debug!("Console {}: {} games", name, games.len());
        consoles.push(Console { name, games });
    }

    Ok(ScanReport {
        catalog: Catalog {
            root: root.to_path_buf(),
            consoles,
        },
        warnings,
    })
}

/// Visible subdirectories of `path` as `(name, path)`, in display order.
fn collect_subdirs(
    path: &Path,
    warnings: &mut Vec<ScanWarning>,
) -> std::io::Result<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(path)?
        .map(|e| e.map(|e| (e.file_name().to_string_lossy().into_owned(), e.path())));
    Ok(visible_subdirs(path, entries, warnings))
}

/// Keep visible directories, sorted. Entries that fail to read become warnings.
fn visible_subdirs(
    dir: &Path,
    entries: impl Iterator<Item = std::io::Result<(String, PathBuf)>>,
    warnings: &mut Vec<ScanWarning>,
) -> Vec<(String, PathBuf)> {
    let mut subdirs = Vec::new();
    for entry in entries {
        match entry {
            Ok((name, path)) => {
                if !naming::is_hidden(&name) && path.is_dir() {
                    subdirs.push((name, path));
                }
            }
            Err(e) => {
                log::warn!("Unreadable entry in {}: {}", dir.display(), e);
                warnings.push(ScanWarning::UnreadableDirectory {
                    path: dir.to_path_buf(),
                    detail: e.to_string(),
                });
            }
        }
    }

    subdirs.sort_by_cached_key(|(name, _)| naming::sort_key(name));
    subdirs
}

/// Build a game from its folder, degrading to folder-name-only data on bad metadata.
fn load_game(folder: PathBuf, folder_name: &str, warnings: &mut Vec<ScanWarning>) -> Game {
    match metadata::load_metadata(&folder) {
        MetadataLoad::Found(meta) => game_from_metadata(folder, folder_name, &meta, warnings),
        MetadataLoad::Missing => {
            log::debug!("No metadata in {}, using folder name", folder.display());
            Game::from_folder(folder, folder_name)
        }
        MetadataLoad::Malformed(detail) => {
            log::warn!("Malformed metadata in {}: {}", folder.display(), detail);
            warnings.push(ScanWarning::MetadataParse {
                folder: folder.clone(),
                detail,
            });
            Game::from_folder(folder, folder_name)
        }
    }
}

fn game_from_metadata(
    folder: PathBuf,
    folder_name: &str,
    meta: &GameMetadata,
    warnings: &mut Vec<ScanWarning>,
) -> Game {
    let mut game = Game::from_folder(folder, folder_name);

    if let Some(title) = metadata::resolve(&[meta.title.as_deref()]) {
        game.title = title;
    }
    game.year = meta.year;
    game.publisher = metadata::resolve(&[meta.publisher.as_deref()]);
    game.region = metadata::resolve(&[meta.region.as_deref()]);
    game.notes = metadata::resolve(&[meta.notes.as_deref()]);
    game.tags = meta
        .tags
        .as_deref()
        .map(metadata::normalize_tags)
        .unwrap_or_default();

    for field in MediaField::ALL {
        let reference = match field {
            MediaField::Cover => meta.cover.as_deref(),
            MediaField::Video => meta.video.as_deref(),
        };
        let Some(reference) = reference.filter(|r| !r.trim().is_empty()) else {
            continue;
        };
        let resolved = metadata::resolve_media(&game.folder, reference);
        if resolved.is_none() {
            log::warn!(
                "Dropping {} '{}' for {}: not a file inside the game folder",
                field,
                reference,
                game.folder.display()
            );
            warnings.push(ScanWarning::MissingMediaReference {
                folder: game.folder.clone(),
                field,
                reference: reference.to_string(),
            });
        }
        match field {
            MediaField::Cover => game.cover = resolved,
            MediaField::Video => game.video = resolved,
        }
    }

    game
}
