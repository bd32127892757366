//! Bootstrap library game folders from existing per-game media directories.
//!
//! ## Source Layout
//!
//! ```text
//! roms/SNES/                       # Source folder for one console
//! ├── Zelda/                       # One folder per game
//! │   ├── boxart.png               # Image → copied, first one becomes cover
//! │   ├── trailer.mp4              # Video → copied, first one becomes video
//! │   └── zelda.sfc                # ROM → never copied
//! └── Tetris Attack/
//!     └── tetris.sfc               # No media → imported with a warning
//! ```
//!
//! becomes
//!
//! ```text
//! library/SNES/
//! ├── Zelda/
//! │   ├── boxart.png
//! │   ├── trailer.mp4
//! │   └── game.json                # {"title": "Zelda", "cover": "boxart.png", "video": "trailer.mp4"}
//! └── Tetris Attack/
//!     └── game.json
//! ```
//!
//! ## Classification
//!
//! Files are classified by lowercase extension against two fixed allow-lists
//! ([`IMAGE_EXTENSIONS`], [`VIDEO_EXTENSIONS`]). Anything else is rejected:
//! ROM images, archives, save files, text files, files without an extension.
//! Rejected files are listed in the report and never copied or referenced.
//!
//! ## Existing Targets
//!
//! Without `overwrite`, an existing target folder is left untouched and the
//! game is reported as skipped. With `overwrite`, the new folder is built in a
//! hidden staging directory next to the target and swapped in with renames, so
//! a failure mid-copy never leaves a mix of old and new files.

use crate::metadata::{self, GameMetadata};
use crate::naming;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "mkv", "avi", "m4v"];

/// Prefix of staging directories; hidden so the scanner never sees them.
const STAGING_PREFIX: &str = ".import-";

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Source folder not found: {0}")]
    SourceFolderNotFound(PathBuf),
    #[error("Console name '{0}' has no usable characters")]
    InvalidConsoleName(String),
    #[error("Source folder {0} is the target console folder")]
    SourceIsTarget(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Why a single game could not be imported. The import continues with the next game.
#[derive(Error, Debug)]
pub enum GameImportError {
    #[error("Cannot write {path}: {source}")]
    UnwritableOutput { path: PathBuf, source: io::Error },
    #[error("Cannot read {path}: {source}")]
    UnreadableSource { path: PathBuf, source: io::Error },
    #[error("Folder name '{0}' has no usable characters")]
    UnusableName(String),
    #[error("Folder '{folder}' maps to '{name}', which another folder in this import already uses")]
    DuplicateName { name: String, folder: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Image,
    Video,
    Rejected,
}

/// Classify a file by extension.
pub fn classify(path: &Path) -> FileClass {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        FileClass::Image
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        FileClass::Video
    } else {
        FileClass::Rejected
    }
}

/// Classified contents of one source game folder.
///
/// Paths are relative to the game folder, `/`-separated and sorted with
/// [`naming::sort_key`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportManifest {
    pub images: Vec<String>,
    pub videos: Vec<String>,
    pub rejected: Vec<String>,
}

impl ImportManifest {
    /// Walk a source game folder, skipping hidden files and directories.
    pub fn build(game_dir: &Path) -> io::Result<Self> {
        let mut manifest = Self::default();
        let walker = WalkDir::new(game_dir)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || !naming::is_hidden(&e.file_name().to_string_lossy())
            });

        for entry in walker {
            let entry = entry.map_err(io::Error::other)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(game_dir) else {
                continue;
            };
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            match classify(entry.path()) {
                FileClass::Image => manifest.images.push(relative),
                FileClass::Video => manifest.videos.push(relative),
                FileClass::Rejected => manifest.rejected.push(relative),
            }
        }

        for list in [
            &mut manifest.images,
            &mut manifest.videos,
            &mut manifest.rejected,
        ] {
            list.sort_by_cached_key(|p| naming::sort_key(p));
        }
        Ok(manifest)
    }

    pub fn cover(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn video(&self) -> Option<&str> {
        self.videos.first().map(String::as_str)
    }

    pub fn has_media(&self) -> bool {
        !self.images.is_empty() || !self.videos.is_empty()
    }

    fn media(&self) -> impl Iterator<Item = &String> {
        self.images.iter().chain(&self.videos)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Replace existing library game folders instead of skipping them.
    pub overwrite: bool,
}

/// A game folder that was written to the library.
#[derive(Debug)]
pub struct ImportedGame {
    /// Library folder name.
    pub name: String,
    pub title: String,
    pub target: PathBuf,
    pub manifest: ImportManifest,
    /// Whether an existing folder was replaced.
    pub replaced: bool,
}

#[derive(Debug)]
pub enum GameOutcome {
    Imported(ImportedGame),
    SkippedExisting { name: String, target: PathBuf },
    Failed { name: String, error: GameImportError },
}

/// Per-game outcomes of one import run, in source order.
#[derive(Debug)]
pub struct ImportReport {
    pub console: String,
    pub console_dir: PathBuf,
    pub outcomes: Vec<GameOutcome>,
}

impl ImportReport {
    pub fn imported(&self) -> impl Iterator<Item = &ImportedGame> {
        self.outcomes.iter().filter_map(|o| match o {
            GameOutcome::Imported(game) => Some(game),
            _ => None,
        })
    }

    /// Names of games skipped because their target already existed.
    pub fn skipped(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().filter_map(|o| match o {
            GameOutcome::SkippedExisting { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &GameImportError)> {
        self.outcomes.iter().filter_map(|o| match o {
            GameOutcome::Failed { name, error } => Some((name.as_str(), error)),
            _ => None,
        })
    }

    /// Imported games for which no image or video was found.
    pub fn without_media(&self) -> impl Iterator<Item = &ImportedGame> {
        self.imported().filter(|g| !g.manifest.has_media())
    }
}

/// Import every game folder under `source` into `library_root/<console>/`.
///
/// Fails before touching the library when the source folder or console name
/// is unusable. Per-game failures are recorded in the report.
pub fn import(
    library_root: &Path,
    console: &str,
    source: &Path,
    options: &ImportOptions,
) -> Result<ImportReport, ImportError> {
    if !source.is_dir() {
        return Err(ImportError::SourceFolderNotFound(source.to_path_buf()));
    }
    let console_name = naming::sanitize_folder_name(console)
        .ok_or_else(|| ImportError::InvalidConsoleName(console.to_string()))?;
    let console_dir = library_root.join(&console_name);

    if console_dir.exists() && console_dir.canonicalize()? == source.canonicalize()? {
        return Err(ImportError::SourceIsTarget(source.to_path_buf()));
    }

    let game_dirs = collect_game_dirs(source)?;
    fs::create_dir_all(&console_dir)?;

    let mut claimed = HashSet::new();
    let outcomes = game_dirs
        .iter()
        .map(|(name, dir)| import_game(&console_dir, name, dir, options, &mut claimed))
        .collect();

    Ok(ImportReport {
        console: console_name,
        console_dir,
        outcomes,
    })
}

fn collect_game_dirs(source: &Path) -> io::Result<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(source)?
        .map(|e| e.map(|e| (e.file_name().to_string_lossy().into_owned(), e.path())));
    Ok(game_dirs(source, entries))
}

/// Visible subdirectories in sort order. Unreadable entries are logged and skipped.
fn game_dirs(
    source: &Path,
    entries: impl Iterator<Item = io::Result<(String, PathBuf)>>,
) -> Vec<(String, PathBuf)> {
    let mut dirs: Vec<(String, PathBuf)> = entries
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("Unreadable entry in {}: {}", source.display(), err);
                None
            }
        })
        .filter(|(name, p)| !naming::is_hidden(name) && p.is_dir())
        .collect();
    dirs.sort_by_cached_key(|(name, _)| naming::sort_key(name));
    dirs
}

/// Import one source folder. `claimed` holds the library names already used
/// by earlier folders of this run.
fn import_game(
    console_dir: &Path,
    source_name: &str,
    source_dir: &Path,
    options: &ImportOptions,
    claimed: &mut HashSet<String>,
) -> GameOutcome {
    let Some(name) = naming::sanitize_folder_name(source_name) else {
        log::warn!("Skipping {}: unusable folder name", source_dir.display());
        return GameOutcome::Failed {
            name: source_name.to_string(),
            error: GameImportError::UnusableName(source_name.to_string()),
        };
    };
    if !claimed.insert(name.clone()) {
        log::warn!(
            "Skipping {}: name '{}' already used in this import",
            source_dir.display(),
            name
        );
        return GameOutcome::Failed {
            error: GameImportError::DuplicateName {
                name: name.clone(),
                folder: source_name.to_string(),
            },
            name,
        };
    }
    let target = console_dir.join(&name);

    if target.exists() && !options.overwrite {
        log::info!("Skipping {}: already in library", name);
        return GameOutcome::SkippedExisting { name, target };
    }

    let title = naming::display_title(source_name);
    let manifest = match ImportManifest::build(source_dir) {
        Ok(manifest) => manifest,
        Err(source) => {
            let error = GameImportError::UnreadableSource {
                path: source_dir.to_path_buf(),
                source,
            };
            log::warn!("Failed to import {}: {}", name, error);
            return GameOutcome::Failed { name, error };
        }
    };
    match install_game(console_dir, source_dir, &manifest, &target, &title) {
        Ok(replaced) => {
            if !manifest.has_media() {
                log::warn!("No images or videos found for {}", name);
            }
            log::info!(
                "Imported {} ({} images, {} videos, {} rejected)",
                name,
                manifest.images.len(),
                manifest.videos.len(),
                manifest.rejected.len()
            );
            GameOutcome::Imported(ImportedGame {
                name,
                title,
                target,
                manifest,
                replaced,
            })
        }
        Err(error) => {
            log::warn!("Failed to import {}: {}", name, error);
            GameOutcome::Failed { name, error }
        }
    }
}

/// Build the game folder in staging, then swap it into `target`.
///
/// Returns whether a previous folder was replaced. On error `target` is as it was.
fn install_game(
    console_dir: &Path,
    source_dir: &Path,
    manifest: &ImportManifest,
    target: &Path,
    title: &str,
) -> Result<bool, GameImportError> {
    let unwritable = |path: &Path| {
        let path = path.to_path_buf();
        move |source| GameImportError::UnwritableOutput { path, source }
    };

    // Dropped at the end of this function, taking any previous contents with it
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(console_dir)
        .map_err(unwritable(console_dir))?;
    let fresh = staging.path().join("game");
    fs::create_dir(&fresh).map_err(unwritable(&fresh))?;

    for relative in manifest.media() {
        let dest = fresh.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(unwritable(parent))?;
        }
        fs::copy(source_dir.join(relative), &dest).map_err(unwritable(&dest))?;
    }

    let meta = GameMetadata {
        title: Some(title.to_string()),
        cover: manifest.cover().map(String::from),
        video: manifest.video().map(String::from),
        ..Default::default()
    };
    metadata::write_metadata(&fresh, &meta).map_err(unwritable(&fresh))?;

    swap_into_place(&fresh, target, &staging.path().join("previous"))
}

/// Move `fresh` to `target`, parking any existing `target` at `previous`.
///
/// If the final rename fails the parked folder is moved back.
fn swap_into_place(fresh: &Path, target: &Path, previous: &Path) -> Result<bool, GameImportError> {
    let replaced = target.exists();
    if replaced {
        fs::rename(target, previous).map_err(|source| GameImportError::UnwritableOutput {
            path: target.to_path_buf(),
            source,
        })?;
    }

    if let Err(source) = fs::rename(fresh, target) {
        if replaced {
            if let Err(e) = fs::rename(previous, target) {
                log::error!(
                    "Could not restore {} from {}: {}",
                    target.display(),
                    previous.display(),
                    e
                );
            }
        }
        return Err(GameImportError::UnwritableOutput {
            path: target.to_path_buf(),
            source,
        });
    }
    Ok(replaced)
}
