//! Shared test utilities for the retro-shelf test suite.
//!
//! Provides fixture setup, catalog lookups that panic with the available
//! names on a miss, and a byte-level snapshot of a directory tree.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let report = scan(&library_root(&tmp)).unwrap();
//!
//! let game = find_game(&report.catalog, "SNES", "Super Metroid");
//! assert_eq!(game.year, Some(1994));
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::types::{Catalog, Console, Game};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/` to a temp directory and return it.
///
/// The copy holds `library/` (a scannable library) and `roms/` (importable
/// source folders). Tests may mutate it freely.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

pub fn library_root(tmp: &TempDir) -> PathBuf {
    tmp.path().join("library")
}

pub fn roms_root(tmp: &TempDir) -> PathBuf {
    tmp.path().join("roms")
}

/// Create `root/<console>/<game>/`, with a `game.json` when `json` is given.
pub fn write_game(root: &Path, console: &str, game: &str, json: Option<&str>) -> PathBuf {
    let dir = root.join(console).join(game);
    fs::create_dir_all(&dir).unwrap();
    if let Some(json) = json {
        fs::write(dir.join("game.json"), json).unwrap();
    }
    dir
}

// =========================================================================
// Catalog lookups: panic with a clear message on miss
// =========================================================================

/// Find a console by name. Panics if not found.
pub fn find_console<'a>(catalog: &'a Catalog, name: &str) -> &'a Console {
    catalog
        .consoles
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| {
            let names = console_names(catalog);
            panic!("console '{name}' not found. Available: {names:?}")
        })
}

/// Find a game by folder name or title. Panics if not found.
pub fn find_game<'a>(catalog: &'a Catalog, console: &str, game: &str) -> &'a Game {
    let found = find_console(catalog, console);
    found
        .games
        .iter()
        .find(|g| g.folder_name == game || g.title == game)
        .unwrap_or_else(|| {
            let titles = game_titles(found);
            panic!("game '{game}' not found in console '{console}'. Available: {titles:?}")
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All console names in catalog order.
pub fn console_names(catalog: &Catalog) -> Vec<&str> {
    catalog.consoles.iter().map(|c| c.name.as_str()).collect()
}

/// All game titles in console order.
pub fn game_titles(console: &Console) -> Vec<&str> {
    console.games.iter().map(|g| g.title.as_str()).collect()
}

/// Every file under `root`, keyed by `/`-separated relative path.
pub fn read_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e
                .path()
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            (relative, fs::read(e.path()).unwrap())
        })
        .collect()
}
