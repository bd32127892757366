//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (console, game) is its semantic identity, title and
//! positional index, with filesystem paths shown as secondary context via
//! indented lines. This makes the output readable as a library inventory while
//! still letting users trace data back to specific folders.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Consoles
//! 001 Mega Drive (1 game)
//!     001 Sonic the Hedgehog (1991)
//!         Video: intro.mp4
//! 002 SNES (3 games)
//!     001 Broken Game
//!     002 Chrono Trigger
//!     003 Super Metroid (1994)
//!         Cover: cover.jpg
//!
//! Config
//!     config.toml
//! ```
//!
//! Scan warnings are formatted separately by [`format_warnings`] so the CLI can
//! print them once, after everything else:
//!
//! ```text
//! Warnings
//!     Malformed game.json in library/SNES/Broken Game: ...
//! ```
//!
//! ## Generate
//!
//! ```text
//! Home → index.html
//! 001 SNES → snes/index.html
//!     001 Super Metroid → snes/super-metroid/index.html
//! Catalog → catalog.json
//!
//! Generated 1 console, 1 game page
//! ```
//!
//! ## Import
//!
//! ```text
//! SNES → library/SNES
//! 001 Tetris Attack: no media
//!     Rejected: tetris.sfc
//! 002 Zelda: 1 image, 1 video
//!     Cover: boxart.png
//!     Video: trailer.mp4
//!     Rejected: zelda.sfc
//!
//! Warnings
//!     No images or videos found for Tetris Attack
//!
//! Imported 2 games, skipped 0, failed 0
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::config::CONFIG_FILE;
use crate::generate::GenerateReport;
use crate::import::{GameOutcome, ImportReport};
use crate::scan::{ScanReport, ScanWarning};
use crate::types::Game;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 game`, `3 games`.
fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

/// Format an entity header: positional index + title, with optional detail.
///
/// ```text
/// 001 SNES (3 games)
/// 003 Super Metroid (1994)
/// 002 Chrono Trigger
/// ```
fn entity_header(index: usize, title: &str, detail: Option<&str>) -> String {
    match detail {
        Some(d) => format!("{} {} ({})", format_index(index), title, d),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Header plus context lines for one scanned game.
fn game_lines(index: usize, game: &Game) -> Vec<String> {
    let year = game.year.map(|y| y.to_string());
    let mut lines = vec![format!(
        "{}{}",
        indent(1),
        entity_header(index, &game.title, year.as_deref())
    )];
    if game.title != game.folder_name {
        lines.push(format!("{}Source: {}/", indent(2), game.folder_name));
    }
    if let Some(cover) = &game.cover {
        lines.push(format!("{}Cover: {}", indent(2), cover));
    }
    if let Some(video) = &game.video {
        lines.push(format!("{}Video: {}", indent(2), video));
    }
    lines
}

// ============================================================================
// Stage 1: Scan output
// ============================================================================

/// Format scan stage output showing the discovered library.
pub fn format_scan_output(report: &ScanReport) -> Vec<String> {
    let catalog = &report.catalog;
    let mut lines = vec!["Consoles".to_string()];

    if catalog.consoles.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, console) in catalog.consoles.iter().enumerate() {
        let games = count(console.games.len(), "game");
        lines.push(entity_header(i + 1, &console.name, Some(&games)));
        for (j, game) in console.games.iter().enumerate() {
            lines.extend(game_lines(j + 1, game));
        }
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if catalog.root.join(CONFIG_FILE).exists() {
        lines.push(format!("{}{}", indent(1), CONFIG_FILE));
    } else {
        lines.push(format!("{}(defaults)", indent(1)));
    }

    lines
}

/// Format scan warnings as an indented section. Empty when there are none.
pub fn format_warnings(warnings: &[ScanWarning]) -> Vec<String> {
    if warnings.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), "Warnings".to_string()];
    lines.extend(warnings.iter().map(|w| format!("{}{}", indent(1), w)));
    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(report: &ScanReport) {
    for line in format_scan_output(report) {
        println!("{}", line);
    }
}

/// Print scan warnings to stdout, once, at the end of a run.
pub fn print_warnings(warnings: &[ScanWarning]) {
    for line in format_warnings(warnings) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Generate output
// ============================================================================

/// Format generate stage output showing the written pages.
///
/// Each entity leads with its positional index and title, followed by `→`
/// and the output path.
pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = vec!["Home \u{2192} index.html".to_string()];
    let mut game_pages = 0;

    for (i, console) in report.consoles.iter().enumerate() {
        lines.push(format!(
            "{} \u{2192} {}",
            entity_header(i + 1, &console.title, None),
            console.path
        ));
        for (j, game) in console.children.iter().enumerate() {
            lines.push(format!(
                "{}{} \u{2192} {}",
                indent(1),
                entity_header(j + 1, &game.title, None),
                game.path
            ));
            game_pages += 1;
        }
    }

    if report.catalog_json {
        lines.push("Catalog \u{2192} catalog.json".to_string());
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}",
        count(report.consoles.len(), "console"),
        count(game_pages, "game page")
    ));
    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Import output
// ============================================================================

/// Format the per-game outcomes of an import run.
pub fn format_import_output(report: &ImportReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{} \u{2192} {}",
        report.console,
        report.console_dir.display()
    )];

    for (i, outcome) in report.outcomes.iter().enumerate() {
        let index = format_index(i + 1);
        match outcome {
            GameOutcome::Imported(game) => {
                let manifest = &game.manifest;
                let summary = if manifest.has_media() {
                    format!(
                        "{}, {}",
                        count(manifest.images.len(), "image"),
                        count(manifest.videos.len(), "video")
                    )
                } else {
                    "no media".to_string()
                };
                let replaced = if game.replaced { " (replaced)" } else { "" };
                lines.push(format!("{} {}: {}{}", index, game.name, summary, replaced));
                if let Some(cover) = manifest.cover() {
                    lines.push(format!("{}Cover: {}", indent(1), cover));
                }
                if let Some(video) = manifest.video() {
                    lines.push(format!("{}Video: {}", indent(1), video));
                }
                if !manifest.rejected.is_empty() {
                    lines.push(format!(
                        "{}Rejected: {}",
                        indent(1),
                        manifest.rejected.join(", ")
                    ));
                }
            }
            GameOutcome::SkippedExisting { name, .. } => {
                lines.push(format!("{} {}: skipped, already in library", index, name));
            }
            GameOutcome::Failed { name, error } => {
                lines.push(format!("{} {}: failed", index, name));
                lines.push(format!("{}{}", indent(1), error));
            }
        }
    }

    let without_media: Vec<&str> = report.without_media().map(|g| g.name.as_str()).collect();
    if !without_media.is_empty() {
        lines.push(String::new());
        lines.push("Warnings".to_string());
        for name in without_media {
            lines.push(format!("{}No images or videos found for {}", indent(1), name));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Imported {}, skipped {}, failed {}",
        count(report.imported().count(), "game"),
        report.skipped().count(),
        report.failed().count()
    ));
    lines
}

/// Print import output to stdout.
pub fn print_import_output(report: &ImportReport) {
    for line in format_import_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
