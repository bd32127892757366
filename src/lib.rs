//! # Retro Shelf
//!
//! Turn a folder tree of retro game metadata and media into a static website.
//! Your filesystem is the data source: directories become consoles and games,
//! an optional `game.json` per game carries metadata, and cover art and video
//! sit next to it.
//!
//! # Architecture: Two-Stage Pipeline Plus Importer
//!
//! ```text
//! 0. Import    roms/SNES/   →  library/SNES/   (media only, game.json synthesized)
//! 1. Scan      library/     →  Catalog          (filesystem → structured data)
//! 2. Generate  Catalog      →  dist/            (final HTML site)
//! ```
//!
//! The scanner never writes and the generator never reads the library beyond
//! copying referenced media, so each stage can be tested on its own.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: walks the library, loads metadata, produces the catalog and warnings |
//! | [`generate`] | Stage 2: renders the HTML site and `catalog.json` using Maud |
//! | [`import`] | Bootstraps library game folders from existing media folders |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`types`] | Catalog types shared by all stages (`Catalog`, `Console`, `Game`) |
//! | [`naming`] | Hidden-entry rules, sort order, folder-name sanitizing, slugs |
//! | [`metadata`] | `game.json` reading, writing and media reference resolution |
//! | [`output`] | CLI output formatting of pipeline results |
//!
//! # Design Decisions
//!
//! ## Broken Metadata Never Hides A Game
//!
//! A malformed `game.json` or a dangling cover reference is reported as a
//! [`scan::ScanWarning`]; the game still shows up with whatever data is usable.
//! Only a missing library root stops a build.
//!
//! ## Deterministic Output
//!
//! Every listing is sorted, slugs are derived from folder names, and no
//! timestamps are written. Building the same library twice yields a
//! byte-identical `dist/`.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), so every piece of
//! metadata is escaped at the interpolation site and templates are checked at
//! compile time.

pub mod config;
pub mod generate;
pub mod import;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
