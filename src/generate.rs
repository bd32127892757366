//! HTML site generation.
//!
//! Stage 2 of the build pipeline. Takes the scanned [`Catalog`] and writes the
//! final static site.
//!
//! ## Generated Pages
//!
//! - **Index page** (`/index.html`): every console with its game cards
//! - **Console pages** (`/{console}/index.html`): game grid for one console
//! - **Game pages** (`/{console}/{game}/index.html`): every metadata field,
//!   cover image and video player
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── catalog.json               # Optional machine-readable catalog
//! └── snes/
//!     ├── index.html
//!     └── super-metroid/
//!         ├── index.html
//!         ├── cover.jpg          # Copied from the game folder
//!         └── video.mp4
//! ```
//!
//! Slugs come from folder names, so renaming a title in `game.json` does not
//! move its page. Media is copied under fixed names (`cover.<ext>`,
//! `video.<ext>`) so references never need URL escaping. All links are
//! relative: the site works from any static file server or straight from disk.
//!
//! ## Determinism
//!
//! The output directory is wiped and rewritten on every run. Nothing in the
//! output depends on time or filesystem order, so the same catalog and config
//! always produce a byte-identical tree.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! All interpolated metadata is escaped automatically.

use crate::config::{self, SiteConfig};
use crate::naming::SlugAllocator;
use crate::types::{Catalog, Console, Game, MediaField};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Cannot write output {path}: {source}")]
    UnwritableOutput { path: PathBuf, source: io::Error },
    #[error("Output directory {output} overlaps library root {library}")]
    OutputOverlapsLibrary { output: PathBuf, library: PathBuf },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What was written, for CLI output.
#[derive(Debug)]
pub struct GenerateReport {
    pub output_dir: PathBuf,
    pub consoles: Vec<PageEntry>,
    pub catalog_json: bool,
}

/// A generated page and, for consoles, its game pages.
#[derive(Debug, Clone, PartialEq)]
pub struct PageEntry {
    pub title: String,
    /// Path relative to the output root.
    pub path: String,
    pub children: Vec<PageEntry>,
}

/// Site layout derived from the catalog, also serialized as `catalog.json`.
#[derive(Debug, Serialize)]
struct SitePlan<'a> {
    title: &'a str,
    consoles: Vec<SiteConsole<'a>>,
}

#[derive(Debug, Serialize)]
struct SiteConsole<'a> {
    name: &'a str,
    slug: String,
    page: String,
    games: Vec<SiteGame<'a>>,
}

#[derive(Debug, Serialize)]
struct SiteGame<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    publisher: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<&'a str>,
    #[serde(skip_serializing_if = "no_tags")]
    tags: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
    slug: String,
    page: String,
    /// Output-relative path of the copied cover.
    #[serde(skip_serializing_if = "Option::is_none")]
    cover: Option<String>,
    /// Output-relative path of the copied video.
    #[serde(skip_serializing_if = "Option::is_none")]
    video: Option<String>,
    /// Game folder relative to the library root.
    source: String,
    #[serde(skip)]
    game: &'a Game,
    #[serde(skip)]
    cover_file: Option<String>,
    #[serde(skip)]
    video_file: Option<String>,
}

fn no_tags(tags: &&[String]) -> bool {
    tags.is_empty()
}

const CSS_STATIC: &str = include_str!("../static/style.css");

pub fn generate(
    catalog: &Catalog,
    output_dir: &Path,
    config: &SiteConfig,
) -> Result<GenerateReport, GenerateError> {
    check_overlap(output_dir, &catalog.root)?;

    let plan = plan_site(catalog, &config.site.title);
    let css = format!(
        "{}\n\n{}\n\n{}",
        config::generate_color_css(&config.colors),
        config::generate_theme_css(&config.theme),
        CSS_STATIC
    );

    // Render everything before touching the output directory
    let index_html = render_index(&plan, config, &css).into_string();
    let catalog_json = if config.output.catalog_json {
        let mut json = serde_json::to_string_pretty(&plan)?;
        json.push('\n');
        Some(json)
    } else {
        None
    };

    reset_dir(output_dir)?;
    write_file(&output_dir.join("index.html"), index_html.as_bytes())?;
    log::debug!("Generated index.html");

    let mut consoles = Vec::new();
    for console in &plan.consoles {
        let console_dir = output_dir.join(&console.slug);
        create_dir(&console_dir)?;
        let console_html = render_console_page(console, config, &css).into_string();
        write_file(&console_dir.join("index.html"), console_html.as_bytes())?;

        let mut children = Vec::new();
        for game in &console.games {
            let game_dir = console_dir.join(&game.slug);
            create_dir(&game_dir)?;
            let game_html = render_game_page(console, game, config, &css).into_string();
            write_file(&game_dir.join("index.html"), game_html.as_bytes())?;
            copy_media(game, &game_dir)?;
            children.push(PageEntry {
                title: game.title.to_string(),
                path: game.page.clone(),
                children: vec![],
            });
        }
        log::debug!("Generated {} game pages for {}", children.len(), console.name);

        consoles.push(PageEntry {
            title: console.name.to_string(),
            path: console.page.clone(),
            children,
        });
    }

    if let Some(json) = &catalog_json {
        write_file(&output_dir.join("catalog.json"), json.as_bytes())?;
    }

    Ok(GenerateReport {
        output_dir: output_dir.to_path_buf(),
        consoles,
        catalog_json: catalog_json.is_some(),
    })
}

/// The output directory is wiped, so it must not share files with the library.
fn check_overlap(output_dir: &Path, library_root: &Path) -> Result<(), GenerateError> {
    let output = absolute(output_dir)?;
    let library = absolute(library_root)?;
    if output.starts_with(&library) || library.starts_with(&output) {
        return Err(GenerateError::OutputOverlapsLibrary {
            output: output_dir.to_path_buf(),
            library: library_root.to_path_buf(),
        });
    }
    Ok(())
}

fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.exists() {
        path.canonicalize()
    } else {
        std::path::absolute(path)
    }
}

fn reset_dir(dir: &Path) -> Result<(), GenerateError> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(|source| GenerateError::UnwritableOutput {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    create_dir(dir)
}

fn create_dir(dir: &Path) -> Result<(), GenerateError> {
    fs::create_dir_all(dir).map_err(|source| GenerateError::UnwritableOutput {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), GenerateError> {
    fs::write(path, contents).map_err(|source| GenerateError::UnwritableOutput {
        path: path.to_path_buf(),
        source,
    })
}

fn copy_media(game: &SiteGame, game_dir: &Path) -> Result<(), GenerateError> {
    for field in MediaField::ALL {
        let (Some(source), Some(file)) = (game.game.media(field), game.media_file(field)) else {
            continue;
        };
        let dest = game_dir.join(file);
        fs::copy(game.game.folder.join(source), &dest).map_err(|err| {
            GenerateError::UnwritableOutput {
                path: dest,
                source: err,
            }
        })?;
    }
    Ok(())
}

// ============================================================================
// Site planning
// ============================================================================

fn plan_site<'a>(catalog: &'a Catalog, title: &'a str) -> SitePlan<'a> {
    let mut console_slugs = SlugAllocator::new();
    let consoles = catalog
        .consoles
        .iter()
        .map(|console| {
            let slug = console_slugs.allocate(&console.name);
            SiteConsole {
                name: &console.name,
                page: format!("{slug}/index.html"),
                games: plan_games(catalog, console, &slug),
                slug,
            }
        })
        .collect();

    SitePlan { title, consoles }
}

fn plan_games<'a>(catalog: &Catalog, console: &'a Console, console_slug: &str) -> Vec<SiteGame<'a>> {
    let mut game_slugs = SlugAllocator::new();
    console
        .games
        .iter()
        .map(|game| {
            let slug = game_slugs.allocate(&game.folder_name);
            let dir = format!("{console_slug}/{slug}");
            let cover_file = game.cover.as_deref().map(|c| media_file_name(MediaField::Cover, c));
            let video_file = game.video.as_deref().map(|v| media_file_name(MediaField::Video, v));
            SiteGame {
                title: &game.title,
                year: game.year,
                publisher: game.publisher.as_deref(),
                region: game.region.as_deref(),
                tags: &game.tags,
                notes: game.notes.as_deref(),
                page: format!("{dir}/index.html"),
                cover: cover_file.as_ref().map(|f| format!("{dir}/{f}")),
                video: video_file.as_ref().map(|f| format!("{dir}/{f}")),
                source: source_path(catalog, game),
                slug,
                game,
                cover_file,
                video_file,
            }
        })
        .collect()
}

impl SiteGame<'_> {
    fn media_file(&self, field: MediaField) -> Option<&str> {
        match field {
            MediaField::Cover => self.cover_file.as_deref(),
            MediaField::Video => self.video_file.as_deref(),
        }
    }
}

/// Output filename for a copied media file: `cover.jpg`, `video.mp4`, ...
fn media_file_name(field: MediaField, source: &str) -> String {
    let ext: String = Path::new(source)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if ext.is_empty() {
        field.key().to_string()
    } else {
        format!("{}.{}", field.key(), ext)
    }
}

/// Game folder relative to the library root, `/`-separated.
fn source_path(catalog: &Catalog, game: &Game) -> String {
    game.folder
        .strip_prefix(&catalog.root)
        .unwrap_or(&game.folder)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, config: &SiteConfig, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(config.site.lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Renders the site header with breadcrumb
fn site_header(breadcrumb: Markup) -> Markup {
    html! {
        header.site-header {
            nav.breadcrumb {
                (breadcrumb)
            }
        }
    }
}

/// "1994 · Nintendo · NTSC", skipping absent parts.
fn meta_line(game: &SiteGame) -> Option<String> {
    let parts: Vec<String> = [
        game.year.map(|y| y.to_string()),
        game.publisher.map(String::from),
        game.region.map(String::from),
    ]
    .into_iter()
    .flatten()
    .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" · "))
    }
}

fn tag_list(tags: &[String]) -> Markup {
    html! {
        @if !tags.is_empty() {
            ul.tags {
                @for tag in tags {
                    li.tag { (tag) }
                }
            }
        }
    }
}

/// Renders a game card. `prefix` is the path from the current page to the
/// console directory (`"snes/"` on the index, `""` on the console page).
fn game_card(game: &SiteGame, prefix: &str) -> Markup {
    let href = format!("{prefix}{}/index.html", game.slug);
    html! {
        article.game-card {
            a.game-link href=(href) {
                @if let Some(cover) = &game.cover_file {
                    img.cover src={ (prefix) (game.slug) "/" (cover) } alt=(game.title) loading="lazy";
                } @else {
                    div.cover-placeholder {}
                }
                h3.game-title { (game.title) }
            }
            @if let Some(year) = game.year {
                p.meta { (year) }
            }
            (tag_list(game.tags))
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the index page: every console with all of its games
fn render_index(plan: &SitePlan, config: &SiteConfig, css: &str) -> Markup {
    let total: usize = plan.consoles.iter().map(|c| c.games.len()).sum();

    let content = html! {
        (site_header(html! { a href="index.html" { (plan.title) } }))
        main.index-page {
            header.page-header {
                h1 { (plan.title) }
                p.meta { (total) " games" }
            }
            @if plan.consoles.is_empty() {
                p.empty { "No games yet. Add console folders to the library and build again." }
            }
            @for console in &plan.consoles {
                section.console id=(console.slug) {
                    h2 {
                        a href=(console.page) { (console.name) }
                        " "
                        span.count { "(" (console.games.len()) ")" }
                    }
                    div.game-grid {
                        @for game in &console.games {
                            (game_card(game, &format!("{}/", console.slug)))
                        }
                    }
                }
            }
        }
    };

    base_document(plan.title, config, css, content)
}

/// Renders a console page with its game grid
fn render_console_page(console: &SiteConsole, config: &SiteConfig, css: &str) -> Markup {
    let breadcrumb = html! {
        a href="../index.html" { (config.site.title) }
        " › "
        (console.name)
    };

    let content = html! {
        (site_header(breadcrumb))
        main.console-page {
            header.page-header {
                h1 { (console.name) }
                p.meta { (console.games.len()) " games" }
            }
            @if console.games.is_empty() {
                p.empty { "No games for this console yet." }
            }
            div.game-grid {
                @for game in &console.games {
                    (game_card(game, ""))
                }
            }
        }
    };

    let title = format!("{} - {}", console.name, config.site.title);
    base_document(&title, config, css, content)
}

/// Renders a game detail page with every known attribute
fn render_game_page(
    console: &SiteConsole,
    game: &SiteGame,
    config: &SiteConfig,
    css: &str,
) -> Markup {
    let breadcrumb = html! {
        a href="../../index.html" { (config.site.title) }
        " › "
        a href="../index.html" { (console.name) }
        " › "
        (game.title)
    };

    let content = html! {
        (site_header(breadcrumb))
        main.game-page {
            article.game-detail {
                h1 { (game.title) }
                @if let Some(meta) = meta_line(game) {
                    p.meta { (meta) }
                }
                dl.fields {
                    @if let Some(year) = game.year {
                        dt { "Year" } dd.year { (year) }
                    }
                    @if let Some(publisher) = game.publisher {
                        dt { "Publisher" } dd.publisher { (publisher) }
                    }
                    @if let Some(region) = game.region {
                        dt { "Region" } dd.region { (region) }
                    }
                }
                (tag_list(game.tags))
                @if let Some(cover) = &game.cover_file {
                    figure.cover-frame {
                        img.cover src=(cover) alt=(game.title);
                    }
                }
                @if let Some(video) = &game.video_file {
                    video.preview controls preload="metadata" {
                        source src=(video);
                    }
                }
                @if let Some(notes) = game.notes {
                    section.notes {
                        h2 { "Notes" }
                        p { (notes) }
                    }
                }
            }
        }
    };

    let title = format!("{} - {} - {}", game.title, console.name, config.site.title);
    base_document(&title, config, css, content)
}

// ============================================================================
// Tests
// ============================================================================
