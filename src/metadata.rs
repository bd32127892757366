//! Per-game metadata: the `game.json` schema and how it is read and resolved.
//!
//! Every field is optional. A game folder without `game.json` is still a game;
//! its title falls back to the folder name.
//!
//! ```json
//! {
//!   "title": "Super Metroid",
//!   "year": 1994,
//!   "publisher": "Nintendo",
//!   "region": "NTSC",
//!   "tags": ["action", "adventure"],
//!   "notes": "Best played in the dark.",
//!   "cover": "cover.jpg",
//!   "video": "media/intro.mp4"
//! }
//! ```
//!
//! ## Strictness
//!
//! Unknown keys are ignored so other tools can annotate the same file. Known
//! keys must have the documented type: a string `year` or a `tags` string
//! instead of an array makes the whole file malformed, and the game degrades
//! to folder-name-only data. `null` is accepted wherever a value is optional.
//!
//! ## Load result
//!
//! Reading is modelled as [`MetadataLoad`] rather than an error, because every
//! outcome has a defined fallback in the scanner:
//!
//! | Variant | Scanner behavior |
//! |---------|------------------|
//! | `Found` | normalize fields, resolve media |
//! | `Missing` | folder-name-only game, no warning |
//! | `Malformed` | folder-name-only game, warning collected |

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

/// Fixed metadata filename inside each game folder.
pub const METADATA_FILE: &str = "game.json";

/// Raw `game.json` contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
}

/// Outcome of reading `game.json` from a game folder.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataLoad {
    Found(GameMetadata),
    Missing,
    /// File exists but could not be read or parsed; carries the reason.
    Malformed(String),
}

/// Read and parse `game.json` from `game_dir`.
pub fn load_metadata(game_dir: &Path) -> MetadataLoad {
    let path = game_dir.join(METADATA_FILE);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return MetadataLoad::Missing,
        Err(e) => return MetadataLoad::Malformed(e.to_string()),
    };
    // Derived Deserialize also accepts arrays positionally, so check the shape first
    let value: serde_json::Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => return MetadataLoad::Malformed(e.to_string()),
    };
    if !value.is_object() {
        return MetadataLoad::Malformed("expected a JSON object".to_string());
    }
    match serde_json::from_value::<GameMetadata>(value) {
        Ok(meta) => MetadataLoad::Found(meta),
        Err(e) => MetadataLoad::Malformed(e.to_string()),
    }
}

/// Write `game.json` into `game_dir`, pretty-printed with a trailing newline.
pub fn write_metadata(game_dir: &Path, meta: &GameMetadata) -> io::Result<()> {
    let mut json = serde_json::to_string_pretty(meta).map_err(io::Error::other)?;
    json.push('\n');
    fs::write(game_dir.join(METADATA_FILE), json)
}

/// Resolve a metadata field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty value (trimmed).
///
/// ```text
/// title: resolve(&[json_title, folder_name])
/// notes: resolve(&[json_notes])
/// ```
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Trim, drop empties, deduplicate and sort tags.
///
/// Tags are a set; sorting gives the emitter a stable order to render.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Resolve a media reference relative to its game folder.
///
/// Returns the `/`-separated path relative to `game_dir` when the reference
/// points at an existing regular file inside the game folder. Absolute paths,
/// `..` escapes (including via symlinks) and missing files yield `None`.
pub fn resolve_media(game_dir: &Path, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    let base = game_dir.canonicalize().ok()?;
    let target = base.join(reference).canonicalize().ok()?;
    if !target.is_file() {
        return None;
    }
    let relative = target.strip_prefix(&base).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_missing() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(load_metadata(tmp.path()), MetadataLoad::Missing);
    }

    #[test]
    fn valid_file_is_found() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(METADATA_FILE),
            r#"{"title":"Super Metroid","year":1994,"tags":["action","adventure"]}"#,
        )
        .unwrap();

        let MetadataLoad::Found(meta) = load_metadata(tmp.path()) else {
            panic!("expected Found");
        };
        assert_eq!(meta.title.as_deref(), Some("Super Metroid"));
        assert_eq!(meta.year, Some(1994));
        assert_eq!(
            meta.tags,
            Some(vec!["action".to_string(), "adventure".to_string()])
        );
        assert_eq!(meta.cover, None);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(METADATA_FILE),
            r#"{"title":"Zelda","players":1}"#,
        )
        .unwrap();
        assert!(matches!(load_metadata(tmp.path()), MetadataLoad::Found(_)));
    }

    #[test]
    fn nulls_are_absent() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(METADATA_FILE),
            r#"{"title":null,"tags":null,"year":null}"#,
        )
        .unwrap();
        assert_eq!(
            load_metadata(tmp.path()),
            MetadataLoad::Found(GameMetadata::default())
        );
    }

    #[test]
    fn syntax_error_is_malformed() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(METADATA_FILE), r#"{"title": "Broken","#).unwrap();
        assert!(matches!(
            load_metadata(tmp.path()),
            MetadataLoad::Malformed(_)
        ));
    }

    #[test]
    fn wrong_type_is_malformed() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(METADATA_FILE), r#"{"year":"1994"}"#).unwrap();
        assert!(matches!(
            load_metadata(tmp.path()),
            MetadataLoad::Malformed(_)
        ));
    }

    #[test]
    fn non_object_is_malformed() {
        let tmp = TempDir::new().unwrap();
        for json in [r#"["Zelda"]"#, r#"["Zelda", 1994]"#, "[]", "\"Zelda\"", "1994", "null"] {
            fs::write(tmp.path().join(METADATA_FILE), json).unwrap();
            assert!(
                matches!(load_metadata(tmp.path()), MetadataLoad::Malformed(_)),
                "{json} should be malformed"
            );
        }
    }

    #[test]
    fn write_skips_absent_fields() {
        let tmp = TempDir::new().unwrap();
        let meta = GameMetadata {
            title: Some("Zelda".to_string()),
            cover: Some("boxart.png".to_string()),
            ..Default::default()
        };
        write_metadata(tmp.path(), &meta).unwrap();

        let written = fs::read_to_string(tmp.path().join(METADATA_FILE)).unwrap();
        assert!(written.ends_with('\n'));
        assert!(!written.contains("video"));
        assert!(!written.contains("year"));
        assert_eq!(load_metadata(tmp.path()), MetadataLoad::Found(meta));
    }

    #[test]
    fn resolve_first_non_empty_wins() {
        assert_eq!(
            resolve(&[Some("  "), None, Some(" Zelda ")]),
            Some("Zelda".to_string())
        );
        assert_eq!(resolve(&[None, Some("")]), None);
    }

    #[test]
    fn tags_are_normalized() {
        let tags = vec![
            "rpg".to_string(),
            " action ".to_string(),
            "".to_string(),
            "rpg".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["action", "rpg"]);
    }

    #[test]
    fn media_resolves_existing_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("cover.jpg"), "fake image").unwrap();
        assert_eq!(
            resolve_media(tmp.path(), "cover.jpg"),
            Some("cover.jpg".to_string())
        );
    }

    #[test]
    fn media_resolves_nested_file() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("media")).unwrap();
        fs::write(tmp.path().join("media/intro.mp4"), "fake video").unwrap();
        assert_eq!(
            resolve_media(tmp.path(), "./media/intro.mp4"),
            Some("media/intro.mp4".to_string())
        );
    }

    #[test]
    fn media_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(resolve_media(tmp.path(), "cover.jpg"), None);
        assert_eq!(resolve_media(tmp.path(), "   "), None);
    }

    #[test]
    fn media_directory_is_none() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("media")).unwrap();
        assert_eq!(resolve_media(tmp.path(), "media"), None);
        assert_eq!(resolve_media(tmp.path(), "."), None);
    }

    #[test]
    fn media_outside_game_folder_is_none() {
        let tmp = TempDir::new().unwrap();
        let game = tmp.path().join("game");
        fs::create_dir_all(&game).unwrap();
        fs::write(tmp.path().join("outside.jpg"), "fake image").unwrap();
        assert_eq!(resolve_media(&game, "../outside.jpg"), None);

        let absolute = tmp.path().join("outside.jpg");
        assert_eq!(resolve_media(&game, absolute.to_str().unwrap()), None);
    }
}
