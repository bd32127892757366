//! End-to-end test of import → scan → generate through the public API.
//!
//! Builds a small ROM source tree and library in a temp directory, imports
//! into it, then checks the generated site.
//!
//! Run with: cargo test --test pipeline

use retro_shelf::config::{self, SiteConfig};
use retro_shelf::generate;
use retro_shelf::import::{self, ImportOptions};
use retro_shelf::scan;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_string_lossy().into_owned();
            (rel, fs::read(e.path()).unwrap())
        })
        .collect()
}

/// `roms/SNES/Zelda` with art, a trailer and a ROM; a library holding Super Metroid.
fn setup() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let roms = tmp.path().join("roms/SNES");
    write(&roms.join("Zelda/boxart.png"), "zelda box");
    write(&roms.join("Zelda/trailer.mp4"), "zelda trailer");
    write(&roms.join("Zelda/zelda.sfc"), "zelda rom");
    write(&roms.join("Zelda/zelda.bin"), "zelda rom");
    write(&roms.join("Zelda/zelda.zip"), "zelda rom");

    let metroid = tmp.path().join("library/SNES/Super Metroid");
    write(
        &metroid.join("game.json"),
        r#"{"title":"Super Metroid","year":1994,"tags":["action","adventure"],"cover":"cover.jpg"}"#,
    );
    write(&metroid.join("cover.jpg"), "metroid cover");
    tmp
}

fn import_zelda(tmp: &TempDir, overwrite: bool) -> import::ImportReport {
    import::import(
        &tmp.path().join("library"),
        "SNES",
        &tmp.path().join("roms/SNES"),
        &ImportOptions { overwrite },
    )
    .unwrap()
}

#[test]
fn imported_game_is_published() {
    let tmp = setup();
    let library = tmp.path().join("library");
    let dist = tmp.path().join("dist");

    let imported = import_zelda(&tmp, false);
    assert_eq!(imported.imported().count(), 1);

    let zelda = library.join("SNES/Zelda");
    assert!(zelda.join("boxart.png").is_file());
    assert!(zelda.join("trailer.mp4").is_file());
    for rom in ["zelda.sfc", "zelda.bin", "zelda.zip"] {
        assert!(!zelda.join(rom).exists(), "{rom} was copied");
    }
    let meta: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(zelda.join("game.json")).unwrap()).unwrap();
    assert_eq!(meta["title"], "Zelda");
    assert_eq!(meta["cover"], "boxart.png");
    assert_eq!(meta["video"], "trailer.mp4");

    let report = scan::scan(&library).unwrap();
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    let site_config = config::load_config(&library).unwrap();
    generate::generate(&report.catalog, &dist, &site_config).unwrap();

    let index = fs::read_to_string(dist.join("index.html")).unwrap();
    assert!(index.contains("Zelda"));
    assert!(index.contains("Super Metroid"));
    assert!(dist.join("snes/zelda/cover.png").is_file());
    assert!(dist.join("snes/zelda/video.mp4").is_file());
}

#[test]
fn super_metroid_page_shows_year_tags_and_cover() {
    let tmp = setup();
    let library = tmp.path().join("library");
    let dist = tmp.path().join("dist");

    let report = scan::scan(&library).unwrap();
    generate::generate(&report.catalog, &dist, &SiteConfig::default()).unwrap();

    let index = fs::read_to_string(dist.join("index.html")).unwrap();
    for needle in ["Super Metroid", "1994", "action", "adventure"] {
        assert!(index.contains(needle), "index is missing {needle}");
    }
    let cover_ref = r#"src="snes/super-metroid/cover.jpg""#;
    assert!(index.contains(cover_ref));
    assert_eq!(
        fs::read(dist.join("snes/super-metroid/cover.jpg")).unwrap(),
        b"metroid cover"
    );

    let page = fs::read_to_string(dist.join("snes/super-metroid/index.html")).unwrap();
    assert!(page.contains("1994"));
    assert!(page.contains(r#"src="cover.jpg""#));
}

#[test]
fn existing_game_is_skipped_without_overwrite() {
    let tmp = setup();
    let zelda = tmp.path().join("library/SNES/Zelda");
    write(&zelda.join("game.json"), r#"{"title":"Zelda (curated)"}"#);
    write(&zelda.join("label.png"), "hand made");
    let before = snapshot(&zelda);

    let report = import_zelda(&tmp, false);

    assert_eq!(snapshot(&zelda), before);
    assert_eq!(report.skipped().collect::<Vec<_>>(), vec!["Zelda"]);
}

#[test]
fn overwrite_replaces_existing_game() {
    let tmp = setup();
    let zelda = tmp.path().join("library/SNES/Zelda");
    write(&zelda.join("label.png"), "hand made");

    let report = import_zelda(&tmp, true);

    assert!(!zelda.join("label.png").exists());
    assert!(zelda.join("boxart.png").is_file());
    assert!(!zelda.join("zelda.sfc").exists());
    assert_eq!(report.skipped().count(), 0);
}

#[test]
fn build_is_deterministic() {
    let tmp = setup();
    let library = tmp.path().join("library");
    import_zelda(&tmp, false);

    let report = scan::scan(&library).unwrap();
    let first = tmp.path().join("dist-a");
    let second = tmp.path().join("dist-b");
    generate::generate(&report.catalog, &first, &SiteConfig::default()).unwrap();

    let rescanned = scan::scan(&library).unwrap();
    generate::generate(&rescanned.catalog, &second, &SiteConfig::default()).unwrap();

    assert_eq!(snapshot(&first), snapshot(&second));
}

#[test]
fn dangling_cover_is_not_published() {
    let tmp = setup();
    let library = tmp.path().join("library");
    let dist = tmp.path().join("dist");
    write(
        &library.join("NES/Metroid/game.json"),
        r#"{"title":"Metroid","cover":"gone.png"}"#,
    );

    let report = scan::scan(&library).unwrap();
    assert_eq!(report.warnings.len(), 1);
    generate::generate(&report.catalog, &dist, &SiteConfig::default()).unwrap();

    for (path, bytes) in snapshot(&dist) {
        assert!(
            !String::from_utf8_lossy(&bytes).contains("gone.png"),
            "{path} references gone.png"
        );
    }
    assert!(dist.join("nes/metroid/index.html").is_file());
}
