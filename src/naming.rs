//! Centralized handling of folder and file names.
//!
//! The library tree is the data source, so names carry meaning in three places:
//!
//! - **Discovery**: hidden entries (`.git`, `.DS_Store`) and well-known system
//!   folders (`__MACOSX`, `@eaDir`, ...) are never consoles or games.
//! - **Ordering**: every directory listing is sorted with [`sort_key`] so the
//!   generated site does not depend on filesystem enumeration order.
//! - **Output**: folder names become URL slugs ([`slugify`]) in the generated
//!   site, and import source names become library folder names
//!   ([`sanitize_folder_name`]).

use std::collections::HashSet;

/// Entries that operating systems and NAS boxes drop into shared folders.
const SYSTEM_ENTRIES: &[&str] = &[
    "__MACOSX",
    "@eaDir",
    "$RECYCLE.BIN",
    "System Volume Information",
    "lost+found",
    "Thumbs.db",
    "desktop.ini",
];

/// Characters that are path separators or reserved on common filesystems.
const RESERVED_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Whether a directory entry should be skipped during discovery.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.') || SYSTEM_ENTRIES.contains(&name)
}

/// Deterministic sort key for directory entries.
///
/// Case-insensitive first so `Mega Drive` and `mario` interleave the way a
/// human expects, then the exact name to break ties between names that only
/// differ in case.
pub fn sort_key(name: &str) -> (String, String) {
    (name.to_lowercase(), name.to_string())
}

/// Make a folder name safe to use as a single path component.
///
/// - Path separators, reserved characters and control characters become `_`
/// - Leading/trailing whitespace is trimmed
/// - Leading dots are stripped so the result is never a hidden entry
///
/// Returns `None` when nothing usable is left (`""`, `"..."`, `"   "`).
pub fn sanitize_folder_name(name: &str) -> Option<String> {
    let replaced: String = name
        .chars()
        .map(|c| {
            if RESERVED_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let cleaned = replaced.trim().trim_start_matches('.').trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Human-readable title for an imported game folder.
pub fn display_title(folder_name: &str) -> String {
    let trimmed = folder_name.trim();
    if trimmed.is_empty() {
        "Unknown game".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Lowercase ASCII slug for use in generated URLs.
///
/// - `"Super Metroid"` → `"super-metroid"`
/// - `"Mega Drive / Genesis"` → `"mega-drive-genesis"`
/// - `"???"` → `"item"`
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "item".to_string()
    } else {
        slug.to_string()
    }
}

/// Hands out slugs unique within one directory level.
///
/// Collisions get `-2`, `-3`, ... in the order they are requested, so the
/// result only depends on catalog order.
#[derive(Debug, Default)]
pub struct SlugAllocator {
    used: HashSet<String>,
}

impl SlugAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut candidate = base.clone();
        let mut n = 2;
        while self.used.contains(&candidate) {
            candidate = format!("{base}-{n}");
            n += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}
