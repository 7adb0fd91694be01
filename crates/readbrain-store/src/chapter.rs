//! Chapter note parsing and enrichment lookup.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use readbrain_core::fields::{
    lenient, lenient_opt_string, lenient_string, lenient_strings, lenient_u32,
};
use readbrain_core::{Chapter, ChapterNotes, Enrichment, ReadbrainError, ReadbrainResult};

use crate::frontmatter;

/// Sort key shared by every file without a `ch<N>` prefix.
pub const UNNUMBERED_KEY: u64 = 9999;

const ENRICHED_SUFFIX: &str = "_enriched.json";

static CHAPTER_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^ch(\d+)").expect("chapter number pattern is valid"));

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ChapterFrontMatter {
    #[serde(deserialize_with = "lenient_u32")]
    chapter: u32,
    #[serde(deserialize_with = "lenient_opt_string")]
    title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    date_noted: String,
    #[serde(deserialize_with = "lenient_strings")]
    key_themes: Vec<String>,
    #[serde(deserialize_with = "lenient")]
    rating: Option<f64>,
}

/// Ordering key from a chapter file name: `ch12-foo.md` -> 12.
pub fn chapter_sort_key(file_name: &str) -> u64 {
    CHAPTER_NUMBER
        .captures(file_name)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(UNNUMBERED_KEY)
}

/// `ch3-cues.md` -> `ch3-cues_enriched.json` in the same directory.
pub fn enrichment_path(chapter_path: &Path) -> PathBuf {
    let stem = chapter_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    chapter_path.with_file_name(format!("{stem}{ENRICHED_SUFFIX}"))
}

/// Read a chapter note's front-matter and body.
pub fn read_notes(path: &Path) -> ReadbrainResult<ChapterNotes> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ReadbrainError::Io(format!("cannot read {}: {e}", path.display())))?;

    let (yaml, body) = frontmatter::split(&text);
    let meta: ChapterFrontMatter = yaml
        .map(|y| frontmatter::decode(y, path))
        .unwrap_or_default();

    let title = meta.title.unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    Ok(ChapterNotes {
        chapter: meta.chapter,
        title,
        date_noted: meta.date_noted,
        key_themes: meta.key_themes,
        rating: meta.rating,
        body: body.to_string(),
    })
}

/// Load the sibling enrichment record. Missing or unreadable records are
/// both reported as `None`.
pub fn load_enrichment(chapter_path: &Path) -> Option<Enrichment> {
    let path = enrichment_path(chapter_path);
    if !path.is_file() {
        debug!("no enrichment for {}", chapter_path.display());
        return None;
    }

    let text = match std::fs::read_to_string(&path) {
        Ok(t) => t,
        Err(e) => {
            warn!("cannot read enrichment {}: {e}", path.display());
            return None;
        }
    };

    match serde_json::from_str::<Enrichment>(&text) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!("ignoring malformed enrichment {}: {e}", path.display());
            None
        }
    }
}

/// Parse one chapter file of book `book_id`.
pub fn parse_chapter(book_id: &str, path: &Path) -> ReadbrainResult<Chapter> {
    let notes = read_notes(path)?;
    let enrichment = load_enrichment(path);
    Ok(Chapter::new(book_id, notes, enrichment))
}
