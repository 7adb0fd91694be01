//! Book directories: `meta.yaml` plus `ch*.md` notes.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use readbrain_core::fields::{
    lenient, lenient_opt_string, lenient_opt_u32, lenient_string, lenient_strings,
};
use readbrain_core::model::{DEFAULT_AUTHOR, DEFAULT_COLOR, DEFAULT_STATUS};
use readbrain_core::{Book, ReadbrainError, ReadbrainResult};

use crate::chapter::{chapter_sort_key, parse_chapter};
use crate::frontmatter;

/// Metadata record whose presence makes a directory a book.
pub const META_FILE: &str = "meta.yaml";

const CHAPTER_PREFIX: &str = "ch";
const NOTE_EXTENSION: &str = ".md";

/// `meta.yaml` as written by hand or by the scaffolder. Every field is
/// optional; see [`load_book`] for the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct BookMeta {
    #[serde(deserialize_with = "lenient_opt_string")]
    title: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string")]
    author: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string")]
    cover: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string")]
    color: Option<String>,
    #[serde(deserialize_with = "lenient")]
    rating: Option<f64>,
    #[serde(deserialize_with = "lenient_opt_string")]
    status: Option<String>,
    #[serde(deserialize_with = "lenient_strings")]
    tags: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    date_finished: String,
    #[serde(deserialize_with = "lenient_opt_u32")]
    total_chapters: Option<u32>,
}

pub fn is_book_dir(dir: &Path) -> bool {
    dir.join(META_FILE).is_file()
}

/// Whether `file_name` matches the `ch*.md` note pattern.
pub fn is_chapter_file(file_name: &str) -> bool {
    file_name.starts_with(CHAPTER_PREFIX) && file_name.ends_with(NOTE_EXTENSION)
}

/// Chapter files of a book in reading order: numbered chapters ascending,
/// then unnumbered ones by file name.
pub fn discover_chapters(dir: &Path) -> ReadbrainResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable entry in {}: {e}", dir.display());
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_str().is_some_and(is_chapter_file) {
            files.push(entry.into_path());
        }
    }

    files.sort_by_key(|p| {
        p.file_name()
            .map(|n| chapter_sort_key(&n.to_string_lossy()))
            .unwrap_or(crate::chapter::UNNUMBERED_KEY)
    });
    Ok(files)
}

fn read_meta(dir: &Path) -> ReadbrainResult<BookMeta> {
    let path = dir.join(META_FILE);
    let text = std::fs::read_to_string(&path)
        .map_err(|e| ReadbrainError::Io(format!("cannot read {}: {e}", path.display())))?;
    Ok(frontmatter::decode(&text, &path))
}

/// Load the book stored in `dir`. The caller is expected to have checked
/// [`is_book_dir`]. Chapters that cannot be read are skipped.
pub fn load_book(dir: &Path) -> ReadbrainResult<Book> {
    let id = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ReadbrainError::NotFound(format!("no book id for {}", dir.display())))?;
    let meta = read_meta(dir)?;

    let mut chapters = Vec::new();
    for path in discover_chapters(dir)? {
        match parse_chapter(&id, &path) {
            Ok(chapter) => chapters.push(chapter),
            Err(e) => warn!("skipping chapter {}: {e}", path.display()),
        }
    }
    debug!("loaded book {id} with {} chapters", chapters.len());

    let total_chapters = meta
        .total_chapters
        .unwrap_or_else(|| u32::try_from(chapters.len()).unwrap_or(u32::MAX));

    Ok(Book {
        title: meta.title.unwrap_or_else(|| id.clone()),
        author: meta.author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        cover: meta.cover,
        color: meta.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        rating: meta.rating,
        status: meta.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        tags: meta.tags,
        date_finished: meta.date_finished,
        total_chapters,
        chapters,
        id,
    })
}
