//! The corpus walker: one directory per book under a books root.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use readbrain_core::{Corpus, CorpusSource, ReadbrainError, ReadbrainResult};

use crate::book::{is_book_dir, load_book};

/// Directories starting with this are reserved and never read as books.
const HIDDEN_PREFIX: char = '_';

#[derive(Debug, Clone)]
pub struct Library {
    root: PathBuf,
}

impl Library {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Book directories in name order. Anything that is not a directory,
    /// is reserved, or has no metadata record is left out silently.
    pub fn book_dirs(&self) -> ReadbrainResult<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(ReadbrainError::Io(format!(
                "books directory not found: {}",
                self.root.display()
            )));
        }

        let mut dirs = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("skipping unreadable entry: {e}");
                    continue;
                }
            };
            if !is_candidate(&entry) {
                debug!("skipping {}", entry.path().display());
                continue;
            }
            if !is_book_dir(entry.path()) {
                debug!("no metadata in {}, skipping", entry.path().display());
                continue;
            }
            dirs.push(entry.into_path());
        }
        Ok(dirs)
    }
}

fn is_candidate(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && !entry
            .file_name()
            .to_string_lossy()
            .starts_with(HIDDEN_PREFIX)
}

impl CorpusSource for Library {
    fn load_corpus(&self) -> ReadbrainResult<Corpus> {
        let mut corpus = Corpus::default();
        for dir in self.book_dirs()? {
            match load_book(&dir) {
                Ok(book) => corpus.push_book(book),
                Err(e) => warn!("skipping book {}: {e}", dir.display()),
            }
        }
        Ok(corpus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::META_FILE;
    use std::fs;

    fn add_book(root: &Path, id: &str, chapters: &[(&str, &str)]) {
        let dir = root.join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(META_FILE), format!("title: {id}\n")).unwrap();
        for (name, content) in chapters {
            fs::write(dir.join(name), content).unwrap();
        }
    }

    fn ids(corpus: &Corpus) -> Vec<&str> {
        corpus.books.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_skips_dirs_without_meta() {
        let root = tempfile::tempdir().unwrap();
        add_book(root.path(), "b-book", &[]);
        let stray = root.path().join("a-notes");
        fs::create_dir(&stray).unwrap();
        fs::write(
            stray.join("ch1-x.md"),
            "---\nchapter: 1\nkeyThemes: [x]\n---\n",
        )
        .unwrap();

        let corpus = Library::new(root.path()).load_corpus().unwrap();
        assert_eq!(ids(&corpus), vec!["b-book"]);
        assert!(corpus.concepts.is_empty());
    }

    #[test]
    fn test_skips_underscore_dirs_and_files() {
        let root = tempfile::tempdir().unwrap();
        add_book(root.path(), "_template", &[]);
        add_book(root.path(), "real", &[]);
        fs::write(root.path().join("README.md"), "hi").unwrap();
        fs::write(root.path().join(META_FILE), "title: root\n").unwrap();

        let corpus = Library::new(root.path()).load_corpus().unwrap();
        assert_eq!(ids(&corpus), vec!["real"]);
    }

    #[test]
    fn test_books_in_sorted_order() {
        let root = tempfile::tempdir().unwrap();
        for id in ["zen", "atomic", "middle"] {
            add_book(root.path(), id, &[]);
        }
        let corpus = Library::new(root.path()).load_corpus().unwrap();
        assert_eq!(ids(&corpus), vec!["atomic", "middle", "zen"]);
    }

    #[test]
    fn test_concept_index_follows_visit_order() {
        let root = tempfile::tempdir().unwrap();
        add_book(
            root.path(),
            "b",
            &[("ch1-x.md", "---\nchapter: 1\nkeyThemes: [focus]\n---\n")],
        );
        add_book(
            root.path(),
            "a",
            &[
                ("ch2-y.md", "---\nchapter: 2\nkeyThemes: [focus, rest]\n---\n"),
                ("ch1-x.md", "---\nchapter: 1\nkeyThemes: [rest]\n---\n"),
            ],
        );
        let corpus = Library::new(root.path()).load_corpus().unwrap();
        assert_eq!(corpus.concepts.get("focus").unwrap(), ["a-ch2", "b-ch1"]);
        assert_eq!(corpus.concepts.get("rest").unwrap(), ["a-ch1", "a-ch2"]);
        let order: Vec<&str> = corpus.concepts.iter().map(|(c, _)| c).collect();
        assert_eq!(order, vec!["rest", "focus"]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let err = Library::new(root.path().join("nope"))
            .load_corpus()
            .unwrap_err();
        assert!(matches!(err, ReadbrainError::Io(_)));
    }
}
