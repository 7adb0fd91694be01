//! JSON snapshot persistence with atomic replacement.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use readbrain_core::{GraphSnapshot, ReadbrainError, ReadbrainResult, SnapshotStore};

/// The snapshot document on disk, e.g. `site/public/graph-data.json`.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back the last persisted snapshot, if any.
    pub fn load(&self) -> ReadbrainResult<Option<GraphSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            ReadbrainError::Io(format!("cannot read {}: {e}", self.path.display()))
        })?;
        Ok(Some(serde_json::from_str(&text)?))
    }
}

impl SnapshotStore for SnapshotFile {
    fn save(&self, snapshot: &GraphSnapshot) -> ReadbrainResult<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        write_atomic(&self.path, json.as_bytes())?;
        debug!("wrote {} bytes to {}", json.len(), self.path.display());
        Ok(())
    }
}

/// Write to a uniquely named sibling temp file, fsync, then rename over
/// `path`. The temp file is removed if any step fails.
fn write_atomic(path: &Path, bytes: &[u8]) -> ReadbrainResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|e| {
        ReadbrainError::Io(format!("cannot create directory {}: {e}", parent.display()))
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ReadbrainError::Io(format!("not a file path: {}", path.display())))?;
    let temp_path = parent.join(format!(".{file_name}.{}.tmp", ulid::Ulid::new()));

    let result = write_and_sync(&temp_path, bytes).and_then(|()| {
        std::fs::rename(&temp_path, path).map_err(|e| {
            ReadbrainError::Io(format!(
                "cannot replace {} with {}: {e}",
                path.display(),
                temp_path.display()
            ))
        })
    });

    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    result
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> ReadbrainResult<()> {
    let io_err =
        |e: std::io::Error| ReadbrainError::Io(format!("cannot write {}: {e}", path.display()));
    let mut file = File::create(path).map_err(io_err)?;
    file.write_all(bytes).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    Ok(())
}

/// SHA-256 over the `books` and `conceptGraph` sections, the parts of a
/// snapshot that only change when the notes do.
pub fn content_digest(snapshot: &GraphSnapshot) -> ReadbrainResult<String> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(&snapshot.books)?);
    hasher.update(serde_json::to_vec(&snapshot.concept_graph)?);
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::META_FILE;
    use std::fs;

    fn seed_library(root: &Path) {
        for id in ["atomic-habits", "power-of-habit"] {
            let dir = root.join(id);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(META_FILE), format!("title: {id}\n")).unwrap();
            fs::write(
                dir.join("ch1-start.md"),
                format!("---\nchapter: 1\nkeyThemes: [habit-formation]\n---\nNotes for {id}.\n"),
            )
            .unwrap();
        }
    }

    #[test]
    fn test_end_to_end_build() {
        let tmp = tempfile::tempdir().unwrap();
        let books = tmp.path().join("books");
        seed_library(&books);
        let output = tmp.path().join("site").join("public").join("graph-data.json");

        let snap = crate::build_graph(&books, &output).unwrap();
        assert_eq!(snap.stats.total_books, 2);
        assert_eq!(snap.stats.total_concepts, 1);
        assert_eq!(snap.concept_graph.nodes.len(), 1);
        assert_eq!(snap.concept_graph.nodes[0].weight, 2);
        assert_eq!(snap.concept_graph.nodes[0].label, "Habit Formation");
        assert_eq!(snap.concept_graph.edges.len(), 1);
        assert_eq!(snap.concept_graph.edges[0].source, "atomic-habits-ch1");
        assert_eq!(snap.concept_graph.edges[0].target, "power-of-habit-ch1");

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["stats"]["totalConcepts"], 1);
        assert_eq!(written["stats"]["enrichedChapters"], 0);
        assert_eq!(written["books"][0]["chapters"][0]["bookId"], "atomic-habits");
        assert_eq!(written["books"][0]["dateFinished"], "");
        assert!(written["books"][0]["cover"].is_null());
        assert_eq!(written["conceptGraph"]["edges"][0]["concept"], "habit-formation");
        assert!(written["generated"].is_string());

        let reloaded = SnapshotFile::new(&output).load().unwrap().unwrap();
        assert_eq!(reloaded.books, snap.books);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let books = tmp.path().join("books");
        seed_library(&books);
        let output = tmp.path().join("graph-data.json");

        let first = crate::build_graph(&books, &output).unwrap();
        let first_text = fs::read_to_string(&output).unwrap();
        let second = crate::build_graph(&books, &output).unwrap();
        let second_text = fs::read_to_string(&output).unwrap();

        assert_eq!(content_digest(&first).unwrap(), content_digest(&second).unwrap());
        let sections = |text: &str| {
            let v: serde_json::Value = serde_json::from_str(text).unwrap();
            (
                serde_json::to_string(&v["books"]).unwrap(),
                serde_json::to_string(&v["conceptGraph"]).unwrap(),
            )
        };
        assert_eq!(sections(&first_text), sections(&second_text));
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let tmp = tempfile::tempdir().unwrap();
        let books = tmp.path().join("books");
        seed_library(&books);
        let out_dir = tmp.path().join("out");
        let output = out_dir.join("graph-data.json");

        crate::build_graph(&books, &output).unwrap();
        crate::build_graph(&books, &output).unwrap();

        let names: Vec<String> = fs::read_dir(&out_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["graph-data.json"]);
    }

    #[test]
    fn test_rebuild_overwrites_previous_output() {
        let tmp = tempfile::tempdir().unwrap();
        let books = tmp.path().join("books");
        seed_library(&books);
        let output = tmp.path().join("graph-data.json");
        fs::write(&output, r#"{"stale": true}"#).unwrap();

        crate::build_graph(&books, &output).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert!(written.get("stale").is_none());
        assert_eq!(written["stats"]["totalBooks"], 2);
    }

    #[test]
    fn test_write_failure_propagates() {
        let tmp = tempfile::tempdir().unwrap();
        let books = tmp.path().join("books");
        seed_library(&books);
        // The output's parent is a regular file, so the directory cannot be created.
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let err = crate::build_graph(&books, blocker.join("graph-data.json")).unwrap_err();
        assert!(matches!(err, ReadbrainError::Io(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(tmp.path().join("none.json"));
        assert!(file.load().unwrap().is_none());
    }
}
