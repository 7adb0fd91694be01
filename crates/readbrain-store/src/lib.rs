pub mod book;
pub mod chapter;
pub mod frontmatter;
pub mod library;
pub mod snapshot_file;

use std::path::PathBuf;

use readbrain_core::{GraphBuilder, GraphSnapshot, ReadbrainResult};

pub use book::{load_book, META_FILE};
pub use chapter::{chapter_sort_key, enrichment_path, parse_chapter};
pub use library::Library;
pub use snapshot_file::{content_digest, SnapshotFile};

pub type FsGraphBuilder = GraphBuilder<Library, SnapshotFile>;

/// Builder reading notes from `books_dir` and persisting to `output`.
pub fn open(books_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> FsGraphBuilder {
    GraphBuilder::new(Library::new(books_dir), SnapshotFile::new(output))
}

/// Rebuild the graph from `books_dir`, overwrite `output`, return the result.
pub fn build_graph(
    books_dir: impl Into<PathBuf>,
    output: impl Into<PathBuf>,
) -> ReadbrainResult<GraphSnapshot> {
    open(books_dir, output).build()
}
