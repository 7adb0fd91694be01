//! Graph assembly over pluggable corpus sources and snapshot sinks.

use chrono::Utc;
use tracing::info;

use crate::concept::ConceptIndex;
use crate::error::ReadbrainResult;
use crate::model::Book;
use crate::snapshot::GraphSnapshot;

/// Books in corpus order plus the concept index gathered while walking them.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub books: Vec<Book>,
    pub concepts: ConceptIndex,
}

impl Corpus {
    /// Append a book, recording its chapters' concepts in visiting order.
    pub fn push_book(&mut self, book: Book) {
        for chapter in &book.chapters {
            self.concepts.record(chapter);
        }
        self.books.push(book);
    }
}

pub trait CorpusSource {
    fn load_corpus(&self) -> ReadbrainResult<Corpus>;
}

pub trait SnapshotStore {
    /// Replace the stored snapshot. Readers must never observe a partial write.
    fn save(&self, snapshot: &GraphSnapshot) -> ReadbrainResult<()>;
}

pub struct GraphBuilder<S, T> {
    source: S,
    store: T,
}

impl<S: CorpusSource, T: SnapshotStore> GraphBuilder<S, T> {
    pub fn new(source: S, store: T) -> Self {
        Self { source, store }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    /// Fresh snapshot of the corpus, not persisted.
    pub fn snapshot(&self) -> ReadbrainResult<GraphSnapshot> {
        let corpus = self.source.load_corpus()?;
        Ok(GraphSnapshot::assemble(corpus, Utc::now()))
    }

    /// Full rebuild: walk, derive, persist, return.
    pub fn build(&self) -> ReadbrainResult<GraphSnapshot> {
        let snapshot = self.snapshot()?;
        self.store.save(&snapshot)?;
        info!(
            books = snapshot.stats.total_books,
            chapters = snapshot.stats.total_chapters,
            concepts = snapshot.stats.total_concepts,
            enriched = snapshot.stats.enriched_chapters,
            "graph rebuilt"
        );
        Ok(snapshot)
    }
}
