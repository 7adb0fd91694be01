use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::concept::{build_concept_graph, ConceptGraph};
use crate::model::{Book, Chapter};
use crate::pipeline::Corpus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub total_books: usize,
    pub total_chapters: usize,
    /// Distinct concept tags, including ones held by a single chapter.
    pub total_concepts: usize,
    pub enriched_chapters: usize,
}

/// Everything a build produces. Recomputed from disk every time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    pub generated: DateTime<Utc>,
    pub stats: GraphStats,
    pub books: Vec<Book>,
    pub concept_graph: ConceptGraph,
}

impl GraphSnapshot {
    pub fn assemble(corpus: Corpus, generated: DateTime<Utc>) -> Self {
        let concept_graph = build_concept_graph(&corpus.concepts);
        let stats = GraphStats {
            total_books: corpus.books.len(),
            total_chapters: corpus.books.iter().map(|b| b.chapters.len()).sum(),
            total_concepts: corpus.concepts.len(),
            enriched_chapters: corpus.books.iter().map(Book::enriched_count).sum(),
        };
        Self {
            generated,
            stats,
            books: corpus.books,
            concept_graph,
        }
    }

    pub fn chapters(&self) -> impl Iterator<Item = &Chapter> {
        self.books.iter().flat_map(|b| b.chapters.iter())
    }

    pub fn chapter(&self, id: &str) -> Option<&Chapter> {
        self.chapters().find(|c| c.id == id)
    }

    pub fn book(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    /// Chapters the enrichment generator has not processed yet.
    pub fn pending_chapters(&self) -> impl Iterator<Item = &Chapter> {
        self.chapters().filter(|c| !c.is_enriched)
    }
}
