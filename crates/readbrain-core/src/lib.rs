pub mod concept;
pub mod error;
pub mod fields;
pub mod model;
pub mod pipeline;
pub mod snapshot;

pub use concept::{
    build_concept_graph, concept_label, ConceptEdge, ConceptGraph, ConceptIndex, ConceptNode,
};
pub use error::{ReadbrainError, ReadbrainResult};
pub use model::{chapter_id, Book, Chapter, ChapterNotes, Enrichment};
pub use pipeline::{Corpus, CorpusSource, GraphBuilder, SnapshotStore};
pub use snapshot::{GraphSnapshot, GraphStats};
