use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::Chapter;

// ---------------------------------------------------------------------------
// ConceptIndex
// ---------------------------------------------------------------------------

/// Concept tag -> chapter ids, in the order chapters were visited.
///
/// Tags iterate in first-seen order so the derived graph is reproducible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConceptIndex {
    order: Vec<String>,
    chapters: HashMap<String, Vec<String>>,
}

impl ConceptIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, concept: &str, chapter_id: &str) {
        match self.chapters.get_mut(concept) {
            Some(ids) => ids.push(chapter_id.to_string()),
            None => {
                self.order.push(concept.to_string());
                self.chapters
                    .insert(concept.to_string(), vec![chapter_id.to_string()]);
            }
        }
    }

    /// Record every concept of `chapter`. A tag repeated within one chapter
    /// is recorded once.
    pub fn record(&mut self, chapter: &Chapter) {
        let mut seen: Vec<&str> = Vec::with_capacity(chapter.concepts.len());
        for concept in &chapter.concepts {
            if seen.contains(&concept.as_str()) {
                continue;
            }
            seen.push(concept);
            self.insert(concept, &chapter.id);
        }
    }

    pub fn get(&self, concept: &str) -> Option<&[String]> {
        self.chapters.get(concept).map(Vec::as_slice)
    }

    /// Number of distinct concept tags.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.order.iter().map(|concept| {
            let ids = self
                .chapters
                .get(concept)
                .map(Vec::as_slice)
                .unwrap_or_default();
            (concept.as_str(), ids)
        })
    }
}

// ---------------------------------------------------------------------------
// ConceptGraph
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptNode {
    pub id: String,
    pub label: String,
    pub chapters: Vec<String>,
    pub weight: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptEdge {
    pub source: String,
    pub target: String,
    pub concept: String,
}

impl ConceptEdge {
    pub fn touches(&self, chapter_id: &str) -> bool {
        self.source == chapter_id || self.target == chapter_id
    }

    /// The other endpoint, if `chapter_id` is one of them.
    pub fn opposite(&self, chapter_id: &str) -> Option<&str> {
        if self.source == chapter_id {
            Some(self.target.as_str())
        } else if self.target == chapter_id {
            Some(self.source.as_str())
        } else {
            None
        }
    }
}

/// Chapters sharing a concept tag. Two chapters sharing two concepts are
/// joined by two edges, one per concept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptGraph {
    pub nodes: Vec<ConceptNode>,
    pub edges: Vec<ConceptEdge>,
}

impl ConceptGraph {
    pub fn node(&self, concept: &str) -> Option<&ConceptNode> {
        self.nodes.iter().find(|n| n.id == concept)
    }

    pub fn edges_for_concept<'a>(
        &'a self,
        concept: &'a str,
    ) -> impl Iterator<Item = &'a ConceptEdge> {
        self.edges.iter().filter(move |e| e.concept == concept)
    }

    pub fn edges_for_chapter<'a>(
        &'a self,
        chapter_id: &'a str,
    ) -> impl Iterator<Item = &'a ConceptEdge> {
        self.edges.iter().filter(move |e| e.touches(chapter_id))
    }
}

/// Derive the co-occurrence graph. Concepts attached to a single chapter
/// contribute nothing.
pub fn build_concept_graph(index: &ConceptIndex) -> ConceptGraph {
    let mut graph = ConceptGraph::default();

    for (concept, ids) in index.iter() {
        if ids.len() < 2 {
            continue;
        }
        graph.nodes.push(ConceptNode {
            id: concept.to_string(),
            label: concept_label(concept),
            chapters: ids.to_vec(),
            weight: ids.len(),
        });
        for (i, source) in ids.iter().enumerate() {
            for target in &ids[i + 1..] {
                graph.edges.push(ConceptEdge {
                    source: source.clone(),
                    target: target.clone(),
                    concept: concept.to_string(),
                });
            }
        }
    }

    graph
}

/// `"habit-formation"` -> `"Habit Formation"`.
///
/// A letter is upper-cased when it follows a non-letter and lower-cased
/// otherwise.
pub fn concept_label(concept: &str) -> String {
    let mut label = String::with_capacity(concept.len());
    let mut prev_alpha = false;
    for c in concept.chars() {
        let c = if c == '-' || c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if prev_alpha {
                label.extend(c.to_lowercase());
            } else {
                label.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            label.push(c);
            prev_alpha = false;
        }
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(entries: &[(&str, &str)]) -> ConceptIndex {
        let mut idx = ConceptIndex::new();
        for (concept, id) in entries {
            idx.insert(concept, id);
        }
        idx
    }

    #[test]
    fn test_label() {
        assert_eq!(concept_label("habit-formation"), "Habit Formation");
        assert_eq!(concept_label("deep_WORK"), "Deep Work");
        assert_eq!(concept_label("2-minute-rule"), "2 Minute Rule");
    }

    #[test]
    fn test_single_chapter_concept_is_dropped() {
        let idx = index(&[
            ("lonely", "a-ch1"),
            ("shared", "a-ch1"),
            ("shared", "b-ch1"),
        ]);
        let graph = build_concept_graph(&idx);
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.node("lonely").is_none());
        assert!(graph.edges.iter().all(|e| e.concept != "lonely"));
    }

    #[test]
    fn test_edge_count_is_pairs() {
        let mut idx = ConceptIndex::new();
        for id in ["a-ch1", "a-ch2", "b-ch1", "c-ch4", "d-ch2"] {
            idx.insert("focus", id);
        }
        let graph = build_concept_graph(&idx);
        let node = graph.node("focus").unwrap();
        assert_eq!(node.weight, 5);
        assert_eq!(node.chapters.len(), 5);
        assert_eq!(graph.edges_for_concept("focus").count(), 10);
    }

    #[test]
    fn test_edge_emission_order() {
        let idx = index(&[("x", "a"), ("x", "b"), ("x", "c")]);
        let graph = build_concept_graph(&idx);
        let pairs: Vec<(&str, &str)> = graph
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(pairs, vec![("a", "b"), ("a", "c"), ("b", "c")]);
    }

    #[test]
    fn test_parallel_edges_are_kept() {
        let idx = index(&[("x", "a"), ("x", "b"), ("y", "a"), ("y", "b")]);
        let graph = build_concept_graph(&idx);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.edges_for_chapter("a").count(), 2);
        assert_eq!(graph.edges[0].opposite("b"), Some("a"));
    }

    #[test]
    fn test_index_keeps_first_seen_order() {
        let idx = index(&[("zeta", "a"), ("alpha", "a"), ("zeta", "b")]);
        let order: Vec<&str> = idx.iter().map(|(c, _)| c).collect();
        assert_eq!(order, vec!["zeta", "alpha"]);
        assert_eq!(idx.get("zeta").unwrap(), ["a", "b"]);
        assert_eq!(idx.len(), 2);
    }
}
