use serde::{Deserialize, Serialize};

use crate::fields::{lenient, lenient_opt_string, lenient_opt_strings, lenient_strings};

/// Display color used when a book's metadata does not declare one.
pub const DEFAULT_COLOR: &str = "#8B949E";
/// Author shown when a book's metadata does not declare one.
pub const DEFAULT_AUTHOR: &str = "Unknown";
/// Status given to books whose metadata does not declare one.
pub const DEFAULT_STATUS: &str = "reading";

/// Chapter identifier, unique across the corpus.
pub fn chapter_id(book_id: &str, chapter: u32) -> String {
    format!("{book_id}-ch{chapter}")
}

// ---------------------------------------------------------------------------
// Book
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Directory name. Titles may change; this does not.
    pub id: String,
    pub title: String,
    pub author: String,
    pub cover: Option<String>,
    pub color: String,
    pub rating: Option<f64>,
    pub status: String,
    pub tags: Vec<String>,
    pub date_finished: String,
    pub total_chapters: u32,
    pub chapters: Vec<Chapter>,
}

impl Book {
    pub fn enriched_count(&self) -> usize {
        self.chapters.iter().filter(|c| c.is_enriched).count()
    }
}

// ---------------------------------------------------------------------------
// Chapter
// ---------------------------------------------------------------------------

/// What a chapter note file says about itself, before enrichment is merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChapterNotes {
    pub chapter: u32,
    pub title: String,
    pub date_noted: String,
    pub key_themes: Vec<String>,
    pub rating: Option<f64>,
    pub body: String,
}

/// Annotation written next to a chapter by the enrichment generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Enrichment {
    #[serde(deserialize_with = "lenient_opt_string")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub key_insights: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub quotable_ideas: Vec<String>,
    /// `None` when the record does not declare concepts at all, which lets
    /// the chapter's own themes through.
    #[serde(deserialize_with = "lenient_opt_strings")]
    pub concepts: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_strings")]
    pub actionable_items: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub connected_ideas: Vec<String>,
    #[serde(deserialize_with = "lenient_opt_string")]
    pub emotional_resonance: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string")]
    pub enriched_at: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub book_id: String,
    pub chapter: u32,
    pub title: String,
    pub date_noted: String,
    pub key_themes: Vec<String>,
    pub rating: Option<f64>,
    pub is_enriched: bool,
    pub summary: Option<String>,
    pub key_insights: Vec<String>,
    pub quotable_ideas: Vec<String>,
    pub concepts: Vec<String>,
    pub actionable_items: Vec<String>,
    pub connected_ideas: Vec<String>,
    pub emotional_resonance: Option<String>,
    pub raw_notes: String,
}

impl Chapter {
    /// Merge a chapter's notes with its enrichment record, if one was loaded.
    ///
    /// Enrichment concepts win over the note's key themes whenever the record
    /// declares them, even as an empty list.
    pub fn new(book_id: &str, notes: ChapterNotes, enrichment: Option<Enrichment>) -> Self {
        let is_enriched = enrichment.is_some();
        let enrichment = enrichment.unwrap_or_default();
        let concepts = enrichment
            .concepts
            .unwrap_or_else(|| notes.key_themes.clone());

        Self {
            id: chapter_id(book_id, notes.chapter),
            book_id: book_id.to_string(),
            chapter: notes.chapter,
            title: notes.title,
            date_noted: notes.date_noted,
            key_themes: notes.key_themes,
            rating: notes.rating,
            is_enriched,
            summary: enrichment.summary,
            key_insights: enrichment.key_insights,
            quotable_ideas: enrichment.quotable_ideas,
            concepts,
            actionable_items: enrichment.actionable_items,
            connected_ideas: enrichment.connected_ideas,
            emotional_resonance: enrichment.emotional_resonance,
            raw_notes: notes.body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(themes: &[&str]) -> ChapterNotes {
        ChapterNotes {
            chapter: 3,
            title: "Make It Obvious".into(),
            key_themes: themes.iter().map(|s| s.to_string()).collect(),
            body: "notes".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_enrichment_concepts_take_priority() {
        let enrichment = Enrichment {
            concepts: Some(vec!["b".into(), "c".into()]),
            ..Default::default()
        };
        let ch = Chapter::new("atomic-habits", notes(&["a"]), Some(enrichment));
        assert_eq!(ch.id, "atomic-habits-ch3");
        assert!(ch.is_enriched);
        assert_eq!(ch.concepts, vec!["b", "c"]);
        assert_eq!(ch.key_themes, vec!["a"]);
    }

    #[test]
    fn test_themes_used_without_enrichment() {
        let ch = Chapter::new("atomic-habits", notes(&["a"]), None);
        assert!(!ch.is_enriched);
        assert_eq!(ch.concepts, vec!["a"]);
        assert!(ch.summary.is_none());
        assert!(ch.key_insights.is_empty());
    }

    #[test]
    fn test_record_without_concepts_falls_back_to_themes() {
        let ch = Chapter::new("b", notes(&["a"]), Some(Enrichment::default()));
        assert!(ch.is_enriched);
        assert_eq!(ch.concepts, vec!["a"]);
    }

    #[test]
    fn test_enrichment_json_shape() {
        let json = r#"{
            "summary": "Cues drive habits.",
            "keyInsights": ["one", "two"],
            "concepts": ["habit-formation"],
            "emotionalResonance": "It matters.",
            "enrichedAt": "2025-01-01T00:00:00+00:00",
            "model": "gpt-4o-mini"
        }"#;
        let e: Enrichment = serde_json::from_str(json).unwrap();
        assert_eq!(e.summary.as_deref(), Some("Cues drive habits."));
        assert_eq!(e.key_insights.len(), 2);
        assert_eq!(e.concepts, Some(vec!["habit-formation".to_string()]));
        assert!(e.quotable_ideas.is_empty());
        assert_eq!(e.model.as_deref(), Some("gpt-4o-mini"));
    }
}
