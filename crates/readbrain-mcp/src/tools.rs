use serde_json::{json, Value};

use readbrain_core::{GraphSnapshot, ReadbrainResult};
use readbrain_store::FsGraphBuilder;

use crate::protocol::ToolResult;

// ---------------------------------------------------------------------------
// Tool schemas for tools/list
// ---------------------------------------------------------------------------

pub fn tool_definitions() -> Value {
    json!({ "tools": [
        json!({
            "name": "readbrain_graph",
            "description": "Rebuild the knowledge graph from the notes on disk and return the full snapshot: books, chapters and the concept graph.",
            "inputSchema": { "type": "object", "properties": {} }
        }),
        json!({
            "name": "readbrain_rebuild",
            "description": "Force a rebuild of graph-data.json and return only the summary statistics.",
            "inputSchema": { "type": "object", "properties": {} }
        }),
        json!({
            "name": "readbrain_concept",
            "description": "Show one concept tag: which chapters share it and the links it creates between them.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "concept": {
                        "type": "string",
                        "description": "Concept tag, e.g. 'habit-formation'"
                    }
                },
                "required": ["concept"]
            }
        }),
        json!({
            "name": "readbrain_chapter",
            "description": "Show one chapter with its enrichment and the chapters it is connected to through shared concepts.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "id": {
                        "type": "string",
                        "description": "Chapter id, e.g. 'atomic-habits-ch1'"
                    }
                },
                "required": ["id"]
            }
        }),
        json!({
            "name": "readbrain_pending",
            "description": "List chapters that have no enrichment record yet.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "book": {
                        "type": "string",
                        "description": "Only chapters of this book id (optional)"
                    }
                }
            }
        }),
    ]})
}

// ---------------------------------------------------------------------------
// Tool dispatch
// ---------------------------------------------------------------------------

pub fn call_tool(builder: &FsGraphBuilder, name: &str, args: &Value) -> ToolResult {
    match name {
        "readbrain_graph" => tool_graph(builder),
        "readbrain_rebuild" => tool_rebuild(builder),
        "readbrain_concept" => tool_concept(builder, args),
        "readbrain_chapter" => tool_chapter(builder, args),
        "readbrain_pending" => tool_pending(builder, args),
        _ => ToolResult::error(format!("unknown tool: {name}")),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn get_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str())
}

fn with_snapshot(
    result: ReadbrainResult<GraphSnapshot>,
    f: impl FnOnce(GraphSnapshot) -> ToolResult,
) -> ToolResult {
    match result {
        Ok(snapshot) => f(snapshot),
        Err(e) => ToolResult::error(format!("build failed: {e}")),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn tool_graph(builder: &FsGraphBuilder) -> ToolResult {
    with_snapshot(builder.build(), |snapshot| ToolResult::json(&snapshot))
}

fn tool_rebuild(builder: &FsGraphBuilder) -> ToolResult {
    with_snapshot(builder.build(), |snapshot| {
        ToolResult::json(&json!({
            "message": "Graph rebuilt",
            "stats": snapshot.stats,
        }))
    })
}

fn tool_concept(builder: &FsGraphBuilder, args: &Value) -> ToolResult {
    let Some(concept) = get_str(args, "concept") else {
        return ToolResult::error("missing required field: concept");
    };

    with_snapshot(builder.snapshot(), |snapshot| {
        let graph = &snapshot.concept_graph;
        let Some(node) = graph.node(concept) else {
            return ToolResult::text(format!(
                "Concept not shared by two or more chapters: {concept}"
            ));
        };

        let mut output = format!(
            "--- {} ({}) ---\n  weight: {}\n  chapters:\n",
            node.label, node.id, node.weight
        );
        for id in &node.chapters {
            let title = snapshot.chapter(id).map(|c| c.title.as_str()).unwrap_or("?");
            output.push_str(&format!("    {id}  {title}\n"));
        }
        output.push_str("  links:\n");
        for edge in graph.edges_for_concept(concept) {
            output.push_str(&format!("    {} <-> {}\n", edge.source, edge.target));
        }
        ToolResult::text(output)
    })
}

fn tool_chapter(builder: &FsGraphBuilder, args: &Value) -> ToolResult {
    let Some(id) = get_str(args, "id") else {
        return ToolResult::error("missing required field: id");
    };

    with_snapshot(builder.snapshot(), |snapshot| {
        let Some(chapter) = snapshot.chapter(id) else {
            return ToolResult::error(format!("chapter not found: {id}"));
        };

        let mut output = format!(
            "--- {} ---\n  book: {}\n  chapter: {}\n  title: {}\n  enriched: {}\n",
            chapter.id, chapter.book_id, chapter.chapter, chapter.title, chapter.is_enriched
        );
        if !chapter.concepts.is_empty() {
            output.push_str(&format!("  concepts: {}\n", chapter.concepts.join(", ")));
        }
        if let Some(ref summary) = chapter.summary {
            output.push_str(&format!("  summary: {summary}\n"));
        }
        for insight in &chapter.key_insights {
            output.push_str(&format!("  insight: {insight}\n"));
        }

        let links: Vec<_> = snapshot.concept_graph.edges_for_chapter(id).collect();
        if links.is_empty() {
            output.push_str("  connections: none\n");
        } else {
            output.push_str("  connections:\n");
            for edge in links {
                let other = edge.opposite(id).unwrap_or("?");
                output.push_str(&format!("    {other}  via {}\n", edge.concept));
            }
        }
        ToolResult::text(output)
    })
}

fn tool_pending(builder: &FsGraphBuilder, args: &Value) -> ToolResult {
    let book = get_str(args, "book");

    with_snapshot(builder.snapshot(), |snapshot| {
        let pending: Vec<&str> = snapshot
            .pending_chapters()
            .filter(|c| book.map_or(true, |b| c.book_id == b))
            .map(|c| c.id.as_str())
            .collect();

        if pending.is_empty() {
            return ToolResult::text("All chapters are enriched.");
        }
        let mut output = format!("{} chapter(s) without enrichment:\n", pending.len());
        for id in pending {
            output.push_str(&format!("  {id}\n"));
        }
        ToolResult::text(output)
    })
}
