mod config;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use readbrain_core::{ConceptNode, GraphSnapshot};
use readbrain_store::{content_digest, FsGraphBuilder};

#[derive(Parser)]
#[command(
    name = "readbrain",
    version,
    about = "ReadBrain - knowledge graph from personal reading notes"
)]
struct Cli {
    /// Directory holding one subdirectory per book
    #[arg(long, global = true)]
    books: Option<PathBuf>,

    /// Where the graph snapshot is written
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild graph-data.json from the notes
    Build,

    /// Show corpus statistics without writing anything
    Stats,

    /// List concepts shared by two or more chapters
    Concepts {
        /// Only concepts connecting at least this many chapters
        #[arg(short, long, default_value = "2")]
        min_weight: usize,
    },

    /// Show a chapter and the chapters it connects to
    Chapter {
        /// Chapter id, e.g. atomic-habits-ch1
        id: String,
    },

    /// List chapters that have no enrichment record yet
    Pending {
        /// Only chapters of this book
        #[arg(short, long)]
        book: Option<String>,
    },

    /// Show current configuration
    Config,

    /// Launch MCP server (stdio transport)
    Serve,
}

/// Log filter from `RUST_LOG` directives, `warn` when unset or invalid.
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config()?;
    let books = cli.books.unwrap_or(cfg.library.books_dir);
    let output = cli.output.unwrap_or(cfg.library.output);
    tracing::debug!("books: {}, output: {}", books.display(), output.display());
    let builder = readbrain_store::open(books, output);

    match cli.command {
        Commands::Build => cmd_build(&builder),
        Commands::Stats => cmd_stats(&builder),
        Commands::Concepts { min_weight } => cmd_concepts(&builder, min_weight),
        Commands::Chapter { id } => cmd_chapter(&builder, &id),
        Commands::Pending { book } => cmd_pending(&builder, book.as_deref()),
        Commands::Config => cmd_config(&builder),
        Commands::Serve => readbrain_mcp::run_server(&builder),
    }
}

fn fresh_snapshot(builder: &FsGraphBuilder) -> Result<GraphSnapshot> {
    builder.snapshot().with_context(|| {
        format!(
            "failed to read notes from {}",
            builder.source().root().display()
        )
    })
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_build(builder: &FsGraphBuilder) -> Result<()> {
    let start = Instant::now();
    let snapshot = builder.build().context("graph build failed")?;
    let stats = &snapshot.stats;

    println!(
        "Books: {} | Chapters: {} | Concepts: {} | Enriched: {}",
        stats.total_books, stats.total_chapters, stats.total_concepts, stats.enriched_chapters
    );
    println!("Output:  {}", builder.store().path().display());
    println!("Digest:  {}", content_digest(&snapshot)?);
    println!("Elapsed: {}ms", start.elapsed().as_millis());
    Ok(())
}

fn cmd_stats(builder: &FsGraphBuilder) -> Result<()> {
    let snapshot = fresh_snapshot(builder)?;
    let stats = &snapshot.stats;
    println!("Books:     {}", stats.total_books);
    println!("Chapters:  {}", stats.total_chapters);
    println!("Concepts:  {}", stats.total_concepts);
    println!("Enriched:  {}", stats.enriched_chapters);
    println!("Shared:    {}", snapshot.concept_graph.nodes.len());
    println!("Links:     {}", snapshot.concept_graph.edges.len());
    Ok(())
}

fn cmd_concepts(builder: &FsGraphBuilder, min_weight: usize) -> Result<()> {
    let snapshot = fresh_snapshot(builder)?;
    let nodes = ranked_concepts(&snapshot.concept_graph.nodes, min_weight);
    if nodes.is_empty() {
        println!("No shared concepts yet.");
        return Ok(());
    }

    println!("{:<30} {:>6}  Label", "Concept", "Weight");
    println!("{}", "-".repeat(60));
    for node in nodes {
        println!("{:<30} {:>6}  {}", node.id, node.weight, node.label);
    }
    Ok(())
}

/// Heaviest concepts first; ties broken by tag so the listing is stable.
fn ranked_concepts(nodes: &[ConceptNode], min_weight: usize) -> Vec<&ConceptNode> {
    let mut ranked: Vec<&ConceptNode> = nodes
        .iter()
        .filter(|n| n.weight >= min_weight)
        .collect();
    ranked.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.id.cmp(&b.id)));
    ranked
}

fn cmd_chapter(builder: &FsGraphBuilder, id: &str) -> Result<()> {
    let snapshot = fresh_snapshot(builder)?;
    let Some(chapter) = snapshot.chapter(id) else {
        bail!("chapter not found: {id}");
    };
    let book_title = snapshot
        .book(&chapter.book_id)
        .map(|b| b.title.as_str())
        .unwrap_or(&chapter.book_id);

    println!("Chapter: {} ({})", chapter.title, chapter.id);
    println!("  book:      {book_title}");
    println!("  number:    {}", chapter.chapter);
    if !chapter.date_noted.is_empty() {
        println!("  noted:     {}", chapter.date_noted);
    }
    if let Some(rating) = chapter.rating {
        println!("  rating:    {rating}");
    }
    println!("  enriched:  {}", chapter.is_enriched);
    if !chapter.concepts.is_empty() {
        println!("  concepts:  {}", chapter.concepts.join(", "));
    }
    if let Some(ref summary) = chapter.summary {
        println!("  summary:   {summary}");
    }
    for insight in &chapter.key_insights {
        println!("  insight:   {insight}");
    }
    for item in &chapter.actionable_items {
        println!("  try:       {item}");
    }

    let links: Vec<_> = snapshot.concept_graph.edges_for_chapter(id).collect();
    if !links.is_empty() {
        println!("\n  Connections:");
        for edge in links {
            let other = edge.opposite(id).unwrap_or("?");
            let title = snapshot.chapter(other).map(|c| c.title.as_str()).unwrap_or("");
            println!("    {other:<30} {title}  [{}]", edge.concept);
        }
    }
    Ok(())
}

fn cmd_pending(builder: &FsGraphBuilder, book: Option<&str>) -> Result<()> {
    let snapshot = fresh_snapshot(builder)?;
    if let Some(b) = book {
        if snapshot.book(b).is_none() {
            bail!("book not found: {b}");
        }
    }

    let pending: Vec<_> = snapshot
        .pending_chapters()
        .filter(|c| book.map_or(true, |b| c.book_id == b))
        .collect();
    if pending.is_empty() {
        println!("All chapters are enriched.");
        return Ok(());
    }

    println!("{:<30} Title", "Chapter");
    println!("{}", "-".repeat(60));
    for chapter in &pending {
        println!("{:<30} {}", chapter.id, chapter.title);
    }
    println!("\n{} chapter(s) waiting for enrichment.", pending.len());
    Ok(())
}

fn cmd_config(builder: &FsGraphBuilder) -> Result<()> {
    println!("Config: {}", config::show_config_path());
    println!();
    println!("[library]");
    println!("  books_dir = {}", builder.source().root().display());
    println!("  output = {}", builder.store().path().display());
    Ok(())
}
