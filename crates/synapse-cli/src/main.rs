//! Synapse CLI - biomedical knowledge graph toolkit

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use synapse_core::config::Config;
use synapse_core::domain::graph::{
    CooccurrenceExtractor, EntityType, FilterOptions, GraphBuilder, GraphData, GraphStore,
    RecordBatch, SentenceMentions,
};
use synapse_core::domain::hypothesis::HypothesisEngine;
use synapse_core::domain::query::QueryEngine;
use tracing::debug;

#[derive(Parser)]
#[command(name = "synapse")]
#[command(author, version, about = "Biomedical knowledge graph toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a graph from a record batch
    Build {
        /// Record batch or graph JSON file
        input: PathBuf,
        /// Write the graph JSON here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge new records into an existing graph
    Merge {
        /// Base records or graph
        base: PathBuf,
        /// Incoming records or graph
        incoming: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Filter a graph by degree, type and rank
    Filter {
        input: PathBuf,
        /// Minimum node degree
        #[arg(long, default_value_t = 1)]
        min_degree: usize,
        /// Allowed entity types (repeatable, all when omitted)
        #[arg(short = 't', long = "type")]
        types: Vec<String>,
        /// Keep only the N highest-degree nodes (0 keeps all)
        #[arg(long, default_value_t = 0)]
        top_n: usize,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Density, centrality and communities
    Analytics { input: PathBuf },

    /// Generate hypotheses from graph structure
    Hypotheses {
        input: PathBuf,
        /// Restrict triadic closures to this entity
        #[arg(short, long)]
        focus: Option<String>,
        /// Maximum number of hypotheses
        #[arg(short, long, default_value_t = 10)]
        max: usize,
    },

    /// Breadth-first neighborhood of an entity
    Neighbors {
        input: PathBuf,
        entity: String,
        #[arg(short, long, default_value_t = 1)]
        depth: usize,
    },

    /// Weighted shortest path between two entities
    Path {
        input: PathBuf,
        source: String,
        target: String,
    },

    /// Entities connected to all of the given entities
    Common {
        input: PathBuf,
        #[arg(required = true, num_args = 2..)]
        entities: Vec<String>,
        #[arg(long, default_value_t = 1)]
        min_degree: usize,
    },

    /// Induced subgraph around one or more entities
    Subgraph {
        input: PathBuf,
        #[arg(required = true)]
        centers: Vec<String>,
        #[arg(short, long, default_value_t = 1)]
        depth: usize,
    },

    /// Resolve free text to an entity
    Resolve { input: PathBuf, query: String },

    /// Turn sentence-level mentions into a record batch
    Extract {
        /// JSON array of {sentence, entities} objects
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show all configuration values
    #[command(alias = "list")]
    Show,
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// Reset configuration to defaults
    Reset,
    /// Show config file path
    Path,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("synapse_core={level}").parse()?),
        )
        .init();

    match cli.command {
        Commands::Config { action } => cmd_config(action, cli.quiet),
        command => run(command, Session::load(cli.format, cli.quiet)?),
    }
}

fn run(command: Commands, session: Session) -> anyhow::Result<()> {
    let ctx = &session;
    match command {
        Commands::Build { input, output } => cmd_build(ctx, &input, output.as_deref()),
        Commands::Merge {
            base,
            incoming,
            output,
        } => cmd_merge(ctx, &base, &incoming, output.as_deref()),
        Commands::Filter {
            input,
            min_degree,
            types,
            top_n,
            output,
        } => cmd_filter(ctx, &input, min_degree, &types, top_n, output.as_deref()),
        Commands::Analytics { input } => cmd_analytics(ctx, &input),
        Commands::Hypotheses { input, focus, max } => {
            cmd_hypotheses(ctx, &input, focus.as_deref(), max)
        }
        Commands::Neighbors {
            input,
            entity,
            depth,
        } => cmd_neighbors(ctx, &input, &entity, depth),
        Commands::Path {
            input,
            source,
            target,
        } => cmd_path(ctx, &input, &source, &target),
        Commands::Common {
            input,
            entities,
            min_degree,
        } => cmd_common(ctx, &input, &entities, min_degree),
        Commands::Subgraph {
            input,
            centers,
            depth,
        } => cmd_subgraph(ctx, &input, &centers, depth),
        Commands::Resolve { input, query } => cmd_resolve(ctx, &input, &query),
        Commands::Extract { input, output } => cmd_extract(ctx, &input, output.as_deref()),
        Commands::Config { action } => cmd_config(action, ctx.quiet),
    }
}

/// Settings shared by every graph command
struct Session {
    config: Config,
    format: OutputFormat,
    quiet: bool,
}

impl Session {
    fn load(format: OutputFormat, quiet: bool) -> anyhow::Result<Self> {
        Ok(Self {
            config: Config::load()?,
            format,
            quiet,
        })
    }

    fn builder(&self) -> GraphBuilder {
        GraphBuilder::from_config(&self.config)
    }

    fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Load a file and build the graph it describes
    fn graph(&self, path: &Path) -> anyhow::Result<GraphStore> {
        Ok(self.builder().build_batch(&load_batch(path)?))
    }
}

// ============================================================================
// Input / Output
// ============================================================================

/// Read a record batch, accepting either batch JSON or graph JSON
fn load_batch(path: &Path) -> anyhow::Result<RecordBatch> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse JSON: {}", path.display()))?;

    let batch = if value.get("nodes").is_some() {
        debug!(path = %path.display(), "Reading graph JSON");
        let data: GraphData = serde_json::from_value(value)
            .with_context(|| format!("Invalid graph JSON: {}", path.display()))?;
        data.into_records()
    } else {
        serde_json::from_value::<RecordBatch>(value)
            .with_context(|| format!("Invalid record batch: {}", path.display()))?
    };
    batch
        .validate()
        .with_context(|| format!("Invalid record in {}", path.display()))?;
    Ok(batch)
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Emit a graph to a file, stdout JSON, or a text summary
fn emit_graph(ctx: &Session, data: &GraphData, output: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = output {
        write_json(data, path)?;
        if !ctx.quiet && !ctx.json() {
            println!("Wrote {}", path.display());
        }
    }
    if ctx.json() {
        return print_json(data);
    }
    if !ctx.quiet {
        println!(
            "Graph: {} nodes, {} edges, density {:.4}",
            data.metadata.total_nodes, data.metadata.total_edges, data.metadata.density
        );
    }
    Ok(())
}

// ============================================================================
// Command Implementations
// ============================================================================

fn cmd_build(ctx: &Session, input: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let graph = ctx.graph(input)?;
    emit_graph(ctx, &GraphData::from_graph(&graph), output)
}

fn cmd_merge(
    ctx: &Session,
    base: &Path,
    incoming: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let base = load_batch(base)?;
    let incoming = load_batch(incoming)?;
    let graph = ctx.builder().merge_batches(&base, &incoming);
    emit_graph(ctx, &GraphData::from_graph(&graph), output)
}

fn cmd_filter(
    ctx: &Session,
    input: &Path,
    min_degree: usize,
    types: &[String],
    top_n: usize,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let types = types
        .iter()
        .map(|t| EntityType::parse_strict(t))
        .collect::<synapse_core::Result<Vec<_>>>()?;
    let options = FilterOptions::new(min_degree)
        .with_types(types)
        .with_top_n(top_n);

    let graph = ctx.graph(input)?;
    let filtered = ctx.builder().filter(&graph, &options);
    emit_graph(ctx, &GraphData::from_graph(&filtered).filtered(), output)
}

fn cmd_analytics(ctx: &Session, input: &Path) -> anyhow::Result<()> {
    let graph = ctx.graph(input)?;
    let analytics = ctx.builder().compute_analytics(&graph);
    if ctx.json() {
        return print_json(&analytics);
    }

    println!("Nodes:       {}", analytics.total_nodes);
    println!("Edges:       {}", analytics.total_edges);
    println!("Density:     {:.4}", analytics.density);
    println!("Avg degree:  {:.2}", analytics.avg_degree);
    println!("Communities: {}", analytics.communities.len());
    if !ctx.quiet {
        if !analytics.entity_type_counts.is_empty() {
            println!("\nEntity types:");
            for (entity_type, count) in &analytics.entity_type_counts {
                println!("  {:<22} {}", entity_type, count);
            }
        }
        if !analytics.centrality_scores.is_empty() {
            println!("\nMost central:");
            for (id, score) in &analytics.centrality_scores {
                println!("  {:<30} {:.4}", id, score);
            }
        }
    }
    Ok(())
}

fn cmd_hypotheses(
    ctx: &Session,
    input: &Path,
    focus: Option<&str>,
    max: usize,
) -> anyhow::Result<()> {
    let graph = ctx.graph(input)?;
    let hypotheses =
        HypothesisEngine::from_config(&ctx.config.hypothesis).generate(&graph, focus, max);
    if ctx.json() {
        return print_json(&hypotheses);
    }

    if hypotheses.is_empty() {
        if !ctx.quiet {
            println!("No hypotheses found.");
        }
        return Ok(());
    }
    for hypothesis in &hypotheses {
        println!(
            "{:.2} [{}] {}",
            hypothesis.confidence, hypothesis.kind, hypothesis.title
        );
        if !ctx.quiet {
            println!("     {}", hypothesis.explanation);
        }
    }
    Ok(())
}

fn cmd_neighbors(ctx: &Session, input: &Path, entity: &str, depth: usize) -> anyhow::Result<()> {
    let graph = ctx.graph(input)?;
    let result = QueryEngine::from_config(&graph, &ctx.config.query).neighbors(entity, depth);
    if ctx.json() {
        return print_json(&result);
    }

    if result.layers.is_empty() {
        println!("Entity '{}' not found.", entity);
        return Ok(());
    }
    for (hop, layer) in result.layers.iter().enumerate() {
        println!("Hop {}:", hop + 1);
        for edge in layer {
            println!(
                "  {} -- {} (w={}, {})",
                edge.source, edge.target, edge.weight, edge.relationship_type
            );
        }
    }
    Ok(())
}

fn cmd_path(ctx: &Session, input: &Path, source: &str, target: &str) -> anyhow::Result<()> {
    let graph = ctx.graph(input)?;
    let result = QueryEngine::from_config(&graph, &ctx.config.query).shortest_path(source, target);
    if ctx.json() {
        return print_json(&result);
    }

    match result.paths.first() {
        Some(path) => {
            println!("{}", path.nodes.join(" -> "));
            if !ctx.quiet {
                println!("Total weight: {}", path.total_weight);
            }
        }
        None => println!("No path between '{}' and '{}'.", source, target),
    }
    Ok(())
}

fn cmd_common(
    ctx: &Session,
    input: &Path,
    entities: &[String],
    min_degree: usize,
) -> anyhow::Result<()> {
    let graph = ctx.graph(input)?;
    let result =
        QueryEngine::from_config(&graph, &ctx.config.query).common_connections(entities, min_degree);
    if ctx.json() {
        return print_json(&result);
    }

    if result.common.is_empty() && !ctx.quiet {
        println!("No common connections.");
    }
    for connection in &result.common {
        println!("{} (degree {})", connection.entity, connection.degree);
    }
    Ok(())
}

fn cmd_subgraph(ctx: &Session, input: &Path, centers: &[String], depth: usize) -> anyhow::Result<()> {
    let graph = ctx.graph(input)?;
    let result = QueryEngine::from_config(&graph, &ctx.config.query).subgraph(centers, depth);
    if ctx.json() {
        return print_json(&result);
    }

    println!("Nodes ({}): {}", result.nodes.len(), result.nodes.join(", "));
    if !ctx.quiet {
        for [a, b] in &result.edges {
            println!("  {} -- {}", a, b);
        }
    }
    Ok(())
}

fn cmd_resolve(ctx: &Session, input: &Path, query: &str) -> anyhow::Result<()> {
    let graph = ctx.graph(input)?;
    let found = QueryEngine::from_config(&graph, &ctx.config.query).resolve_entity_name(query);
    if ctx.json() {
        return print_json(&found);
    }

    match found {
        Some(found) => println!(
            "{} ({}, {:?}, score {:.2})",
            found.id, found.display_name, found.strategy, found.score
        ),
        None => println!("No entity matches '{}'.", query),
    }
    Ok(())
}

fn cmd_extract(ctx: &Session, input: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let contents = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    let sentences: Vec<SentenceMentions> = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid sentence mentions: {}", input.display()))?;

    let extractor = CooccurrenceExtractor::new(&ctx.config.extraction)?;
    let batch = extractor.extract(&sentences);

    if let Some(path) = output {
        write_json(&batch, path)?;
    }
    if ctx.json() {
        return print_json(&batch);
    }
    if !ctx.quiet {
        println!(
            "Extracted {} entities and {} relationships from {} sentences",
            batch.entities.len(),
            batch.relationships.len(),
            sentences.len()
        );
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path()?.display());
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
