use crate::error::SearchError;
use crate::search::FilterSet;
use crate::types::MatchMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "recipe-search", version)]
#[command(about = "Natural-language and ingredient-based recipe search", long_about = None)]
pub struct Cli {
    /// Config file (defaults to $RECIPE_SEARCH_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON recipe catalog; overrides the config file
    #[arg(long, global = true, env = "RECIPE_SEARCH_CATALOG")]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the MCP server over stdio
    Serve,
    /// Semantic search
    Search {
        query: String,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Filters as JSON, e.g. '{"cuisineType":"Thai","maxPrepTime":30}'
        #[arg(short, long)]
        filters: Option<String>,
    },
    /// Natural-language search with filter extraction and query expansion
    Smart {
        query: String,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        #[arg(short, long)]
        filters: Option<String>,
    },
    /// Semantic plus keyword search
    Hybrid {
        query: String,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        #[arg(short, long)]
        filters: Option<String>,
    },
    /// Find recipes by ingredients
    Ingredients {
        #[arg(required = true)]
        ingredients: Vec<String>,
        /// "any" or "all"
        #[arg(short, long, default_value = "any")]
        mode: MatchMode,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        #[arg(short, long)]
        filters: Option<String>,
    },
    /// Autocomplete a recipe search prefix
    Suggest {
        prefix: String,
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
    /// Autocomplete an ingredient name
    Pantry {
        query: String,
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
    /// Embed one recipe, or every recipe still missing a vector
    Embed { recipe_id: Option<String> },
}

/// Parse a `--filters` JSON argument.
pub fn parse_filters(raw: Option<&str>) -> Result<Option<FilterSet>, SearchError> {
    raw.map(|json| {
        serde_json::from_str(json).map_err(|e| SearchError::invalid("filters", e.to_string()))
    })
    .transpose()
}
