use anyhow::{Context, anyhow};
use clap::Parser;
use recipe_search::app::AppContext;
use recipe_search::cli::{Cli, Commands, parse_filters};
use recipe_search::config::Settings;
use recipe_search::server::RecipeServer;
use recipe_search::tools::embeddings::{GenerateEmbeddingRequest, handle_generate_embedding};
use recipe_search::tools::ingredients::handle_ingredient_search;
use recipe_search::tools::search::{
    handle_hybrid_search, handle_search_recipes, handle_smart_search,
};
use recipe_search::tools::suggestions::{handle_ingredient_suggestions, handle_search_suggestions};
use recipe_search::types::{
    IngredientSearchRequest, PantryRequest, SearchRequest, SuggestionRequest,
};
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(catalog) = cli.catalog.clone() {
        settings.catalog_path = Some(catalog);
    }
    recipe_search::tracing::init(settings.log_format);

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupted, cancelling in-flight requests");
                shutdown.cancel();
            }
        }
    });

    let app = AppContext::from_settings(settings).await?;
    if !matches!(cli.command, Commands::Embed { .. }) {
        let report = app.warm_up(&shutdown).await?;
        tracing::info!(embedded = report.embedded, recipes = app.catalog.len(), "Catalog ready");
    }

    let output = run(cli.command, Arc::new(app), shutdown).await?;
    if let Some(output) = output {
        println!("{}", output);
    }
    Ok(())
}

/// Run one subcommand. Returns the JSON to print, if any.
async fn run(
    command: Commands,
    app: Arc<AppContext>,
    shutdown: CancellationToken,
) -> anyhow::Result<Option<String>> {
    let default_limit = app.settings.default_limit;
    let search_request = |query: String, limit: Option<usize>, filters: Option<String>| {
        let mut request = SearchRequest::new(query).with_limit(limit.unwrap_or(default_limit));
        if let Some(filters) = parse_filters(filters.as_deref())? {
            request = request.with_filters(filters);
        }
        anyhow::Ok(request)
    };

    let result = match command {
        Commands::Serve => {
            tracing::info!("Starting recipe-search MCP server");
            let server = RecipeServer::new(app, shutdown.clone());
            let service = server.serve(stdio()).await.inspect_err(|e| {
                tracing::error!("Error serving MCP server: {:?}", e);
            })?;
            service.waiting().await?;
            return Ok(None);
        }
        Commands::Search {
            query,
            limit,
            filters,
        } => {
            let request = search_request(query, limit, filters)?;
            handle_search_recipes(&app.service, request, &shutdown).await
        }
        Commands::Smart {
            query,
            limit,
            filters,
        } => {
            let request = search_request(query, limit, filters)?;
            handle_smart_search(&app.service, request, &shutdown).await
        }
        Commands::Hybrid {
            query,
            limit,
            filters,
        } => {
            let request = search_request(query, limit, filters)?;
            handle_hybrid_search(&app.service, request, &shutdown).await
        }
        Commands::Ingredients {
            ingredients,
            mode,
            limit,
            filters,
        } => {
            let mut request = IngredientSearchRequest::new(ingredients)
                .with_mode(mode)
                .with_limit(limit.unwrap_or(default_limit));
            if let Some(filters) = parse_filters(filters.as_deref())? {
                request = request.with_filters(filters);
            }
            handle_ingredient_search(&app.service, request, &shutdown).await
        }
        Commands::Suggest { prefix, limit } => {
            let request = SuggestionRequest::new(prefix).with_limit(limit);
            handle_search_suggestions(&app.service, request, &shutdown).await
        }
        Commands::Pantry { query, limit } => {
            handle_ingredient_suggestions(&app.service, PantryRequest::new(query).with_limit(limit))
        }
        Commands::Embed {
            recipe_id: Some(recipe_id),
        } => {
            let request = GenerateEmbeddingRequest { recipe_id };
            handle_generate_embedding(&app.pipeline, request, &shutdown).await
        }
        Commands::Embed { recipe_id: None } => {
            let report = app.warm_up(&shutdown).await?;
            return serde_json::to_string_pretty(&report)
                .map(Some)
                .context("Failed to encode backfill report");
        }
    };

    result.map(Some).map_err(|message| anyhow!(message))
}
