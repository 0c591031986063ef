//! MCP server exposing the recipe search operations as tools.

use crate::app::AppContext;
use crate::tools::embeddings::{GenerateEmbeddingRequest, handle_generate_embedding, handle_health};
use crate::tools::ingredients::handle_ingredient_search;
use crate::tools::search::{handle_hybrid_search, handle_search_recipes, handle_smart_search};
use crate::tools::suggestions::{handle_ingredient_suggestions, handle_search_suggestions};
use crate::types::{IngredientSearchRequest, PantryRequest, SearchRequest, SuggestionRequest};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// MCP server for recipe search.
#[derive(Clone)]
pub struct RecipeServer {
    app: Arc<AppContext>,

    /// Cancelled on shutdown; every tool call runs under a child token.
    shutdown: CancellationToken,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for RecipeServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeServer")
            .field("app", &self.app)
            .finish_non_exhaustive()
    }
}

#[tool_router]
impl RecipeServer {
    pub fn new(app: Arc<AppContext>, shutdown: CancellationToken) -> Self {
        Self {
            app,
            shutdown,
            tool_router: Self::tool_router(),
        }
    }

    fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    #[tool(
        description = "Semantic recipe search using vector similarity. Results below the similarity threshold are excluded; the rest are ranked by 70% similarity and 30% rating.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn search_recipes(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_search_recipes(&self.app.service, request, &self.request_token()).await
    }

    #[tool(
        description = "Natural-language recipe search. Extracts time limits, difficulty, dietary needs, cuisine and meal type from the query (e.g. 'quick vegan thai dinner under 30 minutes'), expands it with culinary synonyms and fuses the results. Explicit filters override inferred ones.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn smart_search(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_smart_search(&self.app.service, request, &self.request_token()).await
    }

    #[tool(
        description = "Hybrid recipe search combining vector similarity (60%) with keyword relevance (40%). Best for queries naming specific dishes or ingredients.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn hybrid_search(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_hybrid_search(&self.app.service, request, &self.request_token()).await
    }

    #[tool(
        description = "Find recipes by ingredients. Scores main ingredient, ingredient list, title and description matches. match_mode 'any' returns recipes using any ingredient, 'all' requires every one.",
        input_schema = inline_schema_for_type::<IngredientSearchRequest>()
    )]
    async fn ingredient_search(
        &self,
        Parameters(request): Parameters<IngredientSearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_ingredient_search(&self.app.service, request, &self.request_token()).await
    }

    #[tool(
        description = "Autocomplete suggestions for a partially typed recipe search, matched against titles, main ingredients, cuisines and descriptions. Returns an empty list if the catalog is unavailable.",
        input_schema = inline_schema_for_type::<SuggestionRequest>()
    )]
    async fn search_suggestions(
        &self,
        Parameters(request): Parameters<SuggestionRequest>,
    ) -> std::result::Result<String, String> {
        handle_search_suggestions(&self.app.service, request, &self.request_token()).await
    }

    #[tool(
        description = "Autocomplete for ingredient names (e.g. 'chick' -> chicken, chickpeas) from a built-in pantry list, with categories.",
        input_schema = inline_schema_for_type::<PantryRequest>()
    )]
    async fn ingredient_suggestions(
        &self,
        Parameters(request): Parameters<PantryRequest>,
    ) -> std::result::Result<String, String> {
        handle_ingredient_suggestions(&self.app.service, request)
    }

    #[tool(
        description = "Generate and store the embedding for one approved recipe so it becomes searchable.",
        input_schema = inline_schema_for_type::<GenerateEmbeddingRequest>()
    )]
    async fn generate_embedding(
        &self,
        Parameters(request): Parameters<GenerateEmbeddingRequest>,
    ) -> std::result::Result<String, String> {
        handle_generate_embedding(&self.app.pipeline, request, &self.request_token()).await
    }

    #[tool(description = "Report catalog size, embedding coverage and search settings.")]
    async fn health(&self) -> std::result::Result<String, String> {
        handle_health(
            &self.app.catalog,
            self.app.service.embedder().dimension(),
            self.app.service.similarity_threshold(),
        )
        .await
    }
}

#[tool_handler]
impl ServerHandler for RecipeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "recipe-search: semantic, natural-language, hybrid and ingredient-based recipe search. \
                 Use smart_search for free-form requests, ingredient_search for 'what can I cook with', \
                 and the suggestion tools for autocomplete.",
            )
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Unlike rmcp's default `schema_for_type()`, this function sets `inline_subschemas = true`
/// to generate inline enum definitions instead of $ref patterns, so clients show
/// `match_mode` and the filter enums as dropdowns.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();

    let json_object = match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(object)) => object,
        Ok(_) | Err(_) => JsonObject::new(),
    };

    Arc::new(json_object)
}
