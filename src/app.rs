//! Process-wide wiring: settings, the recipe catalog, embedders and the service built on them.

use crate::backend::{CachedEmbedder, Embedder, HashingEmbedder, InMemoryCatalog};
use crate::config::Settings;
use crate::embedding::{BackfillReport, EmbeddingPipeline};
use crate::error::Result;
use crate::search::expansion::{QueryExpander, WordListThesaurus};
use crate::service::{Collaborators, SearchService};
use crate::types::Recipe;
use anyhow::Context;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct AppContext {
    pub settings: Settings,
    pub catalog: Arc<InMemoryCatalog>,
    pub service: SearchService,
    pub pipeline: EmbeddingPipeline,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("settings", &self.settings)
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Load the catalog and thesaurus named in `settings` and wire the service.
    ///
    /// A missing catalog path gives an empty catalog. A thesaurus that fails to load
    /// is logged and expansion runs on the curated table alone.
    pub async fn from_settings(settings: Settings) -> Result<Self> {
        let catalog = match &settings.catalog_path {
            Some(path) => InMemoryCatalog::load_json(path)
                .await
                .with_context(|| format!("Failed to load recipe catalog {}", path.display()))?,
            None => {
                tracing::warn!("No recipe catalog configured, serving an empty catalog");
                InMemoryCatalog::from_recipes(Vec::<Recipe>::new())
            }
        };
        let catalog = Arc::new(catalog);

        let expander = match &settings.thesaurus_path {
            Some(path) => match WordListThesaurus::load(path).await {
                Ok(thesaurus) => QueryExpander::with_thesaurus(Arc::new(thesaurus)),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Thesaurus unavailable, using curated synonyms only"
                    );
                    QueryExpander::curated()
                }
            },
            None => QueryExpander::curated(),
        };

        let embedder: Arc<dyn Embedder> =
            Arc::new(HashingEmbedder::new(settings.embedding_dimension));
        let query_embedder: Arc<dyn Embedder> = Arc::new(CachedEmbedder::new(
            embedder.clone(),
            settings.embedding_cache_size,
        ));

        let service = SearchService::new(Collaborators::from_catalog(
            catalog.clone(),
            query_embedder,
        ))
        .with_expander(expander)
        .with_similarity_threshold(settings.similarity_threshold);
        let pipeline = EmbeddingPipeline::new(catalog.clone(), embedder, catalog.clone())
            .with_batch_size(settings.backfill_batch_size);

        Ok(Self {
            settings,
            catalog,
            service,
            pipeline,
        })
    }

    /// Embed every approved recipe that has no vector yet.
    ///
    /// The in-memory catalog keeps vectors only for the life of the process, so this
    /// runs once after loading.
    pub async fn warm_up(&self, cancel: &CancellationToken) -> Result<BackfillReport> {
        self.pipeline
            .backfill(cancel)
            .await
            .context("Failed to embed recipe catalog")
    }
}
