//! Shared test fixtures for integration tests.
//!
//! # Available Fixtures
//!
//! - `scripted`: a [`ScriptedBackend`] that plays every collaborator role from canned
//!   answers and records what it was asked
//! - `sample_recipes`: a small catalog covering the cuisines, meal types and
//!   ingredient shapes the tests rely on
//!
//! # Scripted collaborators
//!
//! The scripted embedder gives each distinct text its own one-element vector, so the
//! similarity double can tell which query variant a search came from and answer with
//! the hits scripted for that text.

#![allow(dead_code)] // Helpers used across different integration test crates

use async_trait::async_trait;
use recipe_search::backend::{
    Embedder, LexicalHit, LexicalQuery, LexicalSearch, RecipeSource, SimilarityHit,
    SimilarityQuery, SimilaritySearch,
};
use recipe_search::search::FilterSet;
use recipe_search::types::{DietaryFlags, Difficulty, IngredientLine, MealType, RecipeStatus};
use recipe_search::{BackendError, Collaborators, Recipe, RecipeId, SearchService};
use rstest::fixture;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Which collaborator a scripted failure should hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Embedder,
    Similarity,
    Lexical,
    Recipes,
}

#[derive(Default)]
pub struct ScriptedBackend {
    recipes: Vec<Recipe>,
    texts: Mutex<Vec<String>>,
    similarity_script: Mutex<HashMap<String, Vec<(String, f32)>>>,
    lexical_script: Mutex<HashMap<String, Vec<(String, f32)>>>,
    similarity_queries: Mutex<Vec<(String, SimilarityQuery)>>,
    lexical_queries: Mutex<Vec<LexicalQuery>>,
    fail_embedder: AtomicBool,
    fail_similarity: AtomicBool,
    fail_lexical: AtomicBool,
    fail_recipes: AtomicBool,
    stall: Mutex<Option<Duration>>,
}

impl ScriptedBackend {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self {
            recipes,
            ..Self::default()
        }
    }

    /// Similarity hits returned for `text`, as `(recipe id, similarity)` pairs.
    pub fn script_similarity(&self, text: &str, hits: &[(&str, f32)]) {
        self.similarity_script.lock().unwrap().insert(
            text.to_string(),
            hits.iter().map(|(id, s)| ((*id).to_string(), *s)).collect(),
        );
    }

    /// Lexical hits returned for `text`, as `(recipe id, rank)` pairs.
    pub fn script_lexical(&self, text: &str, hits: &[(&str, f32)]) {
        self.lexical_script.lock().unwrap().insert(
            text.to_string(),
            hits.iter().map(|(id, r)| ((*id).to_string(), *r)).collect(),
        );
    }

    pub fn fail(&self, role: Role) {
        let flag = match role {
            Role::Embedder => &self.fail_embedder,
            Role::Similarity => &self.fail_similarity,
            Role::Lexical => &self.fail_lexical,
            Role::Recipes => &self.fail_recipes,
        };
        flag.store(true, Ordering::SeqCst);
    }

    /// Make every similarity search wait this long before answering.
    pub fn stall_similarity(&self, duration: Duration) {
        *self.stall.lock().unwrap() = Some(duration);
    }

    /// Similarity queries seen so far, with the text each vector was embedded from.
    pub fn similarity_queries(&self) -> Vec<(String, SimilarityQuery)> {
        self.similarity_queries.lock().unwrap().clone()
    }

    pub fn lexical_queries(&self) -> Vec<LexicalQuery> {
        self.lexical_queries.lock().unwrap().clone()
    }

    fn recipe(&self, id: &str) -> Recipe {
        self.recipes
            .iter()
            .find(|recipe| recipe.id.as_str() == id)
            .cloned()
            .unwrap_or_else(|| Recipe::new(id, id, "unknown"))
    }

    fn text_for(&self, vector: &[f32]) -> String {
        let index = vector.first().copied().unwrap_or(-1.0);
        self.texts
            .lock()
            .unwrap()
            .get(index as usize)
            .cloned()
            .unwrap_or_default()
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<(), BackendError> {
        if flag.load(Ordering::SeqCst) {
            Err(BackendError::Unavailable(format!("{} is down", what)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Embedder for ScriptedBackend {
    fn dimension(&self) -> usize {
        1
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        Self::check(&self.fail_embedder, "embedder")?;
        let mut texts = self.texts.lock().unwrap();
        let index = match texts.iter().position(|known| known == text) {
            Some(index) => index,
            None => {
                texts.push(text.to_string());
                texts.len() - 1
            }
        };
        Ok(vec![index as f32])
    }
}

#[async_trait]
impl SimilaritySearch for ScriptedBackend {
    async fn search(&self, query: SimilarityQuery) -> Result<Vec<SimilarityHit>, BackendError> {
        let text = self.text_for(&query.vector);
        self.similarity_queries
            .lock()
            .unwrap()
            .push((text.clone(), query.clone()));

        let stall = *self.stall.lock().unwrap();
        if let Some(duration) = stall {
            tokio::time::sleep(duration).await;
        }
        Self::check(&self.fail_similarity, "similarity search")?;

        let scripted = self
            .similarity_script
            .lock()
            .unwrap()
            .get(&text)
            .cloned()
            .unwrap_or_default();
        Ok(scripted
            .into_iter()
            .filter(|(_, similarity)| *similarity >= query.min_score)
            .take(query.limit)
            .map(|(id, similarity)| SimilarityHit {
                recipe: self.recipe(&id),
                similarity,
            })
            .collect())
    }
}

#[async_trait]
impl LexicalSearch for ScriptedBackend {
    async fn search(&self, query: LexicalQuery) -> Result<Vec<LexicalHit>, BackendError> {
        self.lexical_queries.lock().unwrap().push(query.clone());
        Self::check(&self.fail_lexical, "lexical search")?;

        let scripted = self
            .lexical_script
            .lock()
            .unwrap()
            .get(&query.text)
            .cloned()
            .unwrap_or_default();
        Ok(scripted
            .into_iter()
            .take(query.limit)
            .map(|(id, rank)| LexicalHit {
                recipe: self.recipe(&id),
                rank,
            })
            .collect())
    }
}

#[async_trait]
impl RecipeSource for ScriptedBackend {
    async fn fetch_one(&self, id: &RecipeId) -> Result<Option<Recipe>, BackendError> {
        Self::check(&self.fail_recipes, "recipe source")?;
        Ok(self
            .recipes
            .iter()
            .find(|recipe| &recipe.id == id && recipe.is_approved())
            .cloned())
    }

    async fn fetch_approved(&self, filters: &FilterSet) -> Result<Vec<Recipe>, BackendError> {
        Self::check(&self.fail_recipes, "recipe source")?;
        Ok(self
            .recipes
            .iter()
            .filter(|recipe| recipe.is_approved() && filters.matches(recipe))
            .cloned()
            .collect())
    }

    async fn fetch_unembedded(&self) -> Result<Vec<Recipe>, BackendError> {
        self.fetch_approved(&FilterSet::default()).await
    }
}

/// A search service whose every collaborator is `backend`.
pub fn service_over(backend: &Arc<ScriptedBackend>) -> SearchService {
    SearchService::new(Collaborators {
        embedder: backend.clone(),
        similarity: backend.clone(),
        lexical: backend.clone(),
        recipes: backend.clone(),
    })
}

fn recipe(id: &str, title: &str, main: &str, ingredients: &[&str]) -> Recipe {
    let mut recipe = Recipe::new(id, title, main);
    recipe.ingredients = ingredients.iter().map(|name| IngredientLine::named(*name)).collect();
    recipe
}

#[fixture]
pub fn sample_recipes() -> Vec<Recipe> {
    let mut green_curry = recipe(
        "green-curry",
        "Thai Green Curry",
        "chicken",
        &["chicken thigh", "coconut milk", "green curry paste", "garlic"],
    );
    green_curry.description = Some("Fragrant coconut curry with basil".to_string());
    green_curry.cuisine_type = Some("Thai".to_string());
    green_curry.meal_type = vec![MealType::Dinner];
    green_curry.difficulty = Some(Difficulty::Medium);
    green_curry.prep_time = 15;
    green_curry.cooking_time = 25;
    green_curry.average_rating = Some(4.5);
    green_curry.total_ratings = 120;

    let mut garlic_chicken = recipe(
        "garlic-chicken",
        "Garlic Butter Chicken",
        "chicken breast",
        &["chicken breast", "garlic", "butter"],
    );
    garlic_chicken.description = Some("Pan-seared chicken in garlic butter".to_string());
    garlic_chicken.cuisine_type = Some("American".to_string());
    garlic_chicken.meal_type = vec![MealType::Dinner];
    garlic_chicken.difficulty = Some(Difficulty::Easy);
    garlic_chicken.prep_time = 5;
    garlic_chicken.cooking_time = 15;
    garlic_chicken.average_rating = Some(4.0);
    garlic_chicken.total_ratings = 30;

    let mut fried_rice = recipe(
        "egg-fried-rice",
        "Egg Fried Rice",
        "rice",
        &["rice", "egg", "spring onion", "soy sauce"],
    );
    fried_rice.description = Some("Quick wok-fried leftover rice".to_string());
    fried_rice.cuisine_type = Some("Chinese".to_string());
    fried_rice.meal_type = vec![MealType::Lunch, MealType::Dinner];
    fried_rice.difficulty = Some(Difficulty::Easy);
    fried_rice.prep_time = 5;
    fried_rice.cooking_time = 10;
    fried_rice.average_rating = Some(3.5);
    fried_rice.total_ratings = 12;

    let mut omelette = recipe("omelette", "Cheese Omelette", "egg", &["egg", "cheese", "butter"]);
    omelette.description = Some("Fluffy French-style omelette".to_string());
    omelette.cuisine_type = Some("French".to_string());
    omelette.meal_type = vec![MealType::Breakfast];
    omelette.difficulty = Some(Difficulty::Easy);
    omelette.prep_time = 2;
    omelette.cooking_time = 5;
    omelette.dietary_info = DietaryFlags {
        is_vegetarian: true,
        ..DietaryFlags::default()
    };

    let mut margherita = recipe(
        "margherita",
        "Pizza Margherita",
        "flour",
        &["flour", "tomato", "mozzarella", "basil"],
    );
    margherita.description = Some("Classic Neapolitan pizza".to_string());
    margherita.cuisine_type = Some("Italian".to_string());
    margherita.meal_type = vec![MealType::Dinner];
    margherita.difficulty = Some(Difficulty::Hard);
    margherita.prep_time = 90;
    margherita.cooking_time = 10;
    margherita.average_rating = Some(5.0);
    margherita.total_ratings = 200;
    margherita.dietary_info = DietaryFlags {
        is_vegetarian: true,
        ..DietaryFlags::default()
    };

    let mut draft = recipe("draft", "Thai Basil Chicken", "chicken", &["chicken", "basil"]);
    draft.cuisine_type = Some("Thai".to_string());
    draft.status = RecipeStatus::Pending;

    vec![green_curry, garlic_chicken, fried_rice, omelette, margherita, draft]
}

#[fixture]
pub fn scripted(sample_recipes: Vec<Recipe>) -> Arc<ScriptedBackend> {
    Arc::new(ScriptedBackend::new(sample_recipes))
}
