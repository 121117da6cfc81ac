//! Persistent recipe collection
//!
//! The whole collection lives under one storage key as a JSON array in
//! insertion order. Every mutation serializes the full next state, writes it,
//! and only then replaces the in-memory copy, so a failed write leaves the
//! store exactly as it was.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::CatalogEntry;
use crate::recipe::{FilmSimulation, Recipe, RecipeDraft, RecipeId, RecipePatch};
use crate::schema::{Params, ValidationError};
use crate::storage::{KeyValueStore, StorageError};

/// Storage key holding the recipe list
pub const RECIPES_KEY: &str = "gr3_recipes";
/// Storage key holding the seeded flag
pub const SEEDED_KEY: &str = "templates_initialized";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid recipe: {0}")]
    Validation(#[from] ValidationError),
    #[error("Recipe not found: {0}")]
    NotFound(RecipeId),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Stored recipe {id} is invalid: {source}")]
    InvalidRecord {
        id: RecipeId,
        source: ValidationError,
    },
    #[error("Stored recipe id {0} appears more than once")]
    DuplicateId(RecipeId),
    #[error("Stored recipe {id} has fields this version cannot keep: {}", .fields.join(", "))]
    UnknownFields { id: RecipeId, fields: Vec<String> },
}

/// On-disk shape, tolerant of records written by older versions
/// (no `createdAt`, legacy parameter names, missing parameters, template
/// `description` text). Any other field is refused rather than dropped.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecipe {
    id: RecipeId,
    name: String,
    base_effect: FilmSimulation,
    #[serde(default)]
    params: Params,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    /// Template text from older versions, carried into `note`
    #[serde(default)]
    description: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl StoredRecipe {
    /// True if loading this record changes what is on disk
    fn needs_upgrade(&self) -> bool {
        self.created_at.is_none()
            || self.description.is_some()
            || self.params.has_legacy_names()
            || self.params.len() != crate::schema::SCHEMA.len()
    }

    fn into_recipe(self, loaded_at: DateTime<Utc>) -> Result<Recipe, StoreError> {
        if !self.extra.is_empty() {
            return Err(StoreError::UnknownFields {
                id: self.id,
                fields: self.extra.keys().cloned().collect(),
            });
        }
        let id = self.id.clone();
        let note = match (self.note, self.description) {
            (Some(note), Some(description)) if note != description => {
                Some(format!("{}\n\n{}", note, description))
            }
            (note, description) => note.or(description),
        };
        Recipe {
            id: self.id,
            name: self.name,
            base_effect: self.base_effect,
            params: self.params,
            note,
            tags: self.tags,
            created_at: self.created_at.unwrap_or(loaded_at),
        }
        .validated()
        .map_err(|source| StoreError::InvalidRecord { id, source })
    }
}

/// Ordered recipe collection over a [`KeyValueStore`]
#[derive(Debug)]
pub struct RecipeStore<S> {
    storage: S,
    recipes: Vec<Recipe>,
}

impl<S: KeyValueStore> RecipeStore<S> {
    /// Load the collection from `storage`. Records from older versions are
    /// upgraded (legacy names, defaults, creation time) and written back.
    pub fn open(storage: S) -> Result<Self, StoreError> {
        let stored: Vec<StoredRecipe> = match storage.read(RECIPES_KEY)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };

        let needs_upgrade = stored.iter().any(StoredRecipe::needs_upgrade);
        let now = Utc::now();
        let mut seen = HashSet::new();
        let mut recipes = Vec::with_capacity(stored.len());
        for record in stored {
            if !seen.insert(record.id.clone()) {
                return Err(StoreError::DuplicateId(record.id));
            }
            recipes.push(record.into_recipe(now)?);
        }

        let mut store = Self {
            storage,
            recipes: Vec::new(),
        };
        if needs_upgrade {
            info!(count = recipes.len(), "Upgrading stored recipes");
            store.commit(recipes)?;
        } else {
            store.recipes = recipes;
        }

        debug!(count = store.recipes.len(), "Opened recipe store");
        Ok(store)
    }

    /// All recipes in insertion order
    pub fn get_all(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn get(&self, id: &RecipeId) -> Option<&Recipe> {
        self.recipes.iter().find(|r| &r.id == id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Validate and append a new recipe with a fresh ID
    pub fn add(&mut self, draft: RecipeDraft) -> Result<Recipe, StoreError> {
        let mut id = RecipeId::generate();
        while self.get(&id).is_some() {
            id = RecipeId::generate();
        }
        let recipe = Recipe::from_draft(id, draft, Utc::now())?;

        let mut next = self.recipes.clone();
        next.push(recipe.clone());
        self.commit(next)?;

        info!(id = %recipe.id, name = %recipe.name, "Added recipe");
        Ok(recipe)
    }

    /// Merge `patch` into the recipe with `id`
    pub fn update(&mut self, id: &RecipeId, patch: &RecipePatch) -> Result<Recipe, StoreError> {
        let index = self
            .recipes
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let updated = self.recipes[index].patched(patch)?;

        let mut next = self.recipes.clone();
        next[index] = updated.clone();
        self.commit(next)?;

        info!(id = %id, "Updated recipe");
        Ok(updated)
    }

    /// Remove the recipe with `id`. Returns whether it existed; deleting an
    /// absent ID does nothing.
    pub fn delete(&mut self, id: &RecipeId) -> Result<bool, StoreError> {
        if self.get(id).is_none() {
            debug!(id = %id, "Delete of absent recipe ignored");
            return Ok(false);
        }
        let next = self.recipes.iter().filter(|r| &r.id != id).cloned().collect();
        self.commit(next)?;
        info!(id = %id, "Deleted recipe");
        Ok(true)
    }

    /// Whether the catalog has been seeded into this storage before
    pub fn is_seeded(&self) -> Result<bool, StoreError> {
        Ok(self.storage.read(SEEDED_KEY)?.as_deref() == Some("true"))
    }

    /// Insert every catalog entry whose ID is absent, once per storage.
    /// Later calls do nothing, whatever the catalog holds. Returns the number
    /// of recipes inserted.
    pub fn seed_defaults(&mut self, catalog: &[CatalogEntry]) -> Result<usize, StoreError> {
        if self.is_seeded()? {
            debug!("Recipe store already seeded");
            return Ok(0);
        }

        let now = Utc::now();
        let mut next = self.recipes.clone();
        let mut inserted = 0;
        for entry in catalog {
            if next.iter().any(|r| r.id == entry.id) {
                continue;
            }
            next.push(Recipe::from_draft(entry.id.clone(), entry.draft.clone(), now)?);
            inserted += 1;
        }

        if inserted > 0 {
            self.commit(next)?;
        }
        self.storage.write(SEEDED_KEY, "true")?;

        info!(inserted, "Seeded default recipes");
        Ok(inserted)
    }

    /// Borrow the underlying storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Give back the underlying storage
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn commit(&mut self, next: Vec<Recipe>) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&next)?;
        self.storage.write(RECIPES_KEY, &raw)?;
        self.recipes = next;
        Ok(())
    }
}
