//! GR3 Link Core - Recipe schema, recipe store and photo types
//!
//! This crate provides the foundational types for GR3 Link:
//! - Parameter schema describing every recipe parameter's kind, bounds and default
//! - Recipe types with validated construction and partial updates
//! - A recipe store persisted through a pluggable key-value port
//! - The built-in catalog seeded into fresh stores
//! - Photo records produced by device listings

pub mod catalog;
pub mod photo;
pub mod recipe;
pub mod schema;
pub mod storage;
pub mod store;

pub use catalog::CatalogEntry;
pub use photo::{Photo, ShotInfo};
pub use recipe::{FilmSimulation, Recipe, RecipeDraft, RecipeId, RecipePatch};
pub use schema::{ParamKind, ParamSpec, ParamValue, Params, ValidationError, SCHEMA};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{RecipeStore, StoreError};
