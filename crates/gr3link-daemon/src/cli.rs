//! Command-line subcommands

use anyhow::Result;
use clap::Subcommand;
use gr3link_core::schema;
use gr3link_core::{
    FilmSimulation, ParamKind, ParamValue, Params, Recipe, RecipeDraft, RecipeId, RecipePatch,
};
use std::sync::Arc;
use thiserror::Error;

use crate::state::AppState;

#[derive(Subcommand, Debug)]
pub enum RecipeCommand {
    /// List all recipes
    List,
    /// Show one recipe with every parameter
    Show { id: String },
    /// Add a recipe
    Add {
        name: String,
        /// Film simulation, e.g. "Positive Film"
        #[arg(short, long, value_parser = parse_film)]
        effect: FilmSimulation,
        /// Parameter override, repeatable (name=value)
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, ParamValue)>,
        #[arg(short, long)]
        note: Option<String>,
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// Change fields of an existing recipe
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long, value_parser = parse_film)]
        effect: Option<FilmSimulation>,
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, ParamValue)>,
        #[arg(short, long, conflicts_with = "clear_note")]
        note: Option<String>,
        /// Remove the note
        #[arg(long)]
        clear_note: bool,
    },
    /// Delete a recipe
    Delete { id: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParamArgError {
    #[error("expected name=value, got {0:?}")]
    MissingSeparator(String),
    #[error("parameter name is empty")]
    EmptyName,
}

/// Parse `name=value`. The value is read as a boolean, then an integer,
/// and kept as text otherwise. Text-choice parameters always keep text, so
/// `exposureCompensation=0` stays `"0"`.
pub fn parse_param(arg: &str) -> Result<(String, ParamValue), ParamArgError> {
    let (name, raw) = arg
        .split_once('=')
        .ok_or_else(|| ParamArgError::MissingSeparator(arg.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ParamArgError::EmptyName);
    }
    let raw = raw.trim();
    let is_text = matches!(
        schema::spec(schema::canonical_name(name)).map(|p| &p.kind),
        Some(ParamKind::Choice { .. })
    );
    let value = if is_text {
        ParamValue::Text(raw.to_string())
    } else if let Ok(b) = raw.parse::<bool>() {
        ParamValue::Bool(b)
    } else if let Ok(n) = raw.parse::<i64>() {
        ParamValue::Int(n)
    } else {
        ParamValue::Text(raw.to_string())
    };
    Ok((name.to_string(), value))
}

fn parse_film(arg: &str) -> Result<FilmSimulation, String> {
    arg.parse()
}

pub async fn connect(state: &Arc<AppState>) -> Result<()> {
    let outcome = state.device.connect().await;
    println!("State: {}", serde_json::to_string(&outcome.state)?);
    Ok(())
}

pub async fn photos(state: &Arc<AppState>) -> Result<()> {
    state.device.connect().await;
    let photos = state.device.get_photos().await;
    println!("{} photos:", photos.len());
    for photo in photos {
        println!("  - {}", photo.name);
        if let Some(shot) = &photo.params {
            println!("    f/{} ISO {} {}s", shot.aperture, shot.iso, shot.shutter);
        }
    }
    Ok(())
}

pub async fn recipes(state: &Arc<AppState>, command: RecipeCommand) -> Result<()> {
    let mut store = state.recipes.write().await;
    match command {
        RecipeCommand::List => {
            println!("{} recipes:", store.len());
            for recipe in store.get_all() {
                println!("  - {} ({}) [{}]", recipe.name, recipe.id, recipe.base_effect);
            }
        }
        RecipeCommand::Show { id } => match store.get(&RecipeId::new(id.clone())) {
            Some(recipe) => print_recipe(recipe),
            None => anyhow::bail!("Recipe not found: {}", id),
        },
        RecipeCommand::Add {
            name,
            effect,
            params,
            note,
            tags,
        } => {
            let mut draft = RecipeDraft::new(name, effect).with_params(params.into_iter().collect());
            draft.note = note;
            draft.tags = tags;
            let recipe = store.add(draft)?;
            println!("Added {}", recipe.id);
        }
        RecipeCommand::Update {
            id,
            name,
            effect,
            params,
            note,
            clear_note,
        } => {
            let patch = RecipePatch {
                name,
                base_effect: effect,
                params: params.into_iter().collect::<Params>(),
                note: if clear_note { Some(None) } else { note.map(Some) },
                tags: None,
            };
            let recipe = store.update(&RecipeId::new(id), &patch)?;
            print_recipe(&recipe);
        }
        RecipeCommand::Delete { id } => {
            if store.delete(&RecipeId::new(id.clone()))? {
                println!("Deleted {}", id);
            } else {
                println!("No recipe {}", id);
            }
        }
    }
    Ok(())
}

fn print_recipe(recipe: &Recipe) {
    println!("{} ({})", recipe.name, recipe.id);
    println!("  Effect: {}", recipe.base_effect);
    println!("  Created: {}", recipe.created_at.to_rfc3339());
    if let Some(note) = &recipe.note {
        println!("  Note: {}", note);
    }
    if !recipe.tags.is_empty() {
        println!("  Tags: {}", recipe.tags.join(", "));
    }
    for (name, value) in recipe.params.iter() {
        println!("    {} = {}", name, value);
    }
}
