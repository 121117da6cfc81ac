//! Recipe types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::{Params, ValidationError};

/// Unique identifier for a recipe
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(pub String);

impl RecipeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random ID for a user-created recipe
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecipeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecipeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Camera film simulation ("Image Control") a recipe builds on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilmSimulation {
    #[serde(rename = "Standard")]
    Standard,
    #[serde(rename = "Vivid")]
    Vivid,
    #[serde(rename = "Monotone")]
    Monotone,
    #[serde(rename = "Soft Monotone")]
    SoftMonotone,
    #[serde(rename = "Hard Monotone")]
    HardMonotone,
    #[serde(rename = "Hi-Contrast B&W")]
    HiContrastBw,
    #[serde(rename = "BW Monotone")]
    BwMonotone,
    #[serde(rename = "Positive Film")]
    PositiveFilm,
    #[serde(rename = "Negative Film")]
    NegativeFilm,
    #[serde(rename = "Bleach Bypass")]
    BleachBypass,
    #[serde(rename = "Retro")]
    Retro,
    #[serde(rename = "Cross Processing")]
    CrossProcessing,
}

impl FilmSimulation {
    pub const ALL: [FilmSimulation; 12] = [
        FilmSimulation::Standard,
        FilmSimulation::Vivid,
        FilmSimulation::Monotone,
        FilmSimulation::SoftMonotone,
        FilmSimulation::HardMonotone,
        FilmSimulation::HiContrastBw,
        FilmSimulation::BwMonotone,
        FilmSimulation::PositiveFilm,
        FilmSimulation::NegativeFilm,
        FilmSimulation::BleachBypass,
        FilmSimulation::Retro,
        FilmSimulation::CrossProcessing,
    ];

    /// Display name, identical to the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            FilmSimulation::Standard => "Standard",
            FilmSimulation::Vivid => "Vivid",
            FilmSimulation::Monotone => "Monotone",
            FilmSimulation::SoftMonotone => "Soft Monotone",
            FilmSimulation::HardMonotone => "Hard Monotone",
            FilmSimulation::HiContrastBw => "Hi-Contrast B&W",
            FilmSimulation::BwMonotone => "BW Monotone",
            FilmSimulation::PositiveFilm => "Positive Film",
            FilmSimulation::NegativeFilm => "Negative Film",
            FilmSimulation::BleachBypass => "Bleach Bypass",
            FilmSimulation::Retro => "Retro",
            FilmSimulation::CrossProcessing => "Cross Processing",
        }
    }
}

impl std::fmt::Display for FilmSimulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilmSimulation {
    type Err = String;

    /// Case-insensitive match on the display name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilmSimulation::ALL
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown film simulation: {}", s))
    }
}

/// A stored recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub base_effect: FilmSimulation,
    /// Always holds every schema parameter
    pub params: Params,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub name: String,
    pub base_effect: FilmSimulation,
    /// Missing parameters take their schema default
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RecipeDraft {
    pub fn new(name: impl Into<String>, base_effect: FilmSimulation) -> Self {
        Self {
            name: name.into(),
            base_effect,
            params: Params::new(),
            note: None,
            tags: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Partial update. Absent fields are left as they are; `params` is merged
/// key by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub base_effect: Option<FilmSimulation>,
    #[serde(default)]
    pub params: Params,
    /// `Some(None)` clears the note
    #[serde(default, deserialize_with = "double_option")]
    pub note: Option<Option<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Distinguish an explicit `null` from an absent field
fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

fn check_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

impl Recipe {
    /// Build a validated recipe from a draft
    pub fn from_draft(
        id: RecipeId,
        draft: RecipeDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        check_name(&draft.name)?;
        let params = draft.params.normalized()?;
        Ok(Self {
            id,
            name: draft.name,
            base_effect: draft.base_effect,
            params,
            note: draft.note,
            tags: draft.tags,
            created_at,
        })
    }

    /// Return a copy with `patch` merged in, or the first validation error
    pub fn patched(&self, patch: &RecipePatch) -> Result<Self, ValidationError> {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.name = name.clone();
        }
        if let Some(base_effect) = patch.base_effect {
            next.base_effect = base_effect;
        }
        if let Some(note) = &patch.note {
            next.note = note.clone();
        }
        if let Some(tags) = &patch.tags {
            next.tags = tags.clone();
        }
        check_name(&next.name)?;
        next.params = self.params.merged(&patch.params)?;
        Ok(next)
    }

    /// Re-check name and parameters, filling defaults and upgrading legacy names
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        check_name(&self.name)?;
        self.params = self.params.normalized()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ParamValue;

    fn sample() -> Recipe {
        let draft = RecipeDraft::new("Street", FilmSimulation::PositiveFilm)
            .with_params(Params::new().with("contrast", 2i64));
        Recipe::from_draft(RecipeId::new("r1"), draft, Utc::now()).unwrap()
    }

    #[test]
    fn test_from_draft_fills_defaults() {
        let recipe = sample();
        assert_eq!(recipe.params.len(), crate::schema::SCHEMA.len());
        assert_eq!(recipe.params.get("contrast"), Some(&ParamValue::Int(2)));
        assert_eq!(recipe.params.get("saturation"), Some(&ParamValue::Int(0)));
    }

    #[test]
    fn test_blank_name_rejected() {
        let draft = RecipeDraft::new("   ", FilmSimulation::Retro);
        assert_eq!(
            Recipe::from_draft(RecipeId::generate(), draft, Utc::now()),
            Err(ValidationError::EmptyName)
        );
    }

    #[test]
    fn test_patch_merges_params_field_by_field() {
        let recipe = sample();
        let patch = RecipePatch {
            params: Params::new().with("hue", -1i64),
            ..Default::default()
        };
        let next = recipe.patched(&patch).unwrap();
        assert_eq!(next.params.get("hue"), Some(&ParamValue::Int(-1)));
        assert_eq!(next.params.get("contrast"), Some(&ParamValue::Int(2)));
        assert_eq!(next.name, "Street");
        assert_eq!(next.created_at, recipe.created_at);
    }

    #[test]
    fn test_patch_note_null_clears() {
        let mut recipe = sample();
        recipe.note = Some("old".to_string());

        let keep: RecipePatch = serde_json::from_str(r#"{"name": "Renamed"}"#).unwrap();
        assert_eq!(recipe.patched(&keep).unwrap().note.as_deref(), Some("old"));

        let clear: RecipePatch = serde_json::from_str(r#"{"note": null}"#).unwrap();
        assert_eq!(recipe.patched(&clear).unwrap().note, None);
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["baseEffect"], "Positive Film");
        assert_eq!(json["id"], "r1");
        assert!(json["createdAt"].is_string());
        assert!(json.get("note").is_none());
    }

    #[test]
    fn test_film_simulation_from_str() {
        assert_eq!(
            "hi-contrast b&w".parse::<FilmSimulation>().unwrap(),
            FilmSimulation::HiContrastBw
        );
        assert!("Velvia".parse::<FilmSimulation>().is_err());
        for f in FilmSimulation::ALL {
            let json = serde_json::to_string(&f).unwrap();
            assert_eq!(json, format!("\"{}\"", f.as_str()));
        }
    }
}
