//! Built-in recipe catalog seeded into fresh stores

use crate::recipe::{FilmSimulation, RecipeDraft, RecipeId};
use crate::schema::Params;

/// A catalog recipe with its fixed ID
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub id: RecipeId,
    pub draft: RecipeDraft,
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, draft: RecipeDraft) -> Self {
        Self {
            id: RecipeId::new(id),
            draft,
        }
    }
}

fn entry<const N: usize>(
    id: &str,
    name: &str,
    base_effect: FilmSimulation,
    params: [(&str, i64); N],
    note: &str,
    tags: &[&str],
) -> CatalogEntry {
    let mut draft = RecipeDraft::new(name, base_effect)
        .with_params(params.into_iter().collect())
        .with_note(note);
    draft.tags = tags.iter().map(|t| t.to_string()).collect();
    CatalogEntry::new(id, draft)
}

/// Factory recipes plus the scene template library
pub fn builtin() -> Vec<CatalogEntry> {
    use FilmSimulation::*;

    vec![
        entry(
            "default-1",
            "Positive Film",
            PositiveFilm,
            [
                ("saturation", 0),
                ("hue", 0),
                ("highLowKey", 0),
                ("contrast", 1),
                ("contrastHighlight", 0),
                ("contrastShadow", -1),
                ("sharpness", 1),
                ("shading", 0),
                ("clarity", 0),
            ],
            "Classic highly saturated look.",
            &[],
        ),
        entry(
            "default-2",
            "High Contrast B&W",
            HiContrastBw,
            [("contrast", 3), ("sharpness", 2), ("grainEffect", 1)],
            "Gritty street photography style.",
            &[],
        ),
        entry(
            "template-1",
            "Street High Contrast",
            PositiveFilm,
            [("saturation", 2), ("hue", 0), ("highLowKey", 0), ("contrast", 4)],
            "For city street shooting; strong contrast brings out architectural lines.",
            &["street", "city", "high contrast"],
        ),
        entry(
            "template-2",
            "Night Low Noise",
            NegativeFilm,
            [("saturation", -1), ("hue", 0), ("highLowKey", -2), ("contrast", 2)],
            "Night shooting; lower saturation keeps noise down.",
            &["night", "low noise"],
        ),
        entry(
            "template-3",
            "Soft Portrait",
            SoftMonotone,
            [("saturation", 1), ("hue", 1), ("highLowKey", 1), ("contrast", -1)],
            "Gentle tones suited to portraits.",
            &["portrait", "soft"],
        ),
        entry(
            "template-4",
            "Saturated Landscape",
            PositiveFilm,
            [("saturation", 4), ("hue", -1), ("highLowKey", 0), ("contrast", 2)],
            "Vivid colour for natural scenery.",
            &["landscape", "saturated", "nature"],
        ),
        entry(
            "template-5",
            "Classic B&W",
            HiContrastBw,
            [("saturation", 0), ("hue", 0), ("highLowKey", 0), ("contrast", 3)],
            "Classic high-contrast black and white for documentary work.",
            &["black and white", "documentary", "classic"],
        ),
        entry(
            "template-6",
            "Retro Film",
            Retro,
            [("saturation", 2), ("hue", 2), ("highLowKey", -1), ("contrast", 1)],
            "Emulates the tone and texture of vintage film.",
            &["retro", "film", "nostalgic"],
        ),
        entry(
            "template-7",
            "Bleach Bypass",
            BleachBypass,
            [("saturation", -2), ("hue", 0), ("highLowKey", 1), ("contrast", 4)],
            "Low saturation, high contrast bleach effect.",
            &["bleach", "low saturation"],
        ),
        entry(
            "template-8",
            "Airy Japanese",
            PositiveFilm,
            [("saturation", 1), ("hue", 1), ("highLowKey", 2), ("contrast", -1)],
            "Bright, airy Japanese style.",
            &["japanese", "airy", "bright"],
        ),
        bw_monotone(),
    ]
}

/// Full-parameter monochrome template
fn bw_monotone() -> CatalogEntry {
    let params = Params::new()
        .with("saturation", 0i64)
        .with("hue", 0i64)
        .with("highLowKey", 3i64)
        .with("contrast", 4i64)
        .with("contrastHighlight", -4i64)
        .with("contrastShadow", -4i64)
        .with("sharpness", 1i64)
        .with("clarity", 2i64)
        .with("toning", "Off")
        .with("filterEffect", 2i64)
        .with("shading", -1i64)
        .with("grainEffect", 1i64)
        .with("highlightCorrection", true)
        .with("shadowCorrection", "Low")
        .with("peripheralIlluminationCorrection", true)
        .with("highISONoiseReduction", false)
        .with("whiteBalance", "Auto")
        .with("wbCompensationA", 0i64)
        .with("wbCompensationM", 0i64)
        .with("isoMax", 6400i64)
        .with("exposureCompensation", "+1/3");

    let mut draft = RecipeDraft::new("BW Monotone Classic", FilmSimulation::BwMonotone)
        .with_params(params)
        .with_note("Classic monochrome with high contrast and retained detail, for documentary and street.");
    draft.tags = ["black and white", "monochrome", "documentary", "street", "high contrast"]
        .iter()
        .map(|t| t.to_string())
        .collect();
    CatalogEntry::new("template-bw-monotone", draft)
}
