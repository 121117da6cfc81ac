//! Photo records produced by a device listing

use serde::{Deserialize, Serialize};

/// Exposure settings a photo was taken with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotInfo {
    /// Aperture f-number
    #[serde(rename = "f")]
    pub aperture: f64,
    pub iso: u32,
    /// Shutter speed, e.g. "1/125"
    #[serde(rename = "s")]
    pub shutter: String,
}

/// A photo on the camera (or a simulated one). Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    /// File name, e.g. "R0000001.JPG"
    pub name: String,
    /// Full-resolution image URL
    pub url: String,
    /// Reduced-size preview URL
    pub thumbnail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<ShotInfo>,
}
