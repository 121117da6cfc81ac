//! Simulated camera gallery used in demo mode

use gr3link_core::{Photo, ShotInfo};
use std::time::Duration;
use tracing::debug;

/// Number of photos in the simulated gallery
pub const MOCK_PHOTO_COUNT: usize = 12;

const PLACEHOLDER_BASE: &str = "https://picsum.photos/seed";

/// Produces placeholder photos after a simulated round trip
#[derive(Debug, Clone)]
pub struct MockGallery {
    count: usize,
    latency: Duration,
}

impl MockGallery {
    pub fn new(latency: Duration) -> Self {
        Self {
            count: MOCK_PHOTO_COUNT,
            latency,
        }
    }

    pub async fn photos(&self) -> Vec<Photo> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        debug!(count = self.count, "Serving mock photos");
        (1..=self.count).map(mock_photo).collect()
    }
}

fn mock_photo(n: usize) -> Photo {
    Photo {
        name: format!("R{:07}.JPG", n),
        url: format!("{}/{}/1920/1280", PLACEHOLDER_BASE, n),
        thumbnail: format!("{}/{}/300/300", PLACEHOLDER_BASE, n),
        date: Some("2023-10-27".to_string()),
        params: Some(ShotInfo {
            aperture: 2.8,
            iso: 100,
            shutter: "1/125".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_mock_gallery_shape() {
        let photos = MockGallery::new(Duration::from_millis(200)).photos().await;
        assert_eq!(photos.len(), MOCK_PHOTO_COUNT);
        assert_eq!(photos[0].name, "R0000001.JPG");
        assert_eq!(photos[11].name, "R0000012.JPG");
        assert_eq!(photos[0].thumbnail, "https://picsum.photos/seed/1/300/300");
        assert!(photos.iter().all(|p| p.params.is_some()));
    }
}
