//! Cover classifier: tells plain vinyl label photos apart from album art.
//!
//! Label photos are shot against a uniform background, so all four corners of
//! the image share roughly the same colour. Album art almost never does. This
//! is a heuristic: the thresholds come from [`ClassifierConfig`].

use std::path::Path;

use image::{DynamicImage, RgbImage};
use tracing::{info, warn};

use crate::cache::{CacheError, CachedStore};
use crate::config::ClassifierConfig;

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image {width}x{height} is smaller than the {sample}px corner sample")]
    TooSmall { width: u32, height: u32, sample: u32 },
}

/// Mean colour of a sampled block, rounded per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Summed absolute channel difference.
    pub fn distance(self, other: Rgb) -> u32 {
        self.r.abs_diff(other.r) as u32
            + self.g.abs_diff(other.g) as u32
            + self.b.abs_diff(other.b) as u32
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CoverClassifier {
    sample_size: u32,
    tolerance: u32,
}

impl CoverClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            sample_size: config.sample_size.max(1),
            tolerance: config.tolerance,
        }
    }

    /// Classify a cover file. Any failure is logged and reads as "not a label".
    pub fn is_label_image(&self, path: &Path) -> bool {
        match self.classify_file(path) {
            Ok(is_label) => is_label,
            Err(e) => {
                warn!("Error analyzing image {}: {}", path.display(), e);
                false
            }
        }
    }

    pub fn classify_file(&self, path: &Path) -> Result<bool, ClassifyError> {
        let image = image::open(path)?;
        self.classify(&image)
    }

    pub fn classify(&self, image: &DynamicImage) -> Result<bool, ClassifyError> {
        let corners = self.corner_means(&image.to_rgb8())?;
        Ok(self.corners_match(&corners))
    }

    /// Mean colour of the top-left, top-right, bottom-left and bottom-right blocks.
    pub fn corner_means(&self, image: &RgbImage) -> Result<[Rgb; 4], ClassifyError> {
        let (width, height) = image.dimensions();
        let n = self.sample_size;
        if width < n || height < n {
            return Err(ClassifyError::TooSmall {
                width,
                height,
                sample: n,
            });
        }

        let origins = [
            (0, 0),
            (width - n, 0),
            (0, height - n),
            (width - n, height - n),
        ];
        Ok(origins.map(|(left, top)| block_mean(image, left, top, n)))
    }

    /// True when every corner is within `tolerance * 3` of the first one.
    pub fn corners_match(&self, corners: &[Rgb; 4]) -> bool {
        let limit = self.tolerance * 3;
        let base = corners[0];
        corners[1..].iter().all(|c| c.distance(base) <= limit)
    }
}

fn block_mean(image: &RgbImage, left: u32, top: u32, size: u32) -> Rgb {
    let mut sum = [0u32; 3];
    for y in top..top + size {
        for x in left..left + size {
            let px = image.get_pixel(x, y);
            sum[0] += px[0] as u32;
            sum[1] += px[1] as u32;
            sum[2] += px[2] as u32;
        }
    }
    let count = (size * size) as f32;
    let mean = |total: u32| (total as f32 / count).round() as u8;
    Rgb::new(mean(sum[0]), mean(sum[1]), mean(sum[2]))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifySummary {
    pub total: usize,
    pub labels: usize,
}

/// Re-run the classifier over every item of an existing cache and rewrite it.
///
/// Items whose cover file is missing are marked as not being label images.
pub async fn classify_cache(
    store: &CachedStore,
    covers_dir: &Path,
    classifier: CoverClassifier,
) -> Result<ClassifySummary, CacheError> {
    let records = store.load().await?;
    let total = records.len();
    info!("Analyzing {} cover images...", total);

    let mut labels = 0;
    let mut classified = Vec::with_capacity(total);
    for (i, record) in records.into_iter().enumerate() {
        let path = covers_dir.join(record.cover_file_name());
        let is_label = if path.exists() {
            classify_blocking(classifier, path).await
        } else {
            false
        };
        if is_label {
            labels += 1;
            info!("  [LABEL] {} - {}", record.title, record.artist);
        }
        classified.push(record.with_label_image(is_label));

        if (i + 1) % 10 == 0 {
            info!("  Processed {}/{}", i + 1, total);
        }
    }

    store.save(&classified).await?;
    info!(
        "Found {} vinyl label images out of {} total",
        labels, total
    );
    Ok(ClassifySummary { total, labels })
}

/// Decode off the async runtime; a panicked worker counts as "not a label".
pub(crate) async fn classify_blocking(classifier: CoverClassifier, path: std::path::PathBuf) -> bool {
    match tokio::task::spawn_blocking(move || classifier.is_label_image(&path)).await {
        Ok(is_label) => is_label,
        Err(e) => {
            warn!("Cover analysis task failed: {}", e);
            false
        }
    }
}
