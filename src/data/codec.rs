use std::fmt;
use std::path::Path;

use ndarray::{Array, IxDyn};
use serde::{Deserialize, Serialize};

use super::model::Image;
use crate::error::{ConfigError, Result};

/// Decodes a file on disk into an [`Image`].
///
/// Decoding is pure with respect to the filesystem: it never fetches remote
/// content. See [`ContentFetcher`](super::fetch::ContentFetcher) for that.
pub trait ImageCodec: fmt::Debug + Send + Sync {
    fn decode(&self, path: &Path) -> Result<Image>;
}

/// On-disk layout of a `.json` volume: row-major intensities plus a shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeFile {
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

impl VolumeFile {
    pub fn from_image(image: &Image) -> Self {
        VolumeFile {
            shape: image.shape().to_vec(),
            data: image.pixels().iter().copied().collect(),
        }
    }
}

/// Default codec.
///
/// * `.json` – a [`VolumeFile`] of any rank
/// * anything else – a raster image via the `image` crate; single channel
///   images decode to `(H, W)`, colour images to `(H, W, 3)`, intensities
///   scaled to `[0, 1]`
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterCodec;

impl ImageCodec for RasterCodec {
    fn decode(&self, path: &Path) -> Result<Image> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => decode_volume(path),
            _ => decode_raster(path),
        }
    }
}

fn decode_volume(path: &Path) -> Result<Image> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    let volume: VolumeFile = serde_json::from_str(&text)?;
    let expected: usize = volume.shape.iter().product();
    if expected != volume.data.len() {
        return Err(ConfigError::InvalidArray(format!(
            "{}: shape {:?} needs {expected} values, found {}",
            path.display(),
            volume.shape,
            volume.data.len()
        )));
    }
    Image::from_shape_vec(&volume.shape, volume.data).ok_or_else(|| {
        ConfigError::InvalidArray(format!("{}: inconsistent volume", path.display()))
    })
}

fn decode_raster(path: &Path) -> Result<Image> {
    if image::ImageFormat::from_path(path).is_err() {
        return Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }
    let img = image::open(path)?;
    let (w, h) = (img.width() as usize, img.height() as usize);

    let pixels = if img.color().channel_count() <= 2 {
        let luma = img.to_luma32f();
        Array::from_shape_vec(IxDyn(&[h, w]), luma.pixels().map(|p| f64::from(p.0[0])).collect())
    } else {
        let rgb = img.to_rgb32f();
        Array::from_shape_vec(
            IxDyn(&[h, w, 3]),
            rgb.into_raw().into_iter().map(f64::from).collect(),
        )
    };
    pixels
        .map(Image::from_array)
        .map_err(|e| ConfigError::InvalidArray(format!("{}: {e}", path.display())))
}
