use crate::tensor::ImageTensor;
#[cfg(feature = "vision")]
use crate::tensor::CHANNELS;
use std::path::Path;

/// Decode/encode boundary of the pipeline.
///
/// Both operations are fallible, blocking and single-shot: the core never
/// retries them and surfaces failures unchanged. `load` produces the
/// codec's fixed spatial shape with RGB channels normalized into [0, 1];
/// any alpha channel in the source is dropped.
pub trait ImageCodec {
    fn load(&self, path: &Path) -> Result<ImageTensor, String>;
    fn save(&self, image: &ImageTensor, path: &Path) -> Result<(), String>;
}

/// File-backed codec over the `image` crate.
#[cfg(feature = "vision")]
pub struct FileImageCodec {
    width: u32,
    height: u32,
}

#[cfg(feature = "vision")]
impl FileImageCodec {
    /// A codec that decodes every source to the given spatial shape.
    pub fn new(width: u32, height: u32) -> Self {
        FileImageCodec { width, height }
    }
}

#[cfg(feature = "vision")]
impl ImageCodec for FileImageCodec {
    fn load(&self, path: &Path) -> Result<ImageTensor, String> {
        use image::GenericImageView;
        let img = image::open(path)
            .map_err(|e| format!("failed to open image {}: {}", path.display(), e))?;
        let img = if img.width() == self.width && img.height() == self.height {
            img
        } else {
            img.resize_exact(self.width, self.height, image::imageops::FilterType::Triangle)
        };
        let rgb = img.to_rgb8();
        let (w, h) = rgb.dimensions();
        let mut data: Vec<f32> = Vec::with_capacity((w * h) as usize * CHANNELS);
        for y in 0..h {
            for x in 0..w {
                let p = rgb.get_pixel(x, y);
                for c in 0..CHANNELS {
                    data.push(p[c] as f32 / 255.0);
                }
            }
        }
        let arr = ndarray::Array3::from_shape_vec((h as usize, w as usize, CHANNELS), data)
            .map_err(|e| format!("ndarray shape creation failed: {}", e))?;
        Ok(ImageTensor::new(arr))
    }

    fn save(&self, image: &ImageTensor, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    format!("failed to create output dir {}: {}", parent.display(), e)
                })?;
            }
        }
        let (height, width, _) = image.shape();
        let mut out = image::RgbImage::new(width as u32, height as u32);
        let data = image.data();
        for y in 0..height {
            for x in 0..width {
                let px = [
                    quantize(data[[y, x, 0]]),
                    quantize(data[[y, x, 1]]),
                    quantize(data[[y, x, 2]]),
                ];
                out.put_pixel(x as u32, y as u32, image::Rgb(px));
            }
        }
        out.save(path)
            .map_err(|e| format!("failed to save image {}: {}", path.display(), e))
    }
}

/// Maps a [0, 1] intensity to a byte; out-of-range values are clipped.
#[cfg(feature = "vision")]
fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
