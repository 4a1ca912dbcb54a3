use ndarray::{Array3, Array4, Axis};
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;

/// Number of color channels carried by every image tensor. Alpha is
/// dropped at decode time; the pipeline is RGB only.
pub const CHANNELS: usize = 3;

/// An image as a (height, width, channel) array of `f32` values.
///
/// Decoded and predicted images live in `[0, 1]`; freshly drawn noise
/// tensors are standard-normal and may fall outside that range. Tensors
/// are immutable values: every operation on them returns a new tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageTensor(Array3<f32>);

impl ImageTensor {
    /// Wraps an existing (H, W, 3) array.
    pub fn new(data: Array3<f32>) -> Self {
        assert_eq!(
            data.shape()[2],
            CHANNELS,
            "image tensors carry exactly {} channels",
            CHANNELS
        );
        ImageTensor(data)
    }

    /// An all-zero image of the given spatial shape.
    pub fn zeros(height: usize, width: usize) -> Self {
        ImageTensor(Array3::zeros((height, width, CHANNELS)))
    }

    /// Draws a fresh standard-normal tensor of the given spatial shape.
    pub fn randn(height: usize, width: usize) -> Self {
        ImageTensor(Array3::random((height, width, CHANNELS), StandardNormal))
    }

    pub fn height(&self) -> usize {
        self.0.shape()[0]
    }

    pub fn width(&self) -> usize {
        self.0.shape()[1]
    }

    /// Shape as (height, width, channels).
    pub fn shape(&self) -> (usize, usize, usize) {
        let s = self.0.shape();
        (s[0], s[1], s[2])
    }

    pub fn data(&self) -> &Array3<f32> {
        &self.0
    }

    pub fn into_inner(self) -> Array3<f32> {
        self.0
    }

    /// Stacks images into a (batch, height, width, channel) array.
    /// All images must share a spatial shape; the slice must be non-empty.
    pub fn stack(images: &[ImageTensor]) -> Result<Array4<f32>, String> {
        let views: Vec<_> = images.iter().map(|img| img.0.view()).collect();
        ndarray::stack(Axis(0), &views)
            .map_err(|e| format!("cannot stack {} image tensors: {}", images.len(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_shape() {
        let t = ImageTensor::zeros(4, 6);
        assert_eq!(t.shape(), (4, 6, CHANNELS));
        assert!(t.data().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn randn_shape_and_spread() {
        let t = ImageTensor::randn(8, 8);
        assert_eq!(t.shape(), (8, 8, CHANNELS));
        // standard-normal draws are not all identical
        let first = t.data()[[0, 0, 0]];
        assert!(t.data().iter().any(|v| *v != first));
    }

    #[test]
    fn stack_builds_batch_axis() {
        let imgs = vec![ImageTensor::zeros(2, 3), ImageTensor::zeros(2, 3)];
        let batch = ImageTensor::stack(&imgs).expect("stack");
        assert_eq!(batch.shape(), &[2, 2, 3, CHANNELS]);
    }

    #[test]
    fn stack_rejects_mismatched_shapes() {
        let imgs = vec![ImageTensor::zeros(2, 2), ImageTensor::zeros(3, 3)];
        assert!(ImageTensor::stack(&imgs).is_err());
    }
}
