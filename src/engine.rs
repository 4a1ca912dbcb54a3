use crate::tensor::ImageTensor;
use ndarray::{Array1, Array4};
use std::sync::{Arc, Mutex};

/// One training batch as submitted to [`PredictionEngine::fit`].
///
/// `noise` is a batch of *independent* fresh draws handed to the engine as
/// its own input channel; it is never the noise that was blended into
/// `noisy`. `steps` repeats the scalar timestep once per batch element.
pub struct FitBatch {
    /// Corrupted images, shape (batch, height, width, channel)
    pub noisy: Array4<f32>,
    /// Independent standard-normal draws, same shape as `noisy`
    pub noise: Array4<f32>,
    /// Timestep scalar per batch element
    pub steps: Array1<f32>,
}

/// The opaque computation backend behind the pipeline.
///
/// The two operations here are the only suspension points in the whole
/// pipeline; both may be long-running and neither is subject to a
/// timeout. Errors are plain strings at this seam; the orchestration
/// layer wraps them into [`crate::GenError::Engine`].
pub trait PredictionEngine: Send {
    /// One denoising refinement: maps (current image, fresh noise, step)
    /// to a less-noisy image of the same shape.
    fn predict(
        &self,
        image: &ImageTensor,
        noise: &ImageTensor,
        step: usize,
    ) -> Result<ImageTensor, String>;

    /// One internal optimization pass against the given targets,
    /// returning the scalar batch loss.
    fn fit(&mut self, batch: &FitBatch, targets: &Array4<f32>) -> Result<f32, String>;
}

/// A shared engine instance. The mutex is the exclusive-access token that
/// serializes sampling and training use of the same engine state; the
/// session hands out clones of the `Arc`.
pub type SharedEngine = Arc<Mutex<dyn PredictionEngine>>;
