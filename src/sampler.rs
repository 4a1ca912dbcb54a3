use crate::error::{GenError, Result};
use crate::io::image::ImageCodec;
use crate::session::GeneratorSession;
use crate::tensor::ImageTensor;
use std::path::PathBuf;

/// Sampling run configuration.
#[derive(Clone, Debug)]
pub struct SamplerConfig {
    pub height: usize,
    pub width: usize,
    /// Fixed output location, overwritten on every completed or cancelled
    /// run.
    pub output_path: PathBuf,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            height: 256,
            width: 256,
            output_path: PathBuf::from("images/output.png"),
        }
    }
}

/// True when `step` gets a checkpoint observation during the countdown.
///
/// Checkpoints fire on multiples of 10, except the opening step of the
/// countdown, which is already announced by the per-step progress line.
pub fn checkpoint_step(step: usize, timesteps: usize) -> bool {
    step % 10 == 0 && step != timesteps
}

/// The reverse process: turns an initial standard-normal tensor into an
/// image via `timesteps` successive engine refinements, counting down
/// from `timesteps` to 1. Step 0 is never submitted to the engine.
pub struct DenoisingSampler<'a> {
    session: &'a GeneratorSession,
    config: SamplerConfig,
}

impl<'a> DenoisingSampler<'a> {
    pub fn new(session: &'a GeneratorSession, config: SamplerConfig) -> Self {
        DenoisingSampler { session, config }
    }

    /// Runs the sampling loop to completion or cancellation and persists
    /// the result either way. Engine failures propagate unchanged; there
    /// is no retry and no partial-failure recovery beyond the stop path.
    pub fn run(&self, prompt: &str, codec: &dyn ImageCodec) -> Result<ImageTensor> {
        // Fail fast before any tensor work when no engine is loaded.
        let engine = self.session.engine()?;
        let timesteps = self.session.timesteps();
        log::info!(
            "generating image for {:?} ({} timesteps)",
            prompt,
            timesteps
        );
        // The prompt conditions nothing yet; it is accepted so the
        // interface survives a future conditioning mechanism.
        log::debug!("prompt conditioning not implemented; sampling is unconditional");

        let mut image = ImageTensor::randn(self.config.height, self.config.width);
        for step in (1..=timesteps).rev() {
            // Record the step before the (slow) engine call so a stop
            // request lands with at most one step of latency.
            self.session.set_current_timestep(step);
            if self.session.stop_requested() {
                log::info!("stopping early at timestep {}", step);
                self.persist(&image, codec)?;
                return Ok(image);
            }
            log::info!("timestep {}/{} in progress", timesteps - step + 1, timesteps);

            let noise = ImageTensor::randn(self.config.height, self.config.width);
            image = engine
                .lock()
                .unwrap()
                .predict(&image, &noise, step)
                .map_err(GenError::Engine)?;

            if checkpoint_step(step, timesteps) {
                log::info!("checkpoint at timestep {}: image is evolving", step);
            }
        }

        log::info!("image generation complete");
        self.persist(&image, codec)?;
        Ok(image)
    }

    fn persist(&self, image: &ImageTensor, codec: &dyn ImageCodec) -> Result<()> {
        codec
            .save(image, &self.config.output_path)
            .map_err(GenError::Codec)
    }
}

#[cfg(test)]
mod tests {
    use super::checkpoint_step;

    #[test]
    fn checkpoint_fires_on_interior_multiples_of_ten() {
        let timesteps = 30;
        let fired: Vec<usize> = (1..=timesteps)
            .rev()
            .filter(|s| checkpoint_step(*s, timesteps))
            .collect();
        assert_eq!(fired, vec![20, 10]);
    }

    #[test]
    fn checkpoint_never_fires_on_off_multiples() {
        for step in [1, 7, 13, 25, 29] {
            assert!(!checkpoint_step(step, 30));
        }
    }

    #[test]
    fn checkpoint_skips_opening_step() {
        assert!(!checkpoint_step(30, 30));
        assert!(checkpoint_step(30, 40));
    }
}
