use crate::engine::FitBatch;
use crate::error::{GenError, Result};
use crate::io::dataset::TrainingSet;
use crate::io::image::ImageCodec;
use crate::schedule::NoiseSchedule;
use crate::session::GeneratorSession;
use crate::tensor::ImageTensor;
use ndarray::Array1;

/// Direction the inner timestep loop walks the schedule in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimestepOrder {
    /// Ascending `0..timesteps`, as the system has always trained.
    ///
    /// Note the sampler counts *down* from `timesteps` to 1, so under
    /// this order the two loops index opposite ends of the schedule:
    /// training sees `alpha(0) = 1` (clean images) and never the pure
    /// noise end. This mismatch is inherited behavior, kept because
    /// changing it changes which noise level the engine is fitted at for
    /// a given index.
    #[default]
    Legacy,
    /// Descending `timesteps..=1`, matching the sampler's countdown.
    Aligned,
}

impl TimestepOrder {
    /// The timestep indices one epoch visits, in order.
    pub fn steps(self, timesteps: usize) -> Vec<usize> {
        match self {
            TimestepOrder::Legacy => (0..timesteps).collect(),
            TimestepOrder::Aligned => (1..=timesteps).rev().collect(),
        }
    }
}

/// Training run configuration.
#[derive(Clone, Debug)]
pub struct TrainerConfig {
    /// Fixed number of epochs; there is no convergence check.
    pub epochs: usize,
    pub order: TimestepOrder,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            epochs: 10,
            order: TimestepOrder::Legacy,
        }
    }
}

/// The forward-process training loop: for every epoch and timestep,
/// corrupt all training images at that step's noise level and run one
/// fit pass against the clean originals.
///
/// Training has no cancellation path; the session stop flag only affects
/// sampling. It always attempts exactly `epochs * timesteps` fit calls.
pub struct Trainer<'a> {
    session: &'a GeneratorSession,
    config: TrainerConfig,
}

impl<'a> Trainer<'a> {
    pub fn new(session: &'a GeneratorSession, config: TrainerConfig) -> Self {
        Trainer { session, config }
    }

    pub fn run(&self, set: &TrainingSet, codec: &dyn ImageCodec) -> Result<()> {
        let engine = self.session.engine()?;
        if set.is_empty() {
            return Err(GenError::Dataset("training set is empty".to_string()));
        }
        log::info!(
            "starting diffusion model training on {} images",
            set.len()
        );

        // Descriptions are carried on the examples but condition nothing
        // yet; only the image halves feed the loop below.
        let mut images = Vec::with_capacity(set.len());
        for example in set.iter() {
            let img = codec.load(&example.path).map_err(GenError::Codec)?;
            images.push(img);
        }
        let targets = ImageTensor::stack(&images).map_err(GenError::Dataset)?;

        let timesteps = self.session.timesteps();
        let schedule = NoiseSchedule::new(timesteps);

        for epoch in 0..self.config.epochs {
            log::info!("epoch {}/{} starting", epoch + 1, self.config.epochs);
            for step in self.config.order.steps(timesteps) {
                self.session.set_current_timestep(step);
                log::info!(
                    "epoch {}, timestep {} of {}",
                    epoch + 1,
                    step,
                    timesteps
                );

                let noisy: Vec<ImageTensor> = images
                    .iter()
                    .map(|img| {
                        let draw = ImageTensor::randn(img.height(), img.width());
                        schedule.corrupt(img, &draw, step)
                    })
                    .collect();
                // The engine receives noise as its own input channel; these
                // draws are independent of the ones baked into `noisy`.
                let noise: Vec<ImageTensor> = images
                    .iter()
                    .map(|img| ImageTensor::randn(img.height(), img.width()))
                    .collect();
                let batch = FitBatch {
                    noisy: ImageTensor::stack(&noisy).map_err(GenError::Dataset)?,
                    noise: ImageTensor::stack(&noise).map_err(GenError::Dataset)?,
                    steps: Array1::from_elem(images.len(), step as f32),
                };

                // The one place partial failure is absorbed: an isolated
                // bad batch must not end the run.
                match engine.lock().unwrap().fit(&batch, &targets) {
                    Ok(loss) => log::info!("epoch {}, loss: {}", epoch + 1, loss),
                    Err(e) => log::error!(
                        "training error at epoch {}, timestep {}: {}",
                        epoch + 1,
                        step,
                        e
                    ),
                }
            }
        }
        log::info!("diffusion model training complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::TimestepOrder;

    #[test]
    fn legacy_order_ascends_from_zero() {
        assert_eq!(TimestepOrder::Legacy.steps(5), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn aligned_order_matches_sampler_countdown() {
        assert_eq!(TimestepOrder::Aligned.steps(5), vec![5, 4, 3, 2, 1]);
    }
}
