//! Iterative image-denoising pipeline.
//!
//! A forward corruption process blends training images toward noise along
//! a linear schedule, and a reverse sampling process starts from pure
//! noise and reconstructs an image over a fixed number of refinement
//! steps. The computation backend is pluggable: anything implementing
//! [`PredictionEngine`] can drive both loops, and [`AffineDenoiser`]
//! ships as a minimal built-in so the pipeline runs out of the box.
//!
//! State for one generation/training run lives in a [`GeneratorSession`],
//! which also carries the cancellation flag the sampler polls between
//! engine calls.

pub mod denoiser;
pub mod engine;
pub mod error;
pub mod io;
pub mod sampler;
pub mod schedule;
pub mod session;
pub mod tensor;
pub mod trainer;

pub use denoiser::{AffineDenoiser, DenoiserParams};
pub use engine::{FitBatch, PredictionEngine, SharedEngine};
pub use error::{GenError, Result};
pub use io::dataset::{TrainingExample, TrainingSet};
#[cfg(feature = "vision")]
pub use io::image::FileImageCodec;
pub use io::image::ImageCodec;
pub use sampler::{DenoisingSampler, SamplerConfig};
pub use schedule::NoiseSchedule;
pub use session::{GeneratorSession, DEFAULT_TIMESTEPS};
pub use tensor::{ImageTensor, CHANNELS};
pub use trainer::{TimestepOrder, Trainer, TrainerConfig};
