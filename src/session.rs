use crate::engine::SharedEngine;
use crate::error::{GenError, Result};
use crate::io::dataset::TrainingSet;
use crate::io::image::ImageCodec;
use crate::sampler::{DenoisingSampler, SamplerConfig};
use crate::tensor::ImageTensor;
use crate::trainer::{Trainer, TrainerConfig};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Default step count for new sessions, matching the demo binaries.
pub const DEFAULT_TIMESTEPS: usize = 10;

/// Per-session generator state shared by the sampler and the trainer.
///
/// One session lives for the duration of a generation/training run. The
/// sampler and trainer loops are sequential and never run concurrently
/// against the same session; the only field a caller may touch while a
/// loop is in flight is the stop flag, and `current_timestep` may be read
/// from anywhere for progress display. Both are atomics for exactly that
/// reason; everything else is single-owner.
pub struct GeneratorSession {
    timesteps: usize,
    current_timestep: AtomicUsize,
    stop_requested: AtomicBool,
    engine: Mutex<Option<SharedEngine>>,
}

impl GeneratorSession {
    /// Creates a session with a fixed total step count.
    pub fn new(timesteps: usize) -> Self {
        assert!(timesteps > 0, "a session requires timesteps > 0");
        GeneratorSession {
            timesteps,
            current_timestep: AtomicUsize::new(0),
            stop_requested: AtomicBool::new(false),
            engine: Mutex::new(None),
        }
    }

    pub fn timesteps(&self) -> usize {
        self.timesteps
    }

    /// The timestep the running loop recorded last. Safe to read from any
    /// thread while a loop is in flight.
    pub fn current_timestep(&self) -> usize {
        self.current_timestep.load(Ordering::Relaxed)
    }

    pub(crate) fn set_current_timestep(&self, step: usize) {
        debug_assert!(step <= self.timesteps);
        self.current_timestep.store(step, Ordering::Relaxed);
    }

    /// Asks the sampling loop to stop at its next step boundary. The
    /// partially denoised image is still persisted; cancellation latency
    /// is at most one engine call. Training ignores this flag.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    /// Clears a previous stop request. The flag is not reset by the
    /// sampler itself, so a reused session must clear it explicitly.
    pub fn reset_stop(&self) {
        self.stop_requested.store(false, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// Installs the prediction engine. Idempotent: a session keeps the
    /// first engine it was given, so there is never a partially swapped
    /// instance observable mid-run.
    pub fn load_model(&self, engine: SharedEngine) {
        let mut slot = self.engine.lock().unwrap();
        if slot.is_none() {
            *slot = Some(engine);
            log::info!("prediction engine loaded");
        } else {
            log::debug!("prediction engine already loaded; keeping the existing instance");
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.engine.lock().unwrap().is_some()
    }

    /// The shared engine handle, or `ModelNotLoaded` if `load_model` has
    /// not run yet.
    pub fn engine(&self) -> Result<SharedEngine> {
        self.engine
            .lock()
            .unwrap()
            .as_ref()
            .cloned()
            .ok_or(GenError::ModelNotLoaded)
    }

    /// Runs a full sampling pass with the default sampler configuration.
    ///
    /// The prompt is accepted for interface compatibility but conditions
    /// nothing yet; the sampler logs that gap explicitly.
    pub fn generate_image(&self, prompt: &str, codec: &dyn ImageCodec) -> Result<ImageTensor> {
        DenoisingSampler::new(self, SamplerConfig::default()).run(prompt, codec)
    }

    /// Trains the loaded engine on (image path, description) pairs with
    /// the default trainer configuration. The two slices are paired by
    /// index and their lengths are deliberately not validated against
    /// each other.
    pub fn train(
        &self,
        paths: &[PathBuf],
        descriptions: &[String],
        codec: &dyn ImageCodec,
    ) -> Result<()> {
        self.train_examples(&TrainingSet::from_pairs(paths, descriptions), codec)
    }

    /// Trains the loaded engine on an already assembled training set.
    pub fn train_examples(&self, set: &TrainingSet, codec: &dyn ImageCodec) -> Result<()> {
        Trainer::new(self, TrainerConfig::default()).run(set, codec)
    }
}
