//! Trains the built-in denoiser from a tab-separated manifest of
//! `<image_path>\t<description>` lines.
//!
//! Usage: `train <manifest> [timesteps]`

use diffusion_gen::{AffineDenoiser, FileImageCodec, GeneratorSession, TrainingSet, DEFAULT_TIMESTEPS};
use std::sync::{Arc, Mutex};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let manifest = match args.next() {
        Some(m) => m,
        None => {
            eprintln!("usage: train <manifest> [timesteps]");
            std::process::exit(2);
        }
    };
    let timesteps = args
        .next()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_TIMESTEPS);

    let set = match TrainingSet::from_manifest(&manifest) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("training failed: {}", e);
            std::process::exit(1);
        }
    };

    let session = GeneratorSession::new(timesteps);
    session.load_model(Arc::new(Mutex::new(AffineDenoiser::new(0.05))));
    let codec = FileImageCodec::new(256, 256);

    if let Err(e) = session.train_examples(&set, &codec) {
        eprintln!("training failed: {}", e);
        std::process::exit(1);
    }
}
