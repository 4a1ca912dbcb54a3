//! Runs one sampling session with the built-in denoiser and writes the
//! result to the fixed output location.
//!
//! Usage: `sample [prompt] [timesteps]`

use diffusion_gen::{AffineDenoiser, FileImageCodec, GeneratorSession, DEFAULT_TIMESTEPS};
use std::sync::{Arc, Mutex};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let prompt = args.next().unwrap_or_else(|| "an untitled scene".to_string());
    let timesteps = args
        .next()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_TIMESTEPS);

    let session = GeneratorSession::new(timesteps);
    session.load_model(Arc::new(Mutex::new(AffineDenoiser::new(0.05))));
    let codec = FileImageCodec::new(256, 256);

    match session.generate_image(&prompt, &codec) {
        Ok(image) => {
            let (h, w, c) = image.shape();
            println!("sampled image: {}x{}x{}", h, w, c);
        }
        Err(e) => {
            eprintln!("sampling failed: {}", e);
            std::process::exit(1);
        }
    }
}
