//! Engine parameter persistence as f32 safetensors files.

use crate::denoiser::{AffineDenoiser, DenoiserParams};
use crate::error::{GenError, Result};
use crate::tensor::CHANNELS;
use safetensors::tensor::{Dtype, TensorView};
use safetensors::SafeTensors;
use std::path::Path;

const KEY_W_IMAGE: &str = "w_image";
const KEY_W_NOISE: &str = "w_noise";
const KEY_BIAS: &str = "bias";

/// Writes the denoiser's parameters to `path`, overwriting any existing
/// file.
pub fn save_denoiser(denoiser: &AffineDenoiser, path: &Path) -> Result<()> {
    let params = denoiser.parameters();
    let buffers: Vec<(&str, Vec<u8>)> = vec![
        (KEY_W_IMAGE, to_le_bytes(&params.w_image)),
        (KEY_W_NOISE, to_le_bytes(&params.w_noise)),
        (KEY_BIAS, to_le_bytes(&params.bias)),
    ];
    let mut views = Vec::with_capacity(buffers.len());
    for (name, bytes) in buffers.iter() {
        let view = TensorView::new(Dtype::F32, vec![CHANNELS], bytes)
            .map_err(|e| GenError::Weights(format!("building tensor '{}': {}", name, e)))?;
        views.push((name.to_string(), view));
    }
    safetensors::serialize_to_file(views, &None, path)
        .map_err(|e| GenError::Weights(format!("safetensors serialize error: {}", e)))
}

/// Reads denoiser parameters back from `path` and builds an engine with
/// the given learning rate.
pub fn load_denoiser(path: &Path, lr: f32) -> Result<AffineDenoiser> {
    let bytes = std::fs::read(path)
        .map_err(|e| GenError::Weights(format!("failed to read {}: {}", path.display(), e)))?;
    let st = SafeTensors::deserialize(&bytes)
        .map_err(|e| GenError::Weights(format!("safetensors deserialize error: {}", e)))?;
    let params = DenoiserParams {
        w_image: read_channels(&st, KEY_W_IMAGE)?,
        w_noise: read_channels(&st, KEY_W_NOISE)?,
        bias: read_channels(&st, KEY_BIAS)?,
    };
    Ok(AffineDenoiser::with_parameters(params, lr))
}

fn to_le_bytes(values: &[f32; CHANNELS]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn read_channels(st: &SafeTensors, key: &str) -> Result<[f32; CHANNELS]> {
    let tensor = st
        .tensor(key)
        .map_err(|e| GenError::Weights(format!("missing tensor '{}': {}", key, e)))?;
    if tensor.dtype() != Dtype::F32 {
        return Err(GenError::Weights(format!(
            "tensor '{}' must be f32, got {:?}",
            key,
            tensor.dtype()
        )));
    }
    if tensor.shape() != [CHANNELS] {
        return Err(GenError::Weights(format!(
            "tensor '{}' must have shape [{}], got {:?}",
            key,
            CHANNELS,
            tensor.shape()
        )));
    }
    let data = tensor.data();
    let mut out = [0.0f32; CHANNELS];
    for (i, chunk) in data.chunks_exact(4).enumerate() {
        let mut b = [0u8; 4];
        b.copy_from_slice(chunk);
        out[i] = f32::from_le_bytes(b);
    }
    Ok(out)
}
