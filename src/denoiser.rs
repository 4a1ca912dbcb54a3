use crate::engine::{FitBatch, PredictionEngine};
use crate::tensor::{ImageTensor, CHANNELS};
use ndarray::{s, Array4};

/// Parameters of the reference denoiser: one (image weight, noise weight,
/// bias) triple per color channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DenoiserParams {
    pub w_image: [f32; CHANNELS],
    pub w_noise: [f32; CHANNELS],
    pub bias: [f32; CHANNELS],
}

impl Default for DenoiserParams {
    /// An even blend of image and noise, which fit has to unlearn.
    fn default() -> Self {
        DenoiserParams {
            w_image: [0.5; CHANNELS],
            w_noise: [0.5; CHANNELS],
            bias: [0.0; CHANNELS],
        }
    }
}

/// Minimal built-in [`PredictionEngine`]: a per-channel affine blend
/// `out = w_image * image + w_noise * noise + bias`, trained by one
/// closed-form MSE gradient step per `fit` call.
///
/// This is a stand-in backend so the pipeline can run end to end without
/// an external model; it has no spatial structure and ignores the
/// timestep input. Predictions are clamped into `[0, 1]`.
pub struct AffineDenoiser {
    params: DenoiserParams,
    lr: f32,
}

impl AffineDenoiser {
    pub fn new(lr: f32) -> Self {
        AffineDenoiser {
            params: DenoiserParams::default(),
            lr,
        }
    }

    pub fn with_parameters(params: DenoiserParams, lr: f32) -> Self {
        AffineDenoiser { params, lr }
    }

    pub fn parameters(&self) -> DenoiserParams {
        self.params
    }

    pub fn set_parameters(&mut self, params: DenoiserParams) {
        self.params = params;
    }

    pub fn learning_rate(&self) -> f32 {
        self.lr
    }
}

impl PredictionEngine for AffineDenoiser {
    fn predict(
        &self,
        image: &ImageTensor,
        noise: &ImageTensor,
        _step: usize,
    ) -> Result<ImageTensor, String> {
        if image.shape() != noise.shape() {
            return Err(format!(
                "predict expects matching shapes, got image {:?} vs noise {:?}",
                image.shape(),
                noise.shape()
            ));
        }
        let mut out = image.data().clone();
        for c in 0..CHANNELS {
            let img_c = image.data().slice(s![.., .., c]);
            let noise_c = noise.data().slice(s![.., .., c]);
            let blended = &img_c * self.params.w_image[c]
                + &noise_c * self.params.w_noise[c]
                + self.params.bias[c];
            out.slice_mut(s![.., .., c]).assign(&blended);
        }
        out.mapv_inplace(|v| v.clamp(0.0, 1.0));
        Ok(ImageTensor::new(out))
    }

    fn fit(&mut self, batch: &FitBatch, targets: &Array4<f32>) -> Result<f32, String> {
        let x = &batch.noisy;
        let n = &batch.noise;
        if x.shape() != targets.shape() || n.shape() != x.shape() {
            return Err(format!(
                "fit expects matching batch shapes, got noisy {:?}, noise {:?}, targets {:?}",
                x.shape(),
                n.shape(),
                targets.shape()
            ));
        }
        if x.shape()[3] != CHANNELS {
            return Err(format!(
                "fit expects {} channels, got {}",
                CHANNELS,
                x.shape()[3]
            ));
        }
        if batch.steps.len() != x.shape()[0] {
            return Err(format!(
                "fit expects one timestep scalar per batch element, got {} for batch of {}",
                batch.steps.len(),
                x.shape()[0]
            ));
        }

        let mut total_sq = 0.0f64;
        let mut count = 0usize;
        for c in 0..CHANNELS {
            let xc = x.slice(s![.., .., .., c]);
            let nc = n.slice(s![.., .., .., c]);
            let yc = targets.slice(s![.., .., .., c]);
            let pred = &xc * self.params.w_image[c]
                + &nc * self.params.w_noise[c]
                + self.params.bias[c];
            let resid = pred - &yc;
            let m = resid.len() as f32;

            // Closed-form gradients of mean((pred - y)^2) in the three
            // per-channel parameters.
            let g_w_image = 2.0 * (&resid * &xc).sum() / m;
            let g_w_noise = 2.0 * (&resid * &nc).sum() / m;
            let g_bias = 2.0 * resid.sum() / m;

            total_sq += resid.iter().map(|v| (*v as f64) * (*v as f64)).sum::<f64>();
            count += resid.len();

            self.params.w_image[c] -= self.lr * g_w_image;
            self.params.w_noise[c] -= self.lr * g_w_noise;
            self.params.bias[c] -= self.lr * g_bias;
        }
        Ok((total_sq / count as f64) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array3};

    fn constant_image(v: f32) -> ImageTensor {
        ImageTensor::new(Array3::from_elem((4, 4, CHANNELS), v))
    }

    #[test]
    fn predict_stays_in_unit_range() {
        let engine = AffineDenoiser::new(0.05);
        let image = constant_image(0.9);
        let noise = ImageTensor::new(Array3::from_elem((4, 4, CHANNELS), 3.0));
        let out = engine.predict(&image, &noise, 7).expect("predict");
        assert!(out.data().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn predict_rejects_shape_mismatch() {
        let engine = AffineDenoiser::new(0.05);
        let image = constant_image(0.5);
        let noise = ImageTensor::zeros(2, 2);
        assert!(engine.predict(&image, &noise, 1).is_err());
    }

    #[test]
    fn fit_reduces_loss_on_fixed_batch() {
        let mut engine = AffineDenoiser::new(0.05);
        let clean = vec![constant_image(0.2), constant_image(0.8)];
        let targets = ImageTensor::stack(&clean).expect("stack");
        let batch = FitBatch {
            // step-zero corruption: the noisy inputs are the clean images
            noisy: targets.clone(),
            noise: Array4::from_elem((2, 4, 4, CHANNELS), 0.3),
            steps: Array1::from_elem(2, 0.0),
        };
        let first = engine.fit(&batch, &targets).expect("fit");
        let mut last = first;
        for _ in 0..50 {
            last = engine.fit(&batch, &targets).expect("fit");
        }
        assert!(
            last < first,
            "repeated fit on the same batch must reduce loss: {} -> {}",
            first,
            last
        );
    }

    #[test]
    fn fit_rejects_mismatched_targets() {
        let mut engine = AffineDenoiser::new(0.05);
        let batch = FitBatch {
            noisy: Array4::zeros((1, 4, 4, CHANNELS)),
            noise: Array4::zeros((1, 4, 4, CHANNELS)),
            steps: Array1::zeros(1),
        };
        let targets = Array4::zeros((2, 4, 4, CHANNELS));
        assert!(engine.fit(&batch, &targets).is_err());
    }
}
