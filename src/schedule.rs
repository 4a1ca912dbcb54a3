use crate::tensor::ImageTensor;

/// The noise schedule shared by training and sampling.
///
/// The mixing coefficient is `alpha(step) = 1 - step / timesteps`, so a
/// *higher* step index means a *noisier* state: `alpha(timesteps) = 0`
/// (pure noise) and `alpha(1) = 1 - 1/timesteps` (almost clean). Both
/// loops index into this exact relation; it must not be reordered or
/// renormalized.
#[derive(Clone, Copy, Debug)]
pub struct NoiseSchedule {
    timesteps: usize,
}

impl NoiseSchedule {
    pub fn new(timesteps: usize) -> Self {
        assert!(timesteps > 0, "noise schedule requires timesteps > 0");
        NoiseSchedule { timesteps }
    }

    pub fn timesteps(&self) -> usize {
        self.timesteps
    }

    /// Mixing coefficient for `step`. Valid for `0 <= step <= timesteps`;
    /// the training loop's legacy order genuinely evaluates `alpha(0) = 1`.
    pub fn alpha(&self, step: usize) -> f32 {
        1.0 - step as f32 / self.timesteps as f32
    }

    /// The noise share at `step`, `1 - alpha(step)`.
    pub fn complement_alpha(&self, step: usize) -> f32 {
        1.0 - self.alpha(step)
    }

    /// Forward corruption: blends a clean image with a noise tensor of the
    /// same shape, `image * alpha + noise * (1 - alpha)` element-wise.
    pub fn corrupt(&self, image: &ImageTensor, noise: &ImageTensor, step: usize) -> ImageTensor {
        let alpha = self.alpha(step);
        ImageTensor::new(image.data() * alpha + noise.data() * (1.0 - alpha))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn alpha_boundaries() {
        let schedule = NoiseSchedule::new(10);
        assert_eq!(schedule.alpha(10), 0.0);
        assert_eq!(schedule.alpha(1), 1.0 - 1.0 / 10.0);
        assert_eq!(schedule.alpha(0), 1.0);
    }

    #[test]
    fn alpha_matches_formula_across_range() {
        let timesteps = 30;
        let schedule = NoiseSchedule::new(timesteps);
        for step in 0..=timesteps {
            assert_eq!(
                schedule.alpha(step),
                1.0 - step as f32 / timesteps as f32,
                "step {}",
                step
            );
            assert_eq!(
                schedule.complement_alpha(step),
                1.0 - schedule.alpha(step),
                "step {}",
                step
            );
        }
    }

    #[test]
    fn corrupt_blends_elementwise() {
        let schedule = NoiseSchedule::new(10);
        let image = ImageTensor::new(Array3::from_elem((2, 2, 3), 1.0));
        let noise = ImageTensor::new(Array3::from_elem((2, 2, 3), 0.5));
        // alpha(5) = 0.5 exactly, so every element is 1.0*0.5 + 0.5*0.5
        let noisy = schedule.corrupt(&image, &noise, 5);
        assert!(noisy.data().iter().all(|v| *v == 0.75));
    }

    #[test]
    fn corrupt_at_step_zero_is_identity() {
        let schedule = NoiseSchedule::new(10);
        let image = ImageTensor::new(Array3::from_elem((2, 2, 3), 0.25));
        let noise = ImageTensor::randn(2, 2);
        let noisy = schedule.corrupt(&image, &noise, 0);
        assert_eq!(noisy, image);
    }

    #[test]
    fn corrupt_at_final_step_is_pure_noise() {
        let schedule = NoiseSchedule::new(10);
        let image = ImageTensor::new(Array3::from_elem((2, 2, 3), 0.25));
        let noise = ImageTensor::new(Array3::from_elem((2, 2, 3), 0.9));
        let noisy = schedule.corrupt(&image, &noise, 10);
        assert_eq!(noisy, noise);
    }
}
