pub mod dataset;
pub mod image;

#[cfg(feature = "safe_tensors")]
pub mod weights;
