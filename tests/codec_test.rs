#![cfg(feature = "vision")]

use diffusion_gen::{FileImageCodec, ImageCodec, ImageTensor};
use ndarray::Array3;

#[test]
fn rgba_source_drops_alpha_and_normalizes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("input.png");
    let mut img = image::RgbaImage::new(2, 2);
    for y in 0..2 {
        for x in 0..2 {
            img.put_pixel(x, y, image::Rgba([10, 200, 50, 255]));
        }
    }
    img.save(&path).expect("save fixture");

    let codec = FileImageCodec::new(2, 2);
    let tensor = codec.load(&path).expect("load");
    assert_eq!(tensor.shape(), (2, 2, 3));
    let expected = [10.0 / 255.0, 200.0 / 255.0, 50.0 / 255.0];
    for y in 0..2 {
        for x in 0..2 {
            for c in 0..3 {
                let v = tensor.data()[[y, x, c]];
                assert!(
                    (v - expected[c]).abs() < 1e-6,
                    "pixel ({}, {}) channel {}: {} != {}",
                    y,
                    x,
                    c,
                    v,
                    expected[c]
                );
            }
        }
    }
}

#[test]
fn save_then_load_reproduces_quantized_values() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("roundtrip.png");
    // every value is an exact k/255 intensity, so quantization is lossless
    let tensor = ImageTensor::new(Array3::from_shape_fn((3, 3, 3), |(y, x, c)| {
        ((y * 9 + x * 3 + c) as f32) / 255.0
    }));

    let codec = FileImageCodec::new(3, 3);
    codec.save(&tensor, &path).expect("save");
    let reloaded = codec.load(&path).expect("load");

    assert_eq!(reloaded.shape(), tensor.shape());
    for (a, b) in reloaded.data().iter().zip(tensor.data().iter()) {
        assert!((a - b).abs() < 1e-6, "{} != {}", a, b);
    }
}

#[test]
fn save_creates_missing_parent_dirs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("dirs").join("out.png");
    let codec = FileImageCodec::new(2, 2);
    codec.save(&ImageTensor::zeros(2, 2), &path).expect("save");
    assert!(path.exists());
}

#[test]
fn load_resizes_to_the_codec_shape() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("large.png");
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([128, 128, 128]));
    img.save(&path).expect("save fixture");

    let codec = FileImageCodec::new(4, 4);
    let tensor = codec.load(&path).expect("load");
    assert_eq!(tensor.shape(), (4, 4, 3));
}

#[test]
fn load_missing_file_is_an_error() {
    let codec = FileImageCodec::new(2, 2);
    assert!(codec
        .load(std::path::Path::new("definitely/not/here.png"))
        .is_err());
}
