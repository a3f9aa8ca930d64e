//! In-memory image fixtures shared by the integration tests.

#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;

pub fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8])
    }))
}

pub fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(gradient(width, height), ImageFormat::Png)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(gradient(width, height), ImageFormat::Jpeg)
}

pub fn webp(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgba8(gradient(width, height).to_rgba8()), ImageFormat::WebP)
}

pub fn gif(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgba8(gradient(width, height).to_rgba8()), ImageFormat::Gif)
}

/// Decode a `data:<type>;base64,<payload>` URL into its media type and bytes.
pub fn decode_data_url(url: &str) -> (String, Vec<u8>) {
    use base64::Engine;
    let rest = url.strip_prefix("data:").expect("data: prefix");
    let (media_type, payload) = rest.split_once(";base64,").expect("base64 marker");
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .expect("valid base64");
    (media_type.to_string(), bytes)
}

/// Format and dimensions of encoded bytes, as the decoder sees them.
pub fn probe(bytes: &[u8]) -> (ImageFormat, u32, u32) {
    let format = image::guess_format(bytes).expect("recognizable image");
    let img = image::load_from_memory_with_format(bytes, format).expect("decodable image");
    (format, img.width(), img.height())
}
