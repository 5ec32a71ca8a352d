//! Test utilities for Saanra
//!
//! Temporary storage and in-memory image fixtures shared by unit tests.

use crate::attachment::AttachedImage;
use crate::storage::SqliteStorage;
use image::{DynamicImage, Rgb, RgbImage};
use std::io::Cursor;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a storage instance backed by a fresh temporary directory
///
/// The returned `TempDir` must outlive the storage.
pub fn temp_storage() -> (SqliteStorage, TempDir) {
    let dir = temp_dir();
    let storage = SqliteStorage::new_with_path(dir.path().join("chat.db"))
        .expect("Failed to create storage");
    (storage, dir)
}

/// Encode a solid-colour image of the given size
pub fn encoded_image(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 10, 10]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("Failed to encode test image");
    bytes
}

/// A tiny PNG attachment ready to send to a provider
pub fn png_attachment() -> AttachedImage {
    AttachedImage::from_bytes("dot.png", encoded_image(2, 2, image::ImageFormat::Png), 600)
        .expect("Failed to build test attachment")
}
