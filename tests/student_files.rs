//! Integration tests for reading and writing student files
//!
//! These tests exercise the public file entry points against real files in a
//! temporary directory.

use std::fs::{self, OpenOptions};

use cs1_support::ppm::{self, PixelGrid, PpmError, Rgb};
use cs1_support::quota::{open_limited, QuotaConfig, QuotaError};
use tempfile::TempDir;

const SMILEY: &str = "P3
3 2
255
255 255 0 0 0 0 255 255 0
0 0 0 255 255 0 0 0 0
";

#[test]
fn test_read_ppm_strict_from_file() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("smiley.ppm");
    fs::write(&path, SMILEY).expect("write");

    let grid = ppm::read_ppm_strict(&path).expect("decode");

    assert_eq!((grid.width(), grid.height()), (3, 2));
    assert_eq!(grid.get(0, 0), Some(Rgb::new(255, 255, 0)));
    assert_eq!(grid.get(1, 1), Some(Rgb::new(255, 255, 0)));
    assert_eq!(ppm::read_ppm(&path).expect("fast decode"), grid);
}

#[test]
fn test_missing_file_is_io_error() {
    let temp_dir = TempDir::new().expect("temp dir");
    let result = ppm::read_ppm(temp_dir.path().join("nope.ppm"));
    assert!(matches!(result, Err(PpmError::Io(_))));
}

#[test]
fn test_written_ppm_reads_back() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("gradient.ppm");
    let pixels = (0..16u8).map(|i| Rgb::new(i * 16, 255 - i * 16, i)).collect();
    let grid = PixelGrid::from_pixels(4, 4, pixels).expect("grid");

    ppm::write_ppm(&grid, &path).expect("write");

    assert_eq!(ppm::validate_file(&path).expect("valid").width, 4);
    assert_eq!(ppm::read_ppm_strict(&path).expect("decode"), grid);
}

#[test]
fn test_save_png() {
    let temp_dir = TempDir::new().expect("temp dir");
    let grid = ppm::decode_strict(SMILEY).expect("decode");
    let path = temp_dir.path().join("smiley.png");

    ppm::save_png(&grid, &path).expect("save");

    let bytes = fs::read(&path).expect("read");
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn test_ppm_written_through_quota_writer() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("out.ppm");
    let grid = PixelGrid::filled(2, 2, Rgb::WHITE);
    let encoded = grid.encode();

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    let mut writer = open_limited(&path, &options, &QuotaConfig::new(encoded.len() as i64))
        .expect("open");
    writer.write_str(&encoded).expect("write");
    let err = writer.write_str("\n").unwrap_err();
    assert!(matches!(err, QuotaError::QuotaExceeded { .. }));
    writer.close().expect("close");

    assert_eq!(ppm::read_ppm_strict(&path).expect("decode"), grid);
}
