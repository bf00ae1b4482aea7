//! Plain-text PPM (P3) image loading.
//!
//! Two decoders are provided:
//! - [`decode_fast`]: one pass over the whitespace tokens, trusting the line
//!   layout. Used for images the course ships.
//! - [`decode_strict`]: runs [`validate`] first, which checks the header, every
//!   row's width and every value, and reports the first offending line.
//!   Used for student-made files.
//!
//! # Example
//!
//! ```ignore
//! use cs1_support::ppm;
//!
//! let grid = ppm::read_ppm_strict("smiley.ppm")?;
//! ppm::save_png(&grid, "smiley.png")?;
//! ```

mod decode;
mod error;
mod pixel;
mod validate;

use std::fs;
use std::path::Path;

use image::ImageFormat;
use tracing::debug;

pub use decode::decode_fast;
pub use error::{PpmError, PpmResult};
pub use pixel::{PixelGrid, Rgb};
pub use validate::{decode_strict, validate, PpmHeader};

/// Magic token on the first line.
pub const MAGIC: &str = "P3";

/// The only accepted max color value.
pub const MAX_COLOR_VALUE: &str = "255";

/// Read and decode an image file with the fast decoder.
pub fn read_ppm(path: impl AsRef<Path>) -> PpmResult<PixelGrid> {
    let text = fs::read_to_string(path.as_ref())?;
    decode_fast(&text)
}

/// Read, validate and decode an image file.
pub fn read_ppm_strict(path: impl AsRef<Path>) -> PpmResult<PixelGrid> {
    let text = fs::read_to_string(path.as_ref())?;
    decode_strict(&text)
}

/// Validate an image file without decoding it.
pub fn validate_file(path: impl AsRef<Path>) -> PpmResult<PpmHeader> {
    let text = fs::read_to_string(path.as_ref())?;
    validate(&text)
}

/// Write a grid as a P3 text file.
pub fn write_ppm(grid: &PixelGrid, path: impl AsRef<Path>) -> PpmResult<()> {
    fs::write(path.as_ref(), grid.encode())?;
    Ok(())
}

/// Save a grid as PNG.
pub fn save_png(grid: &PixelGrid, path: impl AsRef<Path>) -> PpmResult<()> {
    let path = path.as_ref();
    grid.to_rgb_image().save_with_format(path, ImageFormat::Png)?;
    debug!(path = %path.display(), "saved png");
    Ok(())
}
