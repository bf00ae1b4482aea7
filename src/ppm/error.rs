use std::io;

use thiserror::Error;

/// Errors raised while decoding or validating a PPM image.
///
/// Content line numbers count from 0 at the first line after the three
/// header lines; messages also give the 1-based line in the file.
#[derive(Error, Debug)]
pub enum PpmError {
    /// First line is not the expected magic token.
    #[error("Bad header: expected '{expected}' on line 1, found '{found}'")]
    BadHeader { expected: &'static str, found: String },

    /// Second line is not exactly two integers.
    #[error("Bad dimensions: expected 'width height' on line 2, found '{found}'")]
    BadDimensions { found: String },

    /// Third line is not the expected max color value.
    #[error("Bad color depth: expected '{expected}' on line 3, found '{found}'")]
    BadColorDepth { expected: &'static str, found: String },

    /// A content line has the wrong number of values.
    #[error(
        "Row {line} (file line {}) has {actual} values, expected {expected} (width x 3)",
        .line + 4
    )]
    RowWidthMismatch {
        line: usize,
        expected: usize,
        actual: usize,
    },

    /// A value is not an integer in 0..=255.
    #[error(
        "Bad pixel value '{token}' on row {line} (file line {}): values must be integers from 0 to 255",
        .line + 4
    )]
    BadPixelValue { token: String, line: usize },

    /// The number of content lines differs from the declared height.
    #[error("Image has {actual} rows, expected {expected} (height)")]
    RowCountMismatch { expected: usize, actual: usize },

    /// The flat value count differs from width x height x 3.
    #[error(
        "Incorrect image dimensions, expected {expected} ({width} x {height} x 3) RGB values, read {actual}"
    )]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        width: u32,
        height: u32,
    },

    /// A value could not be read as a color channel.
    #[error("Malformed pixel value '{token}' at value {index}")]
    MalformedPixel { token: String, index: usize },

    /// IO error reading the image.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error handing the image to the image encoder.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl PpmError {
    /// Stable label for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            PpmError::BadHeader { .. } => "bad_header",
            PpmError::BadDimensions { .. } => "bad_dimensions",
            PpmError::BadColorDepth { .. } => "bad_colordepth",
            PpmError::RowWidthMismatch { .. } => "row_width_mismatch",
            PpmError::BadPixelValue { .. } => "bad_pixel_value",
            PpmError::RowCountMismatch { .. } => "row_count_mismatch",
            PpmError::DimensionMismatch { .. } => "dimension_mismatch",
            PpmError::MalformedPixel { .. } => "malformed_pixel",
            PpmError::Io(_) => "io",
            PpmError::Image(_) => "image",
        }
    }
}

/// Result type for PPM operations.
pub type PpmResult<T> = Result<T, PpmError>;
