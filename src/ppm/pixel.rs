//! In-memory pixel grid.

use image::RgbImage;
use serde::{Deserialize, Serialize};

use super::{MAGIC, MAX_COLOR_VALUE};

/// One RGB pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for image::Rgb<u8> {
    fn from(px: Rgb) -> Self {
        image::Rgb([px.r, px.g, px.b])
    }
}

/// Width x height grid of pixels stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl PixelGrid {
    /// Build a grid from row-major pixels. Returns `None` if the pixel count
    /// does not match the dimensions.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgb>) -> Option<Self> {
        let expected = (width as usize).checked_mul(height as usize)?;
        (pixels.len() == expected).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// A grid filled with one color.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn set(&mut self, x: u32, y: u32, color: Rgb) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.pixels[index] = color;
        true
    }

    /// Pixels of row `y`.
    pub fn row(&self, y: u32) -> Option<&[Rgb]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.width as usize;
        Some(&self.pixels[start..start + self.width as usize])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Rgb]> {
        // chunks(0) panics; a zero-width grid has no visible rows.
        self.pixels.chunks(self.width.max(1) as usize)
    }

    /// Copy into an `image` buffer for display or re-encoding.
    pub fn to_rgb_image(&self) -> RgbImage {
        let width = self.width as usize;
        RgbImage::from_fn(self.width, self.height, |x, y| {
            self.pixels[y as usize * width + x as usize].into()
        })
    }

    /// Encode as P3 text: three header lines, then one line per row.
    pub fn encode(&self) -> String {
        let mut out = format!(
            "{}\n{} {}\n{}\n",
            MAGIC, self.width, self.height, MAX_COLOR_VALUE
        );
        for row in self.rows() {
            let line = row
                .iter()
                .map(|px| format!("{} {} {}", px.r, px.g, px.b))
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}
