//! Single-pass decoder for well-formed input.

use tracing::debug;

use super::error::{PpmError, PpmResult};
use super::pixel::{PixelGrid, Rgb};
use super::validate::parse_digits;

const HEADER_TOKENS: usize = 4;

/// Decode P3 text assuming it is well formed.
///
/// Only the token count and channel values are checked. The magic and max
/// color tokens are skipped, and line structure is ignored, so ragged rows
/// with the right total count decode without complaint. Run
/// [`validate`](super::validate) first for untrusted input.
pub fn decode_fast(text: &str) -> PpmResult<PixelGrid> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < HEADER_TOKENS {
        return Err(PpmError::BadDimensions {
            found: tokens.join(" "),
        });
    }

    let (width, height) = match (parse_digits(tokens[1]), parse_digits(tokens[2])) {
        (Some(w), Some(h)) => (w, h),
        _ => {
            return Err(PpmError::BadDimensions {
                found: format!("{} {}", tokens[1], tokens[2]),
            })
        }
    };

    let values = &tokens[HEADER_TOKENS..];
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .unwrap_or(usize::MAX);
    if values.len() != expected {
        return Err(PpmError::DimensionMismatch {
            expected,
            actual: values.len(),
            width,
            height,
        });
    }

    let mut channels = Vec::with_capacity(values.len());
    for (index, token) in values.iter().enumerate() {
        let value = token.parse::<u8>().map_err(|_| PpmError::MalformedPixel {
            token: token.to_string(),
            index,
        })?;
        channels.push(value);
    }

    let pixels = channels
        .chunks_exact(3)
        .map(|c| Rgb::new(c[0], c[1], c[2]))
        .collect();

    debug!(width, height, "decoded ppm");
    PixelGrid::from_pixels(width, height, pixels).ok_or(PpmError::DimensionMismatch {
        expected,
        actual: values.len(),
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_two_by_two() {
        let text = "P3\n2 2\n255\n255 0 0 0 255 0\n0 0 255 10 20 30\n";
        let grid = decode_fast(text).expect("decode");

        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.get(0, 0), Some(Rgb::new(255, 0, 0)));
        assert_eq!(grid.get(1, 0), Some(Rgb::new(0, 255, 0)));
        assert_eq!(grid.get(0, 1), Some(Rgb::new(0, 0, 255)));
        assert_eq!(grid.get(1, 1), Some(Rgb::new(10, 20, 30)));
    }

    #[test]
    fn test_round_trip_through_encode() {
        let mut grid = PixelGrid::filled(3, 2, Rgb::new(9, 8, 7));
        grid.set(2, 0, Rgb::WHITE);
        grid.set(0, 1, Rgb::new(0, 128, 255));

        let decoded = decode_fast(&grid.encode()).expect("decode");
        assert_eq!(decoded, grid);
    }

    #[test]
    fn test_ragged_lines_are_accepted() {
        let text = "P3 2 1 255 1 2\n3 4 5\n6";
        let grid = decode_fast(text).expect("decode");
        assert_eq!(grid.get(1, 0), Some(Rgb::new(4, 5, 6)));
    }

    #[test]
    fn test_wrong_value_count() {
        let text = "P3\n2 2\n255\n0 0 0 0 0 0\n0 0 0 0 0\n";
        let err = decode_fast(text).unwrap_err();

        assert!(matches!(
            err,
            PpmError::DimensionMismatch {
                expected: 12,
                actual: 11,
                width: 2,
                height: 2
            }
        ));
        assert!(err.to_string().contains("expected 12 (2 x 2 x 3) RGB values, read 11"));
    }

    #[test]
    fn test_non_integer_value() {
        let text = "P3\n1 1\n255\n0 x 0\n";
        let err = decode_fast(text).unwrap_err();
        assert!(matches!(err, PpmError::MalformedPixel { ref token, index: 1 } if token == "x"));
    }

    #[test]
    fn test_out_of_range_value() {
        let text = "P3\n1 1\n255\n0 0 256\n";
        assert!(matches!(
            decode_fast(text),
            Err(PpmError::MalformedPixel { index: 2, .. })
        ));
    }

    #[test]
    fn test_short_header() {
        assert!(matches!(
            decode_fast("P3\n2"),
            Err(PpmError::BadDimensions { .. })
        ));
        assert!(matches!(
            decode_fast("P3\ntwo 2\n255\n"),
            Err(PpmError::BadDimensions { .. })
        ));
    }

    #[test]
    fn test_signed_dimensions_rejected_like_strict_path() {
        let text = "P3\n+1 1\n255\n0 0 0\n";
        assert!(matches!(
            decode_fast(text),
            Err(PpmError::BadDimensions { ref found }) if found == "+1 1"
        ));
        assert!(matches!(
            crate::ppm::validate(text),
            Err(PpmError::BadDimensions { .. })
        ));
    }
}
