//! Strict line-by-line validation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::decode::decode_fast;
use super::error::{PpmError, PpmResult};
use super::pixel::PixelGrid;
use super::{MAGIC, MAX_COLOR_VALUE};

/// Header of a validated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PpmHeader {
    pub width: u32,
    pub height: u32,
}

/// Check that `text` is a well-formed P3 image without decoding it.
///
/// The layout must be exactly: `P3`, `width height`, `255`, then `height`
/// lines of `width * 3` decimal values from 0 to 255. Blank lines after the
/// last row are ignored. The input is never modified; the first problem found
/// is returned.
pub fn validate(text: &str) -> PpmResult<PpmHeader> {
    let mut lines = text.lines().map(str::trim_end);

    let magic = lines.next().unwrap_or_default();
    if magic != MAGIC {
        return Err(PpmError::BadHeader {
            expected: MAGIC,
            found: magic.to_string(),
        });
    }

    let dims_line = lines.next().unwrap_or_default();
    let header = parse_dimensions(dims_line).ok_or_else(|| PpmError::BadDimensions {
        found: dims_line.to_string(),
    })?;

    let depth = lines.next().unwrap_or_default();
    if depth != MAX_COLOR_VALUE {
        return Err(PpmError::BadColorDepth {
            expected: MAX_COLOR_VALUE,
            found: depth.to_string(),
        });
    }

    let expected_width = (header.width as usize)
        .checked_mul(3)
        .ok_or_else(|| PpmError::BadDimensions {
            found: dims_line.to_string(),
        })?;

    let mut rows: Vec<&str> = lines.collect();
    while rows.last().is_some_and(|line| line.trim().is_empty()) {
        rows.pop();
    }

    for (line, row) in rows.iter().enumerate() {
        let tokens: Vec<&str> = row.split_whitespace().collect();
        if tokens.len() != expected_width {
            return Err(PpmError::RowWidthMismatch {
                line,
                expected: expected_width,
                actual: tokens.len(),
            });
        }
        if let Some(bad) = tokens.iter().find(|token| !is_channel_value(token)) {
            return Err(PpmError::BadPixelValue {
                token: bad.to_string(),
                line,
            });
        }
    }

    if rows.len() != header.height as usize {
        return Err(PpmError::RowCountMismatch {
            expected: header.height as usize,
            actual: rows.len(),
        });
    }

    debug!(width = header.width, height = header.height, "validated ppm");
    Ok(header)
}

/// Validate, then decode with the fast path.
pub fn decode_strict(text: &str) -> PpmResult<PixelGrid> {
    validate(text)?;
    decode_fast(text)
}

fn parse_dimensions(line: &str) -> Option<PpmHeader> {
    let mut parts = line.split_whitespace();
    let width = parse_digits(parts.next()?)?;
    let height = parse_digits(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some(PpmHeader { width, height })
}

/// Parse a token made only of ASCII decimal digits.
pub(super) fn parse_digits(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn is_channel_value(token: &str) -> bool {
    parse_digits(token).is_some_and(|value| value < 256)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppm::Rgb;

    const BLACK_2X2: &str = "P3\n2 2\n255\n0 0 0 0 0 0\n0 0 0 0 0 0\n";

    #[test]
    fn test_well_formed_image() {
        let header = validate(BLACK_2X2).expect("valid");
        assert_eq!(header, PpmHeader { width: 2, height: 2 });

        let grid = decode_strict(BLACK_2X2).expect("decode");
        assert_eq!(grid, PixelGrid::filled(2, 2, Rgb::BLACK));
    }

    #[test]
    fn test_short_row_names_row_index() {
        let text = "P3\n2 2\n255\n0 0 0 0 0 0\n0 0 0 0 0\n";
        let err = validate(text).unwrap_err();

        assert!(matches!(
            err,
            PpmError::RowWidthMismatch {
                line: 1,
                expected: 6,
                actual: 5
            }
        ));
        assert!(err.to_string().contains("Row 1 (file line 5) has 5 values"));
    }

    #[test]
    fn test_out_of_range_value_names_token() {
        let text = "P3\n2 2\n255\n0 0 0 0 0 0\n0 300 0 0 0 0\n";
        let err = validate(text).unwrap_err();

        assert!(matches!(err, PpmError::BadPixelValue { ref token, line: 1 } if token == "300"));
        assert!(err.to_string().contains("'300'"));
    }

    #[test]
    fn test_non_digit_values_rejected() {
        for token in ["-1", "+5", "1.0", "0x10", "ab"] {
            let text = format!("P3\n1 1\n255\n0 {} 0\n", token);
            assert!(
                matches!(validate(&text), Err(PpmError::BadPixelValue { .. })),
                "accepted {}",
                token
            );
        }
    }

    #[test]
    fn test_bad_magic() {
        let err = validate("P6\n1 1\n255\n0 0 0\n").unwrap_err();
        assert!(matches!(err, PpmError::BadHeader { ref found, .. } if found == "P6"));

        assert!(matches!(validate(""), Err(PpmError::BadHeader { .. })));
    }

    #[test]
    fn test_bad_dimensions() {
        for dims in ["2", "2 2 2", "two 2", "-2 2", ""] {
            let text = format!("P3\n{}\n255\n", dims);
            assert!(
                matches!(validate(&text), Err(PpmError::BadDimensions { .. })),
                "accepted {:?}",
                dims
            );
        }
    }

    #[test]
    fn test_bad_color_depth() {
        let err = validate("P3\n1 1\n15\n0 0 0\n").unwrap_err();
        assert!(matches!(err, PpmError::BadColorDepth { ref found, .. } if found == "15"));
    }

    #[test]
    fn test_row_count_mismatch() {
        let text = "P3\n2 3\n255\n0 0 0 0 0 0\n0 0 0 0 0 0\n";
        assert!(matches!(
            validate(text),
            Err(PpmError::RowCountMismatch {
                expected: 3,
                actual: 2
            })
        ));

        let text = "P3\n2 1\n255\n0 0 0 0 0 0\n0 0 0 0 0 0\n";
        assert!(matches!(
            validate(text),
            Err(PpmError::RowCountMismatch {
                expected: 1,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_ragged_rows_rejected_even_with_right_total() {
        let text = "P3\n2 1\n255\n1 2\n3 4 5 6\n";
        assert!(decode_fast(text).is_ok());
        assert!(matches!(
            validate(text),
            Err(PpmError::RowWidthMismatch { line: 0, .. })
        ));
    }

    #[test]
    fn test_crlf_and_trailing_blank_lines() {
        let text = "P3\r\n1 1\r\n255\r\n1 2 3\r\n\r\n\n";
        assert_eq!(
            validate(text).expect("valid"),
            PpmHeader {
                width: 1,
                height: 1
            }
        );
    }

    #[test]
    fn test_blank_line_between_rows_is_a_row() {
        let text = "P3\n1 2\n255\n1 2 3\n\n4 5 6\n";
        assert!(matches!(
            validate(text),
            Err(PpmError::RowWidthMismatch {
                line: 1,
                actual: 0,
                ..
            })
        ));
    }
}
