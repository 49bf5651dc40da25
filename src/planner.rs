//! Output resolution planning.

use crate::{
    error::ValidationError,
    models::{AspectRatioChoice, Orientation, ResolvedSize},
};

/// Smallest pixel budget the edit endpoints accept.
pub const MIN_PIXELS: i64 = 921_600;

/// Long side used when none (or garbage) is given.
pub const DEFAULT_LONG_SIDE: i64 = 4096;

/// (label, ratio width, ratio height). Entry `i` of one table is the
/// orientation-flipped counterpart of entry `i` of the other.
const PORTRAIT_RATIOS: &[(&str, u32, u32)] = &[
    ("1:1", 1, 1),
    ("3:4", 3, 4),
    ("4:5", 4, 5),
    ("2:3", 2, 3),
    ("9:16", 9, 16),
    ("16:9", 16, 9),
];

const LANDSCAPE_RATIOS: &[(&str, u32, u32)] = &[
    ("1:1", 1, 1),
    ("4:3", 4, 3),
    ("5:4", 5, 4),
    ("3:2", 3, 2),
    ("16:9", 16, 9),
    ("9:16", 9, 16),
];

fn ratio_table(orientation: Orientation) -> &'static [(&'static str, u32, u32)] {
    match orientation {
        Orientation::Portrait => PORTRAIT_RATIOS,
        Orientation::Landscape => LANDSCAPE_RATIOS,
    }
}

/// Ratio buttons available for `orientation`, in display order.
pub fn ratio_choices(orientation: Orientation) -> Vec<AspectRatioChoice> {
    ratio_table(orientation)
        .iter()
        .map(|&(label, ratio_width, ratio_height)| AspectRatioChoice {
            label: label.to_string(),
            ratio_width,
            ratio_height,
            orientation,
        })
        .collect()
}

pub fn ratio_at(orientation: Orientation, index: usize) -> Option<AspectRatioChoice> {
    ratio_choices(orientation).into_iter().nth(index)
}

/// Index of `label` in the table for `orientation`.
pub fn find_ratio(orientation: Orientation, label: &str) -> Option<usize> {
    let label = label.trim();
    ratio_table(orientation)
        .iter()
        .position(|(candidate, _, _)| *candidate == label)
}

/// Maps the larger ratio component to the long side and scales the other.
/// Width wins ties.
pub fn compute_size(ratio_width: u32, ratio_height: u32, long_side: &str) -> ResolvedSize {
    let long = effective_long_side(long_side);
    let (rw, rh) = (ratio_width as f64, ratio_height as f64);

    if ratio_width >= ratio_height {
        let height = (long as f64 * rh / rw).round() as i64;
        ResolvedSize::new(long, height)
    } else {
        let width = (long as f64 * rw / rh).round() as i64;
        ResolvedSize::new(width, long)
    }
}

pub fn compute_size_for(choice: &AspectRatioChoice, long_side: &str) -> ResolvedSize {
    compute_size(choice.ratio_width, choice.ratio_height, long_side)
}

pub fn effective_long_side(long_side: &str) -> i64 {
    match parse_leading_int(long_side) {
        Some(value) if value > 0 => value,
        _ => DEFAULT_LONG_SIDE,
    }
}

/// Rejects sizes whose parsed pixel count is below [`MIN_PIXELS`].
///
/// A size that does not parse as `w*h` is let through; this check only
/// enforces the pixel budget.
pub fn validate_min_pixels(size: &str) -> Result<(), ValidationError> {
    match parse_size(size) {
        Some(resolved) if resolved.pixels() < MIN_PIXELS => Err(ValidationError::SizeTooSmall {
            pixels: resolved.pixels(),
        }),
        _ => Ok(()),
    }
}

/// Parses `"w*h"`. Each side is read as a leading integer, so `"1024px*768"`
/// parses while `"x*768"` does not.
pub fn parse_size(size: &str) -> Option<ResolvedSize> {
    let mut parts = size.split('*');
    let width = parse_leading_int(parts.next()?)?;
    let height = parse_leading_int(parts.next()?)?;
    Some(ResolvedSize::new(width, height))
}

/// Leading-integer parse: optional whitespace, optional sign, then digits.
/// Anything after the digits is ignored.
fn parse_leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    let magnitude = rest[..digits_end].parse::<i64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
