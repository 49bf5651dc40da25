use serde::{Deserialize, Serialize};
use std::fmt;

use super::common::Orientation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectRatioChoice {
    pub label: String,
    pub ratio_width: u32,
    pub ratio_height: u32,
    pub orientation: Orientation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSize {
    pub width: i64,
    pub height: i64,
}

impl ResolvedSize {
    pub fn new(width: i64, height: i64) -> Self {
        Self { width, height }
    }

    pub fn pixels(&self) -> i64 {
        self.width.saturating_mul(self.height)
    }

    pub fn long_side(&self) -> i64 {
        self.width.max(self.height)
    }
}

impl fmt::Display for ResolvedSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}*{}", self.width, self.height)
    }
}
