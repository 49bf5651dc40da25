use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// On-screen bounding rectangle, as reported by the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// `point` relative to this rectangle's top-left corner.
    pub fn relative(&self, point: Point) -> Point {
        Point::new(point.x - self.left, point.y - self.top)
    }
}

/// Pointer position tracked over the enlarged image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LensState {
    pub container: Point,
    pub image: Point,
    pub active: bool,
}

/// Everything a renderer needs to draw the lens overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LensGeometry {
    pub lens_left: f64,
    pub lens_top: f64,
    pub lens_size: f64,
    pub background_width: f64,
    pub background_height: f64,
    pub background_x: f64,
    pub background_y: f64,
}
