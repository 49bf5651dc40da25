//! Zoom lens geometry for the enlarged-image viewer.
//!
//! Coordinates are in on-screen pixels. The image rect already reflects any
//! scaling of the image element, so the magnified background is sized from
//! the rect and not from the natural image resolution.

use crate::{
    config::LensConfig,
    models::{LensGeometry, LensState, Point, Rect},
};

/// Records where the pointer sits relative to the viewer box and the image.
/// `None` when either rect is not available yet.
pub fn track_pointer(
    pointer: Point,
    container: Option<Rect>,
    image: Option<Rect>,
) -> Option<LensState> {
    let (container, image) = (container?, image?);
    Some(LensState {
        container: container.relative(pointer),
        image: image.relative(pointer),
        active: true,
    })
}

/// Lens placement and background parameters for a pointer position.
///
/// The lens is a `lens_size` square centered on the pointer; the background
/// is the image scaled by `zoom`, shifted so the point under the pointer
/// lands in the middle of the lens.
pub fn compute_lens(
    pointer: Point,
    container: Option<Rect>,
    image: Option<Rect>,
    lens_size: f64,
    zoom: f64,
) -> Option<LensGeometry> {
    let state = track_pointer(pointer, container, image)?;
    geometry_for_state(&state, image, lens_size, zoom)
}

pub fn compute_lens_with(
    pointer: Point,
    container: Option<Rect>,
    image: Option<Rect>,
    lens: &LensConfig,
) -> Option<LensGeometry> {
    compute_lens(pointer, container, image, lens.diameter, lens.zoom_factor)
}

/// Geometry for an already tracked pointer. Inactive states render nothing.
pub fn geometry_for_state(
    state: &LensState,
    image: Option<Rect>,
    lens_size: f64,
    zoom: f64,
) -> Option<LensGeometry> {
    if !state.active {
        return None;
    }
    let image = image?;
    let half = lens_size / 2.0;

    Some(LensGeometry {
        lens_left: state.container.x - half,
        lens_top: state.container.y - half,
        lens_size,
        background_width: image.width * zoom,
        background_height: image.height * zoom,
        background_x: -(state.image.x * zoom - half),
        background_y: -(state.image.y * zoom - half),
    })
}
