//! Rotated map patch
//!
//! Fills a viewport with the part of a map raster around the current
//! position, rotated so the direction of travel points up. Each viewport
//! pixel is mapped back into the raster (nearest neighbour), so every
//! output pixel is written exactly once.

use gpsnav_display::{FrameBuffer, Rgb565};

use super::MapDescriptor;
use crate::position::Position;

/// Sine and cosine of a whole-degree angle
///
/// Quadrant angles are returned exactly so an unrotated or right-angle
/// view has no drift.
pub fn heading_sin_cos(degrees: u16) -> (f64, f64) {
    match degrees % 360 {
        0 => (0.0, 1.0),
        90 => (1.0, 0.0),
        180 => (0.0, -1.0),
        270 => (-1.0, 0.0),
        other => {
            let radians = other as f64 * (core::f64::consts::PI / 180.0);
            (libm::sin(radians), libm::cos(radians))
        }
    }
}

/// Raster pixel column and row of the position, truncated
pub fn raster_center(position: &Position, map: &MapDescriptor) -> (i64, i64) {
    let res_x = libm::fabs(map.bottom_right.longitude - map.top_left.longitude) / map.width as f64;
    let res_y = libm::fabs(map.top_left.latitude - map.bottom_right.latitude) / map.height as f64;

    let x = libm::fabs(position.longitude - map.top_left.longitude) / res_x;
    let y = libm::fabs(position.latitude - map.top_left.latitude) / res_y;
    (snap(x), snap(y))
}

/// Truncate, letting values a hair below an integer land on it
fn snap(value: f64) -> i64 {
    libm::floor(value + 1e-9) as i64
}

/// Render the rotated patch around `position` into `viewport`
///
/// Viewport pixels whose source falls outside the raster get `background`.
pub fn project(
    position: &Position,
    map: &MapDescriptor,
    raster: &[Rgb565],
    viewport: &mut FrameBuffer,
    background: Rgb565,
) {
    let (center_x, center_y) = raster_center(position, map);
    let (sin, cos) = heading_sin_cos(position.heading_degrees());

    let width = map.width as i64;
    let height = map.height as i64;
    let view_width = viewport.width() as usize;
    if view_width == 0 {
        return;
    }
    let half_width = (viewport.width() / 2) as i64;
    let half_height = (viewport.height() / 2) as i64;

    for (y, row) in viewport.pixels_mut().chunks_exact_mut(view_width).enumerate() {
        let yt = (y as i64 - half_height) as f64;
        for (x, pixel) in row.iter_mut().enumerate() {
            let xt = (x as i64 - half_width) as f64;

            let u = (xt * cos - yt * sin) as i64 + center_x;
            let v = (xt * sin + yt * cos) as i64 + center_y;

            *pixel = if (0..width).contains(&u) && (0..height).contains(&v) {
                raster
                    .get((v * width + u) as usize)
                    .copied()
                    .unwrap_or(background)
            } else {
                background
            };
        }
    }
}
