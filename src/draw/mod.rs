//! Drawing engine: brush geometry, stroke interpolation, and the
//! window-to-image coordinate transform.
//!
//! The engine translates continuous pointer gestures into a discrete
//! sequence of pixel mutations. It never touches the buffer itself; it
//! computes *which* pixels a tool affects and leaves the mutation to
//! the editor session.

pub mod stroke;
pub mod view;

pub use stroke::{StampGate, StrokeTracker, stroke_points};
pub use view::CanvasView;

use crate::geom::Vec2;

/// Enumerate the filled disk of radius `radius` around `center`,
/// clipped to the `width` x `height` image bounds.
///
/// Returns every integer grid point `(x, y)` inside the bounding box
/// `[cx-r, cx+r] x [cy-r, cy+r]` with `dx^2 + dy^2 <= r^2`: a filled
/// disk, not a ring. Radius 0 yields exactly the center point (when in
/// bounds); a negative radius yields nothing.
pub fn surrounding_pixels(
    center: Vec2<i32>,
    radius: i32,
    width: i32,
    height: i32,
) -> Vec<Vec2<i32>> {
    if radius < 0 {
        return Vec::new();
    }

    let min_x = (center.x - radius).max(0);
    let max_x = (center.x + radius).min(width - 1);
    let min_y = (center.y - radius).max(0);
    let max_y = (center.y + radius).min(height - 1);

    let mut pixels = Vec::new();
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x - center.x;
            let dy = y - center.y;
            if dx * dx + dy * dy <= radius * radius {
                pixels.push(Vec2::new(x, y));
            }
        }
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_zero_is_center_only() {
        let pixels = surrounding_pixels(Vec2::new(5, 5), 0, 10, 10);
        assert_eq!(pixels, vec![Vec2::new(5, 5)]);
    }

    #[test]
    fn test_disk_matches_definition() {
        let center = Vec2::new(4, 4);
        let radius = 3;
        let pixels = surrounding_pixels(center, radius, 10, 10);
        // Every point satisfies the disk predicate...
        for p in &pixels {
            let d = *p - center;
            assert!(d.x * d.x + d.y * d.y <= radius * radius);
        }
        // ...and every in-bounds point satisfying it is present.
        let mut expected = 0;
        for y in 0..10 {
            for x in 0..10 {
                let dx = x - center.x;
                let dy = y - center.y;
                if dx * dx + dy * dy <= radius * radius {
                    expected += 1;
                    assert!(pixels.contains(&Vec2::new(x, y)));
                }
            }
        }
        assert_eq!(pixels.len(), expected);
    }

    #[test]
    fn test_disk_is_filled_not_a_ring() {
        let pixels = surrounding_pixels(Vec2::new(5, 5), 2, 11, 11);
        assert!(pixels.contains(&Vec2::new(5, 5)));
        assert!(pixels.contains(&Vec2::new(6, 5)));
        assert!(pixels.contains(&Vec2::new(5, 3)));
    }

    #[test]
    fn test_clipping_at_image_edge() {
        let pixels = surrounding_pixels(Vec2::new(0, 0), 2, 10, 10);
        for p in &pixels {
            assert!(p.x >= 0 && p.y >= 0);
        }
        // Quarter disk: (0,0),(1,0),(2,0),(0,1),(1,1),(0,2).
        assert_eq!(pixels.len(), 6);
    }

    #[test]
    fn test_negative_radius_is_empty() {
        assert!(surrounding_pixels(Vec2::new(5, 5), -1, 10, 10).is_empty());
    }

    #[test]
    fn test_center_outside_bounds_is_clipped() {
        let pixels = surrounding_pixels(Vec2::new(-5, -5), 1, 10, 10);
        assert!(pixels.is_empty());
    }
}
