//! Stroke interpolation and the stamp timing gate.

use crate::config::STROKE_STEP_SPACING_PERCENT;
use crate::geom::Vec2;
use std::time::{Duration, Instant};

/// Compute the stamp centers for a drag step ending at `current`.
///
/// Pointer-move events arrive at frame rate and may skip positions
/// during fast motion. When a previous position exists, intermediate
/// points are linearly interpolated along the segment so the stroke has
/// no gaps; the step count is the segment length divided by a spacing
/// of [`STROKE_STEP_SPACING_PERCENT`] percent of the brush size, which
/// also bounds the number of stamps. With no previous position (stroke
/// start, or the pointer re-entered the canvas) only `current` is
/// stamped.
pub fn stroke_points(
    prev: Option<Vec2<i32>>,
    current: Vec2<i32>,
    brush_size: i32,
) -> Vec<Vec2<i32>> {
    let Some(prev) = prev else {
        return vec![current];
    };

    let spacing = (STROKE_STEP_SPACING_PERCENT / 100.0) * brush_size.max(1) as f32;
    let steps = ((current - prev).length() / spacing) as i32;
    if steps <= 0 {
        return vec![current];
    }

    let mut points = Vec::with_capacity(steps as usize + 1);
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        points.push(Vec2::lerp(prev, current, t));
    }
    points
}

/// Tracks the previous stamp position within one drag gesture.
#[derive(Debug, Default)]
pub struct StrokeTracker {
    last: Option<Vec2<i32>>,
}

impl StrokeTracker {
    /// Create a tracker with no stroke in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous position. Call when the button is released
    /// or the pointer leaves the canvas.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Record `pos` and return the stamp centers connecting it to the
    /// previous position.
    pub fn advance(&mut self, pos: Vec2<i32>, brush_size: i32) -> Vec<Vec2<i32>> {
        let points = stroke_points(self.last, pos, brush_size);
        self.last = Some(pos);
        points
    }

    /// The previous position, if a stroke is in progress.
    pub fn last(&self) -> Option<Vec2<i32>> {
        self.last
    }
}

/// Rate limit between successive stamp operations.
///
/// Regenerating the display texture is the dominant cost per stamp, so
/// stamps are gated by a minimum elapsed time independent of frame
/// rate. The clock is passed in explicitly.
#[derive(Debug)]
pub struct StampGate {
    min_interval: Duration,
    last: Option<Instant>,
}

impl StampGate {
    /// Create a gate with the given minimum interval.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// Whether a stamp may proceed at `now`. Passing records `now` as
    /// the last stamp time.
    pub fn try_stamp(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last {
            if now.duration_since(last) < self.min_interval {
                return false;
            }
        }
        self.last = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_stamp_has_no_interpolation() {
        let points = stroke_points(None, Vec2::new(7, 9), 5);
        assert_eq!(points, vec![Vec2::new(7, 9)]);
    }

    #[test]
    fn test_short_step_stamps_current_only() {
        let points = stroke_points(Some(Vec2::new(0, 0)), Vec2::new(1, 0), 5);
        assert_eq!(points, vec![Vec2::new(1, 0)]);
    }

    #[test]
    fn test_fast_drag_has_no_gaps() {
        // 100px horizontal drag, brush 5, spacing 95% -> at least
        // 100 / 4.75 = 21 stamps.
        let from = Vec2::new(0, 0);
        let to = Vec2::new(100, 0);
        let points = stroke_points(Some(from), to, 5);
        assert!(points.len() >= 21, "got {} stamps", points.len());
        // Endpoints included, all stamps on the segment.
        assert_eq!(*points.first().unwrap(), from);
        assert_eq!(*points.last().unwrap(), to);
        for p in &points {
            assert_eq!(p.y, 0);
            assert!(p.x >= 0 && p.x <= 100);
        }
        // Consecutive stamps closer than the brush radius.
        for pair in points.windows(2) {
            assert!((pair[1] - pair[0]).length() <= 5.0);
        }
    }

    #[test]
    fn test_diagonal_drag_endpoints() {
        let from = Vec2::new(10, 10);
        let to = Vec2::new(-30, 50);
        let points = stroke_points(Some(from), to, 3);
        assert_eq!(*points.first().unwrap(), from);
        assert_eq!(*points.last().unwrap(), to);
    }

    #[test]
    fn test_tracker_resets_between_strokes() {
        let mut tracker = StrokeTracker::new();
        assert_eq!(tracker.advance(Vec2::new(0, 0), 5).len(), 1);
        assert!(tracker.advance(Vec2::new(50, 0), 5).len() > 1);
        tracker.reset();
        assert_eq!(tracker.advance(Vec2::new(100, 0), 5).len(), 1);
    }

    #[test]
    fn test_gate_blocks_within_interval() {
        let mut gate = StampGate::new(Duration::from_millis(10));
        let t0 = Instant::now();
        assert!(gate.try_stamp(t0));
        assert!(!gate.try_stamp(t0 + Duration::from_millis(5)));
        assert!(gate.try_stamp(t0 + Duration::from_millis(10)));
    }

    #[test]
    fn test_gate_first_stamp_always_passes() {
        let mut gate = StampGate::new(Duration::from_secs(3600));
        assert!(gate.try_stamp(Instant::now()));
    }
}
