//! Compile statistics
//!
//! Returned by value from each reload. The averages drive render-quality
//! choices such as the segment count of through-hole barrels.

use crate::draw::geometry::{Container2D, ShapeKind};
use serde::Serialize;
use std::collections::BTreeMap;

/// Primitive counts per shape kind
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObjectStats {
    pub counts: BTreeMap<ShapeKind, usize>,
}

impl ObjectStats {
    pub fn add_container(&mut self, container: &Container2D) {
        for (kind, n) in container.kind_counts() {
            *self.counts.entry(kind).or_insert(0) += n;
        }
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn count(&self, kind: ShapeKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CompileStats {
    pub generation: u64,
    pub track_count: usize,
    /// Board units
    pub average_track_width: f64,
    pub via_count: usize,
    pub average_via_hole: f64,
    pub hole_count: usize,
    pub average_hole: f64,
    pub objects: ObjectStats,
    pub elapsed_ms: f64,
}

impl CompileStats {
    pub fn add_track(&mut self, width: f64) {
        self.average_track_width = running_mean(self.average_track_width, self.track_count, width);
        self.track_count += 1;
    }

    pub fn add_via(&mut self, hole: f64) {
        self.average_via_hole = running_mean(self.average_via_hole, self.via_count, hole);
        self.via_count += 1;
    }

    pub fn add_hole(&mut self, hole: f64) {
        self.average_hole = running_mean(self.average_hole, self.hole_count, hole);
        self.hole_count += 1;
    }
}

fn running_mean(mean: f64, count: usize, value: f64) -> f64 {
    mean + (value - mean) / (count + 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::geometry::{Point, Shape2D};

    #[test]
    fn test_averages() {
        let mut s = CompileStats::default();
        s.add_track(100.0);
        s.add_track(300.0);
        s.add_via(200.0);
        assert_eq!(s.track_count, 2);
        assert!((s.average_track_width - 200.0).abs() < 1e-9);
        assert!((s.average_via_hole - 200.0).abs() < 1e-9);
        assert_eq!(s.hole_count, 0);
    }

    #[test]
    fn test_object_counts() {
        let mut c = Container2D::new();
        c.add_opt(Shape2D::filled_circle(Point::ZERO, 1.0, None));
        c.add_opt(Shape2D::ring(Point::ZERO, 0.5, 1.0, None));
        c.add_opt(Shape2D::filled_circle(Point::new(3.0, 0.0), 1.0, None));
        let mut objects = ObjectStats::default();
        objects.add_container(&c);
        objects.add_container(&c);
        assert_eq!(objects.count(ShapeKind::FilledCircle), 4);
        assert_eq!(objects.count(ShapeKind::Ring), 2);
        assert_eq!(objects.total(), 6);
    }
}
