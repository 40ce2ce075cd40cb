//! Axis-aligned 2D bounding box
//!
//! A box starts out uninitialized (`min = +inf`, `max = -inf`) and only grows
//! through `union_point` / `union`. Geometric predicates must not be called
//! before the first union; debug builds assert this.

use super::point::Point;
use super::segment::RaySeg2D;

/// Next representable f32 towards +inf
pub fn next_float_up(v: f32) -> f32 {
    if v.is_nan() || v == f32::INFINITY {
        return v;
    }
    if v == 0.0 {
        return f32::from_bits(1);
    }
    let bits = v.to_bits();
    if v > 0.0 {
        f32::from_bits(bits + 1)
    } else {
        f32::from_bits(bits - 1)
    }
}

/// Next representable f32 towards -inf
pub fn next_float_down(v: f32) -> f32 {
    -next_float_up(-v)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox2D {
    min: Point,
    max: Point,
}

impl Default for BBox2D {
    fn default() -> Self {
        Self::new()
    }
}

impl BBox2D {
    /// Empty, uninitialized box
    pub const fn new() -> Self {
        Self {
            min: Point { x: f32::INFINITY, y: f32::INFINITY },
            max: Point { x: f32::NEG_INFINITY, y: f32::NEG_INFINITY },
        }
    }

    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_points(points: &[Point]) -> Self {
        let mut bbox = Self::new();
        for p in points {
            bbox.union_point(*p);
        }
        bbox
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn is_initialized(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }

    pub fn min(&self) -> Point {
        self.min
    }

    pub fn max(&self) -> Point {
        self.max
    }

    pub fn union_point(&mut self, p: Point) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn union(&mut self, other: &BBox2D) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn extent(&self) -> Point {
        debug_assert!(self.is_initialized());
        self.max - self.min
    }

    pub fn center(&self) -> Point {
        debug_assert!(self.is_initialized());
        (self.min + self.max) * 0.5
    }

    /// Axis of the largest extent: 0 = x, 1 = y
    pub fn max_dimension(&self) -> usize {
        let extent = self.extent();
        if extent.y > extent.x {
            1
        } else {
            0
        }
    }

    pub fn area(&self) -> f32 {
        let extent = self.extent();
        extent.x * extent.y
    }

    pub fn perimeter(&self) -> f32 {
        let extent = self.extent();
        2.0 * (extent.x + extent.y)
    }

    /// Scale about the center
    pub fn scale(&mut self, factor: f32) {
        debug_assert!(self.is_initialized());
        let center = self.center();
        let half = self.extent() * (0.5 * factor);
        self.min = center - half;
        self.max = center + half;
    }

    /// Widen every bound outward by one ULP
    pub fn scale_next_up(&mut self) {
        self.min = Point::new(next_float_down(self.min.x), next_float_down(self.min.y));
        self.max = Point::new(next_float_up(self.max.x), next_float_up(self.max.y));
    }

    /// Shrink every bound inward by one ULP
    pub fn scale_next_down(&mut self) {
        self.min = Point::new(next_float_up(self.min.x), next_float_up(self.min.y));
        self.max = Point::new(next_float_down(self.max.x), next_float_down(self.max.y));
    }

    pub fn intersects(&self, other: &BBox2D) -> bool {
        debug_assert!(self.is_initialized() && other.is_initialized());
        self.max.x >= other.min.x
            && self.min.x <= other.max.x
            && self.max.y >= other.min.y
            && self.min.y <= other.max.y
    }

    /// Box vs circle, using the nearest point of the box to the center
    pub fn intersects_circle(&self, center: Point, radius_squared: f32) -> bool {
        debug_assert!(self.is_initialized());
        let nearest = Point::new(
            center.x.clamp(self.min.x, self.max.x),
            center.y.clamp(self.min.y, self.max.y),
        );
        (nearest - center).length_squared() <= radius_squared
    }

    pub fn inside(&self, p: Point) -> bool {
        debug_assert!(self.is_initialized());
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// True when `other` lies entirely within this box
    pub fn contains(&self, other: &BBox2D) -> bool {
        self.inside(other.min) && self.inside(other.max)
    }

    /// Slab test against the infinite ray; returns the entry distance along
    /// the ray direction. NaN produced by a zero-width slab is treated as a miss.
    pub fn intersect_ray(&self, ray: &RaySeg2D) -> Option<f32> {
        self.intersect_ray_range(ray).map(|(t0, _)| t0)
    }

    /// Slab test returning the `(entry, exit)` distances
    pub fn intersect_ray_range(&self, ray: &RaySeg2D) -> Option<(f32, f32)> {
        debug_assert!(self.is_initialized());
        let tx1 = (self.min.x - ray.start.x) * ray.inv_dir.x;
        let tx2 = (self.max.x - ray.start.x) * ray.inv_dir.x;
        let ty1 = (self.min.y - ray.start.y) * ray.inv_dir.y;
        let ty2 = (self.max.y - ray.start.y) * ray.inv_dir.y;

        if tx1.is_nan() || tx2.is_nan() || ty1.is_nan() || ty2.is_nan() {
            return None;
        }

        let tmin = tx1.min(tx2).max(ty1.min(ty2));
        let tmax = tx1.max(tx2).min(ty1.max(ty2));

        if tmax >= tmin.max(0.0) {
            Some((tmin, tmax))
        } else {
            None
        }
    }

    /// Slab test clipped to the segment length
    pub fn intersect_segment(&self, seg: &RaySeg2D) -> bool {
        match self.intersect_ray_range(seg) {
            Some((t0, _)) => t0 <= seg.length,
            None => false,
        }
    }
}
