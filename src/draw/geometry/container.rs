//! Shape container with a bounding volume hierarchy
//!
//! Build-then-query: shapes are appended, `build_bvh` partitions them once,
//! queries run read-only afterwards. Appending after a build drops the tree;
//! queries on a container without a tree fall back to a linear scan.
//!
//! The tree is an index arena: nodes reference each other and the shapes by
//! position, so the container owns everything and drops it as a unit.

use super::bbox::BBox2D;
use super::point::Point;
use super::segment::RaySeg2D;
use super::shapes::{Shape2D, ShapeKind};
use std::collections::BTreeMap;

/// Maximum number of shapes stored in a leaf
pub const BVH_LEAF_SIZE: usize = 4;

#[derive(Debug, Clone)]
enum BvhNode {
    Leaf {
        bbox: BBox2D,
        /// Range into `Bvh::order`
        first: usize,
        count: usize,
    },
    Inner {
        bbox: BBox2D,
        left: usize,
        right: usize,
    },
}

impl BvhNode {
    fn bbox(&self) -> &BBox2D {
        match self {
            BvhNode::Leaf { bbox, .. } | BvhNode::Inner { bbox, .. } => bbox,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Bvh {
    nodes: Vec<BvhNode>,
    /// Shape indices, grouped so every leaf owns a contiguous range
    order: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Container2D {
    shapes: Vec<Shape2D>,
    bbox: BBox2D,
    bvh: Option<Bvh>,
}

impl Container2D {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, shape: Shape2D) {
        self.bbox.union(shape.bbox());
        self.shapes.push(shape);
        self.bvh = None;
    }

    /// Appends the shape when construction succeeded
    pub fn add_opt(&mut self, shape: Option<Shape2D>) -> bool {
        match shape {
            Some(shape) => {
                self.add(shape);
                true
            }
            None => false,
        }
    }

    pub fn extend(&mut self, other: Container2D) {
        for shape in other.shapes {
            self.add(shape);
        }
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.bbox.reset();
        self.bvh = None;
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn shapes(&self) -> &[Shape2D] {
        &self.shapes
    }

    pub fn bbox(&self) -> &BBox2D {
        &self.bbox
    }

    pub fn has_bvh(&self) -> bool {
        self.bvh.is_some()
    }

    /// Number of shapes per kind
    pub fn kind_counts(&self) -> BTreeMap<ShapeKind, usize> {
        let mut counts = BTreeMap::new();
        for shape in &self.shapes {
            *counts.entry(shape.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// Rebuild the hierarchy from scratch
    pub fn build_bvh(&mut self) {
        self.bvh = None;
        if self.shapes.is_empty() {
            return;
        }
        let mut bvh = Bvh {
            nodes: Vec::with_capacity(2 * self.shapes.len() / BVH_LEAF_SIZE + 1),
            order: (0..self.shapes.len()).collect(),
        };
        let count = bvh.order.len();
        build_recursive(&self.shapes, &mut bvh, 0, count);
        log::trace!("BVH built: {} shapes, {} nodes", self.shapes.len(), bvh.nodes.len());
        self.bvh = Some(bvh);
    }

    /// True if any shape is touched by the segment (endpoint inside, or the
    /// segment crosses its boundary)
    pub fn intersect_any(&self, seg: &RaySeg2D) -> bool {
        let test = |shape: &Shape2D| {
            shape.is_point_inside(seg.start) || shape.is_point_inside(seg.end) || shape.intersect(seg).is_some()
        };
        match &self.bvh {
            Some(bvh) => self.intersect_any_node(bvh, 0, seg, &test),
            None => self.shapes.iter().any(|s| node_visited(s.bbox(), seg) && test(s)),
        }
    }

    fn intersect_any_node(&self, bvh: &Bvh, node: usize, seg: &RaySeg2D, test: &dyn Fn(&Shape2D) -> bool) -> bool {
        let n = &bvh.nodes[node];
        if !node_visited(n.bbox(), seg) {
            return false;
        }
        match n {
            BvhNode::Leaf { first, count, .. } => bvh.order[*first..*first + *count]
                .iter()
                .any(|&i| test(&self.shapes[i])),
            BvhNode::Inner { left, right, .. } => {
                self.intersect_any_node(bvh, *left, seg, test) || self.intersect_any_node(bvh, *right, seg, test)
            }
        }
    }

    /// All shapes whose broad-phase test accepts `bbox`
    pub fn get_intersecting_objects(&self, bbox: &BBox2D) -> Vec<&Shape2D> {
        self.get_intersecting_indices(bbox)
            .into_iter()
            .map(|i| &self.shapes[i])
            .collect()
    }

    /// Insertion indices of the shapes `get_intersecting_objects` returns
    pub fn get_intersecting_indices(&self, bbox: &BBox2D) -> Vec<usize> {
        let mut out = Vec::new();
        match &self.bvh {
            Some(bvh) => self.collect_node(bvh, 0, bbox, &mut out),
            None => out.extend((0..self.shapes.len()).filter(|&i| self.shapes[i].intersects(bbox))),
        }
        out
    }

    fn collect_node(&self, bvh: &Bvh, node: usize, bbox: &BBox2D, out: &mut Vec<usize>) {
        let n = &bvh.nodes[node];
        if !n.bbox().intersects(bbox) {
            return;
        }
        match n {
            BvhNode::Leaf { first, count, .. } => {
                out.extend(
                    bvh.order[*first..*first + *count]
                        .iter()
                        .copied()
                        .filter(|&i| self.shapes[i].intersects(bbox)),
                );
            }
            BvhNode::Inner { left, right, .. } => {
                self.collect_node(bvh, *left, bbox, out);
                self.collect_node(bvh, *right, bbox, out);
            }
        }
    }

    /// Shapes containing the point
    pub fn shapes_at(&self, p: Point) -> Vec<&Shape2D> {
        let probe = BBox2D::from_corners(p, p);
        self.get_intersecting_objects(&probe)
            .into_iter()
            .filter(|s| s.is_point_inside(p))
            .collect()
    }

    /// The most recently added shape containing the point
    pub fn topmost_at(&self, p: Point) -> Option<&Shape2D> {
        let probe = BBox2D::from_corners(p, p);
        self.get_intersecting_indices(&probe)
            .into_iter()
            .filter(|&i| self.shapes[i].is_point_inside(p))
            .max()
            .map(|i| &self.shapes[i])
    }
}

fn node_visited(bbox: &BBox2D, seg: &RaySeg2D) -> bool {
    bbox.inside(seg.start) || bbox.inside(seg.end) || bbox.intersect_segment(seg)
}

/// Partition `order[first..first + count]`, returning the new node index.
/// Splits at the middle of the centroid-sorted list along the longest axis.
fn build_recursive(shapes: &[Shape2D], bvh: &mut Bvh, first: usize, count: usize) -> usize {
    let mut bbox = BBox2D::new();
    for &i in &bvh.order[first..first + count] {
        bbox.union(shapes[i].bbox());
    }

    let index = bvh.nodes.len();
    if count <= BVH_LEAF_SIZE {
        bvh.nodes.push(BvhNode::Leaf { bbox, first, count });
        return index;
    }

    // Placeholder, patched once both children exist
    bvh.nodes.push(BvhNode::Leaf { bbox, first, count });

    let axis = bbox.max_dimension();
    bvh.order[first..first + count].sort_by(|&a, &b| {
        shapes[a]
            .centroid()
            .axis(axis)
            .total_cmp(&shapes[b].centroid().axis(axis))
    });

    let half = count / 2;
    let left = build_recursive(shapes, bvh, first, half);
    let right = build_recursive(shapes, bvh, first + half, count - half);
    bvh.nodes[index] = BvhNode::Inner { bbox, left, right };
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::geometry::ItemId;

    fn circles_in_a_row(n: usize) -> Container2D {
        let mut c = Container2D::new();
        for i in 0..n {
            c.add_opt(Shape2D::filled_circle(Point::new(i as f32 * 3.0, 0.0), 1.0, None));
        }
        c
    }

    #[test]
    fn test_leaf_only_for_small_sets() {
        let mut c = circles_in_a_row(4);
        c.build_bvh();
        let bvh = c.bvh.as_ref().unwrap();
        assert_eq!(bvh.nodes.len(), 1);
        assert!(matches!(bvh.nodes[0], BvhNode::Leaf { count: 4, .. }));
    }

    #[test]
    fn test_split_is_by_count_not_space() {
        // Nine shapes clustered at one end and one far away: a spatial
        // midpoint would put 9 on one side, the count split puts 5 and 5.
        let mut c = Container2D::new();
        for i in 0..9 {
            c.add_opt(Shape2D::filled_circle(Point::new(i as f32 * 0.01, 0.0), 0.001, None));
        }
        c.add_opt(Shape2D::filled_circle(Point::new(1000.0, 0.0), 0.001, None));
        c.build_bvh();
        let bvh = c.bvh.as_ref().unwrap();
        match &bvh.nodes[0] {
            BvhNode::Inner { left, right, .. } => {
                let size = |n: usize| -> usize {
                    fn walk(bvh: &Bvh, n: usize) -> usize {
                        match &bvh.nodes[n] {
                            BvhNode::Leaf { count, .. } => *count,
                            BvhNode::Inner { left, right, .. } => walk(bvh, *left) + walk(bvh, *right),
                        }
                    }
                    walk(bvh, n)
                };
                assert_eq!(size(*left), 5);
                assert_eq!(size(*right), 5);
            }
            BvhNode::Leaf { .. } => panic!("root should be an inner node"),
        }
    }

    #[test]
    fn test_add_invalidates_tree() {
        let mut c = circles_in_a_row(10);
        c.build_bvh();
        assert!(c.has_bvh());
        c.add_opt(Shape2D::filled_circle(Point::new(100.0, 0.0), 1.0, None));
        assert!(!c.has_bvh());
        // Linear fallback still answers
        let seg = RaySeg2D::new(Point::new(100.0, -5.0), Point::new(100.0, 5.0));
        assert!(c.intersect_any(&seg));
    }

    #[test]
    fn test_intersect_any() {
        let mut c = circles_in_a_row(20);
        c.build_bvh();
        let crossing = RaySeg2D::new(Point::new(30.0, -5.0), Point::new(30.0, 5.0));
        let between = RaySeg2D::new(Point::new(31.5, -5.0), Point::new(31.5, 5.0));
        let inside = RaySeg2D::new(Point::new(29.9, 0.1), Point::new(30.1, -0.1));
        assert!(c.intersect_any(&crossing));
        assert!(!c.intersect_any(&between));
        assert!(c.intersect_any(&inside));
    }

    #[test]
    fn test_empty_container() {
        let mut c = Container2D::new();
        c.build_bvh();
        assert!(!c.has_bvh());
        let seg = RaySeg2D::new(Point::ZERO, Point::new(1.0, 1.0));
        assert!(!c.intersect_any(&seg));
    }

    #[test]
    fn test_topmost_is_last_added() {
        let mut c = Container2D::new();
        c.add_opt(Shape2D::filled_circle(Point::ZERO, 2.0, Some(ItemId(7))));
        for i in 0..8 {
            c.add_opt(Shape2D::filled_circle(Point::new(10.0 + i as f32, 0.0), 0.1, None));
        }
        c.add_opt(Shape2D::filled_circle(Point::new(0.5, 0.0), 1.0, Some(ItemId(9))));
        c.build_bvh();
        assert_eq!(c.topmost_at(Point::new(0.6, 0.0)).and_then(|s| s.source()), Some(ItemId(9)));
        assert_eq!(c.topmost_at(Point::new(-1.5, 0.0)).and_then(|s| s.source()), Some(ItemId(7)));
        assert!(c.topmost_at(Point::new(5.0, 5.0)).is_none());
        assert_eq!(c.shapes_at(Point::new(0.6, 0.0)).len(), 2);
    }
}
