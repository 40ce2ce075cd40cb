// BVH queries must agree exactly with a linear scan over the same shapes
use board3d::draw::geometry::{BBox2D, Container2D, Point, RaySeg2D, Shape2D};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const GRID: usize = 20;
const CELL: f32 = 1.0;

/// One random primitive per grid cell, kept inside its cell so no two
/// shapes overlap
fn random_container(rng: &mut StdRng) -> Container2D {
    let mut container = Container2D::new();
    for gy in 0..GRID {
        for gx in 0..GRID {
            let c = Point::new((gx as f32 + 0.5) * CELL, (gy as f32 + 0.5) * CELL);
            let r = rng.gen_range(0.05..0.4) * CELL;
            let offset = |rng: &mut StdRng| Point::new(rng.gen_range(-r..r), rng.gen_range(-r..r));
            let shape = match rng.gen_range(0..5) {
                0 => Shape2D::filled_circle(c, r, None),
                1 => Shape2D::ring(c, r * 0.5, r, None),
                2 => {
                    let (a, b) = (c + offset(rng) * 0.5, c + offset(rng) * 0.5);
                    Shape2D::round_segment(a, b, r * 0.5, None)
                }
                3 => Shape2D::triangle(c + offset(rng), c + offset(rng), c + offset(rng), None),
                _ => Shape2D::polygon_4pt(
                    [
                        Point::new(c.x - r, c.y - r),
                        Point::new(c.x + r, c.y - r),
                        Point::new(c.x + r, c.y + r),
                        Point::new(c.x - r, c.y + r),
                    ],
                    None,
                ),
            };
            container.add_opt(shape);
        }
    }
    container
}

fn random_box(rng: &mut StdRng) -> BBox2D {
    let extent = GRID as f32 * CELL;
    let a = Point::new(rng.gen_range(-1.0..extent + 1.0), rng.gen_range(-1.0..extent + 1.0));
    let size = Point::new(rng.gen_range(0.0..4.0), rng.gen_range(0.0..4.0));
    BBox2D::from_corners(a, a + size)
}

#[test]
fn test_bvh_matches_linear_scan() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut container = random_container(&mut rng);
    assert!(container.len() > GRID * GRID / 2, "most cells should hold a shape");
    container.build_bvh();
    assert!(container.has_bvh());

    for _ in 0..1000 {
        let query = random_box(&mut rng);
        let mut found: Vec<usize> = container
            .get_intersecting_indices(&query)
            .into_iter()
            .filter(|&i| container.shapes()[i].intersects(&query))
            .collect();
        found.sort_unstable();
        let expected: Vec<usize> = (0..container.len()).filter(|&i| container.shapes()[i].intersects(&query)).collect();
        assert_eq!(found, expected, "query {:?}", query);
    }
    println!("✓ 1000 box queries matched the linear scan");
}

#[test]
fn test_intersect_any_matches_linear_scan() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut container = random_container(&mut rng);
    let linear = container.clone();
    container.build_bvh();

    let extent = GRID as f32 * CELL;
    let mut hits = 0;
    for _ in 0..1000 {
        let a = Point::new(rng.gen_range(-1.0..extent + 1.0), rng.gen_range(-1.0..extent + 1.0));
        let b = a + Point::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0));
        let seg = RaySeg2D::new(a, b);
        let expected = linear.intersect_any(&seg);
        assert_eq!(container.intersect_any(&seg), expected, "segment {:?} -> {:?}", a, b);
        if expected {
            hits += 1;
        }
    }
    assert!(hits > 0, "some segments should hit");
    println!("✓ intersect_any agreed on 1000 segments ({} hits)", hits);
}
