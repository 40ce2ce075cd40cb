//! Triangle vertex streams

/// A 3D vertex or normal in render units
pub type Vertex = [f32; 3];

/// Texture coordinate into the shared circle texture
pub type TexCoord = [f32; 2];

pub const UP: Vertex = [0.0, 0.0, 1.0];
pub const DOWN: Vertex = [0.0, 0.0, -1.0];

/// Flat triangle list: every three vertices form one triangle.
///
/// `normals` and `uvs` are either empty or parallel to `vertices`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleList {
    pub vertices: Vec<Vertex>,
    pub normals: Vec<Vertex>,
    pub uvs: Vec<TexCoord>,
}

impl TriangleList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_triangle(&mut self, a: Vertex, b: Vertex, c: Vertex) {
        self.vertices.extend_from_slice(&[a, b, c]);
    }

    /// Two triangles `a b c` and `a c d`
    pub fn add_quad(&mut self, a: Vertex, b: Vertex, c: Vertex, d: Vertex) {
        self.vertices.extend_from_slice(&[a, b, c, a, c, d]);
    }

    pub fn add_textured_triangle(&mut self, vertices: [Vertex; 3], uvs: [TexCoord; 3]) {
        self.vertices.extend_from_slice(&vertices);
        self.uvs.extend_from_slice(&uvs);
    }

    /// Quad with one normal per corner
    pub fn add_quad_with_normals(&mut self, vertices: [Vertex; 4], normals: [Vertex; 4]) {
        let [a, b, c, d] = vertices;
        let [na, nb, nc, nd] = normals;
        self.vertices.extend_from_slice(&[a, b, c, a, c, d]);
        self.normals.extend_from_slice(&[na, nb, nc, na, nc, nd]);
    }

    pub fn append(&mut self, other: &TriangleList) {
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    /// Centroid of every triangle, in order
    pub fn triangle_centroids(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.vertices.chunks_exact(3).map(|t| {
            [
                (t[0][0] + t[1][0] + t[2][0]) / 3.0,
                (t[0][1] + t[1][1] + t[2][1]) / 3.0,
                (t[0][2] + t[1][2] + t[2][2]) / 3.0,
            ]
        })
    }
}

/// The five streams produced for one layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleDisplayList {
    pub z_bottom: f32,
    pub z_top: f32,
    /// Top caps, facing up
    pub top: TriangleList,
    /// Bottom caps, facing down
    pub bottom: TriangleList,
    /// Side walls, with per-vertex normals
    pub middle: TriangleList,
    /// Textured circle and segment end caps on the top face
    pub top_segment_ends: TriangleList,
    /// Textured circle and segment end caps on the bottom face
    pub bottom_segment_ends: TriangleList,
}

impl TriangleDisplayList {
    pub fn new(z_bottom: f32, z_top: f32) -> Self {
        Self { z_bottom, z_top, ..Default::default() }
    }

    pub fn streams(&self) -> [&TriangleList; 5] {
        [&self.top, &self.bottom, &self.middle, &self.top_segment_ends, &self.bottom_segment_ends]
    }

    pub fn triangle_count(&self) -> usize {
        self.streams().iter().map(|s| s.triangle_count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.streams().iter().all(|s| s.is_empty())
    }

    pub fn append(&mut self, other: &TriangleDisplayList) {
        self.top.append(&other.top);
        self.bottom.append(&other.bottom);
        self.middle.append(&other.middle);
        self.top_segment_ends.append(&other.top_segment_ends);
        self.bottom_segment_ends.append(&other.bottom_segment_ends);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_is_two_triangles() {
        let mut list = TriangleList::new();
        list.add_quad([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]);
        assert_eq!(list.triangle_count(), 2);
        assert!(!list.has_normals());

        let mut walls = TriangleList::new();
        walls.add_quad_with_normals(
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
            [[0.0, -1.0, 0.0]; 4],
        );
        assert_eq!(walls.normals.len(), walls.vertices.len());
        let centroids: Vec<Vertex> = walls.triangle_centroids().collect();
        assert_eq!(centroids.len(), 2);
    }

    #[test]
    fn test_display_list_counts() {
        let mut list = TriangleDisplayList::new(0.0, 1.0);
        assert!(list.is_empty());
        list.top.add_triangle([0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        list.middle.add_quad_with_normals([[0.0; 3]; 4], [UP; 4]);
        assert_eq!(list.triangle_count(), 3);
        assert!(!list.is_empty());
    }
}
