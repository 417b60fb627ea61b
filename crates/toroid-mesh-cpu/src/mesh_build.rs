use toroid_geom::Vec3;

/// Flat vertex/index arrays of one output stream.
///
/// `col` carries two floats per vertex: sky and local light in `[0, 1]`, already shaded.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub uv: Vec<f32>,
    pub col: Vec<f32>,
    pub idx: Vec<u32>,
}

impl MeshBuild {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.idx.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    #[inline]
    fn push_vertex(&mut self, p: Vec3, uv: [f32; 2], col: [f32; 2]) {
        self.pos.extend_from_slice(&[p.x, p.y, p.z]);
        self.uv.extend_from_slice(&uv);
        self.col.extend_from_slice(&col);
    }

    /// Appends a quad given counter-clockwise corners; indices are offset by the current vertex
    /// count.
    pub fn add_quad(&mut self, corners: [Vec3; 4], uvs: [[f32; 2]; 4], cols: [[f32; 2]; 4]) {
        let base = self.vertex_count() as u32;
        for i in 0..4 {
            self.push_vertex(corners[i], uvs[i], cols[i]);
        }
        self.idx
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Appends an indexed triangle list sharing one colour.
    pub fn add_triangles(&mut self, pos: &[Vec3], uvs: &[[f32; 2]], indices: &[u32], col: [f32; 2]) {
        let base = self.vertex_count() as u32;
        for (p, uv) in pos.iter().zip(uvs) {
            self.push_vertex(*p, *uv, col);
        }
        self.idx.extend(indices.iter().map(|i| base + i));
    }
}
