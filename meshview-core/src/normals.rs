/// Per-vertex normals built while faces are read.
///
/// Faces that carry explicit normal references pin those normals onto their
/// vertices. Faces without them contribute a derived unit face normal that is
/// summed into every vertex not pinned yet. The sums are left unnormalised;
/// the lit pipeline renormalises per fragment.
use std::collections::{HashMap, HashSet};

use nalgebra::{Point3, Vector3};

/// Normalise `v`, mapping the zero vector to zero instead of NaN.
fn unit_or_zero(v: Vector3<f32>) -> Vector3<f32> {
    v.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros)
}

/// Face normal of `(v0, v1, v2)`.
///
/// The positions are normalised before the edges are taken, so the result is
/// only the geometric normal for objects centred on the origin. Loaded meshes
/// rely on this exact formula, so it is not the textbook edge cross product.
pub fn face_normal(v0: &Point3<f32>, v1: &Point3<f32>, v2: &Point3<f32>) -> Vector3<f32> {
    let n0 = unit_or_zero(v0.coords);
    let n1 = unit_or_zero(v1.coords);
    let n2 = unit_or_zero(v2.coords);

    let e1 = unit_or_zero(n1 - n0);
    let e2 = unit_or_zero(n2 - n0);

    unit_or_zero(e1.cross(&e2))
}

/// Running map from vertex index to its normal (or normal sum).
#[derive(Debug, Default)]
pub struct NormalAccumulator {
    sums: HashMap<usize, Vector3<f32>>,
    explicit: HashSet<usize>,
}

impl NormalAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin an explicit normal on `vertex`, replacing whatever was there.
    pub fn assign(&mut self, vertex: usize, normal: Vector3<f32>) {
        self.sums.insert(vertex, normal);
        self.explicit.insert(vertex);
    }

    /// Add a derived face normal to every listed vertex that is not pinned.
    pub fn accumulate(&mut self, vertices: &[usize], face_normal: Vector3<f32>) {
        for &vertex in vertices {
            if self.explicit.contains(&vertex) {
                continue;
            }
            match self.sums.get_mut(&vertex) {
                Some(sum) if *sum != Vector3::zeros() => *sum += face_normal,
                Some(sum) => *sum = face_normal,
                None => {
                    self.sums.insert(vertex, face_normal);
                }
            }
        }
    }

    pub fn get(&self, vertex: usize) -> Option<&Vector3<f32>> {
        self.sums.get(&vertex)
    }

    pub fn is_explicit(&self, vertex: usize) -> bool {
        self.explicit.contains(&vertex)
    }

    /// Consume the accumulator, yielding the final per-vertex vectors.
    pub fn finish(self) -> HashMap<usize, Vector3<f32>> {
        self.sums
    }
}
