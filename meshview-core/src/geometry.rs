/// Geometry primitives shared by the loader, the scene and the backends
use nalgebra::{Point3, Vector3};

/// One corner of a triangle: a position and the normal attached to it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// Axis-aligned extent of a point set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    /// Smallest box containing every point, `None` for an empty set.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f32>>,
    {
        let mut points = points.into_iter();
        let first = *points.next()?;
        let mut bbox = Self {
            min: first,
            max: first,
        };
        for point in points {
            bbox.include(point);
        }
        Some(bbox)
    }

    pub fn include(&mut self, point: &Point3<f32>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn extent(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn max_extent(&self) -> f32 {
        self.extent().max()
    }

    /// Uniform scale that maps the largest side onto a length of 2.
    pub fn fit_scale(&self) -> f32 {
        let extent = self.max_extent();
        if extent > f32::EPSILON {
            2.0 / extent
        } else {
            1.0
        }
    }
}

/// Triangle-list mesh ready for upload: three vertices per face, no index buffer
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub bbox: BoundingBox,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, bbox: BoundingBox) -> Self {
        Self { vertices, bbox }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn positions(&self) -> impl Iterator<Item = Point3<f32>> + '_ {
        self.vertices.iter().map(|v| v.position)
    }

    pub fn normals(&self) -> impl Iterator<Item = Vector3<f32>> + '_ {
        self.vertices.iter().map(|v| v.normal)
    }
}
