//! Core traits for meshslim

use crate::{mesh::MeshBuffer, point::*, scene::Scene};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3f,
    pub max: Point3f,
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: Point3f::origin(),
            max: Point3f::origin(),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3f>) -> Self {
        let mut iter = points.into_iter();
        let first = match iter.next() {
            Some(p) => *p,
            None => return Self::empty(),
        };

        let mut min = first;
        let mut max = first;
        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);

            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Self { min, max }
    }

    /// Extent along each axis
    pub fn size(&self) -> Vector3f {
        self.max - self.min
    }

    pub fn diagonal(&self) -> f32 {
        self.size().norm()
    }

    pub fn center(&self) -> Point3f {
        nalgebra::center(&self.min, &self.max)
    }
}

/// Objects with spatial extent
pub trait Bounded {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> Aabb;

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        self.bounding_box().center()
    }
}

impl Bounded for MeshBuffer {
    fn bounding_box(&self) -> Aabb {
        Aabb::from_points(&self.positions)
    }
}

impl Bounded for Scene {
    fn bounding_box(&self) -> Aabb {
        Aabb::from_points(self.meshes().flat_map(|mesh| mesh.positions.iter()))
    }
}
