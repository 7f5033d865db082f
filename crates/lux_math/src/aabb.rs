use crate::{Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box for the octree.
///
/// Invariant: `min <= max` on every axis. Boxes that get subdivided must be
/// strictly non-flat, see [`Aabb::padded`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB from its two extreme corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        debug_assert!(min.cmple(max).all(), "inverted box {min:?} {max:?}");
        Self { min, max }
    }

    /// Create an AABB from two arbitrary corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// Pad every side by `margin`, plus `margin` relative to the largest extent.
    ///
    /// Keeps subdivided boxes strictly non-flat (a single planar triangle would
    /// otherwise produce a zero-volume root).
    pub fn padded(&self, margin: f32) -> Aabb {
        let pad = margin * self.size().max_element().max(1.0);
        Self {
            min: self.min - Vec3::splat(pad),
            max: self.max + Vec3::splat(pad),
        }
    }

    /// Extent along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Half the extent along each axis.
    pub fn half_extents(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// True if `p` lies inside or on the boundary.
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.min.cmple(p).all() && p.cmple(self.max).all()
    }

    /// True if every axis has strictly positive extent.
    pub fn has_volume(&self) -> bool {
        self.min.cmplt(self.max).all()
    }

    /// The `index`-th octant (0..8) split at the centroid.
    ///
    /// Bit 0 selects the upper half on X, bit 1 on Y, bit 2 on Z.
    pub fn octant(&self, index: usize) -> Aabb {
        debug_assert!(index < 8);
        let center = self.centroid();
        let pick = |bit: usize, lo: f32, mid: f32, hi: f32| {
            if index & bit == 0 {
                (lo, mid)
            } else {
                (mid, hi)
            }
        };
        let (x0, x1) = pick(1, self.min.x, center.x, self.max.x);
        let (y0, y1) = pick(2, self.min.y, center.y, self.max.y);
        let (z0, z1) = pick(4, self.min.z, center.z, self.max.z);
        Aabb::new(Vec3::new(x0, y0, z0), Vec3::new(x1, y1, z1))
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Uses the slab method - efficient ray-box intersection test.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        for axis in 0..3 {
            let adinv = 1.0 / r.direction[axis];
            let mut t0 = (self.min[axis] - r.origin[axis]) * adinv;
            let mut t1 = (self.max[axis] - r.origin[axis]) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            // f32::max/min drop a NaN operand (0 * inf on a slab boundary).
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max < ray_t.min {
                return false;
            }
        }

        true
    }
}
