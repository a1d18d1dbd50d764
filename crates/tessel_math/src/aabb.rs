use crate::{axis_component, Interval, Ray, Vec3};

/// Minimum extent along any axis. Thinner boxes are padded up to this so
/// that axis-aligned quads still have a volume the slab test can hit.
const MIN_EXTENT: f64 = 1e-4;

/// Axis-aligned bounding box, stored as one interval per axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Contains nothing; identity element for [`Aabb::surrounding`].
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    /// Create a box from three intervals, padding degenerate axes.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create a box spanning two arbitrary corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let lo = a.min(b);
        let hi = a.max(b);
        Self::new(
            Interval::new(lo.x, hi.x),
            Interval::new(lo.y, hi.y),
            Interval::new(lo.z, hi.z),
        )
    }

    /// Smallest box containing both inputs.
    ///
    /// Componentwise min of minimums and max of maximums, so the fold is
    /// associative and commutative.
    pub fn surrounding(a: &Aabb, b: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&a.x, &b.x),
            y: Interval::surrounding(&a.y, &b.y),
            z: Interval::surrounding(&a.z, &b.z),
        }
    }

    /// Minimum corner.
    #[inline]
    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    /// Maximum corner.
    #[inline]
    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Interval along axis `n` (0=X, 1=Y, 2=Z).
    #[inline]
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// Slab test against `ray` restricted to `ray_t`.
    ///
    /// Per axis the entry and exit distances come from the ray's inverse
    /// direction and are swapped when it is negative. The hit is reported
    /// iff the intersection of the three slabs with `ray_t` is non-empty.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> bool {
        let origin = ray.origin();
        let inv_dir = ray.inv_direction();
        let mut t_min = ray_t.min;
        let mut t_max = ray_t.max;

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let o = axis_component(origin, axis);
            let inv_d = axis_component(inv_dir, axis);

            let mut t0 = (slab.min - o) * inv_d;
            let mut t1 = (slab.max - o) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            // f64::max/min discard a NaN operand (0 * inf when the origin lies
            // on a slab plane of a parallel ray), leaving the bound unchanged.
            t_min = t0.max(t_min);
            t_max = t1.min(t_max);
            if t_max <= t_min {
                return false;
            }
        }

        true
    }

    /// Index (0=X, 1=Y, 2=Z) of the axis with the greatest extent.
    pub fn longest_axis(&self) -> usize {
        let (x, y, z) = (self.x.size(), self.y.size(), self.z.size());
        if x > y && x > z {
            0
        } else if y > z {
            1
        } else {
            2
        }
    }

    pub fn centroid(&self) -> Vec3 {
        (self.min() + self.max()) * 0.5
    }

    /// Total area of the six faces; zero for an empty box.
    pub fn surface_area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.max() - self.min();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// True if `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &Aabb) -> bool {
        (0..3).all(|axis| {
            let outer = self.axis_interval(axis);
            let inner = other.axis_interval(axis);
            outer.min <= inner.min && inner.max <= outer.max
        })
    }

    /// Same box shifted by `offset`.
    pub fn translate(&self, offset: Vec3) -> Aabb {
        Aabb::from_points(self.min() + offset, self.max() + offset)
    }

    fn pad_to_minimums(&mut self) {
        for axis in [&mut self.x, &mut self.y, &mut self.z] {
            if axis.size() < MIN_EXTENT {
                *axis = axis.expand(MIN_EXTENT);
            }
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
