//! Axis-aligned rectangles.

use std::sync::Arc;

use rand::RngCore;
use tessel_math::{axis_component, Aabb, Interval, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable};
use crate::Material;

/// Plane a rectangle lies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Xy,
    Xz,
    Yz,
}

impl Plane {
    /// (first in-plane axis, second in-plane axis, normal axis)
    fn axes(self) -> (usize, usize, usize) {
        match self {
            Plane::Xy => (0, 1, 2),
            Plane::Xz => (0, 2, 1),
            Plane::Yz => (1, 2, 0),
        }
    }
}

/// Rectangle `[a0, a1] × [b0, b1]` at offset `k` along the plane's normal axis.
///
/// The outward normal points along the positive normal axis.
pub struct AxisRect {
    plane: Plane,
    a: Interval,
    b: Interval,
    k: f64,
    material: Arc<dyn Material>,
}

impl AxisRect {
    pub fn new(plane: Plane, a: Interval, b: Interval, k: f64, material: Arc<dyn Material>) -> Self {
        Self {
            plane,
            a,
            b,
            k,
            material,
        }
    }

    pub fn xy(x0: f64, x1: f64, y0: f64, y1: f64, k: f64, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::Xy, Interval::new(x0, x1), Interval::new(y0, y1), k, material)
    }

    pub fn xz(x0: f64, x1: f64, z0: f64, z1: f64, k: f64, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::Xz, Interval::new(x0, x1), Interval::new(z0, z1), k, material)
    }

    pub fn yz(y0: f64, y1: f64, z0: f64, z1: f64, k: f64, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::Yz, Interval::new(y0, y1), Interval::new(z0, z1), k, material)
    }

    fn corner(&self, a: f64, b: f64) -> Vec3 {
        let (ia, ib, _) = self.plane.axes();
        let mut p = [self.k; 3];
        p[ia] = a;
        p[ib] = b;
        Vec3::from_array(p)
    }
}

impl Hittable for AxisRect {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        let (ia, ib, n) = self.plane.axes();

        let t = (self.k - axis_component(ray.origin(), n)) * axis_component(ray.inv_direction(), n);
        if !ray_t.surrounds(t) {
            return None;
        }

        let p = ray.at(t);
        let a = axis_component(p, ia);
        let b = axis_component(p, ib);
        if !self.a.contains(a) || !self.b.contains(b) {
            return None;
        }

        let mut normal = [0.0; 3];
        normal[n] = 1.0;
        let u = (a - self.a.min) / self.a.size();
        let v = (b - self.b.min) / self.b.size();
        Some(
            HitRecord::new(ray, t, Vec3::from_array(normal), self.material.as_ref()).with_uv(u, v),
        )
    }

    fn bounding_box(&self) -> Option<Aabb> {
        // from_points pads the flat normal axis.
        Some(Aabb::from_points(
            self.corner(self.a.min, self.b.min),
            self.corner(self.a.max, self.b.max),
        ))
    }
}
