//! Triangle primitive.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use std::sync::Arc;

use rand::RngCore;
use tessel_math::{Aabb, Interval, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable};
use crate::Material;

/// Determinants below this mean the ray runs parallel to the triangle.
const PARALLEL_EPSILON: f64 = 1e-10;

pub struct Triangle {
    v0: Vec3,
    /// Edges v1 - v0 and v2 - v0
    edge1: Vec3,
    edge2: Vec3,
    /// Unit face normal following the v0, v1, v2 winding
    normal: Vec3,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<dyn Material>) -> Self {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let normal = edge1.cross(edge2).normalize_or_zero();

        // from_points pads the flat axis of axis-aligned triangles.
        let bbox = Aabb::surrounding(
            &Aabb::from_points(v0, v1),
            &Aabb::from_points(v0, v2),
        );

        Self {
            v0,
            edge1,
            edge2,
            normal,
            material,
            bbox,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl Hittable for Triangle {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        let pvec = ray.direction().cross(self.edge2);
        let det = self.edge1.dot(pvec);
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.origin() - self.v0;
        let u = tvec.dot(pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(self.edge1);
        let v = ray.direction().dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = self.edge2.dot(qvec) * inv_det;
        if !ray_t.surrounds(t) {
            return None;
        }

        Some(HitRecord::new(ray, t, self.normal, self.material.as_ref()).with_uv(u, v))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tessel_math::Color;

    fn facing_triangle() -> Triangle {
        Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            Arc::new(Lambertian::new(Color::splat(0.5))),
        )
    }

    #[test]
    fn test_triangle_hit() {
        let tri = facing_triangle();
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(0);

        let rec = tri
            .hit(&ray, Interval::new(1e-4, f64::INFINITY), &mut rng)
            .expect("ray points at the triangle");
        assert!((rec.t - 1.0).abs() < 1e-12);
        assert!(rec.front_face);
        assert_eq!(rec.normal, Vec3::Z);
    }

    #[test]
    fn test_triangle_back_face_flips_normal() {
        let tri = facing_triangle();
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);
        let mut rng = StdRng::seed_from_u64(0);

        let rec = tri
            .hit(&ray, Interval::new(1e-4, f64::INFINITY), &mut rng)
            .expect("triangles are two-sided");
        assert!(!rec.front_face);
        assert_eq!(rec.normal, -Vec3::Z);
    }

    #[test]
    fn test_triangle_miss_outside_edges() {
        let tri = facing_triangle();
        let ray = Ray::new_simple(Vec3::new(2.0, 2.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(0);
        assert!(tri.hit(&ray, Interval::new(1e-4, f64::INFINITY), &mut rng).is_none());
    }

    #[test]
    fn test_flat_triangle_box_has_volume() {
        let bbox = facing_triangle().bounding_box().expect("triangles are bounded");
        assert!(bbox.z.size() > 0.0);
        assert!(bbox.z.contains(-1.0));
    }
}
