//! Sphere primitive.

use std::f64::consts::PI;
use std::sync::Arc;

use rand::RngCore;
use tessel_math::{Aabb, Interval, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable};
use crate::Material;

pub struct Sphere {
    center: Vec3,
    radius: f64,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f64, material: Arc<dyn Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        Self {
            center,
            radius,
            material,
            bbox: Aabb::from_points(center - rvec, center + rvec),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Spherical coordinates of a point on the unit sphere, mapped to `[0, 1]²`.
    fn sphere_uv(p: Vec3) -> (f64, f64) {
        let theta = (-p.y).acos();
        let phi = (-p.z).atan2(p.x) + PI;
        (phi / (2.0 * PI), theta / PI)
    }
}

impl Hittable for Sphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        // Nearest root inside the accepted range.
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - self.center) / self.radius;
        let (u, v) = Self::sphere_uv(outward_normal);
        Some(HitRecord::new(ray, root, outward_normal, self.material.as_ref()).with_uv(u, v))
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

    fn unit_sphere_at(z: f64) -> Sphere {
        Sphere::new(
            Vec3::new(0.0, 0.0, z),
            0.5,
            Arc::new(Lambertian::new(Color::splat(0.5))),
        )
    }

    #[test]
    fn test_sphere_hit_from_outside() {
        let sphere = unit_sphere_at(-1.0);
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(0);

        let rec = sphere
            .hit(&ray, Interval::new(1e-4, f64::INFINITY), &mut rng)
            .expect("ray points at the sphere");
        assert!((rec.t - 0.5).abs() < 1e-12);
        assert!(rec.front_face);
        assert_eq!(rec.normal, Vec3::Z);
    }

    #[test]
    fn test_sphere_hit_from_inside_uses_far_root() {
        let sphere = unit_sphere_at(0.0);
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::X);
        let mut rng = StdRng::seed_from_u64(0);

        let rec = sphere
            .hit(&ray, Interval::new(1e-4, f64::INFINITY), &mut rng)
            .expect("ray starts inside");
        assert!((rec.t - 0.5).abs() < 1e-12);
        assert!(!rec.front_face);
        assert_eq!(rec.normal, -Vec3::X);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = unit_sphere_at(-1.0);
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::Y);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(sphere.hit(&ray, Interval::new(1e-4, f64::INFINITY), &mut rng).is_none());
    }

    #[test]
    fn test_sphere_bounding_box() {
        let bbox = unit_sphere_at(-1.0).bounding_box().expect("spheres are bounded");
        assert_eq!(bbox.min(), Vec3::new(-0.5, -0.5, -1.5));
        assert_eq!(bbox.max(), Vec3::new(0.5, 0.5, -0.5));
    }
}
