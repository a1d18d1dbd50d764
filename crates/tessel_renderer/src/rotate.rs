use rand::RngCore;
use tessel_math::{Aabb, Interval, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable};

/// Rotates another object about the world Y axis.
///
/// Rays are brought into object space, and hit points and normals back out.
/// Rotation preserves the angle between ray and normal, so the face
/// orientation computed by the inner object stays valid.
pub struct RotateY {
    object: Box<dyn Hittable>,
    sin_theta: f64,
    cos_theta: f64,
    bbox: Option<Aabb>,
}

impl RotateY {
    pub fn new(object: Box<dyn Hittable>, angle_degrees: f64) -> Self {
        let (sin_theta, cos_theta) = angle_degrees.to_radians().sin_cos();
        let bbox = object.bounding_box().map(|inner| {
            let lo = inner.min();
            let hi = inner.max();
            let mut min = Vec3::INFINITY;
            let mut max = Vec3::NEG_INFINITY;
            for corner in 0..8 {
                let x = if corner & 1 == 0 { lo.x } else { hi.x };
                let y = if corner & 2 == 0 { lo.y } else { hi.y };
                let z = if corner & 4 == 0 { lo.z } else { hi.z };
                let rotated = Vec3::new(cos_theta * x + sin_theta * z, y, -sin_theta * x + cos_theta * z);
                min = min.min(rotated);
                max = max.max(rotated);
            }
            Aabb::from_points(min, max)
        });

        Self {
            object,
            sin_theta,
            cos_theta,
            bbox,
        }
    }

    /// World to object space.
    fn to_object(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x - self.sin_theta * v.z,
            v.y,
            self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }

    /// Object to world space.
    fn to_world(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x + self.sin_theta * v.z,
            v.y,
            -self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }
}

impl Hittable for RotateY {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        let rotated = Ray::new(
            self.to_object(ray.origin()),
            self.to_object(ray.direction()),
            ray.wavelength(),
        );

        let mut rec = self.object.hit(&rotated, ray_t, rng)?;
        rec.p = self.to_world(rec.p);
        rec.normal = self.to_world(rec.normal);
        Some(rec)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }
}
