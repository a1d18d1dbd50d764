//! Constant-density participating medium.

use rand::RngCore;
use tessel_math::{Aabb, Color, Interval, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable};
use crate::material::Anisotropic;
use crate::random::gen_f64;

/// Homogeneous fog filling a closed, convex boundary.
///
/// A ray entering the boundary travels an exponentially distributed
/// distance before scattering; if that distance exceeds the chord through
/// the volume the ray passes through untouched.
pub struct Fog {
    boundary: Box<dyn Hittable>,
    neg_inv_density: f64,
    phase_function: Anisotropic,
}

impl Fog {
    pub fn new(boundary: Box<dyn Hittable>, density: f64, albedo: Color) -> Self {
        Self::with_phase(boundary, density, Anisotropic::isotropic(albedo))
    }

    pub fn with_phase(boundary: Box<dyn Hittable>, density: f64, phase_function: Anisotropic) -> Self {
        Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase_function,
        }
    }
}

impl Hittable for Fog {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        let entry = self.boundary.hit(ray, Interval::UNIVERSE, rng)?;
        let exit = self
            .boundary
            .hit(ray, Interval::new(entry.t + 1e-4, f64::INFINITY), rng)?;

        let t_enter = entry.t.max(ray_t.min).max(0.0);
        let t_exit = exit.t.min(ray_t.max);
        if t_enter >= t_exit {
            return None;
        }

        let ray_length = ray.direction().length();
        let distance_inside = (t_exit - t_enter) * ray_length;
        let hit_distance = self.neg_inv_density * gen_f64(rng).ln();
        if hit_distance > distance_inside {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;
        // Normal and face are arbitrary inside a volume.
        Some(HitRecord {
            t,
            p: ray.at(t),
            normal: Vec3::X,
            front_face: true,
            u: 0.0,
            v: 0.0,
            material: &self.phase_function,
        })
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.boundary.bounding_box()
    }
}
