//! Solid axis-aligned box primitive.

use std::sync::Arc;

use rand::RngCore;
use tessel_math::{axis_component, Aabb, Interval, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable};
use crate::Material;

/// Closed box between two corners.
///
/// Intersected directly with a slab test that remembers which slab produced
/// the entry and exit distances; rays starting inside hit the exit face.
pub struct Cuboid {
    bounds: Aabb,
    material: Arc<dyn Material>,
}

impl Cuboid {
    pub fn new(a: Vec3, b: Vec3, material: Arc<dyn Material>) -> Self {
        Self {
            bounds: Aabb::from_points(a, b),
            material,
        }
    }
}

fn axis_normal(axis: usize, sign: f64) -> Vec3 {
    let mut n = [0.0; 3];
    n[axis] = sign;
    Vec3::from_array(n)
}

impl Hittable for Cuboid {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        let origin = ray.origin();
        let inv_dir = ray.inv_direction();

        let (mut t_near, mut near_axis) = (f64::NEG_INFINITY, 0);
        let (mut t_far, mut far_axis) = (f64::INFINITY, 0);

        for axis in 0..3 {
            let slab = self.bounds.axis_interval(axis);
            let o = axis_component(origin, axis);
            let inv_d = axis_component(inv_dir, axis);

            let mut t0 = (slab.min - o) * inv_d;
            let mut t1 = (slab.max - o) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            if t0 > t_near {
                t_near = t0;
                near_axis = axis;
            }
            if t1 < t_far {
                t_far = t1;
                far_axis = axis;
            }
        }

        if t_near > t_far {
            return None;
        }

        let direction = ray.direction();
        let (t, outward_normal) = if ray_t.surrounds(t_near) {
            let sign = -axis_component(direction, near_axis).signum();
            (t_near, axis_normal(near_axis, sign))
        } else if ray_t.surrounds(t_far) {
            let sign = axis_component(direction, far_axis).signum();
            (t_far, axis_normal(far_axis, sign))
        } else {
            return None;
        };

        Some(HitRecord::new(ray, t, outward_normal, self.material.as_ref()))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bounds)
    }
}
