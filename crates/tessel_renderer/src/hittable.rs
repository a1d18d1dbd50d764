//! Hittable trait and HitRecord for ray-object intersection.

use std::sync::Arc;

use rand::RngCore;
use tessel_math::{Aabb, Interval, Ray, Vec3};

use crate::Material;

/// Result of a successful ray-object intersection.
///
/// Borrowed from the object that produced it and never outlives the query.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Ray parameter of the intersection
    pub t: f64,
    /// Point of intersection
    pub p: Vec3,
    /// Unit surface normal, always facing against the incoming ray
    pub normal: Vec3,
    /// Whether the ray arrived from the outside of the surface
    pub front_face: bool,
    /// Surface parameterization at the hit point
    pub u: f64,
    pub v: f64,
    /// Material of the surface that was hit
    pub material: &'a dyn Material,
}

impl<'a> HitRecord<'a> {
    /// Build a record whose normal is oriented against `ray`.
    pub fn new(ray: &Ray, t: f64, outward_normal: Vec3, material: &'a dyn Material) -> Self {
        let mut rec = Self {
            t,
            p: ray.at(t),
            normal: outward_normal,
            front_face: true,
            u: 0.0,
            v: 0.0,
            material,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Attach surface coordinates.
    pub fn with_uv(mut self, u: f64, v: f64) -> Self {
        self.u = u;
        self.v = v;
        self
    }

    /// Store `outward_normal` flipped if necessary so it faces the ray, and
    /// remember which side was hit.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Anything a ray can intersect.
///
/// Implementations are immutable after construction and shared read-only
/// between render workers.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with `ray` whose parameter lies in `ray_t`.
    ///
    /// `rng` is only consumed by participating media.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>>;

    /// Box enclosing the object, or `None` if it is unbounded.
    fn bounding_box(&self) -> Option<Aabb>;
}

impl<T: Hittable + ?Sized> Hittable for Arc<T> {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        (**self).hit(ray, ray_t, rng)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        (**self).bounding_box()
    }
}

impl<T: Hittable + ?Sized> Hittable for Box<T> {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        (**self).hit(ray, ray_t, rng)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        (**self).bounding_box()
    }
}

/// A linear list of hittable objects.
///
/// Tests every member on each query; use [`crate::BvhNode`] for anything
/// beyond a handful of objects.
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
    bbox: Option<Aabb>,
}

impl HittableList {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: None,
        }
    }

    /// Add an object; the list loses its bounding box if the object has none.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.bbox = if self.objects.is_empty() {
            object.bounding_box()
        } else {
            match (self.bbox, object.bounding_box()) {
                (Some(a), Some(b)) => Some(Aabb::surrounding(&a, &b)),
                _ => None,
            }
        };
        self.objects.push(object);
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.bbox = None;
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Hand the objects over, e.g. to build a BVH.
    pub fn into_objects(self) -> Vec<Box<dyn Hittable>> {
        self.objects
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Box<dyn Hittable>>> for HittableList {
    fn from(objects: Vec<Box<dyn Hittable>>) -> Self {
        let mut list = HittableList::new();
        for object in objects {
            list.add(object);
        }
        list
    }
}

impl Hittable for HittableList {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;

        for object in &self.objects {
            let interval = closest.map_or(ray_t, |rec| ray_t.with_max(rec.t));
            if let Some(rec) = object.hit(ray, interval, rng) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }
}
