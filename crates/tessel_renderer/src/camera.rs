//! Thin-lens camera for ray generation.

use rand::RngCore;
use tessel_math::{Ray, Vec3};

use crate::random::random_in_unit_disk;

/// Camera for generating rays into the scene.
///
/// Configure with the builder methods, then call [`Camera::initialize`]
/// before generating rays.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    // Lens settings
    vfov: f64,       // Vertical field of view in degrees
    aperture: f64,   // Lens diameter; 0 is a pinhole
    focus_dist: f64, // Distance from camera to plane of perfect focus

    // Cached computed values (set by initialize())
    origin: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f64,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        let mut camera = Self {
            image_width: 800,
            image_height: 450,
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            aperture: 0.0,
            focus_dist: 1.0,
            origin: Vec3::ZERO,
            lower_left_corner: Vec3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            lens_radius: 0.0,
        };
        camera.initialize();
        camera
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f64, aperture: f64, focus_dist: f64) -> Self {
        self.vfov = vfov;
        self.aperture = aperture.max(0.0);
        self.focus_dist = focus_dist;
        self
    }

    /// Derive the viewport from the current settings.
    pub fn initialize(&mut self) {
        let aspect_ratio = self.image_width.max(1) as f64 / self.image_height.max(1) as f64;

        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = viewport_height * aspect_ratio;

        // Camera basis
        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        self.origin = self.look_from;
        self.horizontal = self.focus_dist * viewport_width * self.u;
        self.vertical = self.focus_dist * viewport_height * self.v;
        self.lower_left_corner = self.origin
            - self.horizontal / 2.0
            - self.vertical / 2.0
            - self.focus_dist * self.w;
        self.lens_radius = self.aperture / 2.0;
    }

    /// Reposition the camera, keeping lens and resolution.
    pub fn move_to(&mut self, look_from: Vec3, look_at: Vec3) {
        self.look_from = look_from;
        self.look_at = look_at;
        self.initialize();
    }

    /// Ray through viewport coordinates `(s, t)` in `[0, 1]²`, `t = 0` at the
    /// bottom edge. Jittered over the lens disk when the aperture is open.
    pub fn get_ray(&self, s: f64, t: f64, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3::ZERO
        };

        let origin = self.origin + offset;
        let target = self.lower_left_corner + s * self.horizontal + t * self.vertical;
        Ray::new_simple(origin, target - origin)
    }

    pub fn look_from(&self) -> Vec3 {
        self.look_from
    }

    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pinhole(width: u32, height: u32) -> Camera {
        let mut camera = Camera::new()
            .with_resolution(width, height)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0);
        camera.initialize();
        camera
    }

    #[test]
    fn test_camera_initialize() {
        let camera = pinhole(800, 600);
        assert_eq!(camera.origin, Vec3::ZERO);
        assert!((camera.w - Vec3::Z).length() < 1e-12);
        assert!((camera.u - Vec3::X).length() < 1e-12);
        assert!((camera.v - Vec3::Y).length() < 1e-12);
    }

    #[test]
    fn test_center_ray_points_forward() {
        let camera = pinhole(100, 100);
        let mut rng = StdRng::seed_from_u64(42);

        let ray = camera.get_ray(0.5, 0.5, &mut rng);
        assert_eq!(ray.origin(), Vec3::ZERO);
        assert!((ray.direction().normalize() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-12);
    }

    #[test]
    fn test_bottom_left_corner_ray() {
        // 90 degree fov: the viewport spans [-1, 1] at distance 1
        let camera = pinhole(100, 100);
        let mut rng = StdRng::seed_from_u64(42);

        let ray = camera.get_ray(0.0, 0.0, &mut rng);
        assert!((ray.direction() - Vec3::new(-1.0, -1.0, -1.0)).length() < 1e-9);
    }

    #[test]
    fn test_aperture_jitters_origin_on_lens() {
        let mut camera = Camera::new()
            .with_resolution(100, 100)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 2.0, 5.0);
        camera.initialize();
        let mut rng = StdRng::seed_from_u64(42);

        let mut moved = false;
        for _ in 0..16 {
            let ray = camera.get_ray(0.5, 0.5, &mut rng);
            assert!(ray.origin().length() < 1.0);
            assert_eq!(ray.origin().z, 0.0);
            // All lens samples converge on the focus plane
            let focus = ray.at(1.0);
            assert!((focus - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-9);
            moved |= ray.origin() != Vec3::ZERO;
        }
        assert!(moved);
    }

    #[test]
    fn test_move_to_rebuilds_basis() {
        let mut camera = pinhole(100, 100);
        camera.move_to(Vec3::new(5.0, 0.0, 0.0), Vec3::ZERO);
        let mut rng = StdRng::seed_from_u64(42);

        let ray = camera.get_ray(0.5, 0.5, &mut rng);
        assert_eq!(ray.origin(), Vec3::new(5.0, 0.0, 0.0));
        assert!((ray.direction().normalize() + Vec3::X).length() < 1e-12);
        assert_eq!(camera.look_from(), Vec3::new(5.0, 0.0, 0.0));
    }
}
