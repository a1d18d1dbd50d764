//! Surface and volume scattering models.
//!
//! Materials are immutable and shared between primitives and threads as
//! `Arc<dyn Material>`; hit records only borrow them.

use std::f64::consts::PI;
use std::sync::Arc;

use rand::RngCore;
use tessel_math::{Color, Ray, Vec3};

use crate::hittable::HitRecord;
use crate::random::{gen_f64, random_in_unit_sphere, random_unit_vector};

/// Directions shorter than this are treated as degenerate scatter results.
const DEGENERATE_DIRECTION: f64 = 1e-8;

/// Outcome of a successful scatter event.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// Throughput multiplier applied to the path
    pub attenuation: Color,
    /// The outgoing ray
    pub scattered: Ray,
}

impl ScatterResult {
    pub fn new(attenuation: Color, scattered: Ray) -> Self {
        Self {
            attenuation,
            scattered,
        }
    }
}

/// How light interacts with a surface or medium.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult>;

    /// Radiance emitted towards `ray_in` at the hit point. Black by default.
    fn emitted(&self, _ray_in: &Ray, _rec: &HitRecord) -> Color {
        Color::ZERO
    }
}

/// Diffuse ray leaving `rec` with a cosine-weighted distribution.
fn diffuse_direction(rec: &HitRecord, rng: &mut dyn RngCore) -> Vec3 {
    let direction = rec.normal + random_unit_vector(rng);
    if direction.length_squared() < DEGENERATE_DIRECTION {
        rec.normal
    } else {
        direction
    }
}

/// Lambertian (ideal diffuse) reflector.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let direction = diffuse_direction(rec, rng);
        let scattered = Ray::new(rec.p, direction, ray_in.wavelength());
        Some(ScatterResult::new(self.albedo, scattered))
    }
}

/// Reflective metal with optional roughness.
#[derive(Debug, Clone)]
pub struct Metal {
    albedo: Color,
    fuzz: f64,
}

impl Metal {
    /// `fuzz` is clamped to `[0, 1]`; 0 is a perfect mirror.
    pub fn new(albedo: Color, fuzz: f64) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.direction().normalize(), rec.normal);
        let direction = reflected + self.fuzz * random_in_unit_sphere(rng);

        // Fuzz can push the ray below the surface; absorb it there.
        if direction.dot(rec.normal) > 0.0 {
            let scattered = Ray::new(rec.p, direction, ray_in.wavelength());
            Some(ScatterResult::new(self.albedo, scattered))
        } else {
            None
        }
    }
}

/// Mix of a mirror and a diffuse lobe, chosen per scatter event.
#[derive(Debug, Clone)]
pub struct Specular {
    albedo: Color,
    diffuse_probability: f64,
}

impl Specular {
    /// `diffuse_probability` is the chance of a diffuse bounce instead of a mirror one.
    pub fn new(albedo: Color, diffuse_probability: f64) -> Self {
        Self {
            albedo,
            diffuse_probability: diffuse_probability.clamp(0.0, 1.0),
        }
    }
}

impl Material for Specular {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let direction = if gen_f64(rng) < self.diffuse_probability {
            diffuse_direction(rec, rng)
        } else {
            reflect(ray_in.direction().normalize(), rec.normal)
        };

        if direction.dot(rec.normal) > 0.0 {
            let scattered = Ray::new(rec.p, direction, ray_in.wavelength());
            Some(ScatterResult::new(self.albedo, scattered))
        } else {
            None
        }
    }
}

/// Refractive material such as glass or water.
#[derive(Debug, Clone)]
pub struct Dielectric {
    albedo: Color,
    /// Index of refraction
    ior: f64,
    /// Radius of the random perturbation applied to refracted rays (frosted glass)
    blur: f64,
    /// Cauchy-style dispersion coefficient in nm; `None` disables dispersion
    dispersion: Option<f64>,
}

impl Dielectric {
    /// Clear dielectric: 1.0 = air, 1.5 = glass, 2.4 = diamond.
    pub fn new(ior: f64) -> Self {
        Self {
            albedo: Color::ONE,
            ior,
            blur: 0.0,
            dispersion: None,
        }
    }

    pub fn with_albedo(mut self, albedo: Color) -> Self {
        self.albedo = albedo;
        self
    }

    pub fn with_blur(mut self, blur: f64) -> Self {
        self.blur = blur.max(0.0);
        self
    }

    /// Make the index depend on the ray's wavelength: `ior + coefficient / wavelength`.
    pub fn with_dispersion(mut self, coefficient: f64) -> Self {
        self.dispersion = Some(coefficient);
        self
    }

    fn index_at(&self, wavelength: f64) -> f64 {
        match self.dispersion {
            Some(coefficient) => self.ior + coefficient / wavelength,
            None => self.ior,
        }
    }

    /// Schlick's approximation of Fresnel reflectance.
    fn reflectance(cosine: f64, ratio: f64) -> f64 {
        let r0 = ((1.0 - ratio) / (1.0 + ratio)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let ior = self.index_at(ray_in.wavelength());
        let ratio = if rec.front_face { 1.0 / ior } else { ior };

        let unit_direction = ray_in.direction().normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        let cannot_refract = ratio * sin_theta > 1.0;
        let direction = if cannot_refract || Self::reflectance(cos_theta, ratio) > gen_f64(rng) {
            reflect(unit_direction, rec.normal)
        } else {
            let refracted = refract(unit_direction, rec.normal, ratio);
            if self.blur > 0.0 {
                refracted + self.blur * random_in_unit_sphere(rng)
            } else {
                refracted
            }
        };

        let scattered = Ray::new(rec.p, direction, ray_in.wavelength());
        Some(ScatterResult::new(self.albedo, scattered))
    }
}

/// Area light that emits uniformly and absorbs everything.
#[derive(Debug, Clone)]
pub struct DiffuseLight {
    emit: Color,
}

impl DiffuseLight {
    pub fn new(emit: Color) -> Self {
        Self { emit }
    }
}

impl Material for DiffuseLight {
    fn scatter(&self, _ray_in: &Ray, _rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterResult> {
        None
    }

    fn emitted(&self, _ray_in: &Ray, _rec: &HitRecord) -> Color {
        self.emit
    }
}

/// White diffuse surface that also emits towards rays arriving within
/// `angle` degrees of its normal.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    emit: Color,
    /// Emission happens while `dot(direction, normal)` is below this
    max_scalar_product: f64,
}

impl DirectionalLight {
    pub fn new(emit: Color, angle_degrees: f64) -> Self {
        Self {
            emit,
            max_scalar_product: -angle_degrees.to_radians().cos(),
        }
    }
}

impl Material for DirectionalLight {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let direction = diffuse_direction(rec, rng);
        let scattered = Ray::new(rec.p, direction, ray_in.wavelength());
        Some(ScatterResult::new(Color::ONE, scattered))
    }

    fn emitted(&self, ray_in: &Ray, rec: &HitRecord) -> Color {
        if ray_in.direction().normalize().dot(rec.normal) < self.max_scalar_product {
            self.emit
        } else {
            Color::ZERO
        }
    }
}

/// Phase function for participating media.
///
/// `anisotropy` biases scattering along the incoming direction; 0 is isotropic.
#[derive(Debug, Clone)]
pub struct Anisotropic {
    albedo: Color,
    anisotropy: f64,
}

impl Anisotropic {
    pub fn new(albedo: Color, anisotropy: f64) -> Self {
        Self { albedo, anisotropy }
    }

    pub fn isotropic(albedo: Color) -> Self {
        Self::new(albedo, 0.0)
    }
}

impl Material for Anisotropic {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let mut direction =
            random_in_unit_sphere(rng) + ray_in.direction().normalize() * self.anisotropy;
        if direction.length_squared() < DEGENERATE_DIRECTION {
            direction = rec.normal;
        }
        let scattered = Ray::new(rec.p, direction, ray_in.wavelength());
        Some(ScatterResult::new(self.albedo, scattered))
    }
}

/// Thin-film interference coating (soap bubbles, oil slicks).
///
/// Transmission probability comes from the Airy summation of the two film
/// interfaces for the ray's wavelength; reflected rays mirror, transmitted
/// rays either pass straight through or are handed to `underlying`.
#[derive(Clone)]
pub struct ThinFilm {
    albedo: Color,
    /// Film thickness in nm
    thickness: f64,
    /// Index of the surrounding medium, the film, and the substrate
    n0: f64,
    n1: f64,
    n2: f64,
    underlying: Option<Arc<dyn Material>>,
}

impl ThinFilm {
    pub fn new(albedo: Color, thickness: f64, film_index: f64) -> Self {
        Self {
            albedo,
            thickness,
            n0: 1.0,
            n1: film_index,
            n2: 1.0,
            underlying: None,
        }
    }

    /// Coat another material; transmitted rays scatter off it.
    pub fn over(mut self, underlying: Arc<dyn Material>) -> Self {
        self.underlying = Some(underlying);
        self
    }

    /// Fraction of light transmitted through the film.
    fn transmittance(&self, cos0: f64, wavelength: f64) -> f64 {
        let (n0, n1, n2) = (self.n0, self.n1, self.n2);

        let sin1_sq = (n0 / n1).powi(2) * (1.0 - cos0 * cos0);
        let sin2_sq = (n0 / n2).powi(2) * (1.0 - cos0 * cos0);
        if sin1_sq > 1.0 || sin2_sq > 1.0 {
            return 1.0;
        }
        let cos1 = (1.0 - sin1_sq).sqrt();
        let cos2 = (1.0 - sin2_sq).sqrt();

        // Phase jumps on reflection off an optically denser medium.
        let d10 = if n1 > n0 { 0.0 } else { PI };
        let d12 = if n1 > n2 { 0.0 } else { PI };
        let delta = d10 + d12;

        let alpha_s = rs(n1, n0, cos1, cos0) * rs(n1, n2, cos1, cos2);
        let alpha_p = rp(n1, n0, cos1, cos0) * rp(n1, n2, cos1, cos2);
        let beta_s = ts(n0, n1, cos0, cos1) * ts(n1, n2, cos1, cos2);
        let beta_p = tp(n0, n1, cos0, cos1) * tp(n1, n2, cos1, cos2);

        let phi = (2.0 * PI / wavelength) * (2.0 * n1 * self.thickness * cos1) + delta;

        let t_s = beta_s.powi(2) / (alpha_s.powi(2) - 2.0 * alpha_s * phi.cos() + 1.0);
        let t_p = beta_p.powi(2) / (alpha_p.powi(2) - 2.0 * alpha_p * phi.cos() + 1.0);

        // Energy conservation across the beam cross-section; unpolarized light.
        let beam_ratio = (n2 * cos2) / (n0 * cos0);
        beam_ratio * (t_s + t_p) / 2.0
    }
}

impl Material for ThinFilm {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let cos0 = ray_in.direction().normalize().dot(rec.normal).abs();
        let transmitted = gen_f64(rng) < self.transmittance(cos0, ray_in.wavelength());

        if transmitted {
            match &self.underlying {
                Some(material) => material.scatter(ray_in, rec, rng).map(|result| {
                    ScatterResult::new(result.attenuation * self.albedo, result.scattered)
                }),
                None => {
                    let scattered = Ray::new(rec.p, ray_in.direction(), ray_in.wavelength());
                    Some(ScatterResult::new(self.albedo, scattered))
                }
            }
        } else {
            let reflected = reflect(ray_in.direction().normalize(), rec.normal);
            let scattered = Ray::new(rec.p, reflected, ray_in.wavelength());
            Some(ScatterResult::new(self.albedo, scattered))
        }
    }
}

/// Amplitude reflection coefficient (s-polarized).
fn rs(n1: f64, n2: f64, cos_i: f64, cos_t: f64) -> f64 {
    (n1 * cos_i - n2 * cos_t) / (n1 * cos_i + n2 * cos_t)
}

/// Amplitude reflection coefficient (p-polarized).
fn rp(n1: f64, n2: f64, cos_i: f64, cos_t: f64) -> f64 {
    (n2 * cos_i - n1 * cos_t) / (n1 * cos_t + n2 * cos_i)
}

/// Amplitude transmission coefficient (s-polarized).
fn ts(n1: f64, n2: f64, cos_i: f64, cos_t: f64) -> f64 {
    2.0 * n1 * cos_i / (n1 * cos_i + n2 * cos_t)
}

/// Amplitude transmission coefficient (p-polarized).
fn tp(n1: f64, n2: f64, cos_i: f64, cos_t: f64) -> f64 {
    2.0 * n1 * cos_i / (n1 * cos_t + n2 * cos_i)
}

/// Debug material that emits the shading normal as a color.
#[derive(Debug, Clone)]
pub struct NormalShade {
    saturation: f64,
}

impl NormalShade {
    pub fn new(saturation: f64) -> Self {
        Self { saturation }
    }
}

impl Default for NormalShade {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Material for NormalShade {
    fn scatter(&self, _ray_in: &Ray, _rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterResult> {
        None
    }

    fn emitted(&self, _ray_in: &Ray, rec: &HitRecord) -> Color {
        0.5 * (self.saturation * rec.normal + Color::ONE)
    }
}

/// Reflect `v` about the normal `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract the unit vector `uv` through a surface with normal `n`.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f64) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn head_on_hit<'a>(material: &'a dyn Material) -> (Ray, HitRecord<'a>) {
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = HitRecord::new(&ray, 2.0, Vec3::Z, material);
        (ray, rec)
    }

    #[test]
    fn test_lambertian_scatters_into_hemisphere() {
        let material = Lambertian::new(Color::new(0.8, 0.2, 0.1));
        let (ray, rec) = head_on_hit(&material);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..64 {
            let result = material.scatter(&ray, &rec, &mut rng).expect("diffuse always scatters");
            assert_eq!(result.attenuation, Color::new(0.8, 0.2, 0.1));
            assert!(result.scattered.direction().dot(rec.normal) >= 0.0);
            assert_eq!(result.scattered.origin(), rec.p);
        }
    }

    #[test]
    fn test_mirror_metal_reflects_exactly() {
        let material = Metal::new(Color::ONE, 0.0);
        let ray = Ray::new_simple(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let rec = HitRecord::new(&ray, 1.0, Vec3::Y, &material);
        let mut rng = StdRng::seed_from_u64(3);

        let result = material.scatter(&ray, &rec, &mut rng).expect("mirror reflects");
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((result.scattered.direction() - expected).length() < 1e-12);
    }

    #[test]
    fn test_light_emits_and_absorbs() {
        let material = DiffuseLight::new(Color::new(4.0, 4.0, 4.0));
        let (ray, rec) = head_on_hit(&material);
        let mut rng = StdRng::seed_from_u64(3);

        assert!(material.scatter(&ray, &rec, &mut rng).is_none());
        assert_eq!(material.emitted(&ray, &rec), Color::splat(4.0));
    }

    #[test]
    fn test_directional_light_only_emits_head_on() {
        let material = DirectionalLight::new(Color::ONE, 30.0);
        let (ray, rec) = head_on_hit(&material);
        assert_eq!(material.emitted(&ray, &rec), Color::ONE);

        let grazing = Ray::new_simple(Vec3::new(-5.0, 0.0, 0.1), Vec3::new(1.0, 0.0, -0.02));
        let grazing_rec = HitRecord::new(&grazing, 5.0, Vec3::Z, &material);
        assert_eq!(material.emitted(&grazing, &grazing_rec), Color::ZERO);
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        let material = Dielectric::new(1.5);
        // Leaving the glass at a shallow angle, from the inside.
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(1.0, 0.2, 0.0));
        let rec = HitRecord::new(&ray, 1.0, Vec3::Y, &material);
        assert!(!rec.front_face);

        let mut rng = StdRng::seed_from_u64(3);
        let result = material.scatter(&ray, &rec, &mut rng).expect("glass always scatters");
        assert!(result.scattered.direction().y < 0.0, "ray must stay inside");
    }

    #[test]
    fn test_dispersion_shifts_index_by_wavelength() {
        let glass = Dielectric::new(1.5).with_dispersion(44.0);
        assert!(glass.index_at(400.0) > glass.index_at(700.0));
        assert_eq!(Dielectric::new(1.5).index_at(400.0), 1.5);
    }

    #[test]
    fn test_thin_film_transmittance_is_a_probability() {
        let film = ThinFilm::new(Color::ONE, 400.0, 1.33);
        for wavelength in [400.0, 550.0, 700.0] {
            for cos0 in [0.1, 0.5, 1.0] {
                let t = film.transmittance(cos0, wavelength);
                assert!((0.0..=1.0 + 1e-9).contains(&t), "t = {t}");
            }
        }
    }

    #[test]
    fn test_normal_shade_maps_normal_to_color() {
        let material = NormalShade::default();
        let (ray, rec) = head_on_hit(&material);
        assert_eq!(material.emitted(&ray, &rec), Color::new(0.5, 0.5, 1.0));
    }
}
