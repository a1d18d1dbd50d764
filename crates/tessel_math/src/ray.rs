use crate::Vec3;

/// Wavelength tag (nm) carried by rays that are not part of a dispersion path.
pub const WHITE_WAVELENGTH: f64 = 550.0;

/// A half-line `origin + t * direction`.
///
/// The reciprocal of the direction is computed once at construction so the
/// slab test can multiply instead of divide. Zero direction components give
/// IEEE-754 infinities there, which the slab test relies on.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    inv_direction: Vec3,
    wavelength: f64,
}

impl Ray {
    /// Create a ray tagged with an explicit wavelength.
    pub fn new(origin: Vec3, direction: Vec3, wavelength: f64) -> Self {
        Self {
            origin,
            direction,
            inv_direction: Vec3::ONE / direction,
            wavelength,
        }
    }

    /// Create a ray tagged with [`WHITE_WAVELENGTH`].
    pub fn new_simple(origin: Vec3, direction: Vec3) -> Self {
        Self::new(origin, direction, WHITE_WAVELENGTH)
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Componentwise `1 / direction`.
    #[inline]
    pub fn inv_direction(&self) -> Vec3 {
        self.inv_direction
    }

    #[inline]
    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    /// Same ray retagged with another wavelength.
    #[inline]
    pub fn with_wavelength(self, wavelength: f64) -> Self {
        Self { wavelength, ..self }
    }

    /// Point along the ray at parameter `t`.
    #[inline]
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + t * self.direction
    }
}
