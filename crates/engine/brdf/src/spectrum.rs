//! RGB spectra and the response returned by a BRDF evaluation

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

/// Linear RGB reflectance
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Spectrum {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Spectrum {
    pub const BLACK: Spectrum = Spectrum::new(0.0, 0.0, 0.0);
    pub const WHITE: Spectrum = Spectrum::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(v: f32) -> Self {
        Self::new(v, v, v)
    }

    /// Rec. 709 relative luminance
    pub fn luminance(&self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn from_array(rgb: [f32; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2])
    }
}

impl Add for Spectrum {
    type Output = Spectrum;

    fn add(self, rhs: Spectrum) -> Spectrum {
        Spectrum::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl Mul<f32> for Spectrum {
    type Output = Spectrum;

    fn mul(self, rhs: f32) -> Spectrum {
        Spectrum::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

/// Result of evaluating a BRDF for one direction pair
///
/// The scalar drives the lobe radius and the color drives the vertex color.
/// They are normally linked through [`Spectrum::luminance`], but a response
/// may carry an explicit scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Response {
    pub color: Spectrum,
    pub scalar: f32,
}

impl Response {
    pub fn new(color: Spectrum, scalar: f32) -> Self {
        Self { color, scalar }
    }

    pub fn to_scalar(&self) -> f32 {
        self.scalar
    }

    pub fn rgb(&self) -> [f32; 3] {
        self.color.to_array()
    }
}

impl From<Spectrum> for Response {
    fn from(color: Spectrum) -> Self {
        Self {
            color,
            scalar: color.luminance(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luminance_of_white_is_one() {
        assert!((Spectrum::WHITE.luminance() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_response_from_spectrum_uses_luminance() {
        let response = Response::from(Spectrum::new(0.0, 1.0, 0.0));
        assert!((response.to_scalar() - 0.7152).abs() < 1e-6);
        assert_eq!(response.rgb(), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_explicit_scalar_is_kept() {
        let response = Response::new(Spectrum::new(0.0, 1.0, 0.0), 0.5);
        assert_eq!(response.to_scalar(), 0.5);
    }
}
