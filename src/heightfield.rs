//! Equirectangular DEM height field
//!
//! Wraps a decoded heightmap grid and exposes elevation queries by spherical
//! coordinate, with bilinear interpolation and a seam-free longitude wrap.

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::sync::Arc;

use image::DynamicImage;

use crate::error::{GlobeError, Result};

/// An immutable 2D grid of normalized height samples in `[0, 1]`
///
/// The grid is an equirectangular projection: column 0 is longitude `-π`,
/// row 0 is the north pole (`+π/2` latitude, the `+Y` axis). Queries accept
/// any real longitude (wrapped mod `2π`) and clamp latitude to
/// `[-π/2, π/2]`, so sampling never fails once the field is constructed.
///
/// The sample buffer is shared (`Arc`), so [`inverted`](Self::inverted) and
/// `clone` are cheap even for large DEMs.
///
/// # Example
///
/// ```rust
/// use relief_globe::HeightField;
///
/// let field = HeightField::from_samples(4, 2, vec![0.5; 8], -1000.0, 1000.0).unwrap();
/// assert_eq!(field.elevation_meters(0.0, 0.0), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct HeightField {
    width: usize,
    height: usize,
    samples: Arc<[f32]>,
    min_elevation: f64,
    max_elevation: f64,
    /// When set, every grid fetch yields `1 - sample`. Toggling a flag
    /// instead of rewriting the buffer keeps double inversion bit-exact
    /// (`1 - (1 - s)` is not an identity in floating point).
    inverted: bool,
}

impl HeightField {
    /// Create a height field from a raw sample grid
    ///
    /// `samples` is row-major, row 0 at the north pole, and must contain
    /// exactly `width * height` values in `[0, 1]`. The elevation range maps
    /// sample 0.0 to `min_elevation` meters and 1.0 to `max_elevation`.
    ///
    /// # Errors
    ///
    /// Returns `EmptyHeightField` if either dimension is zero, and
    /// `InvalidConfig` if the buffer length does not match the dimensions
    /// or the elevation range is inverted.
    pub fn from_samples(
        width: usize,
        height: usize,
        samples: Vec<f32>,
        min_elevation: f64,
        max_elevation: f64,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GlobeError::EmptyHeightField);
        }
        if samples.len() != width * height {
            return Err(GlobeError::InvalidConfig(format!(
                "sample buffer holds {} values, expected {}x{} = {}",
                samples.len(),
                width,
                height,
                width * height
            )));
        }
        if min_elevation > max_elevation {
            return Err(GlobeError::InvalidConfig(format!(
                "min elevation {} exceeds max elevation {}",
                min_elevation, max_elevation
            )));
        }
        Ok(Self {
            width,
            height,
            samples: samples.into(),
            min_elevation,
            max_elevation,
            inverted: false,
        })
    }

    /// Create a height field from a decoded grayscale image
    ///
    /// The image is converted to 16-bit grayscale and normalized to `[0, 1]`,
    /// so both 8- and 16-bit DEMs keep their full precision.
    ///
    /// # Errors
    ///
    /// Returns `EmptyHeightField` for a zero-size image.
    pub fn from_image(
        image: &DynamicImage,
        min_elevation: f64,
        max_elevation: f64,
    ) -> Result<Self> {
        let gray = image.to_luma16();
        let (width, height) = (gray.width() as usize, gray.height() as usize);
        let samples: Vec<f32> = gray
            .into_raw()
            .into_iter()
            .map(|v| v as f32 / u16::MAX as f32)
            .collect();
        Self::from_samples(width, height, samples, min_elevation, max_elevation)
    }

    /// Grid width in samples (longitude direction)
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in samples (latitude direction)
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The elevation range `(min, max)` in meters
    #[inline]
    pub fn elevation_range(&self) -> (f64, f64) {
        (self.min_elevation, self.max_elevation)
    }

    /// Fetch one grid sample, applying the inversion flag
    #[inline]
    fn grid(&self, x: usize, y: usize) -> f64 {
        let s = self.samples[y * self.width + x] as f64;
        if self.inverted {
            1.0 - s
        } else {
            s
        }
    }

    /// Sample the normalized height in `[0, 1]` at a spherical coordinate
    ///
    /// Bilinear interpolation between the four nearest grid samples.
    /// Longitude wraps mod `2π` (the interpolation spans the date-line seam
    /// continuously); latitude is clamped to `[-π/2, π/2]`.
    pub fn sample(&self, lon: f64, lat: f64) -> f64 {
        let u = (lon / TAU + 0.5).rem_euclid(1.0);
        let lat = lat.clamp(-FRAC_PI_2, FRAC_PI_2);
        let v = 0.5 - lat / PI;

        // Pixel centers sit at half-integer grid coordinates.
        let x = u * self.width as f64 - 0.5;
        let y = v * self.height as f64 - 0.5;
        let x0f = x.floor();
        let y0f = y.floor();
        let fx = x - x0f;
        let fy = y - y0f;

        let w = self.width as isize;
        let h = self.height as isize;
        let x0 = (x0f as isize).rem_euclid(w) as usize;
        let x1 = (x0f as isize + 1).rem_euclid(w) as usize;
        let y0 = (y0f as isize).clamp(0, h - 1) as usize;
        let y1 = (y0f as isize + 1).clamp(0, h - 1) as usize;

        let top = self.grid(x0, y0) * (1.0 - fx) + self.grid(x1, y0) * fx;
        let bottom = self.grid(x0, y1) * (1.0 - fx) + self.grid(x1, y1) * fx;
        top * (1.0 - fy) + bottom * fy
    }

    /// Sample the elevation in meters at a spherical coordinate
    ///
    /// `min_elevation + sample * (max_elevation - min_elevation)`.
    #[inline]
    pub fn elevation_meters(&self, lon: f64, lat: f64) -> f64 {
        self.min_elevation + self.sample(lon, lat) * (self.max_elevation - self.min_elevation)
    }

    /// The elevation-complement of this field
    ///
    /// Every sample value is replaced by `1 - value` over the same elevation
    /// range, mapping peaks to valleys; this is the cavity surface of the
    /// inner shell. Inverting twice yields a field that samples bit-for-bit
    /// identically to the original.
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            inverted: !self.inverted,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(width: usize, height: usize) -> HeightField {
        let samples = (0..width * height)
            .map(|i| {
                let (x, y) = (i % width, i / width);
                ((x + y) % 2) as f32
            })
            .collect();
        HeightField::from_samples(width, height, samples, 0.0, 1000.0).unwrap()
    }

    #[test]
    fn test_empty_grid_rejected() {
        assert!(matches!(
            HeightField::from_samples(0, 4, vec![], 0.0, 1.0),
            Err(GlobeError::EmptyHeightField)
        ));
        assert!(matches!(
            HeightField::from_samples(4, 0, vec![], 0.0, 1.0),
            Err(GlobeError::EmptyHeightField)
        ));
    }

    #[test]
    fn test_mismatched_buffer_rejected() {
        let result = HeightField::from_samples(4, 4, vec![0.0; 15], 0.0, 1.0);
        assert!(matches!(result, Err(GlobeError::InvalidConfig(_))));
    }

    #[test]
    fn test_inverted_elevation_range_rejected() {
        let result = HeightField::from_samples(2, 2, vec![0.0; 4], 100.0, -100.0);
        assert!(matches!(result, Err(GlobeError::InvalidConfig(_))));
    }

    #[test]
    fn test_uniform_field_samples_flat() {
        let field = HeightField::from_samples(8, 4, vec![0.25; 32], 0.0, 1000.0).unwrap();
        for &(lon, lat) in &[
            (0.0, 0.0),
            (3.0, 1.2),
            (-2.5, -1.5),
            (100.0, 0.3), // far outside [0, 2π), exercises the wrap
        ] {
            assert!((field.sample(lon, lat) - 0.25).abs() < 1e-6);
            assert!((field.elevation_meters(lon, lat) - 250.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_latitude_clamped_beyond_poles() {
        let field = checkerboard(8, 4);
        // Latitudes beyond ±π/2 clamp to the pole rows instead of wrapping.
        assert_eq!(field.sample(1.0, 2.0), field.sample(1.0, FRAC_PI_2));
        assert_eq!(field.sample(1.0, -9.0), field.sample(1.0, -FRAC_PI_2));
    }

    #[test]
    fn test_longitude_wrap_is_continuous() {
        let field = checkerboard(16, 8);
        // Sampling just either side of the date line must agree to first
        // order; a seam would produce a jump of a full sample step.
        let eps = 1e-9;
        let a = field.sample(PI - eps, 0.4);
        let b = field.sample(-PI + eps, 0.4);
        assert!(
            (a - b).abs() < 1e-6,
            "date-line seam: {} vs {}",
            a,
            b
        );
        // And the same physical longitude expressed two ways agrees (up to
        // the rounding of the wrap itself).
        let c = field.sample(0.5, 0.2);
        let d = field.sample(0.5 + TAU, 0.2);
        assert!((c - d).abs() < 1e-9, "wrapped longitude: {} vs {}", c, d);
    }

    #[test]
    fn test_bilinear_between_samples() {
        // 2x1 grid: samples 0 and 1; halfway between the two pixel centers
        // along the equator the interpolated value must be 0.5.
        let field = HeightField::from_samples(2, 1, vec![0.0, 1.0], 0.0, 1.0).unwrap();
        // Pixel centers are at u = 0.25 and u = 0.75; u = 0.5 is midway.
        // u = 0.5 corresponds to lon = 0 with the -π origin at column 0.
        let mid = field.sample(0.0, 0.0);
        assert!((mid - 0.5).abs() < 1e-9, "expected 0.5, got {}", mid);
    }

    #[test]
    fn test_inversion_complements_samples() {
        let field = checkerboard(8, 4);
        let inv = field.inverted();
        for &(lon, lat) in &[(0.3, 0.1), (2.0, -0.7), (-1.0, 1.0)] {
            let s = field.sample(lon, lat);
            let i = inv.sample(lon, lat);
            assert!((s + i - 1.0).abs() < 1e-6, "{} + {} != 1", s, i);
        }
    }

    #[test]
    fn test_double_inversion_is_exact() {
        let samples: Vec<f32> = (0..64).map(|i| (i as f32 / 63.0).powi(2)).collect();
        let field = HeightField::from_samples(8, 8, samples, -500.0, 500.0).unwrap();
        let twice = field.inverted().inverted();
        for &(lon, lat) in &[(0.0, 0.0), (1.7, 0.9), (-2.2, -1.1), (4.0, 0.2)] {
            assert_eq!(
                field.sample(lon, lat).to_bits(),
                twice.sample(lon, lat).to_bits(),
                "double inversion must be bit-exact"
            );
        }
    }

    #[test]
    fn test_from_image_normalizes() {
        let mut img = image::GrayImage::new(4, 2);
        for p in img.pixels_mut() {
            *p = image::Luma([255]);
        }
        let field =
            HeightField::from_image(&DynamicImage::ImageLuma8(img), 0.0, 100.0).unwrap();
        assert_eq!(field.width(), 4);
        assert_eq!(field.height(), 2);
        assert!((field.sample(0.0, 0.0) - 1.0).abs() < 1e-4);
        assert!((field.elevation_meters(0.0, 0.0) - 100.0).abs() < 1e-2);
    }
}
