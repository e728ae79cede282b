//! Sphere Parameters and Planetary Body Presets
//!
//! This module provides the immutable parameter set consumed by the
//! triangulator and the registry of per-body presets.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GlobeError, Result};

/// Planetary body presets with published radius and elevation ranges
///
/// Each body maps to a full [`SphereParameters`] set tuned for printing that
/// body's relief at a printable triangle count.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Body {
    /// Mercury: Caloris Basin relief, radius 2,439.7 km
    Mercury,
    /// Venus: Maxwell Montes relief, radius 6,051.8 km
    Venus,
    /// Earth: Everest to Mariana Trench, radius 6,373.9 km
    Earth,
    /// Mars: Olympus Mons to Hellas Planitia, radius 3,389.5 km
    Mars,
    /// Jupiter: no solid surface, synthetic cloud-band relief
    Jupiter,
    /// Saturn: no solid surface, synthetic cloud-band relief
    Saturn,
    /// Uranus: no solid surface, synthetic cloud-band relief
    Uranus,
    /// Neptune: no solid surface, synthetic cloud-band relief
    Neptune,
    /// The Moon: Mons Huygens to Mare Imbrium, radius 1,737.1 km
    Moon,
    /// Pluto: Tenzing Montes to Sputnik Planitia, radius 1,188.3 km
    Pluto,
}

impl Body {
    /// All bodies with presets, in solar-system order.
    pub const ALL: [Body; 10] = [
        Body::Mercury,
        Body::Venus,
        Body::Earth,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Moon,
        Body::Pluto,
    ];

    /// Get a human-readable name for this body
    pub fn name(self) -> &'static str {
        match self {
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Earth => "Earth",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Moon => "Moon",
            Body::Pluto => "Pluto",
        }
    }

    /// Look up a body by name, case-insensitively
    ///
    /// # Example
    ///
    /// ```rust
    /// use relief_globe::Body;
    ///
    /// assert_eq!(Body::from_name("mars"), Some(Body::Mars));
    /// assert_eq!(Body::from_name("MOON"), Some(Body::Moon));
    /// assert_eq!(Body::from_name("Vulcan"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Body> {
        Body::ALL
            .iter()
            .copied()
            .find(|b| b.name().eq_ignore_ascii_case(name))
    }

    /// Get the preset parameters for this body
    ///
    /// Radii and elevation ranges are in meters. Gas giants have no solid
    /// surface; their presets pair a small synthetic elevation range with a
    /// large exaggeration so cloud-band DEMs still produce visible relief.
    pub fn parameters(self) -> SphereParameters {
        let (min_depth, max_depth, mean_radius, min_elev, max_elev, tolerance, exaggeration) =
            match self {
                Body::Mercury => (9, 12, 2_439_700.0, -5_380.0, 4_480.0, 30.0, 5.0),
                Body::Venus => (6, 10, 6_051_800.0, -1_000.0, 11_000.0, 50.0, 15.0),
                Body::Earth => (6, 11, 6_373_934.0, -10_900.0, 8_849.0, 30.0, 15.0),
                Body::Mars => (9, 12, 3_389_500.0, -11_000.0, 21_900.0, 30.0, 15.0),
                Body::Jupiter => (9, 12, 69_911_000.0, -5_000.0, 5_000.0, 30.0, 100.0),
                Body::Saturn => (6, 10, 58_232_000.0, -1_000.0, 1_000.0, 50.0, 30.0),
                Body::Uranus => (6, 10, 25_362_000.0, -1_000.0, 1_000.0, 50.0, 30.0),
                Body::Neptune => (6, 10, 24_622_000.0, -1_000.0, 1_000.0, 50.0, 30.0),
                Body::Moon => (6, 11, 1_737_100.0, -9_000.0, 10_800.0, 30.0, 15.0),
                Body::Pluto => (6, 12, 1_188_300.0, -4_101.0, 6_491.0, 50.0, 3.0),
            };

        SphereParameters {
            mean_radius,
            min_elevation: min_elev,
            max_elevation: max_elev,
            tolerance,
            exaggeration,
            scale: 1.0,
            min_depth,
            max_depth,
            inner_shell_scale: 0.9,
        }
    }
}

/// Immutable parameter set for one triangulation run
///
/// All lengths are in meters. The same parameters with the same height field
/// always produce the identical mesh.
///
/// # Example
///
/// ```rust
/// use relief_globe::*;
///
/// let params = SphereParametersBuilder::new()
///     .mean_radius(1_737_100.0)
///     .unwrap()
///     .elevation_range(-9_000.0, 10_800.0)
///     .depth_range(6, 11)
///     .tolerance(30.0)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(params.max_depth, 11);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereParameters {
    /// Mean body radius in meters (sphere surface at elevation zero)
    pub mean_radius: f64,

    /// Elevation in meters that a height sample of 0.0 maps to
    pub min_elevation: f64,

    /// Elevation in meters that a height sample of 1.0 maps to
    pub max_elevation: f64,

    /// Maximum allowed geometric deviation between the mesh and the
    /// displaced sphere surface, in real-world meters
    pub tolerance: f64,

    /// Multiplier applied to elevation before displacement
    ///
    /// Planetary relief is tiny relative to planetary radii; values of
    /// 5-100 make it visible on a printed globe.
    pub exaggeration: f64,

    /// Uniform scale applied to all output coordinates
    ///
    /// Typically normalizes the model to print size, e.g. `1.0 / mean_radius`
    /// for a unit-radius globe.
    pub scale: f64,

    /// Subdivision floor: every cell shallower than this is split,
    /// guaranteeing a baseline mesh density even over flat terrain
    pub min_depth: u32,

    /// Subdivision ceiling: hard bound on recursion depth and therefore on
    /// triangle count (at most `6 * 4^max_depth * 2` before seam stitching)
    pub max_depth: u32,

    /// Ratio of the inner shell's scale to the outer shell's scale
    ///
    /// Controls the printed wall thickness; must be in `(0, 1]`.
    pub inner_shell_scale: f64,
}

impl SphereParameters {
    /// Check every invariant the triangulator relies on
    ///
    /// Called by [`build`](SphereParametersBuilder::build) and again by the
    /// triangulator before any traversal begins, so hand-constructed
    /// parameter values are rejected just like built ones.
    pub fn validate(&self) -> Result<()> {
        if !(self.mean_radius > 0.0) {
            return Err(GlobeError::InvalidConfig(format!(
                "mean radius must be positive (got {})",
                self.mean_radius
            )));
        }
        if self.min_elevation > self.max_elevation {
            return Err(GlobeError::InvalidConfig(format!(
                "min elevation {} exceeds max elevation {}",
                self.min_elevation, self.max_elevation
            )));
        }
        if !(self.tolerance > 0.0) {
            return Err(GlobeError::InvalidConfig(format!(
                "tolerance must be positive (got {})",
                self.tolerance
            )));
        }
        if !(self.exaggeration >= 0.0) {
            return Err(GlobeError::InvalidConfig(format!(
                "exaggeration must be non-negative (got {})",
                self.exaggeration
            )));
        }
        if !(self.scale > 0.0) {
            return Err(GlobeError::InvalidConfig(format!(
                "scale must be positive (got {})",
                self.scale
            )));
        }
        if self.min_depth > self.max_depth {
            return Err(GlobeError::InvalidConfig(format!(
                "min depth {} exceeds max depth {}",
                self.min_depth, self.max_depth
            )));
        }
        if self.max_depth > MAX_SUPPORTED_DEPTH {
            return Err(GlobeError::InvalidConfig(format!(
                "max depth must be <= {} (got {})",
                MAX_SUPPORTED_DEPTH, self.max_depth
            )));
        }
        if !(self.inner_shell_scale > 0.0 && self.inner_shell_scale <= 1.0) {
            return Err(GlobeError::InvalidConfig(format!(
                "inner shell scale must be in (0, 1] (got {})",
                self.inner_shell_scale
            )));
        }
        // The displaced radius scale * (mean_radius + exaggeration * elevation)
        // is smallest at min_elevation; it must stay positive everywhere.
        if self.mean_radius + self.exaggeration * self.min_elevation <= 0.0 {
            return Err(GlobeError::InvalidConfig(format!(
                "exaggerated minimum elevation {} collapses the sphere (mean radius {})",
                self.exaggeration * self.min_elevation,
                self.mean_radius
            )));
        }
        Ok(())
    }

    /// Deterministic output file name for this parameter set
    ///
    /// `shell_tag` distinguishes the two shells when they are written to
    /// separate files (`Some("outer")` / `Some("inner")`); `None` names a
    /// combined file.
    ///
    /// # Example
    ///
    /// ```rust
    /// use relief_globe::Body;
    ///
    /// let params = Body::Mars.parameters();
    /// assert_eq!(
    ///     params.output_file_name("Mars", Some("outer")),
    ///     "Mars_outer_9_12_30_15.stl"
    /// );
    /// assert_eq!(params.output_file_name("Mars", None), "Mars_9_12_30_15.stl");
    /// ```
    pub fn output_file_name(&self, body: &str, shell_tag: Option<&str>) -> String {
        let stem = format!(
            "{}_{}_{}_{}",
            self.min_depth,
            self.max_depth,
            fmt_compact(self.tolerance),
            fmt_compact(self.exaggeration)
        );
        match shell_tag {
            Some(tag) => format!("{}_{}_{}.stl", body, tag, stem),
            None => format!("{}_{}.stl", body, stem),
        }
    }
}

/// Hard ceiling on `max_depth`
///
/// Depth 13 already allows ~800 million triangles per shell; deeper settings
/// are impractical to print and would overflow the STL u32 triangle count.
pub const MAX_SUPPORTED_DEPTH: u32 = 13;

/// Format a numeric parameter without a trailing `.0` for file names
fn fmt_compact(x: f64) -> String {
    if x == x.trunc() && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{}", x)
    }
}

/// Builder for creating SphereParameters with validation
///
/// Uses the builder pattern to create parameter sets with sensible defaults.
/// Setters with an obvious local constraint validate immediately; cross-field
/// constraints are checked in [`build`](Self::build).
///
/// # Example
///
/// ```rust
/// use relief_globe::*;
///
/// // Start from a body preset and override a few fields
/// let params = SphereParametersBuilder::from_body(Body::Moon)
///     .exaggeration(20.0)
///     .unwrap()
///     .depth_range(5, 9)
///     .build()
///     .unwrap();
///
/// assert_eq!(params.exaggeration, 20.0);
/// assert_eq!(params.mean_radius, 1_737_100.0);
/// ```
#[derive(Debug, Clone)]
pub struct SphereParametersBuilder {
    params: SphereParameters,
}

impl SphereParametersBuilder {
    /// Create a builder with neutral defaults: a unit sphere with no relief
    ///
    /// Defaults: radius 1 m, elevation range `[0, 0]`, tolerance 0.01 m,
    /// exaggeration 1, scale 1, depths 0..=5, inner shell scale 0.9.
    pub fn new() -> Self {
        Self {
            params: SphereParameters {
                mean_radius: 1.0,
                min_elevation: 0.0,
                max_elevation: 0.0,
                tolerance: 0.01,
                exaggeration: 1.0,
                scale: 1.0,
                min_depth: 0,
                max_depth: 5,
                inner_shell_scale: 0.9,
            },
        }
    }

    /// Start from a body preset
    pub fn from_body(body: Body) -> Self {
        Self {
            params: body.parameters(),
        }
    }

    /// Set the mean body radius in meters
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the radius is not positive
    pub fn mean_radius(mut self, meters: f64) -> Result<Self> {
        if !(meters > 0.0) {
            return Err(GlobeError::InvalidConfig(format!(
                "mean radius must be positive (got {})",
                meters
            )));
        }
        self.params.mean_radius = meters;
        Ok(self)
    }

    /// Set the elevation range in meters that samples 0.0 and 1.0 map to
    ///
    /// Ordering is checked in [`build`](Self::build) so the two bounds can be
    /// set in either call order.
    pub fn elevation_range(mut self, min_meters: f64, max_meters: f64) -> Self {
        self.params.min_elevation = min_meters;
        self.params.max_elevation = max_meters;
        self
    }

    /// Set the geometric error tolerance in meters
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the tolerance is not positive
    pub fn tolerance(mut self, meters: f64) -> Result<Self> {
        if !(meters > 0.0) {
            return Err(GlobeError::InvalidConfig(format!(
                "tolerance must be positive (got {})",
                meters
            )));
        }
        self.params.tolerance = meters;
        Ok(self)
    }

    /// Set the elevation exaggeration factor
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the factor is negative
    pub fn exaggeration(mut self, factor: f64) -> Result<Self> {
        if !(factor >= 0.0) {
            return Err(GlobeError::InvalidConfig(format!(
                "exaggeration must be non-negative (got {})",
                factor
            )));
        }
        self.params.exaggeration = factor;
        Ok(self)
    }

    /// Set the uniform output scale
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the scale is not positive
    pub fn scale(mut self, factor: f64) -> Result<Self> {
        if !(factor > 0.0) {
            return Err(GlobeError::InvalidConfig(format!(
                "scale must be positive (got {})",
                factor
            )));
        }
        self.params.scale = factor;
        Ok(self)
    }

    /// Set the subdivision floor and ceiling
    ///
    /// Ordering and the [`MAX_SUPPORTED_DEPTH`] ceiling are checked in
    /// [`build`](Self::build).
    pub fn depth_range(mut self, min_depth: u32, max_depth: u32) -> Self {
        self.params.min_depth = min_depth;
        self.params.max_depth = max_depth;
        self
    }

    /// Set the inner shell scale ratio
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the ratio is outside `(0, 1]`
    pub fn inner_shell_scale(mut self, ratio: f64) -> Result<Self> {
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(GlobeError::InvalidConfig(format!(
                "inner shell scale must be in (0, 1] (got {})",
                ratio
            )));
        }
        self.params.inner_shell_scale = ratio;
        Ok(self)
    }

    /// Build the parameter set, checking all cross-field invariants
    pub fn build(self) -> Result<SphereParameters> {
        self.params.validate()?;
        Ok(self.params)
    }
}

impl Default for SphereParametersBuilder {
    fn default() -> Self {
        Self::new()
    }
}
