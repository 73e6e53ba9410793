// This file is part of Nitrogen.
//
// Nitrogen is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// Nitrogen is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with Nitrogen.  If not, see <http://www.gnu.org/licenses/>.
use crate::error::{AtmosphereError, Result};
use physical_constants::{
    MIE_SCALE_HEIGHT, OZONE_LAYER_WIDTH, OZONE_PEAK_ALTITUDE, RAYLEIGH_SCALE_HEIGHT,
};
use static_assertions::{assert_eq_align, assert_eq_size};
use zerocopy::{AsBytes, FromBytes};

/// Density in one altitude band, in [0,1], as defined by:
///   exp_term * exp(exp_scale * h) + linear_term * h + constant_term
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DensityProfileLayer {
    width: f64,         // meters
    exp_term: f64,      // unitless
    exp_scale: f64,     // 1 / meters
    linear_term: f64,   // 1 / meters
    constant_term: f64, // unitless
}

impl DensityProfileLayer {
    pub fn new(
        width: f64,
        exp_term: f64,
        exp_scale: f64,
        linear_term: f64,
        constant_term: f64,
    ) -> Self {
        Self {
            width,
            exp_term,
            exp_scale,
            linear_term,
            constant_term,
        }
    }

    pub fn exponential(scale_height: f64) -> Self {
        Self::new(0.0, 1.0, -1.0 / scale_height, 0.0, 0.0)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn density(&self, altitude: f64) -> f64 {
        let d = self.exp_term * (self.exp_scale * altitude).exp()
            + self.linear_term * altitude
            + self.constant_term;
        d.clamp(0.0, 1.0)
    }

    fn is_finite(&self) -> bool {
        self.width.is_finite()
            && self.exp_term.is_finite()
            && self.exp_scale.is_finite()
            && self.linear_term.is_finite()
            && self.constant_term.is_finite()
    }

    pub fn to_gpu(&self, length_unit_in_meters: f64) -> GpuDensityProfileLayer {
        GpuDensityProfileLayer {
            width: (self.width / length_unit_in_meters) as f32,
            exp_term: self.exp_term as f32,
            exp_scale: (self.exp_scale * length_unit_in_meters) as f32,
            linear_term: (self.linear_term * length_unit_in_meters) as f32,
            constant_term: self.constant_term as f32,
            _pad: [0f32; 3],
        }
    }
}

/// Up to two layers, from low to high. The lower layer covers altitudes
/// below its width; the upper layer extends to the top of the atmosphere.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DensityProfile {
    lower: DensityProfileLayer,
    upper: DensityProfileLayer,
}

impl DensityProfile {
    pub fn single(layer: DensityProfileLayer) -> Self {
        Self {
            lower: DensityProfileLayer::default(),
            upper: layer,
        }
    }

    pub fn two(lower: DensityProfileLayer, upper: DensityProfileLayer) -> Self {
        Self { lower, upper }
    }

    // Air molecules thin out exponentially.
    pub fn rayleigh() -> Self {
        Self::single(DensityProfileLayer::exponential(RAYLEIGH_SCALE_HEIGHT))
    }

    pub fn mie() -> Self {
        Self::single(DensityProfileLayer::exponential(MIE_SCALE_HEIGHT))
    }

    // A tent centered on the peak altitude, reaching zero a layer width
    // below and above the peak.
    pub fn ozone() -> Self {
        Self::two(
            DensityProfileLayer::new(
                OZONE_PEAK_ALTITUDE,
                0.0,
                0.0,
                1.0 / OZONE_LAYER_WIDTH,
                -2.0 / 3.0,
            ),
            DensityProfileLayer::new(
                0.0,
                0.0,
                0.0,
                -1.0 / OZONE_LAYER_WIDTH,
                8.0 / 3.0,
            ),
        )
    }

    pub fn lower(&self) -> &DensityProfileLayer {
        &self.lower
    }

    pub fn upper(&self) -> &DensityProfileLayer {
        &self.upper
    }

    pub fn density(&self, altitude: f64) -> f64 {
        if altitude < self.lower.width {
            self.lower.density(altitude)
        } else {
            self.upper.density(altitude)
        }
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        for layer in [&self.lower, &self.upper] {
            if !layer.is_finite() {
                return Err(AtmosphereError::Initialization(format!(
                    "{} density profile has a non-finite term",
                    name
                )));
            }
            if layer.width < 0.0 {
                return Err(AtmosphereError::Initialization(format!(
                    "{} density profile has a negative layer width",
                    name
                )));
            }
        }
        // A lower layer without any altitude band can never be sampled, so
        // anything other than the empty layer there is a malformed profile.
        if self.lower.width == 0.0 && self.lower != DensityProfileLayer::default() {
            return Err(AtmosphereError::Initialization(format!(
                "{} density profile has a lower layer with zero width",
                name
            )));
        }
        Ok(())
    }

    pub fn to_gpu(&self, length_unit_in_meters: f64) -> GpuDensityProfile {
        GpuDensityProfile {
            lower: self.lower.to_gpu(length_unit_in_meters),
            upper: self.upper.to_gpu(length_unit_in_meters),
        }
    }
}

#[repr(C)]
#[derive(AsBytes, FromBytes, Copy, Clone, Debug, Default)]
pub struct GpuDensityProfileLayer {
    width: f32,
    exp_term: f32,
    exp_scale: f32,
    linear_term: f32,
    constant_term: f32,
    _pad: [f32; 3],
}
assert_eq_size!(GpuDensityProfileLayer, [f32; 8]);
assert_eq_align!(GpuDensityProfileLayer, f32);

#[repr(C)]
#[derive(AsBytes, FromBytes, Copy, Clone, Debug, Default)]
pub struct GpuDensityProfile {
    lower: GpuDensityProfileLayer,
    upper: GpuDensityProfileLayer,
}
assert_eq_size!(GpuDensityProfile, [f32; 16]);
