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
mod cie;
mod solar;

pub use crate::{
    cie::{CIE_2_DEG_COLOR_MATCHING_FUNCTIONS, CIE_TABLE_STEP, MAX_LUMINOUS_EFFICACY, XYZ_TO_SRGB},
    solar::{
        CONSTANT_SOLAR_IRRADIANCE, DOBSON_UNIT, MAX_OZONE_NUMBER_DENSITY, OZONE_CROSS_SECTION,
        SOLAR_IRRADIANCE, SPECTRAL_LAMBDA_MAX, SPECTRAL_LAMBDA_MIN, SPECTRAL_LAMBDA_STEP,
        SPECTRAL_SAMPLE_COUNT,
    },
};

use std::f64::consts::PI;

// Earth, as seen by the atmosphere model. All lengths in meters.
pub const EARTH_BOTTOM_RADIUS: f64 = 6_360_000.0;
pub const EARTH_TOP_RADIUS: f64 = 6_420_000.0;

// The sun's angular radius, in radians.
pub const SUN_ANGULAR_RADIUS: f64 = 0.00935 / 2.0;

// Air molecules; the coefficient is for 1um and scales with lambda^-4.
pub const RAYLEIGH_SCATTER_COEFFICIENT: f64 = 1.24062e-6;
pub const RAYLEIGH_SCALE_HEIGHT: f64 = 8_000.0;

// Aerosols.
pub const MIE_SCALE_HEIGHT: f64 = 1_200.0;
pub const MIE_ANGSTROM_ALPHA: f64 = 0.0;
pub const MIE_ANGSTROM_BETA: f64 = 5.328e-3;
pub const MIE_SINGLE_SCATTERING_ALBEDO: f64 = 0.9;
pub const MIE_PHASE_FUNCTION_G: f64 = 0.8;

// Ozone lives in a layer centered on this altitude.
pub const OZONE_PEAK_ALTITUDE: f64 = 25_000.0;
pub const OZONE_LAYER_WIDTH: f64 = 15_000.0;

pub const GROUND_ALBEDO: f64 = 0.1;

// Sun zenith angles past this are treated as night for the purpose of
// the scattering tables. 102 degrees gives mu_s_min of roughly -0.2.
pub const MAX_SUN_ZENITH_ANGLE: f64 = 102.0 / 180.0 * PI;
