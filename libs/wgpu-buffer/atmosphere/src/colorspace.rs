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
use nalgebra::Matrix3;
use physical_constants::{
    CIE_2_DEG_COLOR_MATCHING_FUNCTIONS, CIE_TABLE_STEP, MAX_LUMINOUS_EFFICACY, XYZ_TO_SRGB,
};

pub const MIN_LAMBDA: f64 = 360.0;
pub const MAX_LAMBDA: f64 = 830.0;

// The wavelengths, in nm, that stand in for the R, G and B channels.
pub const RGB_LAMBDAS: [f64; 3] = [680.0, 550.0, 440.0];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CieChannel {
    X,
    Y,
    Z,
}

impl CieChannel {
    fn column(self) -> usize {
        match self {
            Self::X => 1,
            Self::Y => 2,
            Self::Z => 3,
        }
    }

    fn from_index(index: usize) -> Self {
        match index {
            0 => Self::X,
            1 => Self::Y,
            _ => Self::Z,
        }
    }
}

/// Piecewise linear lookup into the CIE 1931 2 degree color matching
/// functions. Zero at and outside the ends of the visible range.
pub fn cie_color_matching_value(wavelength: f64, channel: CieChannel) -> f64 {
    if wavelength <= MIN_LAMBDA || wavelength >= MAX_LAMBDA {
        return 0.0;
    }
    let u = (wavelength - MIN_LAMBDA) / CIE_TABLE_STEP;
    let row = u.floor() as usize;
    let u = u - row as f64;
    let col = channel.column();
    CIE_2_DEG_COLOR_MATCHING_FUNCTIONS[4 * row + col] * (1.0 - u)
        + CIE_2_DEG_COLOR_MATCHING_FUNCTIONS[4 * (row + 1) + col] * u
}

// Evaluate the wavelength-based table at the given wavelength,
// interpolating between adjacent table values. Clamps at both ends.
// Only the leading entries common to both tables are used.
pub fn interpolate(wavelengths: &[f64], values: &[f64], wavelength: f64) -> f64 {
    let n = wavelengths.len().min(values.len());
    let (wavelengths, values) = (&wavelengths[..n], &values[..n]);
    let (first_wl, first) = match (wavelengths.first(), values.first()) {
        (Some(wl), Some(v)) => (*wl, *v),
        _ => return 0.0,
    };
    if wavelength < first_wl {
        return first;
    }
    for (wl, vs) in wavelengths.windows(2).zip(values.windows(2)) {
        if wavelength < wl[1] {
            let f = (wavelength - wl[0]) / (wl[1] - wl[0]);
            return vs[0] * (1.0 - f) + vs[1] * f;
        }
    }
    values[n - 1]
}

/// The response of one linear sRGB channel (0 = R, 1 = G, 2 = B) to
/// a unit of radiance at the given wavelength.
pub fn xyz_to_rgb_coefficient(wavelength: f64, component: usize) -> f64 {
    let x = cie_color_matching_value(wavelength, CieChannel::X);
    let y = cie_color_matching_value(wavelength, CieChannel::Y);
    let z = cie_color_matching_value(wavelength, CieChannel::Z);
    XYZ_TO_SRGB[3 * component] * x
        + XYZ_TO_SRGB[3 * component + 1] * y
        + XYZ_TO_SRGB[3 * component + 2] * z
}

/// Integrate over the visible range at 1nm to find the factors that take
/// radiance sampled at RGB_LAMBDAS to luminance, in lm / W. A lambda_power
/// of -3 matches the falloff of sky light; 0 matches direct sunlight.
pub fn compute_radiance_to_luminance_factors(
    wavelengths: &[f64],
    solar_irradiance: &[f64],
    lambda_power: f64,
) -> [f64; 3] {
    let mut k = [0f64; 3];
    let solar = [
        interpolate(wavelengths, solar_irradiance, RGB_LAMBDAS[0]),
        interpolate(wavelengths, solar_irradiance, RGB_LAMBDAS[1]),
        interpolate(wavelengths, solar_irradiance, RGB_LAMBDAS[2]),
    ];
    for l in MIN_LAMBDA as u32..MAX_LAMBDA as u32 {
        let lambda = f64::from(l);
        let irradiance = interpolate(wavelengths, solar_irradiance, lambda);
        for (c, kc) in k.iter_mut().enumerate() {
            *kc += xyz_to_rgb_coefficient(lambda, c) * irradiance / solar[c]
                * (lambda / RGB_LAMBDAS[c]).powf(lambda_power);
        }
    }
    for kc in &mut k {
        *kc *= MAX_LUMINOUS_EFFICACY;
    }
    k
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadianceToLuminance {
    pub sky: [f64; 3],
    pub sun: [f64; 3],
}

/// When precomputing more than three wavelengths the tables are already in
/// luminance units, up to the luminous efficacy, so the sky factor is only
/// that constant.
pub fn sky_sun_radiance_to_luminance(
    num_wavelengths: usize,
    wavelengths: &[f64],
    solar_irradiance: &[f64],
) -> RadianceToLuminance {
    let sky = if num_wavelengths > 3 {
        [MAX_LUMINOUS_EFFICACY; 3]
    } else {
        compute_radiance_to_luminance_factors(wavelengths, solar_irradiance, -3.0)
    };
    let sun = compute_radiance_to_luminance_factors(wavelengths, solar_irradiance, 0.0);
    RadianceToLuminance { sky, sun }
}

/// Column k of the result takes radiance at lambdas[k] into linear sRGB.
/// The luminous efficacy is left out to keep table values near 1; it is
/// carried by the sky factor instead.
pub fn luminance_from_radiance(lambdas: [f64; 3], delta_lambda: f64) -> Matrix3<f64> {
    Matrix3::from_fn(|c, k| xyz_to_rgb_coefficient(lambdas[k], c) * delta_lambda)
}

/// The linear sRGB color of the sun, normalized to unit average.
pub fn white_point(wavelengths: &[f64], solar_irradiance: &[f64]) -> [f64; 3] {
    let mut xyz = [0f64; 3];
    for l in MIN_LAMBDA as u32..MAX_LAMBDA as u32 {
        let lambda = f64::from(l);
        let value = interpolate(wavelengths, solar_irradiance, lambda);
        for (i, v) in xyz.iter_mut().enumerate() {
            *v += cie_color_matching_value(lambda, CieChannel::from_index(i)) * value;
        }
    }
    let mut rgb = [0f64; 3];
    for (c, v) in rgb.iter_mut().enumerate() {
        *v = XYZ_TO_SRGB[3 * c] * xyz[0]
            + XYZ_TO_SRGB[3 * c + 1] * xyz[1]
            + XYZ_TO_SRGB[3 * c + 2] * xyz[2];
    }
    let avg = (rgb[0] + rgb[1] + rgb[2]) / 3.0;
    [rgb[0] / avg, rgb[1] / avg, rgb[2] / avg]
}
