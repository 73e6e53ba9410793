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
use crate::{
    config::{PrecomputeConfig, Precision},
    density::{DensityProfile, GpuDensityProfile},
    error::{AtmosphereError, Result},
    spectrum::{SpectralColumn, SpectralSamples},
};
use nalgebra::Matrix3;
use physical_constants::{
    EARTH_BOTTOM_RADIUS, EARTH_TOP_RADIUS, MAX_SUN_ZENITH_ANGLE, MIE_PHASE_FUNCTION_G,
    SUN_ANGULAR_RADIUS,
};
use static_assertions::{assert_eq_align, assert_eq_size};
use zerocopy::{AsBytes, FromBytes};

/// Everything about the planet and its atmosphere that the kernels need,
/// in meters and radians. Fixed for the duration of a precompute run.
#[derive(Clone, Debug)]
pub struct AtmosphereParameters {
    bottom_radius: f64,
    top_radius: f64,
    rayleigh_density: DensityProfile,
    mie_density: DensityProfile,
    absorption_density: DensityProfile,
    mie_phase_function_g: f64,
    max_sun_zenith_angle: f64,
    sun_angular_radius: f64,
    length_unit_in_meters: f64,
    precision: Precision,
    combine_scattering_textures: bool,
    spectrum: SpectralSamples,
}

impl AtmosphereParameters {
    pub fn earth(config: &PrecomputeConfig) -> Self {
        Self {
            bottom_radius: EARTH_BOTTOM_RADIUS,
            top_radius: EARTH_TOP_RADIUS,
            rayleigh_density: DensityProfile::rayleigh(),
            mie_density: DensityProfile::mie(),
            absorption_density: DensityProfile::ozone(),
            mie_phase_function_g: MIE_PHASE_FUNCTION_G,
            max_sun_zenith_angle: MAX_SUN_ZENITH_ANGLE,
            sun_angular_radius: SUN_ANGULAR_RADIUS,
            length_unit_in_meters: config.length_unit_in_meters,
            precision: config.precision,
            combine_scattering_textures: config.combine_scattering_textures,
            spectrum: SpectralSamples::new(config.use_constant_solar_spectrum, config.use_ozone),
        }
    }

    pub fn with_radii(mut self, bottom_radius: f64, top_radius: f64) -> Self {
        self.bottom_radius = bottom_radius;
        self.top_radius = top_radius;
        self
    }

    pub fn with_density_profiles(
        mut self,
        rayleigh: DensityProfile,
        mie: DensityProfile,
        absorption: DensityProfile,
    ) -> Self {
        self.rayleigh_density = rayleigh;
        self.mie_density = mie;
        self.absorption_density = absorption;
        self
    }

    pub fn with_mie_phase_function_g(mut self, g: f64) -> Self {
        self.mie_phase_function_g = g;
        self
    }

    pub fn validate(&self) -> Result<()> {
        fn invalid(msg: String) -> Result<()> {
            Err(AtmosphereError::Initialization(msg))
        }
        if !(self.bottom_radius.is_finite() && self.bottom_radius > 0.0) {
            return invalid(format!("bottom radius {} is not positive", self.bottom_radius));
        }
        if !(self.top_radius.is_finite() && self.top_radius > self.bottom_radius) {
            return invalid(format!(
                "top radius {} must lie above bottom radius {}",
                self.top_radius, self.bottom_radius
            ));
        }
        if !(self.length_unit_in_meters.is_finite() && self.length_unit_in_meters > 0.0) {
            return invalid(format!(
                "length unit {} is not positive",
                self.length_unit_in_meters
            ));
        }
        if !(self.mie_phase_function_g.abs() < 1.0) {
            return invalid(format!(
                "mie phase function g {} must lie in (-1, 1)",
                self.mie_phase_function_g
            ));
        }
        if self.spectrum.is_empty() {
            return invalid("spectral table is empty".to_owned());
        }
        self.rayleigh_density.validate("rayleigh")?;
        self.mie_density.validate("mie")?;
        self.absorption_density.validate("absorption")?;
        Ok(())
    }

    /// Parameters built for one config must not be run under another: the
    /// store layout, the uniforms, and the written metadata all have to agree.
    pub fn check_config(&self, config: &PrecomputeConfig) -> Result<()> {
        let mut mismatched = Vec::new();
        if self.precision != config.precision {
            mismatched.push("precision");
        }
        if self.combine_scattering_textures != config.combine_scattering_textures {
            mismatched.push("combine_scattering_textures");
        }
        if self.length_unit_in_meters != config.length_unit_in_meters {
            mismatched.push("length_unit_in_meters");
        }
        if self.spectrum.uses_ozone() != config.use_ozone {
            mismatched.push("use_ozone");
        }
        if self.spectrum.uses_constant_solar_spectrum() != config.use_constant_solar_spectrum {
            mismatched.push("use_constant_solar_spectrum");
        }
        if !mismatched.is_empty() {
            return Err(AtmosphereError::Initialization(format!(
                "atmosphere parameters disagree with the config on {}",
                mismatched.join(", ")
            )));
        }
        Ok(())
    }

    pub fn bottom_radius(&self) -> f64 {
        self.bottom_radius
    }

    pub fn top_radius(&self) -> f64 {
        self.top_radius
    }

    pub fn length_unit_in_meters(&self) -> f64 {
        self.length_unit_in_meters
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn combine_scattering_textures(&self) -> bool {
        self.combine_scattering_textures
    }

    pub fn spectrum(&self) -> &SpectralSamples {
        &self.spectrum
    }

    pub fn mu_s_min(&self) -> f64 {
        self.max_sun_zenith_angle.cos()
    }

    /// Evaluate our physical model at three wavelengths, for use in a kernel.
    pub fn uniforms(&self, lambdas: [f64; 3]) -> AtmosphereUniforms {
        let unit = self.length_unit_in_meters;
        let sample = |column, scale| self.spectrum.sample(lambdas, column, scale);
        AtmosphereUniforms {
            rayleigh_density: self.rayleigh_density.to_gpu(unit),
            mie_density: self.mie_density.to_gpu(unit),
            absorption_density: self.absorption_density.to_gpu(unit),
            solar_irradiance: sample(SpectralColumn::SolarIrradiance, 1.0),
            rayleigh_scattering: sample(SpectralColumn::RayleighScattering, unit),
            mie_scattering: sample(SpectralColumn::MieScattering, unit),
            mie_extinction: sample(SpectralColumn::MieExtinction, unit),
            absorption_extinction: sample(SpectralColumn::AbsorptionExtinction, unit),
            ground_albedo: sample(SpectralColumn::GroundAlbedo, 1.0),
            sun_angular_radius: self.sun_angular_radius as f32,
            bottom_radius: (self.bottom_radius / unit) as f32,
            top_radius: (self.top_radius / unit) as f32,
            mie_phase_function_g: self.mie_phase_function_g as f32,
            mu_s_min: self.mu_s_min() as f32,
            _pad: [0f32; 3],
        }
    }
}

#[repr(C)]
#[derive(AsBytes, FromBytes, Copy, Clone, Debug, Default)]
pub struct AtmosphereUniforms {
    rayleigh_density: GpuDensityProfile,
    mie_density: GpuDensityProfile,
    absorption_density: GpuDensityProfile,

    // Per component, at max density, in 1 / length unit.
    solar_irradiance: [f32; 4],
    rayleigh_scattering: [f32; 4],
    mie_scattering: [f32; 4],
    mie_extinction: [f32; 4],
    absorption_extinction: [f32; 4],
    ground_albedo: [f32; 4],

    sun_angular_radius: f32,
    bottom_radius: f32,
    top_radius: f32,
    mie_phase_function_g: f32,
    mu_s_min: f32,
    _pad: [f32; 3],
}
assert_eq_size!(AtmosphereUniforms, [f32; 80]);
assert_eq_align!(AtmosphereUniforms, f32);

impl AtmosphereUniforms {
    pub fn absorption_extinction(&self) -> [f32; 4] {
        self.absorption_extinction
    }

    pub fn solar_irradiance(&self) -> [f32; 4] {
        self.solar_irradiance
    }

    pub fn rayleigh_scattering(&self) -> [f32; 4] {
        self.rayleigh_scattering
    }

    pub fn bottom_radius(&self) -> f32 {
        self.bottom_radius
    }

    pub fn top_radius(&self) -> f32 {
        self.top_radius
    }

    pub fn mie_phase_function_g(&self) -> f32 {
        self.mie_phase_function_g
    }
}

/// Uniforms bound at slot 0 of every pass.
#[repr(C)]
#[derive(AsBytes, FromBytes, Copy, Clone, Debug, Default)]
pub struct PassUniforms {
    atmosphere: AtmosphereUniforms,
    // Column major, each column padded to a vec4.
    luminance_from_radiance: [[f32; 4]; 3],
    scattering_order: u32,
    _pad: [u32; 3],
    // Non-zero where the output at that index is added to, rather than overwritten.
    blend: [u32; 4],
}
assert_eq_size!(PassUniforms, [f32; 100]);

impl PassUniforms {
    pub fn new(
        atmosphere: AtmosphereUniforms,
        luminance_from_radiance: &Matrix3<f64>,
        scattering_order: usize,
        blend: &[bool],
    ) -> Self {
        let mut lfr = [[0f32; 4]; 3];
        for (k, column) in lfr.iter_mut().enumerate() {
            for c in 0..3 {
                column[c] = luminance_from_radiance[(c, k)] as f32;
            }
        }
        let mut flags = [0u32; 4];
        for (flag, b) in flags.iter_mut().zip(blend) {
            *flag = u32::from(*b);
        }
        Self {
            atmosphere,
            luminance_from_radiance: lfr,
            scattering_order: scattering_order as u32,
            _pad: [0; 3],
            blend: flags,
        }
    }

    pub fn atmosphere(&self) -> &AtmosphereUniforms {
        &self.atmosphere
    }

    pub fn luminance_from_radiance(&self) -> Matrix3<f64> {
        Matrix3::from_fn(|c, k| f64::from(self.luminance_from_radiance[k][c]))
    }

    pub fn scattering_order(&self) -> u32 {
        self.scattering_order
    }

    pub fn blend(&self) -> [bool; 4] {
        [
            self.blend[0] != 0,
            self.blend[1] != 0,
            self.blend[2] != 0,
            self.blend[3] != 0,
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::colorspace::RGB_LAMBDAS;
    use approx::assert_relative_eq;
    use std::mem;
    use zerocopy::AsBytes;

    #[test]
    fn test_earth_is_valid() -> Result<()> {
        AtmosphereParameters::earth(&PrecomputeConfig::default()).validate()
    }

    #[test]
    fn test_uniforms_are_in_length_units() {
        let params = AtmosphereParameters::earth(&PrecomputeConfig::default());
        let u = params.uniforms(RGB_LAMBDAS);
        assert_relative_eq!(u.bottom_radius, 6360.0);
        assert_relative_eq!(u.top_radius, 6420.0);
        assert_relative_eq!(u.mie_phase_function_g, 0.8);
        assert_relative_eq!(u.mu_s_min, -0.20791169, epsilon = 1e-6);
        assert_relative_eq!(
            u.rayleigh_scattering[0],
            (1.24062e-6 * 0.68f64.powi(-4) * 1000.0) as f32,
            max_relative = 1e-5
        );
        assert_relative_eq!(u.mie_extinction[1], (5.328e-3 / 1.2) as f32, max_relative = 1e-6);
        assert_eq!(u.ground_albedo, [0.1, 0.1, 0.1, 0.0]);
    }

    #[test]
    fn test_ozone_disabled_uniforms() {
        let config = PrecomputeConfig {
            use_ozone: false,
            ..Default::default()
        };
        let params = AtmosphereParameters::earth(&config);
        let u = params.uniforms([400.0, 600.0, 700.0]);
        assert_eq!(u.absorption_extinction(), [0f32; 4]);
    }

    #[test]
    fn test_validate_rejects_bad_geometry() {
        let config = PrecomputeConfig::default();
        let params = AtmosphereParameters::earth(&config).with_radii(6_420_000.0, 6_360_000.0);
        assert!(matches!(
            params.validate(),
            Err(AtmosphereError::Initialization(_))
        ));
        let params = AtmosphereParameters::earth(&config).with_radii(0.0, 100.0);
        assert!(params.validate().is_err());
        let params = AtmosphereParameters::earth(&config).with_mie_phase_function_g(1.0);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_check_config_names_every_mismatch() -> Result<()> {
        let params = AtmosphereParameters::earth(&PrecomputeConfig::default());
        params.check_config(&PrecomputeConfig::default())?;
        let config = PrecomputeConfig {
            precision: Precision::Half,
            combine_scattering_textures: false,
            use_ozone: false,
            ..Default::default()
        };
        match params.check_config(&config) {
            Err(AtmosphereError::Initialization(msg)) => {
                assert!(msg.contains("precision"));
                assert!(msg.contains("combine_scattering_textures"));
                assert!(msg.contains("use_ozone"));
                assert!(!msg.contains("length_unit_in_meters"));
            }
            other => panic!("expected a config mismatch, got {:?}", other),
        }
        let config = PrecomputeConfig {
            length_unit_in_meters: 1.0,
            use_constant_solar_spectrum: true,
            ..Default::default()
        };
        assert!(params.check_config(&config).is_err());
        Ok(())
    }

    #[test]
    fn test_pass_uniform_layout() {
        assert_eq!(mem::size_of::<AtmosphereUniforms>(), 320);
        assert_eq!(mem::size_of::<PassUniforms>(), 400);
        let params = AtmosphereParameters::earth(&PrecomputeConfig::default());
        let m = Matrix3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);
        let pass = PassUniforms::new(params.uniforms(RGB_LAMBDAS), &m, 3, &[false, true]);
        assert_eq!(pass.luminance_from_radiance(), m);
        assert_eq!(pass.scattering_order(), 3);
        assert_eq!(pass.blend(), [false, true, false, false]);
        // The first column of the matrix follows the atmosphere block.
        let floats: &[u8] = pass.as_bytes();
        let first = f32::from_ne_bytes([floats[320], floats[321], floats[322], floats[323]]);
        let second = f32::from_ne_bytes([floats[324], floats[325], floats[326], floats[327]]);
        assert_relative_eq!(first, 1.0);
        assert_relative_eq!(second, 4.0);
    }
}
