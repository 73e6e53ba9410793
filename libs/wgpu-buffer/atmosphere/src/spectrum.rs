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
use crate::colorspace::interpolate;
use physical_constants::{
    CONSTANT_SOLAR_IRRADIANCE, GROUND_ALBEDO, MAX_OZONE_NUMBER_DENSITY, MIE_ANGSTROM_ALPHA,
    MIE_ANGSTROM_BETA, MIE_SCALE_HEIGHT, MIE_SINGLE_SCATTERING_ALBEDO, OZONE_CROSS_SECTION,
    RAYLEIGH_SCATTER_COEFFICIENT, SOLAR_IRRADIANCE, SPECTRAL_LAMBDA_MAX, SPECTRAL_LAMBDA_MIN,
    SPECTRAL_LAMBDA_STEP,
};

/// One row of the spectral table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpectralSample {
    pub wavelength: f64,            // nm
    pub solar_irradiance: f64,      // W.m^-2.nm^-1
    pub rayleigh_scattering: f64,   // 1 / meters
    pub mie_scattering: f64,        // 1 / meters
    pub mie_extinction: f64,        // 1 / meters
    pub absorption_extinction: f64, // 1 / meters
    pub ground_albedo: f64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpectralColumn {
    SolarIrradiance,
    RayleighScattering,
    MieScattering,
    MieExtinction,
    AbsorptionExtinction,
    GroundAlbedo,
}

/// The atmosphere's optical properties, sampled every 10nm over the visible
/// range. Stored by column so that each property can be interpolated at an
/// arbitrary wavelength.
#[derive(Clone, Debug)]
pub struct SpectralSamples {
    wavelengths: Vec<f64>,
    solar_irradiance: Vec<f64>,
    rayleigh_scattering: Vec<f64>,
    mie_scattering: Vec<f64>,
    mie_extinction: Vec<f64>,
    absorption_extinction: Vec<f64>,
    ground_albedo: Vec<f64>,
    use_constant_solar_spectrum: bool,
    use_ozone: bool,
}

impl SpectralSamples {
    pub fn new(use_constant_solar_spectrum: bool, use_ozone: bool) -> Self {
        let mut wavelengths = Vec::new();
        let mut solar_irradiance = Vec::new();
        let mut rayleigh_scattering = Vec::new();
        let mut mie_scattering = Vec::new();
        let mut mie_extinction = Vec::new();
        let mut absorption_extinction = Vec::new();
        let mut ground_albedo = Vec::new();
        // The physical tables are indexed positionally, so sample i must pair
        // with table entry i.
        for (i, l) in (SPECTRAL_LAMBDA_MIN..=SPECTRAL_LAMBDA_MAX)
            .step_by(SPECTRAL_LAMBDA_STEP)
            .enumerate()
        {
            let lf = f64::from(l);
            let lambda = lf / 1000.0; // um
            wavelengths.push(lf);
            solar_irradiance.push(if use_constant_solar_spectrum {
                CONSTANT_SOLAR_IRRADIANCE
            } else {
                SOLAR_IRRADIANCE[i]
            });
            rayleigh_scattering.push(RAYLEIGH_SCATTER_COEFFICIENT * lambda.powf(-4.0));
            let mie = MIE_ANGSTROM_BETA / MIE_SCALE_HEIGHT * lambda.powf(-MIE_ANGSTROM_ALPHA);
            mie_scattering.push(mie * MIE_SINGLE_SCATTERING_ALBEDO);
            mie_extinction.push(mie);
            absorption_extinction.push(if use_ozone {
                MAX_OZONE_NUMBER_DENSITY * OZONE_CROSS_SECTION[i]
            } else {
                0.0
            });
            ground_albedo.push(GROUND_ALBEDO);
        }
        Self {
            wavelengths,
            solar_irradiance,
            rayleigh_scattering,
            mie_scattering,
            mie_extinction,
            absorption_extinction,
            ground_albedo,
            use_constant_solar_spectrum,
            use_ozone,
        }
    }

    pub fn uses_constant_solar_spectrum(&self) -> bool {
        self.use_constant_solar_spectrum
    }

    pub fn uses_ozone(&self) -> bool {
        self.use_ozone
    }

    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn solar_irradiance(&self) -> &[f64] {
        &self.solar_irradiance
    }

    pub fn column(&self, column: SpectralColumn) -> &[f64] {
        match column {
            SpectralColumn::SolarIrradiance => &self.solar_irradiance,
            SpectralColumn::RayleighScattering => &self.rayleigh_scattering,
            SpectralColumn::MieScattering => &self.mie_scattering,
            SpectralColumn::MieExtinction => &self.mie_extinction,
            SpectralColumn::AbsorptionExtinction => &self.absorption_extinction,
            SpectralColumn::GroundAlbedo => &self.ground_albedo,
        }
    }

    pub fn get(&self, i: usize) -> Option<SpectralSample> {
        Some(SpectralSample {
            wavelength: *self.wavelengths.get(i)?,
            solar_irradiance: self.solar_irradiance[i],
            rayleigh_scattering: self.rayleigh_scattering[i],
            mie_scattering: self.mie_scattering[i],
            mie_extinction: self.mie_extinction[i],
            absorption_extinction: self.absorption_extinction[i],
            ground_albedo: self.ground_albedo[i],
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = SpectralSample> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Evaluate one column at three wavelengths, padded out for upload.
    pub fn sample(&self, lambdas: [f64; 3], column: SpectralColumn, scale: f64) -> [f32; 4] {
        let values = self.column(column);
        [
            (interpolate(&self.wavelengths, values, lambdas[0]) * scale) as f32,
            (interpolate(&self.wavelengths, values, lambdas[1]) * scale) as f32,
            (interpolate(&self.wavelengths, values, lambdas[2]) * scale) as f32,
            0f32,
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use physical_constants::SPECTRAL_SAMPLE_COUNT;

    #[test]
    fn test_measured_spectrum_matches_tables_positionally() {
        let samples = SpectralSamples::new(false, true);
        assert_eq!(samples.len(), SPECTRAL_SAMPLE_COUNT);
        assert_eq!(samples.len(), 48);
        for (i, sample) in samples.iter().enumerate() {
            assert_relative_eq!(sample.wavelength, 360.0 + 10.0 * i as f64);
            assert_relative_eq!(sample.solar_irradiance, SOLAR_IRRADIANCE[i]);
            assert_relative_eq!(
                sample.absorption_extinction,
                MAX_OZONE_NUMBER_DENSITY * OZONE_CROSS_SECTION[i]
            );
            assert_relative_eq!(sample.ground_albedo, GROUND_ALBEDO);
        }
        assert_relative_eq!(samples.wavelengths()[47], 830.0);
    }

    #[test]
    fn test_ozone_disabled_zeroes_absorption() {
        let samples = SpectralSamples::new(false, false);
        assert!(samples.iter().all(|s| s.absorption_extinction == 0.0));
        assert_eq!(
            samples.sample([440.0, 550.0, 680.0], SpectralColumn::AbsorptionExtinction, 1000.0),
            [0f32; 4]
        );
    }

    #[test]
    fn test_constant_spectrum() {
        let samples = SpectralSamples::new(true, true);
        assert!(samples
            .iter()
            .all(|s| s.solar_irradiance == CONSTANT_SOLAR_IRRADIANCE));
    }

    #[test]
    fn test_mie_albedo_splits_scattering_from_extinction() {
        let samples = SpectralSamples::new(false, true);
        for s in samples.iter() {
            assert_relative_eq!(s.mie_scattering, s.mie_extinction * 0.9, epsilon = 1e-18);
            assert_relative_eq!(s.mie_extinction, 5.328e-3 / 1200.0, epsilon = 1e-18);
        }
    }

    #[test]
    fn test_rayleigh_is_inverse_fourth_power() {
        let samples = SpectralSamples::new(false, true);
        let blue = samples.get(8).unwrap(); // 440nm
        let red = samples.get(32).unwrap(); // 680nm
        assert_relative_eq!(
            blue.rayleigh_scattering / red.rayleigh_scattering,
            (680.0f64 / 440.0).powi(4),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_sample_scales_and_pads() {
        let samples = SpectralSamples::new(false, true);
        let v = samples.sample([360.0, 370.0, 830.0], SpectralColumn::SolarIrradiance, 2.0);
        assert_relative_eq!(v[0], (SOLAR_IRRADIANCE[0] * 2.0) as f32);
        assert_relative_eq!(v[1], (SOLAR_IRRADIANCE[1] * 2.0) as f32);
        assert_relative_eq!(v[2], (SOLAR_IRRADIANCE[47] * 2.0) as f32);
        assert_relative_eq!(v[3], 0.0);
    }
}
