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
use std::str::FromStr;
use structopt::StructOpt;

/// Storage precision of the 3D scattering tables. The 2D tables are small
/// and are always stored at full precision.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Precision {
    Full,
    Half,
}

impl Default for Precision {
    fn default() -> Self {
        Self::Full
    }
}

impl FromStr for Precision {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Ok(match s {
            "full" | "f32" => Self::Full,
            "half" | "f16" => Self::Half,
            _ => anyhow::bail!("unrecognized precision; expected full or half"),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrecomputeConfig {
    pub use_constant_solar_spectrum: bool,
    pub use_ozone: bool,
    pub num_scattering_orders: usize,
    pub precision: Precision,
    pub combine_scattering_textures: bool,
    // 3 or fewer runs directly in RGB; more accumulates triplets.
    pub num_wavelengths: usize,
    pub length_unit_in_meters: f64,
}

impl Default for PrecomputeConfig {
    fn default() -> Self {
        Self {
            use_constant_solar_spectrum: false,
            use_ozone: true,
            num_scattering_orders: 4,
            precision: Precision::Full,
            combine_scattering_textures: true,
            num_wavelengths: 3,
            length_unit_in_meters: 1000.0,
        }
    }
}

impl PrecomputeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_wavelengths == 0 {
            return Err(AtmosphereError::Initialization(
                "at least one wavelength must be precomputed".to_owned(),
            ));
        }
        if self.num_scattering_orders == 0 {
            return Err(AtmosphereError::Initialization(
                "at least one scattering order must be precomputed".to_owned(),
            ));
        }
        if !(self.length_unit_in_meters.is_finite() && self.length_unit_in_meters > 0.0) {
            return Err(AtmosphereError::Initialization(format!(
                "length unit must be positive, not {}",
                self.length_unit_in_meters
            )));
        }
        Ok(())
    }

    pub fn is_hyperspectral(&self) -> bool {
        self.num_wavelengths > 3
    }

    /// The number of wavelength triplets that will be dispatched.
    pub fn num_triplets(&self) -> usize {
        if self.is_hyperspectral() {
            (self.num_wavelengths + 2) / 3
        } else {
            1
        }
    }
}

#[derive(Clone, Debug, Default, StructOpt)]
pub struct PrecomputeOpts {
    /// Use a flat solar spectrum instead of the measured one
    #[structopt(long)]
    constant_solar_spectrum: bool,

    /// Leave ozone out of the atmosphere
    #[structopt(long)]
    no_ozone: bool,

    /// Number of scattering orders to precompute (default 4)
    #[structopt(long)]
    scattering_orders: Option<usize>,

    /// Precision of the 3D scattering tables (full or half)
    #[structopt(long)]
    precision: Option<Precision>,

    /// Store single Mie scattering in its own table
    #[structopt(long)]
    split_scattering: bool,

    /// Number of wavelengths to precompute; more than 3 accumulates triplets
    #[structopt(long)]
    wavelengths: Option<usize>,

    /// Length unit of the tables, in meters (default 1000)
    #[structopt(long)]
    length_unit: Option<f64>,
}

impl PrecomputeOpts {
    pub fn config(&self) -> PrecomputeConfig {
        let default = PrecomputeConfig::default();
        PrecomputeConfig {
            use_constant_solar_spectrum: self.constant_solar_spectrum,
            use_ozone: !self.no_ozone,
            num_scattering_orders: self
                .scattering_orders
                .unwrap_or(default.num_scattering_orders),
            precision: self.precision.unwrap_or(default.precision),
            combine_scattering_textures: !self.split_scattering,
            num_wavelengths: self.wavelengths.unwrap_or(default.num_wavelengths),
            length_unit_in_meters: self.length_unit.unwrap_or(default.length_unit_in_meters),
        }
    }
}
