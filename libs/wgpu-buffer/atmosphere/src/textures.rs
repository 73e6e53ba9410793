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
use crate::{config::Precision, error::Result, kernel::Accelerator};
use log::trace;

// Note: must match the workgroup size declared in the kernels.
pub const BLOCK_SIZE: u32 = 8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LutExtent {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl LutExtent {
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    pub fn dimension(&self) -> LutDimension {
        if self.depth > 1 {
            LutDimension::D3
        } else {
            LutDimension::D2
        }
    }

    pub fn texel_count(&self) -> usize {
        (self.width * self.height * self.depth) as usize
    }

    pub fn workgroups(&self) -> [u32; 3] {
        match self.dimension() {
            LutDimension::D2 => [self.width / BLOCK_SIZE, self.height / BLOCK_SIZE, 1],
            LutDimension::D3 => [
                self.width / BLOCK_SIZE,
                self.height / BLOCK_SIZE,
                self.depth / BLOCK_SIZE,
            ],
        }
    }
}

pub const TRANSMITTANCE_EXTENT: LutExtent = LutExtent::new(256, 64, 1);

const SCATTERING_TEXTURE_R_SIZE: u32 = 32;
const SCATTERING_TEXTURE_MU_SIZE: u32 = 128;
const SCATTERING_TEXTURE_MU_S_SIZE: u32 = 32;
const SCATTERING_TEXTURE_NU_SIZE: u32 = 8;
pub const SCATTERING_EXTENT: LutExtent = LutExtent::new(
    SCATTERING_TEXTURE_NU_SIZE * SCATTERING_TEXTURE_MU_S_SIZE,
    SCATTERING_TEXTURE_MU_SIZE,
    SCATTERING_TEXTURE_R_SIZE,
);

pub const IRRADIANCE_EXTENT: LutExtent = LutExtent::new(64, 16, 1);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LutDimension {
    D2,
    D3,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LutFormat {
    Rgba32Float,
    Rgba16Float,
}

impl LutFormat {
    pub fn bytes_per_texel(&self) -> usize {
        match self {
            Self::Rgba32Float => 16,
            Self::Rgba16Float => 8,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LutKind {
    Transmittance,
    Irradiance,
    Scattering,
    SingleMieScattering,
    DeltaIrradiance,
    DeltaRayleighScattering,
    DeltaMieScattering,
    DeltaScatteringDensity,
    DeltaMultipleScattering,
}

impl LutKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Transmittance => "atmosphere-transmittance-texture",
            Self::Irradiance => "atmosphere-irradiance-texture",
            Self::Scattering => "atmosphere-scattering-texture",
            Self::SingleMieScattering => "atmosphere-single-mie-scattering-texture",
            Self::DeltaIrradiance => "atmosphere-delta-irradiance-texture",
            Self::DeltaRayleighScattering => "atmosphere-delta-rayleigh-scattering-texture",
            Self::DeltaMieScattering => "atmosphere-delta-mie-scattering-texture",
            Self::DeltaScatteringDensity => "atmosphere-delta-scattering-density-texture",
            Self::DeltaMultipleScattering => "atmosphere-delta-multiple-scattering-texture",
        }
    }

    pub fn extent(&self) -> LutExtent {
        match self {
            Self::Transmittance => TRANSMITTANCE_EXTENT,
            Self::Irradiance | Self::DeltaIrradiance => IRRADIANCE_EXTENT,
            _ => SCATTERING_EXTENT,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LutDescriptor {
    pub kind: LutKind,
    pub extent: LutExtent,
    pub dimension: LutDimension,
    pub format: LutFormat,
}

impl LutDescriptor {
    pub fn new(kind: LutKind, precision: Precision) -> Self {
        let extent = kind.extent();
        let dimension = extent.dimension();
        // Only the big 3D tables are worth storing at reduced precision.
        let format = match (dimension, precision) {
            (LutDimension::D3, Precision::Half) => LutFormat::Rgba16Float,
            _ => LutFormat::Rgba32Float,
        };
        Self {
            kind,
            extent,
            dimension,
            format,
        }
    }

    pub fn size_in_bytes(&self) -> usize {
        self.extent.texel_count() * self.format.bytes_per_texel()
    }
}

/// The finished tables, handed out only once a run has completed.
#[derive(Debug)]
pub struct LutTables<'a, T> {
    pub transmittance: &'a T,
    pub irradiance: &'a T,
    pub scattering: &'a T,
    pub single_mie_scattering: Option<&'a T>,
}

/// Owns every table used while precomputing. The scratch tables are
/// overwritten by each scattering order and each wavelength triplet.
#[derive(Debug)]
pub struct LutStore<T> {
    // Permanent/accumulator textures.
    transmittance: T,
    irradiance: T,
    scattering: T,
    single_mie_scattering: Option<T>,

    // Temporary textures.
    delta_irradiance: T,
    delta_rayleigh_scattering: T,
    delta_mie_scattering: T,
    delta_scattering_density: T,
    delta_multiple_scattering: T,

    precision: Precision,
    complete: bool,
}

impl<T> LutStore<T> {
    pub fn allocate<A>(accelerator: &mut A, precision: Precision, combined: bool) -> Result<Self>
    where
        A: Accelerator<Texture = T>,
    {
        let mut create = |kind: LutKind| {
            let descriptor = LutDescriptor::new(kind, precision);
            trace!(
                "allocating {} with {} bytes",
                kind.label(),
                descriptor.size_in_bytes()
            );
            accelerator.create_texture(&descriptor)
        };
        Ok(Self {
            transmittance: create(LutKind::Transmittance)?,
            irradiance: create(LutKind::Irradiance)?,
            scattering: create(LutKind::Scattering)?,
            single_mie_scattering: if combined {
                None
            } else {
                Some(create(LutKind::SingleMieScattering)?)
            },
            delta_irradiance: create(LutKind::DeltaIrradiance)?,
            delta_rayleigh_scattering: create(LutKind::DeltaRayleighScattering)?,
            delta_mie_scattering: create(LutKind::DeltaMieScattering)?,
            delta_scattering_density: create(LutKind::DeltaScatteringDensity)?,
            delta_multiple_scattering: create(LutKind::DeltaMultipleScattering)?,
            precision,
            complete: false,
        })
    }

    pub fn texture(&self, kind: LutKind) -> Option<&T> {
        Some(match kind {
            LutKind::Transmittance => &self.transmittance,
            LutKind::Irradiance => &self.irradiance,
            LutKind::Scattering => &self.scattering,
            LutKind::SingleMieScattering => return self.single_mie_scattering.as_ref(),
            LutKind::DeltaIrradiance => &self.delta_irradiance,
            LutKind::DeltaRayleighScattering => &self.delta_rayleigh_scattering,
            LutKind::DeltaMieScattering => &self.delta_mie_scattering,
            LutKind::DeltaScatteringDensity => &self.delta_scattering_density,
            LutKind::DeltaMultipleScattering => &self.delta_multiple_scattering,
        })
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn is_combined(&self) -> bool {
        self.single_mie_scattering.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub(crate) fn invalidate(&mut self) {
        self.complete = false;
    }

    pub(crate) fn mark_complete(&mut self) {
        self.complete = true;
    }

    pub fn tables(&self) -> Option<LutTables<'_, T>> {
        if !self.complete {
            return None;
        }
        Some(LutTables {
            transmittance: &self.transmittance,
            irradiance: &self.irradiance,
            scattering: &self.scattering,
            single_mie_scattering: self.single_mie_scattering.as_ref(),
        })
    }
}
