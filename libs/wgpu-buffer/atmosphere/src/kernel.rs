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
    error::Result,
    parameters::PassUniforms,
    textures::{LutDescriptor, LutKind},
};

/// The six compute kernels a module must export to build the tables.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum KernelEntryPoint {
    Transmittance,
    DirectIrradiance,
    IndirectIrradiance,
    MultipleScattering,
    ScatteringDensity,
    SingleScattering,
}

impl KernelEntryPoint {
    pub const ALL: [Self; 6] = [
        Self::Transmittance,
        Self::DirectIrradiance,
        Self::IndirectIrradiance,
        Self::MultipleScattering,
        Self::ScatteringDensity,
        Self::SingleScattering,
    ];

    /// The exported symbol name. Note the double underscore in the scattering
    /// density kernel; existing modules export it that way.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Transmittance => "calculate_transmittance",
            Self::DirectIrradiance => "calculate_direct_irradiance",
            Self::IndirectIrradiance => "calculate_indirect_irradiance",
            Self::MultipleScattering => "calculate_multiple_scattering",
            Self::ScatteringDensity => "calculate__scattering_density",
            Self::SingleScattering => "calculate_single_scattering",
        }
    }

    pub fn pass_name(self) -> &'static str {
        match self {
            Self::Transmittance => "transmittance",
            Self::DirectIrradiance => "direct-irradiance",
            Self::IndirectIrradiance => "indirect-irradiance",
            Self::MultipleScattering => "multiple-scattering",
            Self::ScatteringDensity => "scattering-density",
            Self::SingleScattering => "single-scattering",
        }
    }
}

/// A compiled module that can hand out dispatchable kernels by name.
pub trait KernelModule {
    type Kernel;

    fn resolve(&self, entry_point: KernelEntryPoint) -> Result<Self::Kernel>;
}

/// One resolved kernel per entry point. Either all six resolve, or
/// binding fails and nothing is kept.
#[derive(Debug)]
pub struct KernelSet<K> {
    transmittance: K,
    direct_irradiance: K,
    indirect_irradiance: K,
    multiple_scattering: K,
    scattering_density: K,
    single_scattering: K,
}

impl<K> KernelSet<K> {
    pub fn bind<M>(module: &M) -> Result<Self>
    where
        M: KernelModule<Kernel = K>,
    {
        Ok(Self {
            transmittance: module.resolve(KernelEntryPoint::Transmittance)?,
            direct_irradiance: module.resolve(KernelEntryPoint::DirectIrradiance)?,
            indirect_irradiance: module.resolve(KernelEntryPoint::IndirectIrradiance)?,
            multiple_scattering: module.resolve(KernelEntryPoint::MultipleScattering)?,
            scattering_density: module.resolve(KernelEntryPoint::ScatteringDensity)?,
            single_scattering: module.resolve(KernelEntryPoint::SingleScattering)?,
        })
    }

    pub fn get(&self, entry_point: KernelEntryPoint) -> &K {
        match entry_point {
            KernelEntryPoint::Transmittance => &self.transmittance,
            KernelEntryPoint::DirectIrradiance => &self.direct_irradiance,
            KernelEntryPoint::IndirectIrradiance => &self.indirect_irradiance,
            KernelEntryPoint::MultipleScattering => &self.multiple_scattering,
            KernelEntryPoint::ScatteringDensity => &self.scattering_density,
            KernelEntryPoint::SingleScattering => &self.single_scattering,
        }
    }
}

/// Everything needed to run one pass. Inputs are sampled; outputs are
/// written as storage, blended or overwritten per `uniforms.blend()`.
pub struct Dispatch<'a, T> {
    pub entry_point: KernelEntryPoint,
    pub workgroups: [u32; 3],
    pub uniforms: &'a PassUniforms,
    pub inputs: Vec<(LutKind, &'a T)>,
    pub outputs: Vec<(LutKind, &'a T)>,
}

/// A device that can hold lookup tables and run kernels against them.
/// `dispatch` must not return until the device has finished the pass.
pub trait Accelerator {
    type Kernel;
    type Texture;

    fn create_texture(&mut self, descriptor: &LutDescriptor) -> Result<Self::Texture>;
    fn dispatch(
        &mut self,
        kernel: &Self::Kernel,
        dispatch: &Dispatch<'_, Self::Texture>,
    ) -> Result<()>;
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{error::AtmosphereError, mock::MockModule};
    use std::collections::HashSet;

    #[test]
    fn test_symbols_are_distinct() {
        let symbols = KernelEntryPoint::ALL
            .iter()
            .map(|e| e.symbol())
            .collect::<HashSet<_>>();
        assert_eq!(symbols.len(), 6);
        assert!(symbols.contains("calculate__scattering_density"));
    }

    #[test]
    fn test_bind_resolves_every_entry_point() -> Result<()> {
        let kernels = KernelSet::bind(&MockModule::complete())?;
        for entry_point in KernelEntryPoint::ALL {
            assert_eq!(kernels.get(entry_point).entry_point(), entry_point);
        }
        Ok(())
    }

    #[test]
    fn test_bind_fails_on_any_missing_symbol() {
        for missing in KernelEntryPoint::ALL {
            let module = MockModule::without(missing);
            match KernelSet::bind(&module) {
                Err(AtmosphereError::KernelResolution { entry_point, .. }) => {
                    assert_eq!(entry_point, missing.symbol())
                }
                other => panic!("expected a resolution failure, got {:?}", other),
            }
        }
    }
}
