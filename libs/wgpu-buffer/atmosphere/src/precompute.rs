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
    colorspace::{
        luminance_from_radiance, sky_sun_radiance_to_luminance, white_point, MAX_LAMBDA,
        MIN_LAMBDA, RGB_LAMBDAS,
    },
    config::PrecomputeConfig,
    error::{AtmosphereError, Result},
    kernel::{Accelerator, Dispatch, KernelEntryPoint, KernelModule, KernelSet},
    parameters::{AtmosphereParameters, AtmosphereUniforms, PassUniforms},
    textures::{LutKind, LutStore, LutTables},
};
use log::{debug, info};
use nalgebra::Matrix3;
use std::time::Instant;

/// One wavelength triplet and the matrix that took it to linear sRGB.
#[derive(Clone, Debug, PartialEq)]
pub struct TripletContribution {
    pub lambdas: [f64; 3],
    pub luminance_from_radiance: Matrix3<f64>,
}

/// What a renderer needs, beyond the tables, to turn them into luminance.
#[derive(Clone, Debug, PartialEq)]
pub struct PrecomputeOutput {
    // Sum of all triplet contributions; identity when running in RGB.
    pub luminance_from_radiance: Matrix3<f64>,
    pub triplets: Vec<TripletContribution>,
    pub sky_radiance_to_luminance: [f64; 3],
    pub sun_radiance_to_luminance: [f64; 3],
    pub white_point: [f64; 3],
}

pub struct Precompute<A: Accelerator> {
    accelerator: A,
    kernels: KernelSet<A::Kernel>,
    store: LutStore<A::Texture>,
    params: AtmosphereParameters,
    config: PrecomputeConfig,
    output: Option<PrecomputeOutput>,
}

impl<A: Accelerator> Precompute<A> {
    pub fn new<M>(accelerator: A, module: &M, config: PrecomputeConfig) -> Result<Self>
    where
        M: KernelModule<Kernel = A::Kernel>,
    {
        let params = AtmosphereParameters::earth(&config);
        Self::with_parameters(accelerator, module, config, params)
    }

    /// Run with a custom planet. The parameters must have been built for the
    /// same config. Kernels are bound before any table is allocated, so a
    /// module that is missing an entry point never touches the accelerator.
    pub fn with_parameters<M>(
        mut accelerator: A,
        module: &M,
        config: PrecomputeConfig,
        params: AtmosphereParameters,
    ) -> Result<Self>
    where
        M: KernelModule<Kernel = A::Kernel>,
    {
        config.validate()?;
        params.validate()?;
        params.check_config(&config)?;
        let kernels = KernelSet::bind(module)?;
        let store = LutStore::allocate(
            &mut accelerator,
            params.precision(),
            params.combine_scattering_textures(),
        )?;
        Ok(Self {
            accelerator,
            kernels,
            store,
            params,
            config,
            output: None,
        })
    }

    /// Swap in kernels from a new module and start over with fresh tables.
    /// On failure the instance is left as it was.
    pub fn reinitialize<M>(&mut self, module: &M) -> Result<()>
    where
        M: KernelModule<Kernel = A::Kernel>,
    {
        let kernels = KernelSet::bind(module)?;
        let store = LutStore::allocate(
            &mut self.accelerator,
            self.params.precision(),
            self.params.combine_scattering_textures(),
        )?;
        self.kernels = kernels;
        self.store = store;
        self.output = None;
        Ok(())
    }

    pub fn run(&mut self) -> Result<&PrecomputeOutput> {
        self.store.invalidate();
        self.output = None;

        info!(
            "precomputing atmosphere: {} wavelengths in {} triplets, {} scattering orders",
            self.config.num_wavelengths,
            self.config.num_triplets(),
            self.config.num_scattering_orders
        );
        let precompute_start = Instant::now();

        let spectrum = self.params.spectrum();
        let factors = sky_sun_radiance_to_luminance(
            self.config.num_wavelengths,
            spectrum.wavelengths(),
            spectrum.solar_irradiance(),
        );
        let white_point = white_point(spectrum.wavelengths(), spectrum.solar_irradiance());

        let mut triplets = Vec::with_capacity(self.config.num_triplets());
        if self.config.is_hyperspectral() {
            let num_iterations = self.config.num_triplets();
            let delta_lambda = (MAX_LAMBDA - MIN_LAMBDA) / (3.0 * num_iterations as f64);
            for i in 0..num_iterations {
                let lambdas = [
                    MIN_LAMBDA + (3.0 * i as f64 + 0.5) * delta_lambda,
                    MIN_LAMBDA + (3.0 * i as f64 + 1.5) * delta_lambda,
                    MIN_LAMBDA + (3.0 * i as f64 + 2.5) * delta_lambda,
                ];
                let lfr = luminance_from_radiance(lambdas, delta_lambda);
                self.precompute_one_step(lambdas, &lfr, i > 0)?;
                triplets.push(TripletContribution {
                    lambdas,
                    luminance_from_radiance: lfr,
                });
            }

            // Transmittance is not luminance weighted, so rebuild it at RGB
            // instead of at the last triplet.
            let atmosphere = self.params.uniforms(RGB_LAMBDAS);
            self.compute_transmittance_at(RGB_LAMBDAS, atmosphere, &Matrix3::identity())?;
        } else {
            let lfr = Matrix3::identity();
            self.precompute_one_step(RGB_LAMBDAS, &lfr, false)?;
            triplets.push(TripletContribution {
                lambdas: RGB_LAMBDAS,
                luminance_from_radiance: lfr,
            });
        }

        let luminance_from_radiance = triplets
            .iter()
            .fold(Matrix3::zeros(), |acc, t| acc + t.luminance_from_radiance);
        self.store.mark_complete();
        info!("precompute finished in {:?}", precompute_start.elapsed());

        Ok(self.output.insert(PrecomputeOutput {
            luminance_from_radiance,
            triplets,
            sky_radiance_to_luminance: factors.sky,
            sun_radiance_to_luminance: factors.sun,
            white_point,
        }))
    }

    fn precompute_one_step(
        &mut self,
        lambdas: [f64; 3],
        lfr: &Matrix3<f64>,
        blend: bool,
    ) -> Result<()> {
        // Upload atmosphere parameters for this set of wavelengths.
        let atmosphere = self.params.uniforms(lambdas);

        self.compute_transmittance_at(lambdas, atmosphere, lfr)?;
        self.compute_direct_irradiance_at(lambdas, atmosphere, lfr, blend)?;
        self.compute_single_scattering_at(lambdas, atmosphere, lfr, blend)?;
        for scattering_order in 2..=self.config.num_scattering_orders {
            self.compute_scattering_density_at(lambdas, atmosphere, lfr, scattering_order)?;
            self.compute_indirect_irradiance_at(lambdas, atmosphere, lfr, scattering_order - 1)?;
            self.compute_multiple_scattering_at(lambdas, atmosphere, lfr, scattering_order)?;
        }
        Ok(())
    }

    fn compute_transmittance_at(
        &mut self,
        lambdas: [f64; 3],
        atmosphere: AtmosphereUniforms,
        lfr: &Matrix3<f64>,
    ) -> Result<()> {
        self.dispatch(
            KernelEntryPoint::Transmittance,
            lambdas,
            PassUniforms::new(atmosphere, lfr, 0, &[false]),
            LutKind::Transmittance,
            &[],
            &[LutKind::Transmittance],
        )
    }

    fn compute_direct_irradiance_at(
        &mut self,
        lambdas: [f64; 3],
        atmosphere: AtmosphereUniforms,
        lfr: &Matrix3<f64>,
        blend: bool,
    ) -> Result<()> {
        self.dispatch(
            KernelEntryPoint::DirectIrradiance,
            lambdas,
            PassUniforms::new(atmosphere, lfr, 0, &[false, blend]),
            LutKind::Irradiance,
            &[LutKind::Transmittance],
            &[LutKind::DeltaIrradiance, LutKind::Irradiance],
        )
    }

    fn compute_single_scattering_at(
        &mut self,
        lambdas: [f64; 3],
        atmosphere: AtmosphereUniforms,
        lfr: &Matrix3<f64>,
        blend: bool,
    ) -> Result<()> {
        let mut outputs = vec![
            LutKind::DeltaRayleighScattering,
            LutKind::DeltaMieScattering,
            LutKind::Scattering,
        ];
        if !self.store.is_combined() {
            outputs.push(LutKind::SingleMieScattering);
        }
        self.dispatch(
            KernelEntryPoint::SingleScattering,
            lambdas,
            PassUniforms::new(atmosphere, lfr, 1, &[false, false, blend, blend]),
            LutKind::Scattering,
            &[LutKind::Transmittance],
            &outputs,
        )
    }

    fn compute_scattering_density_at(
        &mut self,
        lambdas: [f64; 3],
        atmosphere: AtmosphereUniforms,
        lfr: &Matrix3<f64>,
        scattering_order: usize,
    ) -> Result<()> {
        self.dispatch(
            KernelEntryPoint::ScatteringDensity,
            lambdas,
            PassUniforms::new(atmosphere, lfr, scattering_order, &[false]),
            LutKind::DeltaScatteringDensity,
            &[
                LutKind::Transmittance,
                LutKind::DeltaRayleighScattering,
                LutKind::DeltaMieScattering,
                LutKind::DeltaMultipleScattering,
                LutKind::DeltaIrradiance,
            ],
            &[LutKind::DeltaScatteringDensity],
        )
    }

    fn compute_indirect_irradiance_at(
        &mut self,
        lambdas: [f64; 3],
        atmosphere: AtmosphereUniforms,
        lfr: &Matrix3<f64>,
        scattering_order: usize,
    ) -> Result<()> {
        self.dispatch(
            KernelEntryPoint::IndirectIrradiance,
            lambdas,
            PassUniforms::new(atmosphere, lfr, scattering_order, &[false, true]),
            LutKind::Irradiance,
            &[
                LutKind::DeltaRayleighScattering,
                LutKind::DeltaMieScattering,
                LutKind::DeltaMultipleScattering,
            ],
            &[LutKind::DeltaIrradiance, LutKind::Irradiance],
        )
    }

    fn compute_multiple_scattering_at(
        &mut self,
        lambdas: [f64; 3],
        atmosphere: AtmosphereUniforms,
        lfr: &Matrix3<f64>,
        scattering_order: usize,
    ) -> Result<()> {
        self.dispatch(
            KernelEntryPoint::MultipleScattering,
            lambdas,
            PassUniforms::new(atmosphere, lfr, scattering_order, &[false, true]),
            LutKind::Scattering,
            &[LutKind::Transmittance, LutKind::DeltaScatteringDensity],
            &[LutKind::DeltaMultipleScattering, LutKind::Scattering],
        )
    }

    fn dispatch(
        &mut self,
        entry_point: KernelEntryPoint,
        lambdas: [f64; 3],
        uniforms: PassUniforms,
        grid: LutKind,
        inputs: &[LutKind],
        outputs: &[LutKind],
    ) -> Result<()> {
        let start = Instant::now();
        let store = &self.store;
        let lookup = |kinds: &[LutKind]| {
            kinds
                .iter()
                .map(|kind| {
                    store
                        .texture(*kind)
                        .map(|texture| (*kind, texture))
                        .ok_or_else(|| AtmosphereError::Precompute {
                            pass: entry_point.pass_name(),
                            reason: format!("{} was not allocated", kind.label()),
                        })
                })
                .collect::<Result<Vec<_>>>()
        };
        let dispatch = Dispatch {
            entry_point,
            workgroups: grid.extent().workgroups(),
            uniforms: &uniforms,
            inputs: lookup(inputs)?,
            outputs: lookup(outputs)?,
        };
        self.accelerator
            .dispatch(self.kernels.get(entry_point), &dispatch)?;
        debug!(
            "{:<20}{:?}: {:?}",
            entry_point.pass_name(),
            lambdas,
            start.elapsed()
        );
        Ok(())
    }

    /// The finished tables; None until a run has completed successfully.
    pub fn tables(&self) -> Option<LutTables<'_, A::Texture>> {
        self.store.tables()
    }

    pub fn output(&self) -> Option<&PrecomputeOutput> {
        if self.store.is_complete() {
            self.output.as_ref()
        } else {
            None
        }
    }

    pub fn store(&self) -> &LutStore<A::Texture> {
        &self.store
    }

    pub fn parameters(&self) -> &AtmosphereParameters {
        &self.params
    }

    pub fn config(&self) -> &PrecomputeConfig {
        &self.config
    }

    pub fn accelerator(&self) -> &A {
        &self.accelerator
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        config::Precision,
        mock::{MockAccelerator, MockModule},
        textures::LutFormat,
    };
    use approx::assert_relative_eq;

    fn entry_points(accelerator: &MockAccelerator) -> Vec<KernelEntryPoint> {
        accelerator
            .journal()
            .dispatches
            .iter()
            .map(|d| d.entry_point)
            .collect()
    }

    #[test]
    fn test_rgb_runs_one_sequence() -> Result<()> {
        use KernelEntryPoint::*;
        let accelerator = MockAccelerator::default();
        let mut pcp = Precompute::new(
            accelerator.clone(),
            &MockModule::complete(),
            PrecomputeConfig::default(),
        )?;
        assert!(pcp.tables().is_none());
        let output = pcp.run()?.clone();
        assert_eq!(output.luminance_from_radiance, Matrix3::identity());
        assert_eq!(output.triplets.len(), 1);
        assert_eq!(output.triplets[0].lambdas, RGB_LAMBDAS);
        assert_eq!(
            entry_points(&accelerator),
            vec![
                Transmittance,
                DirectIrradiance,
                SingleScattering,
                ScatteringDensity,
                IndirectIrradiance,
                MultipleScattering,
                ScatteringDensity,
                IndirectIrradiance,
                MultipleScattering,
                ScatteringDensity,
                IndirectIrradiance,
                MultipleScattering,
            ]
        );
        for d in &accelerator.journal().dispatches {
            assert_eq!(d.uniforms.luminance_from_radiance(), Matrix3::identity());
            // Nothing accumulates across triplets in RGB; only the order loop adds.
            let expect_blend = matches!(d.entry_point, IndirectIrradiance | MultipleScattering);
            assert_eq!(d.uniforms.blend()[1], expect_blend);
        }
        assert!(pcp.tables().is_some());
        assert_eq!(pcp.output(), Some(&output));
        Ok(())
    }

    #[test]
    fn test_scattering_orders_and_inputs() -> Result<()> {
        use KernelEntryPoint::*;
        let accelerator = MockAccelerator::default();
        let mut pcp = Precompute::new(
            accelerator.clone(),
            &MockModule::complete(),
            PrecomputeConfig::default(),
        )?;
        pcp.run()?;
        let journal = accelerator.journal();
        let orders = journal
            .dispatches
            .iter()
            .filter(|d| d.entry_point == ScatteringDensity)
            .map(|d| d.uniforms.scattering_order())
            .collect::<Vec<_>>();
        assert_eq!(orders, vec![2, 3, 4]);
        let orders = journal
            .dispatches
            .iter()
            .filter(|d| d.entry_point == IndirectIrradiance)
            .map(|d| d.uniforms.scattering_order())
            .collect::<Vec<_>>();
        assert_eq!(orders, vec![1, 2, 3]);

        let density = &journal.dispatches[3];
        assert_eq!(density.entry_point, ScatteringDensity);
        assert_eq!(density.inputs.len(), 5);
        assert_eq!(density.outputs, vec![LutKind::DeltaScatteringDensity]);
        assert_eq!(density.workgroups, [32, 16, 4]);
        let transmittance = &journal.dispatches[0];
        assert!(transmittance.inputs.is_empty());
        assert_eq!(transmittance.workgroups, [32, 8, 1]);
        Ok(())
    }

    #[test]
    fn test_single_order_skips_loop() -> Result<()> {
        let accelerator = MockAccelerator::default();
        let config = PrecomputeConfig {
            num_scattering_orders: 1,
            ..Default::default()
        };
        let mut pcp = Precompute::new(accelerator.clone(), &MockModule::complete(), config)?;
        pcp.run()?;
        assert_eq!(accelerator.journal().dispatches.len(), 3);
        Ok(())
    }

    #[test]
    fn test_hyperspectral_accumulates_triplets() -> Result<()> {
        use KernelEntryPoint::*;
        let accelerator = MockAccelerator::default();
        let config = PrecomputeConfig {
            num_wavelengths: 15,
            ..Default::default()
        };
        let mut pcp = Precompute::new(accelerator.clone(), &MockModule::complete(), config)?;
        let output = pcp.run()?.clone();

        // 5 triplets of 12 passes, then transmittance again at RGB.
        let journal = accelerator.journal();
        assert_eq!(journal.dispatches.len(), 5 * 12 + 1);
        assert_eq!(output.triplets.len(), 5);
        let delta_lambda = 470.0 / 15.0;
        assert_relative_eq!(output.triplets[0].lambdas[0], 360.0 + 0.5 * delta_lambda);
        assert_relative_eq!(output.triplets[4].lambdas[2], 360.0 + 14.5 * delta_lambda);

        let mut sum = Matrix3::zeros();
        for (i, t) in output.triplets.iter().enumerate() {
            assert_ne!(t.luminance_from_radiance, Matrix3::identity());
            for u in output.triplets.iter().skip(i + 1) {
                assert_ne!(t.luminance_from_radiance, u.luminance_from_radiance);
            }
            sum += t.luminance_from_radiance;
        }
        assert_relative_eq!(output.luminance_from_radiance, sum);
        assert_eq!(output.sky_radiance_to_luminance, [683.0; 3]);

        // The first triplet overwrites the final tables; later ones add.
        for (i, chunk) in journal.dispatches[..60].chunks(12).enumerate() {
            let blend = i > 0;
            assert_eq!(chunk[1].entry_point, DirectIrradiance);
            assert_eq!(chunk[1].uniforms.blend(), [false, blend, false, false]);
            assert_eq!(chunk[2].entry_point, SingleScattering);
            assert_eq!(chunk[2].uniforms.blend(), [false, false, blend, blend]);
            let m = chunk[2].uniforms.luminance_from_radiance();
            assert_relative_eq!(
                m,
                output.triplets[i].luminance_from_radiance,
                max_relative = 1e-6,
                epsilon = 1e-7
            );
        }

        let last = &journal.dispatches[60];
        assert_eq!(last.entry_point, Transmittance);
        let rgb = pcp.parameters().uniforms(RGB_LAMBDAS);
        assert_eq!(
            last.uniforms.atmosphere().rayleigh_scattering(),
            rgb.rayleigh_scattering()
        );
        Ok(())
    }

    #[test]
    fn test_missing_kernel_allocates_nothing() {
        for missing in KernelEntryPoint::ALL {
            let accelerator = MockAccelerator::default();
            let result = Precompute::new(
                accelerator.clone(),
                &MockModule::without(missing),
                PrecomputeConfig::default(),
            );
            assert!(matches!(
                result,
                Err(AtmosphereError::KernelResolution { entry_point, .. })
                    if entry_point == missing.symbol()
            ));
            assert!(accelerator.journal().created.is_empty());
            assert!(accelerator.journal().dispatches.is_empty());
        }
    }

    #[test]
    fn test_parameters_must_match_config() {
        let accelerator = MockAccelerator::default();
        let config = PrecomputeConfig {
            precision: Precision::Half,
            combine_scattering_textures: false,
            use_ozone: false,
            ..Default::default()
        };
        let params = AtmosphereParameters::earth(&PrecomputeConfig::default());
        assert!(matches!(
            Precompute::with_parameters(
                accelerator.clone(),
                &MockModule::complete(),
                config,
                params
            ),
            Err(AtmosphereError::Initialization(_))
        ));
        assert!(accelerator.journal().created.is_empty());
    }

    #[test]
    fn test_custom_planet_reaches_every_pass() -> Result<()> {
        use crate::density::{DensityProfile, DensityProfileLayer};
        let accelerator = MockAccelerator::default();
        let config = PrecomputeConfig::default();
        let params = AtmosphereParameters::earth(&config)
            .with_radii(3_390_000.0, 3_500_000.0)
            .with_density_profiles(
                DensityProfile::single(DensityProfileLayer::exponential(11_100.0)),
                DensityProfile::mie(),
                DensityProfile::ozone(),
            )
            .with_mie_phase_function_g(0.76);
        let mut pcp =
            Precompute::with_parameters(accelerator.clone(), &MockModule::complete(), config, params)?;
        pcp.run()?;
        let journal = accelerator.journal();
        assert_eq!(journal.dispatches.len(), 12);
        for d in &journal.dispatches {
            let atmosphere = d.uniforms.atmosphere();
            assert_relative_eq!(atmosphere.bottom_radius(), 3390.0);
            assert_relative_eq!(atmosphere.top_radius(), 3500.0);
            assert_relative_eq!(atmosphere.mie_phase_function_g(), 0.76);
        }
        Ok(())
    }

    #[test]
    fn test_failed_dispatch_leaves_tables_unpublished() -> Result<()> {
        let accelerator = MockAccelerator::failing_dispatch(4);
        let mut pcp = Precompute::new(
            accelerator.clone(),
            &MockModule::complete(),
            PrecomputeConfig::default(),
        )?;
        assert!(matches!(
            pcp.run(),
            Err(AtmosphereError::Precompute {
                pass: "indirect-irradiance",
                ..
            })
        ));
        assert!(pcp.tables().is_none());
        assert!(pcp.output().is_none());
        assert_eq!(accelerator.journal().dispatches.len(), 4);
        Ok(())
    }

    #[test]
    fn test_rerun_and_reinitialize() -> Result<()> {
        let accelerator = MockAccelerator::default();
        let mut pcp = Precompute::new(
            accelerator.clone(),
            &MockModule::complete(),
            PrecomputeConfig::default(),
        )?;
        pcp.run()?;
        pcp.run()?;
        assert_eq!(accelerator.journal().created.len(), 8);
        assert_eq!(accelerator.journal().dispatches.len(), 24);

        assert!(pcp
            .reinitialize(&MockModule::without(KernelEntryPoint::Transmittance))
            .is_err());
        assert!(pcp.tables().is_some());
        assert_eq!(accelerator.journal().created.len(), 8);

        pcp.reinitialize(&MockModule::complete())?;
        assert!(pcp.tables().is_none());
        assert!(pcp.output().is_none());
        assert_eq!(accelerator.journal().created.len(), 16);
        pcp.run()?;
        assert!(pcp.tables().is_some());
        Ok(())
    }

    #[test]
    fn test_ozone_disabled_reaches_every_pass() -> Result<()> {
        let accelerator = MockAccelerator::default();
        let config = PrecomputeConfig {
            use_ozone: false,
            num_wavelengths: 9,
            ..Default::default()
        };
        let mut pcp = Precompute::new(accelerator.clone(), &MockModule::complete(), config)?;
        pcp.run()?;
        let journal = accelerator.journal();
        assert!(!journal.dispatches.is_empty());
        for d in &journal.dispatches {
            assert_eq!(d.uniforms.atmosphere().absorption_extinction(), [0f32; 4]);
        }
        Ok(())
    }

    #[test]
    fn test_half_precision_split_layout() -> Result<()> {
        let accelerator = MockAccelerator::default();
        let config = PrecomputeConfig {
            precision: Precision::Half,
            combine_scattering_textures: false,
            ..Default::default()
        };
        let mut pcp = Precompute::new(accelerator.clone(), &MockModule::complete(), config)?;
        {
            let journal = accelerator.journal();
            assert_eq!(journal.created.len(), 9);
            for d in &journal.created {
                let expect = if d.extent.depth > 1 {
                    LutFormat::Rgba16Float
                } else {
                    LutFormat::Rgba32Float
                };
                assert_eq!(d.format, expect, "{:?}", d.kind);
            }
        }
        pcp.run()?;
        let single = accelerator
            .journal()
            .dispatches
            .iter()
            .find(|d| d.entry_point == KernelEntryPoint::SingleScattering)
            .map(|d| d.outputs.clone());
        assert_eq!(
            single,
            Some(vec![
                LutKind::DeltaRayleighScattering,
                LutKind::DeltaMieScattering,
                LutKind::Scattering,
                LutKind::SingleMieScattering,
            ])
        );
        let tables = pcp.tables().expect("complete");
        assert!(tables.single_mie_scattering.is_some());
        Ok(())
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = PrecomputeConfig {
            num_wavelengths: 0,
            ..Default::default()
        };
        let accelerator = MockAccelerator::default();
        assert!(matches!(
            Precompute::new(accelerator.clone(), &MockModule::complete(), config),
            Err(AtmosphereError::Initialization(_))
        ));
        assert!(accelerator.journal().created.is_empty());
    }
}
