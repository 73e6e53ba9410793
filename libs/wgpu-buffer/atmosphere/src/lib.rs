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

// All code in this module is heavily inspired by -- and all too
// frequently directly copied from -- the most excellent:
//     https://ebruneton.github.io/precomputed_atmospheric_scattering/
// Which is:
//     Copyright (c) 2017 Eric Bruneton
// All errors and omissions below were introduced in transcription
// to Rust/Vulkan/wgpu and are not reflective of the high quality of the
// original work in any way.
mod colorspace;
mod config;
mod density;
mod error;
mod gpu_backend;
mod kernel;
#[cfg(test)]
mod mock;
mod parameters;
mod precompute;
mod spectrum;
mod table_helpers;
mod textures;

pub use crate::{
    colorspace::{
        cie_color_matching_value, compute_radiance_to_luminance_factors, interpolate,
        luminance_from_radiance, sky_sun_radiance_to_luminance, white_point,
        xyz_to_rgb_coefficient, CieChannel, RadianceToLuminance, MAX_LAMBDA, MIN_LAMBDA,
        RGB_LAMBDAS,
    },
    config::{Precision, PrecomputeConfig, PrecomputeOpts},
    density::{DensityProfile, DensityProfileLayer},
    error::{AtmosphereError, Result},
    gpu_backend::{
        compute_entry_points, reflect_spirv, reflect_wgsl, GpuAccelerator, GpuKernel,
        GpuKernelModule, GpuLut,
    },
    kernel::{Accelerator, Dispatch, KernelEntryPoint, KernelModule, KernelSet},
    parameters::{AtmosphereParameters, AtmosphereUniforms, PassUniforms},
    precompute::{Precompute, PrecomputeOutput, TripletContribution},
    spectrum::{SpectralColumn, SpectralSample, SpectralSamples},
    table_helpers::TableHelpers,
    textures::{
        LutDescriptor, LutDimension, LutExtent, LutFormat, LutKind, LutStore, LutTables,
        BLOCK_SIZE, IRRADIANCE_EXTENT, SCATTERING_EXTENT, TRANSMITTANCE_EXTENT,
    },
};
