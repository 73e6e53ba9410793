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
    error::{AtmosphereError, Result},
    kernel::{Accelerator, Dispatch, KernelEntryPoint, KernelModule},
    textures::{LutDescriptor, LutDimension, LutFormat},
};
use anyhow::{anyhow, Context};
use futures::executor::block_on;
use gpu::Gpu;
use log::trace;
use std::{collections::HashSet, fs, path::Path, sync::Arc};

// Binding layout shared by every kernel in group 0:
//   0: PassUniforms
//   then for each input: a texture followed by its sampler
//   then each output as a storage texture
// Inputs and outputs appear in the order the pass lists them.
const UNIFORMS_BINDING: u32 = 0;

/// Names of every compute entry point in the module.
pub fn compute_entry_points(module: &naga::Module) -> HashSet<String> {
    module
        .entry_points
        .iter()
        .filter(|ep| ep.stage == naga::ShaderStage::Compute)
        .map(|ep| ep.name.clone())
        .collect()
}

pub fn reflect_wgsl(source: &str) -> anyhow::Result<HashSet<String>> {
    let module =
        naga::front::wgsl::parse_str(source).map_err(|e| anyhow!(e.emit_to_string(source)))?;
    Ok(compute_entry_points(&module))
}

pub fn reflect_spirv(spirv: &[u8]) -> anyhow::Result<HashSet<String>> {
    let module = naga::front::spv::parse_u8_slice(spirv, &naga::front::spv::Options::default())?;
    Ok(compute_entry_points(&module))
}

/// A compiled module of atmosphere kernels, checked with naga for the
/// entry points it exports before anything is handed to the device.
pub struct GpuKernelModule {
    gpu: Arc<Gpu>,
    label: String,
    module: wgpu::ShaderModule,
    entry_points: HashSet<String>,
}

impl GpuKernelModule {
    pub fn from_spirv(gpu: Arc<Gpu>, label: &str, spirv: &[u8]) -> anyhow::Result<Self> {
        let entry_points = reflect_spirv(spirv).with_context(|| format!("parsing {}", label))?;
        let module = gpu.create_shader_module(label, spirv)?;
        Ok(Self {
            gpu,
            label: label.to_owned(),
            module,
            entry_points,
        })
    }

    pub fn from_wgsl(gpu: Arc<Gpu>, label: &str, source: &str) -> anyhow::Result<Self> {
        let entry_points = reflect_wgsl(source).with_context(|| format!("parsing {}", label))?;
        let module = gpu.create_wgsl_module(label, source)?;
        Ok(Self {
            gpu,
            label: label.to_owned(),
            module,
            entry_points,
        })
    }

    /// WGSL if the file says so by extension, otherwise SPIR-V.
    pub fn from_path(gpu: Arc<Gpu>, path: &Path) -> anyhow::Result<Self> {
        let label = path.display().to_string();
        if path.extension().and_then(|ext| ext.to_str()) == Some("wgsl") {
            let source = fs::read_to_string(path)?;
            Self::from_wgsl(gpu, &label, &source)
        } else {
            let spirv = fs::read(path)?;
            Self::from_spirv(gpu, &label, &spirv)
        }
    }

    pub fn entry_points(&self) -> &HashSet<String> {
        &self.entry_points
    }
}

#[derive(Debug)]
pub struct GpuKernel {
    entry_point: KernelEntryPoint,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl KernelModule for GpuKernelModule {
    type Kernel = GpuKernel;

    fn resolve(&self, entry_point: KernelEntryPoint) -> Result<GpuKernel> {
        let symbol = entry_point.symbol();
        if !self.entry_points.contains(symbol) {
            return Err(AtmosphereError::KernelResolution {
                entry_point: symbol,
                reason: format!("not a compute entry point of {}", self.label),
            });
        }
        let device = self.gpu.device();
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(symbol),
            layout: None,
            module: &self.module,
            entry_point: symbol,
        });
        if let Some(err) = block_on(device.pop_error_scope()) {
            return Err(AtmosphereError::KernelResolution {
                entry_point: symbol,
                reason: err.to_string(),
            });
        }
        let bind_group_layout = pipeline.get_bind_group_layout(0);
        Ok(GpuKernel {
            entry_point,
            pipeline,
            bind_group_layout,
        })
    }
}

#[derive(Debug)]
pub struct GpuLut {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    descriptor: LutDescriptor,
}

impl GpuLut {
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn descriptor(&self) -> &LutDescriptor {
        &self.descriptor
    }

    pub fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.descriptor.extent.width,
            height: self.descriptor.extent.height,
            depth_or_array_layers: self.descriptor.extent.depth,
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        texture_format(self.descriptor.format)
    }
}

fn texture_format(format: LutFormat) -> wgpu::TextureFormat {
    match format {
        LutFormat::Rgba32Float => wgpu::TextureFormat::Rgba32Float,
        LutFormat::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
    }
}

pub struct GpuAccelerator {
    gpu: Arc<Gpu>,
    sampler: wgpu::Sampler,
}

impl GpuAccelerator {
    pub fn new(gpu: Arc<Gpu>) -> Self {
        let sampler = gpu.device().create_sampler(&wgpu::SamplerDescriptor {
            label: Some("atmosphere-precompute-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        Self { gpu, sampler }
    }

    pub fn gpu(&self) -> &Arc<Gpu> {
        &self.gpu
    }
}

impl Accelerator for GpuAccelerator {
    type Kernel = GpuKernel;
    type Texture = GpuLut;

    fn create_texture(&mut self, descriptor: &LutDescriptor) -> Result<GpuLut> {
        let device = self.gpu.device();
        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(descriptor.kind.label()),
            size: wgpu::Extent3d {
                width: descriptor.extent.width,
                height: descriptor.extent.height,
                depth_or_array_layers: descriptor.extent.depth,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: match descriptor.dimension {
                LutDimension::D2 => wgpu::TextureDimension::D2,
                LutDimension::D3 => wgpu::TextureDimension::D3,
            },
            format: texture_format(descriptor.format),
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
        });
        if let Some(err) = block_on(device.pop_error_scope()) {
            return Err(AtmosphereError::Initialization(format!(
                "failed to allocate {}: {}",
                descriptor.kind.label(),
                err
            )));
        }
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(descriptor.kind.label()),
            ..Default::default()
        });
        Ok(GpuLut {
            texture,
            view,
            descriptor: *descriptor,
        })
    }

    fn dispatch(&mut self, kernel: &GpuKernel, dispatch: &Dispatch<'_, GpuLut>) -> Result<()> {
        let pass = dispatch.entry_point.pass_name();
        debug_assert_eq!(kernel.entry_point, dispatch.entry_point);
        let device = self.gpu.device();
        let uniforms_buffer = self.gpu.push_data(
            "atmosphere-pass-uniforms-buffer",
            dispatch.uniforms,
            wgpu::BufferUsages::UNIFORM,
        );

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: UNIFORMS_BINDING,
            resource: uniforms_buffer.as_entire_binding(),
        }];
        let mut binding = UNIFORMS_BINDING + 1;
        for (_, input) in &dispatch.inputs {
            entries.push(wgpu::BindGroupEntry {
                binding,
                resource: wgpu::BindingResource::TextureView(&input.view),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: binding + 1,
                resource: wgpu::BindingResource::Sampler(&self.sampler),
            });
            binding += 2;
        }
        for (_, output) in &dispatch.outputs {
            entries.push(wgpu::BindGroupEntry {
                binding,
                resource: wgpu::BindingResource::TextureView(&output.view),
            });
            binding += 1;
        }
        trace!("{}: binding {} resources", pass, entries.len());

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("atmosphere-precompute-bind-group"),
            layout: &kernel.bind_group_layout,
            entries: &entries,
        });
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("atmosphere-precompute-command-encoder"),
        });
        {
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(pass),
            });
            cpass.set_pipeline(&kernel.pipeline);
            cpass.set_bind_group(0, &bind_group, &[]);
            let [x, y, z] = dispatch.workgroups;
            cpass.dispatch_workgroups(x, y, z);
        }
        self.gpu.queue().submit(vec![encoder.finish()]);
        device.poll(wgpu::Maintain::Wait);
        if let Some(err) = block_on(device.pop_error_scope()) {
            return Err(AtmosphereError::Precompute {
                pass,
                reason: err.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const KERNELS: &str = r#"
struct PassUniforms {
    scattering_order: u32,
}
@group(0) @binding(0) var<uniform> uniforms: PassUniforms;

@compute @workgroup_size(8, 8, 1)
fn calculate_transmittance(@builtin(global_invocation_id) id: vec3<u32>) {}
@compute @workgroup_size(8, 8, 1)
fn calculate_direct_irradiance(@builtin(global_invocation_id) id: vec3<u32>) {}
@compute @workgroup_size(8, 8, 1)
fn calculate_indirect_irradiance(@builtin(global_invocation_id) id: vec3<u32>) {}
@compute @workgroup_size(8, 8, 8)
fn calculate_multiple_scattering(@builtin(global_invocation_id) id: vec3<u32>) {}
@compute @workgroup_size(8, 8, 8)
fn calculate__scattering_density(@builtin(global_invocation_id) id: vec3<u32>) {}
@compute @workgroup_size(8, 8, 8)
fn calculate_single_scattering(@builtin(global_invocation_id) id: vec3<u32>) {}

@vertex
fn calculate_vertex() -> @builtin(position) vec4<f32> {
    return vec4<f32>(0.0, 0.0, 0.0, 1.0);
}
"#;

    #[test]
    fn test_reflect_compute_entry_points() -> anyhow::Result<()> {
        let entry_points = reflect_wgsl(KERNELS)?;
        assert_eq!(entry_points.len(), 6);
        for entry_point in KernelEntryPoint::ALL {
            assert!(entry_points.contains(entry_point.symbol()));
        }
        assert!(!entry_points.contains("calculate_vertex"));
        Ok(())
    }

    #[test]
    fn test_reflect_rejects_bad_source() {
        assert!(reflect_wgsl("fn calculate_transmittance( {").is_err());
        assert!(reflect_spirv(&[0u8; 16]).is_err());
    }
}
