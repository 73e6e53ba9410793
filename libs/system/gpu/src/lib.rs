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

// Note: re-export so that dependents agree on the wgpu version.
pub use wgpu;

use anyhow::{anyhow, bail, Result};
use futures::executor::block_on;
use log::{info, trace};
use parking_lot::Mutex;
use std::{borrow::Cow, mem, num::NonZeroU32, sync::Arc};
use wgpu::util::DeviceExt;
use zerocopy::AsBytes;

#[derive(Clone, Debug)]
pub struct GpuConfig {
    pub power_preference: wgpu::PowerPreference,
    pub backends: wgpu::Backends,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            backends: wgpu::Backends::PRIMARY,
        }
    }
}

pub fn texture_format_size(texture_format: wgpu::TextureFormat) -> u32 {
    let info = texture_format.describe();
    info.block_size as u32
}

/// A device and queue without a surface. Table building runs entirely in
/// compute, so we never need a window to present into.
#[derive(Debug)]
pub struct Gpu {
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl Gpu {
    pub fn new_headless(config: &GpuConfig) -> Result<Self> {
        block_on(Self::new_headless_async(config))
    }

    pub async fn new_headless_async(config: &GpuConfig) -> Result<Self> {
        let instance = wgpu::Instance::new(config.backends);
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: config.power_preference,
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .ok_or_else(|| anyhow!("no suitable graphics adapter"))?;
        let info = adapter.get_info();
        info!("using adapter {} on {:?}", info.name, info.backend);

        // Read-write storage of float tables is an adapter specific format feature.
        let features = adapter.features();
        if !features.contains(wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES) {
            bail!("adapter {} cannot write to float storage textures", info.name);
        }
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("headless-device"),
                    features,
                    limits: adapter.limits(),
                },
                None,
            )
            .await?;

        Ok(Self {
            adapter,
            device,
            queue,
        })
    }

    pub fn push_buffer(
        &self,
        label: &'static str,
        data: &[u8],
        usage: wgpu::BufferUsages,
    ) -> wgpu::Buffer {
        trace!("uploading {} with {} bytes", label, data.len());
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data,
                usage,
            })
    }

    pub fn push_slice<T: AsBytes>(
        &self,
        label: &'static str,
        data: &[T],
        usage: wgpu::BufferUsages,
    ) -> wgpu::Buffer {
        trace!(
            "uploading {} with {} bytes",
            label,
            mem::size_of::<T>() * data.len()
        );
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data.as_bytes(),
                usage,
            })
    }

    pub fn push_data<T: AsBytes>(
        &self,
        label: &'static str,
        data: &T,
        usage: wgpu::BufferUsages,
    ) -> wgpu::Buffer {
        trace!("uploading {} with {} bytes", label, mem::size_of::<T>());
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data.as_bytes(),
                usage,
            })
    }

    pub fn create_shader_module(&self, name: &str, spirv: &[u8]) -> Result<wgpu::ShaderModule> {
        self.create_shader_module_from(name, wgpu::util::make_spirv(spirv))
    }

    pub fn create_wgsl_module(&self, name: &str, source: &str) -> Result<wgpu::ShaderModule> {
        self.create_shader_module_from(name, wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)))
    }

    fn create_shader_module_from(
        &self,
        name: &str,
        source: wgpu::ShaderSource,
    ) -> Result<wgpu::ShaderModule> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(name),
                source,
            });
        if let Some(err) = block_on(self.device.pop_error_scope()) {
            bail!("failed to create shader module {}: {}", name, err);
        }
        Ok(module)
    }

    pub fn stride_for_row_size(size: u32) -> u32 {
        (size + wgpu::COPY_BYTES_PER_ROW_ALIGNMENT - 1) / wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
    }

    /// Copy the full contents of the texture back to the host. Rows are
    /// returned tightly packed, with the copy alignment padding removed.
    pub fn read_texture(
        &self,
        texture: &wgpu::Texture,
        extent: wgpu::Extent3d,
        format: wgpu::TextureFormat,
    ) -> Result<Vec<u8>> {
        let row_size = extent.width * texture_format_size(format);
        let bytes_per_row = Self::stride_for_row_size(row_size);
        let buf_size =
            u64::from(bytes_per_row) * u64::from(extent.height * extent.depth_or_array_layers);
        let download_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("texture-download-buffer"),
            size: buf_size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("texture-download-command-encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &download_buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: NonZeroU32::new(bytes_per_row),
                    rows_per_image: NonZeroU32::new(extent.height),
                },
            },
            extent,
        );
        self.queue.submit(vec![encoder.finish()]);

        let waiter = Arc::new(Mutex::new(None));
        let map_waiter = waiter.clone();
        download_buffer
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| {
                *map_waiter.lock() = Some(result);
            });
        while waiter.lock().is_none() {
            self.device.poll(wgpu::Maintain::Wait);
        }
        if let Some(Err(err)) = waiter.lock().take() {
            bail!("failed to map texture download buffer: {}", err);
        }

        let mut packed =
            Vec::with_capacity((row_size * extent.height * extent.depth_or_array_layers) as usize);
        {
            let mapping = download_buffer.slice(..).get_mapped_range();
            for row in mapping.chunks(bytes_per_row as usize) {
                packed.extend_from_slice(&row[..row_size as usize]);
            }
        }
        download_buffer.unmap();
        Ok(packed)
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_row_stride_is_copy_aligned() {
        assert_eq!(Gpu::stride_for_row_size(1), wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
        assert_eq!(Gpu::stride_for_row_size(256 * 16), 256 * 16);
        assert_eq!(Gpu::stride_for_row_size(64 * 8 + 1), 768);
    }

    #[test]
    fn test_float_table_formats() {
        assert_eq!(texture_format_size(wgpu::TextureFormat::Rgba32Float), 16);
        assert_eq!(texture_format_size(wgpu::TextureFormat::Rgba16Float), 8);
    }
}
