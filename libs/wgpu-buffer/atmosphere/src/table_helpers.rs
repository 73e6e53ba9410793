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
    config::PrecomputeConfig,
    gpu_backend::GpuLut,
    precompute::PrecomputeOutput,
    textures::{LutFormat, LutTables},
};
use anyhow::{anyhow, Result};
use gpu::Gpu;
use image::{ImageBuffer, Rgb};
use json::JsonValue;
use log::info;
use nalgebra::Matrix3;
use std::{fs, path::Path};

// Scales sky radiance into a visible range for previews.
const PREVIEW_EXPOSURE: f32 = 683f32 * 0.0001f32;

pub struct TableHelpers;

impl TableHelpers {
    /// Download the finished tables and write them, with the factors needed
    /// to interpret them, into `directory`.
    pub fn write_tables(
        gpu: &Gpu,
        tables: &LutTables<'_, GpuLut>,
        output: &PrecomputeOutput,
        config: &PrecomputeConfig,
        directory: &Path,
        png: bool,
    ) -> Result<()> {
        fs::create_dir_all(directory)?;
        let mut named = vec![
            ("transmittance", tables.transmittance),
            ("irradiance", tables.irradiance),
            ("scattering", tables.scattering),
        ];
        if let Some(single_mie_scattering) = tables.single_mie_scattering {
            named.push(("single_mie_scattering", single_mie_scattering));
        }
        for (name, lut) in named {
            let data = gpu.read_texture(lut.texture(), lut.extent(), lut.format())?;
            let path = directory.join(format!("solar_{}.wgpu.bin", name));
            info!("writing {} bytes to {}", data.len(), path.display());
            fs::write(&path, &data)?;

            // Half float previews would need a conversion pass; the .bin is enough.
            if png && lut.descriptor().format == LutFormat::Rgba32Float {
                let floats = Self::bytes_to_floats(&data);
                let (lo, hi) = Self::show_range(&floats);
                info!("RANGE: {} -> {} in {}", lo, hi, name);
                let pixels = Self::tonemap(&floats, output.white_point);
                let extent = lut.descriptor().extent;
                Self::save_layered(
                    &pixels,
                    extent.width,
                    extent.height,
                    &directory.join(format!("solar_{}", name)),
                )?;
            }
        }

        let path = directory.join("luminance.json");
        fs::write(&path, Self::luminance_json(output, config)?.pretty(2))?;
        Ok(())
    }

    pub fn luminance_json(output: &PrecomputeOutput, config: &PrecomputeConfig) -> Result<JsonValue> {
        fn matrix(m: &Matrix3<f64>) -> JsonValue {
            let rows = (0..3)
                .map(|r| (0..3).map(|c| m[(r, c)]).collect::<Vec<f64>>())
                .collect::<Vec<_>>();
            JsonValue::from(rows)
        }

        let mut triplets = JsonValue::new_array();
        for triplet in &output.triplets {
            let mut obj = JsonValue::new_object();
            obj.insert("lambdas", triplet.lambdas.to_vec())?;
            obj.insert(
                "luminance_from_radiance",
                matrix(&triplet.luminance_from_radiance),
            )?;
            triplets.push(obj)?;
        }

        let mut obj = JsonValue::new_object();
        obj.insert("num_wavelengths", config.num_wavelengths)?;
        obj.insert("num_scattering_orders", config.num_scattering_orders)?;
        obj.insert("combine_scattering_textures", config.combine_scattering_textures)?;
        obj.insert("length_unit_in_meters", config.length_unit_in_meters)?;
        obj.insert(
            "luminance_from_radiance",
            matrix(&output.luminance_from_radiance),
        )?;
        obj.insert(
            "sky_radiance_to_luminance",
            output.sky_radiance_to_luminance.to_vec(),
        )?;
        obj.insert(
            "sun_radiance_to_luminance",
            output.sun_radiance_to_luminance.to_vec(),
        )?;
        obj.insert("white_point", output.white_point.to_vec())?;
        obj.insert("triplets", triplets)?;
        Ok(obj)
    }

    fn bytes_to_floats(data: &[u8]) -> Vec<f32> {
        data.chunks_exact(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }

    pub fn show_range(buf: &[f32]) -> (f32, f32) {
        buf.iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(*v), hi.max(*v)))
    }

    /// Exposure and gamma map rgba texels to rgb8, balanced to the white point.
    pub fn tonemap(src: &[f32], white_point: [f64; 3]) -> Vec<u8> {
        let mut out = Vec::with_capacity(src.len() / 4 * 3);
        for texel in src.chunks_exact(4) {
            for c in 0..3 {
                let v = (1.0 - (-texel[c] / white_point[c] as f32 * PREVIEW_EXPOSURE).exp())
                    .powf(1.0 / 2.2);
                let v = if v.is_nan() { 0f32 } else { v.clamp(0.0, 1.0) };
                out.push((v * 255f32) as u8);
            }
        }
        out
    }

    fn save_layered(data: &[u8], width: u32, height: u32, prefix: &Path) -> Result<()> {
        let layer_size = (width * height) as usize * 3;
        for (layer_num, layer) in data.chunks_exact(layer_size).enumerate() {
            let name = format!("{}-layer{:02}.png", prefix.display(), layer_num);
            let img = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, layer)
                .ok_or_else(|| anyhow!("layer {} does not fill {}x{}", layer_num, width, height))?;
            img.save(&name)?;
        }
        Ok(())
    }
}
