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
use anyhow::{anyhow, Result};
use atmosphere::{GpuAccelerator, GpuKernelModule, Precompute, PrecomputeOpts, TableHelpers};
use gpu::{Gpu, GpuConfig};
use log::info;
use std::{path::PathBuf, sync::Arc, time::Instant};
use structopt::StructOpt;

/// Precompute atmospheric scattering tables and write them to disk
#[derive(Debug, StructOpt)]
struct Opt {
    /// Directory to write the tables into
    #[structopt(short, long)]
    output: PathBuf,

    /// Compiled kernel module (.spv or .wgsl)
    #[structopt(short, long)]
    kernels: PathBuf,

    /// Also write a png preview of each layer of the full precision tables
    #[structopt(long)]
    png: bool,

    #[structopt(flatten)]
    precompute: PrecomputeOpts,
}

fn main() -> Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    let config = opt.precompute.config();

    let gpu = Arc::new(Gpu::new_headless(&GpuConfig::default())?);
    let module = GpuKernelModule::from_path(gpu.clone(), &opt.kernels)?;
    let accelerator = GpuAccelerator::new(gpu.clone());

    let precompute_start = Instant::now();
    let mut pcp = Precompute::new(accelerator, &module, config.clone())?;
    let output = pcp.run()?.clone();
    info!("Precompute time: {:?}", precompute_start.elapsed());

    let write_start = Instant::now();
    let tables = pcp
        .tables()
        .ok_or_else(|| anyhow!("precompute finished without publishing tables"))?;
    TableHelpers::write_tables(&gpu, &tables, &output, &config, &opt.output, opt.png)?;
    info!("Write time: {:?}", write_start.elapsed());

    Ok(())
}
