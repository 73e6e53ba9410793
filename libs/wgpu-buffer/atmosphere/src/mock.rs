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
    parameters::PassUniforms,
    textures::{LutDescriptor, LutKind},
};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

#[derive(Debug)]
pub struct MockKernel(KernelEntryPoint);

impl MockKernel {
    pub fn entry_point(&self) -> KernelEntryPoint {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct MockModule {
    missing: Option<KernelEntryPoint>,
}

impl MockModule {
    pub fn complete() -> Self {
        Self { missing: None }
    }

    pub fn without(entry_point: KernelEntryPoint) -> Self {
        Self {
            missing: Some(entry_point),
        }
    }
}

impl KernelModule for MockModule {
    type Kernel = MockKernel;

    fn resolve(&self, entry_point: KernelEntryPoint) -> Result<MockKernel> {
        if self.missing == Some(entry_point) {
            return Err(AtmosphereError::KernelResolution {
                entry_point: entry_point.symbol(),
                reason: "not exported by mock module".to_owned(),
            });
        }
        Ok(MockKernel(entry_point))
    }
}

#[derive(Debug)]
pub struct MockTexture {
    pub id: usize,
    pub descriptor: LutDescriptor,
}

#[derive(Clone, Debug)]
pub struct DispatchRecord {
    pub entry_point: KernelEntryPoint,
    pub workgroups: [u32; 3],
    pub uniforms: PassUniforms,
    pub inputs: Vec<LutKind>,
    pub outputs: Vec<LutKind>,
}

#[derive(Debug, Default)]
pub struct Journal {
    pub created: Vec<LutDescriptor>,
    pub dispatches: Vec<DispatchRecord>,
}

/// Records what it is asked to do. Optionally fails the nth dispatch.
#[derive(Clone, Debug, Default)]
pub struct MockAccelerator {
    journal: Arc<Mutex<Journal>>,
    fail_dispatch: Option<usize>,
}

impl MockAccelerator {
    pub fn failing_dispatch(n: usize) -> Self {
        Self {
            journal: Default::default(),
            fail_dispatch: Some(n),
        }
    }

    pub fn journal(&self) -> MutexGuard<'_, Journal> {
        self.journal.lock()
    }
}

impl Accelerator for MockAccelerator {
    type Kernel = MockKernel;
    type Texture = MockTexture;

    fn create_texture(&mut self, descriptor: &LutDescriptor) -> Result<MockTexture> {
        let mut journal = self.journal.lock();
        journal.created.push(*descriptor);
        Ok(MockTexture {
            id: journal.created.len(),
            descriptor: *descriptor,
        })
    }

    fn dispatch(&mut self, kernel: &MockKernel, dispatch: &Dispatch<'_, MockTexture>) -> Result<()> {
        let mut journal = self.journal.lock();
        if self.fail_dispatch == Some(journal.dispatches.len()) {
            return Err(AtmosphereError::Precompute {
                pass: kernel.0.pass_name(),
                reason: "mock device lost".to_owned(),
            });
        }
        assert_eq!(kernel.0, dispatch.entry_point);
        for (kind, texture) in dispatch.inputs.iter().chain(dispatch.outputs.iter()) {
            assert_eq!(*kind, texture.descriptor.kind);
        }
        journal.dispatches.push(DispatchRecord {
            entry_point: dispatch.entry_point,
            workgroups: dispatch.workgroups,
            uniforms: *dispatch.uniforms,
            inputs: dispatch.inputs.iter().map(|(k, _)| *k).collect(),
            outputs: dispatch.outputs.iter().map(|(k, _)| *k).collect(),
        });
        Ok(())
    }
}
