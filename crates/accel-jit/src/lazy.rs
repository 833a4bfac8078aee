//! Call-site specialization: infer the signature from each call's arguments.

use std::sync::Arc;

use accel_sig::{DeviceType, TypeSignature};

use crate::args::{KernelArg, infer_param_types};
use crate::artifact::CompiledArtifact;
use crate::backend::Backend;
use crate::cache::SpecializationTable;
use crate::error::JitError;
use crate::geometry::{Dims, LaunchGeometry};
use crate::launch::dispatch;
use crate::source::SourceFunction;
use crate::specialize::{KernelConfig, compile_kernel};

/// A kernel without a declared signature.
///
/// Each distinct argument-type tuple is compiled on first use and cached for the life of
/// this value. Compilation errors surface at the call that triggered them.
pub struct LazyKernel<B: Backend> {
    function: SourceFunction,
    config: KernelConfig,
    table: SpecializationTable<B::Artifact>,
    backend: Arc<B>,
}

impl<B: Backend> LazyKernel<B> {
    pub fn new(function: SourceFunction, config: KernelConfig, backend: Arc<B>) -> Self {
        Self {
            function,
            config,
            table: SpecializationTable::new(),
            backend,
        }
    }

    pub fn name(&self) -> &str {
        self.function.name()
    }

    pub fn source(&self) -> &SourceFunction {
        &self.function
    }

    /// The artifact for these arguments' types, compiling it if this is their first call.
    pub fn specialize(&self, args: &[KernelArg]) -> Result<Arc<CompiledArtifact<B::Artifact>>, JitError> {
        self.specialize_types(infer_param_types(args)?)
    }

    /// Like [`LazyKernel::specialize`], from parameter types instead of argument values.
    pub fn specialize_types(
        &self,
        params: Vec<DeviceType>,
    ) -> Result<Arc<CompiledArtifact<B::Artifact>>, JitError> {
        let signature = TypeSignature::void(params);
        self.table
            .get_or_compile(&signature, || {
                compile_kernel(self.backend.as_ref(), &self.function, &signature, &self.config)
            })
            .inspect_err(|err| {
                tracing::warn!(
                    function = self.function.name(),
                    %signature,
                    error = %err,
                    "call-site specialization failed"
                );
            })
    }

    /// Fixes the launch geometry; the signature is only known once arguments arrive.
    pub fn configure(
        &self,
        grid: impl Into<Dims>,
        block: impl Into<Dims>,
    ) -> Result<LazyLaunch<'_, B>, JitError> {
        let geometry = LaunchGeometry::normalize(grid, block)?;
        Ok(LazyLaunch {
            kernel: self,
            geometry,
        })
    }

    /// Previously compiled artifact for `signature`, without compiling.
    pub fn get(&self, signature: &TypeSignature) -> Option<Arc<CompiledArtifact<B::Artifact>>> {
        self.table.get(signature)
    }

    pub fn signatures(&self) -> Vec<TypeSignature> {
        self.table.signatures()
    }

    /// Number of compiled specializations.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn assembly(&self, signature: &TypeSignature) -> Option<String> {
        let artifact = self.table.get(signature)?;
        self.backend.assembly(artifact.handle())
    }
}

/// A lazily specialized kernel with its launch geometry fixed.
pub struct LazyLaunch<'k, B: Backend> {
    kernel: &'k LazyKernel<B>,
    geometry: LaunchGeometry,
}

impl<B: Backend> LazyLaunch<'_, B> {
    pub fn geometry(&self) -> &LaunchGeometry {
        &self.geometry
    }

    pub fn launch(&self, args: &[KernelArg]) -> Result<(), JitError> {
        let artifact = self.kernel.specialize(args)?;
        dispatch(self.kernel.backend.as_ref(), &artifact, &self.geometry, args)
    }
}
