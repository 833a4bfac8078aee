//! Host-initiated dispatch of compiled artifacts.

use std::sync::Arc;

use crate::args::KernelArg;
use crate::artifact::{ArtifactRole, CompiledArtifact};
use crate::backend::Backend;
use crate::error::JitError;
use crate::geometry::{Dims, LaunchGeometry};

/// A kernel with its launch geometry fixed, waiting for arguments.
///
/// This is the first stage of the two-stage call `kernel.configure(grid, block)?.launch(&args)`.
pub struct KernelLaunch<'b, B: Backend> {
    backend: &'b B,
    artifact: Arc<CompiledArtifact<B::Artifact>>,
    geometry: LaunchGeometry,
}

impl<'b, B: Backend> KernelLaunch<'b, B> {
    /// Checks the artifact is launchable before touching the geometry, so a device function
    /// is refused without any other work.
    pub(crate) fn new(
        backend: &'b B,
        artifact: Arc<CompiledArtifact<B::Artifact>>,
        grid: Dims,
        block: Dims,
    ) -> Result<Self, JitError> {
        ensure_launchable(&artifact)?;
        let geometry = LaunchGeometry::normalize(grid, block)?;
        Ok(Self {
            backend,
            artifact,
            geometry,
        })
    }

    pub fn geometry(&self) -> &LaunchGeometry {
        &self.geometry
    }

    pub fn artifact(&self) -> &Arc<CompiledArtifact<B::Artifact>> {
        &self.artifact
    }

    pub fn launch(&self, args: &[KernelArg]) -> Result<(), JitError> {
        dispatch(self.backend, &self.artifact, &self.geometry, args)
    }
}

/// Launches any artifact from the host: role check, geometry normalization, then dispatch.
pub fn launch_artifact<B: Backend>(
    backend: &B,
    artifact: &Arc<CompiledArtifact<B::Artifact>>,
    grid: impl Into<Dims>,
    block: impl Into<Dims>,
    args: &[KernelArg],
) -> Result<(), JitError> {
    KernelLaunch::new(backend, Arc::clone(artifact), grid.into(), block.into())?.launch(args)
}

pub(crate) fn ensure_launchable<A>(artifact: &CompiledArtifact<A>) -> Result<(), JitError> {
    match artifact.role() {
        ArtifactRole::Kernel => Ok(()),
        ArtifactRole::DeviceFunction { .. } => Err(JitError::Invocation(format!(
            "device-only function cannot be launched: `{}` may only be called from kernel or device code",
            artifact.function()
        ))),
    }
}

pub(crate) fn dispatch<B: Backend>(
    backend: &B,
    artifact: &CompiledArtifact<B::Artifact>,
    geometry: &LaunchGeometry,
    args: &[KernelArg],
) -> Result<(), JitError> {
    ensure_launchable(artifact)?;
    let expected = artifact.signature().arity();
    if args.len() != expected {
        return Err(JitError::Invocation(format!(
            "`{}` takes {expected} arguments but {} were supplied",
            artifact.function(),
            args.len()
        )));
    }
    tracing::debug!(
        function = artifact.function(),
        signature = %artifact.signature(),
        %geometry,
        "launching kernel"
    );
    backend.launch(artifact.handle(), geometry, args)?;
    Ok(())
}
