//! Eager specialization: compile one known signature at definition time.

use std::sync::Arc;

use accel_sig::{ReturnType, TypeSignature, resolve_signature};
use serde::{Deserialize, Serialize};

use crate::artifact::{ArtifactRole, CompiledArtifact};
use crate::backend::{Backend, DeviceRequest, KernelRequest, LinkInput};
use crate::error::JitError;
use crate::geometry::Dims;
use crate::launch::KernelLaunch;
use crate::options::JitOptions;
use crate::source::{DeviceCallee, SourceFunction};

/// Which kind of artifact a specialization produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Kernel,
    #[serde(alias = "device")]
    DeviceFunction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelConfig {
    pub link_inputs: Vec<LinkInput>,
    pub eager_bind: bool,
    pub debug_info: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            link_inputs: Vec::new(),
            eager_bind: true,
            debug_info: false,
        }
    }
}

impl From<&JitOptions> for KernelConfig {
    fn from(options: &JitOptions) -> Self {
        Self {
            link_inputs: options.link_inputs.clone(),
            eager_bind: options.eager_bind,
            debug_info: options.debug_info,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceConfig {
    pub forced_inline: bool,
    pub debug_info: bool,
}

impl From<&JitOptions> for DeviceConfig {
    fn from(options: &JitOptions) -> Self {
        Self {
            forced_inline: options.forced_inline,
            debug_info: options.debug_info,
        }
    }
}

/// Request to compile a launchable kernel for one signature.
#[derive(Debug, Clone)]
pub struct SpecializeKernel {
    pub signature: TypeSignature,
    pub config: KernelConfig,
}

/// Request to compile a device function for one signature.
#[derive(Debug, Clone)]
pub struct SpecializeDevice {
    pub signature: TypeSignature,
    pub config: DeviceConfig,
}

/// An eager specialization request, chosen by [`Role`].
#[derive(Debug, Clone)]
pub enum SpecializeRequest {
    Kernel(SpecializeKernel),
    Device(SpecializeDevice),
}

impl SpecializeRequest {
    /// Resolves the options' signature and builds the request for their role.
    ///
    /// Fails with `Configuration` when no type information is available; eager specialization
    /// cannot guess parameter types.
    pub fn from_options(options: &JitOptions) -> Result<Self, JitError> {
        let signature = resolve_signature(options.signature.as_ref(), options.param_types.as_deref())?
            .ok_or_else(|| {
                JitError::Configuration(
                    "eager specialization needs parameter types; supply a signature".to_string(),
                )
            })?;
        Ok(match options.role {
            Role::Kernel => SpecializeRequest::Kernel(SpecializeKernel {
                signature,
                config: KernelConfig::from(options),
            }),
            Role::DeviceFunction => SpecializeRequest::Device(SpecializeDevice {
                signature,
                config: DeviceConfig::from(options),
            }),
        })
    }

    pub fn role(&self) -> Role {
        match self {
            SpecializeRequest::Kernel(_) => Role::Kernel,
            SpecializeRequest::Device(_) => Role::DeviceFunction,
        }
    }
}

impl SpecializeKernel {
    pub fn new(signature: TypeSignature, config: KernelConfig) -> Self {
        Self { signature, config }
    }

    pub fn run<B: Backend>(
        self,
        function: SourceFunction,
        backend: Arc<B>,
    ) -> Result<Kernel<B>, JitError> {
        let artifact = compile_kernel(backend.as_ref(), &function, &self.signature, &self.config)?;
        Ok(Kernel {
            function,
            artifact: Arc::new(artifact),
            backend,
        })
    }
}

impl SpecializeDevice {
    pub fn new(signature: TypeSignature, config: DeviceConfig) -> Self {
        Self { signature, config }
    }

    pub fn run<B: Backend>(
        self,
        function: SourceFunction,
        backend: Arc<B>,
    ) -> Result<DeviceFunction<B>, JitError> {
        // Device functions are always lowered inline into their caller; the user hint is kept
        // on the artifact only.
        let request = DeviceRequest {
            function: &function,
            signature: &self.signature,
            inline: true,
            debug: self.config.debug_info,
        };
        tracing::debug!(
            function = function.name(),
            signature = %self.signature,
            "compiling device function"
        );
        let handle = backend.compile_device(&request)?;
        let artifact = CompiledArtifact::new(
            function.name(),
            self.signature,
            ArtifactRole::DeviceFunction {
                forced_inline: self.config.forced_inline,
            },
            handle,
        );
        Ok(DeviceFunction {
            function,
            artifact: Arc::new(artifact),
            backend,
        })
    }
}

/// Validation, backend compilation and optional binding of one kernel signature.
///
/// Shared by the eager and lazy specializers.
pub(crate) fn compile_kernel<B: Backend>(
    backend: &B,
    function: &SourceFunction,
    signature: &TypeSignature,
    config: &KernelConfig,
) -> Result<CompiledArtifact<B::Artifact>, JitError> {
    if let Some(ReturnType::Value(ty)) = signature.return_type() {
        return Err(JitError::Signature(format!(
            "kernel `{}` declares return type {ty}; an independently launchable unit must not declare a return value",
            function.name()
        )));
    }

    let request = KernelRequest {
        function,
        signature,
        link: &config.link_inputs,
        debug: config.debug_info,
    };
    tracing::debug!(
        function = function.name(),
        %signature,
        links = config.link_inputs.len(),
        "compiling kernel"
    );
    let handle = backend.compile_kernel(&request)?;
    if config.eager_bind {
        backend.bind(&handle)?;
    }
    Ok(CompiledArtifact::new(
        function.name(),
        signature.clone(),
        ArtifactRole::Kernel,
        handle,
    ))
}

/// A kernel compiled for exactly one signature.
pub struct Kernel<B: Backend> {
    function: SourceFunction,
    artifact: Arc<CompiledArtifact<B::Artifact>>,
    backend: Arc<B>,
}

impl<B: Backend> Kernel<B> {
    pub fn name(&self) -> &str {
        self.function.name()
    }

    pub fn source(&self) -> &SourceFunction {
        &self.function
    }

    pub fn signature(&self) -> &TypeSignature {
        self.artifact.signature()
    }

    pub fn artifact(&self) -> &Arc<CompiledArtifact<B::Artifact>> {
        &self.artifact
    }

    /// Forces materialization on the current device.
    pub fn bind(&self) -> Result<(), JitError> {
        self.backend.bind(self.artifact.handle())?;
        Ok(())
    }

    pub fn assembly(&self) -> Option<String> {
        self.backend.assembly(self.artifact.handle())
    }

    /// Fixes the launch geometry; arguments follow in [`KernelLaunch::launch`].
    pub fn configure(
        &self,
        grid: impl Into<Dims>,
        block: impl Into<Dims>,
    ) -> Result<KernelLaunch<'_, B>, JitError> {
        KernelLaunch::new(
            self.backend.as_ref(),
            Arc::clone(&self.artifact),
            grid.into(),
            block.into(),
        )
    }
}

/// A device function: callable from kernel and device code, never launched from the host.
pub struct DeviceFunction<B: Backend> {
    function: SourceFunction,
    artifact: Arc<CompiledArtifact<B::Artifact>>,
    backend: Arc<B>,
}

impl<B: Backend> DeviceFunction<B> {
    pub fn name(&self) -> &str {
        self.function.name()
    }

    pub fn signature(&self) -> &TypeSignature {
        self.artifact.signature()
    }

    pub fn artifact(&self) -> &Arc<CompiledArtifact<B::Artifact>> {
        &self.artifact
    }

    pub fn forced_inline(&self) -> bool {
        matches!(
            self.artifact.role(),
            ArtifactRole::DeviceFunction {
                forced_inline: true
            }
        )
    }

    /// A reference other source functions can list as a callee.
    pub fn callee(&self) -> DeviceCallee {
        DeviceCallee::Device {
            function: self.function.clone(),
            signature: self.signature().clone(),
        }
    }

    /// Host-side launch entry. Always fails with `Invocation` before geometry is looked at.
    pub fn configure(
        &self,
        grid: impl Into<Dims>,
        block: impl Into<Dims>,
    ) -> Result<KernelLaunch<'_, B>, JitError> {
        KernelLaunch::new(
            self.backend.as_ref(),
            Arc::clone(&self.artifact),
            grid.into(),
            block.into(),
        )
    }
}
