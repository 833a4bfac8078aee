#![deny(clippy::unwrap_used)]

//! Specialization and caching of accelerator kernels and device functions.
//!
//! A [`SourceFunction`] becomes one of three things:
//! - a [`Kernel`], compiled eagerly for a signature given up front;
//! - a [`LazyKernel`], compiled once per argument-type signature seen at call time;
//! - a [`DeviceFunction`], callable only from other device code.
//!
//! Code generation and execution are delegated to a [`Backend`].

mod args;
mod artifact;
mod backend;
mod cache;
mod declare;
mod error;
mod geometry;
mod launch;
mod lazy;
mod options;
mod source;
mod specialize;

use std::sync::Arc;

pub use accel_sig::{
    ArrayType, DeviceType, Layout, MAX_NDIM, ReturnType, ScalarType, SignatureInput,
    SignatureParseError, TypeSignature, parse_signature,
};
pub use args::{ArrayArg, KernelArg, ScalarValue, infer_param_types};
pub use artifact::{ArtifactRole, CompiledArtifact};
pub use backend::{Backend, DeviceRequest, KernelRequest, LinkInput};
pub use cache::SpecializationTable;
pub use declare::{ExternalDeclaration, declare_device};
pub use error::{BackendError, JitError};
pub use geometry::{DimTuple, Dims, LaunchGeometry};
pub use launch::{KernelLaunch, launch_artifact};
pub use lazy::{LazyKernel, LazyLaunch};
pub use options::{JitOptions, JitToml, read_jit_toml};
pub use source::{DeviceCallee, SourceFunction};
pub use specialize::{
    DeviceConfig, DeviceFunction, Kernel, KernelConfig, Role, SpecializeDevice,
    SpecializeKernel, SpecializeRequest,
};

/// Result of [`jit`].
pub enum Specialized<B: Backend> {
    Kernel(Kernel<B>),
    Lazy(LazyKernel<B>),
    Device(DeviceFunction<B>),
}

impl<B: Backend> Specialized<B> {
    pub fn role(&self) -> Role {
        match self {
            Specialized::Kernel(_) | Specialized::Lazy(_) => Role::Kernel,
            Specialized::Device(_) => Role::DeviceFunction,
        }
    }

    pub fn into_kernel(self) -> Option<Kernel<B>> {
        match self {
            Specialized::Kernel(kernel) => Some(kernel),
            _ => None,
        }
    }

    pub fn into_lazy(self) -> Option<LazyKernel<B>> {
        match self {
            Specialized::Lazy(kernel) => Some(kernel),
            _ => None,
        }
    }

    pub fn into_device(self) -> Option<DeviceFunction<B>> {
        match self {
            Specialized::Device(device) => Some(device),
            _ => None,
        }
    }
}

/// Specializes `function` according to `options`.
///
/// A kernel with a signature is compiled now; a kernel without one is compiled per call-site
/// signature. Device functions always need a signature.
pub fn jit<B: Backend>(
    function: SourceFunction,
    options: JitOptions,
    backend: Arc<B>,
) -> Result<Specialized<B>, JitError> {
    let has_types = options.signature.is_some() || options.param_types.is_some();
    if options.role == Role::Kernel && !has_types {
        return Ok(Specialized::Lazy(autojit(
            function,
            KernelConfig::from(&options),
            backend,
        )));
    }
    match SpecializeRequest::from_options(&options)? {
        SpecializeRequest::Kernel(request) => request.run(function, backend).map(Specialized::Kernel),
        SpecializeRequest::Device(request) => request.run(function, backend).map(Specialized::Device),
    }
}

/// Builds a kernel that is specialized at each call site from its arguments' types.
pub fn autojit<B: Backend>(
    function: SourceFunction,
    config: KernelConfig,
    backend: Arc<B>,
) -> LazyKernel<B> {
    LazyKernel::new(function, config, backend)
}
