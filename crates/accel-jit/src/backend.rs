//! The code-generation and execution contract this crate drives.
//!
//! A backend lowers one source function for one signature, materializes the result on a
//! device, and launches it. Everything about machine code, memory and the accelerator itself
//! lives behind this trait.

use std::fmt;
use std::path::{Path, PathBuf};

use accel_sig::TypeSignature;
use serde::{Deserialize, Serialize};

use crate::args::KernelArg;
use crate::error::BackendError;
use crate::geometry::LaunchGeometry;
use crate::source::SourceFunction;

/// An external object the backend links into a kernel (precompiled device code, a library).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkInput(PathBuf);

impl LinkInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LinkInput(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for LinkInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Everything the backend needs to compile one kernel specialization.
#[derive(Debug, Clone, Copy)]
pub struct KernelRequest<'a> {
    pub function: &'a SourceFunction,
    pub signature: &'a TypeSignature,
    pub link: &'a [LinkInput],
    pub debug: bool,
}

/// Everything the backend needs to compile one device function.
#[derive(Debug, Clone, Copy)]
pub struct DeviceRequest<'a> {
    pub function: &'a SourceFunction,
    pub signature: &'a TypeSignature,
    pub inline: bool,
    pub debug: bool,
}

pub trait Backend: Send + Sync {
    /// Opaque compiled code for one signature.
    type Artifact: Send + Sync;

    fn compile_kernel(&self, request: &KernelRequest<'_>) -> Result<Self::Artifact, BackendError>;

    fn compile_device(&self, request: &DeviceRequest<'_>) -> Result<Self::Artifact, BackendError>;

    /// Materializes the artifact for the current device so the first launch does not pay for it.
    fn bind(&self, artifact: &Self::Artifact) -> Result<(), BackendError>;

    fn launch(
        &self,
        artifact: &Self::Artifact,
        geometry: &LaunchGeometry,
        args: &[KernelArg],
    ) -> Result<(), BackendError>;

    /// Generated assembly, when the backend keeps it around.
    fn assembly(&self, _artifact: &Self::Artifact) -> Option<String> {
        None
    }
}
