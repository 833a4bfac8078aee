use std::sync::Arc;

use accel_sig::TypeSignature;

use crate::declare::ExternalDeclaration;

/// A user-authored accelerator function, before specialization.
///
/// `body` is whatever source form the backend lowers; this crate never inspects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFunction {
    name: String,
    body: Arc<str>,
    callees: Vec<DeviceCallee>,
}

impl SourceFunction {
    pub fn new(name: impl Into<String>, body: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            callees: Vec::new(),
        }
    }

    /// Makes a device function or external declaration callable from this function's body.
    pub fn with_callee(mut self, callee: impl Into<DeviceCallee>) -> Self {
        self.callees.push(callee.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn callees(&self) -> &[DeviceCallee] {
        &self.callees
    }
}

/// A function that device code may call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCallee {
    /// A device function compiled here; the backend inlines it into the caller.
    Device {
        function: SourceFunction,
        signature: TypeSignature,
    },
    /// A symbol implemented and linked elsewhere.
    External(ExternalDeclaration),
}

impl DeviceCallee {
    pub fn name(&self) -> &str {
        match self {
            DeviceCallee::Device { function, .. } => function.name(),
            DeviceCallee::External(declaration) => declaration.name(),
        }
    }

    pub fn signature(&self) -> &TypeSignature {
        match self {
            DeviceCallee::Device { signature, .. } => signature,
            DeviceCallee::External(declaration) => declaration.signature(),
        }
    }
}

impl From<ExternalDeclaration> for DeviceCallee {
    fn from(declaration: ExternalDeclaration) -> Self {
        DeviceCallee::External(declaration)
    }
}
