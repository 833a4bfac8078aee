use accel_sig::TypeSignature;

/// What a compiled artifact may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactRole {
    /// Launchable from the host with a launch geometry; never returns a value.
    Kernel,
    /// Callable only from kernel or device code; inlined into its caller.
    DeviceFunction { forced_inline: bool },
}

/// One backend artifact for one signature of one source function.
///
/// Specializers hand these out behind `Arc`; two calls received the same specialization
/// exactly when their handles are `Arc::ptr_eq`.
#[derive(Debug)]
pub struct CompiledArtifact<A> {
    function: String,
    signature: TypeSignature,
    role: ArtifactRole,
    handle: A,
}

impl<A> CompiledArtifact<A> {
    pub(crate) fn new(
        function: impl Into<String>,
        signature: TypeSignature,
        role: ArtifactRole,
        handle: A,
    ) -> Self {
        Self {
            function: function.into(),
            signature,
            role,
            handle,
        }
    }

    /// Name of the source function this artifact was compiled from.
    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn signature(&self) -> &TypeSignature {
        &self.signature
    }

    pub fn role(&self) -> ArtifactRole {
        self.role
    }

    /// The backend's opaque handle.
    pub fn handle(&self) -> &A {
        &self.handle
    }

    pub fn is_kernel(&self) -> bool {
        self.role == ArtifactRole::Kernel
    }
}
