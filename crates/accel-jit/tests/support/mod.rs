#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use accel_jit::{
    Backend, BackendError, DeviceRequest, KernelArg, KernelRequest, LaunchGeometry, LinkInput,
};
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockArtifact {
    pub id: u64,
    pub function: String,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    CompileKernel {
        function: String,
        signature: String,
        link: Vec<LinkInput>,
        debug: bool,
        callees: Vec<String>,
    },
    CompileDevice {
        function: String,
        signature: String,
        inline: bool,
        debug: bool,
    },
    Bind(u64),
    Launch {
        artifact: u64,
        grid: Vec<u32>,
        block: Vec<u32>,
        args: usize,
    },
}

/// Backend double that records every call and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    events: Mutex<Vec<Event>>,
    next_id: AtomicU64,
    failing_compiles: AtomicUsize,
    failing_binds: AtomicUsize,
    compile_delay: Mutex<Option<Duration>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `count` compilations fail.
    pub fn fail_next_compiles(&self, count: usize) {
        self.failing_compiles.store(count, Ordering::SeqCst);
    }

    pub fn fail_next_binds(&self, count: usize) {
        self.failing_binds.store(count, Ordering::SeqCst);
    }

    pub fn set_compile_delay(&self, delay: Duration) {
        *self.compile_delay.lock() = Some(delay);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn kernel_compiles(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, Event::CompileKernel { .. }))
            .count()
    }

    pub fn device_compiles(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, Event::CompileDevice { .. }))
            .count()
    }

    pub fn launches(&self) -> Vec<Event> {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, Event::Launch { .. }))
            .cloned()
            .collect()
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn artifact(&self, function: &str, signature: String) -> MockArtifact {
        MockArtifact {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            function: function.to_string(),
            signature,
        }
    }
}

impl Backend for RecordingBackend {
    type Artifact = MockArtifact;

    fn compile_kernel(&self, request: &KernelRequest<'_>) -> Result<MockArtifact, BackendError> {
        let delay = *self.compile_delay.lock();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        let signature = request.signature.to_string();
        self.events.lock().push(Event::CompileKernel {
            function: request.function.name().to_string(),
            signature: signature.clone(),
            link: request.link.to_vec(),
            debug: request.debug,
            callees: request
                .function
                .callees()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
        });
        if Self::take_failure(&self.failing_compiles) {
            return Err(BackendError::new(format!("lowering failed for {signature}")));
        }
        Ok(self.artifact(request.function.name(), signature))
    }

    fn compile_device(&self, request: &DeviceRequest<'_>) -> Result<MockArtifact, BackendError> {
        let signature = request.signature.to_string();
        self.events.lock().push(Event::CompileDevice {
            function: request.function.name().to_string(),
            signature: signature.clone(),
            inline: request.inline,
            debug: request.debug,
        });
        if Self::take_failure(&self.failing_compiles) {
            return Err(BackendError::new(format!("lowering failed for {signature}")));
        }
        Ok(self.artifact(request.function.name(), signature))
    }

    fn bind(&self, artifact: &MockArtifact) -> Result<(), BackendError> {
        self.events.lock().push(Event::Bind(artifact.id));
        if Self::take_failure(&self.failing_binds) {
            return Err(BackendError::new("module load failed"));
        }
        Ok(())
    }

    fn launch(
        &self,
        artifact: &MockArtifact,
        geometry: &LaunchGeometry,
        args: &[KernelArg],
    ) -> Result<(), BackendError> {
        self.events.lock().push(Event::Launch {
            artifact: artifact.id,
            grid: geometry.grid().as_slice().to_vec(),
            block: geometry.block().as_slice().to_vec(),
            args: args.len(),
        });
        Ok(())
    }

    fn assembly(&self, artifact: &MockArtifact) -> Option<String> {
        Some(format!(
            "// {} {}\n.entry {}",
            artifact.function, artifact.signature, artifact.function
        ))
    }
}
