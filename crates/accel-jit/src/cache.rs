//! Per-function specialization table: one compiled artifact per distinct signature.
//!
//! Compilation for a signature is serialized: the first caller claims the slot and compiles
//! outside the lock, later callers for the same signature block on `settled` until the claim
//! resolves. A failed compilation vacates its slot so the next caller retries; nothing is
//! negatively cached. Different signatures never wait on each other's compilation.

use std::sync::Arc;

use accel_sig::TypeSignature;
use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;

use crate::artifact::CompiledArtifact;

enum Slot<A> {
    Compiling,
    Ready(Arc<CompiledArtifact<A>>),
}

pub struct SpecializationTable<A> {
    slots: Mutex<FxHashMap<TypeSignature, Slot<A>>>,
    settled: Condvar,
}

impl<A> Default for SpecializationTable<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> SpecializationTable<A> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(FxHashMap::default()),
            settled: Condvar::new(),
        }
    }

    /// The finished artifact for `signature`, if one exists.
    pub fn get(&self, signature: &TypeSignature) -> Option<Arc<CompiledArtifact<A>>> {
        match self.slots.lock().get(signature) {
            Some(Slot::Ready(artifact)) => Some(Arc::clone(artifact)),
            _ => None,
        }
    }

    pub fn contains(&self, signature: &TypeSignature) -> bool {
        self.get(signature).is_some()
    }

    /// Number of compiled signatures. In-flight compilations are not counted.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compiled signatures, in no particular order.
    pub fn signatures(&self) -> Vec<TypeSignature> {
        self.slots
            .lock()
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Ready(_)))
            .map(|(signature, _)| signature.clone())
            .collect()
    }

    /// Returns the artifact for `signature`, running `compile` if no artifact exists yet.
    ///
    /// `compile` runs without the table lock held and at most once per call. If another
    /// caller is already compiling the same signature this blocks until it finishes, then
    /// reuses its artifact or, if it failed, compiles again.
    pub fn get_or_compile<E>(
        &self,
        signature: &TypeSignature,
        compile: impl FnOnce() -> Result<CompiledArtifact<A>, E>,
    ) -> Result<Arc<CompiledArtifact<A>>, E> {
        let mut slots = self.slots.lock();
        loop {
            match slots.get(signature) {
                Some(Slot::Ready(artifact)) => {
                    tracing::trace!(%signature, "specialization cache hit");
                    return Ok(Arc::clone(artifact));
                }
                Some(Slot::Compiling) => {
                    self.settled.wait(&mut slots);
                    if !slots.contains_key(signature) {
                        tracing::debug!(%signature, "in-flight compilation failed, retrying");
                    }
                }
                None => {
                    slots.insert(signature.clone(), Slot::Compiling);
                    break;
                }
            }
        }
        drop(slots);

        let claim = Claim {
            table: self,
            signature,
            fulfilled: false,
        };
        let artifact = Arc::new(compile()?);
        claim.fulfil(Arc::clone(&artifact));
        Ok(artifact)
    }
}

/// An in-flight compilation. Dropping it unfulfilled (error or unwind) vacates the slot.
struct Claim<'t, A> {
    table: &'t SpecializationTable<A>,
    signature: &'t TypeSignature,
    fulfilled: bool,
}

impl<A> Claim<'_, A> {
    fn fulfil(mut self, artifact: Arc<CompiledArtifact<A>>) {
        self.table
            .slots
            .lock()
            .insert(self.signature.clone(), Slot::Ready(artifact));
        self.fulfilled = true;
        self.table.settled.notify_all();
    }
}

impl<A> Drop for Claim<'_, A> {
    fn drop(&mut self) {
        if !self.fulfilled {
            self.table.slots.lock().remove(self.signature);
            self.table.settled.notify_all();
        }
    }
}
