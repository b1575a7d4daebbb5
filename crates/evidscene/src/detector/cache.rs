//! Process-wide lazily-loaded model handles.
//!
//! Model weights are loaded at most once per process and shared read-only
//! afterwards. First use is serialized by the slot's mutex, so concurrent
//! requests racing on a cold slot run the loader exactly once.

use std::sync::{Arc, Mutex, PoisonError};

/// Single-initialization slot for a heavy backend.
///
/// ```
/// use evidscene::ModelSlot;
///
/// static WEIGHTS: ModelSlot<Vec<f32>> = ModelSlot::new();
///
/// let w = WEIGHTS.get_or_load(|| Ok::<_, String>(vec![0.5; 4].into())).unwrap();
/// assert_eq!(w.len(), 4);
/// ```
pub struct ModelSlot<T: ?Sized> {
    inner: Mutex<Option<Arc<T>>>,
}

impl<T: ?Sized> ModelSlot<T> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// Return the loaded handle, running `loader` if the slot is empty.
    ///
    /// A failed load leaves the slot empty.
    pub fn get_or_load<E, F>(&self, loader: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<Arc<T>, E>,
    {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = guard.as_ref() {
            return Ok(Arc::clone(handle));
        }
        let handle = loader()?;
        *guard = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Handle if already loaded.
    pub fn get(&self) -> Option<Arc<T>> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Arc::clone)
    }

    pub fn is_loaded(&self) -> bool {
        self.get().is_some()
    }
}

impl<T: ?Sized> Default for ModelSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn loader_runs_once() {
        let slot: ModelSlot<String> = ModelSlot::new();
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let v = slot
                .get_or_load(|| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(Arc::new("weights".to_string()))
                })
                .unwrap();
            assert_eq!(v.as_str(), "weights");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_load_leaves_slot_empty() {
        let slot: ModelSlot<u32> = ModelSlot::new();
        let err = slot.get_or_load(|| Err::<Arc<u32>, _>("missing")).unwrap_err();
        assert_eq!(err, "missing");
        assert!(!slot.is_loaded());
        let v = slot.get_or_load(|| Ok::<_, &str>(Arc::new(7))).unwrap();
        assert_eq!(*v, 7);
    }

    #[test]
    fn concurrent_first_use_loads_once() {
        static SLOT: ModelSlot<u64> = ModelSlot::new();
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    SLOT.get_or_load(|| {
                        CALLS.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, ()>(Arc::new(42))
                    })
                    .unwrap()
                })
            })
            .collect();
        for h in handles {
            assert_eq!(*h.join().unwrap(), 42);
        }
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }
}
