//! Cancellation signal broker.
//!
//! Routes the designated back key to whichever prompt is currently pending.
//! There is exactly one slot, not a registry: the engine never has more than
//! one prompt waiting for input, so a second registration while the slot is
//! held is an error rather than something to queue.
//!
//! The binary uses [`SignalBroker::global()`]. Tests construct their own
//! broker with [`SignalBroker::new()`] and hand it to the adapter.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::{debug, trace};

use super::{FlowError, FlowResult};

/// A key press observed by a prompt backend but not consumed by its widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// The escape key; the default back key.
    Escape,
    /// Any other character key.
    Char(char),
}

/// Token for one pending prompt.
///
/// Clones share the same signal flag, so the broker can signal a handle that
/// the adapter still holds.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    label: Arc<str>,
    signalled: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Create an unsignalled handle for the prompt with the given label.
    pub fn new(label: impl Into<Arc<str>>) -> Self {
        Self {
            label: label.into(),
            signalled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Label of the prompt this handle belongs to (diagnostics only).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the broker has signalled this handle.
    pub fn is_signalled(&self) -> bool {
        self.signalled.load(Ordering::Acquire)
    }

    fn signal(&self) {
        self.signalled.store(true, Ordering::Release);
    }

    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.signalled, &other.signalled)
    }
}

/// Process-wide router from the back key to the pending prompt.
#[derive(Debug)]
pub struct SignalBroker {
    key: OnceLock<Key>,
    slot: Mutex<Option<CancelHandle>>,
}

static GLOBAL: SignalBroker = SignalBroker::new();

impl SignalBroker {
    /// Create a detached broker with an empty slot.
    pub const fn new() -> Self {
        Self {
            key: OnceLock::new(),
            slot: Mutex::new(None),
        }
    }

    /// The broker shared by every flow in this process.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Start listening for `key`.
    ///
    /// Only the first call has an effect; it returns `true`. Later calls keep
    /// the original key and return `false`.
    pub fn attach(&self, key: Key) -> bool {
        let mut attached = false;
        self.key.get_or_init(|| {
            attached = true;
            key
        });
        if attached {
            debug!(?key, "back key listener attached");
        }
        attached
    }

    /// The designated back key, if the broker has been attached.
    pub fn designated_key(&self) -> Option<Key> {
        self.key.get().copied()
    }

    /// Claim the slot for a pending prompt.
    ///
    /// The slot is released when the returned guard drops.
    pub fn register(&self, handle: CancelHandle) -> FlowResult<SlotGuard<'_>> {
        let mut slot = self.lock();
        if let Some(held) = slot.as_ref() {
            return Err(FlowError::SlotOccupied {
                held: held.label().to_string(),
            });
        }
        trace!(prompt = handle.label(), "cancellation slot claimed");
        *slot = Some(handle.clone());
        Ok(SlotGuard {
            broker: self,
            handle,
        })
    }

    /// Deliver a key press.
    ///
    /// Signals the pending prompt and returns `true` when `key` is the
    /// designated key and the slot is occupied. Anything else is ignored.
    pub fn dispatch(&self, key: Key) -> bool {
        if self.designated_key() != Some(key) {
            trace!(?key, "key is not the back key");
            return false;
        }
        match self.lock().as_ref() {
            Some(handle) => {
                debug!(prompt = handle.label(), "back key signalled pending prompt");
                handle.signal();
                true
            }
            None => {
                trace!("back key pressed with no pending prompt");
                false
            }
        }
    }

    /// Whether a prompt currently holds the slot.
    pub fn is_occupied(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<CancelHandle>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SignalBroker {
    fn default() -> Self {
        Self::new()
    }
}

/// Releases the broker slot on drop.
#[derive(Debug)]
pub struct SlotGuard<'a> {
    broker: &'a SignalBroker,
    handle: CancelHandle,
}

impl SlotGuard<'_> {
    /// The handle occupying the slot.
    pub const fn handle(&self) -> &CancelHandle {
        &self.handle
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        let mut slot = self.broker.lock();
        if slot.as_ref().is_some_and(|held| held.same(&self.handle)) {
            *slot = None;
            trace!(prompt = self.handle.label(), "cancellation slot released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_is_idempotent() {
        let broker = SignalBroker::new();
        assert!(broker.attach(Key::Escape));
        assert!(!broker.attach(Key::Char('q')));
        assert_eq!(broker.designated_key(), Some(Key::Escape));
    }

    #[test]
    fn dispatch_with_empty_slot_has_no_effect() {
        let broker = SignalBroker::new();
        broker.attach(Key::Escape);
        assert!(!broker.dispatch(Key::Escape));
    }

    #[test]
    fn dispatch_before_attach_has_no_effect() {
        let broker = SignalBroker::new();
        let guard = broker.register(CancelHandle::new("type")).unwrap();
        assert!(!broker.dispatch(Key::Escape));
        assert!(!guard.handle().is_signalled());
    }

    #[test]
    fn dispatch_signals_registered_handle() {
        let broker = SignalBroker::new();
        broker.attach(Key::Escape);
        let handle = CancelHandle::new("scope");
        let _guard = broker.register(handle.clone()).unwrap();

        assert!(broker.dispatch(Key::Escape));
        assert!(handle.is_signalled());
    }

    #[test]
    fn other_keys_are_ignored() {
        let broker = SignalBroker::new();
        broker.attach(Key::Escape);
        let handle = CancelHandle::new("scope");
        let _guard = broker.register(handle.clone()).unwrap();

        assert!(!broker.dispatch(Key::Char('x')));
        assert!(!handle.is_signalled());
    }

    #[test]
    fn second_registration_is_rejected() {
        let broker = SignalBroker::new();
        let _guard = broker.register(CancelHandle::new("first")).unwrap();

        let err = broker.register(CancelHandle::new("second")).unwrap_err();
        assert!(matches!(err, FlowError::SlotOccupied { ref held } if held == "first"));
    }

    #[test]
    fn dropping_guard_clears_slot() {
        let broker = SignalBroker::new();
        {
            let _guard = broker.register(CancelHandle::new("message")).unwrap();
            assert!(broker.is_occupied());
        }
        assert!(!broker.is_occupied());
        assert!(broker.register(CancelHandle::new("next")).is_ok());
    }

    #[test]
    fn global_is_a_single_instance() {
        assert!(std::ptr::eq(SignalBroker::global(), SignalBroker::global()));
    }
}
