//! Buffer cache and must-validate boundary.
//!
//! The resources subsystem is owned by the service hosting the engine. It
//! keeps the slot-indexed buffer cache (one cache per display client
//! target, per virtual display output buffer, and per layer buffer), and
//! the per-display must-validate flag the present-or-validate fast path
//! consults. Implementations synchronize their own state; the engine only
//! ever holds a shared reference.

use std::fmt;

use crate::core::command::{DisplayId, LayerId, NativeHandle, RawBufferHandle};
use crate::core::errors::HalResult;

/// Release hook invoked when a `ScopedBuffer` goes out of scope
pub type ReleaseFn = Box<dyn FnOnce(NativeHandle)>;

/// A resolved native handle whose release is bound to scope exit.
///
/// Every buffer setter holds the guard across its device call, so the
/// handle is released on each exit path: success, device failure, or an
/// early return. Guards never outlive the setter that resolved them.
pub struct ScopedBuffer {
    handle: NativeHandle,
    release: Option<ReleaseFn>,
}

impl ScopedBuffer {
    pub fn new(handle: NativeHandle, release: ReleaseFn) -> Self {
        Self {
            handle,
            release: Some(release),
        }
    }

    /// A guard with no release hook; the cache retains ownership
    pub fn unmanaged(handle: NativeHandle) -> Self {
        Self {
            handle,
            release: None,
        }
    }

    pub fn handle(&self) -> NativeHandle {
        self.handle
    }
}

impl Drop for ScopedBuffer {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release(self.handle);
        }
    }
}

impl fmt::Debug for ScopedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedBuffer")
            .field("handle", &self.handle)
            .field("managed", &self.release.is_some())
            .finish()
    }
}

/// Slot-indexed buffer resolution and must-validate tracking.
///
/// The `use_cache` flag mirrors the wire contract: set when the command
/// carried no raw handle, in which case `handle` is `None` and the slot
/// must already be populated from an earlier frame. When a raw handle is
/// present it is imported and stored into the slot, replacing any
/// previous entry (eviction policy belongs to the implementation).
pub trait ComposerResources {
    fn get_layer_buffer(
        &self,
        display: DisplayId,
        layer: LayerId,
        slot: u32,
        use_cache: bool,
        handle: Option<&RawBufferHandle>,
    ) -> HalResult<ScopedBuffer>;

    fn get_display_client_target(
        &self,
        display: DisplayId,
        slot: u32,
        use_cache: bool,
        handle: Option<&RawBufferHandle>,
    ) -> HalResult<ScopedBuffer>;

    fn get_display_output_buffer(
        &self,
        display: DisplayId,
        slot: u32,
        use_cache: bool,
        handle: Option<&RawBufferHandle>,
    ) -> HalResult<ScopedBuffer>;

    /// Sideband streams bypass the slot cache: resolution always imports
    /// the supplied handle and the releaser runs cache-disabled.
    fn get_layer_sideband_stream(
        &self,
        display: DisplayId,
        layer: LayerId,
        handle: &RawBufferHandle,
    ) -> HalResult<ScopedBuffer>;

    /// Whether a property change has invalidated the last validation
    fn must_validate_display(&self, display: DisplayId) -> bool;

    /// Clear (or set) the must-validate flag for a display
    fn set_display_must_validate_state(&self, display: DisplayId, must_validate: bool);
}
