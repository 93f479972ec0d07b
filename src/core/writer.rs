//! Result accumulation for one command batch.
//!
//! The writer is append-only while a batch executes; `take_results`
//! drains everything accumulated so far and leaves it empty for the
//! next frame.

use crate::core::command::{Composition, DisplayId, Fence, LayerId};
use crate::core::errors::{EngineError, HwcError};

/// Initial capacity of the result buffer; a typical frame produces a
/// handful of payloads per display.
const INITIAL_RESULT_CAPACITY: usize = 64;

/// One entry in the result batch returned to the client
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResultPayload {
    /// A command failed; `command_index` is the position of its
    /// `DisplayCommand` in the submitted batch.
    Error { command_index: u32, code: i32 },

    /// Composition types the device wants changed, from validate.
    /// `layers` and `types` are parallel lists.
    ChangedCompositionTypes {
        display: DisplayId,
        layers: Vec<LayerId>,
        types: Vec<Composition>,
    },

    /// Display and per-layer request masks, from validate.
    /// `layers` and `layer_request_masks` are parallel lists.
    DisplayRequests {
        display: DisplayId,
        display_request_mask: u32,
        layers: Vec<LayerId>,
        layer_request_masks: Vec<u32>,
    },

    /// Fence signaling when the presented frame reaches the display
    PresentFence { display: DisplayId, fence: Fence },

    /// Per-layer fences signaling when the previous buffers are free
    ReleaseFences {
        display: DisplayId,
        fences: Vec<(LayerId, Fence)>,
    },

    /// Outcome of a present-or-validate trigger
    PresentOrValidateResult {
        display: DisplayId,
        result: PresentOrValidateResult,
    },
}

/// How a present-or-validate trigger resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOrValidateResult {
    /// Validation ran; the client must accept changes and re-present
    Validated,
    /// The frame was presented in this round trip
    Presented,
}

/// Accumulates result payloads while a batch executes
#[derive(Debug)]
pub struct ResultWriter {
    results: Vec<CommandResultPayload>,
}

impl ResultWriter {
    /// Create a writer with its result buffer pre-allocated.
    ///
    /// This is the only fallible step of engine construction; per-command
    /// failures are reported as payloads, never as errors from the writer.
    pub fn new() -> Result<Self, EngineError> {
        let mut results = Vec::new();
        results.try_reserve(INITIAL_RESULT_CAPACITY)?;
        Ok(Self { results })
    }

    pub fn set_error(&mut self, command_index: u32, err: HwcError) {
        self.results.push(CommandResultPayload::Error {
            command_index,
            code: err.code(),
        });
    }

    pub fn set_changed_composition_types(
        &mut self,
        display: DisplayId,
        layers: Vec<LayerId>,
        types: Vec<Composition>,
    ) {
        self.results.push(CommandResultPayload::ChangedCompositionTypes {
            display,
            layers,
            types,
        });
    }

    pub fn set_display_requests(
        &mut self,
        display: DisplayId,
        display_request_mask: u32,
        layers: Vec<LayerId>,
        layer_request_masks: Vec<u32>,
    ) {
        self.results.push(CommandResultPayload::DisplayRequests {
            display,
            display_request_mask,
            layers,
            layer_request_masks,
        });
    }

    pub fn set_present_fence(&mut self, display: DisplayId, fence: Fence) {
        self.results
            .push(CommandResultPayload::PresentFence { display, fence });
    }

    pub fn set_release_fences(&mut self, display: DisplayId, fences: Vec<(LayerId, Fence)>) {
        self.results
            .push(CommandResultPayload::ReleaseFences { display, fences });
    }

    pub fn set_present_or_validate_result(
        &mut self,
        display: DisplayId,
        result: PresentOrValidateResult,
    ) {
        self.results
            .push(CommandResultPayload::PresentOrValidateResult { display, result });
    }

    /// Take all accumulated payloads (clears the internal buffer)
    pub fn take_results(&mut self) -> Vec<CommandResultPayload> {
        std::mem::take(&mut self.results)
    }
}
