//! Common imports for engine embedders.

pub use crate::core::command::{
    BufferDescriptor, ClientTarget, ClockMonotonicTimestamp, Color, ColorTransform, Composition,
    Dataspace, DisplayCommand, DisplayId, FRect, Fence, LayerCommand, LayerId, NativeHandle,
    Point, RawBufferHandle, Rect, Transform,
};
pub use crate::core::engine::CommandEngine;
pub use crate::core::errors::{EngineError, HalResult, HwcError};
pub use crate::core::writer::{CommandResultPayload, PresentOrValidateResult};
pub use crate::hal::{ComposerHal, Presentation, StubHal, Validation};
pub use crate::resources::{ComposerResources, ScopedBuffer};
