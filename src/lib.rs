// hwcompose
//
// Command-batch execution engine for a hardware display composer service.
// A display-server client submits one ordered batch of per-display and
// per-layer commands per frame; the engine applies them to the composition
// device and returns per-command errors, fences, and validation outcomes.
//
// The concrete device driver (Hal), the buffer cache (Resources), and the
// transport delivering batches live outside this crate; the engine talks to
// the first two through the `ComposerHal` and `ComposerResources` traits.

pub mod core;
pub mod hal;
pub mod prelude;
pub mod resources;

// Re-export the engine surface at the crate root
pub use crate::core::command::{BufferDescriptor, DisplayCommand, LayerCommand};
pub use crate::core::engine::CommandEngine;
pub use crate::core::errors::{HalResult, HwcError};
pub use crate::core::writer::CommandResultPayload;
pub use crate::hal::ComposerHal;
pub use crate::resources::{ComposerResources, ScopedBuffer};
