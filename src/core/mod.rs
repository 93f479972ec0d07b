pub mod command;
pub mod engine;
pub mod errors;
pub mod writer;


// Re-export key types
pub use command::{DisplayCommand, LayerCommand};
pub use engine::CommandEngine;
pub use errors::{EngineError, HalResult, HwcError};
pub use writer::{CommandResultPayload, PresentOrValidateResult, ResultWriter};
