pub mod api;

pub use api::{ComposerHal, Presentation, StubHal, Validation};
