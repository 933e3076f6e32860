pub mod errors;
pub mod phase;
pub mod request;

pub use errors::*;
pub use phase::ExportPhase;
pub use request::*;
