pub mod entities;
pub mod errors;
pub mod module;

pub use entities::*;
pub use errors::*;
pub use module::*;
