//! Command implementations for ladok-cli

pub mod find;
pub mod follow;
pub mod links;
pub mod status;

pub use find::find;
pub use follow::follow;
pub use links::links;
pub use status::status;
