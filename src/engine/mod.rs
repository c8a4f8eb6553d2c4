pub mod classify;
pub mod derive;
pub mod error;
pub mod guard;
pub mod pipeline;
