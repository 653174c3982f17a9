//! CLI library for testing purposes

pub mod extract;
pub mod path_glob;
pub mod pull;
pub mod push;
pub mod remote;
pub mod settings;
pub mod validation;
pub mod view;

pub use settings::{TOKEN_ENV, load_specification};
