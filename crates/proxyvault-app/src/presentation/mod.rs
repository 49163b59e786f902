pub mod bootstrap;
pub mod cli;
pub mod editor;
pub mod error;
pub mod prompt;
pub mod state;
