pub mod commands;
pub mod logging;
pub mod repl;
pub mod service;
