// Library surface for headless/integration tests and reuse.
// Terminal setup and the event loop stay in main.rs.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod display;
pub mod duration;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod schedule;
pub mod sensor;
pub mod session;
pub mod ui;

pub use error::{Error, Result};
