pub mod config;
pub mod format;
pub mod report;
pub mod session;
pub mod system;
