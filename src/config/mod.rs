//! Configuration module for pwmgr
//!
//! This module provides configuration management including:
//! - base directory resolution
//! - user settings persistence

pub mod paths;
pub mod settings;

pub use paths::PwmgrPaths;
pub use settings::Settings;
