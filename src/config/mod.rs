//! Configuration module for keyseal
//!
//! This module provides configuration management including:
//! - Platform config directory resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::KeysealPaths;
pub use settings::Settings;
