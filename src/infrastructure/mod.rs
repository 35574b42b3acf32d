//! Infrastructure layer - Storage backends, services and logging

pub mod access_key;
pub mod logging;
