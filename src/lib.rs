pub mod compare;
pub mod config;
pub mod history;
pub mod model;
pub mod policy;
pub mod report;

/// Snapshot file extension the CLI looks for when scanning directories
pub const SNAPSHOT_EXTENSION: &str = "json";

/// Application name for XDG paths
pub const APP_NAME: &str = "mixwatch";
