use std::sync::OnceLock;

pub mod asset_fs;
pub mod bundle;
pub mod bundle_fs;
pub mod commands;
pub mod hasher;
pub mod identifier;
pub mod manifest;
pub mod packer;
pub mod path;

/// Application-level verbosity
pub static VERBOSE: OnceLock<bool> = OnceLock::new();

/// Whether per-file progress should be printed. Off unless the CLI turned it on.
pub fn verbose() -> bool {
    VERBOSE.get().copied().unwrap_or(false)
}
