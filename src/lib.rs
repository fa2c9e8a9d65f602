pub mod capabilities;
pub mod check;
pub mod cli;
pub mod colors;
pub mod config;
pub mod dependencies;
pub mod diff;
pub mod error;
pub mod fsutil;
pub mod initialize;
pub mod manifest;
pub mod manifest_updates;
pub mod preset;
pub mod range;
pub mod reporter;
pub mod set_version;
pub mod vigilant;
pub mod workspaces;
#[cfg(test)]
pub mod tests;
