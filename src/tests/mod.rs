pub mod common;

mod initialize;
mod manifest_updates;
mod preset;
mod set_version;
mod workspaces;
