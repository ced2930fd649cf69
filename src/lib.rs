//! Browse, preview, install and apply Plymouth boot-splash themes.

pub mod animation;
pub mod catalog;
pub mod dispatcher;
pub mod frames;
pub mod session;
pub mod settings;
pub mod tasks;
pub mod theme_list;
