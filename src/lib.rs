pub mod catalogue;
pub mod commands;
pub mod config;
pub mod portal;
pub mod shared;
pub mod tui;
pub mod wizard;
