//! Lua menu scripting
//!
//! The menu's behaviour lives in a Lua script. The script sees a global
//! `engine` table and is called back through `engine.button_handler(fields)`
//! and `engine.event_handler(event)`. Everything it can change on the screen
//! goes through a [`MenuHost`].

pub mod api;
pub mod bridge;

pub use api::MenuHost;
pub use bridge::MainMenuScript;
