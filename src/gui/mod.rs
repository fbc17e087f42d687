//! Screen-space form shown on top of the menu background
//!
//! The menu script owns the form's content. It sends a form description
//! (see [`formspec`]) and receives button presses back through a [`TextDest`].
//!
//! # Components
//!
//! - [`WidgetForm`] - draws the form and hit-tests input
//! - [`TextDest`] - queue of [`FormEvent`]s waiting for the script

pub mod form;
pub mod formspec;
pub mod text_dest;

pub use form::WidgetForm;
pub use text_dest::{FormEvent, TextDest};
