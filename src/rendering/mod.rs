//! # Rendering Module
//!
//! Text output for the terminal: state printouts, menus and messages.
//! Everything writes to a caller-supplied [`std::io::Write`], normally
//! stdout; logs go to stderr separately.

pub mod display;
pub mod ui;

pub use display::*;
pub use ui::*;
