//! Terminal UI module using ratatui.
//!
//! - `render`: Main frame rendering, layout and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling
//! - `screens`: Admin and user book screens

pub mod input;
pub mod render;
pub mod screens;
pub mod styles;
