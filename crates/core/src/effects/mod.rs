//! Pure scroll-driven presentation functions.
//!
//! Each consumer reads the committed pair on its own and clamps as it needs;
//! none of them coordinate with each other.

pub mod glitch_background;
pub mod hero;
pub mod hero_text;
pub mod panel;
pub mod progress_bar;
