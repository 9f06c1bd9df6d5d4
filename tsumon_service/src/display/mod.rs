//! The tsunami display layer and the user control that shows or hides it.
//!
//! - `buffer`: pending / active marker ownership and visibility.
//! - `toggle`: binds the visibility control once it exists.

pub mod buffer;
pub mod toggle;

pub use buffer::DisplayBuffer;
pub use toggle::{ControlSetup, ToggleBinding};
