//! Domain models
//!
//! Typed rows per table, plus the explicit "with relations" shapes
//! returned by the registration gateway.

pub mod attendance;
pub mod event;
pub mod feedback;
pub mod points;
pub mod reference;
pub mod registration;
pub mod user;

pub use attendance::*;
pub use event::*;
pub use feedback::*;
pub use points::*;
pub use reference::*;
pub use registration::*;
pub use user::*;
