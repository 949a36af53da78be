//! Controller inputs and the cadence at which the console accepts them.

pub use self::{frame_input::*, timeline::*};

mod frame_input;
mod timeline;
