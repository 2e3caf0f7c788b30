//! Embassy async tasks
//!
//! Each task runs independently and communicates through the statics in
//! [`crate::channels`].

pub mod i2c_target;
pub mod pixels;
pub mod tick;
pub mod timers;

pub use i2c_target::i2c_target_task;
pub use pixels::{ring_task, status_task};
pub use tick::tick_task;
pub use timers::{rotate_timer_task, theme_timer_task};
