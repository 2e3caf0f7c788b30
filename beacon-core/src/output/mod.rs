//! Status pixel and ring output
//!
//! [`OutputArbiter`] is the only writer of either display. Timer contexts
//! communicate with it through [`PendingFlags`].

pub mod arbiter;
pub mod flags;
pub mod heartbeat;
pub mod ring;
pub mod ring_driver;

pub use arbiter::{Feedback, FeedbackClass, Mode, OutputArbiter};
pub use flags::{Pending, PendingFlags};
pub use heartbeat::{Beat, Heartbeat};
pub use ring::{Direction, PixelState, RingError, RingModel, MAX_RING_LEN};
pub use ring_driver::RingDriver;
