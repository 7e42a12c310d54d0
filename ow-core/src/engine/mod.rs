//! Logging engine
//!
//! Poll cadence, output rotation and the loop that drives them.

pub mod rotator;
pub mod schedule;
pub mod session;

pub use rotator::{OutputRotator, OutputSession, Rotation, RotationReason};
pub use schedule::PollSchedule;
pub use session::{CycleReport, SessionLoop};
