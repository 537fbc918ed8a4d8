pub mod countdown;

pub use countdown::{CountdownTimer, RemainingTime};
