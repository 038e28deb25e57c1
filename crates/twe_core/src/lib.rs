pub mod clock;
pub mod time;

pub use clock::{AnimationClock, AnimationPhase};
pub use time::TimeState;
