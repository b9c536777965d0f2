use std::fmt::Debug;

use chrono::prelude::*;

pub type Timestamp = DateTime<Local>;

/// Source of the current time, used to name output files.
pub trait Clock: Debug {
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Default)]
pub struct RealClock;

impl RealClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for RealClock {
    fn now(&self) -> Timestamp {
        Local::now()
    }
}

#[cfg(test)]
pub use fake::*;

#[cfg(test)]
mod fake {
    use super::{Clock, Timestamp};

    /// Clock that always reports the same time.
    #[derive(Clone, Debug)]
    pub struct FakeClock(Timestamp);

    impl FakeClock {
        pub fn new(now: Timestamp) -> Self {
            Self(now)
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> Timestamp {
            self.0
        }
    }
}
