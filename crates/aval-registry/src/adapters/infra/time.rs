use crate::domain::entities::Timestamp;
use crate::ports::outbound::TimeSource;

/// Local wall-clock time, matching what office staff see on their screens.
#[derive(Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        chrono::Local::now().naive_local()
    }
}
