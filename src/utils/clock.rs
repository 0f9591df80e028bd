use std::ops::Deref;

use chrono::{DateTime, Utc};

/// Represents an entity responsible for providing dates across application. This can allow it to
/// be used for testing
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Utc>;
}

impl<T> Clock for T
where
    T: Deref + Sync + Send + 'static,
    T::Target: Clock,
{
    fn time(&self) -> DateTime<Utc> {
        self.deref().time()
    }
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
