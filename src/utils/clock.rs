use chrono::{DateTime, Local, Utc};

/// Represents an entity responsible for providing dates across application. Lets tests pin "now"
/// to a known instant.
pub trait Clock: Sync + Send {
    fn time(&self) -> DateTime<Utc>;

    fn local_time(&self) -> DateTime<Local> {
        self.time().with_timezone(&Local)
    }
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn time(&self) -> DateTime<Utc> {
        self.0
    }
}
