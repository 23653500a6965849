use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Generates ids for new records.
pub trait UidService: Send + Sync {
    fn generate(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidService;

impl UidService for UuidService {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

pub type TimestampGenerator = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn utc_now_generator() -> TimestampGenerator {
    Arc::new(Utc::now)
}

/// Hands out "id-1", "id-2", ... in order.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct SequenceUidService {
    next: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl UidService for SequenceUidService {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
        format!("id-{}", n)
    }
}

#[cfg(test)]
pub fn fixed_timestamp_generator(ts: DateTime<Utc>) -> TimestampGenerator {
    Arc::new(move || ts)
}
