use rand::distributions::Alphanumeric;
use rand::Rng;
use rimp_models::{LocalId, DRAFT_PREFIX};
use std::sync::atomic::{AtomicU64, Ordering};

const TOKEN_LEN: usize = 9;

/// Issues identifiers for entities that have not reached the store yet.
///
/// Ids combine the prefix, the current time in milliseconds, a random token
/// and a per-generator counter, so two ids from one generator never collide
/// even within the same millisecond.
#[derive(Debug, Default)]
pub struct IdGenerator {
    counter: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(&self, prefix: &str) -> String {
        let count = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(|c| (c as char).to_ascii_lowercase())
            .collect();

        format!(
            "{}-{}-{}-{}",
            prefix,
            chrono::Utc::now().timestamp_millis(),
            token,
            count
        )
    }

    /// Draft id for a new organization or member
    pub fn next_local_id(&self) -> LocalId {
        LocalId::new(self.generate(DRAFT_PREFIX)).expect("generated ids carry the draft prefix")
    }
}
