pub mod memory;
pub mod sqlite;

use crate::app::Result;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Durable string-keyed store backing the expiring cache. Keys are
/// independent; no multi-key transactional guarantee is offered or needed,
/// since each feed source owns a disjoint key.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}
