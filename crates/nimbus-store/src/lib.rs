pub mod backend;
pub mod memory;
pub mod rest;
pub mod retry;
pub mod store;

pub use backend::StoreBackend;
pub use memory::MemoryStore;
pub use rest::RestStore;
pub use retry::RetryConfig;
pub use store::{join_path, normalize_path, SharedStore, StoreError};
