mod store;

pub use store::MemoryDedupStore;
