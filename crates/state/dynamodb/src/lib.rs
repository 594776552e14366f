mod config;
mod store;
mod table;

pub use config::DynamoConfig;
pub use store::{DynamoDedupStore, build_client};
pub use table::create_table;
