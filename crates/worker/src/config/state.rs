use serde::Deserialize;

/// Configuration for the dedup store backend.
#[derive(Debug, Deserialize)]
pub struct StateConfig {
    /// Which backend to use: `"memory"` or `"dynamodb"`.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// `DynamoDB` table name.
    pub table_name: Option<String>,

    /// AWS region for the `DynamoDB` backend. Defaults to `[aws] region`.
    pub region: Option<String>,

    /// Endpoint URL override (e.g. `DynamoDB` Local). Defaults to
    /// `[aws] endpoint_url`.
    pub endpoint_url: Option<String>,

    /// Partition-key prefix. Defaults to `"seedbomb"`.
    pub prefix: Option<String>,

    /// Create the table on startup when it does not exist.
    #[serde(default)]
    pub create_table: bool,

    /// Permit the in-memory backend outside dry runs. Its processed set is
    /// lost on restart and not shared between workers.
    #[serde(default)]
    pub allow_memory: bool,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            table_name: None,
            region: None,
            endpoint_url: None,
            prefix: None,
            create_table: false,
            allow_memory: false,
        }
    }
}

fn default_backend() -> String {
    "memory".to_owned()
}
