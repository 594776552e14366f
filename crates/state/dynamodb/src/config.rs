use serde::Deserialize;

/// Configuration for the `DynamoDB` dedup store backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DynamoConfig {
    /// `DynamoDB` table name.
    pub table_name: String,

    /// AWS region (e.g. `"us-east-1"`).
    pub region: String,

    /// Optional endpoint URL for local development (e.g. `DynamoDB` Local).
    pub endpoint_url: Option<String>,

    /// Key prefix applied to partition keys to avoid collisions.
    pub key_prefix: String,
}

impl Default for DynamoConfig {
    fn default() -> Self {
        Self {
            table_name: String::from("seedbomb_processed_messages"),
            region: String::from("us-east-1"),
            endpoint_url: None,
            key_prefix: String::from("seedbomb"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let cfg = DynamoConfig::default();
        assert_eq!(cfg.table_name, "seedbomb_processed_messages");
        assert_eq!(cfg.region, "us-east-1");
        assert!(cfg.endpoint_url.is_none());
        assert_eq!(cfg.key_prefix, "seedbomb");
    }

    #[test]
    fn partial_deserialize_keeps_defaults() {
        let cfg: DynamoConfig = serde_json::from_value(serde_json::json!({
            "table_name": "processed",
            "endpoint_url": "http://localhost:8000"
        }))
        .unwrap();
        assert_eq!(cfg.table_name, "processed");
        assert_eq!(cfg.endpoint_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(cfg.region, "us-east-1");
        assert_eq!(cfg.key_prefix, "seedbomb");
    }
}
