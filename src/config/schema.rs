//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::rpc::Namespace;
use crate::transaction::TxVariant;

/// Root configuration for the transfer client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Node the shard directory is fetched from.
    pub node: NodeConfig,

    /// Chain name (`mainnet`, `testnet`, ...) or a numeric chain id.
    pub chain: String,

    pub transfer: TransferConfig,

    pub signing: SigningConfig,

    pub observability: ObservabilityConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            node: NodeConfig::default(),
            chain: "mainnet".to_string(),
            transfer: TransferConfig::default(),
            signing: SigningConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// RPC node settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// JSON-RPC endpoint URL.
    pub url: String,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Namespace override; the transaction variant picks one when unset.
    pub namespace: Option<Namespace>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9500".to_string(),
            rpc_timeout_secs: 30,
            namespace: None,
        }
    }
}

/// Defaults applied to every transfer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Gas price in Gwei, as a decimal string.
    pub gas_price: String,

    /// Seconds to wait for a receipt after broadcast; zero disables polling.
    pub confirmation_timeout_secs: u64,

    /// Sign but never broadcast.
    pub dry_run: bool,

    pub variant: TxVariant,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            gas_price: "1".to_string(),
            confirmation_timeout_secs: 0,
            dry_run: false,
            variant: TxVariant::CrossShard,
        }
    }
}

/// Where signing keys come from.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Directory of encrypted keystore files.
    pub keystore_dir: Option<String>,

    /// Environment variable holding an unlocked hex private key.
    pub private_key_env: String,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            keystore_dir: None,
            private_key_env: "HMY_PRIVATE_KEY".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Log every raw RPC request and response body.
    pub debug_rpc: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_rpc: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config.chain, "mainnet");
        assert_eq!(config.node.url, "http://localhost:9500");
        assert_eq!(config.transfer.variant, TxVariant::CrossShard);
        assert_eq!(config.signing.private_key_env, "HMY_PRIVATE_KEY");
    }

    #[test]
    fn test_partial_sections() {
        let config: ClientConfig = toml::from_str(
            r#"
            chain = "testnet"

            [node]
            url = "https://api.s0.b.hmny.io"
            namespace = "hmyv2"

            [transfer]
            variant = "eth"
            confirmation_timeout_secs = 40
            "#,
        )
        .unwrap();
        assert_eq!(config.node.namespace, Some(Namespace::HmyV2));
        assert_eq!(config.node.rpc_timeout_secs, 30);
        assert_eq!(config.transfer.variant, TxVariant::Eth);
        assert_eq!(config.transfer.confirmation_timeout_secs, 40);
        assert_eq!(config.transfer.gas_price, "1");
    }
}
