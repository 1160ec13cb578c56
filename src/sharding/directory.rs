//! Shard directory resolved from `getShardingStructure`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::rpc::{reply_result, Messenger, Method, Namespace, RpcError};
use crate::transaction::TxError;

/// Endpoints serving one shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardRoute {
    #[serde(rename = "shardID")]
    pub shard_id: u32,
    pub http: String,
    #[serde(default)]
    pub ws: String,
}

/// Routes of one network, ordered by shard id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardDirectory {
    routes: Vec<ShardRoute>,
}

impl ShardDirectory {
    /// Fetch the directory through `messenger`.
    pub async fn resolve(messenger: &dyn Messenger, namespace: Namespace) -> Result<Self, TxError> {
        let method = Method::GetShardingStructure.qualified(namespace);
        let reply = messenger.send_rpc(&method, vec![]).await.map_err(|e| match e {
            RpcError::Transport { .. } => TxError::DirectoryUnreachable {
                endpoint: messenger.endpoint().to_string(),
                source: e,
            },
            other => TxError::Rpc(other),
        })?;

        let routes: Vec<ShardRoute> = serde_json::from_value(reply_result(&reply, &method)?.clone())
            .map_err(|e| RpcError::malformed(&method, e.to_string()))?;
        let directory = Self::from_routes(routes).map_err(|reason| RpcError::malformed(&method, reason))?;

        tracing::debug!(
            endpoint = messenger.endpoint(),
            shards = directory.shard_count(),
            "Resolved shard directory"
        );
        Ok(directory)
    }

    /// Build from known routes; duplicate shard ids are rejected.
    pub fn from_routes(routes: Vec<ShardRoute>) -> Result<Self, String> {
        let mut by_id = BTreeMap::new();
        for route in routes {
            let id = route.shard_id;
            if by_id.insert(id, route).is_some() {
                return Err(format!("duplicate shard id {}", id));
            }
        }
        Ok(Self {
            routes: by_id.into_values().collect(),
        })
    }

    pub fn shard_count(&self) -> u32 {
        self.routes.len() as u32
    }

    pub fn routes(&self) -> &[ShardRoute] {
        &self.routes
    }

    pub fn route(&self, shard_id: u32) -> Option<&ShardRoute> {
        self.routes.iter().find(|route| route.shard_id == shard_id)
    }

    /// Check one shard flag value lies in `[0, shard_count)`.
    pub fn check_shard(&self, flag: &'static str, value: i64) -> Result<u32, TxError> {
        let invalid = || TxError::InvalidShard {
            flag,
            value,
            shard_count: self.shard_count(),
        };
        let shard = u32::try_from(value).map_err(|_| invalid())?;
        if shard >= self.shard_count() {
            return Err(invalid());
        }
        Ok(shard)
    }

    /// Validate a transfer's shard pair, origin first.
    pub fn validate(&self, from_shard: u32, to_shard: u32) -> Result<(), TxError> {
        self.check_shard("from-shard", i64::from(from_shard))?;
        self.check_shard("to-shard", i64::from(to_shard))?;
        Ok(())
    }

    /// HTTP endpoint of `shard_id`.
    pub fn endpoint_for(&self, shard_id: u32) -> Result<&str, TxError> {
        self.route(shard_id)
            .map(|route| route.http.as_str())
            .ok_or(TxError::InvalidShard {
                flag: "from-shard",
                value: i64::from(shard_id),
                shard_count: self.shard_count(),
            })
    }

    /// Endpoint that must receive a transfer from `from_shard` to `to_shard`.
    pub fn origin_endpoint(&self, from_shard: u32, to_shard: u32) -> Result<&str, TxError> {
        self.validate(from_shard, to_shard)?;
        self.endpoint_for(from_shard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn route(id: u32) -> ShardRoute {
        ShardRoute {
            shard_id: id,
            http: format!("http://s{}.local:9500", id),
            ws: format!("ws://s{}.local:9800", id),
        }
    }

    fn directory(count: u32) -> ShardDirectory {
        ShardDirectory::from_routes((0..count).rev().map(route).collect()).unwrap()
    }

    #[test]
    fn test_route_json_shape() {
        let parsed: ShardRoute =
            serde_json::from_value(json!({"shardID": 2, "http": "http://x:9500"})).unwrap();
        assert_eq!(parsed.shard_id, 2);
        assert_eq!(parsed.ws, "");
    }

    #[test]
    fn test_routes_ordered_by_id() {
        let dir = directory(4);
        let ids: Vec<u32> = dir.routes().iter().map(|r| r.shard_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        assert!(ShardDirectory::from_routes(vec![route(0), route(0)]).is_err());
    }

    #[test]
    fn test_validate_names_offending_flag() {
        let dir = directory(4);
        assert_eq!(
            dir.validate(4, 0).unwrap_err(),
            TxError::InvalidShard {
                flag: "from-shard",
                value: 4,
                shard_count: 4
            }
        );
        assert_eq!(
            dir.validate(0, 9).unwrap_err(),
            TxError::InvalidShard {
                flag: "to-shard",
                value: 9,
                shard_count: 4
            }
        );
        assert!(dir.check_shard("from-shard", -1).is_err());
    }

    #[test]
    fn test_origin_endpoint_is_source_shard() {
        let dir = directory(4);
        assert_eq!(dir.origin_endpoint(1, 3).unwrap(), "http://s1.local:9500");
    }
}
