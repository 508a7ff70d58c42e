use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, warn};
use std::sync::{Arc, RwLock, Weak};

use crate::schema::types::{Schema, SchemaError};

/// Propagates schemas to the rest of the cluster and looks up schemas other
/// members registered.
///
/// `replicate` must only return once the schema is resolvable by every member
/// that may decode data referring to it.
#[async_trait]
pub trait SchemaReplicator: Send + Sync {
    async fn replicate(&self, schema: &Arc<Schema>) -> Result<(), SchemaError>;

    /// `Ok(None)` when no reachable member knows the id.
    async fn fetch(&self, schema_id: i64) -> Result<Option<Arc<Schema>>, SchemaError>;
}

/// A cluster member able to receive and serve schemas.
#[async_trait]
pub trait SchemaPeer: Send + Sync {
    async fn accept(&self, schema: Arc<Schema>) -> Result<(), SchemaError>;

    async fn lookup(&self, schema_id: i64) -> Result<Option<Arc<Schema>>, SchemaError>;
}

/// Replicator for a single-member deployment.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalReplicator;

#[async_trait]
impl SchemaReplicator for LocalReplicator {
    async fn replicate(&self, _schema: &Arc<Schema>) -> Result<(), SchemaError> {
        Ok(())
    }

    async fn fetch(&self, _schema_id: i64) -> Result<Option<Arc<Schema>>, SchemaError> {
        Ok(None)
    }
}

/// Replicates to every known peer and succeeds once a majority of the
/// members, the local one included, holds the schema.
///
/// Peers are held weakly; a peer that has been dropped counts as a failed ack.
#[derive(Default)]
pub struct MajorityReplicator {
    peers: RwLock<Vec<Weak<dyn SchemaPeer>>>,
}

impl MajorityReplicator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_peer<P: SchemaPeer + 'static>(&self, peer: &Arc<P>) -> Result<(), SchemaError> {
        let peer: Weak<P> = Arc::downgrade(peer);
        let peer: Weak<dyn SchemaPeer> = peer;
        self.peers
            .write()
            .map_err(|_| SchemaError::InvalidData("Failed to acquire peer lock".to_string()))?
            .push(peer);
        Ok(())
    }

    /// Number of cluster members, the local one included.
    pub fn members(&self) -> Result<usize, SchemaError> {
        Ok(self.peer_list()?.len() + 1)
    }

    fn peer_list(&self) -> Result<Vec<Weak<dyn SchemaPeer>>, SchemaError> {
        let peers = self
            .peers
            .read()
            .map_err(|_| SchemaError::InvalidData("Failed to acquire peer lock".to_string()))?;
        Ok(peers.clone())
    }
}

#[async_trait]
impl SchemaReplicator for MajorityReplicator {
    async fn replicate(&self, schema: &Arc<Schema>) -> Result<(), SchemaError> {
        let peers = self.peer_list()?;
        let members = peers.len() + 1;
        let required = members / 2 + 1;

        let results = join_all(peers.iter().map(|peer| {
            let schema = Arc::clone(schema);
            async move {
                match peer.upgrade() {
                    Some(peer) => peer.accept(schema).await,
                    None => Err(SchemaError::Replication(
                        "Peer is no longer available".to_string(),
                    )),
                }
            }
        }))
        .await;

        let mut acks = 1;
        for result in results {
            match result {
                Ok(()) => acks += 1,
                Err(e) => warn!(
                    "Peer rejected schema {} ({}): {}",
                    schema.schema_id(),
                    schema.type_name(),
                    e
                ),
            }
        }

        debug!(
            "Schema {} acknowledged by {}/{} members",
            schema.schema_id(),
            acks,
            members
        );
        if acks >= required {
            Ok(())
        } else {
            Err(SchemaError::Replication(format!(
                "Schema {} acknowledged by {} of {} members, {} required",
                schema.schema_id(),
                acks,
                members,
                required
            )))
        }
    }

    async fn fetch(&self, schema_id: i64) -> Result<Option<Arc<Schema>>, SchemaError> {
        for peer in self.peer_list()? {
            let Some(peer) = peer.upgrade() else {
                continue;
            };
            match peer.lookup(schema_id).await {
                Ok(Some(schema)) => return Ok(Some(schema)),
                Ok(None) => {}
                Err(e) => warn!("Peer lookup of schema {} failed: {}", schema_id, e),
            }
        }
        Ok(None)
    }
}
