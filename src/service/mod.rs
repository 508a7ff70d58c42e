//! Process-wide registry of schemas, keyed by schema id.
//!
//! A schema must be resolvable wherever data referring to it may be decoded.
//! [`SchemaService::put`] therefore registers the schema locally and then
//! blocks on the injected [`SchemaReplicator`] before the caller publishes any
//! data written with it. Readers call [`SchemaService::resolve`], which falls
//! back to the cluster when the id is not known locally.

pub mod replication;

pub use replication::{LocalReplicator, MajorityReplicator, SchemaPeer, SchemaReplicator};

use async_trait::async_trait;
use log::{debug, info, warn};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, RwLock};
use tokio::time::{sleep, timeout};

use crate::config::SchemaServiceConfig;
use crate::error::CompactResult;
use crate::schema::types::{Schema, SchemaError};

pub struct SchemaService {
    schemas: RwLock<HashMap<i64, Arc<Schema>>>,
    /// Ids known to be held by a cluster majority
    replicated: RwLock<HashSet<i64>>,
    replicator: Arc<dyn SchemaReplicator>,
    config: SchemaServiceConfig,
}

impl Default for SchemaService {
    fn default() -> Self {
        Self::with_parts(Arc::new(LocalReplicator), SchemaServiceConfig::default())
    }
}

impl SchemaService {
    /// Creates a service replicating through `replicator`.
    ///
    /// # Errors
    /// Returns `CompactError::Config` when the configuration is not usable.
    pub fn new(
        replicator: Arc<dyn SchemaReplicator>,
        config: SchemaServiceConfig,
    ) -> CompactResult<Self> {
        config.validate()?;
        Ok(Self::with_parts(replicator, config))
    }

    fn with_parts(replicator: Arc<dyn SchemaReplicator>, config: SchemaServiceConfig) -> Self {
        Self {
            schemas: RwLock::new(HashMap::new()),
            replicated: RwLock::new(HashSet::new()),
            replicator,
            config,
        }
    }

    /// Service for a single-member deployment.
    #[must_use]
    pub fn local() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &SchemaServiceConfig {
        &self.config
    }

    /// Looks the id up in the local registry only.
    pub fn get(&self, schema_id: i64) -> Result<Option<Arc<Schema>>, SchemaError> {
        let schemas = self
            .schemas
            .read()
            .map_err(|_| SchemaError::InvalidData("Failed to acquire schema lock".to_string()))?;
        Ok(schemas.get(&schema_id).cloned())
    }

    /// Registers the schema locally without replicating it.
    ///
    /// Re-registering a structurally identical schema is a no-op; a different
    /// schema under an id that is already taken is a `SchemaConflict` and leaves
    /// the registered one untouched. Returns the registered instance.
    pub fn put_local(&self, schema: Arc<Schema>) -> Result<Arc<Schema>, SchemaError> {
        let schema_id = schema.schema_id();
        let mut schemas = self
            .schemas
            .write()
            .map_err(|_| SchemaError::InvalidData("Failed to acquire schema lock".to_string()))?;

        match schemas.entry(schema_id) {
            Entry::Occupied(entry) => {
                let existing = entry.get();
                if **existing == *schema {
                    debug!("Schema {} ({}) already registered", schema_id, schema.type_name());
                    Ok(Arc::clone(existing))
                } else {
                    warn!(
                        "Schema id {} is already taken: existing {}, incoming {}",
                        schema_id, existing, schema
                    );
                    Err(SchemaError::SchemaConflict {
                        schema_id,
                        existing: existing.to_string(),
                        incoming: schema.to_string(),
                    })
                }
            }
            Entry::Vacant(entry) => {
                debug!("Registered schema {} ({})", schema_id, schema.type_name());
                entry.insert(Arc::clone(&schema));
                Ok(schema)
            }
        }
    }

    /// Registers every schema locally, stopping at the first conflict.
    pub fn put_local_all(
        &self,
        schemas: impl IntoIterator<Item = Arc<Schema>>,
    ) -> Result<(), SchemaError> {
        for schema in schemas {
            self.put_local(schema)?;
        }
        Ok(())
    }

    /// Registers every schema of a JSON array, such as a snapshot received
    /// when joining a cluster. Returns the number of schemas read.
    pub fn put_local_json(&self, json: &str) -> CompactResult<usize> {
        let schemas: Vec<Schema> = serde_json::from_str(json)?;
        let count = schemas.len();
        self.put_local_all(schemas.into_iter().map(Arc::new))?;
        Ok(count)
    }

    /// Reads a schema snapshot file and registers it locally.
    pub fn load_schemas(&self, path: impl AsRef<Path>) -> CompactResult<usize> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let count = self.put_local_json(&content)?;
        debug!("Loaded {} schemas from {}", count, path.as_ref().display());
        Ok(count)
    }

    /// JSON array of every registered schema, in ascending id order.
    pub fn snapshot_json(&self) -> CompactResult<String> {
        let schemas = self
            .schemas
            .read()
            .map_err(|_| SchemaError::InvalidData("Failed to acquire schema lock".to_string()))?;
        let mut ordered: Vec<&Schema> = schemas.values().map(|schema| &**schema).collect();
        ordered.sort_unstable_by_key(|schema| schema.schema_id());
        Ok(serde_json::to_string(&ordered)?)
    }

    /// Registers the schema and waits until the cluster holds it.
    ///
    /// On a replication failure or timeout the schema stays registered locally
    /// and the returned `Replication` error is retryable; the next `put` of the
    /// same schema replicates it again.
    pub async fn put(&self, schema: Arc<Schema>) -> Result<Arc<Schema>, SchemaError> {
        let schema = self.put_local(schema)?;
        let schema_id = schema.schema_id();
        if self.is_replicated(schema_id)? {
            return Ok(schema);
        }

        let replication_timeout = self.config.replication_timeout();
        match timeout(replication_timeout, self.replicator.replicate(&schema)).await {
            Ok(Ok(())) => {
                self.mark_replicated(schema_id)?;
                info!("Replicated schema {} ({})", schema_id, schema.type_name());
                Ok(schema)
            }
            Ok(Err(e)) => {
                warn!("Failed to replicate schema {}: {}", schema_id, e);
                Err(SchemaError::Replication(format!(
                    "Schema {} could not be replicated: {}",
                    schema_id, e
                )))
            }
            Err(_) => {
                warn!(
                    "Replication of schema {} timed out after {:?}",
                    schema_id, replication_timeout
                );
                Err(SchemaError::Replication(format!(
                    "Replication of schema {} timed out after {} ms",
                    schema_id, self.config.replication_timeout_ms
                )))
            }
        }
    }

    /// Finds the schema for decoding, asking the cluster on a local miss.
    ///
    /// A schema fetched from the cluster is registered locally before it is
    /// returned. It is not considered replicated: a single member may hold it,
    /// so a later `put` still goes through the replicator.
    pub async fn resolve(&self, schema_id: i64) -> Result<Arc<Schema>, SchemaError> {
        if let Some(schema) = self.get(schema_id)? {
            return Ok(schema);
        }

        let attempts = self.config.fetch_attempts;
        for attempt in 1..=attempts {
            match self.replicator.fetch(schema_id).await {
                Ok(Some(schema)) => {
                    if schema.schema_id() != schema_id {
                        warn!(
                            "Cluster returned {} when asked for schema {}",
                            schema, schema_id
                        );
                        return Err(SchemaError::SchemaConflict {
                            schema_id,
                            existing: format!("requested schema id {}", schema_id),
                            incoming: schema.to_string(),
                        });
                    }
                    let schema = self.put_local(schema)?;
                    info!(
                        "Fetched schema {} ({}) from the cluster",
                        schema_id,
                        schema.type_name()
                    );
                    return Ok(schema);
                }
                Ok(None) => debug!(
                    "Schema {} not found in the cluster, attempt {}/{}",
                    schema_id, attempt, attempts
                ),
                Err(e) => warn!(
                    "Fetching schema {} failed, attempt {}/{}: {}",
                    schema_id, attempt, attempts, e
                ),
            }
            if attempt < attempts {
                sleep(self.config.fetch_retry_interval()).await;
            }
        }

        warn!("Schema {} could not be resolved", schema_id);
        Err(SchemaError::SchemaUnresolved(schema_id))
    }

    /// Registered ids in ascending order.
    pub fn schema_ids(&self) -> Result<Vec<i64>, SchemaError> {
        let schemas = self
            .schemas
            .read()
            .map_err(|_| SchemaError::InvalidData("Failed to acquire schema lock".to_string()))?;
        let mut ids: Vec<i64> = schemas.keys().copied().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    pub fn len(&self) -> Result<usize, SchemaError> {
        let schemas = self
            .schemas
            .read()
            .map_err(|_| SchemaError::InvalidData("Failed to acquire schema lock".to_string()))?;
        Ok(schemas.len())
    }

    pub fn is_empty(&self) -> Result<bool, SchemaError> {
        Ok(self.len()? == 0)
    }

    pub fn is_replicated(&self, schema_id: i64) -> Result<bool, SchemaError> {
        let replicated = self
            .replicated
            .read()
            .map_err(|_| {
                SchemaError::InvalidData("Failed to acquire replication lock".to_string())
            })?;
        Ok(replicated.contains(&schema_id))
    }

    fn mark_replicated(&self, schema_id: i64) -> Result<(), SchemaError> {
        self.replicated
            .write()
            .map_err(|_| {
                SchemaError::InvalidData("Failed to acquire replication lock".to_string())
            })?
            .insert(schema_id);
        Ok(())
    }
}

/// Lets services replicate to each other in-process.
#[async_trait]
impl SchemaPeer for SchemaService {
    async fn accept(&self, schema: Arc<Schema>) -> Result<(), SchemaError> {
        self.put_local(schema).map(|_| ())
    }

    async fn lookup(&self, schema_id: i64) -> Result<Option<Arc<Schema>>, SchemaError> {
        self.get(schema_id)
    }
}
