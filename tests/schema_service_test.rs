//! Schema registry behaviour, locally and across in-process cluster members.

mod common;

use async_trait::async_trait;
use common::{init_logger, person_schema, point_schema};
use fold_compact::{
    FieldDescriptor, FieldKind, GenericRecordBuilder, MajorityReplicator, Schema, SchemaError,
    SchemaPeer, SchemaReplicator, SchemaService, SchemaServiceConfig,
};
use std::sync::Arc;

/// A member that never stores anything.
struct OfflinePeer;

#[async_trait]
impl SchemaPeer for OfflinePeer {
    async fn accept(&self, _schema: Arc<Schema>) -> Result<(), SchemaError> {
        Err(SchemaError::Replication("member is offline".to_string()))
    }

    async fn lookup(&self, _schema_id: i64) -> Result<Option<Arc<Schema>>, SchemaError> {
        Err(SchemaError::Replication("member is offline".to_string()))
    }
}

/// Answers every lookup with the same schema, whatever the id.
struct MisroutingReplicator;

#[async_trait]
impl SchemaReplicator for MisroutingReplicator {
    async fn replicate(&self, _schema: &Arc<Schema>) -> Result<(), SchemaError> {
        Ok(())
    }

    async fn fetch(&self, _schema_id: i64) -> Result<Option<Arc<Schema>>, SchemaError> {
        Ok(Some(point_schema()))
    }
}

fn fast_config() -> SchemaServiceConfig {
    SchemaServiceConfig::default()
        .with_replication_timeout_ms(1_000)
        .with_fetch_attempts(2)
        .with_fetch_retry_interval_ms(1)
}

#[test]
fn test_registration_is_idempotent() {
    init_logger();

    let service = SchemaService::local();
    service.put_local(point_schema()).unwrap();
    service.put_local(point_schema()).unwrap();
    service.put_local(person_schema()).unwrap();

    assert_eq!(service.len().unwrap(), 2);
    let stored = service.get(point_schema().schema_id()).unwrap().unwrap();
    assert_eq!(*stored, *point_schema());
}

#[test]
fn test_concurrent_registration_converges() {
    init_logger();

    let service = Arc::new(SchemaService::local());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || service.put_local(point_schema()))
        })
        .collect();

    let registered: Vec<Arc<Schema>> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().unwrap())
        .collect();
    assert_eq!(service.len().unwrap(), 1);
    assert!(registered.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[tokio::test]
async fn test_local_put_then_resolve_for_decoding() {
    init_logger();

    let service = SchemaService::local();
    let record = GenericRecordBuilder::compact("Point")
        .set_int32("x", 1)
        .and_then(|b| b.set_int32("y", 2))
        .and_then(GenericRecordBuilder::build)
        .unwrap();

    service.put(Arc::clone(record.schema())).await.unwrap();
    let resolved = service.resolve(record.schema().schema_id()).await.unwrap();
    assert_eq!(*resolved, **record.schema());
    assert!(service.is_replicated(resolved.schema_id()).unwrap());
}

#[tokio::test]
async fn test_majority_replication_reaches_peers() {
    init_logger();

    let majority = Arc::new(MajorityReplicator::new());
    let writer = SchemaService::new(majority.clone(), fast_config()).unwrap();
    let reader = Arc::new(SchemaService::local());
    let offline = Arc::new(OfflinePeer);
    majority.add_peer(&reader).unwrap();
    majority.add_peer(&offline).unwrap();

    // Writer and reader form a majority of three.
    writer.put(person_schema()).await.unwrap();
    assert!(reader.get(person_schema().schema_id()).unwrap().is_some());
}

#[tokio::test]
async fn test_replication_without_majority_is_retryable() {
    init_logger();

    let majority = Arc::new(MajorityReplicator::new());
    let writer = SchemaService::new(majority.clone(), fast_config()).unwrap();
    let first = Arc::new(OfflinePeer);
    let second = Arc::new(OfflinePeer);
    majority.add_peer(&first).unwrap();
    majority.add_peer(&second).unwrap();

    let err = writer.put(point_schema()).await.unwrap_err();
    assert!(matches!(err, SchemaError::Replication(_)));
    assert!(err.is_retryable());

    // Still usable locally, replicated again once the cluster recovers.
    assert!(writer.get(point_schema().schema_id()).unwrap().is_some());
    assert!(!writer.is_replicated(point_schema().schema_id()).unwrap());

    let recovered = Arc::new(SchemaService::local());
    let third = Arc::new(SchemaService::local());
    majority.add_peer(&recovered).unwrap();
    majority.add_peer(&third).unwrap();
    writer.put(point_schema()).await.unwrap();
    assert!(writer.is_replicated(point_schema().schema_id()).unwrap());
    assert!(recovered.get(point_schema().schema_id()).unwrap().is_some());
}

#[tokio::test]
async fn test_resolve_fetches_from_cluster_and_caches() {
    init_logger();

    let writer = Arc::new(SchemaService::local());
    writer.put_local(person_schema()).unwrap();

    let majority = Arc::new(MajorityReplicator::new());
    majority.add_peer(&writer).unwrap();
    let reader = SchemaService::new(majority, fast_config()).unwrap();
    assert!(reader.is_empty().unwrap());

    let schema_id = person_schema().schema_id();
    let resolved = reader.resolve(schema_id).await.unwrap();
    assert_eq!(*resolved, *person_schema());
    assert_eq!(reader.schema_ids().unwrap(), vec![schema_id]);

    // Served locally from now on, even with the writer gone.
    drop(writer);
    assert!(reader.resolve(schema_id).await.is_ok());
}

#[tokio::test]
async fn test_schema_fetched_from_minority_still_needs_majority_on_put() {
    init_logger();

    // Five members: only `holder` has the schema, three are offline.
    let holder = Arc::new(SchemaService::local());
    holder.put_local(point_schema()).unwrap();
    let offline: Vec<_> = (0..3).map(|_| Arc::new(OfflinePeer)).collect();

    let majority = Arc::new(MajorityReplicator::new());
    majority.add_peer(&holder).unwrap();
    for peer in &offline {
        majority.add_peer(peer).unwrap();
    }
    assert_eq!(majority.members().unwrap(), 5);
    let node = SchemaService::new(majority, fast_config()).unwrap();

    let schema_id = point_schema().schema_id();
    node.resolve(schema_id).await.unwrap();
    assert!(!node.is_replicated(schema_id).unwrap());

    // Two holders out of five is not durable.
    let err = node.put(point_schema()).await.unwrap_err();
    assert!(matches!(err, SchemaError::Replication(_)));
    assert!(!node.is_replicated(schema_id).unwrap());
}

#[tokio::test]
async fn test_changed_structure_registers_under_new_id() {
    init_logger();

    let writer = SchemaService::local();
    writer.put(point_schema()).await.unwrap();

    // Same type name, different structure: a distinct id, registered side by side.
    let widened = Arc::new(
        Schema::new(
            "Point",
            vec![
                FieldDescriptor::new("x", FieldKind::Int64),
                FieldDescriptor::new("y", FieldKind::Int64),
            ],
        )
        .unwrap(),
    );
    assert_ne!(widened.schema_id(), point_schema().schema_id());
    writer.put(widened).await.unwrap();
    assert_eq!(writer.len().unwrap(), 2);
}

#[tokio::test]
async fn test_unknown_id_is_unresolved() {
    init_logger();

    let majority = Arc::new(MajorityReplicator::new());
    let offline = Arc::new(OfflinePeer);
    majority.add_peer(&offline).unwrap();
    let reader = SchemaService::new(majority, fast_config()).unwrap();

    let err = reader.resolve(12345).await.unwrap_err();
    assert_eq!(err, SchemaError::SchemaUnresolved(12345));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_fetched_schema_with_other_id_is_conflict() {
    init_logger();

    let reader =
        SchemaService::new(Arc::new(MisroutingReplicator), fast_config()).unwrap();
    let requested = Schema::new("Other", vec![FieldDescriptor::new("v", FieldKind::Int8)])
        .unwrap()
        .schema_id();

    let err = reader.resolve(requested).await.unwrap_err();
    assert!(matches!(
        err,
        SchemaError::SchemaConflict { schema_id, .. } if schema_id == requested
    ));
    assert!(reader.is_empty().unwrap());
}

#[tokio::test]
async fn test_put_local_all_for_joining_member() {
    init_logger();

    let joining = SchemaService::local();
    joining
        .put_local_all(vec![point_schema(), person_schema()])
        .unwrap();
    assert_eq!(joining.len().unwrap(), 2);
    assert!(joining.resolve(point_schema().schema_id()).await.is_ok());
}

#[test]
fn test_joining_member_loads_schema_snapshot() {
    init_logger();

    let source = SchemaService::local();
    source
        .put_local_all(vec![point_schema(), person_schema()])
        .unwrap();

    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("schemas.json");
    std::fs::write(&path, source.snapshot_json().unwrap()).unwrap();

    let joining = SchemaService::local();
    assert_eq!(joining.load_schemas(&path).unwrap(), 2);
    assert_eq!(joining.schema_ids().unwrap(), source.schema_ids().unwrap());

    let missing = joining.load_schemas(dir.path().join("absent.json"));
    assert!(matches!(missing, Err(fold_compact::CompactError::Io(_))));
}
