//! End-to-end tests for typed entities: create, read back, update, delete.
//!
//! Each test goes through `Database` against a fresh `MemoryBackend`, so the
//! backend's date fix-ups and constraint checks are always in play.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use graph_ogm::mapping::StringMapping;
use graph_ogm::{AttachmentStore, ElementId, Error, GraphElement, Persisted, Result, StorageBackend, Value};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use common::{Company, Person, Role, WorksAt};

// ============================================================================
// 1. Create and read back
// ============================================================================

#[test]
fn test_create_then_get_round_trip() {
    let db = common::open();
    let born = Utc.timestamp_millis_opt(-86_400_000).unwrap();
    let ada = Person {
        name: "Ada".into(),
        nickname: Some("Countess".into()),
        tags: HashSet::from(["math".to_string(), "poetry".to_string()]),
        born: Some(born),
        scores: vec![3, 1, 3],
    };

    let created = db.transaction(|tx| db.create_vertex(tx, "admin", ada.clone())).unwrap();
    assert_eq!(created.value(), &ada);
    assert_eq!(created.created_by(), "admin");
    assert!(created.updated_by().is_none());
    assert_eq!(created.model().label(), "Person");

    let found = db.transaction(|tx| db.get_vertex::<Person>(tx, created.id())).unwrap();
    assert_eq!(found, created);
}

#[test]
fn test_get_unknown_id_is_not_found() {
    let db = common::open();
    let result = db.transaction(|tx| db.get_vertex::<Person>(tx, &ElementId::new("nonexistent-id")));
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[test]
fn test_get_with_wrong_model_is_not_found() {
    let db = common::open();
    let acme = db
        .transaction(|tx| db.create_vertex(tx, "admin", Company { name: "Acme".into(), logo: None }))
        .unwrap();
    let result = db.transaction(|tx| db.get_vertex::<Person>(tx, acme.id()));
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[test]
fn test_dates_stored_as_epoch_millis() {
    let db = common::open();
    let born = Utc.timestamp_opt(1_000, 123_456_789).unwrap();
    let person = Person { born: Some(born), ..Person::named("Grace") };
    let created = db.transaction(|tx| db.create_vertex(tx, "admin", person.clone())).unwrap();

    let raw = db
        .transaction(|tx| db.backend().get_vertex(tx, created.id()))
        .unwrap()
        .unwrap();
    assert_eq!(raw.get("born"), Some(&Value::Long(1_000_123)));
    assert!(matches!(raw.get("_createdAt"), Some(Value::Long(_))));

    // sub-millisecond precision is truncated
    let truncated = Utc.timestamp_opt(1_000, 123_000_000).unwrap();
    assert_eq!(created.born, Some(truncated));
}

#[test]
fn test_native_dates_backend_stores_dates() {
    let config = graph_ogm::DatabaseConfig::from_json_str(
        r#"{ "backend": { "kind": "memory", "native_dates": true } }"#,
    )
    .unwrap();
    let db = common::open_with(config);
    assert!(db.fixups().is_empty());

    let born = Utc.timestamp_millis_opt(42).unwrap();
    let created = db
        .transaction(|tx| db.create_vertex(tx, "admin", Person { born: Some(born), ..Person::named("Lin") }))
        .unwrap();
    let raw = db
        .transaction(|tx| db.backend().get_vertex(tx, created.id()))
        .unwrap()
        .unwrap();
    assert_eq!(raw.get("born"), Some(&Value::Date(born)));
}

// ============================================================================
// 2. Cardinality behavior through the database
// ============================================================================

#[test]
fn test_list_drops_unpersistable_elements() {
    let db = common::open();
    let (alice, acme) = db
        .transaction(|tx| {
            let alice = db.create_vertex(tx, "admin", Person::named("Alice"))?;
            let acme = db.create_vertex(tx, "admin", Company { name: "Acme".into(), logo: None })?;
            Ok((alice.id().clone(), acme.id().clone()))
        })
        .unwrap();

    let job = WorksAt {
        since: Utc.timestamp_opt(0, 0).unwrap(),
        roles: vec![Role::Engineer, Role::Contractor, Role::Manager],
    };
    let edge = db
        .transaction(|tx| db.create_edge(tx, "admin", &alice, &acme, job.clone()))
        .unwrap();

    assert_eq!(edge.roles, vec![Role::Engineer, Role::Manager]);
    let raw = db
        .transaction(|tx| db.backend().get_edge(tx, edge.id()))
        .unwrap()
        .unwrap();
    assert_eq!(
        raw.get("roles"),
        Some(&Value::List(vec!["engineer".into(), "manager".into()]))
    );
}

#[test]
fn test_set_field_collapses_stored_duplicates() {
    let db = common::open();
    let created = db.transaction(|tx| db.create_vertex(tx, "admin", Person::named("Dup"))).unwrap();
    db.transaction(|tx| {
        let raw = Value::List(vec!["a".into(), "b".into(), "a".into()]);
        db.backend().set_property(tx, created.id(), "tags", raw)
    })
    .unwrap();

    let found = db.transaction(|tx| db.get_vertex::<Person>(tx, created.id())).unwrap();
    assert_eq!(found.tags, HashSet::from(["a".to_string(), "b".to_string()]));
}

#[test]
fn test_malformed_property_is_conversion_error() {
    let db = common::open();
    let created = db.transaction(|tx| db.create_vertex(tx, "admin", Person::named("Bad"))).unwrap();
    db.transaction(|tx| db.backend().set_property(tx, created.id(), "scores", Value::Long(1)))
        .unwrap();

    let result = db.transaction(|tx| db.get_vertex::<Person>(tx, created.id()));
    match result {
        Err(Error::Conversion(msg)) => assert!(msg.contains("Person.scores"), "{msg}"),
        other => panic!("expected conversion error, got {other:?}"),
    }
}

// ============================================================================
// 3. Update and delete
// ============================================================================

#[test]
fn test_partial_update_sets_provenance() {
    let db = common::open();
    let created = db
        .transaction(|tx| {
            db.create_vertex(tx, "admin", Person { nickname: Some("Bee".into()), ..Person::named("Bea") })
        })
        .unwrap();

    let updated = db
        .transaction(|tx| {
            db.update::<Person>(tx, "editor", created.id(), |fields| {
                fields.set("nickname", &None::<String>)?;
                fields.set("scores", &vec![10i64])
            })?;
            db.get_vertex::<Person>(tx, created.id())
        })
        .unwrap();

    assert_eq!(updated.name, "Bea");
    assert_eq!(updated.nickname, None);
    assert_eq!(updated.scores, vec![10]);
    assert_eq!(updated.created_by(), "admin");
    assert_eq!(updated.updated_by(), Some("editor"));
    assert!(updated.updated_at().is_some());

    let raw = db
        .transaction(|tx| db.backend().get_vertex(tx, created.id()))
        .unwrap()
        .unwrap();
    assert!(raw.get("nickname").is_none());
}

#[test]
fn test_update_unknown_entity_is_not_found() {
    let db = common::open();
    let result = db.transaction(|tx| {
        db.update::<Person>(tx, "editor", &ElementId::new("404"), |fields| {
            fields.set("name", &"x".to_string())
        })
    });
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[test]
fn test_delete_vertex_removes_its_edges() {
    let db = common::open();
    let (alice, acme, job) = db
        .transaction(|tx| {
            let alice = db.create_vertex(tx, "admin", Person::named("Alice"))?;
            let acme = db.create_vertex(tx, "admin", Company { name: "Acme".into(), logo: None })?;
            let since = Utc.timestamp_opt(0, 0).unwrap();
            let job = db.create_edge(tx, "admin", alice.id(), acme.id(), WorksAt { since, roles: vec![] })?;
            Ok((alice.id().clone(), acme.id().clone(), job.id().clone()))
        })
        .unwrap();

    db.transaction(|tx| db.delete::<Person>(tx, &alice)).unwrap();

    db.transaction(|tx| {
        assert!(matches!(db.get_vertex::<Person>(tx, &alice), Err(Error::NotFound(_))));
        assert!(matches!(db.get_edge::<WorksAt>(tx, &job), Err(Error::NotFound(_))));
        assert!(db.get_vertex::<Company>(tx, &acme).is_ok());
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_edge_endpoints_must_match_model() {
    let db = common::open();
    let result = db.transaction(|tx| {
        let a = db.create_vertex(tx, "admin", Person::named("A"))?;
        let b = db.create_vertex(tx, "admin", Person::named("B"))?;
        let since = Utc.timestamp_opt(0, 0).unwrap();
        db.create_edge(tx, "admin", a.id(), b.id(), WorksAt { since, roles: vec![] })
    });
    assert!(matches!(result, Err(Error::ConstraintViolation(_))));
}

#[test]
fn test_vertex_model_cannot_be_created_as_edge() {
    let db = common::open();
    let result = db.transaction(|tx| {
        let a = db.create_vertex(tx, "admin", Person::named("A"))?;
        db.create_edge(tx, "admin", a.id(), a.id(), Person::named("B"))
    });
    assert!(matches!(result, Err(Error::Config(_))));
}

// ============================================================================
// 4. Attachments
// ============================================================================

#[derive(Default)]
struct Blobs {
    stored: Mutex<Vec<Vec<u8>>>,
}

impl AttachmentStore for Blobs {
    fn store(&self, content: &[u8]) -> Result<String> {
        let mut stored = self.stored.lock();
        stored.push(content.to_vec());
        Ok(format!("blob://{}", stored.len()))
    }
}

#[test]
fn test_update_with_store_keeps_declared_bytes_readable() {
    let blobs = Arc::new(Blobs::default());
    let db = common::open().with_attachment_store(blobs.clone());

    let acme = db
        .transaction(|tx| db.create_vertex(tx, "admin", Company { name: "Acme".into(), logo: Some(vec![7]) }))
        .unwrap();
    db.transaction(|tx| {
        db.update::<Company>(tx, "admin", acme.id(), |fields| fields.set("logo", &Some(vec![1u8, 2])))
    })
    .unwrap();

    let read_back = db.transaction(|tx| db.get_vertex::<Company>(tx, acme.id())).unwrap();
    assert_eq!(read_back.logo, Some(vec![1, 2]));
    assert!(blobs.stored.lock().is_empty());

    db.transaction(|tx| db.delete::<Company>(tx, acme.id())).unwrap();
    let gone = db.transaction(|tx| db.get_vertex::<Company>(tx, acme.id()));
    assert!(matches!(gone, Err(Error::NotFound(_))));
}

#[test]
fn test_update_attaches_payload_before_mapping() {
    let blobs = Arc::new(Blobs::default());
    let db = common::open().with_attachment_store(blobs.clone());

    let brand = db
        .transaction(|tx| {
            db.create_vertex(tx, "admin", Brand { name: "Acme".into(), logo_ref: None, logo: None })
        })
        .unwrap();
    db.transaction(|tx| db.update::<Brand>(tx, "designer", brand.id(), |fields| fields.attach("logo_ref", &[1, 2, 3])))
        .unwrap();

    assert_eq!(blobs.stored.lock().as_slice(), &[vec![1u8, 2, 3]]);
    let read_back = db.transaction(|tx| db.get_vertex::<Brand>(tx, brand.id())).unwrap();
    assert_eq!(read_back.logo_ref.as_deref(), Some("blob://1"));
    assert_eq!(read_back.updated_by(), Some("designer"));

    db.transaction(|tx| db.delete::<Brand>(tx, brand.id())).unwrap();
}

#[test]
fn test_attach_without_store_is_rejected() {
    let db = common::open();
    let brand = db
        .transaction(|tx| {
            db.create_vertex(tx, "admin", Brand { name: "Acme".into(), logo_ref: None, logo: None })
        })
        .unwrap();
    let result = db.transaction(|tx| {
        db.update::<Brand>(tx, "designer", brand.id(), |fields| fields.attach("logo_ref", &[1]))
    });
    assert!(matches!(result, Err(Error::Config(_))));
}

/// Company variant that moves its logo into the attachment store itself.
#[derive(Debug, Clone, PartialEq)]
struct Brand {
    name: String,
    logo_ref: Option<String>,
    logo: Option<Vec<u8>>,
}

static BRAND: std::sync::LazyLock<graph_ogm::Model> = std::sync::LazyLock::new(|| {
    use graph_ogm::mapping::{self, ScalarMapping};
    graph_ogm::Model::vertex("Brand")
        .field("name", mapping::string())
        .field("logo_ref", StringMapping.optional())
        .build()
        .expect("valid Brand model")
});

impl Persisted for Brand {
    fn model() -> &'static graph_ogm::Model {
        &BRAND
    }

    fn from_fields(fields: &graph_ogm::FieldReader<'_>) -> Result<Self> {
        Ok(Self { name: fields.get("name")?, logo_ref: fields.get("logo_ref")?, logo: None })
    }

    fn to_fields(&self, fields: &mut graph_ogm::FieldWriter<'_>) -> Result<()> {
        fields.set("name", &self.name)?;
        fields.set("logo_ref", &self.logo_ref)
    }

    fn externalize(mut self, store: &dyn AttachmentStore) -> Result<Self> {
        if let Some(logo) = self.logo.take() {
            self.logo_ref = Some(store.store(&logo)?);
        }
        Ok(self)
    }
}

#[test]
fn test_full_value_externalized_before_mapping() {
    let blobs = Arc::new(Blobs::default());
    let db = common::open().with_attachment_store(blobs.clone());

    let brand = Brand { name: "Acme".into(), logo_ref: None, logo: Some(vec![9, 9]) };
    let created = db.transaction(|tx| db.create_vertex(tx, "admin", brand.clone())).unwrap();

    assert_eq!(created.logo_ref.as_deref(), Some("blob://1"));
    assert_eq!(blobs.stored.lock().as_slice(), &[vec![9u8, 9]]);
}
