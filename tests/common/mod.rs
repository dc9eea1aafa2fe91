//! Shared fixtures: a small Person / Company / WorksAt domain.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use graph_ogm::mapping::{self, Converted, DateMapping, LongMapping, ScalarMapping, StringMapping};
use graph_ogm::storage::MemoryBackend;
use graph_ogm::{
    Database, DatabaseConfig, FieldReader, FieldWriter, IndexType, Model, Persisted, Result,
};

// ============================================================================
// Person
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub nickname: Option<String>,
    pub tags: HashSet<String>,
    pub born: Option<DateTime<Utc>>,
    pub scores: Vec<i64>,
}

impl Person {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nickname: None,
            tags: HashSet::new(),
            born: None,
            scores: Vec::new(),
        }
    }
}

static PERSON: LazyLock<Model> = LazyLock::new(|| {
    Model::vertex("Person")
        .field("name", mapping::string())
        .field("nickname", StringMapping.optional())
        .field("tags", StringMapping.set())
        .field("born", DateMapping.optional())
        .field("scores", LongMapping.list())
        .index(IndexType::Unique, ["name"])
        .build()
        .expect("valid Person model")
});

impl Persisted for Person {
    fn model() -> &'static Model {
        &PERSON
    }

    fn from_fields(fields: &FieldReader<'_>) -> Result<Self> {
        Ok(Self {
            name: fields.get("name")?,
            nickname: fields.get("nickname")?,
            tags: fields.get("tags")?,
            born: fields.get("born")?,
            scores: fields.get("scores")?,
        })
    }

    fn to_fields(&self, fields: &mut FieldWriter<'_>) -> Result<()> {
        fields.set("name", &self.name)?;
        fields.set("nickname", &self.nickname)?;
        fields.set("tags", &self.tags)?;
        fields.set("born", &self.born)?;
        fields.set("scores", &self.scores)
    }
}

// ============================================================================
// Company
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Company {
    pub name: String,
    pub logo: Option<Vec<u8>>,
}

static COMPANY: LazyLock<Model> = LazyLock::new(|| {
    Model::vertex("Company")
        .field("name", mapping::string())
        .field("logo", mapping::BytesMapping.optional())
        .index(IndexType::Standard, ["name"])
        .build()
        .expect("valid Company model")
});

impl Persisted for Company {
    fn model() -> &'static Model {
        &COMPANY
    }

    fn from_fields(fields: &FieldReader<'_>) -> Result<Self> {
        Ok(Self { name: fields.get("name")?, logo: fields.get("logo")? })
    }

    fn to_fields(&self, fields: &mut FieldWriter<'_>) -> Result<()> {
        fields.set("name", &self.name)?;
        fields.set("logo", &self.logo)
    }
}

// ============================================================================
// WorksAt: Person → Company
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Engineer,
    Manager,
    /// Never persisted.
    Contractor,
}

pub fn role_mapping() -> Converted<StringMapping, Role> {
    mapping::convert(
        StringMapping,
        |s| match s.as_str() {
            "engineer" => Some(Role::Engineer),
            "manager" => Some(Role::Manager),
            _ => None,
        },
        |role| match role {
            Role::Engineer => Some("engineer".to_string()),
            Role::Manager => Some("manager".to_string()),
            Role::Contractor => None,
        },
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorksAt {
    pub since: DateTime<Utc>,
    pub roles: Vec<Role>,
}

static WORKS_AT: LazyLock<Model> = LazyLock::new(|| {
    Model::edge("WorksAt", &PERSON, &COMPANY)
        .field("since", mapping::date())
        .field("roles", role_mapping().list())
        .build()
        .expect("valid WorksAt model")
});

impl Persisted for WorksAt {
    fn model() -> &'static Model {
        &WORKS_AT
    }

    fn from_fields(fields: &FieldReader<'_>) -> Result<Self> {
        Ok(Self { since: fields.get("since")?, roles: fields.get("roles")? })
    }

    fn to_fields(&self, fields: &mut FieldWriter<'_>) -> Result<()> {
        fields.set("since", &self.since)?;
        fields.set("roles", &self.roles)
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn open() -> Database<MemoryBackend> {
    open_with(DatabaseConfig::default())
}

pub fn open_with(config: DatabaseConfig) -> Database<MemoryBackend> {
    let db = Database::open(config).unwrap();
    db.create_schema(&[Person::model(), Company::model(), WorksAt::model()])
        .unwrap();
    db
}
