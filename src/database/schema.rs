//! Schema provisioning from model index declarations.

use crate::entity::Model;
use crate::index::{IndexSpec, IndexType};
use crate::model::property_map;
use crate::storage::{
    BackendCapabilities, ConstraintDescriptor, ConstraintType, IndexDescriptor, StorageBackend,
};
use crate::{Error, Result};
use super::Database;

/// What `create_schema` provisioned, and the declarations it could not honor.
#[derive(Debug, Default)]
pub struct SchemaReport {
    pub constraints: Vec<ConstraintDescriptor>,
    pub indexes: Vec<IndexDescriptor>,
    /// Non-fatal failures; each one skipped a single declaration.
    pub errors: Vec<Error>,
}

impl SchemaReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    fn constraint(&mut self, label: &str, property: &str) {
        self.constraints.push(ConstraintDescriptor {
            label: label.to_string(),
            property: property.to_string(),
            constraint_type: ConstraintType::Unique,
        });
    }

    fn index(&mut self, label: &str, property: &str, index_type: IndexType) {
        self.indexes.push(IndexDescriptor {
            label: label.to_string(),
            property: property.to_string(),
            index_type,
        });
    }

    fn error(&mut self, label: &str, error: Error) {
        tracing::error!(label, error = %error, "schema declaration skipped");
        self.errors.push(error);
    }
}

impl<B: StorageBackend> Database<B> {
    /// Provision identity constraints and declared indexes for `models`, in
    /// one transaction.
    ///
    /// Failing to make the identity property unique is fatal. Every other
    /// failure is logged, recorded in the report, and provisioning goes on.
    pub fn create_schema(&self, models: &[&Model]) -> Result<SchemaReport> {
        let capabilities = self.backend.capabilities();
        self.transaction(|tx| {
            let mut report = SchemaReport::default();
            for model in models {
                self.provision_model(tx, model, &capabilities, &mut report)?;
            }
            Ok(report)
        })
    }

    fn provision_model(
        &self,
        tx: &mut B::Tx,
        model: &Model,
        capabilities: &BackendCapabilities,
        report: &mut SchemaReport,
    ) -> Result<()> {
        let label = model.label();
        self.backend
            .create_constraint(tx, label, property_map::ID, ConstraintType::Unique)
            .map_err(|e| Error::Schema(format!("identity constraint on {label}: {e}")))?;
        report.constraint(label, property_map::ID);

        for index in model.indexes() {
            if let Err(e) = self.provision_index(tx, label, index, capabilities, report) {
                report.error(label, e);
            }
        }
        tracing::debug!(label, indexes = model.indexes().len(), "schema provisioned");
        Ok(())
    }

    fn provision_index(
        &self,
        tx: &mut B::Tx,
        label: &str,
        index: &IndexSpec,
        capabilities: &BackendCapabilities,
        report: &mut SchemaReport,
    ) -> Result<()> {
        match index.index_type {
            IndexType::Standard => {
                let property = single_property(label, index)?;
                self.backend.create_index(tx, label, property, IndexType::Standard)?;
                report.index(label, property, IndexType::Standard);
            }
            IndexType::Unique => {
                let property = single_property(label, index)?;
                self.backend.create_constraint(tx, label, property, ConstraintType::Unique)?;
                report.constraint(label, property);
            }
            IndexType::FullText if capabilities.supports_fulltext_index => {
                for property in &index.properties {
                    self.backend.create_index(tx, label, property, IndexType::FullText)?;
                    report.index(label, property, IndexType::FullText);
                }
            }
            IndexType::FullText => {
                for property in &index.properties {
                    self.backend.create_constraint(tx, label, property, ConstraintType::Unique)?;
                    report.constraint(label, property);
                }
                report.error(
                    label,
                    Error::Schema(format!(
                        "full-text index on {label}({}) unsupported, created unique constraint instead",
                        index.properties.join(", ")
                    )),
                );
            }
        }
        Ok(())
    }
}

fn single_property<'a>(label: &str, index: &'a IndexSpec) -> Result<&'a str> {
    index.single_property().ok_or_else(|| {
        Error::Schema(format!(
            "{:?} index on {label}({}) must cover exactly one property",
            index.index_type,
            index.properties.join(", ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use crate::config::DatabaseConfig;
    use crate::entity::Model;
    use crate::index::IndexType;
    use crate::mapping;
    use crate::storage::{ConstraintType, MemoryBackend, StorageBackend};
    use crate::{Database, Error};

    fn db() -> Database<MemoryBackend> {
        Database::open(DatabaseConfig::default()).unwrap()
    }

    #[test]
    fn test_identity_constraint_always_created() {
        let db = db();
        let plain = Model::vertex("Plain").build().unwrap();
        let report = db.create_schema(&[&plain]).unwrap();
        assert!(report.is_clean());

        let constraints = db.transaction(|tx| db.backend().constraints(tx)).unwrap();
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].label, "Plain");
        assert_eq!(constraints[0].property, "_id");
        assert_eq!(constraints[0].constraint_type, ConstraintType::Unique);
    }

    #[test]
    fn test_bad_standard_index_skipped() {
        let db = db();
        let model = Model::vertex("Person")
            .field("name", mapping::string())
            .field("email", mapping::string())
            .index(IndexType::Standard, ["name"])
            .index(IndexType::Standard, ["name", "email"])
            .build()
            .unwrap();
        let report = db.create_schema(&[&model]).unwrap();

        assert_eq!(report.indexes.len(), 1);
        assert_eq!(report.indexes[0].property, "name");
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(report.errors[0], Error::Schema(_)));

        let indexes = db.transaction(|tx| db.backend().indexes(tx)).unwrap();
        assert_eq!(indexes.len(), 1);
    }

    #[test]
    fn test_fulltext_degrades_to_unique() {
        let db = db();
        let model = Model::vertex("Article")
            .field("title", mapping::string())
            .index(IndexType::FullText, ["title"])
            .build()
            .unwrap();
        let report = db.create_schema(&[&model]).unwrap();

        assert_eq!(report.errors.len(), 1);
        assert!(report.constraints.iter().any(|c| c.property == "title"));
        assert!(report.indexes.is_empty());
    }

    #[test]
    fn test_unique_index_over_duplicates_is_not_fatal() {
        let db = db();
        let model = Model::vertex("Tag")
            .field("name", mapping::string())
            .index(IndexType::Unique, ["name"])
            .build()
            .unwrap();
        db.transaction(|tx| {
            for _ in 0..2 {
                let props = [("name".to_string(), crate::Value::from("dup"))].into_iter().collect();
                db.backend().create_vertex(tx, "Tag", props)?;
            }
            Ok(())
        })
        .unwrap();

        let report = db.create_schema(&[&model]).unwrap();
        assert!(matches!(report.errors[..], [Error::ConstraintViolation(_)]));
        assert_eq!(report.constraints.len(), 1);
    }
}
