//! Repository seam between the scheduling code and the blob store.
//!
//! The engine and the template service only talk to [`RecurringRepository`]; the blob
//! implementation below does whole-collection read-modify-write, and an indexed backend
//! can replace it without touching the scheduler.

use serde_json::Value;

use super::{keys, KeyValueStore};
use crate::errors::{CoreError, Result};
use crate::ledger::{RecurringTemplate, Transaction};

/// A stored template record that could not be scheduled. Its raw JSON is kept so it is
/// written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRecord {
    pub id: Option<String>,
    pub reason: String,
    pub raw: Value,
}

/// One entry of the stored template collection.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateRecord {
    Parsed(RecurringTemplate),
    Malformed(MalformedRecord),
}

impl TemplateRecord {
    /// Parses one raw record, classifying it instead of failing.
    pub fn from_value(raw: Value) -> Self {
        let id = raw.get("id").and_then(|id| match id {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        });
        match serde_json::from_value::<RecurringTemplate>(raw.clone()) {
            Ok(template) => match template.integrity_issue() {
                None => TemplateRecord::Parsed(template),
                Some(reason) => TemplateRecord::Malformed(MalformedRecord { id, reason, raw }),
            },
            Err(err) => TemplateRecord::Malformed(MalformedRecord {
                id,
                reason: err.to_string(),
                raw,
            }),
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        match self {
            TemplateRecord::Parsed(template) => serde_json::to_value(template)
                .map_err(|err| CoreError::write(keys::RECURRING_TEMPLATES, err)),
            TemplateRecord::Malformed(record) => Ok(record.raw.clone()),
        }
    }

    pub fn template(&self) -> Option<&RecurringTemplate> {
        match self {
            TemplateRecord::Parsed(template) => Some(template),
            TemplateRecord::Malformed(_) => None,
        }
    }

    pub fn template_mut(&mut self) -> Option<&mut RecurringTemplate> {
        match self {
            TemplateRecord::Parsed(template) => Some(template),
            TemplateRecord::Malformed(_) => None,
        }
    }

    /// True when this record carries `id`, parsed or not.
    pub fn has_id(&self, id: &str) -> bool {
        match self {
            TemplateRecord::Parsed(template) => template.id == id,
            TemplateRecord::Malformed(record) => record.id.as_deref() == Some(id),
        }
    }
}

/// Persistence operations the engine and template service depend on.
pub trait RecurringRepository: Send + Sync {
    fn load_templates(&self) -> Result<Vec<TemplateRecord>>;
    fn save_templates(&self, records: &[TemplateRecord]) -> Result<()>;
    fn load_ledger(&self) -> Result<Vec<Transaction>>;
    fn save_ledger(&self, ledger: &[Transaction]) -> Result<()>;
}

/// [`RecurringRepository`] over a [`KeyValueStore`], one JSON array per collection.
#[derive(Debug, Clone)]
pub struct BlobRepository<S> {
    store: S,
}

impl<S: KeyValueStore> BlobRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn read_array(&self, key: &str) -> Result<Vec<Value>> {
        let Some(blob) = self.store.get_blob(key)? else {
            return Ok(Vec::new());
        };
        if blob.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&blob) {
            Ok(Value::Array(items)) => Ok(items),
            Ok(Value::Null) => Ok(Vec::new()),
            Ok(other) => Err(CoreError::read(
                key,
                format!("expected a JSON array, found {}", json_kind(&other)),
            )),
            Err(err) => Err(CoreError::read(key, err)),
        }
    }

    fn write_array(&self, key: &str, items: Vec<Value>) -> Result<()> {
        let json = serde_json::to_string(&Value::Array(items))
            .map_err(|err| CoreError::write(key, err))?;
        self.store.set_blob(key, &json)
    }
}

impl<S: KeyValueStore> RecurringRepository for BlobRepository<S> {
    fn load_templates(&self) -> Result<Vec<TemplateRecord>> {
        let items = self.read_array(keys::RECURRING_TEMPLATES)?;
        Ok(items.into_iter().map(TemplateRecord::from_value).collect())
    }

    fn save_templates(&self, records: &[TemplateRecord]) -> Result<()> {
        let items = records
            .iter()
            .map(TemplateRecord::to_value)
            .collect::<Result<Vec<_>>>()?;
        self.write_array(keys::RECURRING_TEMPLATES, items)
    }

    fn load_ledger(&self) -> Result<Vec<Transaction>> {
        self.read_array(keys::LEDGER)?
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value(item).map_err(|err| {
                    CoreError::read(keys::LEDGER, format!("entry {index}: {err}"))
                })
            })
            .collect()
    }

    fn save_ledger(&self, ledger: &[Transaction]) -> Result<()> {
        let items = ledger
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|err| CoreError::write(keys::LEDGER, err))?;
        self.write_array(keys::LEDGER, items)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    #[test]
    fn missing_blobs_read_as_empty() {
        let repo = BlobRepository::new(MemoryStore::new());
        assert!(repo.load_templates().unwrap().is_empty());
        assert!(repo.load_ledger().unwrap().is_empty());
    }

    #[test]
    fn non_array_blob_is_a_read_error() {
        let store = MemoryStore::with_entries([(keys::LEDGER, "{\"oops\":1}")]);
        let repo = BlobRepository::new(store);
        let err = repo.load_ledger().unwrap_err();
        assert!(matches!(err, CoreError::StorageRead { ref key, .. } if key == keys::LEDGER));
    }

    #[test]
    fn malformed_template_is_classified_and_preserved() {
        let raw = json!([{ "id": "legacy-1", "amount": "lots", "frequency": "hourly" }]);
        let store = MemoryStore::with_entries([(keys::RECURRING_TEMPLATES, raw.to_string())]);
        let repo = BlobRepository::new(store);

        let records = repo.load_templates().unwrap();
        assert_eq!(records.len(), 1);
        let TemplateRecord::Malformed(record) = &records[0] else {
            panic!("expected malformed record");
        };
        assert_eq!(record.id.as_deref(), Some("legacy-1"));

        repo.save_templates(&records).unwrap();
        let stored = repo.store().get_blob(keys::RECURRING_TEMPLATES).unwrap().unwrap();
        let stored: Value = serde_json::from_str(&stored).unwrap();
        assert_eq!(stored, raw);
    }

    #[test]
    fn ids_match_as_plain_text() {
        let raw = json!([
            { "id": 1714000000000u64, "amount": "lots" },
            { "id": "rent-2023", "amount": "x" }
        ]);
        let store = MemoryStore::with_entries([(keys::RECURRING_TEMPLATES, raw.to_string())]);
        let records = BlobRepository::new(store).load_templates().unwrap();

        assert!(records[0].has_id("1714000000000"));
        assert!(records[1].has_id("rent-2023"));
        assert!(!records[1].has_id("rent"));
    }
}
