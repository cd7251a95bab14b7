//! Persisted analysis records
//!
//! Uses redb (ACID, well-maintained) as the embedded record store. Records
//! are written in two phases: a `Pending` placeholder before document
//! rendering starts, then an update to `Complete` or `Failed`. A record is
//! never deleted on failure.

use crate::models::{AnalysisRecord, RecordState};
use anyhow::{Context, Result};
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;

const RECORDS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("analyses");

/// Embedded store for [`AnalysisRecord`]s.
pub struct RecordStore {
    db: Database,
}

impl RecordStore {
    /// Create or open a record store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path).context("Failed to open record database")?;

        // Make sure the table exists so empty reads work.
        let txn = db.begin_write()?;
        txn.open_table(RECORDS_TABLE)?;
        txn.commit()?;

        Ok(Self { db })
    }

    /// Insert a record (phase one of the two-phase write).
    pub fn insert(&self, record: &AnalysisRecord) -> Result<()> {
        let bytes = serde_json::to_vec(record)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(RECORDS_TABLE)?;
            table.insert(record.id.as_str(), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Fetch a record by id.
    pub fn get(&self, id: &str) -> Result<Option<AnalysisRecord>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(RECORDS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Phase two, success: attach the document path.
    pub fn mark_complete(&self, id: &str, report_path: &str) -> Result<()> {
        self.update(id, |record| {
            record.state = RecordState::Complete;
            record.report_path = Some(report_path.to_string());
        })
    }

    /// Phase two, failure: keep the record with an explicit error state.
    pub fn mark_failed(&self, id: &str) -> Result<()> {
        self.update(id, |record| {
            record.state = RecordState::Failed;
        })
    }

    fn update(&self, id: &str, mutate: impl FnOnce(&mut AnalysisRecord)) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(RECORDS_TABLE)?;
            let existing = {
                let guard = table.get(id)?;
                guard.map(|v| v.value().to_vec())
            }
            .with_context(|| format!("No record with id {}", id))?;

            let mut record: AnalysisRecord = serde_json::from_slice(&existing)?;
            mutate(&mut record);
            let bytes = serde_json::to_vec(&record)?;
            table.insert(id, bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// All records, newest first.
    pub fn list(&self) -> Result<Vec<AnalysisRecord>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(RECORDS_TABLE)?;
        let mut records = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            records.push(serde_json::from_slice::<AnalysisRecord>(value.value())?);
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, RecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::open(&dir.path().join("devmate.redb")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_two_phase_write_success() {
        let (_dir, store) = temp_store();
        let record = AnalysisRecord::pending("https://example.com/a.git", 8.2);
        store.insert(&record).unwrap();

        let loaded = store.get(&record.id).unwrap().unwrap();
        assert_eq!(loaded.state, RecordState::Pending);
        assert!(loaded.report_path.is_none());

        store
            .mark_complete(&record.id, "reports/devmate_report_1.pdf")
            .unwrap();
        let loaded = store.get(&record.id).unwrap().unwrap();
        assert_eq!(loaded.state, RecordState::Complete);
        assert_eq!(
            loaded.report_path.as_deref(),
            Some("reports/devmate_report_1.pdf")
        );
    }

    #[test]
    fn test_failed_rendering_keeps_record() {
        let (_dir, store) = temp_store();
        let record = AnalysisRecord::pending("https://example.com/b.git", 5.0);
        store.insert(&record).unwrap();
        store.mark_failed(&record.id).unwrap();

        let loaded = store.get(&record.id).unwrap().unwrap();
        assert_eq!(loaded.state, RecordState::Failed);
        assert!(loaded.report_path.is_none());
        assert_eq!(loaded.score, 5.0);
    }

    #[test]
    fn test_list_is_newest_first() {
        let (_dir, store) = temp_store();
        let mut first = AnalysisRecord::pending("first", 7.0);
        let mut second = AnalysisRecord::pending("second", 7.0);
        first.created_at = chrono::Utc::now() - chrono::Duration::seconds(60);
        second.created_at = chrono::Utc::now();
        store.insert(&first).unwrap();
        store.insert(&second).unwrap();

        let records = store.list().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].repository, "second");
        assert_eq!(records[1].repository, "first");
    }

    #[test]
    fn test_update_missing_record_errors() {
        let (_dir, store) = temp_store();
        assert!(store.mark_failed("no-such-id").is_err());
    }
}
