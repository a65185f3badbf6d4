//! Record Store: the validated CRUD/search contract over the producers table.
//!
//! Owns the single SQLite connection for the process. Every other component
//! (import, export, CLI) reaches producers through these methods only.
//!
//! Name rules: trimmed, non-empty, unique by exact (case-sensitive) match.
//! The UNIQUE constraint on `producers.name` backs the pre-check, so a lost
//! check-then-insert race still reports `DuplicateName` instead of a second row.

use std::path::Path;

use rusqlite::Connection;
use thiserror::Error;

use crate::db::{self, DatabaseError};
use crate::models::{Producer, ProducerFields, SearchField};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Producer name cannot be empty")]
    EmptyName,

    #[error("A producer named '{0}' already exists")]
    DuplicateName(String),

    #[error("No producer with id {0}")]
    NotFound(i64),

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}

pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    /// Open (or create) the store at the given database file.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            conn: db::open_database(path)?,
        })
    }

    /// Fresh store backed by an in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            conn: db::open_memory_database()?,
        })
    }

    pub fn create(&self, fields: &ProducerFields) -> Result<Producer, StoreError> {
        let fields = validated(fields)?;
        if self.exists_by_name(&fields.name)? {
            return Err(StoreError::DuplicateName(fields.name));
        }

        let id = db::insert_producer(&self.conn, &fields)
            .map_err(|e| map_unique(e, &fields.name))?;

        tracing::info!(id, name = %fields.name, "Producer created");
        Ok(producer_with_id(id, fields))
    }

    pub fn update(&self, id: i64, fields: &ProducerFields) -> Result<Producer, StoreError> {
        if db::get_producer(&self.conn, id)?.is_none() {
            return Err(StoreError::NotFound(id));
        }
        let fields = validated(fields)?;
        if db::name_taken(&self.conn, &fields.name, Some(id))? {
            return Err(StoreError::DuplicateName(fields.name));
        }

        let changed = db::update_producer(&self.conn, id, &fields)
            .map_err(|e| map_unique(e, &fields.name))?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        tracing::info!(id, name = %fields.name, "Producer updated");
        Ok(producer_with_id(id, fields))
    }

    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        if db::delete_producer(&self.conn, id)? == 0 {
            return Err(StoreError::NotFound(id));
        }
        tracing::info!(id, "Producer deleted");
        Ok(())
    }

    pub fn get(&self, id: i64) -> Result<Option<Producer>, StoreError> {
        Ok(db::get_producer(&self.conn, id)?)
    }

    /// All producers in insertion order.
    pub fn get_all(&self) -> Result<Vec<Producer>, StoreError> {
        Ok(db::get_all_producers(&self.conn)?)
    }

    /// Case-insensitive substring search. A blank term or no field returns everything.
    ///
    /// `%` and `_` in the term are matched literally rather than acting as
    /// SQL `LIKE` wildcards, so a search for `50%` only finds names containing
    /// that exact text.
    pub fn search(&self, term: &str, field: Option<SearchField>) -> Result<Vec<Producer>, StoreError> {
        let term = term.trim();
        match field {
            Some(field) if !term.is_empty() => {
                let hits = db::search_producers(&self.conn, field, term)?;
                tracing::debug!(field = field.as_str(), term, hits = hits.len(), "Producer search");
                Ok(hits)
            }
            _ => self.get_all(),
        }
    }

    /// Exact (case-sensitive) name match.
    pub fn exists_by_name(&self, name: &str) -> Result<bool, StoreError> {
        Ok(db::name_taken(&self.conn, name, None)?)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        Ok(db::count_producers(&self.conn)?)
    }

    #[cfg(test)]
    pub(crate) fn connection_for_tests(&self) -> &Connection {
        &self.conn
    }
}

fn validated(fields: &ProducerFields) -> Result<ProducerFields, StoreError> {
    let fields = fields.trimmed();
    if fields.name.is_empty() {
        return Err(StoreError::EmptyName);
    }
    Ok(fields)
}

fn map_unique(err: DatabaseError, name: &str) -> StoreError {
    if err.is_unique_violation() {
        StoreError::DuplicateName(name.to_string())
    } else {
        StoreError::Storage(err)
    }
}

fn producer_with_id(id: i64, fields: ProducerFields) -> Producer {
    Producer {
        id,
        name: fields.name,
        contact: fields.contact,
        address: fields.address,
        products: fields.products,
        category: fields.category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RecordStore {
        RecordStore::open_in_memory().unwrap()
    }

    fn solar(name: &str) -> ProducerFields {
        ProducerFields::new(name, "info@example.test", "Main St 1", "PV modules", "Renewable Energy")
    }

    #[test]
    fn create_visible_in_get_all_and_search() {
        let s = store();
        let p = s.create(&solar("SunWorks")).unwrap();
        assert_eq!(p.name, "SunWorks");

        let all = s.get_all().unwrap();
        assert_eq!(all, vec![p.clone()]);

        let hits = s.search("sunw", Some(SearchField::Name)).unwrap();
        assert_eq!(hits, vec![p]);
    }

    #[test]
    fn create_trims_inputs() {
        let s = store();
        let p = s
            .create(&ProducerFields::new("  Tidal One  ", " t@one.test ", "", " turbines ", " Marine "))
            .unwrap();
        assert_eq!(p.name, "Tidal One");
        assert_eq!(p.contact, "t@one.test");
        assert_eq!(p.products, "turbines");
        assert_eq!(s.get(p.id).unwrap().unwrap(), p);
    }

    #[test]
    fn duplicate_name_rejected_and_count_unchanged() {
        let s = store();
        s.create(&solar("SunWorks")).unwrap();
        let err = s.create(&solar("  SunWorks ")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName(ref n) if n == "SunWorks"));
        assert_eq!(s.count().unwrap(), 1);
    }

    #[test]
    fn duplicate_check_is_case_sensitive() {
        let s = store();
        s.create(&solar("SunWorks")).unwrap();
        assert!(s.create(&solar("sunworks")).is_ok());
        assert_eq!(s.count().unwrap(), 2);
    }

    #[test]
    fn empty_or_blank_name_rejected() {
        let s = store();
        assert!(matches!(s.create(&solar("")), Err(StoreError::EmptyName)));
        assert!(matches!(s.create(&solar("   \t")), Err(StoreError::EmptyName)));
        assert_eq!(s.count().unwrap(), 0);
    }

    #[test]
    fn update_to_own_name_allowed() {
        let s = store();
        let p = s.create(&solar("SunWorks")).unwrap();
        let mut fields = ProducerFields::from(&p);
        fields.contact = "new@sunworks.test".into();
        let updated = s.update(p.id, &fields).unwrap();
        assert_eq!(updated.id, p.id);
        assert_eq!(updated.contact, "new@sunworks.test");
    }

    #[test]
    fn update_to_other_name_rejected() {
        let s = store();
        s.create(&solar("SunWorks")).unwrap();
        let second = s.create(&solar("WindCo")).unwrap();
        let err = s.update(second.id, &solar("SunWorks")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName(_)));
        assert_eq!(s.get(second.id).unwrap().unwrap().name, "WindCo");
    }

    #[test]
    fn update_missing_id_is_not_found() {
        let s = store();
        assert!(matches!(s.update(99, &solar("Ghost")), Err(StoreError::NotFound(99))));
    }

    #[test]
    fn update_with_blank_name_rejected() {
        let s = store();
        let p = s.create(&solar("SunWorks")).unwrap();
        assert!(matches!(s.update(p.id, &solar(" ")), Err(StoreError::EmptyName)));
        assert_eq!(s.get(p.id).unwrap().unwrap().name, "SunWorks");
    }

    #[test]
    fn delete_removes_permanently() {
        let s = store();
        let p = s.create(&solar("SunWorks")).unwrap();
        s.delete(p.id).unwrap();
        assert!(s.get_all().unwrap().is_empty());
        assert!(matches!(s.delete(p.id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn delete_missing_is_not_found() {
        let s = store();
        assert!(matches!(s.delete(7), Err(StoreError::NotFound(7))));
    }

    #[test]
    fn search_category_case_insensitive() {
        let s = store();
        let p = s.create(&solar("SunWorks")).unwrap();
        s.create(&ProducerFields::new("Coal Corp", "", "", "", "Fossil")).unwrap();
        let hits = s.search("ENER", Some(SearchField::Category)).unwrap();
        assert_eq!(hits, vec![p]);
    }

    #[test]
    fn blank_term_or_no_field_returns_all() {
        let s = store();
        s.create(&solar("SunWorks")).unwrap();
        s.create(&solar("WindCo")).unwrap();
        assert_eq!(s.search("", Some(SearchField::Name)).unwrap().len(), 2);
        assert_eq!(s.search("  ", Some(SearchField::Category)).unwrap().len(), 2);
        assert_eq!(s.search("Sun", None).unwrap().len(), 2);
    }

    #[test]
    fn search_percent_sign_is_literal() {
        let s = store();
        s.create(&solar("Grid 50% Partners")).unwrap();
        s.create(&solar("Grid 500 Holdings")).unwrap();
        let hits = s.search("50%", Some(SearchField::Name)).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Grid 50% Partners");
    }

    #[test]
    fn exists_by_name_exact_match() {
        let s = store();
        s.create(&solar("SunWorks")).unwrap();
        assert!(s.exists_by_name("SunWorks").unwrap());
        assert!(!s.exists_by_name("SunWork").unwrap());
        assert!(!s.exists_by_name("SUNWORKS").unwrap());
    }

    #[test]
    fn reopened_file_store_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("producers.sqlite");
        {
            let s = RecordStore::open(&path).unwrap();
            s.create(&solar("SunWorks")).unwrap();
        }
        let s = RecordStore::open(&path).unwrap();
        assert!(s.exists_by_name("SunWorks").unwrap());
    }
}
