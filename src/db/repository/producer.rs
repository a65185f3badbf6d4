use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::{Producer, ProducerFields, SearchField};

const SELECT_COLUMNS: &str = "SELECT id, name, contact, address, products, category FROM producers";

fn producer_from_row(row: &Row<'_>) -> rusqlite::Result<Producer> {
    Ok(Producer {
        id: row.get(0)?,
        name: row.get(1)?,
        contact: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        address: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        products: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        category: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
    })
}

/// Insert a producer and return its assigned id.
pub fn insert_producer(conn: &Connection, fields: &ProducerFields) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO producers (name, contact, address, products, category)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            fields.name,
            fields.contact,
            fields.address,
            fields.products,
            fields.category,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Overwrite the editable fields of a producer. Returns the number of rows changed.
pub fn update_producer(
    conn: &Connection,
    id: i64,
    fields: &ProducerFields,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE producers SET name = ?1, contact = ?2, address = ?3, products = ?4, category = ?5
         WHERE id = ?6",
        params![
            fields.name,
            fields.contact,
            fields.address,
            fields.products,
            fields.category,
            id,
        ],
    )?;
    Ok(changed)
}

/// Delete a producer. Returns the number of rows removed (0 or 1).
pub fn delete_producer(conn: &Connection, id: i64) -> Result<usize, DatabaseError> {
    let removed = conn.execute("DELETE FROM producers WHERE id = ?1", params![id])?;
    Ok(removed)
}

pub fn get_producer(conn: &Connection, id: i64) -> Result<Option<Producer>, DatabaseError> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
    let producer = conn
        .query_row(&sql, params![id], producer_from_row)
        .optional()?;
    Ok(producer)
}

pub fn get_all_producers(conn: &Connection) -> Result<Vec<Producer>, DatabaseError> {
    let sql = format!("{SELECT_COLUMNS} ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], producer_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Case-insensitive substring match on one column. `%` and `_` in the term
/// match literally.
pub fn search_producers(
    conn: &Connection,
    field: SearchField,
    term: &str,
) -> Result<Vec<Producer>, DatabaseError> {
    let sql = format!(
        "{SELECT_COLUMNS} WHERE {} LIKE ?1 ESCAPE '\\' ORDER BY id",
        field.column()
    );
    let pattern = format!("%{}%", escape_like(term));
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![pattern], producer_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Exact, case-sensitive name lookup, optionally ignoring one record.
pub fn name_taken(
    conn: &Connection,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<bool, DatabaseError> {
    let found = conn
        .query_row(
            "SELECT 1 FROM producers WHERE name = ?1 AND (?2 IS NULL OR id != ?2) LIMIT 1",
            params![name, exclude_id],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn count_producers(conn: &Connection) -> Result<usize, DatabaseError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM producers", [], |row| row.get(0))?;
    Ok(count as usize)
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn fields(name: &str, category: &str) -> ProducerFields {
        ProducerFields::new(name, "", "", "", category)
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let conn = open_memory_database().unwrap();
        let a = insert_producer(&conn, &fields("Alpha Wind", "Wind")).unwrap();
        let b = insert_producer(&conn, &fields("Beta Hydro", "Hydro")).unwrap();
        assert!(b > a);
        assert_eq!(count_producers(&conn).unwrap(), 2);
    }

    #[test]
    fn ids_not_reused_after_delete() {
        let conn = open_memory_database().unwrap();
        let a = insert_producer(&conn, &fields("Alpha Wind", "Wind")).unwrap();
        let b = insert_producer(&conn, &fields("Beta Hydro", "Hydro")).unwrap();
        assert_eq!(delete_producer(&conn, b).unwrap(), 1);
        let c = insert_producer(&conn, &fields("Gamma Solar", "Solar")).unwrap();
        assert!(c > b, "AUTOINCREMENT must not hand out {b} again (got {c}, first was {a})");
    }

    #[test]
    fn get_all_in_insertion_order() {
        let conn = open_memory_database().unwrap();
        insert_producer(&conn, &fields("Zeta", "")).unwrap();
        insert_producer(&conn, &fields("Alpha", "")).unwrap();
        let names: Vec<String> = get_all_producers(&conn)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn null_columns_read_as_empty() {
        let conn = open_memory_database().unwrap();
        conn.execute("INSERT INTO producers (name) VALUES ('Bare')", []).unwrap();
        let p = &get_all_producers(&conn).unwrap()[0];
        assert_eq!(p.contact, "");
        assert_eq!(p.category, "");
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let conn = open_memory_database().unwrap();
        insert_producer(&conn, &fields("Nordic Power", "Renewable Energy")).unwrap();
        insert_producer(&conn, &fields("Coal Corp", "Fossil")).unwrap();
        let hits = search_producers(&conn, SearchField::Category, "ENER").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Nordic Power");
    }

    #[test]
    fn search_wildcards_match_literally() {
        let conn = open_memory_database().unwrap();
        insert_producer(&conn, &fields("100% Green", "")).unwrap();
        insert_producer(&conn, &fields("Green Grid", "")).unwrap();
        let hits = search_producers(&conn, SearchField::Name, "%").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "100% Green");
    }

    #[test]
    fn name_taken_respects_exclusion() {
        let conn = open_memory_database().unwrap();
        let id = insert_producer(&conn, &fields("Solaris", "")).unwrap();
        assert!(name_taken(&conn, "Solaris", None).unwrap());
        assert!(!name_taken(&conn, "Solaris", Some(id)).unwrap());
        assert!(!name_taken(&conn, "solaris", None).unwrap());
    }

    #[test]
    fn update_and_delete_report_missing_rows() {
        let conn = open_memory_database().unwrap();
        assert_eq!(update_producer(&conn, 42, &fields("X", "")).unwrap(), 0);
        assert_eq!(delete_producer(&conn, 42).unwrap(), 0);
        assert!(get_producer(&conn, 42).unwrap().is_none());
    }
}
