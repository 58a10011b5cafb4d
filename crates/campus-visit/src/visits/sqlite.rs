use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::error;

use super::domain::{
    ApplicationId, AuditTrail, NewVisitRecord, StatusChange, VisitApplication, VisitDetails,
    VisitStatus,
};
use super::filter::{FilterField, FilterOp, Predicate, PredicateSet};
use super::store::{StoreError, VisitStore};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS visit_application (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    visit_date        TEXT    NOT NULL,
    visit_unit        TEXT    NOT NULL,
    visit_nature      INTEGER NOT NULL,
    visit_num         INTEGER NOT NULL,
    visit_car         TEXT,
    contact_name      TEXT    NOT NULL,
    contact_phone     TEXT    NOT NULL,
    time_slot         TEXT,
    status            INTEGER NOT NULL DEFAULT 0,
    commentator_name  TEXT,
    commentator_phone TEXT,
    reject_reason     TEXT,
    del_flag          INTEGER NOT NULL DEFAULT 0,
    create_by         TEXT    NOT NULL,
    create_time       TEXT    NOT NULL,
    update_by         TEXT,
    update_time       TEXT
);
"#;

const COLUMNS: &str = "id, visit_date, visit_unit, visit_nature, visit_num, visit_car, \
    contact_name, contact_phone, time_slot, status, commentator_name, commentator_phone, \
    reject_reason, del_flag, create_by, create_time, update_by, update_time";

/// SQLite-backed store. The connection is shared behind a mutex.
pub struct SqliteVisitStore {
    conn: Mutex<Connection>,
}

impl SqliteVisitStore {
    /// Open (or create) the database file and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)
            .map_err(|e| StoreError::Unavailable(format!("open visit database failed: {e}")))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Unavailable(format!("open visit database failed: {e}")))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| StoreError::Unavailable(format!("apply visit schema failed: {e}")))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("visit database mutex poisoned".to_string()))
    }
}

impl VisitStore for SqliteVisitStore {
    fn insert(&self, record: NewVisitRecord) -> Result<ApplicationId, StoreError> {
        let conn = self.conn()?;
        let NewVisitRecord {
            details,
            create_by,
            create_time,
        } = record;

        conn.execute(
            r#"
            INSERT INTO visit_application (
                visit_date, visit_unit, visit_nature, visit_num, visit_car,
                contact_name, contact_phone, time_slot, status, del_flag,
                create_by, create_time
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10, ?11)
            "#,
            params![
                details.visit_date,
                details.visit_unit,
                details.visit_nature,
                details.visit_num,
                details.visit_car,
                details.contact_name,
                details.contact_phone,
                details.time_slot,
                VisitStatus::Pending.code(),
                create_by,
                create_time,
            ],
        )
        .map_err(unavailable)?;

        Ok(ApplicationId(conn.last_insert_rowid()))
    }

    fn find_by_id(&self, id: ApplicationId) -> Result<Option<VisitApplication>, StoreError> {
        let conn = self.conn()?;
        let sql = format!("SELECT {COLUMNS} FROM visit_application WHERE id = ?1 AND del_flag = 0");
        conn.query_row(&sql, params![id.0], read_application)
            .optional()
            .map_err(unavailable)
    }

    fn update_status_if(
        &self,
        id: ApplicationId,
        expected: VisitStatus,
        change: &StatusChange,
    ) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                r#"
                UPDATE visit_application
                SET status = ?1, commentator_name = ?2, commentator_phone = ?3,
                    reject_reason = ?4, update_by = ?5, update_time = ?6
                WHERE id = ?7 AND status = ?8 AND del_flag = 0
                "#,
                params![
                    change.status.code(),
                    change.commentator_name,
                    change.commentator_phone,
                    change.reject_reason,
                    change.update_by,
                    change.update_time,
                    id.0,
                    expected.code(),
                ],
            )
            .map_err(unavailable)?;

        if changed > 0 {
            return Ok(());
        }

        // Nothing matched: tell a missing row apart from a status mismatch.
        let current: Option<u8> = conn
            .query_row(
                "SELECT status FROM visit_application WHERE id = ?1 AND del_flag = 0",
                params![id.0],
                |row| row.get(0),
            )
            .optional()
            .map_err(unavailable)?;

        match current {
            None => Err(StoreError::NotFound(id)),
            Some(code) => {
                let current = VisitStatus::try_from(code)
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?;
                Err(StoreError::Conflict { id, current })
            }
        }
    }

    fn count(&self, predicates: &PredicateSet) -> Result<u64, StoreError> {
        let conn = self.conn()?;
        let (clause, values) = where_clause(predicates);
        let sql = format!("SELECT COUNT(*) FROM visit_application WHERE {clause}");
        let total: i64 = conn
            .query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))
            .map_err(unavailable)?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    fn list(
        &self,
        predicates: &PredicateSet,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<VisitApplication>, StoreError> {
        let conn = self.conn()?;
        let (clause, mut values) = where_clause(predicates);
        let limit_index = values.len() + 1;
        let offset_index = values.len() + 2;
        values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        values.push(Value::Integer(i64::try_from(offset).unwrap_or(i64::MAX)));

        let sql = format!(
            "SELECT {COLUMNS} FROM visit_application WHERE {clause} \
             ORDER BY id ASC LIMIT ?{limit_index} OFFSET ?{offset_index}"
        );
        let mut stmt = conn.prepare(&sql).map_err(unavailable)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), read_application)
            .map_err(unavailable)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(unavailable)?);
        }
        Ok(out)
    }

    fn soft_delete(&self, id: ApplicationId) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE visit_application SET del_flag = 1 WHERE id = ?1 AND del_flag = 0",
                params![id.0],
            )
            .map_err(unavailable)?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

fn unavailable(err: rusqlite::Error) -> StoreError {
    error!(error = %err, "visit database call failed");
    StoreError::Unavailable(err.to_string())
}

fn column(field: FilterField) -> &'static str {
    match field {
        FilterField::VisitUnit => "visit_unit",
        FilterField::ContactName => "contact_name",
        FilterField::ContactPhone => "contact_phone",
    }
}

/// Render the predicate list as a parameterized `WHERE` body.
fn where_clause(predicates: &PredicateSet) -> (String, Vec<Value>) {
    let mut clauses = Vec::with_capacity(predicates.len());
    let mut values = Vec::new();

    for predicate in predicates.iter() {
        match predicate {
            Predicate::NotDeleted => clauses.push("del_flag = 0".to_string()),
            Predicate::Field { field, op, value } => {
                let column = column(*field);
                let index = values.len() + 1;
                clauses.push(match op {
                    FilterOp::Equals => format!("{column} = ?{index}"),
                    FilterOp::Contains => format!("instr(lower({column}), lower(?{index})) > 0"),
                });
                values.push(Value::Text(value.clone()));
            }
        }
    }

    if clauses.is_empty() {
        return ("1 = 1".to_string(), values);
    }
    (clauses.join(" AND "), values)
}

fn read_application(row: &Row<'_>) -> rusqlite::Result<VisitApplication> {
    let status_code: u8 = row.get("status")?;
    let status = VisitStatus::try_from(status_code)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Integer, Box::new(e)))?;
    let del_flag: i64 = row.get("del_flag")?;

    Ok(VisitApplication {
        id: ApplicationId(row.get("id")?),
        details: VisitDetails {
            visit_date: row.get("visit_date")?,
            visit_unit: row.get("visit_unit")?,
            visit_nature: row.get("visit_nature")?,
            visit_num: row.get("visit_num")?,
            visit_car: row.get("visit_car")?,
            contact_name: row.get("contact_name")?,
            contact_phone: row.get("contact_phone")?,
            time_slot: row.get("time_slot")?,
        },
        status,
        audit: AuditTrail {
            commentator_name: row.get("commentator_name")?,
            commentator_phone: row.get("commentator_phone")?,
            reject_reason: row.get("reject_reason")?,
            update_by: row.get("update_by")?,
            update_time: row.get("update_time")?,
        },
        deleted: del_flag != 0,
        create_by: row.get("create_by")?,
        create_time: row.get("create_time")?,
    })
}
