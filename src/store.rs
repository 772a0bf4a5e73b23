// 🗄️ Document Store - One JSON document per user, merge-writes, live snapshots
//
// Writes are merge-writes: top-level keys not named in the write survive.
// Last writer wins; there is no version check.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{FinanceError, StoreError};
use crate::sync::{DocumentSnapshot, SubscriberRegistry, Subscription};

/// Storage collaborator: read, merge-write, subscribe
pub trait DocumentStore: Send + Sync {
    fn read(&self, user_id: &str) -> Result<DocumentSnapshot, StoreError>;

    /// Merge `fields` into the user's document, creating it if absent
    fn merge_write(&self, user_id: &str, fields: Map<String, Value>) -> Result<(), StoreError>;

    /// Current snapshot first, then one item per later write
    fn subscribe(&self, user_id: &str) -> Subscription;
}

// ============================================================================
// SQLITE STORE
// ============================================================================

pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
    subscribers: Arc<SubscriberRegistry>,
}

impl SqliteDocumentStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "document store opened");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        setup_database(&conn)?;
        Ok(SqliteDocumentStore {
            conn: Mutex::new(conn),
            subscribers: SubscriberRegistry::new(),
        })
    }

    pub fn subscriber_count(&self, user_id: &str) -> usize {
        self.subscribers.subscriber_count(user_id)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))
    }
}

pub fn setup_database(conn: &Connection) -> Result<(), StoreError> {
    // WAL for crash recovery (in-memory databases silently keep "memory")
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            user_id TEXT PRIMARY KEY,
            body TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

fn read_document(conn: &Connection, user_id: &str) -> Result<DocumentSnapshot, StoreError> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM documents WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()?;

    let Some(body) = body else {
        return Ok(DocumentSnapshot::Absent);
    };

    match serde_json::from_str::<Value>(&body) {
        Ok(Value::Object(doc)) => Ok(DocumentSnapshot::Exists(doc)),
        _ => Err(StoreError::Corrupt(user_id.to_string())),
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn read(&self, user_id: &str) -> Result<DocumentSnapshot, StoreError> {
        let conn = self.lock()?;
        read_document(&conn, user_id)
    }

    fn merge_write(&self, user_id: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut doc = match read_document(&tx, user_id) {
            Ok(DocumentSnapshot::Exists(doc)) => doc,
            Ok(DocumentSnapshot::Absent) => Map::new(),
            Err(StoreError::Corrupt(_)) => {
                warn!(user_id, "replacing unreadable document body");
                Map::new()
            }
            Err(e) => return Err(e),
        };

        for (key, value) in fields {
            doc.insert(key, value);
        }

        let body = serde_json::to_string(&doc)?;
        tx.execute(
            "INSERT INTO documents (user_id, body, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
            params![user_id, body, Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;

        // Still holding the connection lock, so deliveries keep write order
        let delivered = self
            .subscribers
            .publish(user_id, &Ok(DocumentSnapshot::Exists(doc)));
        debug!(user_id, delivered, "document written");

        Ok(())
    }

    fn subscribe(&self, user_id: &str) -> Subscription {
        match self.lock() {
            Ok(conn) => {
                let initial = read_document(&conn, user_id)
                    .map_err(|e| FinanceError::StorageRead(e.to_string()));
                self.subscribers.register(user_id, initial)
            }
            Err(e) => self
                .subscribers
                .register(user_id, Err(FinanceError::StorageRead(e.to_string()))),
        }
    }
}
