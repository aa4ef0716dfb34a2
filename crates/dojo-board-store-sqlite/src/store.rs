// crates/dojo-board-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Exam Store
// Description: Durable ExamStore backed by SQLite WAL.
// Purpose: Persist exam snapshots with compare-and-swap saves and integrity
//          verified loads.
// Dependencies: dojo-board-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`ExamStore`] using `SQLite`. Each save
//! runs inside one write transaction: the stored version is compared against
//! the caller's expected version, and the canonical JSON snapshot is only
//! written when the check holds. That single transaction is what gives the
//! engine its per-exam atomicity. Snapshots are kept in an append-only
//! version table; loads verify stored hashes and fail closed on corruption.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use dojo_board_core::Exam;
use dojo_board_core::ExamId;
use dojo_board_core::ExamStore;
use dojo_board_core::StoreError;
use dojo_board_core::VersionedExam;
use dojo_board_core::hashing::DEFAULT_HASH_ALGORITHM;
use dojo_board_core::hashing::HashAlgorithm;
use dojo_board_core::hashing::canonical_json_bytes;
use dojo_board_core::hashing::hash_bytes;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::params;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum exam snapshot size accepted by the store.
pub const MAX_EXAM_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` exam store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
/// - `max_versions`, when set, must be greater than zero.
/// - `read_pool_size` must be greater than zero.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Optional maximum versions per exam (older versions pruned on save).
    #[serde(default)]
    pub max_versions: Option<u64>,
    /// Number of read-only connections used for read path isolation.
    #[serde(default = "default_read_pool_size")]
    pub read_pool_size: usize,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default read connection pool size.
const fn default_read_pool_size() -> usize {
    4
}

/// Validates runtime limits in the store configuration.
fn validate_runtime_limits(config: &SqliteStoreConfig) -> Result<(), SqliteStoreError> {
    if config.read_pool_size == 0 {
        return Err(SqliteStoreError::Invalid(
            "read_pool_size must be greater than zero".to_string(),
        ));
    }
    if let Some(max_versions) = config.max_versions
        && max_versions == 0
    {
        return Err(SqliteStoreError::Invalid(
            "max_versions must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding raw exam payloads.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or hash mismatch.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Store payload exceeded configured size limits.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
    /// Insert failed because the exam identifier already exists.
    #[error("sqlite store conflict: exam {0} already exists")]
    Conflict(String),
    /// Compare-and-swap failed: the stored version moved past the expected one.
    #[error("sqlite store version conflict for exam {exam_id}: expected {expected}")]
    VersionConflict {
        /// Contended exam identifier.
        exam_id: String,
        /// Version the caller expected to replace.
        expected: u64,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) | SqliteStoreError::Invalid(message) => {
                Self::Invalid(message)
            }
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "exam_json exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
            SqliteStoreError::Conflict(exam_id) => Self::Conflict(ExamId::new(exam_id)),
            SqliteStoreError::VersionConflict {
                exam_id,
                expected,
            } => Self::VersionConflict {
                exam_id: ExamId::new(exam_id),
                expected,
            },
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed exam store with WAL support.
///
/// # Invariants
/// - Exam loads verify stored hashes before deserialization.
/// - Writes are serialized through a single mutex-guarded connection; the
///   version check and the snapshot write share one transaction.
#[derive(Clone)]
pub struct SqliteExamStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared writer connection guarded by a mutex.
    write_connection: Arc<Mutex<Connection>>,
    /// Read-only connection pool used for read path isolation under WAL.
    read_connections: Arc<Vec<Mutex<Connection>>>,
    /// Round-robin cursor for read connection selection.
    read_cursor: Arc<AtomicUsize>,
}

/// Summary metadata for a stored exam snapshot version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamVersionSummary {
    /// Stored version number.
    pub version: i64,
    /// Timestamp when the version was saved (unix milliseconds).
    pub saved_at: i64,
    /// Stored snapshot hash.
    pub exam_hash: String,
    /// Stored hash algorithm label.
    pub hash_algorithm: String,
    /// Stored payload length in bytes.
    pub exam_bytes: usize,
}

/// Raw payload for a stored exam snapshot.
#[derive(Debug)]
struct ExamPayload {
    /// Stored version number.
    version: i64,
    /// Stored JSON bytes for the exam.
    bytes: Vec<u8>,
    /// Stored hash value.
    hash_value: String,
    /// Stored hash algorithm label.
    hash_algorithm: String,
}

impl SqliteExamStore {
    /// Opens an `SQLite`-backed exam store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        validate_runtime_limits(&config)?;
        let mut write_connection = open_connection(&config)?;
        initialize_schema(&mut write_connection)?;
        let mut read_connections = Vec::with_capacity(config.read_pool_size);
        for _ in 0 .. config.read_pool_size {
            let read_connection = open_connection(&config)?;
            read_connections.push(Mutex::new(read_connection));
        }
        Ok(Self {
            config,
            write_connection: Arc::new(Mutex::new(write_connection)),
            read_connections: Arc::new(read_connections),
            read_cursor: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Returns the next read connection using round-robin selection.
    fn read_connection(&self) -> &Mutex<Connection> {
        let len = self.read_connections.len();
        let index = self.read_cursor.fetch_add(1, Ordering::Relaxed) % len;
        &self.read_connections[index]
    }

    /// Verifies the store can execute a simple SQL statement.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if a mutex is poisoned or the query fails.
    fn check_connection(&self) -> Result<(), SqliteStoreError> {
        {
            let guard = self
                .read_connection()
                .lock()
                .map_err(|_| SqliteStoreError::Io("sqlite read mutex poisoned".to_string()))?;
            guard
                .query_row("SELECT 1", [], |_| Ok(()))
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        let guard = self
            .write_connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite write mutex poisoned".to_string()))?;
        guard
            .query_row("SELECT 1", [], |_| Ok(()))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Loads and verifies the latest snapshot of an exam.
    fn load_exam(&self, exam_id: &ExamId) -> Result<Option<VersionedExam>, SqliteStoreError> {
        let payload = {
            let guard = self
                .read_connection()
                .lock()
                .map_err(|_| SqliteStoreError::Io("sqlite read mutex poisoned".to_string()))?;
            fetch_latest_payload(&guard, exam_id.as_str())?
        };
        let Some(payload) = payload else {
            return Ok(None);
        };
        let exam = decode_payload(exam_id.as_str(), &payload)?;
        let version = u64::try_from(payload.version).map_err(|_| {
            SqliteStoreError::Corrupt(format!("negative version for exam {exam_id}"))
        })?;
        Ok(Some(VersionedExam {
            version,
            exam,
        }))
    }

    /// Saves an exam snapshot with compare-and-swap semantics.
    fn save_exam(
        &self,
        exam: &Exam,
        expected_version: Option<u64>,
    ) -> Result<u64, SqliteStoreError> {
        let exam_json = canonical_json_bytes(exam)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        if exam_json.len() > MAX_EXAM_BYTES {
            return Err(SqliteStoreError::TooLarge {
                max_bytes: MAX_EXAM_BYTES,
                actual_bytes: exam_json.len(),
            });
        }
        let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, &exam_json);
        let saved_at = unix_millis();
        let exam_id = exam.exam_id.as_str();

        let mut guard = self
            .write_connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite write mutex poisoned".to_string()))?;
        let tx = guard
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let current: Option<i64> = tx
            .query_row("SELECT version FROM exams WHERE exam_id = ?1", params![exam_id], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let new_version = match (current, expected_version) {
            (Some(_), None) => {
                return Err(SqliteStoreError::Conflict(exam_id.to_string()));
            }
            (None, None) => {
                tx.execute(
                    "INSERT INTO exams (exam_id, version) VALUES (?1, ?2)",
                    params![exam_id, 1_i64],
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                1_i64
            }
            (stored, Some(expected)) => {
                let expected_i64 = i64::try_from(expected).map_err(|_| {
                    SqliteStoreError::Invalid(format!("expected version out of range: {expected}"))
                })?;
                if stored != Some(expected_i64) {
                    return Err(SqliteStoreError::VersionConflict {
                        exam_id: exam_id.to_string(),
                        expected,
                    });
                }
                let next = expected_i64 + 1;
                tx.execute(
                    "UPDATE exams SET version = ?2 WHERE exam_id = ?1",
                    params![exam_id, next],
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                next
            }
        };
        tx.execute(
            "INSERT INTO exam_versions (exam_id, version, exam_json, exam_hash, hash_algorithm, \
             saved_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                exam_id,
                new_version,
                exam_json,
                digest.value,
                hash_algorithm_label(digest.algorithm),
                saved_at
            ],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        enforce_retention(&tx, exam_id, new_version, self.config.max_versions)?;
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        u64::try_from(new_version)
            .map_err(|_| SqliteStoreError::Invalid("version overflowed u64".to_string()))
    }

    /// Deletes an exam after verifying the expected version.
    fn delete_exam(
        &self,
        exam_id: &ExamId,
        expected_version: u64,
    ) -> Result<(), SqliteStoreError> {
        let expected_i64 = i64::try_from(expected_version).map_err(|_| {
            SqliteStoreError::Invalid(format!("expected version out of range: {expected_version}"))
        })?;
        let mut guard = self
            .write_connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite write mutex poisoned".to_string()))?;
        let tx = guard
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let current: Option<i64> = tx
            .query_row(
                "SELECT version FROM exams WHERE exam_id = ?1",
                params![exam_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        match current {
            None => {
                return Err(SqliteStoreError::Invalid(format!("exam not stored: {exam_id}")));
            }
            Some(version) if version != expected_i64 => {
                return Err(SqliteStoreError::VersionConflict {
                    exam_id: exam_id.as_str().to_string(),
                    expected: expected_version,
                });
            }
            Some(_) => {}
        }
        tx.execute("DELETE FROM exams WHERE exam_id = ?1", params![exam_id.as_str()])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        Ok(())
    }

    /// Loads and verifies the latest snapshot of every stored exam.
    fn list_exams(&self) -> Result<Vec<Exam>, SqliteStoreError> {
        let payloads = {
            let guard = self
                .read_connection()
                .lock()
                .map_err(|_| SqliteStoreError::Io("sqlite read mutex poisoned".to_string()))?;
            let mut stmt = guard
                .prepare(
                    "SELECT exams.exam_id, exam_versions.version, exam_versions.exam_json, \
                     exam_versions.exam_hash, exam_versions.hash_algorithm
                     FROM exams
                     JOIN exam_versions
                       ON exams.exam_id = exam_versions.exam_id
                      AND exams.version = exam_versions.version
                     ORDER BY exams.exam_id",
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let rows = stmt
                .query_map([], |row| {
                    let exam_id: String = row.get(0)?;
                    let version: i64 = row.get(1)?;
                    let bytes: Vec<u8> = row.get(2)?;
                    let hash_value: String = row.get(3)?;
                    let hash_algorithm: String = row.get(4)?;
                    Ok((exam_id, ExamPayload {
                        version,
                        bytes,
                        hash_value,
                        hash_algorithm,
                    }))
                })
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let mut payloads = Vec::new();
            for row in rows {
                payloads.push(row.map_err(|err| SqliteStoreError::Db(err.to_string()))?);
            }
            payloads
        };
        let mut exams = Vec::with_capacity(payloads.len());
        for (exam_id, payload) in &payloads {
            exams.push(decode_payload(exam_id, payload)?);
        }
        Ok(exams)
    }

    /// Lists all stored snapshot versions for an exam, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the query fails or a stored length is
    /// out of range.
    pub fn list_versions(
        &self,
        exam_id: &ExamId,
    ) -> Result<Vec<ExamVersionSummary>, SqliteStoreError> {
        let guard = self
            .read_connection()
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite read mutex poisoned".to_string()))?;
        let mut stmt = guard
            .prepare(
                "SELECT version, saved_at, exam_hash, hash_algorithm, length(exam_json) FROM \
                 exam_versions WHERE exam_id = ?1 ORDER BY version DESC",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let rows = stmt
            .query_map(params![exam_id.as_str()], |row| {
                let version: i64 = row.get(0)?;
                let saved_at: i64 = row.get(1)?;
                let exam_hash: String = row.get(2)?;
                let hash_algorithm: String = row.get(3)?;
                let length: i64 = row.get(4)?;
                Ok((version, saved_at, exam_hash, hash_algorithm, length))
            })
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut results = Vec::new();
        for row in rows {
            let (version, saved_at, exam_hash, hash_algorithm, length) =
                row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let length = usize::try_from(length).map_err(|_| {
                SqliteStoreError::Invalid(format!("negative snapshot length for exam {exam_id}"))
            })?;
            results.push(ExamVersionSummary {
                version,
                saved_at,
                exam_hash,
                hash_algorithm,
                exam_bytes: length,
            });
        }
        drop(stmt);
        drop(guard);
        Ok(results)
    }
}

impl ExamStore for SqliteExamStore {
    fn load(&self, exam_id: &ExamId) -> Result<Option<VersionedExam>, StoreError> {
        self.load_exam(exam_id).map_err(StoreError::from)
    }

    fn save(&self, exam: &Exam, expected_version: Option<u64>) -> Result<u64, StoreError> {
        self.save_exam(exam, expected_version).map_err(StoreError::from)
    }

    fn delete(&self, exam_id: &ExamId, expected_version: u64) -> Result<(), StoreError> {
        self.delete_exam(exam_id, expected_version).map_err(StoreError::from)
    }

    fn list(&self) -> Result<Vec<Exam>, StoreError> {
        self.list_exams().map_err(StoreError::from)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.check_connection().map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Fetches the latest stored payload for an exam.
fn fetch_latest_payload(
    connection: &Connection,
    exam_id: &str,
) -> Result<Option<ExamPayload>, SqliteStoreError> {
    connection
        .query_row(
            "SELECT exam_versions.version, exam_versions.exam_json, exam_versions.exam_hash, \
             exam_versions.hash_algorithm
             FROM exams
             JOIN exam_versions
               ON exams.exam_id = exam_versions.exam_id
              AND exams.version = exam_versions.version
             WHERE exams.exam_id = ?1",
            params![exam_id],
            |row| {
                let version: i64 = row.get(0)?;
                let bytes: Vec<u8> = row.get(1)?;
                let hash_value: String = row.get(2)?;
                let hash_algorithm: String = row.get(3)?;
                Ok(ExamPayload {
                    version,
                    bytes,
                    hash_value,
                    hash_algorithm,
                })
            },
        )
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))
}

/// Verifies a stored payload and deserializes the exam, failing closed.
fn decode_payload(exam_id: &str, payload: &ExamPayload) -> Result<Exam, SqliteStoreError> {
    if payload.bytes.len() > MAX_EXAM_BYTES {
        return Err(SqliteStoreError::TooLarge {
            max_bytes: MAX_EXAM_BYTES,
            actual_bytes: payload.bytes.len(),
        });
    }
    let algorithm = parse_hash_algorithm(&payload.hash_algorithm)?;
    let expected = hash_bytes(algorithm, &payload.bytes);
    if expected.value != payload.hash_value {
        return Err(SqliteStoreError::Corrupt(format!("hash mismatch for exam {exam_id}")));
    }
    let exam: Exam = serde_json::from_slice(&payload.bytes)
        .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    if exam.exam_id.as_str() != exam_id {
        return Err(SqliteStoreError::Invalid(
            "exam_id mismatch between key and payload".to_string(),
        ));
    }
    Ok(exam)
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS exams (
                    exam_id TEXT NOT NULL,
                    version INTEGER NOT NULL,
                    PRIMARY KEY (exam_id)
                );
                CREATE TABLE IF NOT EXISTS exam_versions (
                    exam_id TEXT NOT NULL,
                    version INTEGER NOT NULL,
                    exam_json BLOB NOT NULL,
                    exam_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL,
                    saved_at INTEGER NOT NULL,
                    PRIMARY KEY (exam_id, version),
                    FOREIGN KEY (exam_id)
                        REFERENCES exams(exam_id) ON DELETE CASCADE
                );
                CREATE INDEX IF NOT EXISTS idx_exam_versions_exam_id
                    ON exam_versions (exam_id);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Enforces version retention if configured.
fn enforce_retention(
    tx: &Transaction<'_>,
    exam_id: &str,
    latest_version: i64,
    max_versions: Option<u64>,
) -> Result<(), SqliteStoreError> {
    let Some(max_versions) = max_versions else {
        return Ok(());
    };
    let max_versions = i64::try_from(max_versions)
        .map_err(|_| SqliteStoreError::Invalid("max_versions too large".to_string()))?;
    if latest_version > max_versions {
        let min_version = latest_version - max_versions + 1;
        tx.execute(
            "DELETE FROM exam_versions WHERE exam_id = ?1 AND version < ?2",
            params![exam_id, min_version],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    }
    Ok(())
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}

/// Returns the canonical hash algorithm label.
const fn hash_algorithm_label(algorithm: HashAlgorithm) -> &'static str {
    match algorithm {
        HashAlgorithm::Sha256 => "sha256",
    }
}

/// Parses a stored hash algorithm label.
fn parse_hash_algorithm(label: &str) -> Result<HashAlgorithm, SqliteStoreError> {
    match label {
        "sha256" => Ok(HashAlgorithm::Sha256),
        other => Err(SqliteStoreError::Invalid(format!("unsupported hash algorithm: {other}"))),
    }
}
