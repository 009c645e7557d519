// crates/conforma-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Resource Repository
// Description: Durable ResourceRepository backed by SQLite WAL.
// Purpose: Persist resource rows, dependents, and access rules relationally.
// Dependencies: conforma-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`ResourceRepository`] using `SQLite`.
//! Every mutation runs inside one transaction with validation and referential
//! checks up front, so a rejected submission leaves no partial write behind.
//! Snapshots serialize full state in canonical row order (surrogate id
//! ascending) and hash it through the same canonical JSON path as the
//! in-memory registry, so both backends produce comparable digests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use conforma_core::AccessRule;
use conforma_core::ConformanceSnapshot;
use conforma_core::DependentKind;
use conforma_core::DependentRecord;
use conforma_core::FieldMap;
use conforma_core::NameViolation;
use conforma_core::PermissionLevel;
use conforma_core::RegistryState;
use conforma_core::ResourceId;
use conforma_core::ResourceName;
use conforma_core::ResourceRecord;
use conforma_core::TagFilter;
use conforma_core::Vocabulary;
use conforma_core::interfaces::RepositoryError;
use conforma_core::interfaces::ResourceRepository;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::params;
use serde::Deserialize;
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

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
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

/// Configuration for the `SQLite` resource repository.
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
}

impl SqliteStoreConfig {
    /// Creates a configuration with defaults for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for RepositoryError {
    fn from(error: SqliteStoreError) -> Self {
        Self::Store(error.to_string())
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed resource repository with WAL support.
#[derive(Clone)]
pub struct SqliteRegistry {
    /// Message vocabulary for validation and refusal messages.
    vocab: Vocabulary,
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteRegistry {
    /// Opens an `SQLite`-backed resource repository.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn open(config: &SqliteStoreConfig, vocab: Vocabulary) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            vocab,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Imports full registry state, replacing any existing rows. Fixture
    /// loading for suite runs.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Store`] when the import fails.
    pub fn import(&mut self, state: &RegistryState) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_err)?;
        tx.execute_batch(
            "DELETE FROM tag_filters; DELETE FROM access_rules; DELETE FROM dependents; DELETE \
             FROM resources;",
        )
        .map_err(db_err)?;
        for record in &state.resources {
            tx.execute(
                "INSERT INTO resources (id, name, internal, discovered) VALUES (?1, ?2, ?3, ?4)",
                params![
                    to_i64(record.id.value())?,
                    record.name.as_str(),
                    i64::from(record.internal),
                    i64::from(record.discovered)
                ],
            )
            .map_err(db_err)?;
        }
        for dependent in &state.dependents {
            tx.execute(
                "INSERT INTO dependents (resource_id, kind, name) VALUES (?1, ?2, ?3)",
                params![
                    to_i64(dependent.resource_id.value())?,
                    kind_label(dependent.kind),
                    dependent.name
                ],
            )
            .map_err(db_err)?;
        }
        for rule in &state.access_rules {
            insert_rule(&tx, rule)?;
        }
        tx.commit().map_err(db_err)?;
        drop(guard);
        Ok(())
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.connection
            .lock()
            .map_err(|_| RepositoryError::Store("sqlite connection mutex poisoned".to_string()))
    }

    /// Extracts and validates the name field from a submission.
    fn validated_name(&self, fields: &FieldMap) -> Result<ResourceName, RepositoryError> {
        let raw = fields.get_or(&self.vocab.field_label, "");
        let name = ResourceName::new(raw).normalized();
        match name.validate() {
            Ok(()) => Ok(name),
            Err(NameViolation::Empty) => {
                Err(RepositoryError::Validation(self.vocab.cannot_be_empty()))
            }
            Err(NameViolation::InvalidSegment) => {
                Err(RepositoryError::Validation(self.vocab.invalid_name()))
            }
        }
    }

    /// Returns the nearest existing ancestor carrying an access rule.
    fn nearest_ruled_ancestor(
        conn: &Connection,
        name: &ResourceName,
    ) -> Result<Option<AccessRule>, RepositoryError> {
        let mut cursor = name.parent();
        while let Some(ancestor) = cursor {
            if find_by_name(conn, &ancestor)?.is_some()
                && let Some(rule) = load_rule(conn, &ancestor)?
            {
                return Ok(Some(rule));
            }
            cursor = ancestor.parent();
        }
        Ok(None)
    }
}

impl ResourceRepository for SqliteRegistry {
    fn create(&mut self, fields: &FieldMap) -> Result<ResourceRecord, RepositoryError> {
        let name = self.validated_name(fields)?;
        let vocab = self.vocab.clone();
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_err)?;
        if find_by_name(&tx, &name)?.is_some() {
            return Err(RepositoryError::Validation(vocab.already_exists(name.as_str())));
        }
        let inherited = Self::nearest_ruled_ancestor(&tx, &name)?;
        tx.execute(
            "INSERT INTO resources (name, internal, discovered) VALUES (?1, 0, 0)",
            params![name.as_str()],
        )
        .map_err(db_err)?;
        let id = tx.last_insert_rowid();
        if let Some(rule) = inherited {
            insert_rule(&tx, &AccessRule {
                resource: name.clone(),
                permission: rule.permission,
                tag_filters: rule.tag_filters,
            })?;
        }
        tx.commit().map_err(db_err)?;
        drop(guard);
        Ok(ResourceRecord::new(ResourceId::new(to_u64(id)?), name))
    }

    fn read(&self, name: &ResourceName) -> Result<Option<ResourceRecord>, RepositoryError> {
        let guard = self.lock()?;
        find_by_name(&guard, name)
    }

    fn rename(
        &mut self,
        name: &ResourceName,
        fields: &FieldMap,
    ) -> Result<ResourceRecord, RepositoryError> {
        let new_name = self.validated_name(fields)?;
        let vocab = self.vocab.clone();
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_err)?;
        let record =
            find_by_name(&tx, name)?.ok_or_else(|| RepositoryError::NotFound(name.clone()))?;
        if new_name != record.name && find_by_name(&tx, &new_name)?.is_some() {
            return Err(RepositoryError::Validation(vocab.already_exists(new_name.as_str())));
        }
        tx.execute(
            "UPDATE resources SET name = ?1 WHERE id = ?2",
            params![new_name.as_str(), to_i64(record.id.value())?],
        )
        .map_err(db_err)?;
        // Access rules key on the name; the tag_filters FK cascades the
        // rename.
        tx.execute(
            "UPDATE access_rules SET resource_name = ?1 WHERE resource_name = ?2",
            params![new_name.as_str(), record.name.as_str()],
        )
        .map_err(db_err)?;
        tx.commit().map_err(db_err)?;
        drop(guard);
        Ok(ResourceRecord {
            id: record.id,
            name: new_name,
            internal: record.internal,
            discovered: record.discovered,
        })
    }

    fn delete(&mut self, name: &ResourceName) -> Result<(), RepositoryError> {
        let vocab = self.vocab.clone();
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_err)?;
        let record =
            find_by_name(&tx, name)?.ok_or_else(|| RepositoryError::NotFound(name.clone()))?;
        if record.internal {
            return Err(RepositoryError::Validation(
                vocab.internal_resource(record.name.as_str()),
            ));
        }
        let mut blocking = load_dependents(&tx, record.id)?;
        blocking.sort();
        if let Some(first) = blocking.first() {
            return Err(RepositoryError::ReferentialIntegrity(vocab.deletion_blocked(
                first.kind,
                &record.name,
                &first.name,
            )));
        }
        tx.execute(
            "DELETE FROM tag_filters WHERE resource_name = ?1",
            params![record.name.as_str()],
        )
        .map_err(db_err)?;
        tx.execute(
            "DELETE FROM access_rules WHERE resource_name = ?1",
            params![record.name.as_str()],
        )
        .map_err(db_err)?;
        tx.execute("DELETE FROM resources WHERE id = ?1", params![to_i64(record.id.value())?])
            .map_err(db_err)?;
        tx.commit().map_err(db_err)?;
        drop(guard);
        Ok(())
    }

    fn list(&self) -> Result<Vec<ResourceRecord>, RepositoryError> {
        let guard = self.lock()?;
        load_resources(&guard)
    }

    fn count(&self, name: &ResourceName) -> Result<usize, RepositoryError> {
        let guard = self.lock()?;
        let count: i64 = guard
            .query_row(
                "SELECT COUNT(*) FROM resources WHERE name = ?1",
                params![name.normalized().as_str()],
                |row| row.get(0),
            )
            .map_err(db_err)?;
        usize::try_from(count)
            .map_err(|_| RepositoryError::Store("negative row count".to_string()))
    }

    fn dependents_of(
        &self,
        name: &ResourceName,
    ) -> Result<Vec<DependentRecord>, RepositoryError> {
        let guard = self.lock()?;
        let Some(record) = find_by_name(&guard, name)? else {
            return Ok(Vec::new());
        };
        let mut rows = load_dependents(&guard, record.id)?;
        rows.sort();
        Ok(rows)
    }

    fn access_rules(&self) -> Result<Vec<AccessRule>, RepositoryError> {
        let guard = self.lock()?;
        load_rules(&guard)
    }

    fn snapshot(&self) -> Result<ConformanceSnapshot, RepositoryError> {
        let guard = self.lock()?;
        let resources = load_resources(&guard)?;
        let mut dependents = Vec::new();
        for record in &resources {
            dependents.extend(load_dependents(&guard, record.id)?);
        }
        dependents.sort();
        let access_rules = load_rules(&guard)?;
        drop(guard);
        let state = RegistryState {
            resources,
            dependents,
            access_rules,
        };
        Ok(ConformanceSnapshot::capture(&state)?)
    }

    fn apply_hierarchy_propagation(
        &mut self,
        ancestor: &ResourceName,
    ) -> Result<(), RepositoryError> {
        let ancestor = ancestor.normalized();
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_err)?;
        if find_by_name(&tx, &ancestor)?.is_none() {
            return Err(RepositoryError::NotFound(ancestor));
        }
        let rule = load_rule(&tx, &ancestor)?;
        let descendants: Vec<ResourceName> = load_resources(&tx)?
            .into_iter()
            .filter(|record| record.name.is_descendant_of(&ancestor))
            .map(|record| record.name)
            .collect();
        for name in descendants {
            tx.execute(
                "DELETE FROM tag_filters WHERE resource_name = ?1",
                params![name.as_str()],
            )
            .map_err(db_err)?;
            tx.execute(
                "DELETE FROM access_rules WHERE resource_name = ?1",
                params![name.as_str()],
            )
            .map_err(db_err)?;
            if let Some(rule) = &rule {
                insert_rule(&tx, &AccessRule {
                    resource: name,
                    permission: rule.permission,
                    tag_filters: rule.tag_filters.clone(),
                })?;
            }
        }
        tx.commit().map_err(db_err)?;
        drop(guard);
        Ok(())
    }
}

// ============================================================================
// SECTION: Row Helpers
// ============================================================================

/// Maps a rusqlite error into a repository store error.
fn db_err(err: rusqlite::Error) -> RepositoryError {
    RepositoryError::Store(err.to_string())
}

/// Converts a signed row id into the unsigned surrogate id space.
fn to_u64(value: i64) -> Result<u64, RepositoryError> {
    u64::try_from(value).map_err(|_| RepositoryError::Store("negative row id".to_string()))
}

/// Converts an unsigned surrogate id into the signed `SQLite` id space.
fn to_i64(value: u64) -> Result<i64, RepositoryError> {
    i64::try_from(value).map_err(|_| RepositoryError::Store("row id overflow".to_string()))
}

/// Finds a resource row by normalized name.
fn find_by_name(
    conn: &Connection,
    name: &ResourceName,
) -> Result<Option<ResourceRecord>, RepositoryError> {
    conn.query_row(
        "SELECT id, name, internal, discovered FROM resources WHERE name = ?1",
        params![name.normalized().as_str()],
        row_to_record,
    )
    .optional()
    .map_err(db_err)
}

/// Loads all resource rows in surrogate-id order.
fn load_resources(conn: &Connection) -> Result<Vec<ResourceRecord>, RepositoryError> {
    let mut stmt = conn
        .prepare("SELECT id, name, internal, discovered FROM resources ORDER BY id ASC")
        .map_err(db_err)?;
    let rows = stmt.query_map(params![], row_to_record).map_err(db_err)?;
    let mut records = Vec::new();
    for row in rows {
        records.push(row.map_err(db_err)?);
    }
    Ok(records)
}

/// Maps one resources row to a record.
fn row_to_record(row: &rusqlite::Row<'_>) -> Result<ResourceRecord, rusqlite::Error> {
    let id: i64 = row.get(0)?;
    let name: String = row.get(1)?;
    let internal: i64 = row.get(2)?;
    let discovered: i64 = row.get(3)?;
    Ok(ResourceRecord {
        id: ResourceId::new(id.unsigned_abs()),
        name: ResourceName::new(name),
        internal: internal != 0,
        discovered: discovered != 0,
    })
}

/// Loads dependent join rows for one resource.
fn load_dependents(
    conn: &Connection,
    resource_id: ResourceId,
) -> Result<Vec<DependentRecord>, RepositoryError> {
    let mut stmt = conn
        .prepare("SELECT kind, name FROM dependents WHERE resource_id = ?1")
        .map_err(db_err)?;
    let rows = stmt
        .query_map(params![to_i64(resource_id.value())?], |row| {
            let kind: String = row.get(0)?;
            let name: String = row.get(1)?;
            Ok((kind, name))
        })
        .map_err(db_err)?;
    let mut records = Vec::new();
    for row in rows {
        let (kind, name) = row.map_err(db_err)?;
        records.push(DependentRecord {
            resource_id,
            kind: parse_kind(&kind)?,
            name,
        });
    }
    Ok(records)
}

/// Loads the access rule for one resource name, when any.
fn load_rule(
    conn: &Connection,
    name: &ResourceName,
) -> Result<Option<AccessRule>, RepositoryError> {
    let permission: Option<String> = conn
        .query_row(
            "SELECT permission FROM access_rules WHERE resource_name = ?1",
            params![name.as_str()],
            |row| row.get(0),
        )
        .optional()
        .map_err(db_err)?;
    let Some(permission) = permission else {
        return Ok(None);
    };
    Ok(Some(AccessRule {
        resource: name.clone(),
        permission: parse_permission(&permission)?,
        tag_filters: load_filters(conn, name)?,
    }))
}

/// Loads all access rules in resource-name order.
fn load_rules(conn: &Connection) -> Result<Vec<AccessRule>, RepositoryError> {
    let mut stmt = conn
        .prepare("SELECT resource_name, permission FROM access_rules ORDER BY resource_name ASC")
        .map_err(db_err)?;
    let rows = stmt
        .query_map(params![], |row| {
            let name: String = row.get(0)?;
            let permission: String = row.get(1)?;
            Ok((name, permission))
        })
        .map_err(db_err)?;
    let mut keyed = Vec::new();
    for row in rows {
        keyed.push(row.map_err(db_err)?);
    }
    let mut rules = Vec::new();
    for (name, permission) in keyed {
        let resource = ResourceName::new(name);
        rules.push(AccessRule {
            tag_filters: load_filters(conn, &resource)?,
            permission: parse_permission(&permission)?,
            resource,
        });
    }
    // SQLite BINARY collation matches Rust byte order; sort anyway so the
    // canonical order never depends on collation settings.
    rules.sort_by(|a, b| a.resource.cmp(&b.resource));
    Ok(rules)
}

/// Loads tag filters for one resource name in canonical order.
fn load_filters(
    conn: &Connection,
    name: &ResourceName,
) -> Result<Vec<TagFilter>, RepositoryError> {
    let mut stmt = conn
        .prepare(
            "SELECT tag, value FROM tag_filters WHERE resource_name = ?1 ORDER BY tag ASC, value \
             ASC",
        )
        .map_err(db_err)?;
    let rows = stmt
        .query_map(params![name.as_str()], |row| {
            let tag: String = row.get(0)?;
            let value: String = row.get(1)?;
            Ok(TagFilter::new(tag, value))
        })
        .map_err(db_err)?;
    let mut filters = Vec::new();
    for row in rows {
        filters.push(row.map_err(db_err)?);
    }
    Ok(filters)
}

/// Inserts an access rule with its tag filters.
fn insert_rule(tx: &Transaction<'_>, rule: &AccessRule) -> Result<(), RepositoryError> {
    tx.execute(
        "INSERT INTO access_rules (resource_name, permission) VALUES (?1, ?2)",
        params![rule.resource.as_str(), permission_label(rule.permission)],
    )
    .map_err(db_err)?;
    for filter in &rule.tag_filters {
        tx.execute(
            "INSERT INTO tag_filters (resource_name, tag, value) VALUES (?1, ?2, ?3)",
            params![rule.resource.as_str(), filter.tag, filter.value],
        )
        .map_err(db_err)?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Label Mapping
// ============================================================================

/// Returns the stored label for a dependent kind.
const fn kind_label(kind: DependentKind) -> &'static str {
    match kind {
        DependentKind::Host => "host",
        DependentKind::Script => "script",
        DependentKind::Action => "action",
        DependentKind::Maintenance => "maintenance",
        DependentKind::HostPrototype => "host_prototype",
        DependentKind::Correlation => "correlation",
    }
}

/// Parses a stored dependent kind label.
fn parse_kind(label: &str) -> Result<DependentKind, RepositoryError> {
    match label {
        "host" => Ok(DependentKind::Host),
        "script" => Ok(DependentKind::Script),
        "action" => Ok(DependentKind::Action),
        "maintenance" => Ok(DependentKind::Maintenance),
        "host_prototype" => Ok(DependentKind::HostPrototype),
        "correlation" => Ok(DependentKind::Correlation),
        other => Err(RepositoryError::Store(format!("unsupported dependent kind: {other}"))),
    }
}

/// Returns the stored label for a permission level.
const fn permission_label(permission: PermissionLevel) -> &'static str {
    match permission {
        PermissionLevel::None => "none",
        PermissionLevel::Deny => "deny",
        PermissionLevel::Read => "read",
        PermissionLevel::ReadWrite => "read_write",
    }
}

/// Parses a stored permission label.
fn parse_permission(label: &str) -> Result<PermissionLevel, RepositoryError> {
    match label {
        "none" => Ok(PermissionLevel::None),
        "deny" => Ok(PermissionLevel::Deny),
        "read" => Ok(PermissionLevel::Read),
        "read_write" => Ok(PermissionLevel::ReadWrite),
        other => Err(RepositoryError::Store(format!("unsupported permission: {other}"))),
    }
}

// ============================================================================
// SECTION: Connection Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
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
                "CREATE TABLE IF NOT EXISTS resources (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    internal INTEGER NOT NULL DEFAULT 0,
                    discovered INTEGER NOT NULL DEFAULT 0
                );
                CREATE TABLE IF NOT EXISTS dependents (
                    resource_id INTEGER NOT NULL,
                    kind TEXT NOT NULL,
                    name TEXT NOT NULL,
                    FOREIGN KEY (resource_id) REFERENCES resources(id) ON DELETE CASCADE
                );
                CREATE INDEX IF NOT EXISTS idx_dependents_resource_id
                    ON dependents (resource_id);
                CREATE TABLE IF NOT EXISTS access_rules (
                    resource_name TEXT PRIMARY KEY,
                    permission TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS tag_filters (
                    resource_name TEXT NOT NULL,
                    tag TEXT NOT NULL,
                    value TEXT NOT NULL,
                    FOREIGN KEY (resource_name) REFERENCES access_rules(resource_name)
                        ON DELETE CASCADE ON UPDATE CASCADE
                );
                CREATE INDEX IF NOT EXISTS idx_tag_filters_resource_name
                    ON tag_filters (resource_name);",
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
