//! SQL dialect differences between the supported backends.

use crate::error::StorageError;

/// Backend selected from the database URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    MySql,
    Sqlite,
}

const MYSQL_CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    message_id    VARCHAR(255) PRIMARY KEY,
    platform_type VARCHAR(50)  NOT NULL,
    self_id       VARCHAR(255) NOT NULL,
    session_id    VARCHAR(255) NOT NULL,
    group_id      VARCHAR(255),
    sender        JSON         NOT NULL,
    message_str   TEXT         NOT NULL,
    raw_message   LONGTEXT     NOT NULL,
    timestamp     BIGINT       NOT NULL,
    INDEX idx_messages_session_id (session_id)
)
"#;

const SQLITE_CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    message_id    TEXT PRIMARY KEY,
    platform_type TEXT    NOT NULL,
    self_id       TEXT    NOT NULL,
    session_id    TEXT    NOT NULL,
    group_id      TEXT,
    sender        TEXT    NOT NULL,
    message_str   TEXT    NOT NULL,
    raw_message   TEXT    NOT NULL,
    timestamp     INTEGER NOT NULL
)
"#;

const SQLITE_CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_messages_session_id ON messages(session_id)";

// MySQL hands JSON columns back as a type the Any driver cannot decode; read it as text.
const MYSQL_COLUMNS: &str = "message_id, platform_type, self_id, session_id, group_id, \
     CAST(sender AS CHAR) AS sender, message_str, raw_message, timestamp";

const SQLITE_COLUMNS: &str = "message_id, platform_type, self_id, session_id, group_id, \
     sender, message_str, raw_message, timestamp";

impl SqlDialect {
    /// Picks the dialect from a connection URL (`mysql://`, `mariadb://`, `sqlite:`).
    pub fn from_url(database_url: &str) -> Result<Self, StorageError> {
        let scheme = database_url
            .split_once(':')
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .unwrap_or_default();

        match scheme.as_str() {
            "mysql" | "mariadb" => Ok(SqlDialect::MySql),
            "sqlite" => Ok(SqlDialect::Sqlite),
            _ => Err(StorageError::UnsupportedUrl(redact_url(database_url))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SqlDialect::MySql => "mysql",
            SqlDialect::Sqlite => "sqlite",
        }
    }

    /// `CREATE TABLE IF NOT EXISTS messages`.
    pub fn create_table_sql(&self) -> &'static str {
        match self {
            SqlDialect::MySql => MYSQL_CREATE_TABLE,
            SqlDialect::Sqlite => SQLITE_CREATE_TABLE,
        }
    }

    /// Separate index statement, if the dialect cannot declare it inline.
    pub fn create_index_sql(&self) -> Option<&'static str> {
        match self {
            SqlDialect::MySql => None,
            SqlDialect::Sqlite => Some(SQLITE_CREATE_INDEX),
        }
    }

    /// Column list for reading rows back into `MessageRecord`.
    pub fn select_columns(&self) -> &'static str {
        match self {
            SqlDialect::MySql => MYSQL_COLUMNS,
            SqlDialect::Sqlite => SQLITE_COLUMNS,
        }
    }
}

/// Drops everything after the scheme so credentials never reach logs or error messages.
pub(crate) fn redact_url(database_url: &str) -> String {
    match database_url.split_once("://") {
        Some((scheme, _)) => format!("{}://***", scheme),
        None => format!("{}:***", database_url.split(':').next().unwrap_or_default()),
    }
}
