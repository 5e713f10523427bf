/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A JSON object as stored in the `config`, `content` and `data` columns.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;
