//! SQLite schema for the local record store.
//!
//! Every entity kind shares one `records` table. Kind-specific fields live in
//! `fields_json`; owner and timestamps are real columns so scoping and
//! ordering never touch JSON. `store_meta` is a single-row table tracking the
//! schema version alongside `PRAGMA user_version`.

/// Migration v1: records table plus store metadata.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS records (
    kind TEXT NOT NULL CHECK (length(trim(kind)) > 0),
    record_id TEXT NOT NULL CHECK (length(trim(record_id)) > 0),
    owner_id TEXT NOT NULL,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER,
    fields_json TEXT NOT NULL DEFAULT '{}' CHECK (json_valid(fields_json)),
    PRIMARY KEY (kind, record_id)
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL,
    created_at_us INTEGER NOT NULL DEFAULT 0
);

INSERT OR IGNORE INTO store_meta (id, schema_version, created_at_us)
VALUES (1, 1, CAST(strftime('%s', 'now') AS INTEGER) * 1000000);
";

/// Migration v2: read-path indexes for owner listings and parent lookups.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_records_owner_created
    ON records(kind, owner_id, created_at_us DESC);

CREATE INDEX IF NOT EXISTS idx_records_owner_updated
    ON records(kind, owner_id, updated_at_us DESC);

CREATE INDEX IF NOT EXISTS idx_records_ticket
    ON records(kind, json_extract(fields_json, '$.ticket_id'));

CREATE INDEX IF NOT EXISTS idx_records_channel
    ON records(kind, json_extract(fields_json, '$.channel_id'));

CREATE INDEX IF NOT EXISTS idx_records_project
    ON records(kind, json_extract(fields_json, '$.project_id'));

CREATE INDEX IF NOT EXISTS idx_records_email
    ON records(kind, json_extract(fields_json, '$.email'));
";

/// Indexes the latest schema must contain.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_records_owner_created",
    "idx_records_owner_updated",
    "idx_records_ticket",
    "idx_records_channel",
    "idx_records_project",
    "idx_records_email",
];

#[cfg(test)]
mod tests {
    use crate::db::migrations;
    use rusqlite::{Connection, params};

    #[test]
    fn records_primary_key_is_per_kind() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;
        migrations::migrate(&mut conn)?;

        let insert = "INSERT INTO records (kind, record_id, owner_id, created_at_us, fields_json)
                      VALUES (?1, ?2, 'u1', 1, '{}')";
        conn.execute(insert, params!["ticket", "x-1"])?;
        conn.execute(insert, params!["project", "x-1"])?;
        assert!(conn.execute(insert, params!["ticket", "x-1"]).is_err());
        Ok(())
    }

    #[test]
    fn fields_json_must_be_valid() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;
        migrations::migrate(&mut conn)?;

        let result = conn.execute(
            "INSERT INTO records (kind, record_id, owner_id, created_at_us, fields_json)
             VALUES ('ticket', 't', 'u1', 1, 'not json')",
            [],
        );
        assert!(result.is_err());
        Ok(())
    }
}
