//! Database schema definitions
//!
//! Timestamps are stored as integer Unix-epoch seconds.

/// SQL to create the themes table
pub const CREATE_THEMES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS themes (
    id              INTEGER PRIMARY KEY,
    created_on      TIMESTAMP NOT NULL,
    name            TEXT NOT NULL COLLATE NOCASE,
    UNIQUE (name)
)
"#;

/// SQL to create the data types table (record and benchmark columns)
pub const CREATE_TYPES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS types (
    id              INTEGER PRIMARY KEY,
    created_on      TIMESTAMP NOT NULL,
    theme_id        INTEGER NOT NULL REFERENCES themes(id),
    name            TEXT NOT NULL COLLATE NOCASE,
    unit            TEXT,
    display_type    TEXT NOT NULL CHECK (display_type IN ('record', 'benchmark')),
    representation  TEXT,
    UNIQUE (theme_id, name)
)
"#;

/// SQL to create the data points table (append-only)
pub const CREATE_DATA_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS data (
    type_id         INTEGER NOT NULL REFERENCES types(id),
    created_on      TIMESTAMP NOT NULL,
    timestamp       TIMESTAMP NOT NULL,
    val             REAL
)
"#;

/// Index for listing a theme's types by display type
pub const CREATE_TYPES_THEME_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS types_theme_display_idx ON types (theme_id, display_type)
"#;

/// Index for listing a type's data points in time order
pub const CREATE_DATA_TYPE_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS data_type_timestamp_idx ON data (type_id, timestamp)
"#;

/// v3: case-folded name columns, filled in by the migration
pub const ADD_NAME_KEY_COLUMNS: &[&str] = &[
    "ALTER TABLE themes ADD COLUMN name_key TEXT NOT NULL DEFAULT ''",
    "ALTER TABLE types ADD COLUMN name_key TEXT NOT NULL DEFAULT ''",
];

/// Unique theme names under full Unicode case folding
pub const CREATE_THEMES_NAME_KEY_INDEX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS themes_name_key_idx ON themes (name_key)
"#;

/// Unique type names per theme under full Unicode case folding
pub const CREATE_TYPES_NAME_KEY_INDEX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS types_theme_name_key_idx ON types (theme_id, name_key)
"#;

/// All table creation statements in order
pub const CREATE_ALL_TABLES: &[&str] = &[
    CREATE_THEMES_TABLE,
    CREATE_TYPES_TABLE,
    CREATE_DATA_TABLE,
];

/// All index creation statements
pub const CREATE_ALL_INDEXES: &[&str] = &[
    CREATE_TYPES_THEME_INDEX,
    CREATE_DATA_TYPE_INDEX,
];
