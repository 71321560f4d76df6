//! Database schema definitions

/// SQL to create the article_references table
///
/// Inner references (11) must carry the target article id.
pub const CREATE_REFERENCES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS article_references (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    source_id INTEGER NOT NULL,
    source_name TEXT NOT NULL,
    target_type INTEGER NOT NULL CHECK (target_type IN (11, 21)),
    target_id INTEGER,
    target_url TEXT NOT NULL,
    target_name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    CHECK (target_type <> 11 OR target_id IS NOT NULL)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_refs_source ON article_references(source_id)",
    "CREATE INDEX IF NOT EXISTS idx_refs_target_url ON article_references(target_url)",
    "CREATE INDEX IF NOT EXISTS idx_refs_user_type ON article_references(user_id, target_type)",
];

/// Columns selected for a ReferenceRecord, in row-mapping order
pub const RECORD_COLUMNS: &str =
    "id, user_id, source_id, source_name, target_type, target_id, target_url, target_name";

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_REFERENCES_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
