pub const SCHEMA: &str = r#"
-- cached playlist, keyed by video url
CREATE TABLE IF NOT EXISTS videos (
    url TEXT NOT NULL PRIMARY KEY,
    updated TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    thumbnail TEXT NOT NULL
);
"#;
