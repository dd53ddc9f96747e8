/// Idempotent DDL applied at startup. Statements are separated by `;`.
pub const POSTGRES_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id          BIGINT PRIMARY KEY,
    email       TEXT NOT NULL,
    name        TEXT NOT NULL,
    auth_hash   TEXT NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS holdings (
    id          UUID PRIMARY KEY,
    user_id     BIGINT NOT NULL REFERENCES users (id),
    kind        TEXT NOT NULL CHECK (kind IN ('stock', 'bond', 'private_equity', 'cash', 'liability')),
    name        TEXT NOT NULL,
    symbol      TEXT,
    quantity    NUMERIC(28, 8) NOT NULL,
    unit_value  NUMERIC(28, 8) NOT NULL,
    currency    TEXT NOT NULL,
    notes       TEXT,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS holdings_user_id_idx ON holdings (user_id);
"#;

/// Split the bundled DDL into individual statements.
pub fn statements(ddl: &str) -> impl Iterator<Item = &str> {
    ddl.split(';').map(str::trim).filter(|s| !s.is_empty())
}
