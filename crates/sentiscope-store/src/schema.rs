//! Database schema and migrations

use rusqlite::Connection;

/// Bumped whenever `SCHEMA_V1` gains a successor
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS sentimentos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    atendente TEXT NOT NULL,
    sentimento_do_cliente TEXT NOT NULL,
    grupo_sentimento TEXT NOT NULL,
    score INTEGER NOT NULL,
    mes TEXT NOT NULL,
    nome_cliente TEXT NOT NULL,
    sentimento_atendente TEXT NOT NULL,
    score_atendente INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_sentimentos_atendente ON sentimentos(atendente);
CREATE INDEX IF NOT EXISTS idx_sentimentos_cliente ON sentimentos(nome_cliente);
CREATE INDEX IF NOT EXISTS idx_sentimentos_grupo_mes ON sentimentos(grupo_sentimento, mes);

CREATE TABLE IF NOT EXISTS cs_user (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT UNIQUE,
    username TEXT
);

CREATE TABLE IF NOT EXISTS cs_agents (
    agent_id INTEGER PRIMARY KEY AUTOINCREMENT,
    nome TEXT,
    email TEXT NOT NULL,
    username TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS cs_events (
    event_id INTEGER PRIMARY KEY AUTOINCREMENT,
    descricao TEXT NOT NULL,
    data_abertura TEXT NOT NULL,
    data_baixa TEXT,
    status_id INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS cs_acoes (
    acao_id INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id INTEGER NOT NULL REFERENCES cs_events(event_id),
    descricao TEXT NOT NULL,
    agent_id INTEGER REFERENCES cs_agents(agent_id),
    user_id INTEGER REFERENCES cs_user(user_id),
    data_acao TEXT NOT NULL,
    sentimento TEXT
);
CREATE INDEX IF NOT EXISTS idx_acoes_event ON cs_acoes(event_id);
"#;

/// Create or upgrade the schema. Idempotent.
pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current < SCHEMA_VERSION {
        tracing::info!(from = current, to = SCHEMA_VERSION, "Migrating database schema");
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }

    Ok(())
}
