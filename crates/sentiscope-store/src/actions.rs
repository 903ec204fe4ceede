//! Actions and the event/user/agent rows they reference

use crate::error::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use sentiscope_core::{ActionRecord, EventRecord, NewAction};

pub const EVENT_PLACEHOLDER: &str = "Evento Padrão";
pub const USER_PLACEHOLDER: &str = "Usuário Padrão";
pub const AGENT_PLACEHOLDER: &str = "Agente Padrão";
pub const DEFAULT_STATUS_ID: i64 = 1;

pub fn find_event(conn: &Connection, event_id: i64) -> Result<Option<EventRecord>> {
    Ok(conn
        .query_row(
            "SELECT event_id, descricao, data_abertura, data_baixa, status_id
             FROM cs_events WHERE event_id = ?1",
            [event_id],
            |row| {
                Ok(EventRecord {
                    event_id: row.get(0)?,
                    description: row.get(1)?,
                    opened_at: row.get(2)?,
                    closed_at: row.get(3)?,
                    status_id: row.get(4)?,
                })
            },
        )
        .optional()?)
}

/// Create a placeholder event if `event_id` is unknown. Returns true if created.
pub fn ensure_event(conn: &Connection, event_id: i64, now: DateTime<Utc>) -> Result<bool> {
    let created = conn.execute(
        "INSERT OR IGNORE INTO cs_events (event_id, descricao, data_abertura, status_id)
         VALUES (?1, ?2, ?3, ?4)",
        params![event_id, EVENT_PLACEHOLDER, now, DEFAULT_STATUS_ID],
    )? > 0;

    if created {
        tracing::info!(event_id, "Created placeholder event");
    }
    Ok(created)
}

/// Create a placeholder user if `user_id` is unknown. Returns true if created.
pub fn ensure_user(conn: &Connection, user_id: i64) -> Result<bool> {
    let created = conn.execute(
        "INSERT OR IGNORE INTO cs_user (user_id, name) VALUES (?1, ?2)",
        params![user_id, USER_PLACEHOLDER],
    )? > 0;

    if created {
        tracing::info!(user_id, "Created placeholder user");
    }
    Ok(created)
}

/// Create a placeholder agent if `agent_id` is unknown. Returns true if created.
pub fn ensure_agent(conn: &Connection, agent_id: i64) -> Result<bool> {
    let created = conn.execute(
        "INSERT OR IGNORE INTO cs_agents (agent_id, nome, email, username)
         VALUES (?1, ?2, '', '')",
        params![agent_id, AGENT_PLACEHOLDER],
    )? > 0;

    if created {
        tracing::info!(agent_id, "Created placeholder agent");
    }
    Ok(created)
}

fn map_action(row: &Row) -> rusqlite::Result<ActionRecord> {
    Ok(ActionRecord {
        id: row.get(0)?,
        description: row.get(1)?,
        sentiment: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        event_id: row.get(3)?,
        user_id: row.get(4)?,
        agent_id: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Store an action, creating any missing referenced rows first.
/// Call inside one transaction so placeholders and the action commit together.
pub fn create_action(conn: &Connection, new: &NewAction) -> Result<ActionRecord> {
    let now = Utc::now();

    ensure_event(conn, new.event_id, now)?;
    if let Some(user_id) = new.user_id {
        ensure_user(conn, user_id)?;
    }
    if let Some(agent_id) = new.agent_id {
        ensure_agent(conn, agent_id)?;
    }

    conn.execute(
        "INSERT INTO cs_acoes (event_id, descricao, agent_id, user_id, data_acao, sentimento)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new.event_id,
            new.description,
            new.agent_id,
            new.user_id,
            now,
            new.sentiment.as_str(),
        ],
    )?;

    Ok(ActionRecord {
        id: conn.last_insert_rowid(),
        description: new.description.clone(),
        sentiment: new.sentiment.as_str().to_string(),
        event_id: new.event_id,
        user_id: new.user_id,
        agent_id: new.agent_id,
        created_at: now,
    })
}

pub fn get_action(conn: &Connection, acao_id: i64) -> Result<Option<ActionRecord>> {
    Ok(conn
        .query_row(
            "SELECT acao_id, descricao, sentimento, event_id, user_id, agent_id, data_acao
             FROM cs_acoes WHERE acao_id = ?1",
            [acao_id],
            map_action,
        )
        .optional()?)
}
