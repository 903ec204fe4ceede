//! Sentiment record reads and writes

use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use sentiscope_core::{NewSentiment, SentimentRecord};

const COLUMNS: &str = "id, atendente, sentimento_do_cliente, grupo_sentimento, score, mes, \
                       nome_cliente, sentimento_atendente, score_atendente";

fn map_row(row: &Row) -> rusqlite::Result<SentimentRecord> {
    Ok(SentimentRecord {
        id: row.get(0)?,
        agent: row.get(1)?,
        customer_label: row.get(2)?,
        group: row.get(3)?,
        score: row.get(4)?,
        month: row.get(5)?,
        customer: row.get(6)?,
        agent_label: row.get(7)?,
        agent_score: row.get(8)?,
    })
}

/// Filters and paging for [`list_sentiments`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentimentFilter {
    /// Exact agent name
    pub agent: Option<String>,
    /// Exact group name
    pub group: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for SentimentFilter {
    fn default() -> Self {
        Self {
            agent: None,
            group: None,
            limit: 50,
            offset: 0,
        }
    }
}

/// Insert a new record; the id comes from the table's autoincrement
pub fn insert_sentiment(conn: &Connection, new: &NewSentiment) -> Result<SentimentRecord> {
    conn.execute(
        "INSERT INTO sentimentos (atendente, sentimento_do_cliente, grupo_sentimento, score, mes,
                                  nome_cliente, sentimento_atendente, score_atendente)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            new.agent(),
            new.customer_label(),
            new.group().as_str(),
            new.score(),
            new.month(),
            new.customer(),
            new.agent_label(),
            new.agent_score(),
        ],
    )?;

    let id = conn.last_insert_rowid();
    tracing::debug!(id, agent = new.agent(), "Stored sentiment record");
    Ok(new.clone().into_record(id))
}

/// Insert or replace the record with an explicit id. Returns true if a row was replaced.
pub fn upsert_sentiment(conn: &Connection, id: i64, new: &NewSentiment) -> Result<bool> {
    let existed = conn
        .query_row("SELECT 1 FROM sentimentos WHERE id = ?1", [id], |_| Ok(()))
        .optional()?
        .is_some();

    conn.execute(
        "INSERT INTO sentimentos (id, atendente, sentimento_do_cliente, grupo_sentimento, score, mes,
                                  nome_cliente, sentimento_atendente, score_atendente)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
             atendente = excluded.atendente,
             sentimento_do_cliente = excluded.sentimento_do_cliente,
             grupo_sentimento = excluded.grupo_sentimento,
             score = excluded.score,
             mes = excluded.mes,
             nome_cliente = excluded.nome_cliente,
             sentimento_atendente = excluded.sentimento_atendente,
             score_atendente = excluded.score_atendente",
        params![
            id,
            new.agent(),
            new.customer_label(),
            new.group().as_str(),
            new.score(),
            new.month(),
            new.customer(),
            new.agent_label(),
            new.agent_score(),
        ],
    )?;

    Ok(existed)
}

pub fn get_sentiment(conn: &Connection, id: i64) -> Result<Option<SentimentRecord>> {
    let sql = format!("SELECT {COLUMNS} FROM sentimentos WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], map_row).optional()?)
}

/// Delete by id. Returns false when no such record exists.
pub fn delete_sentiment(conn: &Connection, id: i64) -> Result<bool> {
    let affected = conn.execute("DELETE FROM sentimentos WHERE id = ?1", [id])?;
    Ok(affected > 0)
}

/// Filtered page of records, ordered by id
pub fn list_sentiments(conn: &Connection, filter: &SentimentFilter) -> Result<Vec<SentimentRecord>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM sentimentos
         WHERE (?1 IS NULL OR atendente = ?1)
           AND (?2 IS NULL OR grupo_sentimento = ?2)
         ORDER BY id
         LIMIT ?3 OFFSET ?4"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![filter.agent, filter.group, filter.limit, filter.offset],
        map_row,
    )?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row?);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::migrate;
    use sentiscope_core::{Label, Month};

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    fn sample(agent: &str, label: Label) -> NewSentiment {
        NewSentiment::new(agent, "Cliente", label, Label::Neutral, Month::Janeiro)
    }

    #[test]
    fn test_insert_then_get() {
        let conn = conn();
        let stored = insert_sentiment(&conn, &sample("Ana", Label::Frustration)).unwrap();

        let loaded = get_sentiment(&conn, stored.id).unwrap().unwrap();
        assert_eq!(loaded, stored);
        assert_eq!(loaded.group, "Negativo");
        assert!(loaded.is_consistent());
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let conn = conn();
        let first = insert_sentiment(&conn, &sample("Ana", Label::Neutral)).unwrap();
        assert!(delete_sentiment(&conn, first.id).unwrap());
        let second = insert_sentiment(&conn, &sample("Ana", Label::Neutral)).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn test_delete_missing() {
        let conn = conn();
        assert!(!delete_sentiment(&conn, 42).unwrap());
    }

    #[test]
    fn test_filters_and_paging() {
        let conn = conn();
        insert_sentiment(&conn, &sample("Ana", Label::Satisfaction)).unwrap();
        insert_sentiment(&conn, &sample("Ana", Label::Anger)).unwrap();
        insert_sentiment(&conn, &sample("Bia", Label::Satisfaction)).unwrap();
        insert_sentiment(&conn, &sample("Ana", Label::Satisfaction)).unwrap();

        let ana = list_sentiments(
            &conn,
            &SentimentFilter {
                agent: Some("Ana".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(ana.len(), 3);

        let ana_pos = list_sentiments(
            &conn,
            &SentimentFilter {
                agent: Some("Ana".into()),
                group: Some("Positivo".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(ana_pos.len(), 2);

        let page = list_sentiments(
            &conn,
            &SentimentFilter {
                limit: 2,
                offset: 1,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].agent, "Ana");
        assert_eq!(page[1].agent, "Bia");
    }

    #[test]
    fn test_upsert_reports_replacement() {
        let conn = conn();
        assert!(!upsert_sentiment(&conn, 10, &sample("Ana", Label::Anger)).unwrap());
        assert!(upsert_sentiment(&conn, 10, &sample("Bia", Label::Satisfaction)).unwrap());

        let record = get_sentiment(&conn, 10).unwrap().unwrap();
        assert_eq!(record.agent, "Bia");
        assert_eq!(record.score, 1);
    }
}
