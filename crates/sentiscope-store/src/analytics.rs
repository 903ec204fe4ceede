//! Aggregate queries over sentiment records

use crate::error::{Result, StoreError};
use rusqlite::{params, Connection};
use sentiscope_core::{Group, Month, LABELS, MONTHS};
use serde::Serialize;

/// One row of an agent or customer ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreEntry {
    pub nome: String,
    pub score: i64,
}

/// A page of a ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranking {
    pub items: Vec<ScoreEntry>,
    /// Number of distinct names across all pages
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

/// Percentage of records per label, in label table order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub labels: Vec<String>,
    pub valores: Vec<f64>,
}

/// Per-month group counts, in calendar order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyEvolution {
    pub meses: Vec<String>,
    pub negativo: Vec<i64>,
    pub positivo: Vec<i64>,
    pub neutro: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupCounts {
    pub total: i64,
    pub positivos: i64,
    pub negativos: i64,
    pub neutros: i64,
}

#[derive(Clone, Copy)]
enum RankBy {
    Agent,
    Customer,
}

impl RankBy {
    fn column(self) -> &'static str {
        match self {
            Self::Agent => "atendente",
            Self::Customer => "nome_cliente",
        }
    }
}

/// Agents by summed customer polarity score, highest first
pub fn top_agents(conn: &Connection, page: u32, limit: u32) -> Result<Ranking> {
    ranking(conn, RankBy::Agent, page, limit)
}

/// Customers by summed polarity score, highest first
pub fn top_customers(conn: &Connection, page: u32, limit: u32) -> Result<Ranking> {
    ranking(conn, RankBy::Customer, page, limit)
}

fn ranking(conn: &Connection, by: RankBy, page: u32, limit: u32) -> Result<Ranking> {
    let column = by.column();
    let offset = i64::from(page.max(1) - 1) * i64::from(limit);

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(DISTINCT {column}) FROM sentimentos"),
        [],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {column}, SUM(score) AS total_score
         FROM sentimentos
         GROUP BY {column}
         ORDER BY total_score DESC, {column} ASC
         LIMIT ?1 OFFSET ?2"
    ))?;

    let rows = stmt.query_map(params![limit, offset], |row| {
        Ok(ScoreEntry {
            nome: row.get(0)?,
            score: row.get(1)?,
        })
    })?;

    let mut items = Vec::new();
    for row in rows {
        items.push(row?);
    }

    Ok(Ranking {
        items,
        total,
        page,
        limit,
    })
}

/// Round to one decimal place
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Share of each label among all records, as a percentage with one decimal.
/// All zeros when there are no records.
pub fn label_distribution(conn: &Connection) -> Result<Distribution> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM sentimentos", [], |row| row.get(0))?;

    let mut stmt =
        conn.prepare("SELECT COUNT(*) FROM sentimentos WHERE sentimento_do_cliente = ?1")?;

    let mut labels = Vec::with_capacity(LABELS.len());
    let mut valores = Vec::with_capacity(LABELS.len());

    for label in LABELS {
        let count: i64 = stmt.query_row([label.as_str()], |row| row.get(0))?;
        let percent = if total > 0 {
            count as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        labels.push(label.as_str().to_string());
        valores.push(round1(percent));
    }

    Ok(Distribution { labels, valores })
}

/// Count of Negativo/Positivo/Neutro records for each of the twelve months
pub fn monthly_evolution(conn: &Connection) -> Result<MonthlyEvolution> {
    let mut negativo = vec![0; MONTHS.len()];
    let mut positivo = vec![0; MONTHS.len()];
    let mut neutro = vec![0; MONTHS.len()];

    let mut stmt = conn.prepare(
        "SELECT mes, grupo_sentimento, COUNT(*)
         FROM sentimentos
         GROUP BY mes, grupo_sentimento",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;

    for row in rows {
        let (mes, grupo, count) = row?;
        let Some(month) = Month::parse(&mes) else {
            continue;
        };
        let idx = month.index();
        match Group::parse(&grupo) {
            Some(Group::Negative) => negativo[idx] += count,
            Some(Group::Positive) => positivo[idx] += count,
            Some(Group::Neutral) => neutro[idx] += count,
            _ => {}
        }
    }

    Ok(MonthlyEvolution {
        meses: MONTHS.iter().map(|m| m.as_str().to_string()).collect(),
        negativo,
        positivo,
        neutro,
    })
}

/// Total and per-group counts; `NotFound` when the table is empty
pub fn group_counts(conn: &Connection) -> Result<GroupCounts> {
    let counts = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(grupo_sentimento = 'Positivo'), 0),
                COALESCE(SUM(grupo_sentimento = 'Negativo'), 0),
                COALESCE(SUM(grupo_sentimento = 'Neutro'), 0)
         FROM sentimentos",
        [],
        |row| {
            Ok(GroupCounts {
                total: row.get(0)?,
                positivos: row.get(1)?,
                negativos: row.get(2)?,
                neutros: row.get(3)?,
            })
        },
    )?;

    if counts.total == 0 {
        return Err(StoreError::not_found(
            "Nenhum dado de sentimento encontrado para estatísticas.",
        ));
    }

    Ok(counts)
}
