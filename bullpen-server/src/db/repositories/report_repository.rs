use anyhow::{Context, Result};
use rusqlite::{params, Row};
use uuid::Uuid;

use bullpen_types::{Report, ReportStatus};

use crate::db::columns::{count_at, opt_uuid_at, time_at, to_db_time, uuid_at};
use crate::db::DbPool;
use crate::pagination::{Page, PageRequest};

const REPORT_COLUMNS: &str = "id, reporter_id, reported_post_id, reported_comment_id, reported_user_id,
     report_type, reason, status, created_at";

fn map_report(row: &Row) -> rusqlite::Result<Report> {
    let status: String = row.get(7)?;
    Ok(Report {
        id: uuid_at(row, 0)?,
        reporter_id: uuid_at(row, 1)?,
        reported_post_id: opt_uuid_at(row, 2)?,
        reported_comment_id: opt_uuid_at(row, 3)?,
        reported_user_id: opt_uuid_at(row, 4)?,
        report_type: row.get(5)?,
        reason: row.get(6)?,
        status: ReportStatus::parse(&status).unwrap_or_default(),
        created_at: time_at(row, 8)?,
    })
}

pub struct ReportRepository {
    pool: DbPool,
}

impl ReportRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn insert(&self, report: &Report) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO reports (id, reporter_id, reported_post_id, reported_comment_id, reported_user_id,
                                  report_type, reason, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                report.id.to_string(),
                report.reporter_id.to_string(),
                report.reported_post_id.map(|id| id.to_string()),
                report.reported_comment_id.map(|id| id.to_string()),
                report.reported_user_id.map(|id| id.to_string()),
                report.report_type,
                report.reason,
                report.status.as_str(),
                to_db_time(&report.created_at),
            ],
        )
        .context("Failed to create report")?;
        Ok(())
    }

    /// Reports filed by one user, newest first
    pub fn list_by_reporter(&self, reporter_id: &Uuid, page: PageRequest) -> Result<Page<Report>> {
        let conn = self.pool.get()?;
        let total = conn
            .query_row(
                "SELECT COUNT(*) FROM reports WHERE reporter_id = ?",
                [reporter_id.to_string()],
                |row| count_at(row, 0),
            )
            .context("Failed to count reports")?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports
             WHERE reporter_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2 OFFSET ?3"
        ))?;
        let items = stmt
            .query_map(params![reporter_id.to_string(), page.limit(), page.offset()], map_report)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load reports")?;

        Ok(Page { items, total })
    }
}
