use crate::models::review::ReviewedTarget;
use crate::models::target::TargetColumns;
use crate::models::{
    AuthenticatedUser, Feedback, FeedbackWithReviewer, FeedbackWithTarget, NewFeedback,
    NewReport, Rating, Report, ReportStatus, ReportTargetType, ReviewerProfile, Role, TargetKind,
    TargetRef,
};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Error, OptionalExtension, Row};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

const FEEDBACK_COLUMNS: &str = "f.id, f.reviewer_id, f.business_id, f.event_id, f.service_id, \
     f.rating, f.comment, f.created_at";

const REPORT_COLUMNS: &str =
    "id, reported_by, target_type, target_name, issue, details, status, created_at";

// Shared handle to the SQLite database; clones share one connection.
#[derive(Debug, Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    // Open (or create) the database file, ":memory:" for a throwaway one
    pub fn new(db_path: &str) -> Result<Self, Error> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        info!("Database connection established at: {}", db_path);
        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub async fn create_schema(&self) -> Result<(), Error> {
        let conn = self.conn.lock().await;

        // 1. Users and the tokens issued to them elsewhere
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                profile_picture TEXT,
                role TEXT NOT NULL DEFAULT 'user'
            );
            CREATE TABLE IF NOT EXISTS api_tokens (
                token TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );",
        )
        .map_err(|e| {
            tracing::error!("Failed creating user tables: {}", e);
            e
        })?;

        // 2. Listings a review can point at
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS businesses (
                id INTEGER PRIMARY KEY,
                business_name TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY,
                event_name TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS services (
                id INTEGER PRIMARY KEY,
                service_name TEXT NOT NULL
            );",
        )
        .map_err(|e| {
            tracing::error!("Failed creating listing tables: {}", e);
            e
        })?;

        // 3. Feedback; exactly one target column is set per row
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS feedback (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                reviewer_id INTEGER NOT NULL,
                business_id INTEGER,
                event_id INTEGER,
                service_id INTEGER,
                rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                comment TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                CHECK ((business_id IS NOT NULL)
                     + (event_id IS NOT NULL)
                     + (service_id IS NOT NULL) = 1),
                FOREIGN KEY (reviewer_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_feedback_business ON feedback(business_id);
            CREATE INDEX IF NOT EXISTS idx_feedback_event ON feedback(event_id);
            CREATE INDEX IF NOT EXISTS idx_feedback_service ON feedback(service_id);
            CREATE INDEX IF NOT EXISTS idx_feedback_reviewer ON feedback(reviewer_id);",
        )
        .map_err(|e| {
            tracing::error!("Failed creating feedback table: {}", e);
            e
        })?;

        // 4. Reports
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reports (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                reported_by INTEGER NOT NULL,
                target_type TEXT NOT NULL
                    CHECK (target_type IN ('business', 'event', 'service', 'other')),
                target_name TEXT NOT NULL,
                issue TEXT NOT NULL,
                details TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'Under Review',
                created_at TEXT NOT NULL,
                FOREIGN KEY (reported_by) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_reports_reporter ON reports(reported_by);",
        )
        .map_err(|e| {
            tracing::error!("Failed creating reports table: {}", e);
            e
        })?;
        Ok(())
    }

    pub async fn insert_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        profile_picture: Option<&str>,
        role: Role,
    ) -> Result<i64, Error> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO users (first_name, last_name, email, profile_picture, role)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![first_name, last_name, email, profile_picture, role.as_str()],
        )?;
        let id = conn.last_insert_rowid();
        debug!("[DB] User inserted: {} ({})", id, email);
        Ok(id)
    }

    pub async fn insert_api_token(&self, token: &str, user_id: i64) -> Result<(), Error> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO api_tokens (token, user_id) VALUES (?1, ?2)",
            params![token, user_id],
        )?;
        Ok(())
    }

    pub async fn user_for_token(&self, token: &str) -> Result<Option<AuthenticatedUser>, Error> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT u.id, u.role
             FROM api_tokens t
             JOIN users u ON u.id = t.user_id
             WHERE t.token = ?1",
            [token],
            |row| {
                Ok(AuthenticatedUser {
                    id: row.get(0)?,
                    role: Role::from_db(&row.get::<_, String>(1)?),
                })
            },
        )
        .optional()
    }

    // Insert a listing of the given kind, returning its id
    pub async fn insert_target(&self, kind: TargetKind, name: &str) -> Result<i64, Error> {
        let (table, name_column) = target_table(kind);
        let conn = self.conn.lock().await;
        conn.execute(
            &format!("INSERT INTO {table} ({name_column}) VALUES (?1)"),
            [name],
        )?;
        let id = conn.last_insert_rowid();
        debug!("[DB] {} inserted: {}", kind, id);
        Ok(id)
    }

    /// Stores a review for `reviewer_id`. Returns `None` without writing
    /// anything if the target listing does not exist.
    pub async fn insert_feedback(
        &self,
        reviewer_id: i64,
        new: &NewFeedback,
    ) -> Result<Option<FeedbackWithReviewer>, Error> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        if !target_exists(&tx, new.target)? {
            debug!("[DB] {} does not exist, nothing inserted", new.target);
            return Ok(None);
        }

        let cols = new.target.columns();
        tx.execute(
            "INSERT INTO feedback
                (reviewer_id, business_id, event_id, service_id, rating, comment, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                reviewer_id,
                cols.business_id,
                cols.event_id,
                cols.service_id,
                new.rating.value(),
                &new.comment,
                Utc::now(),
            ],
        )?;
        let id = tx.last_insert_rowid();

        let created = tx.query_row(
            &format!(
                "SELECT {FEEDBACK_COLUMNS}, u.id, u.first_name, u.last_name, u.profile_picture
                 FROM feedback f
                 JOIN users u ON u.id = f.reviewer_id
                 WHERE f.id = ?1"
            ),
            [id],
            feedback_with_reviewer,
        )?;

        tx.commit()?;
        debug!("[DB] Feedback {} stored for {}", id, new.target);
        Ok(Some(created))
    }

    // Reviews of one listing, oldest first
    pub async fn feedback_for_target(
        &self,
        target: TargetRef,
    ) -> Result<Vec<FeedbackWithReviewer>, Error> {
        let column = target_column(target.kind());
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {FEEDBACK_COLUMNS}, u.id, u.first_name, u.last_name, u.profile_picture
             FROM feedback f
             JOIN users u ON u.id = f.reviewer_id
             WHERE f.{column} = ?1
             ORDER BY f.id ASC"
        ))?;
        let rows = stmt.query_map([target.id()], feedback_with_reviewer)?;
        rows.collect()
    }

    // Reviews written by one user, each with the listing it is about
    pub async fn feedback_by_reviewer(
        &self,
        reviewer_id: i64,
    ) -> Result<Vec<FeedbackWithTarget>, Error> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {FEEDBACK_COLUMNS},
                    COALESCE(b.business_name, e.event_name, s.service_name)
             FROM feedback f
             LEFT JOIN businesses b ON b.id = f.business_id
             LEFT JOIN events e ON e.id = f.event_id
             LEFT JOIN services s ON s.id = f.service_id
             WHERE f.reviewer_id = ?1
             ORDER BY f.id ASC"
        ))?;
        let rows = stmt.query_map([reviewer_id], |row| {
            let feedback = feedback_from_row(row)?;
            let target = ReviewedTarget {
                kind: feedback.target.kind(),
                id: feedback.target.id(),
                name: row.get(8)?,
            };
            Ok(FeedbackWithTarget { feedback, target })
        })?;
        rows.collect()
    }

    pub async fn ratings_for_target(&self, target: TargetRef) -> Result<Vec<Rating>, Error> {
        let column = target_column(target.kind());
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT rating FROM feedback WHERE {column} = ?1 ORDER BY id ASC"
        ))?;
        let rows = stmt.query_map([target.id()], |row| rating_at(row, 0))?;
        rows.collect()
    }

    // Administrative removal; not reachable from the public API
    pub async fn delete_feedback(&self, feedback_id: i64) -> Result<bool, Error> {
        let conn = self.conn.lock().await;
        let deleted = conn.execute("DELETE FROM feedback WHERE id = ?1", [feedback_id])?;
        info!("[DB] Feedback {} deleted: {}", feedback_id, deleted > 0);
        Ok(deleted > 0)
    }

    pub async fn insert_report(&self, reported_by: i64, new: &NewReport) -> Result<Report, Error> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO reports
                (reported_by, target_type, target_name, issue, details, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                reported_by,
                new.target_type.as_str(),
                &new.target_name,
                &new.issue,
                &new.details,
                ReportStatus::UnderReview.as_str(),
                Utc::now(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!("[DB] Report {} stored by user {}", id, reported_by);
        conn.query_row(
            &format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?1"),
            [id],
            report_from_row,
        )
    }

    // Newest first
    pub async fn reports_for_user(&self, user_id: i64) -> Result<Vec<Report>, Error> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports
             WHERE reported_by = ?1
             ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map([user_id], report_from_row)?;
        rows.collect()
    }

    pub async fn get_report(&self, report_id: i64) -> Result<Option<Report>, Error> {
        let conn = self.conn.lock().await;
        conn.query_row(
            &format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?1"),
            [report_id],
            report_from_row,
        )
        .optional()
    }

    pub async fn update_report_status(
        &self,
        report_id: i64,
        status: ReportStatus,
    ) -> Result<Option<Report>, Error> {
        let conn = self.conn.lock().await;
        let updated = conn.execute(
            "UPDATE reports SET status = ?1 WHERE id = ?2",
            params![status.as_str(), report_id],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        conn.query_row(
            &format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?1"),
            [report_id],
            report_from_row,
        )
        .optional()
    }
}

fn target_table(kind: TargetKind) -> (&'static str, &'static str) {
    match kind {
        TargetKind::Business => ("businesses", "business_name"),
        TargetKind::Event => ("events", "event_name"),
        TargetKind::Service => ("services", "service_name"),
    }
}

fn target_column(kind: TargetKind) -> &'static str {
    match kind {
        TargetKind::Business => "business_id",
        TargetKind::Event => "event_id",
        TargetKind::Service => "service_id",
    }
}

fn target_exists(conn: &Connection, target: TargetRef) -> Result<bool, Error> {
    let (table, _) = target_table(target.kind());
    conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)"),
        [target.id()],
        |row| row.get(0),
    )
}

fn conversion_error(idx: usize, ty: Type, message: &str) -> Error {
    Error::FromSqlConversionFailure(idx, ty, message.to_string().into())
}

fn rating_at(row: &Row<'_>, idx: usize) -> Result<Rating, Error> {
    let value: i64 = row.get(idx)?;
    Rating::new(value).ok_or_else(|| conversion_error(idx, Type::Integer, "rating out of range"))
}

// Columns 0..=7 in FEEDBACK_COLUMNS order
fn feedback_from_row(row: &Row<'_>) -> Result<Feedback, Error> {
    let cols = TargetColumns {
        business_id: row.get(2)?,
        event_id: row.get(3)?,
        service_id: row.get(4)?,
    };
    let target = cols
        .into_target()
        .ok_or_else(|| conversion_error(2, Type::Integer, "feedback row without a single target"))?;
    let created_at: DateTime<Utc> = row.get(7)?;
    Ok(Feedback {
        id: row.get(0)?,
        reviewer_id: row.get(1)?,
        target,
        rating: rating_at(row, 5)?,
        comment: row.get(6)?,
        created_at,
    })
}

fn feedback_with_reviewer(row: &Row<'_>) -> Result<FeedbackWithReviewer, Error> {
    Ok(FeedbackWithReviewer {
        feedback: feedback_from_row(row)?,
        user: ReviewerProfile {
            id: row.get(8)?,
            first_name: row.get(9)?,
            last_name: row.get(10)?,
            profile_picture: row.get(11)?,
        },
    })
}

fn report_from_row(row: &Row<'_>) -> Result<Report, Error> {
    let target_type: String = row.get(2)?;
    let status: String = row.get(6)?;
    Ok(Report {
        id: row.get(0)?,
        reported_by: row.get(1)?,
        target_type: ReportTargetType::from_db(&target_type)
            .ok_or_else(|| conversion_error(2, Type::Text, "unknown report target type"))?,
        target_name: row.get(3)?,
        issue: row.get(4)?,
        details: row.get(5)?,
        status: ReportStatus::from_db(&status)
            .ok_or_else(|| conversion_error(6, Type::Text, "unknown report status"))?,
        created_at: row.get(7)?,
    })
}
