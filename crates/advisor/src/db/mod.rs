/// Database module for stored profiles and persisted course history

mod types;

pub use types::{DbUser, TranscriptCourse};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::transcript::CourseRecord;
use crate::verify::Profile;

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_profiles.sql");

/// Storage keys are trimmed, lower-cased email addresses.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct ProfileDb {
    db: Mutex<Connection>,
}

impl ProfileDb {
    /// Opens (or creates) the database file and initializes the schema
    pub fn new(db_path: &str) -> Result<Self> {
        Self::with_connection(Connection::open(db_path)?)
    }

    /// Creates a private in-memory database
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Gets the full user row for an email
    pub fn get_user(&self, email: &str) -> Result<Option<DbUser>> {
        let db = self.conn();
        db.query_row(
            "SELECT email, full_name, student_id, date_of_birth, created_at, updated_at
             FROM users WHERE email = ?",
            [normalize_email(email)],
            |row| {
                Ok(DbUser {
                    email: row.get(0)?,
                    full_name: row.get(1)?,
                    student_id: row.get(2)?,
                    date_of_birth: row.get(3)?,
                    created_at: row.get(4)?,
                    updated_at: row.get(5)?,
                })
            },
        )
        .optional()
    }

    /// Gets the identity profile the user entered, if the user exists
    pub fn get_profile(&self, email: &str) -> Result<Option<Profile>> {
        Ok(self.get_user(email)?.map(|user| Profile {
            full_name: user.full_name,
            student_id: user.student_id,
            date_of_birth: user.date_of_birth,
        }))
    }

    /// Creates the user if needed and overwrites the profile fields
    pub fn upsert_profile(&self, email: &str, profile: &Profile) -> Result<()> {
        let db = self.conn();
        let now = Utc::now();
        db.execute(
            "INSERT INTO users (email, full_name, student_id, date_of_birth, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT(email) DO UPDATE SET
                full_name = excluded.full_name,
                student_id = excluded.student_id,
                date_of_birth = excluded.date_of_birth,
                updated_at = excluded.updated_at",
            params![
                normalize_email(email),
                profile.full_name.trim(),
                profile.student_id.trim(),
                profile.date_of_birth.trim(),
                now,
            ],
        )?;
        Ok(())
    }

    /// Replaces the stored course history with `courses`, keeping their order.
    ///
    /// Returns the number of courses stored.
    pub fn replace_transcript(&self, email: &str, courses: &[CourseRecord]) -> Result<usize> {
        let email = normalize_email(email);
        let mut db = self.conn();
        let tx = db.transaction()?;
        let now = Utc::now();

        tx.execute(
            "INSERT OR IGNORE INTO users (email, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![email, now],
        )?;
        tx.execute(
            "UPDATE users SET updated_at = ?2 WHERE email = ?1",
            params![email, now],
        )?;
        tx.execute("DELETE FROM transcript_courses WHERE email = ?", [&email])?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO transcript_courses
                    (email, position, course_number, course_name, grade, credits, term)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;

            for (position, course) in courses.iter().enumerate() {
                let stored = TranscriptCourse::from(course);
                stmt.execute(params![
                    email,
                    position as i64,
                    stored.course_number,
                    stored.course_name,
                    stored.grade,
                    stored.credits as f64,
                    stored.term,
                ])?;
            }
        }

        tx.commit()?;
        Ok(courses.len())
    }

    /// Gets the stored course history in upload order
    pub fn get_transcript(&self, email: &str) -> Result<Vec<TranscriptCourse>> {
        let db = self.conn();
        let mut stmt = db.prepare(
            "SELECT course_number, course_name, grade, credits, term
             FROM transcript_courses
             WHERE email = ?
             ORDER BY position",
        )?;

        let courses = stmt.query_map([normalize_email(email)], |row| {
            Ok(TranscriptCourse {
                course_number: row.get(0)?,
                course_name: row.get(1)?,
                grade: row.get(2)?,
                credits: row.get::<_, f64>(3)? as f32,
                term: row.get(4)?,
            })
        })?;

        courses.collect()
    }
}
