//! Database schema and migrations.
//!
//! This module contains all database migrations that will be applied
//! sequentially when the database is first opened or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Initial schema - users table
    r#"
-- Users table for authentication and account management
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password    TEXT NOT NULL,           -- Argon2 hash
    role        TEXT NOT NULL DEFAULT 'student',  -- 'admin', 'teacher', 'principal', 'vice_principal', 'coordinator', 'staff', 'student'
    permissions TEXT NOT NULL DEFAULT '[]',       -- JSON array of capability tags
    student_id  TEXT UNIQUE,             -- present only for student accounts
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    last_login  TEXT,
    is_active   INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX idx_users_email ON users(email);
CREATE INDEX idx_users_role ON users(role);
CREATE INDEX idx_users_student_id ON users(student_id);
"#,
    // v2: Admin whitelist - emails pre-authorized to hold the admin role
    r#"
CREATE TABLE admin_whitelist (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    email       TEXT NOT NULL UNIQUE COLLATE NOCASE,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
    // v3: Attendance records
    r#"
CREATE TABLE attendance_records (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id  TEXT NOT NULL,
    date        TEXT NOT NULL,
    status      TEXT NOT NULL,           -- 'present', 'absent', 'late'
    recorded_by INTEGER NOT NULL REFERENCES users(id),
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(student_id, date)
);

CREATE INDEX idx_attendance_student ON attendance_records(student_id);
CREATE INDEX idx_attendance_date ON attendance_records(date);
"#,
    // v4: Exam results
    r#"
CREATE TABLE results (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id   TEXT NOT NULL,
    subject      TEXT NOT NULL,
    term         TEXT NOT NULL,
    score        REAL NOT NULL,
    published_by INTEGER NOT NULL REFERENCES users(id),
    created_at   TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_results_student ON results(student_id);
CREATE INDEX idx_results_term ON results(term);
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_not_empty() {
        assert!(!MIGRATIONS.is_empty());
    }

    #[test]
    fn test_first_migration_contains_users_table() {
        let first = MIGRATIONS[0];
        assert!(first.contains("CREATE TABLE users"));
        assert!(first.contains("email"));
        assert!(first.contains("password"));
        assert!(first.contains("permissions"));
        assert!(first.contains("student_id"));
    }

    #[test]
    fn test_email_is_case_insensitive_unique() {
        assert!(MIGRATIONS[0].contains("UNIQUE COLLATE NOCASE"));
    }

    #[test]
    fn test_whitelist_migration() {
        let whitelist = MIGRATIONS[1];
        assert!(whitelist.contains("CREATE TABLE admin_whitelist"));
        assert!(whitelist.contains("UNIQUE COLLATE NOCASE"));
    }

    #[test]
    fn test_migrations_are_valid_sql() {
        for migration in MIGRATIONS {
            assert!(!migration.trim().is_empty());
            assert!(
                migration.contains("CREATE TABLE")
                    || migration.contains("ALTER TABLE")
                    || migration.contains("CREATE INDEX")
            );
        }
    }
}
