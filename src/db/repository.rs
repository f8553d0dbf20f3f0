//! User repository.
//!
//! CRUD operations for user accounts.

use sqlx::{QueryBuilder, SqlitePool};

use super::user::{NewUser, Role, User, UserUpdate};
use crate::auth::Permission;
use crate::{CampusError, Result};

const USER_COLUMNS: &str = "id, name, email, password, role, permissions, student_id, \
                            created_at, last_login, is_active";

fn permissions_json(permissions: &[Permission]) -> String {
    // Serializing a slice of catalog tags cannot fail
    serde_json::to_string(permissions).unwrap_or_else(|_| "[]".to_string())
}

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// Returns the created user with the assigned ID.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (name, email, password, role, permissions, student_id)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password)
        .bind(new_user.role.as_str())
        .bind(permissions_json(&new_user.permissions))
        .bind(&new_user.student_id)
        .execute(self.pool)
        .await
        .map_err(|e| CampusError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| CampusError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| CampusError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get a user by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| CampusError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get a user by student identifier.
    pub async fn get_by_student_id(&self, student_id: &str) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE student_id = ?"
        ))
        .bind(student_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| CampusError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Update a user by ID.
    ///
    /// Only fields that are set in the update will be modified.
    /// Returns the updated user, or None if not found.
    pub async fn update(&self, id: i64, update: &UserUpdate) -> Result<Option<User>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut separated = query.separated(", ");

        if let Some(ref password) = update.password {
            separated.push("password = ");
            separated.push_bind_unseparated(password);
        }
        if let Some(ref name) = update.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }
        if let Some(role) = update.role {
            separated.push("role = ");
            separated.push_bind_unseparated(role.as_str().to_string());
        }
        if let Some(ref permissions) = update.permissions {
            separated.push("permissions = ");
            separated.push_bind_unseparated(permissions_json(permissions));
        }
        if let Some(is_active) = update.is_active {
            separated.push("is_active = ");
            separated.push_bind_unseparated(is_active);
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| CampusError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Replace a user's permission set.
    pub async fn set_permissions(
        &self,
        id: i64,
        permissions: &[Permission],
    ) -> Result<Option<User>> {
        self.update(id, &UserUpdate::new().permissions(permissions.to_vec()))
            .await
    }

    /// Change a user's role.
    pub async fn set_role(&self, id: i64, role: Role) -> Result<Option<User>> {
        self.update(id, &UserUpdate::new().role(role)).await
    }

    /// Update the last login timestamp for a user.
    pub async fn update_last_login(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET last_login = datetime('now') WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| CampusError::Database(e.to_string()))?;
        Ok(())
    }

    /// List active staff-class users.
    ///
    /// Admin accounts are not part of the staff-management surface and are
    /// excluded, as are students.
    pub async fn list_staff(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE role != 'student' AND role != 'admin' AND is_active = 1 ORDER BY name"
        ))
        .fetch_all(self.pool)
        .await
        .map_err(|e| CampusError::Database(e.to_string()))?;

        Ok(users)
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await
            .map_err(|e| CampusError::Database(e.to_string()))?;
        Ok(count.0)
    }

    /// Check if an email is already taken (case-insensitive).
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = ? COLLATE NOCASE)")
                .bind(email)
                .fetch_one(self.pool)
                .await
                .map_err(|e| CampusError::Database(e.to_string()))?;
        Ok(exists.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let new_user = NewUser::new("Test User", "test@school.edu", "hashedpw");
        let user = repo.create(&new_user).await.unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.name, "Test User");
        assert_eq!(user.email, "test@school.edu");
        assert_eq!(user.role, Role::Student);
        assert!(user.permissions.is_empty());
        assert!(user.is_active);
    }

    #[tokio::test]
    async fn test_create_user_with_options() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let new_user = NewUser::new("Coordinator", "coord@school.edu", "hashedpw")
            .with_role(Role::Coordinator)
            .with_permissions(vec![Permission::ManageAdmission, Permission::ManageFees]);

        let user = repo.create(&new_user).await.unwrap();

        assert_eq!(user.role, Role::Coordinator);
        assert_eq!(
            user.permissions,
            vec![Permission::ManageAdmission, Permission::ManageFees]
        );
    }

    #[tokio::test]
    async fn test_create_duplicate_email() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&NewUser::new("A", "dup@school.edu", "pw"))
            .await
            .unwrap();

        let result = repo.create(&NewUser::new("B", "DUP@school.edu", "pw")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_by_email_case_insensitive() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&NewUser::new("Test", "Mixed@School.edu", "pw"))
            .await
            .unwrap();

        for probe in ["Mixed@School.edu", "mixed@school.edu", "MIXED@SCHOOL.EDU"] {
            let found = repo.get_by_email(probe).await.unwrap();
            assert!(found.is_some(), "lookup failed for {probe}");
            assert_eq!(found.unwrap().email, "Mixed@School.edu");
        }

        assert!(repo
            .get_by_email("other@school.edu")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_get_by_student_id() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&NewUser::new("Student", "s@school.edu", "pw").with_student_id("STU-042"))
            .await
            .unwrap();

        let found = repo.get_by_student_id("STU-042").await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().email, "s@school.edu");

        assert!(repo.get_by_student_id("STU-999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo
            .create(&NewUser::new("Old Name", "u@school.edu", "hashedpw"))
            .await
            .unwrap();

        let update = UserUpdate::new().name("New Name").role(Role::Teacher);
        let updated = repo.update(user.id, &update).await.unwrap().unwrap();

        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.role, Role::Teacher);
        // Unchanged fields
        assert_eq!(updated.email, "u@school.edu");
        assert_eq!(updated.password, "hashedpw");
    }

    #[tokio::test]
    async fn test_update_nonexistent_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let result = repo
            .update(999, &UserUpdate::new().name("Nobody"))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_empty() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo
            .create(&NewUser::new("Test", "t@school.edu", "pw"))
            .await
            .unwrap();

        let result = repo.update(user.id, &UserUpdate::new()).await.unwrap();
        assert_eq!(result.unwrap().name, "Test");
    }

    #[tokio::test]
    async fn test_set_permissions() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo
            .create(&NewUser::new("T", "t@school.edu", "pw").with_role(Role::Teacher))
            .await
            .unwrap();
        assert!(user.permissions.is_empty());

        let updated = repo
            .set_permissions(user.id, &[Permission::TakeAttendance])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.permissions, vec![Permission::TakeAttendance]);

        // Replacement, not accumulation
        let updated = repo
            .set_permissions(user.id, &[Permission::ManageResults])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.permissions, vec![Permission::ManageResults]);
    }

    #[tokio::test]
    async fn test_set_role() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo
            .create(&NewUser::new("S", "s@school.edu", "pw").with_role(Role::Staff))
            .await
            .unwrap();

        let updated = repo
            .set_role(user.id, Role::VicePrincipal)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.role, Role::VicePrincipal);
    }

    #[tokio::test]
    async fn test_update_last_login() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo
            .create(&NewUser::new("Test", "t@school.edu", "pw"))
            .await
            .unwrap();
        assert!(user.last_login.is_none());

        repo.update_last_login(user.id).await.unwrap();

        let updated = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert!(updated.last_login.is_some());
    }

    #[tokio::test]
    async fn test_list_staff() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&NewUser::new("Teacher", "t@school.edu", "pw").with_role(Role::Teacher))
            .await
            .unwrap();
        repo.create(&NewUser::new("Principal", "p@school.edu", "pw").with_role(Role::Principal))
            .await
            .unwrap();
        repo.create(&NewUser::new("Student", "s@school.edu", "pw"))
            .await
            .unwrap();
        repo.create(&NewUser::new("Admin", "a@school.com", "pw").with_role(Role::Admin))
            .await
            .unwrap();

        let staff = repo.list_staff().await.unwrap();
        assert_eq!(staff.len(), 2);
        assert!(staff
            .iter()
            .all(|u| u.role != Role::Student && u.role != Role::Admin));
    }

    #[tokio::test]
    async fn test_count_and_email_exists() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(!repo.email_exists("a@school.edu").await.unwrap());

        repo.create(&NewUser::new("A", "a@school.edu", "pw"))
            .await
            .unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(repo.email_exists("a@school.edu").await.unwrap());
        assert!(repo.email_exists("A@SCHOOL.EDU").await.unwrap());
    }

    #[tokio::test]
    async fn test_permissions_survive_round_trip() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo
            .create(
                &NewUser::new("T", "t@school.edu", "pw")
                    .with_role(Role::Teacher)
                    .with_permissions(vec![
                        Permission::TakeAttendance,
                        Permission::ManageResources,
                    ]),
            )
            .await
            .unwrap();

        let fetched = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(
            fetched.permissions,
            vec![Permission::TakeAttendance, Permission::ManageResources]
        );
    }
}
