//! Library accounts.
//!
//! A user is identified by a surrogate id and by a unique email. The password
//! is kept as an opaque string; hashing belongs to whoever hands it in.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::FromRow;
use tracing::debug;
use validator::Validate;

use crate::error::{self, Result};
use crate::sql::Db;
use crate::types::{epoch, Role, Uid};
use crate::validate;

const COLUMNS: &str = "id, first_name, middle_name, last_name, email, password, \
	created_at, updated_at, role, is_active";

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
	pub id: Uid,
	pub first_name: Option<String>,
	pub middle_name: Option<String>,
	pub last_name: Option<String>,
	pub email: String,
	pub password: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub role: Role,
	pub is_active: bool,
}

/// Fields accepted by [`User::create`]. Role and activation start at their
/// defaults.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewUser {
	#[validate(email, custom(function = "validate::dot_atom_local"), length(max = 100))]
	pub email: String,
	#[validate(custom(function = "validate::not_blank"), length(max = 128))]
	pub password: String,
	#[serde(default)]
	#[validate(length(max = 20))]
	pub first_name: Option<String>,
	#[serde(default)]
	#[validate(length(max = 20))]
	pub middle_name: Option<String>,
	#[serde(default)]
	#[validate(length(max = 20))]
	pub last_name: Option<String>,
}

impl NewUser {
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		NewUser {
			email: email.into(),
			password: password.into(),
			..NewUser::default()
		}
	}
}

/// Partial update: every `Some` overwrites, every `None` keeps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserUpdate {
	pub first_name: Option<String>,
	pub middle_name: Option<String>,
	pub last_name: Option<String>,
	pub password: Option<String>,
	pub role: Option<Role>,
	pub is_active: Option<bool>,
}

impl UserUpdate {
	pub fn is_empty(&self) -> bool {
		self.first_name.is_none()
			&& self.middle_name.is_none()
			&& self.last_name.is_none()
			&& self.password.is_none()
			&& self.role.is_none()
			&& self.is_active.is_none()
	}
}

impl User {
	pub async fn get_by_id(db: &Db, id: Uid) -> Result<Option<User>> {
		let user = sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
			.bind(id)
			.fetch_optional(db)
			.await?;
		Ok(user)
	}

	pub async fn get_by_email(db: &Db, email: &str) -> Result<Option<User>> {
		let user = sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE email = ?"))
			.bind(email)
			.fetch_optional(db)
			.await?;
		Ok(user)
	}

	pub async fn get_all(db: &Db) -> Result<Vec<User>> {
		let users = sqlx::query_as(&format!("SELECT {COLUMNS} FROM users ORDER BY id"))
			.fetch_all(db)
			.await?;
		Ok(users)
	}

	pub async fn create(db: &Db, new: NewUser) -> Result<User> {
		validate::check(&new).map_err(|err| error::refused("user", err))?;

		let now = Utc::now();
		let id = sqlx::query(
			r#"
INSERT INTO users
	(email, password, first_name, middle_name, last_name, created_at, updated_at, role, is_active)
VALUES
	(?, ?, ?, ?, ?, ?, ?, ?, ?)
		"#,
		)
		.bind(&new.email)
		.bind(&new.password)
		.bind(&new.first_name)
		.bind(&new.middle_name)
		.bind(&new.last_name)
		.bind(now)
		.bind(now)
		.bind(Role::default())
		.bind(false)
		.execute(db)
		.await
		.map_err(|err| error::on_insert("user", err))?
		.last_insert_rowid();

		debug!(id, email = %new.email, "user created");
		Self::get_by_id(db, id)
			.await?
			.ok_or_else(|| sqlx::Error::RowNotFound.into())
	}

	/// Applies `changes` and writes the whole record back. `self` is left
	/// untouched when the store refuses the write.
	pub async fn update(&mut self, db: &Db, changes: UserUpdate) -> Result<()> {
		let mut merged = self.clone();
		if !changes.is_empty() {
			merged.updated_at = Utc::now();
		}
		let UserUpdate {
			first_name,
			middle_name,
			last_name,
			password,
			role,
			is_active,
		} = changes;
		if let Some(first_name) = first_name {
			merged.first_name = Some(first_name);
		}
		if let Some(middle_name) = middle_name {
			merged.middle_name = Some(middle_name);
		}
		if let Some(last_name) = last_name {
			merged.last_name = Some(last_name);
		}
		if let Some(password) = password {
			merged.password = password;
		}
		if let Some(role) = role {
			merged.role = role;
		}
		if let Some(is_active) = is_active {
			merged.is_active = is_active;
		}

		sqlx::query(
			r#"
UPDATE users SET
	first_name = ?, middle_name = ?, last_name = ?, password = ?,
	updated_at = ?, role = ?, is_active = ?
WHERE
	id = ?
		"#,
		)
		.bind(&merged.first_name)
		.bind(&merged.middle_name)
		.bind(&merged.last_name)
		.bind(&merged.password)
		.bind(merged.updated_at)
		.bind(merged.role)
		.bind(merged.is_active)
		.bind(merged.id)
		.execute(db)
		.await?;

		*self = merged;
		debug!(id = self.id, "user updated");
		Ok(())
	}

	/// Removes the user and, through the store, every order they hold.
	pub async fn delete_by_id(db: &Db, id: Uid) -> Result<bool> {
		let removed = sqlx::query("DELETE FROM users WHERE id = ?")
			.bind(id)
			.execute(db)
			.await?
			.rows_affected();
		if removed > 0 {
			debug!(id, "user deleted");
		}
		Ok(removed > 0)
	}

	pub fn role_name(&self) -> &'static str {
		self.role.name()
	}

	pub fn to_dict(&self) -> Value {
		json!({
			"id": self.id,
			"first_name": self.first_name,
			"middle_name": self.middle_name,
			"last_name": self.last_name,
			"email": self.email,
			"created_at": epoch(&self.created_at),
			"updated_at": epoch(&self.updated_at),
			"role": self.role.code(),
			"is_active": self.is_active,
		})
	}
}

impl fmt::Display for User {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fn name(part: &Option<String>) -> &str {
			part.as_deref().unwrap_or("")
		}
		write!(
			f,
			"User(id={}, first_name='{}', middle_name='{}', last_name='{}', email='{}', \
			 created_at={}, updated_at={}, role={}, is_active={})",
			self.id,
			name(&self.first_name),
			name(&self.middle_name),
			name(&self.last_name),
			self.email,
			epoch(&self.created_at),
			epoch(&self.updated_at),
			self.role.code(),
			self.is_active,
		)
	}
}
