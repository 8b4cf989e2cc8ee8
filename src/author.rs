use std::fmt;

use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::FromRow;
use tracing::debug;
use validator::Validate;

use crate::error::{self, Result};
use crate::sql::Db;
use crate::types::Aid;
use crate::validate;

pub const NAME_MAX: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Author {
	pub id: Aid,
	pub name: String,
	pub surname: String,
	pub patronymic: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct NewAuthor {
	#[validate(length(max = 20))]
	pub name: String,
	#[validate(length(max = 20))]
	pub surname: String,
	#[validate(length(max = 20))]
	pub patronymic: String,
}

impl NewAuthor {
	pub fn new(
		name: impl Into<String>,
		surname: impl Into<String>,
		patronymic: impl Into<String>,
	) -> Self {
		NewAuthor {
			name: name.into(),
			surname: surname.into(),
			patronymic: patronymic.into(),
		}
	}
}

/// Partial update. A value longer than [`NAME_MAX`] is dropped rather than
/// rejected, so the rest of the update still lands.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthorUpdate {
	pub name: Option<String>,
	pub surname: Option<String>,
	pub patronymic: Option<String>,
}

fn apply(id: Aid, field: &'static str, slot: &mut String, value: Option<String>) {
	match value {
		Some(value) if validate::fits(&value, NAME_MAX) => *slot = value,
		Some(_) => debug!(id, field, "author update skipped oversized value"),
		None => {}
	}
}

impl Author {
	pub async fn get_by_id(db: &Db, id: Aid) -> Result<Option<Author>> {
		let author = sqlx::query_as("SELECT id, name, surname, patronymic FROM authors WHERE id = ?")
			.bind(id)
			.fetch_optional(db)
			.await?;
		Ok(author)
	}

	pub async fn get_all(db: &Db) -> Result<Vec<Author>> {
		let authors = sqlx::query_as("SELECT id, name, surname, patronymic FROM authors ORDER BY id")
			.fetch_all(db)
			.await?;
		Ok(authors)
	}

	pub async fn create(db: &Db, new: NewAuthor) -> Result<Author> {
		validate::check(&new).map_err(|err| error::refused("author", err))?;

		let id = sqlx::query("INSERT INTO authors (name, surname, patronymic) VALUES (?, ?, ?)")
			.bind(&new.name)
			.bind(&new.surname)
			.bind(&new.patronymic)
			.execute(db)
			.await
			.map_err(|err| error::on_insert("author", err))?
			.last_insert_rowid();

		debug!(id, "author created");
		Self::get_by_id(db, id)
			.await?
			.ok_or_else(|| sqlx::Error::RowNotFound.into())
	}

	pub async fn update(&mut self, db: &Db, changes: AuthorUpdate) -> Result<()> {
		let mut merged = self.clone();
		apply(merged.id, "name", &mut merged.name, changes.name);
		apply(merged.id, "surname", &mut merged.surname, changes.surname);
		apply(merged.id, "patronymic", &mut merged.patronymic, changes.patronymic);

		sqlx::query("UPDATE authors SET name = ?, surname = ?, patronymic = ? WHERE id = ?")
			.bind(&merged.name)
			.bind(&merged.surname)
			.bind(&merged.patronymic)
			.bind(merged.id)
			.execute(db)
			.await?;

		*self = merged;
		debug!(id = self.id, "author updated");
		Ok(())
	}

	pub async fn delete_by_id(db: &Db, id: Aid) -> Result<bool> {
		let removed = sqlx::query("DELETE FROM authors WHERE id = ?")
			.bind(id)
			.execute(db)
			.await?
			.rows_affected();
		if removed > 0 {
			debug!(id, "author deleted");
		}
		Ok(removed > 0)
	}

	pub fn to_dict(&self) -> Value {
		json!({
			"id": self.id,
			"name": self.name,
			"surname": self.surname,
			"patronymic": self.patronymic,
		})
	}
}

impl fmt::Display for Author {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Author(id={}, name='{}', surname='{}', patronymic='{}')",
			self.id, self.name, self.surname, self.patronymic
		)
	}
}
