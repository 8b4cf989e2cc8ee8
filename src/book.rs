use std::fmt;

use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::FromRow;
use tracing::debug;
use validator::Validate;

use crate::error::{self, Result};
use crate::sql::Db;
use crate::types::Bid;
use crate::validate;

/// A catalog entry. `author` is free text, not a link to
/// [`Author`](crate::author::Author).
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Book {
	pub id: Bid,
	pub title: String,
	pub description: Option<String>,
	pub author: String,
	pub count: u32,
}

fn one() -> u32 {
	1
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewBook {
	#[validate(custom(function = "validate::not_blank"), length(max = 255))]
	pub title: String,
	#[validate(custom(function = "validate::not_blank"), length(max = 255))]
	pub author: String,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default = "one")]
	pub count: u32,
}

impl NewBook {
	pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
		NewBook {
			title: title.into(),
			author: author.into(),
			description: None,
			count: one(),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookUpdate {
	pub title: Option<String>,
	pub description: Option<String>,
	pub author: Option<String>,
	pub count: Option<u32>,
}

impl Book {
	pub async fn get_by_id(db: &Db, id: Bid) -> Result<Option<Book>> {
		let book = sqlx::query_as("SELECT id, title, description, author, count FROM books WHERE id = ?")
			.bind(id)
			.fetch_optional(db)
			.await?;
		Ok(book)
	}

	pub async fn get_all(db: &Db) -> Result<Vec<Book>> {
		let books = sqlx::query_as("SELECT id, title, description, author, count FROM books ORDER BY id")
			.fetch_all(db)
			.await?;
		Ok(books)
	}

	pub async fn create(db: &Db, new: NewBook) -> Result<Book> {
		validate::check(&new).map_err(|err| error::refused("book", err))?;

		let id = sqlx::query(
			r#"
INSERT INTO books
	(title, description, author, count)
VALUES
	(?, ?, ?, ?)
		"#,
		)
		.bind(&new.title)
		.bind(&new.description)
		.bind(&new.author)
		.bind(new.count)
		.execute(db)
		.await
		.map_err(|err| error::on_insert("book", err))?
		.last_insert_rowid();

		debug!(id, title = %new.title, "book created");
		Self::get_by_id(db, id)
			.await?
			.ok_or_else(|| sqlx::Error::RowNotFound.into())
	}

	/// `self` only takes the changes once the store has accepted them.
	pub async fn update(&mut self, db: &Db, changes: BookUpdate) -> Result<()> {
		let mut merged = self.clone();
		if let Some(title) = changes.title {
			merged.title = title;
		}
		if let Some(description) = changes.description {
			merged.description = Some(description);
		}
		if let Some(author) = changes.author {
			merged.author = author;
		}
		if let Some(count) = changes.count {
			merged.count = count;
		}

		sqlx::query("UPDATE books SET title = ?, description = ?, author = ?, count = ? WHERE id = ?")
			.bind(&merged.title)
			.bind(&merged.description)
			.bind(&merged.author)
			.bind(merged.count)
			.bind(merged.id)
			.execute(db)
			.await?;

		*self = merged;
		debug!(id = self.id, "book updated");
		Ok(())
	}

	/// Removes the book and, through the store, every order for it.
	pub async fn delete_by_id(db: &Db, id: Bid) -> Result<bool> {
		let removed = sqlx::query("DELETE FROM books WHERE id = ?")
			.bind(id)
			.execute(db)
			.await?
			.rows_affected();
		if removed > 0 {
			debug!(id, "book deleted");
		}
		Ok(removed > 0)
	}

	pub fn to_dict(&self) -> Value {
		json!({
			"id": self.id,
			"title": self.title,
			"description": self.description,
			"author": self.author,
			"count": self.count,
		})
	}
}

impl fmt::Display for Book {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.title)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::{CreateError, Error};
	use crate::sql::open_in_memory;
	use rstest::rstest;

	#[tokio::test]
	async fn create_defaults_count_to_one() {
		let db = open_in_memory().await.unwrap();
		let book = Book::create(&db, NewBook::new("War and Peace", "Tolstoy")).await.unwrap();

		assert_eq!(book.count, 1);
		assert_eq!(book.description, None);
		assert_eq!(Book::get_by_id(&db, book.id).await.unwrap().unwrap(), book);
		assert_eq!(book.to_string(), "War and Peace");
	}

	#[test]
	fn count_defaults_when_deserialized() {
		let new: NewBook = serde_json::from_value(json!({ "title": "Dune", "author": "Herbert" })).unwrap();
		assert_eq!(new.count, 1);
		assert!(serde_json::from_value::<NewBook>(json!({ "title": "Dune", "author": "Herbert", "count": -1 })).is_err());
	}

	#[tokio::test]
	async fn dict_holds_every_column() {
		let db = open_in_memory().await.unwrap();
		let book = Book::create(
			&db,
			NewBook {
				description: Some("a long one".into()),
				count: 3,
				..NewBook::new("War and Peace", "Tolstoy")
			},
		)
		.await
		.unwrap();

		assert_eq!(
			book.to_dict(),
			json!({
				"id": book.id,
				"title": "War and Peace",
				"description": "a long one",
				"author": "Tolstoy",
				"count": 3,
			})
		);
	}

	#[rstest]
	#[case::empty_title(NewBook::new("", "Tolstoy"))]
	#[case::blank_author(NewBook::new("War and Peace", "  "))]
	#[tokio::test]
	async fn required_fields_must_be_present(#[case] new: NewBook) {
		let db = open_in_memory().await.unwrap();
		let err = Book::create(&db, new).await.unwrap_err();
		assert!(matches!(err, Error::Create(CreateError::Validation { .. })));
	}

	#[tokio::test]
	async fn oversized_title_is_refused() {
		let db = open_in_memory().await.unwrap();
		let err = Book::create(&db, NewBook::new("t".repeat(256), "Tolstoy")).await.unwrap_err();
		match err {
			Error::Create(CreateError::Data { field, max }) => {
				assert_eq!(field, "title");
				assert_eq!(max, 255);
			}
			other => panic!("unexpected {other:?}"),
		}
	}

	#[tokio::test]
	async fn update_overwrites_only_given_fields() {
		let db = open_in_memory().await.unwrap();
		let mut book = Book::create(&db, NewBook::new("War and Peace", "Tolstoy")).await.unwrap();

		book.update(
			&db,
			BookUpdate {
				description: Some(String::new()),
				count: Some(0),
				..BookUpdate::default()
			},
		)
		.await
		.unwrap();

		let stored = Book::get_by_id(&db, book.id).await.unwrap().unwrap();
		assert_eq!(stored, book);
		assert_eq!(stored.title, "War and Peace");
		assert_eq!(stored.description.as_deref(), Some(""));
		assert_eq!(stored.count, 0);

		let before = stored.clone();
		book.update(&db, BookUpdate::default()).await.unwrap();
		assert_eq!(Book::get_by_id(&db, book.id).await.unwrap().unwrap(), before);
	}

	#[tokio::test]
	async fn refused_update_leaves_record_and_row_alone() {
		let db = open_in_memory().await.unwrap();
		let mut book = Book::create(&db, NewBook::new("Dune", "Herbert")).await.unwrap();
		let before = book.clone();

		let err = book
			.update(
				&db,
				BookUpdate {
					title: Some("t".repeat(256)),
					count: Some(4),
					..BookUpdate::default()
				},
			)
			.await
			.unwrap_err();

		assert!(matches!(err, Error::Database(_)));
		assert_eq!(book, before);
		assert_eq!(Book::get_by_id(&db, before.id).await.unwrap().unwrap(), before);
	}

	#[tokio::test]
	async fn delete_by_id() {
		let db = open_in_memory().await.unwrap();
		let book = Book::create(&db, NewBook::new("Dune", "Herbert")).await.unwrap();

		assert!(!Book::delete_by_id(&db, book.id + 1).await.unwrap());
		assert!(Book::delete_by_id(&db, book.id).await.unwrap());
		assert_eq!(Book::get_by_id(&db, book.id).await.unwrap(), None);
	}
}
