//! Borrowing records.
//!
//! An order ties a user to a book from `created_at` until `end_at`. While
//! `end_at` is unset the book is out. Orders go away with their user or book.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::FromRow;
use tracing::debug;

use crate::book::Book;
use crate::error::{self, Result};
use crate::sql::Db;
use crate::types::{epoch, Bid, Oid, Uid};
use crate::user::User;

const COLUMNS: &str = "id, user_id, book_id, created_at, end_at, planned_end_at";

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Order {
	pub id: Oid,
	pub user_id: Uid,
	pub book_id: Bid,
	pub created_at: DateTime<Utc>,
	pub end_at: Option<DateTime<Utc>>,
	pub planned_end_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
	pub user_id: Uid,
	pub book_id: Bid,
	pub planned_end_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderUpdate {
	pub planned_end_at: Option<DateTime<Utc>>,
	pub end_at: Option<DateTime<Utc>>,
}

impl Order {
	pub async fn get_by_id(db: &Db, id: Oid) -> Result<Option<Order>> {
		let order = sqlx::query_as(&format!("SELECT {COLUMNS} FROM orders WHERE id = ?"))
			.bind(id)
			.fetch_optional(db)
			.await?;
		Ok(order)
	}

	pub async fn get_all(db: &Db) -> Result<Vec<Order>> {
		let orders = sqlx::query_as(&format!("SELECT {COLUMNS} FROM orders ORDER BY id"))
			.fetch_all(db)
			.await?;
		Ok(orders)
	}

	/// Orders whose book has not come back yet.
	pub async fn get_not_returned_books(db: &Db) -> Result<Vec<Order>> {
		let orders = sqlx::query_as(&format!(
			"SELECT {COLUMNS} FROM orders WHERE end_at IS NULL ORDER BY id"
		))
		.fetch_all(db)
		.await?;
		Ok(orders)
	}

	/// Fails with a constraint error when the user or the book does not exist.
	pub async fn create(db: &Db, new: NewOrder) -> Result<Order> {
		let created_at = Utc::now();
		let id = sqlx::query(
			r#"
INSERT INTO orders
	(user_id, book_id, created_at, end_at, planned_end_at)
VALUES
	(?, ?, ?, NULL, ?)
		"#,
		)
		.bind(new.user_id)
		.bind(new.book_id)
		.bind(created_at)
		.bind(new.planned_end_at)
		.execute(db)
		.await
		.map_err(|err| error::on_insert("order", err))?
		.last_insert_rowid();

		debug!(id, user_id = new.user_id, book_id = new.book_id, "order created");
		Self::get_by_id(db, id)
			.await?
			.ok_or_else(|| sqlx::Error::RowNotFound.into())
	}

	pub async fn update(&mut self, db: &Db, changes: OrderUpdate) -> Result<()> {
		let mut merged = self.clone();
		if let Some(planned_end_at) = changes.planned_end_at {
			merged.planned_end_at = planned_end_at;
		}
		if let Some(end_at) = changes.end_at {
			merged.end_at = Some(end_at);
		}

		sqlx::query("UPDATE orders SET planned_end_at = ?, end_at = ? WHERE id = ?")
			.bind(merged.planned_end_at)
			.bind(merged.end_at)
			.bind(merged.id)
			.execute(db)
			.await?;

		*self = merged;
		debug!(id = self.id, returned = self.is_returned(), "order updated");
		Ok(())
	}

	pub async fn delete_by_id(db: &Db, id: Oid) -> Result<bool> {
		let removed = sqlx::query("DELETE FROM orders WHERE id = ?")
			.bind(id)
			.execute(db)
			.await?
			.rows_affected();
		if removed > 0 {
			debug!(id, "order deleted");
		}
		Ok(removed > 0)
	}

	pub fn is_returned(&self) -> bool {
		self.end_at.is_some()
	}

	pub async fn user(&self, db: &Db) -> Result<Option<User>> {
		User::get_by_id(db, self.user_id).await
	}

	pub async fn book(&self, db: &Db) -> Result<Option<Book>> {
		Book::get_by_id(db, self.book_id).await
	}

	/// Human-readable line naming the book by title and the user by email.
	pub async fn describe(&self, db: &Db) -> Result<String> {
		let book = self.book(db).await?.map(|b| b.title).unwrap_or_default();
		let user = self.user(db).await?.map(|u| u.email).unwrap_or_default();
		let end_at = self
			.end_at
			.map_or_else(|| "None".to_string(), |at| at.to_rfc3339());
		Ok(format!(
			"Order(id={}, book='{}', user='{}', created_at={}, end_at={})",
			self.id,
			book,
			user,
			self.created_at.to_rfc3339(),
			end_at
		))
	}

	pub fn to_dict(&self) -> Value {
		json!({
			"id": self.id,
			"book": self.book_id,
			"user": self.user_id,
			"created_at": epoch(&self.created_at),
			"end_at": self.end_at.as_ref().map(epoch),
			"plated_end_at": epoch(&self.planned_end_at),
		})
	}
}

impl fmt::Display for Order {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Order(id={})", self.id)
	}
}
