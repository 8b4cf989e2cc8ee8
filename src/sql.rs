use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Executor, Pool, Sqlite};
use tracing::debug;

use crate::config::Config;

pub type Db = Pool<Sqlite>;

pub const TABLE_SCHEMA: &str = r#"

CREATE TABLE IF NOT EXISTS users (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	first_name TEXT DEFAULT NULL CHECK(length(first_name) <= 20),
	middle_name TEXT DEFAULT NULL CHECK(length(middle_name) <= 20),
	last_name TEXT DEFAULT NULL CHECK(length(last_name) <= 20),
	email TEXT NOT NULL UNIQUE CHECK(length(email) <= 100),
	password TEXT NOT NULL CHECK(length(password) <= 128),
	created_at DATETIME NOT NULL,
	updated_at DATETIME NOT NULL,
	role INTEGER NOT NULL DEFAULT 0 CHECK(role IN (0, 1)),
	is_active BOOLEAN NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS authors (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	name TEXT NOT NULL DEFAULT '' CHECK(length(name) <= 20),
	surname TEXT NOT NULL DEFAULT '' CHECK(length(surname) <= 20),
	patronymic TEXT NOT NULL DEFAULT '' CHECK(length(patronymic) <= 20)
);

CREATE TABLE IF NOT EXISTS books (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	title TEXT NOT NULL CHECK(length(title) <= 255),
	description TEXT DEFAULT NULL,
	author TEXT NOT NULL CHECK(length(author) <= 255),
	count INTEGER NOT NULL DEFAULT 1 CHECK(count >= 0)
);

CREATE TABLE IF NOT EXISTS orders (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	user_id INTEGER NOT NULL,
	book_id INTEGER NOT NULL,
	created_at DATETIME NOT NULL,
	end_at DATETIME DEFAULT NULL,
	planned_end_at DATETIME NOT NULL,
	FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE,
	FOREIGN KEY(book_id) REFERENCES books(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS orders_user_id ON orders(user_id);
CREATE INDEX IF NOT EXISTS orders_book_id ON orders(book_id);

"#;

pub async fn connect(config: &Config) -> Result<Db, sqlx::Error> {
	let options = SqliteConnectOptions::from_str(&config.database_url)?
		.create_if_missing(true)
		.foreign_keys(true);

	debug!(url = %config.database_url, max_connections = config.max_connections, "opening pool");
	SqlitePoolOptions::new()
		.max_connections(config.max_connections)
		.acquire_timeout(config.acquire_timeout)
		.connect_with(options)
		.await
}

/// A private in-memory database with the schema applied.
///
/// Every connection to `:memory:` is its own database, so the pool is pinned
/// to one connection that never expires.
pub async fn open_in_memory() -> Result<Db, sqlx::Error> {
	let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
	let db = SqlitePoolOptions::new()
		.max_connections(1)
		.min_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect_with(options)
		.await?;
	schema(&db).await?;
	Ok(db)
}

pub async fn schema(db: &Db) -> Result<(), sqlx::Error> {
	db.execute(TABLE_SCHEMA).await?;
	Ok(())
}
