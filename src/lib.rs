//! Data access for a small library: users, authors, books and the orders
//! that lend books to users, stored in SQLite.
//!
//! ```no_run
//! use library_store::{sql, NewUser, User};
//!
//! # async fn run() -> library_store::Result<()> {
//! let db = sql::open_in_memory().await?;
//! let user = User::create(&db, NewUser::new("reader@lib.org", "secret")).await?;
//! assert_eq!(user.role_name(), "visitor");
//! # Ok(())
//! # }
//! ```

pub mod author;
pub mod book;
pub mod config;
pub mod error;
pub mod order;
pub mod sql;
pub mod types;
pub mod user;
mod validate;

pub use author::{Author, AuthorUpdate, NewAuthor};
pub use book::{Book, BookUpdate, NewBook};
pub use config::{Config, ConfigError};
pub use error::{CreateError, Error, Result};
pub use order::{NewOrder, Order, OrderUpdate};
pub use types::{Aid, Bid, Oid, Role, Uid};
pub use user::{NewUser, User, UserUpdate};
