// library store bootstrap: open the database, make sure the tables exist

use library_store::{sql, Book, Config, Order, User};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	if let Err(e) = fmt().with_env_filter(EnvFilter::from_default_env()).try_init() {
		warn!(error = %e, "tracing init failed");
	}

	let config = Config::from_env()?;
	let db = sql::connect(&config).await?;
	sql::schema(&db).await?;

	let users = User::get_all(&db).await?.len();
	let books = Book::get_all(&db).await?.len();
	let outstanding = Order::get_not_returned_books(&db).await?.len();
	info!(url = %config.database_url, users, books, outstanding, "library database ready");

	db.close().await;
	Ok(())
}
