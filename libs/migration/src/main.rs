//! Schema CLI for the accounts database: `cargo run -p migration -- up`.
//! Reads `DATABASE_URL`.

use sea_orm_migration::cli;

#[tokio::main]
async fn main() {
    cli::run_cli(migration::Migrator).await;
}
