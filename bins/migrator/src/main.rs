//! Schema migrations for the Folio report catalog and issue log.
//!
//! Reads `DATABASE_URL` from the environment or `.env`.
//!
//! Usage:
//!   migrator up      - Apply pending migrations
//!   migrator down    - Revert the latest migration
//!   migrator status  - List applied and pending migrations
//!   migrator fresh   - Drop everything and migrate from scratch

use folio_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    cli::run_cli(Migrator).await;
}
