use sea_orm_migration::prelude::*;

use littlenote_login_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
