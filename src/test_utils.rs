//! Shared test utilities for Nivara.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test accounts.

use crate::{core::account, entities, errors::Result};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all database tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test account that already has `exp` EXP.
pub async fn create_test_account_with_exp(
    db: &DatabaseConnection,
    user_id: &str,
    exp: u32,
) -> Result<entities::UserModel> {
    account::create_account(db, user_id).await?;
    account::add_exp(db, user_id, exp).await?;
    account::require_account(db, user_id).await
}
