//! Account business logic - Handles player accounts and EXP.
//!
//! Accounts are optional: games are playable without one, but rewards are only credited to
//! players who have created an account. All EXP changes are single `UPDATE` statements so
//! concurrent rewards never lose an increment.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, info};

/// Creates a fresh account with zero EXP.
///
/// Fails with [`Error::AccountExists`] if the user already has one.
pub async fn create_account(db: &DatabaseConnection, user_id: &str) -> Result<user::Model> {
    if get_account(db, user_id).await?.is_some() {
        return Err(Error::AccountExists {
            user_id: user_id.to_string(),
        });
    }

    let account = user::ActiveModel {
        id: Set(user_id.to_string()),
        exp: Set(0),
        roulette_wins: Set(0),
        created_at: Set(chrono::Utc::now()),
    };

    let model = account.insert(db).await?;
    info!(user_id, "Created account");
    Ok(model)
}

/// Looks up an account by Discord user ID.
pub async fn get_account<C>(db: &C, user_id: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Looks up an account, failing with [`Error::AccountNotFound`] when there is none.
pub async fn require_account(db: &DatabaseConnection, user_id: &str) -> Result<user::Model> {
    get_account(db, user_id)
        .await?
        .ok_or_else(|| Error::AccountNotFound {
            user_id: user_id.to_string(),
        })
}

/// Permanently deletes an account.
pub async fn delete_account(db: &DatabaseConnection, user_id: &str) -> Result<()> {
    let result = User::delete_by_id(user_id.to_string()).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::AccountNotFound {
            user_id: user_id.to_string(),
        });
    }
    info!(user_id, "Deleted account");
    Ok(())
}

/// Atomically adds EXP to an account.
///
/// Returns `None` when the user has no account; nothing is written in that case.
pub async fn add_exp<C>(db: &C, user_id: &str, amount: u32) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    let result = User::update_many()
        .col_expr(
            user::Column::Exp,
            Expr::col(user::Column::Exp).add(i64::from(amount)),
        )
        .filter(user::Column::Id.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        debug!(user_id, amount, "No account to credit EXP to");
        return Ok(None);
    }

    get_account(db, user_id).await
}

/// Credits a Twisted Roulette win and its EXP reward in one transaction.
///
/// Returns `None` when the winner has no account.
pub async fn record_roulette_win(
    db: &DatabaseConnection,
    user_id: &str,
    exp: u32,
) -> Result<Option<user::Model>> {
    let txn = db.begin().await?;

    let result = User::update_many()
        .col_expr(
            user::Column::RouletteWins,
            Expr::col(user::Column::RouletteWins).add(1),
        )
        .col_expr(
            user::Column::Exp,
            Expr::col(user::Column::Exp).add(i64::from(exp)),
        )
        .filter(user::Column::Id.eq(user_id))
        .exec(&txn)
        .await?;

    if result.rows_affected == 0 {
        txn.rollback().await?;
        return Ok(None);
    }

    let updated = get_account(&txn, user_id).await?;
    txn.commit().await?;
    Ok(updated)
}

/// Top accounts by EXP, oldest account first on ties.
pub async fn leaderboard(db: &DatabaseConnection, limit: u64) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_desc(user::Column::Exp)
        .order_by_asc(user::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_and_get_account() -> Result<()> {
        let db = setup_test_db().await?;

        let account = create_account(&db, "1001").await?;
        assert_eq!(account.id, "1001");
        assert_eq!(account.exp, 0);
        assert_eq!(account.roulette_wins, 0);

        let found = get_account(&db, "1001").await?.unwrap();
        assert_eq!(found, account);
        assert!(get_account(&db, "9999").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_account_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        create_account(&db, "1001").await?;

        let result = create_account(&db, "1001").await;
        assert!(matches!(result, Err(Error::AccountExists { user_id }) if user_id == "1001"));
        Ok(())
    }

    #[tokio::test]
    async fn test_require_account_missing() -> Result<()> {
        let db = setup_test_db().await?;
        let result = require_account(&db, "42").await;
        assert!(matches!(result, Err(Error::AccountNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_account() -> Result<()> {
        let db = setup_test_db().await?;
        create_account(&db, "1001").await?;

        delete_account(&db, "1001").await?;
        assert!(get_account(&db, "1001").await?.is_none());

        let again = delete_account(&db, "1001").await;
        assert!(matches!(again, Err(Error::AccountNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_exp_accumulates() -> Result<()> {
        let db = setup_test_db().await?;
        create_account(&db, "1001").await?;

        add_exp(&db, "1001", 15).await?;
        let updated = add_exp(&db, "1001", 10).await?.unwrap();
        assert_eq!(updated.exp, 25);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_exp_without_account_is_noop() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(add_exp(&db, "ghost", 10).await?.is_none());
        assert!(get_account(&db, "ghost").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_record_roulette_win() -> Result<()> {
        let db = setup_test_db().await?;
        create_account(&db, "1001").await?;

        record_roulette_win(&db, "1001", 50).await?;
        let account = record_roulette_win(&db, "1001", 50).await?.unwrap();
        assert_eq!(account.roulette_wins, 2);
        assert_eq!(account.exp, 100);

        assert!(record_roulette_win(&db, "ghost", 50).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_leaderboard_orders_by_exp() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account_with_exp(&db, "low", 5).await?;
        create_test_account_with_exp(&db, "high", 500).await?;
        create_test_account_with_exp(&db, "mid", 50).await?;

        let top = leaderboard(&db, 2).await?;
        let ids: Vec<&str> = top.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid"]);
        Ok(())
    }
}
