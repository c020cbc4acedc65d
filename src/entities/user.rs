//! User entity - Represents a player account.
//!
//! Accounts are keyed by Discord user ID and accumulate EXP from minigames.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Discord user ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Experience points earned from games
    pub exp: i64,
    /// Number of Twisted Roulette games won
    pub roulette_wins: i32,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

/// Users have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
