use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A stored task row, keyed by owner and task id.
///
/// Dates are kept as `YYYY-MM-DD` text and status as its wire value
/// (`PENDING`, `IN_PROGRESS`, `COMPLETED`).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub description: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: String,
    /// Unix milliseconds; keeps lists in insertion order
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
