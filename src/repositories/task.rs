//! Task repository for database operations.

use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::task;

/// Repository for task-related database operations.
pub struct TaskRepository;

impl TaskRepository {
    /// All tasks owned by `user_id`, oldest first.
    pub async fn get_for_user<C>(conn: &C, user_id: &str) -> Result<Vec<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find()
            .filter(task::Column::UserId.eq(user_id))
            .order_by_asc(task::Column::CreatedAt)
            .order_by_asc(task::Column::Id)
            .all(conn)
            .await?)
    }

    /// Tasks owned by `user_id` with the given wire status.
    pub async fn get_for_user_with_status<C>(conn: &C, user_id: &str, status: &str) -> Result<Vec<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find()
            .filter(task::Column::UserId.eq(user_id))
            .filter(task::Column::Status.eq(status))
            .order_by_asc(task::Column::CreatedAt)
            .order_by_asc(task::Column::Id)
            .all(conn)
            .await?)
    }

    /// Get a single task by owner and id.
    pub async fn get_by_id<C>(conn: &C, user_id: &str, id: &str) -> Result<Option<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find_by_id((user_id.to_string(), id.to_string()))
            .one(conn)
            .await?)
    }

    /// Insert a task, or overwrite its editable columns when it already exists.
    ///
    /// `created_at` of an existing row is preserved.
    pub async fn upsert<C>(conn: &C, model: task::Model) -> Result<()>
    where
        C: ConnectionTrait,
    {
        task::Entity::insert(Self::to_active_model(model))
            .on_conflict(Self::on_conflict())
            .exec_without_returning(conn)
            .await?;
        Ok(())
    }

    /// Replace every task of `user_id` with `status` by `models`.
    ///
    /// Rows in `models` that are stored under another status are moved over.
    pub async fn replace_status<C>(conn: &C, user_id: &str, status: &str, models: Vec<task::Model>) -> Result<()>
    where
        C: ConnectionTrait,
    {
        task::Entity::delete_many()
            .filter(task::Column::UserId.eq(user_id))
            .filter(task::Column::Status.eq(status))
            .exec(conn)
            .await?;

        if models.is_empty() {
            return Ok(());
        }

        task::Entity::insert_many(models.into_iter().map(Self::to_active_model))
            .on_conflict(Self::on_conflict())
            .exec_without_returning(conn)
            .await?;
        Ok(())
    }

    /// Delete a task. Returns whether a row was removed.
    pub async fn delete<C>(conn: &C, user_id: &str, id: &str) -> Result<bool>
    where
        C: ConnectionTrait,
    {
        let result = task::Entity::delete_many()
            .filter(task::Column::UserId.eq(user_id))
            .filter(task::Column::Id.eq(id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Delete every task owned by `user_id`.
    pub async fn delete_for_user<C>(conn: &C, user_id: &str) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        let result = task::Entity::delete_many()
            .filter(task::Column::UserId.eq(user_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }

    fn to_active_model(model: task::Model) -> task::ActiveModel {
        task::ActiveModel {
            user_id: ActiveValue::Set(model.user_id),
            id: ActiveValue::Set(model.id),
            title: ActiveValue::Set(model.title),
            description: ActiveValue::Set(model.description),
            start_date: ActiveValue::Set(model.start_date),
            end_date: ActiveValue::Set(model.end_date),
            status: ActiveValue::Set(model.status),
            created_at: ActiveValue::Set(model.created_at),
        }
    }

    fn on_conflict() -> OnConflict {
        OnConflict::columns([task::Column::UserId, task::Column::Id])
            .update_columns([
                task::Column::Title,
                task::Column::Description,
                task::Column::StartDate,
                task::Column::EndDate,
                task::Column::Status,
            ])
            .to_owned()
    }
}
