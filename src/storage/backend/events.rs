//! Event and attendance operations

use chrono::{NaiveDate, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tracing::{info, warn};

use super::converters::{model_to_attendance, model_to_event};
use super::{SeaOrmStorage, db_error, retry};
use crate::errors::{PortalError, Result};
use crate::storage::models::{Attendance, Event};

use migration::entities::{event, event_attendance};

impl SeaOrmStorage {
    pub async fn list_events(&self) -> Result<Vec<Event>> {
        let db = &self.db;
        let models = retry::with_retry("list_events", self.retry_config, || async {
            event::Entity::find()
                .order_by_desc(event::Column::CreatedAt)
                .order_by_desc(event::Column::Id)
                .all(db)
                .await
        })
        .await
        .map_err(|e| db_error("list events", e))?;

        Ok(models.into_iter().map(model_to_event).collect())
    }

    pub async fn get_event(&self, id: i32) -> Result<Option<Event>> {
        let db = &self.db;
        let model = retry::with_retry("get_event", self.retry_config, || async {
            event::Entity::find_by_id(id).one(db).await
        })
        .await
        .map_err(|e| db_error("get event", e))?;

        Ok(model.map(model_to_event))
    }

    /// 当前活动事件：多个活动行并存时取最新创建的一条
    pub async fn get_active_event(&self) -> Result<Option<Event>> {
        let db = &self.db;
        let model = retry::with_retry("get_active_event", self.retry_config, || async {
            event::Entity::find()
                .filter(event::Column::IsActive.eq(true))
                .order_by_desc(event::Column::CreatedAt)
                .order_by_desc(event::Column::Id)
                .one(db)
                .await
        })
        .await
        .map_err(|e| db_error("get active event", e))?;

        Ok(model.map(model_to_event))
    }

    pub async fn insert_event(
        &self,
        name: &str,
        event_date: Option<NaiveDate>,
        is_active: bool,
    ) -> Result<Event> {
        let model = event::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            event_date: Set(event_date),
            is_active: Set(is_active),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_error("insert event", e))?;

        info!("Event created: {} (active={})", model.name, model.is_active);
        Ok(model_to_event(model))
    }

    /// 激活事件并在同一事务内取消其它活动事件
    pub async fn activate_event(&self, id: i32) -> Result<Event> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))?;

        let Some(target) = event::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| db_error("get event", e))?
        else {
            return Err(PortalError::not_found(format!("Event {} not found", id)));
        };

        let deactivated = event::Entity::update_many()
            .col_expr(event::Column::IsActive, Expr::value(false))
            .filter(event::Column::IsActive.eq(true))
            .filter(event::Column::Id.ne(id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("deactivate events", e))?;

        let mut active: event::ActiveModel = target.into();
        active.is_active = Set(true);
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| db_error("activate event", e))?;

        txn.commit()
            .await
            .map_err(|e| db_error("commit transaction", e))?;

        info!(
            "Event {} activated ({} other events deactivated)",
            id, deactivated.rows_affected
        );
        Ok(model_to_event(updated))
    }

    /// 返回当前活动事件；不存在时创建一个默认活动事件
    pub async fn ensure_active_event(&self, default_name: &str) -> Result<Event> {
        if let Some(active) = self.get_active_event().await? {
            return Ok(active);
        }

        warn!("No active event found, creating default '{}'", default_name);
        let today = Utc::now().date_naive();
        self.insert_event(default_name, Some(today), true).await
    }

    // ---- attendance ----

    pub async fn list_attendance(&self, event_id: i32) -> Result<Vec<Attendance>> {
        let db = &self.db;
        let models = retry::with_retry("list_attendance", self.retry_config, || async {
            event_attendance::Entity::find()
                .filter(event_attendance::Column::EventId.eq(event_id))
                .order_by_asc(event_attendance::Column::ParticipantId)
                .all(db)
                .await
        })
        .await
        .map_err(|e| db_error("list attendance", e))?;

        Ok(models.into_iter().map(model_to_attendance).collect())
    }

    /// 按 (event_id, participant_id) 单语句 upsert 出勤标记
    pub async fn upsert_attendance(
        &self,
        event_id: i32,
        participant_id: i32,
        present: bool,
    ) -> Result<Attendance> {
        let db = &self.db;
        let now = Utc::now();
        let model = event_attendance::ActiveModel {
            id: NotSet,
            event_id: Set(event_id),
            participant_id: Set(participant_id),
            present: Set(present),
            marked_at: Set(now),
        };
        let on_conflict = OnConflict::columns([
            event_attendance::Column::EventId,
            event_attendance::Column::ParticipantId,
        ])
        .update_columns([
            event_attendance::Column::Present,
            event_attendance::Column::MarkedAt,
        ])
        .to_owned();

        retry::with_retry("upsert_attendance", self.retry_config, || async {
            event_attendance::Entity::insert(model.clone())
                .on_conflict(on_conflict.clone())
                .exec_without_returning(db)
                .await
        })
        .await
        .map_err(|e| db_error("upsert attendance", e))?;

        let stored = event_attendance::Entity::find()
            .filter(event_attendance::Column::EventId.eq(event_id))
            .filter(event_attendance::Column::ParticipantId.eq(participant_id))
            .one(db)
            .await
            .map_err(|e| db_error("get attendance", e))?
            .ok_or_else(|| {
                PortalError::database_operation("attendance row missing after upsert")
            })?;

        Ok(model_to_attendance(stored))
    }

    /// 删除出勤标记，返回是否存在
    pub async fn delete_attendance(&self, event_id: i32, participant_id: i32) -> Result<bool> {
        let result = event_attendance::Entity::delete_many()
            .filter(event_attendance::Column::EventId.eq(event_id))
            .filter(event_attendance::Column::ParticipantId.eq(participant_id))
            .exec(&self.db)
            .await
            .map_err(|e| db_error("delete attendance", e))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_present(&self, event_id: i32) -> Result<u64> {
        event_attendance::Entity::find()
            .filter(event_attendance::Column::EventId.eq(event_id))
            .filter(event_attendance::Column::Present.eq(true))
            .count(&self.db)
            .await
            .map_err(|e| db_error("count attendance", e))
    }
}
