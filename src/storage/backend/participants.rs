use chrono::Utc;
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use tracing::{debug, info};

use super::converters::{draft_to_active_model, model_to_participant};
use super::{SeaOrmStorage, db_error, retry};
use crate::errors::{PortalError, Result};
use crate::storage::models::{Participant, ParticipantDraft, ParticipantFilter};

use migration::entities::{event_attendance, participant};

const LIKE_ESCAPE: char = '\\';

/// `%search%`，其中 `%` `_` 与转义符本身按字面匹配
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn filter_condition(filter: &ParticipantFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(search) = filter.search.as_deref() {
        let pattern = contains_pattern(search);
        let like = || LikeExpr::new(pattern.clone()).escape(LIKE_ESCAPE);
        condition = condition.add(
            Condition::any()
                .add(participant::Column::Name.like(like()))
                .add(participant::Column::Phone.like(like()))
                .add(participant::Column::Email.like(like())),
        );
    }
    if let Some(region_id) = filter.region_id {
        condition = condition.add(participant::Column::RegionId.eq(region_id));
    }
    if let Some(majlis_id) = filter.majlis_id {
        condition = condition.add(participant::Column::MajlisId.eq(majlis_id));
    }
    if let Some(category) = filter.category {
        condition = condition.add(participant::Column::Category.eq(category.as_ref()));
    }
    condition
}

impl SeaOrmStorage {
    /// 带过滤条件的分页查询（带 COUNT 缓存）
    pub async fn list_participants(
        &self,
        page: u64,
        page_size: u64,
        filter: &ParticipantFilter,
    ) -> Result<(Vec<Participant>, u64)> {
        let page_index = page.saturating_sub(1);
        if page_size == 0 || page_index.checked_mul(page_size).is_none() {
            return Err(PortalError::validation(format!(
                "Page {} with size {} is out of range",
                page, page_size
            )));
        }

        let cache_key = format!(
            "participants:s={:?}:r={:?}:m={:?}:c={:?}",
            filter.search, filter.region_id, filter.majlis_id, filter.category
        );
        let condition = filter_condition(filter);
        let db = &self.db;

        let total = match self.count_cache.get(&cache_key) {
            Some(cached) => {
                debug!("count cache hit: key={}, value={}", cache_key, cached);
                cached
            }
            None => {
                let count = retry::with_retry("list_participants(count)", self.retry_config, || async {
                    participant::Entity::find()
                        .filter(condition.clone())
                        .count(db)
                        .await
                })
                .await
                .map_err(|e| db_error("count participants", e))?;
                self.count_cache.insert(cache_key, count);
                count
            }
        };

        let models = retry::with_retry("list_participants(data)", self.retry_config, || async {
            participant::Entity::find()
                .filter(condition.clone())
                .order_by_asc(participant::Column::Name)
                .order_by_asc(participant::Column::Id)
                .paginate(db, page_size)
                .fetch_page(page_index)
                .await
        })
        .await
        .map_err(|e| db_error("list participants", e))?;

        Ok((models.into_iter().map(model_to_participant).collect(), total))
    }

    pub async fn get_participant(&self, id: i32) -> Result<Option<Participant>> {
        let db = &self.db;
        let model = retry::with_retry("get_participant", self.retry_config, || async {
            participant::Entity::find_by_id(id).one(db).await
        })
        .await
        .map_err(|e| db_error("get participant", e))?;

        Ok(model.map(model_to_participant))
    }

    pub async fn insert_participant(&self, draft: &ParticipantDraft) -> Result<Participant> {
        let model = draft_to_active_model(draft, None, Utc::now())
            .insert(&self.db)
            .await
            .map_err(|e| db_error("insert participant", e))?;

        self.invalidate_count_cache();
        Ok(model_to_participant(model))
    }

    pub async fn update_participant(
        &self,
        id: i32,
        draft: &ParticipantDraft,
    ) -> Result<Participant> {
        let model = draft_to_active_model(draft, Some(id), Utc::now())
            .update(&self.db)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => {
                    PortalError::not_found(format!("Participant {} not found", id))
                }
                other => db_error("update participant", other),
            })?;

        self.invalidate_count_cache();
        Ok(model_to_participant(model))
    }

    /// 删除参与者及其全部出勤记录
    pub async fn delete_participant(&self, id: i32) -> Result<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))?;

        let marks = event_attendance::Entity::delete_many()
            .filter(event_attendance::Column::ParticipantId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("delete attendance", e))?;

        let result = participant::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| db_error("delete participant", e))?;

        if result.rows_affected == 0 {
            return Err(PortalError::not_found(format!(
                "Participant {} not found",
                id
            )));
        }

        txn.commit()
            .await
            .map_err(|e| db_error("commit transaction", e))?;

        self.invalidate_count_cache();
        info!(
            "Participant deleted: {} ({} attendance marks removed)",
            id, marks.rows_affected
        );
        Ok(())
    }
}
