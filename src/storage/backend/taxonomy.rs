//! Region and majlis operations
//!
//! Inserts go through the code allocator: every candidate is a single INSERT
//! and a unique-index rejection moves on to the next candidate.

use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tracing::info;

use super::converters::{model_to_majlis, model_to_region};
use super::{SeaOrmStorage, db_error, is_unique_violation, retry};
use crate::errors::{PortalError, Result};
use crate::storage::models::{Majlis, Region};
use crate::utils::code_allocator::{InsertOutcome, allocate_with_insert};

use migration::entities::{majlis, participant, region};

/// 更新时的错误映射：唯一冲突 -> Conflict，未命中 -> NotFound
fn map_update_error(entity: &str, id: i32, err: DbErr) -> PortalError {
    if is_unique_violation(&err) {
        PortalError::conflict(format!("Code already in use by another {}", entity))
    } else if matches!(err, DbErr::RecordNotUpdated) {
        PortalError::not_found(format!("{} {} not found", entity, id))
    } else {
        db_error(&format!("update {}", entity), err)
    }
}

impl SeaOrmStorage {
    // ---- regions ----

    pub async fn list_regions(&self) -> Result<Vec<Region>> {
        let db = &self.db;
        let models = retry::with_retry("list_regions", self.retry_config, || async {
            region::Entity::find()
                .order_by_asc(region::Column::Name)
                .all(db)
                .await
        })
        .await
        .map_err(|e| db_error("list regions", e))?;

        Ok(models.into_iter().map(model_to_region).collect())
    }

    pub async fn get_region(&self, id: i32) -> Result<Option<Region>> {
        let db = &self.db;
        let model = retry::with_retry("get_region", self.retry_config, || async {
            region::Entity::find_by_id(id).one(db).await
        })
        .await
        .map_err(|e| db_error("get region", e))?;

        Ok(model.map(model_to_region))
    }

    /// 创建区域，编码由 `seed` 派生并在插入时保证唯一
    pub async fn insert_region(&self, name: &str, seed: &str) -> Result<Region> {
        let db = &self.db;
        let retry_config = self.retry_config;
        let now = Utc::now();

        let created = allocate_with_insert(seed, |code| {
            let model = region::ActiveModel {
                id: NotSet,
                name: Set(name.to_string()),
                code: Set(code),
                created_at: Set(now),
            };
            async move {
                match retry::with_retry("insert_region", retry_config, || {
                    model.clone().insert(db)
                })
                .await
                {
                    Ok(m) => Ok(InsertOutcome::Inserted(model_to_region(m))),
                    Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Taken),
                    Err(e) => Err(db_error("insert region", e)),
                }
            }
        })
        .await?;

        info!("Region created: {} ({})", created.name, created.code);
        Ok(created)
    }

    pub async fn update_region(&self, id: i32, name: &str, code: &str) -> Result<Region> {
        let model = region::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            code: Set(code.to_string()),
            created_at: NotSet,
        };

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| map_update_error("region", id, e))?;
        Ok(model_to_region(updated))
    }

    /// 删除区域；存在下属 majlis 时拒绝且不做任何删除
    pub async fn delete_region(&self, id: i32) -> Result<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))?;

        let dependents = majlis::Entity::find()
            .filter(majlis::Column::RegionId.eq(id))
            .count(&txn)
            .await
            .map_err(|e| db_error("count dependent majlis", e))?;

        if dependents > 0 {
            txn.rollback()
                .await
                .map_err(|e| db_error("rollback transaction", e))?;
            return Err(PortalError::region_has_majlis(format!(
                "Cannot delete region with {} dependent majlis",
                dependents
            )));
        }

        let result = region::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| db_error("delete region", e))?;

        if result.rows_affected == 0 {
            return Err(PortalError::not_found(format!("Region {} not found", id)));
        }

        txn.commit()
            .await
            .map_err(|e| db_error("commit transaction", e))?;

        info!("Region deleted: {}", id);
        Ok(())
    }

    // ---- majlis ----

    pub async fn list_majlis(&self, region_id: Option<i32>) -> Result<Vec<Majlis>> {
        let db = &self.db;
        let models = retry::with_retry("list_majlis", self.retry_config, || async {
            let mut query = majlis::Entity::find();
            if let Some(region_id) = region_id {
                query = query.filter(majlis::Column::RegionId.eq(region_id));
            }
            query.order_by_asc(majlis::Column::Name).all(db).await
        })
        .await
        .map_err(|e| db_error("list majlis", e))?;

        Ok(models.into_iter().map(model_to_majlis).collect())
    }

    pub async fn get_majlis(&self, id: i32) -> Result<Option<Majlis>> {
        let db = &self.db;
        let model = retry::with_retry("get_majlis", self.retry_config, || async {
            majlis::Entity::find_by_id(id).one(db).await
        })
        .await
        .map_err(|e| db_error("get majlis", e))?;

        Ok(model.map(model_to_majlis))
    }

    pub async fn insert_majlis(&self, name: &str, region_id: i32, seed: &str) -> Result<Majlis> {
        let db = &self.db;
        let retry_config = self.retry_config;
        let now = Utc::now();

        let created = allocate_with_insert(seed, |code| {
            let model = majlis::ActiveModel {
                id: NotSet,
                name: Set(name.to_string()),
                region_id: Set(region_id),
                code: Set(code),
                created_at: Set(now),
            };
            async move {
                match retry::with_retry("insert_majlis", retry_config, || {
                    model.clone().insert(db)
                })
                .await
                {
                    Ok(m) => Ok(InsertOutcome::Inserted(model_to_majlis(m))),
                    Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Taken),
                    Err(e) => Err(db_error("insert majlis", e)),
                }
            }
        })
        .await?;

        info!(
            "Majlis created: {} ({}) in region {}",
            created.name, created.code, created.region_id
        );
        Ok(created)
    }

    pub async fn update_majlis(
        &self,
        id: i32,
        name: &str,
        region_id: i32,
        code: &str,
    ) -> Result<Majlis> {
        let model = majlis::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            region_id: Set(region_id),
            code: Set(code.to_string()),
            created_at: NotSet,
        };

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| map_update_error("majlis", id, e))?;
        Ok(model_to_majlis(updated))
    }

    /// 删除 majlis：先解除参与者关联，再删除本行（同一事务）
    pub async fn delete_majlis(&self, id: i32) -> Result<u64> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))?;

        let detached = participant::Entity::update_many()
            .col_expr(participant::Column::MajlisId, Expr::value(Option::<i32>::None))
            .col_expr(participant::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(participant::Column::MajlisId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("detach participants", e))?;

        let result = majlis::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| db_error("delete majlis", e))?;

        if result.rows_affected == 0 {
            return Err(PortalError::not_found(format!("Majlis {} not found", id)));
        }

        txn.commit()
            .await
            .map_err(|e| db_error("commit transaction", e))?;

        if detached.rows_affected > 0 {
            self.invalidate_count_cache();
        }
        info!(
            "Majlis deleted: {} ({} participants detached)",
            id, detached.rows_affected
        );
        Ok(detached.rows_affected)
    }
}
