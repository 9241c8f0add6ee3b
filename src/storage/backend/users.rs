use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use tracing::info;

use super::converters::model_to_sub_user;
use super::{SeaOrmStorage, db_error, is_unique_violation, retry};
use crate::errors::{PortalError, Result};
use crate::storage::models::{SubUser, UserRole};

use migration::entities::sub_user;

fn map_write_error(action: &str, err: DbErr) -> PortalError {
    if is_unique_violation(&err) {
        PortalError::conflict("Username already exists")
    } else {
        db_error(action, err)
    }
}

impl SeaOrmStorage {
    pub async fn list_sub_users(&self) -> Result<Vec<SubUser>> {
        let db = &self.db;
        let models = retry::with_retry("list_sub_users", self.retry_config, || async {
            sub_user::Entity::find()
                .order_by_asc(sub_user::Column::Username)
                .all(db)
                .await
        })
        .await
        .map_err(|e| db_error("list sub users", e))?;

        Ok(models.into_iter().map(model_to_sub_user).collect())
    }

    pub async fn get_sub_user(&self, id: i32) -> Result<Option<SubUser>> {
        let db = &self.db;
        let model = retry::with_retry("get_sub_user", self.retry_config, || async {
            sub_user::Entity::find_by_id(id).one(db).await
        })
        .await
        .map_err(|e| db_error("get sub user", e))?;

        Ok(model.map(model_to_sub_user))
    }

    pub async fn find_sub_user_by_username(&self, username: &str) -> Result<Option<SubUser>> {
        let db = &self.db;
        let model = retry::with_retry("find_sub_user_by_username", self.retry_config, || async {
            sub_user::Entity::find()
                .filter(sub_user::Column::Username.eq(username))
                .one(db)
                .await
        })
        .await
        .map_err(|e| db_error("find sub user", e))?;

        Ok(model.map(model_to_sub_user))
    }

    /// 新建子账户；用户名冲突由唯一索引判定
    pub async fn insert_sub_user(
        &self,
        name: &str,
        role: UserRole,
        username: &str,
        password_hash: &str,
    ) -> Result<SubUser> {
        let model = sub_user::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            role: Set(role.as_ref().to_string()),
            username: Set(username.to_string()),
            password_hash: Set(password_hash.to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| map_write_error("insert sub user", e))?;

        info!("Sub user created: {} ({})", model.username, model.role);
        Ok(model_to_sub_user(model))
    }

    pub async fn update_sub_user(&self, user: &SubUser) -> Result<SubUser> {
        let model = sub_user::ActiveModel {
            id: Set(user.id),
            name: Set(user.name.clone()),
            role: Set(user.role.as_ref().to_string()),
            username: Set(user.username.clone()),
            password_hash: Set(user.password_hash.clone()),
            created_at: NotSet,
        }
        .update(&self.db)
        .await
        .map_err(|e| match e {
            DbErr::RecordNotUpdated => {
                PortalError::not_found(format!("User {} not found", user.id))
            }
            other => map_write_error("update sub user", other),
        })?;

        Ok(model_to_sub_user(model))
    }

    pub async fn delete_sub_user(&self, id: i32) -> Result<()> {
        let result = sub_user::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| db_error("delete sub user", e))?;

        if result.rows_affected == 0 {
            return Err(PortalError::not_found(format!("User {} not found", id)));
        }
        info!("Sub user deleted: {}", id);
        Ok(())
    }
}
