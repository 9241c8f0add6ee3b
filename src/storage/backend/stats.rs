use sea_orm::{EntityTrait, PaginatorTrait};

use super::{SeaOrmStorage, db_error};
use crate::errors::Result;
use crate::storage::models::PortalStats;

use migration::entities::{majlis, participant, region, sub_user};

impl SeaOrmStorage {
    /// 汇总计数；出勤数按当前活动事件统计
    pub async fn get_stats(&self) -> Result<PortalStats> {
        let db = &self.db;

        let regions = region::Entity::find()
            .count(db)
            .await
            .map_err(|e| db_error("count regions", e))?;
        let majlis = majlis::Entity::find()
            .count(db)
            .await
            .map_err(|e| db_error("count majlis", e))?;
        let participants = participant::Entity::find()
            .count(db)
            .await
            .map_err(|e| db_error("count participants", e))?;
        let sub_users = sub_user::Entity::find()
            .count(db)
            .await
            .map_err(|e| db_error("count sub users", e))?;

        let active = self.get_active_event().await?;
        let active_event_present = match &active {
            Some(event) => self.count_present(event.id).await?,
            None => 0,
        };

        Ok(PortalStats {
            regions,
            majlis,
            participants,
            sub_users,
            active_event_id: active.map(|e| e.id),
            active_event_present,
        })
    }
}
