//! Events and attendance marks

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::errors::{PortalError, Result};
use crate::storage::{Attendance, Event, SeaOrmStorage};
use crate::utils::validators::require_text;

/// 首次打卡且没有活动事件时自动创建的事件名
pub const DEFAULT_EVENT_NAME: &str = "General Attendance";

pub struct EventService {
    storage: Arc<SeaOrmStorage>,
}

impl EventService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn list_events(&self) -> Result<Vec<Event>> {
        self.storage.list_events().await
    }

    pub async fn get_event(&self, id: i32) -> Result<Event> {
        self.storage
            .get_event(id)
            .await?
            .ok_or_else(|| PortalError::not_found(format!("Event {} not found", id)))
    }

    /// 创建事件；`active = true` 时同时停用其他事件
    pub async fn create_event(
        &self,
        name: &str,
        event_date: Option<NaiveDate>,
        active: bool,
    ) -> Result<Event> {
        let name = require_text("name", name)?;
        let event = self.storage.insert_event(&name, event_date, false).await?;
        if active {
            return self.storage.activate_event(event.id).await;
        }
        Ok(event)
    }

    pub async fn activate_event(&self, id: i32) -> Result<Event> {
        let event = self.storage.activate_event(id).await?;
        info!("Event {} is now active", event.id);
        Ok(event)
    }

    pub async fn active_event(&self) -> Result<Option<Event>> {
        self.storage.get_active_event().await
    }

    /// 事件的出勤列表；未指定事件时使用当前活动事件（没有则返回空）
    pub async fn list_attendance(
        &self,
        event_id: Option<i32>,
    ) -> Result<(Option<Event>, Vec<Attendance>)> {
        let event = match event_id {
            Some(id) => Some(self.get_event(id).await?),
            None => self.storage.get_active_event().await?,
        };
        let rows = match &event {
            Some(event) => self.storage.list_attendance(event.id).await?,
            None => Vec::new(),
        };
        Ok((event, rows))
    }

    /// 记录出勤；未指定事件时落到当前活动事件，必要时自动创建默认事件
    pub async fn mark_attendance(
        &self,
        participant_id: i32,
        event_id: Option<i32>,
        present: bool,
    ) -> Result<Attendance> {
        if self.storage.get_participant(participant_id).await?.is_none() {
            return Err(PortalError::validation(format!(
                "Participant {} does not exist",
                participant_id
            )));
        }

        let event = match event_id {
            Some(id) => self.storage.get_event(id).await?.ok_or_else(|| {
                PortalError::validation(format!("Event {} does not exist", id))
            })?,
            None => self.storage.ensure_active_event(DEFAULT_EVENT_NAME).await?,
        };

        self.storage
            .upsert_attendance(event.id, participant_id, present)
            .await
    }

    /// 删除出勤记录；记录不存在视为无操作，返回是否删除了行
    pub async fn unmark_attendance(
        &self,
        participant_id: i32,
        event_id: Option<i32>,
    ) -> Result<bool> {
        let event_id = match event_id {
            Some(id) => id,
            None => match self.storage.get_active_event().await? {
                Some(event) => event.id,
                None => return Ok(false),
            },
        };

        self.storage
            .delete_attendance(event_id, participant_id)
            .await
    }
}
