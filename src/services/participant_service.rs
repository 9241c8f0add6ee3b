//! Participant records

use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::errors::{PortalError, Result};
use crate::storage::{
    Participant, ParticipantCategory, ParticipantDraft, ParticipantFilter, SeaOrmStorage,
};
use crate::utils::validators::{optional_text, require_text};

/// 创建 / 更新参与者的输入
///
/// 更新时 `None` 表示保留原值；文本字段传空字符串表示清空。
#[derive(Debug, Clone, Default)]
pub struct ParticipantInput {
    pub name: Option<String>,
    pub father_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub joined_on: Option<NaiveDate>,
    pub category: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub region_id: Option<i32>,
    pub majlis_id: Option<i32>,
    pub is_moosi: Option<bool>,
    pub reads_quran: Option<bool>,
    pub offers_salat: Option<bool>,
    pub physically_fit: Option<bool>,
}

pub fn parse_category(value: &str) -> Result<ParticipantCategory> {
    ParticipantCategory::from_str(value.trim()).map_err(|_| {
        PortalError::validation(format!(
            "Unknown category '{}'. Valid: khuddam, atfal, ansar, lajna, nasirat, other",
            value.trim()
        ))
    })
}

/// 文本字段的补丁语义
fn patch_text(update: Option<String>, current: Option<String>) -> Option<String> {
    match update {
        Some(value) => optional_text(Some(value)),
        None => current,
    }
}

pub struct ParticipantService {
    storage: Arc<SeaOrmStorage>,
}

impl ParticipantService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn list_participants(
        &self,
        page: u64,
        page_size: u64,
        filter: &ParticipantFilter,
    ) -> Result<(Vec<Participant>, u64)> {
        self.storage
            .list_participants(page, page_size, filter)
            .await
    }

    pub async fn get_participant(&self, id: i32) -> Result<Participant> {
        self.storage
            .get_participant(id)
            .await?
            .ok_or_else(|| PortalError::not_found(format!("Participant {} not found", id)))
    }

    pub async fn create_participant(&self, input: ParticipantInput) -> Result<Participant> {
        let name = require_text("name", input.name.as_deref().unwrap_or_default())?;
        let category = match input.category.as_deref() {
            Some(c) if !c.trim().is_empty() => parse_category(c)?,
            _ => ParticipantCategory::default(),
        };

        let mut draft = ParticipantDraft {
            name,
            father_name: optional_text(input.father_name),
            date_of_birth: input.date_of_birth,
            joined_on: input.joined_on,
            category,
            phone: optional_text(input.phone),
            email: optional_text(input.email),
            address: optional_text(input.address),
            region_id: input.region_id,
            majlis_id: input.majlis_id,
            is_moosi: input.is_moosi.unwrap_or(false),
            reads_quran: input.reads_quran.unwrap_or(false),
            offers_salat: input.offers_salat.unwrap_or(false),
            physically_fit: input.physically_fit.unwrap_or(false),
        };
        self.resolve_references(&mut draft).await?;

        self.storage.insert_participant(&draft).await
    }

    pub async fn update_participant(&self, id: i32, input: ParticipantInput) -> Result<Participant> {
        let current = self.get_participant(id).await?;

        let name = match input.name {
            Some(name) => require_text("name", &name)?,
            None => current.name,
        };
        let category = match input.category.as_deref() {
            Some(c) => parse_category(c)?,
            None => current.category,
        };

        let mut draft = ParticipantDraft {
            name,
            father_name: patch_text(input.father_name, current.father_name),
            date_of_birth: input.date_of_birth.or(current.date_of_birth),
            joined_on: input.joined_on.or(current.joined_on),
            category,
            phone: patch_text(input.phone, current.phone),
            email: patch_text(input.email, current.email),
            address: patch_text(input.address, current.address),
            region_id: input.region_id.or(current.region_id),
            majlis_id: input.majlis_id.or(current.majlis_id),
            is_moosi: input.is_moosi.unwrap_or(current.is_moosi),
            reads_quran: input.reads_quran.unwrap_or(current.reads_quran),
            offers_salat: input.offers_salat.unwrap_or(current.offers_salat),
            physically_fit: input.physically_fit.unwrap_or(current.physically_fit),
        };
        // 只改 majlis 时区域跟随 majlis
        if input.majlis_id.is_some() && input.region_id.is_none() {
            draft.region_id = None;
        }
        self.resolve_references(&mut draft).await?;

        self.storage.update_participant(id, &draft).await
    }

    pub async fn delete_participant(&self, id: i32) -> Result<()> {
        self.storage.delete_participant(id).await
    }

    /// 校验 region / majlis 引用；只给出 majlis 时从中推导 region
    async fn resolve_references(&self, draft: &mut ParticipantDraft) -> Result<()> {
        if let Some(region_id) = draft.region_id
            && self.storage.get_region(region_id).await?.is_none()
        {
            return Err(PortalError::validation(format!(
                "Region {} does not exist",
                region_id
            )));
        }

        if let Some(majlis_id) = draft.majlis_id {
            let majlis = self.storage.get_majlis(majlis_id).await?.ok_or_else(|| {
                PortalError::validation(format!("Majlis {} does not exist", majlis_id))
            })?;
            match draft.region_id {
                None => draft.region_id = Some(majlis.region_id),
                Some(region_id) if region_id != majlis.region_id => {
                    return Err(PortalError::validation(format!(
                        "Majlis {} does not belong to region {}",
                        majlis_id, region_id
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
