//! Region and majlis management
//!
//! Shared by the HTTP handlers and the CLI. New codes come from the
//! allocator; an explicit code on update is written as given.

use std::sync::Arc;

use tracing::info;

use crate::errors::{PortalError, Result};
use crate::storage::{Majlis, Region, SeaOrmStorage};
use crate::utils::code_allocator::{normalize_explicit_code, select_seed};
use crate::utils::validators::{optional_text, require_text};

/// 更新请求：未提供的字段保持不变
#[derive(Debug, Clone, Default)]
pub struct UpdateTaxonomyRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    /// 仅 majlis 使用
    pub region_id: Option<i32>,
}

pub struct RegionService {
    storage: Arc<SeaOrmStorage>,
}

impl RegionService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn list_regions(&self) -> Result<Vec<Region>> {
        self.storage.list_regions().await
    }

    pub async fn get_region(&self, id: i32) -> Result<Region> {
        self.storage
            .get_region(id)
            .await?
            .ok_or_else(|| PortalError::not_found(format!("Region {} not found", id)))
    }

    pub async fn create_region(&self, name: &str, code: Option<&str>) -> Result<Region> {
        let name = require_text("name", name)?;
        let seed = select_seed(code, &name).to_string();
        self.storage.insert_region(&name, &seed).await
    }

    pub async fn update_region(&self, id: i32, req: UpdateTaxonomyRequest) -> Result<Region> {
        let existing = self.get_region(id).await?;

        let name = match req.name {
            Some(name) => require_text("name", &name)?,
            None => existing.name,
        };
        let code = match optional_text(req.code) {
            Some(code) => normalize_explicit_code(&code)?,
            None => existing.code,
        };

        let updated = self.storage.update_region(id, &name, &code).await?;
        info!("Region updated: {} ({})", updated.id, updated.code);
        Ok(updated)
    }

    pub async fn delete_region(&self, id: i32) -> Result<()> {
        self.storage.delete_region(id).await
    }
}

pub struct MajlisService {
    storage: Arc<SeaOrmStorage>,
}

impl MajlisService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    async fn ensure_region(&self, region_id: i32) -> Result<()> {
        match self.storage.get_region(region_id).await? {
            Some(_) => Ok(()),
            None => Err(PortalError::validation(format!(
                "Region {} does not exist",
                region_id
            ))),
        }
    }

    pub async fn list_majlis(&self, region_id: Option<i32>) -> Result<Vec<Majlis>> {
        self.storage.list_majlis(region_id).await
    }

    pub async fn get_majlis(&self, id: i32) -> Result<Majlis> {
        self.storage
            .get_majlis(id)
            .await?
            .ok_or_else(|| PortalError::not_found(format!("Majlis {} not found", id)))
    }

    pub async fn create_majlis(
        &self,
        name: &str,
        code: Option<&str>,
        region_id: Option<i32>,
    ) -> Result<Majlis> {
        let name = require_text("name", name)?;
        let region_id = region_id.ok_or_else(|| PortalError::validation("regionId is required"))?;
        self.ensure_region(region_id).await?;

        let seed = select_seed(code, &name).to_string();
        self.storage.insert_majlis(&name, region_id, &seed).await
    }

    pub async fn update_majlis(&self, id: i32, req: UpdateTaxonomyRequest) -> Result<Majlis> {
        let existing = self.get_majlis(id).await?;

        let name = match req.name {
            Some(name) => require_text("name", &name)?,
            None => existing.name,
        };
        let code = match optional_text(req.code) {
            Some(code) => normalize_explicit_code(&code)?,
            None => existing.code,
        };
        let region_id = match req.region_id {
            Some(region_id) if region_id != existing.region_id => {
                self.ensure_region(region_id).await?;
                region_id
            }
            _ => existing.region_id,
        };

        let updated = self
            .storage
            .update_majlis(id, &name, region_id, &code)
            .await?;
        info!("Majlis updated: {} ({})", updated.id, updated.code);
        Ok(updated)
    }

    /// 删除 majlis，返回被解除关联的参与者数量
    pub async fn delete_majlis(&self, id: i32) -> Result<u64> {
        self.storage.delete_majlis(id).await
    }
}
