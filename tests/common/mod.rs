//! 集成测试公共环境：每个测试使用独立的临时 SQLite 数据库

#![allow(dead_code)]

use std::sync::Arc;

use majlis_portal::services::PortalServices;
use majlis_portal::storage::{Majlis, Region, SeaOrmStorage};
use tempfile::TempDir;

pub struct TestEnv {
    pub services: PortalServices,
    _dir: TempDir,
}

pub async fn setup() -> TestEnv {
    let dir = TempDir::new().expect("创建临时目录失败");
    let db_path = dir.path().join("portal_test.db");
    let storage = SeaOrmStorage::new(&db_path.display().to_string(), "sqlite")
        .await
        .expect("创建存储失败");

    TestEnv {
        services: PortalServices::new(Arc::new(storage)),
        _dir: dir,
    }
}

impl TestEnv {
    pub async fn region(&self, name: &str) -> Region {
        self.services
            .regions
            .create_region(name, None)
            .await
            .expect("创建区域失败")
    }

    pub async fn majlis(&self, name: &str, region_id: i32) -> Majlis {
        self.services
            .majlis
            .create_majlis(name, None, Some(region_id))
            .await
            .expect("创建 majlis 失败")
    }
}
