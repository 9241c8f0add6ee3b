//! Region / majlis 集成测试
//!
//! 覆盖短码分配、显式改码冲突以及删除规则。

mod common;

use std::collections::HashSet;

use majlis_portal::errors::PortalError;
use majlis_portal::services::{ParticipantInput, UpdateTaxonomyRequest};

#[tokio::test]
async fn test_codes_follow_allocation_sequence() {
    let env = common::setup().await;

    let first = env.region("Nairobi").await;
    let second = env.region("Nairobi").await;
    let third = env.region("  nairobi west ").await;

    assert_eq!(first.code, "NAI");
    assert_eq!(second.code, "NAI1");
    assert_eq!(third.code, "NAI2");
}

#[tokio::test]
async fn test_explicit_code_is_the_seed() {
    let env = common::setup().await;

    let region = env
        .services
        .regions
        .create_region("Coast", Some("mombasa"))
        .await
        .unwrap();
    assert_eq!(region.code, "MOM");

    // 空白 code 退回到名称
    let region = env
        .services
        .regions
        .create_region("Kisumu", Some("   "))
        .await
        .unwrap();
    assert_eq!(region.code, "KIS");
}

#[tokio::test]
async fn test_majlis_codes_are_scoped_to_majlis() {
    let env = common::setup().await;
    let region = env.region("Nairobi").await;

    let majlis = env.majlis("Nairobi Central", region.id).await;
    assert_eq!(majlis.code, "NAI");
    assert_eq!(majlis.region_id, region.id);

    let err = env
        .services
        .majlis
        .create_majlis("Orphan", None, Some(9999))
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::Validation(_)));

    let err = env
        .services
        .majlis
        .create_majlis("No region", None, None)
        .await
        .unwrap_err();
    assert_eq!(err.message(), "regionId is required");
}

#[tokio::test]
async fn test_concurrent_creation_never_duplicates() {
    let env = common::setup().await;
    let regions = env.services.regions.clone();

    let mut handles = Vec::new();
    for _ in 0..5 {
        let regions = regions.clone();
        handles.push(tokio::spawn(async move {
            regions.create_region("Eldoret", None).await
        }));
    }

    let mut codes = HashSet::new();
    for handle in handles {
        let region = handle.await.unwrap().unwrap();
        assert!(region.code.starts_with("ELD"));
        assert!(region.code.len() <= 10);
        assert!(codes.insert(region.code), "duplicate code allocated");
    }
    assert_eq!(codes.len(), 5);
}

#[tokio::test]
async fn test_update_with_taken_code_conflicts() {
    let env = common::setup().await;
    let nairobi = env.region("Nairobi").await;
    let mombasa = env.region("Mombasa").await;

    let err = env
        .services
        .regions
        .update_region(
            mombasa.id,
            UpdateTaxonomyRequest {
                code: Some("nai".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::Conflict(_)));

    let renamed = env
        .services
        .regions
        .update_region(
            nairobi.id,
            UpdateTaxonomyRequest {
                name: Some("Nairobi Metro".to_string()),
                code: Some("nrbmetro".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Nairobi Metro");
    assert_eq!(renamed.code, "NRBMETRO");
}

#[tokio::test]
async fn test_region_with_majlis_cannot_be_deleted() {
    let env = common::setup().await;
    let region = env.region("Nairobi").await;
    env.majlis("Eastleigh", region.id).await;

    let err = env
        .services
        .regions
        .delete_region(region.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::RegionHasMajlis(_)));
    assert_eq!(err.message(), "Cannot delete region with 1 dependent majlis");

    // 未删除任何数据
    assert!(env.services.regions.get_region(region.id).await.is_ok());
    assert_eq!(
        env.services
            .majlis
            .list_majlis(Some(region.id))
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_delete_missing_region_is_not_found() {
    let env = common::setup().await;
    let err = env.services.regions.delete_region(42).await.unwrap_err();
    assert!(matches!(err, PortalError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_majlis_detaches_participants() {
    let env = common::setup().await;
    let region = env.region("Nairobi").await;
    let majlis = env.majlis("Eastleigh", region.id).await;

    let participant = env
        .services
        .participants
        .create_participant(ParticipantInput {
            name: Some("Yusuf".to_string()),
            majlis_id: Some(majlis.id),
            ..Default::default()
        })
        .await
        .unwrap();
    // region 从 majlis 推导
    assert_eq!(participant.region_id, Some(region.id));

    let detached = env.services.majlis.delete_majlis(majlis.id).await.unwrap();
    assert_eq!(detached, 1);

    let participant = env
        .services
        .participants
        .get_participant(participant.id)
        .await
        .unwrap();
    assert_eq!(participant.majlis_id, None);
    assert_eq!(participant.region_id, Some(region.id));

    // 区域现在可以删除
    env.services.regions.delete_region(region.id).await.unwrap();
}
