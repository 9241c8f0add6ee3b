//! 报告 upsert 与导出回退集成测试

mod common;

use serde_json::json;

use majlis_portal::errors::PortalError;
use majlis_portal::services::{ExportQuery, ResolvedReport};
use majlis_portal::storage::{ReportFields, ReportFilter, ReportKey};

async fn fixture() -> (common::TestEnv, i32, i32) {
    let env = common::setup().await;
    let region = env.region("Nairobi").await;
    let majlis = env.majlis("Eastleigh", region.id).await;
    (env, region.id, majlis.id)
}

fn key(region_id: i32, majlis_id: i32, month: i32, section: &str) -> ReportKey {
    ReportKey {
        region_id,
        majlis_id,
        report_month: month,
        report_year: 2024,
        section_key: section.to_string(),
    }
}

#[tokio::test]
async fn test_same_key_updates_one_row() {
    let (env, region_id, majlis_id) = fixture().await;
    let reports = &env.services.reports;

    let first = reports
        .upsert_report(
            key(region_id, majlis_id, 3, "maal"),
            ReportFields {
                amount_collected: Some(100.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let second = reports
        .upsert_report(
            key(region_id, majlis_id, 3, "MAAL"),
            ReportFields {
                amount_collected: Some(250.0),
                remarks: Some("revised".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.key.section_key, "maal");
    assert_eq!(second.fields.amount_collected, Some(250.0));

    let rows = reports.list_reports(ReportFilter::default()).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_upsert_validation() {
    let (env, region_id, majlis_id) = fixture().await;
    let reports = &env.services.reports;

    let cases = [
        key(region_id, majlis_id, 13, "maal"),
        key(region_id, majlis_id, 0, "maal"),
        key(region_id, majlis_id, 1, "finance"),
        key(region_id + 100, majlis_id, 1, "maal"),
        key(region_id, majlis_id + 100, 1, "maal"),
    ];
    for case in cases {
        let err = reports
            .upsert_report(case.clone(), ReportFields::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)), "{:?}", case);
    }

    let mut bad_year = key(region_id, majlis_id, 1, "maal");
    bad_year.report_year = 1999;
    assert!(reports
        .upsert_report(bad_year, ReportFields::default())
        .await
        .is_err());
}

#[tokio::test]
async fn test_resolution_prefers_normalized_rows() {
    let (env, region_id, majlis_id) = fixture().await;
    let reports = &env.services.reports;

    // 已迁移行：旧数据被忽略
    reports
        .upsert_report(
            key(region_id, majlis_id, 1, "tabligh"),
            ReportFields {
                meetings_held: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    reports
        .upsert_legacy_report(
            key(region_id, majlis_id, 1, "tabligh"),
            json!({"meetings_held": 99, "remarks": "stale"}),
        )
        .await
        .unwrap();

    // 未迁移行：从旧数据回填
    reports
        .upsert_report(key(region_id, majlis_id, 2, "tabligh"), ReportFields::default())
        .await
        .unwrap();
    reports
        .upsert_legacy_report(
            key(region_id, majlis_id, 2, "tabligh"),
            json!({"meetingsHeld": "7", "membersContacted": 12, "remarks": "from blob"}),
        )
        .await
        .unwrap();

    // 未迁移且没有旧数据
    reports
        .upsert_report(key(region_id, majlis_id, 3, "tabligh"), ReportFields::default())
        .await
        .unwrap();

    let resolved = reports
        .resolve(ReportFilter {
            section_key: Some("tabligh".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(resolved.len(), 3);

    for report in &resolved {
        match (report.row().key.report_month, report) {
            (1, ResolvedReport::Normalized(row)) => {
                assert_eq!(row.fields.meetings_held, Some(3));
                assert_eq!(row.fields.remarks, None);
            }
            (2, ResolvedReport::Legacy(row)) => {
                assert_eq!(row.fields.meetings_held, Some(7));
                assert_eq!(row.fields.members_contacted, Some(12));
                assert_eq!(row.fields.remarks.as_deref(), Some("from blob"));
            }
            (3, ResolvedReport::Unmigrated(row)) => {
                assert!(row.fields.is_empty());
            }
            (month, other) => panic!("unexpected resolution for month {}: {:?}", month, other),
        }
    }
}

#[tokio::test]
async fn test_export_writes_sources_and_names() {
    let (env, region_id, majlis_id) = fixture().await;
    let reports = &env.services.reports;

    reports
        .upsert_report(key(region_id, majlis_id, 4, "maal"), ReportFields::default())
        .await
        .unwrap();
    reports
        .upsert_legacy_report(
            key(region_id, majlis_id, 4, "maal"),
            json!({"amount_collected": "1500.25"}),
        )
        .await
        .unwrap();

    let export = reports
        .export(ExportQuery {
            section: Some("maal".to_string()),
            year: Some(2024),
            month: Some(4),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(export.filename, "report-maal-2024-04.csv");
    assert_eq!(export.rows, 1);

    let text = String::from_utf8(export.content).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("source,region,majlis"));
    let row = lines.next().unwrap();
    assert!(row.starts_with("legacy,Nairobi,Eastleigh,2024,4,maal,"));
    assert!(row.contains("1500.25"));
    assert!(lines.next().is_none());
}

#[tokio::test]
async fn test_export_rejects_unknown_section() {
    let (env, _, _) = fixture().await;
    let err = env
        .services
        .reports
        .export(ExportQuery {
            section: Some("finance".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::Validation(_)));
}

#[tokio::test]
async fn test_legacy_details_must_be_object() {
    let (env, region_id, majlis_id) = fixture().await;
    let err = env
        .services
        .reports
        .upsert_legacy_report(key(region_id, majlis_id, 1, "talim"), json!([1, 2]))
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::Validation(_)));

    let stored = env
        .services
        .reports
        .upsert_legacy_report(
            key(region_id, majlis_id, 1, "talim"),
            json!({"remarks": "first"}),
        )
        .await
        .unwrap();
    assert_eq!(stored.details["remarks"], "first");

    let listed = env
        .services
        .reports
        .list_legacy_reports(ReportFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}
