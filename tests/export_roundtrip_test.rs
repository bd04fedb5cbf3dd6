// ==========================================
// 导出回读测试
// ==========================================
// 覆盖: updated_weekly_report.xlsx 重新加载后列名/行数/数值一致
// ==========================================


use alloc_rebalance::api::RebalanceApi;
use alloc_rebalance::domain::columns;
use alloc_rebalance::importer::load_table_from_bytes;
use alloc_rebalance::report::{EXPORT_FILE_NAME, XLSX_MIME_TYPE};
use alloc_rebalance::{AppConfig, CellValue, RebalancingEdit, ScriptedEditSurface, TurnResult};
use test_helpers::{create_example_reports, number_at};

fn turn_on_example() -> (tempfile::TempDir, TurnResult) {
    let (dir, monthly, weekly) = create_example_reports().expect("创建示例报表失败");
    let api = RebalanceApi::new(AppConfig {
        monthly_path: monthly,
        weekly_path: weekly,
        output_dir: dir.path().to_path_buf(),
        ..AppConfig::default()
    });
    let reports = api.load().expect("加载失败");
    let result = api.run_turn(&reports, &reports.monthly).expect("重算失败");
    (dir, result)
}

#[test]
fn test_exported_workbook_reloads_identically() {
    let (_dir, result) = turn_on_example();

    let reloaded = load_table_from_bytes(&result.artifact.bytes, "reloaded").unwrap();

    assert_eq!(reloaded.column_names(), result.weekly.column_names());
    assert_eq!(reloaded.row_count(), result.weekly.row_count());
    assert_eq!(reloaded.rows(), result.weekly.rows());
}

#[test]
fn test_date_column_survives_export() {
    let (_dir, result) = turn_on_example();

    let reloaded = load_table_from_bytes(&result.artifact.bytes, "reloaded").unwrap();
    let week_col = reloaded.column_index("Week").unwrap();

    assert_eq!(reloaded.rows()[0][week_col], CellValue::Text("2024-01-01".into()));
    assert_eq!(reloaded.rows()[2][week_col], CellValue::Text("2024-01-08".into()));
}

#[test]
fn test_unmatched_rows_stay_blank_after_export() {
    let (_dir, result) = turn_on_example();

    let reloaded = load_table_from_bytes(&result.artifact.bytes, "reloaded").unwrap();
    let alloc_col = reloaded.column_index(columns::FINAL_ALLOC).unwrap();

    // IT 未匹配
    assert_eq!(reloaded.rows()[2][alloc_col], CellValue::Empty);
    assert_eq!(number_at(&reloaded, 0, columns::FINAL_ALLOC), Some(50.0));
    assert_eq!(number_at(&reloaded, 1, columns::FINAL_ALLOC), Some(75.0));
}

#[test]
fn test_artifact_metadata_and_download() {
    let (dir, result) = turn_on_example();

    assert_eq!(result.artifact.file_name, EXPORT_FILE_NAME);
    assert_eq!(result.artifact.mime_type, XLSX_MIME_TYPE);
    assert!(result.artifact.size() > 0);

    let path = result.artifact.write_to(dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), EXPORT_FILE_NAME);

    let on_disk = std::fs::read(&path).unwrap();
    assert_eq!(on_disk, result.artifact.bytes);
}

#[test]
fn test_each_turn_exports_its_own_result() {
    let (_dir, monthly, weekly) = create_example_reports().expect("创建示例报表失败");
    let api = RebalanceApi::new(AppConfig {
        monthly_path: monthly,
        weekly_path: weekly,
        ..AppConfig::default()
    });
    let reports = api.load().unwrap();

    let first = api.run_turn(&reports, &reports.monthly).unwrap();

    let mut surface = ScriptedEditSurface::new(vec![RebalancingEdit::new(1, 10.0)]);
    let second = api.run_with_surface(&reports, &mut surface).unwrap();

    let first_reloaded = load_table_from_bytes(&first.artifact.bytes, "first").unwrap();
    let second_reloaded = load_table_from_bytes(&second.artifact.bytes, "second").unwrap();

    // 第二轮: FR 10 / DE 10 → 0.5 / 0.5
    assert_eq!(number_at(&first_reloaded, 0, columns::FINAL_ALLOC), Some(50.0));
    assert_eq!(number_at(&second_reloaded, 0, columns::FINAL_ALLOC), Some(100.0));
    assert_eq!(number_at(&second_reloaded, 1, columns::FINAL_ALLOC), Some(50.0));
}
