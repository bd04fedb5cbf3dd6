// ==========================================
// 分配报表重算工具 - 端到端流程测试
// ==========================================
// 覆盖: 加载 → 编辑 → 权重计算 → 周度传播 → 导出
// ==========================================


use alloc_rebalance::api::{ApiError, RebalanceApi};
use alloc_rebalance::domain::columns;
use alloc_rebalance::engine::{EngineError, RebalancingEdit, ScriptedEditSurface};
use alloc_rebalance::importer::ImportError;
use alloc_rebalance::{AppConfig, CellValue};
use test_helpers::{
    approx_eq, create_example_reports, monthly_headers, number, number_at, text, write_csv,
    write_xlsx, FixtureCell,
};

fn api_for(monthly: std::path::PathBuf, weekly: std::path::PathBuf) -> RebalanceApi {
    RebalanceApi::new(AppConfig {
        monthly_path: monthly,
        weekly_path: weekly,
        ..AppConfig::default()
    })
}

#[test]
fn test_example_reports_end_to_end() {
    alloc_rebalance::logging::init_test();
    let (_dir, monthly, weekly) = create_example_reports().expect("创建示例报表失败");
    let api = api_for(monthly, weekly);

    let reports = api.load().expect("加载失败");
    let result = api
        .run_turn(&reports, &reports.monthly)
        .expect("重算失败");

    // 月度: Rebalanced 10 / 30，权重 0.25 / 0.75
    assert_eq!(number_at(&result.monthly, 0, columns::REBALANCED), Some(10.0));
    assert_eq!(number_at(&result.monthly, 1, columns::REBALANCED), Some(30.0));
    assert_eq!(number_at(&result.monthly, 0, columns::COUNTRY_WEIGHTS), Some(0.25));
    assert_eq!(number_at(&result.monthly, 1, columns::COUNTRY_WEIGHTS), Some(0.75));

    // 周度: FR 200 → 50，DE 100 → 75
    assert_eq!(number_at(&result.weekly, 0, columns::COUNTRY_WEIGHTS), Some(0.25));
    assert_eq!(number_at(&result.weekly, 0, columns::FINAL_ALLOC), Some(50.0));
    assert_eq!(number_at(&result.weekly, 1, columns::FINAL_ALLOC), Some(75.0));

    // 未匹配国家: 两个派生列均为空
    let weights_col = result.weekly.column_index(columns::COUNTRY_WEIGHTS).unwrap();
    let alloc_col = result.weekly.column_index(columns::FINAL_ALLOC).unwrap();
    assert_eq!(result.weekly.rows()[2][weights_col], CellValue::Empty);
    assert_eq!(result.weekly.rows()[2][alloc_col], CellValue::Empty);

    // 日期单元格按 YYYY-MM-DD 文本加载
    let month_col = result.monthly.column_index(columns::MONTH).unwrap();
    assert_eq!(
        result.monthly.rows()[0][month_col],
        CellValue::Text("2024-01-01".into())
    );
    assert_eq!(result.weekly.rows()[2][0], CellValue::Text("2024-01-08".into()));

    assert_eq!(result.propagation_summary.matched, 2);
    assert_eq!(result.propagation_summary.unmatched, 1);

    // 周度表保留原有列，追加两列
    assert_eq!(
        result.weekly.column_names(),
        vec!["Week", "Country", "Hood", "country_weights", "Final_alloc"]
    );
}

#[test]
fn test_user_edit_changes_weekly_allocation() {
    let (_dir, monthly, weekly) = create_example_reports().expect("创建示例报表失败");
    let api = api_for(monthly, weekly);
    let reports = api.load().expect("加载失败");

    // FR: 10 → 70，组合计 100
    let mut surface = ScriptedEditSurface::new(vec![RebalancingEdit::new(0, 70.0)]);
    let result = api
        .run_with_surface(&reports, &mut surface)
        .expect("重算失败");

    assert!(approx_eq(
        number_at(&result.weekly, 0, columns::FINAL_ALLOC).unwrap(),
        140.0
    ));
    assert!(approx_eq(
        number_at(&result.weekly, 1, columns::FINAL_ALLOC).unwrap(),
        30.0
    ));
}

#[test]
fn test_negative_edit_is_accepted() {
    let (_dir, monthly, weekly) = create_example_reports().expect("创建示例报表失败");
    let api = api_for(monthly, weekly);
    let reports = api.load().expect("加载失败");

    // FR: 10 → -10，组合计 20
    let mut surface = ScriptedEditSurface::new(vec![RebalancingEdit::new(0, -10.0)]);
    let result = api
        .run_with_surface(&reports, &mut surface)
        .expect("重算失败");

    assert_eq!(number_at(&result.monthly, 0, columns::COUNTRY_WEIGHTS), Some(-0.5));
    assert_eq!(number_at(&result.monthly, 1, columns::COUNTRY_WEIGHTS), Some(1.5));
}

#[test]
fn test_edit_out_of_range_aborts_turn() {
    let (_dir, monthly, weekly) = create_example_reports().expect("创建示例报表失败");
    let api = api_for(monthly, weekly);
    let reports = api.load().expect("加载失败");

    let mut surface = ScriptedEditSurface::new(vec![RebalancingEdit::new(10, 1.0)]);
    let err = api.run_with_surface(&reports, &mut surface).unwrap_err();

    assert!(matches!(
        err,
        ApiError::Recalc(EngineError::RowOutOfRange { row: 10, row_count: 2 })
    ));
}

#[test]
fn test_csv_inputs_are_supported() {
    let dir = tempfile::tempdir().unwrap();
    let monthly = write_csv(
        dir.path(),
        "nwe.csv",
        "SKU,PL,Plant,Market_level,Month,Country,Rebalancing,Neptune_Allocation\n\
         A,X,P1,L1,Jan,FR,0,20\n\
         A,X,P1,L1,Jan,DE,0,60\n\
         B,X,P1,L1,Jan,ES,0,0\n",
    )
    .unwrap();
    let weekly = write_csv(dir.path(), "weekly.csv", "Country,Hood\nFR,40\nES,10\n").unwrap();

    let api = api_for(monthly, weekly);
    let reports = api.load().unwrap();
    let result = api.run_turn(&reports, &reports.monthly).unwrap();

    assert_eq!(number_at(&result.weekly, 0, columns::FINAL_ALLOC), Some(10.0));
    // ES 所在分组合计为 0 → 权重 0
    assert_eq!(number_at(&result.weekly, 1, columns::COUNTRY_WEIGHTS), Some(0.0));
    assert_eq!(number_at(&result.weekly, 1, columns::FINAL_ALLOC), Some(0.0));
    assert_eq!(result.weight_summary.zero_sum_groups, 1);
}

#[test]
fn test_text_in_rebalancing_fails_recalc() {
    let dir = tempfile::tempdir().unwrap();
    let monthly = write_csv(
        dir.path(),
        "nwe.csv",
        "SKU,PL,Plant,Market_level,Month,Country,Rebalancing,Neptune_Allocation\n\
         A,X,P1,L1,Jan,FR,ten,20\n",
    )
    .unwrap();
    let weekly = write_csv(dir.path(), "weekly.csv", "Country,Hood\nFR,40\n").unwrap();

    let api = api_for(monthly, weekly);
    let reports = api.load().unwrap();
    let err = api.run_turn(&reports, &reports.monthly).unwrap_err();

    assert!(matches!(err, ApiError::Recalc(EngineError::Table(_))));
}

#[test]
fn test_missing_weekly_file_is_fatal() {
    let (dir, monthly, _weekly) = create_example_reports().expect("创建示例报表失败");
    let api = api_for(monthly, dir.path().join("no_weekly.xlsx"));

    let err = api.load().unwrap_err();

    assert!(err.is_fatal_load());
    assert!(matches!(err, ApiError::Load(ImportError::FileNotFound(_))));
}

#[test]
fn test_corrupt_monthly_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let monthly = dir.path().join("nwe.xlsx");
    std::fs::write(&monthly, b"definitely not a workbook").unwrap();
    let weekly = write_csv(dir.path(), "weekly.csv", "Country,Hood\nFR,40\n").unwrap();

    let err = api_for(monthly, weekly).load().unwrap_err();

    assert!(matches!(err, ApiError::Load(ImportError::ExcelParseError(_))));
}

#[test]
fn test_dated_months_form_separate_groups() {
    let dir = tempfile::tempdir().unwrap();
    let row = |month: FixtureCell, country: &str, rebalancing: f64| {
        vec![
            text("A"),
            text("X"),
            text("P1"),
            text("L1"),
            month,
            text(country),
            number(rebalancing),
            number(0.0),
        ]
    };
    let monthly = write_xlsx(
        dir.path(),
        "nwe.xlsx",
        &monthly_headers(),
        &[
            row(FixtureCell::Date(2024, 1, 1), "FR", 10.0),
            row(FixtureCell::Date(2024, 1, 1), "DE", 30.0),
            row(FixtureCell::Date(2024, 2, 1), "FR", 5.0),
            row(FixtureCell::Date(2024, 2, 1), "DE", 5.0),
        ],
    )
    .unwrap();
    let weekly = write_csv(dir.path(), "weekly.csv", "Country,Hood\nDE,100\n").unwrap();

    let api = api_for(monthly, weekly);
    let reports = api.load().unwrap();
    let result = api.run_turn(&reports, &reports.monthly).unwrap();

    assert_eq!(result.weight_summary.groups, 2);
    assert_eq!(number_at(&result.monthly, 1, columns::COUNTRY_WEIGHTS), Some(0.75));
    assert_eq!(number_at(&result.monthly, 3, columns::COUNTRY_WEIGHTS), Some(0.5));
    // 首行优先: DE 取 2024-01-01 分组的权重
    assert_eq!(number_at(&result.weekly, 0, columns::FINAL_ALLOC), Some(75.0));
    assert_eq!(result.propagation_summary.ambiguous_countries, vec!["DE", "FR"]);
}

#[test]
fn test_upper_case_extensions_load() {
    let (dir, _monthly, _weekly) = create_example_reports().expect("创建示例报表失败");
    let monthly = dir.path().join("NWE.XLSX");
    std::fs::copy(dir.path().join("nwe.xlsx"), &monthly).unwrap();
    let weekly = write_csv(dir.path(), "WEEKLY.CSV", "Country,Hood\nFR,200\n").unwrap();

    let api = api_for(monthly, weekly);
    let reports = api.load().unwrap();
    let result = api.run_turn(&reports, &reports.monthly).unwrap();

    assert_eq!(number_at(&result.weekly, 0, columns::FINAL_ALLOC), Some(50.0));
}
