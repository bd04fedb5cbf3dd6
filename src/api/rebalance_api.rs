// ==========================================
// 分配报表重算工具 - 重算API
// ==========================================
// 职责: 一次请求/响应轮次 = 编辑后的月度表 → 权重 → 周度传播 → 下载产物
// 红线: 每轮从编辑结果完整重算，不做增量修补，不持有全局可变状态
// ==========================================

use crate::api::error::ApiResult;
use crate::config::AppConfig;
use crate::domain::allocation::{PropagationSummary, WeightSummary};
use crate::domain::table::Table;
use crate::engine::{verify_edit_contract, EditSurface, Propagator, WeightCalculator};
use crate::importer::{LoadedReports, ReportLoader};
use crate::report::{build_weekly_artifact, ExportArtifact};
use tracing::{info, instrument};

/// 单轮重算结果
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResult {
    /// 含 Rebalanced / country_weights 的月度表
    pub monthly: Table,
    /// 含 country_weights / Final_alloc 的周度表
    pub weekly: Table,
    pub weight_summary: WeightSummary,
    pub propagation_summary: PropagationSummary,
    /// xlsx 下载产物
    pub artifact: ExportArtifact,
}

// ==========================================
// RebalanceApi
// ==========================================
pub struct RebalanceApi {
    config: AppConfig,
    loader: ReportLoader,
    calculator: WeightCalculator,
    propagator: Propagator,
}

impl RebalanceApi {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            loader: ReportLoader::new(),
            calculator: WeightCalculator::new(),
            propagator: Propagator::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 加载两张输入报表（致命错误直接上抛）
    pub fn load(&self) -> ApiResult<LoadedReports> {
        let reports = self
            .loader
            .load_reports(&self.config.monthly_path, &self.config.weekly_path)?;
        Ok(reports)
    }

    /// 执行一轮重算
    ///
    /// # 参数
    /// - reports: 原始报表（本轮不修改）
    /// - edited_monthly: 编辑界面返回的月度表
    ///
    /// # 流程
    /// 1. 校验编辑契约（仅 Rebalancing 可变）
    /// 2. 权重计算
    /// 3. 周度传播
    /// 4. 生成 xlsx 下载产物
    #[instrument(skip_all)]
    pub fn run_turn(&self, reports: &LoadedReports, edited_monthly: &Table) -> ApiResult<TurnResult> {
        verify_edit_contract(&reports.monthly, edited_monthly)?;

        let weighted = self.calculator.calculate(edited_monthly)?;
        let propagated = self.propagator.propagate(&weighted.table, &reports.weekly)?;

        let mut artifact = build_weekly_artifact(&propagated.table, &self.config.sheet_name)?;
        artifact.file_name = self.config.output_file_name.clone();

        info!(
            weekly_rows = propagated.table.row_count(),
            artifact_bytes = artifact.size(),
            "本轮重算完成"
        );

        Ok(TurnResult {
            monthly: weighted.table,
            weekly: propagated.table,
            weight_summary: weighted.summary,
            propagation_summary: propagated.summary,
            artifact,
        })
    }

    /// 通过编辑界面获取编辑结果并执行一轮重算
    pub fn run_with_surface(
        &self,
        reports: &LoadedReports,
        surface: &mut dyn EditSurface,
    ) -> ApiResult<TurnResult> {
        let edited = surface.edit(&reports.monthly)?;
        self.run_turn(reports, &edited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ApiError;
    use crate::domain::allocation::columns;
    use crate::domain::table::Column;
    use crate::domain::types::{CellValue, ColumnType};
    use crate::engine::{RebalancingEdit, ScriptedEditSurface};

    fn reports() -> LoadedReports {
        let mut monthly_columns: Vec<Column> = columns::MONTHLY_REQUIRED
            .iter()
            .map(|name| Column::new(*name, ColumnType::Text))
            .collect();
        monthly_columns[6].dtype = ColumnType::Numeric;
        monthly_columns[7].dtype = ColumnType::Numeric;
        let mut monthly = Table::new("monthly", monthly_columns);
        for (country, rebalancing) in [("FR", 10.0), ("DE", 30.0)] {
            let mut row: Vec<CellValue> = ["A", "X", "P1", "L1", "Jan", country]
                .iter()
                .map(|s| CellValue::Text(s.to_string()))
                .collect();
            row.push(CellValue::Number(rebalancing));
            row.push(CellValue::Number(0.0));
            monthly.push_row(row).unwrap();
        }

        let mut weekly = Table::new(
            "weekly",
            vec![
                Column::new(columns::COUNTRY, ColumnType::Text),
                Column::new(columns::HOOD, ColumnType::Numeric),
            ],
        );
        weekly
            .push_row(vec![CellValue::Text("FR".into()), CellValue::Number(200.0)])
            .unwrap();

        LoadedReports { monthly, weekly }
    }

    #[test]
    fn test_run_turn_without_edits() {
        let api = RebalanceApi::new(AppConfig::default());
        let reports = reports();

        let result = api.run_turn(&reports, &reports.monthly).unwrap();

        assert_eq!(result.weekly.rows()[0][2], CellValue::Number(0.25));
        assert_eq!(result.weekly.rows()[0][3], CellValue::Number(50.0));
        assert_eq!(result.artifact.file_name, "updated_weekly_report.xlsx");
    }

    #[test]
    fn test_each_turn_recomputes_from_edit() {
        let api = RebalanceApi::new(AppConfig::default());
        let reports = reports();

        let mut surface = ScriptedEditSurface::new(vec![RebalancingEdit::new(1, 10.0)]);
        let result = api.run_with_surface(&reports, &mut surface).unwrap();

        // FR: 10 / (10 + 10)
        assert_eq!(result.weekly.rows()[0][3], CellValue::Number(100.0));
        // 原始报表不受影响
        assert_eq!(reports.monthly.rows()[1][6], CellValue::Number(30.0));
    }

    #[test]
    fn test_read_only_change_is_rejected() {
        let api = RebalanceApi::new(AppConfig::default());
        let reports = reports();
        let mut tampered = reports.monthly.clone();
        tampered.set_cell(0, 5, CellValue::Text("IT".into()));

        let err = api.run_turn(&reports, &tampered).unwrap_err();
        assert!(matches!(err, ApiError::Recalc(_)));
    }

    #[test]
    fn test_load_missing_files_is_fatal() {
        let config = AppConfig {
            monthly_path: "missing_nwe.xlsx".into(),
            ..AppConfig::default()
        };
        let err = RebalanceApi::new(config).load().unwrap_err();
        assert!(err.is_fatal_load());
    }
}
