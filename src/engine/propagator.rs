// ==========================================
// 分配报表重算工具 - 周度传播引擎
// ==========================================
// 职责: 按 Country 将月度权重映射到周度表
//       Final_alloc = Hood * country_weights
// 关联: 左外连接；同一国家多行匹配时取月度表中的第一行
// ==========================================
// 已知限制: 国家出现在多个分组时，仅首行权重生效（不聚合、不报错），
//           此类国家记录在 PropagationSummary.ambiguous_countries 中
// ==========================================

use crate::domain::allocation::{columns, PropagationSummary, WeeklyColumns, WeeklyRecord};
use crate::domain::table::Table;
use crate::domain::types::{CellValue, ColumnType};
use crate::engine::error::EngineResult;
use std::collections::{BTreeSet, HashMap};
use tracing::{info, instrument, warn};

/// 传播结果
#[derive(Debug, Clone, PartialEq)]
pub struct PropagationOutcome {
    pub table: Table,
    pub summary: PropagationSummary,
}

// ==========================================
// CountryWeightIndex - 国家 → 权重（首行优先）
// ==========================================
#[derive(Debug, Default)]
pub struct CountryWeightIndex {
    weights: HashMap<String, Option<f64>>,
    ambiguous: BTreeSet<String>,
}

impl CountryWeightIndex {
    /// 从已计算权重的月度表构建索引
    ///
    /// 空 Country 行不参与关联；首个匹配行权重缺失时，关联结果同样缺失
    pub fn build(monthly: &Table) -> EngineResult<Self> {
        let country_col = monthly.require_column(columns::COUNTRY)?;
        let weight_col = monthly.require_numeric_column(columns::COUNTRY_WEIGHTS)?;

        let mut index = Self::default();
        for row in 0..monthly.row_count() {
            let country = match monthly.cell(row, country_col).and_then(CellValue::key_string) {
                Some(c) => c,
                None => continue,
            };
            let weight = monthly.numeric_at(row, weight_col)?;

            match index.weights.get(&country) {
                // 首行优先，后续行只用于检测歧义
                Some(first) if *first != weight => {
                    index.ambiguous.insert(country);
                }
                Some(_) => {}
                None => {
                    index.weights.insert(country, weight);
                }
            }
        }
        Ok(index)
    }

    pub fn lookup(&self, country: &str) -> Option<f64> {
        self.weights.get(country).copied().flatten()
    }

    pub fn ambiguous_countries(&self) -> Vec<String> {
        self.ambiguous.iter().cloned().collect()
    }
}

// ==========================================
// Propagator - 周度传播引擎
// ==========================================
#[derive(Debug, Default)]
pub struct Propagator;

impl Propagator {
    pub fn new() -> Self {
        Self
    }

    /// 将月度权重传播到周度表
    ///
    /// # 规则
    /// - 命中: country_weights = 首个匹配月度行的权重
    /// - 未命中 / Country 为空: country_weights 与 Final_alloc 均为缺失值（不报错）
    /// - Hood 缺失: Final_alloc 缺失
    ///
    /// 月度表不被修改；周度表追加两列，行数、行序不变
    #[instrument(skip(self, monthly, weekly), fields(monthly_rows = monthly.row_count(), weekly_rows = weekly.row_count()))]
    pub fn propagate(&self, monthly: &Table, weekly: &Table) -> EngineResult<PropagationOutcome> {
        let index = CountryWeightIndex::build(monthly)?;
        let cols = WeeklyColumns::resolve(weekly)?;
        let records = (0..weekly.row_count())
            .map(|row| cols.read(weekly, row))
            .collect::<Result<Vec<WeeklyRecord>, _>>()?;

        let mut summary = PropagationSummary {
            rows: records.len(),
            ambiguous_countries: index.ambiguous_countries(),
            ..PropagationSummary::default()
        };
        for country in &summary.ambiguous_countries {
            warn!(country = %country, "国家对应多个不同权重，按月度表首行取值");
        }

        let mut weight_cells = Vec::with_capacity(records.len());
        let mut alloc_cells = Vec::with_capacity(records.len());
        for record in &records {
            let weight = record.country.as_deref().and_then(|c| index.lookup(c));
            match weight {
                Some(_) => summary.matched += 1,
                None => summary.unmatched += 1,
            }

            let final_alloc = match (record.hood, weight) {
                (Some(hood), Some(weight)) => Some(hood * weight),
                _ => None,
            };

            weight_cells.push(CellValue::from_option(weight));
            alloc_cells.push(CellValue::from_option(final_alloc));
        }

        let mut table = weekly.clone();
        table.append_or_replace_column(columns::COUNTRY_WEIGHTS, ColumnType::Numeric, weight_cells)?;
        table.append_or_replace_column(columns::FINAL_ALLOC, ColumnType::Numeric, alloc_cells)?;

        info!(
            rows = summary.rows,
            matched = summary.matched,
            unmatched = summary.unmatched,
            ambiguous = summary.ambiguous_countries.len(),
            "周度传播完成"
        );

        Ok(PropagationOutcome { table, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::Column;

    fn weighted_monthly(rows: Vec<(&str, f64)>) -> Table {
        let mut table = Table::new(
            "monthly",
            vec![
                Column::new(columns::COUNTRY, ColumnType::Text),
                Column::new(columns::COUNTRY_WEIGHTS, ColumnType::Numeric),
            ],
        );
        for (country, weight) in rows {
            table
                .push_row(vec![CellValue::Text(country.into()), CellValue::Number(weight)])
                .unwrap();
        }
        table
    }

    fn weekly(rows: Vec<(CellValue, CellValue)>) -> Table {
        let mut table = Table::new(
            "weekly",
            vec![
                Column::new(columns::COUNTRY, ColumnType::Text),
                Column::new(columns::HOOD, ColumnType::Numeric),
            ],
        );
        for (country, hood) in rows {
            table.push_row(vec![country, hood]).unwrap();
        }
        table
    }

    #[test]
    fn test_matched_country_gets_weight_and_final_alloc() {
        let monthly = weighted_monthly(vec![("FR", 0.25), ("DE", 0.75)]);
        let weekly = weekly(vec![(CellValue::Text("FR".into()), CellValue::Number(200.0))]);

        let outcome = Propagator::new().propagate(&monthly, &weekly).unwrap();

        assert_eq!(
            outcome.table.column_names(),
            vec!["Country", "Hood", "country_weights", "Final_alloc"]
        );
        assert_eq!(outcome.table.rows()[0][2], CellValue::Number(0.25));
        assert_eq!(outcome.table.rows()[0][3], CellValue::Number(50.0));
        assert_eq!(outcome.summary.matched, 1);
    }

    #[test]
    fn test_unmatched_country_leaves_both_cells_empty() {
        let monthly = weighted_monthly(vec![("FR", 0.25)]);
        let weekly = weekly(vec![
            (CellValue::Text("IT".into()), CellValue::Number(80.0)),
            (CellValue::Empty, CellValue::Number(10.0)),
        ]);

        let outcome = Propagator::new().propagate(&monthly, &weekly).unwrap();

        for row in outcome.table.rows() {
            assert_eq!(row[2], CellValue::Empty);
            assert_eq!(row[3], CellValue::Empty);
        }
        assert_eq!(outcome.summary.unmatched, 2);
    }

    #[test]
    fn test_first_matching_monthly_row_wins() {
        let monthly = weighted_monthly(vec![("FR", 0.4), ("DE", 1.0), ("FR", 0.9)]);
        let weekly = weekly(vec![(CellValue::Text("FR".into()), CellValue::Number(10.0))]);

        let outcome = Propagator::new().propagate(&monthly, &weekly).unwrap();

        assert_eq!(outcome.table.rows()[0][2], CellValue::Number(0.4));
        assert_eq!(outcome.table.rows()[0][3], CellValue::Number(4.0));
        assert_eq!(outcome.summary.ambiguous_countries, vec!["FR".to_string()]);
    }

    #[test]
    fn test_missing_hood_propagates_missing_final_alloc() {
        let monthly = weighted_monthly(vec![("FR", 0.5)]);
        let weekly = weekly(vec![(CellValue::Text("FR".into()), CellValue::Empty)]);

        let outcome = Propagator::new().propagate(&monthly, &weekly).unwrap();

        assert_eq!(outcome.table.rows()[0][2], CellValue::Number(0.5));
        assert_eq!(outcome.table.rows()[0][3], CellValue::Empty);
    }

    #[test]
    fn test_numeric_country_codes_join_across_tables() {
        let mut monthly = Table::new(
            "monthly",
            vec![
                Column::new(columns::COUNTRY, ColumnType::Numeric),
                Column::new(columns::COUNTRY_WEIGHTS, ColumnType::Numeric),
            ],
        );
        monthly
            .push_row(vec![CellValue::Number(33.0), CellValue::Number(0.6)])
            .unwrap();
        let weekly = weekly(vec![(CellValue::Text("33".into()), CellValue::Number(10.0))]);

        let outcome = Propagator::new().propagate(&monthly, &weekly).unwrap();

        assert_eq!(outcome.table.rows()[0][3], CellValue::Number(6.0));
    }

    #[test]
    fn test_monthly_without_weights_is_rejected() {
        let mut monthly = Table::new("monthly", vec![Column::new(columns::COUNTRY, ColumnType::Text)]);
        monthly.push_row(vec![CellValue::Text("FR".into())]).unwrap();
        let weekly = weekly(vec![]);

        assert!(Propagator::new().propagate(&monthly, &weekly).is_err());
    }
}
