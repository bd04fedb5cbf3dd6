// ==========================================
// 分配报表重算工具 - 分配领域模型
// ==========================================
// 职责: 月度/周度记录的类型化视图 + 分组键 + 计算汇总
// 用途: 加载层产出 Table，引擎层通过本模块读取类型化字段
// ==========================================

use crate::domain::table::{Table, TableError};
use crate::domain::types::CellValue;
use serde::{Deserialize, Serialize};

/// 报表列名
pub mod columns {
    pub const SKU: &str = "SKU";
    pub const PL: &str = "PL";
    pub const PLANT: &str = "Plant";
    pub const MARKET_LEVEL: &str = "Market_level";
    pub const MONTH: &str = "Month";
    pub const COUNTRY: &str = "Country";
    pub const REBALANCING: &str = "Rebalancing";
    pub const NEPTUNE_ALLOCATION: &str = "Neptune_Allocation";
    pub const HOOD: &str = "Hood";

    // 派生列
    pub const REBALANCED: &str = "Rebalanced";
    pub const COUNTRY_WEIGHTS: &str = "country_weights";
    pub const FINAL_ALLOC: &str = "Final_alloc";

    /// 分组键（五元组）
    pub const GROUP_KEY: [&str; 5] = [SKU, PL, PLANT, MARKET_LEVEL, MONTH];

    /// 月度报表必需列
    pub const MONTHLY_REQUIRED: [&str; 8] = [
        SKU,
        PL,
        PLANT,
        MARKET_LEVEL,
        MONTH,
        COUNTRY,
        REBALANCING,
        NEPTUNE_ALLOCATION,
    ];

    /// 周度报表必需列
    pub const WEEKLY_REQUIRED: [&str; 2] = [COUNTRY, HOOD];
}

// ==========================================
// GroupKey - 分组键
// ==========================================
// (SKU, PL, Plant, Market_level, Month)，构成月度表的一个划分
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    pub sku: String,
    pub pl: String,
    pub plant: String,
    pub market_level: String,
    pub month: String,
}

// ==========================================
// MonthlyRecord - 月度分配记录（类型化视图）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub row_number: usize,
    pub sku: Option<String>,
    pub pl: Option<String>,
    pub plant: Option<String>,
    pub market_level: Option<String>,
    pub month: Option<String>,
    pub country: Option<String>,
    pub rebalancing: Option<f64>,        // 用户可编辑
    pub neptune_allocation: Option<f64>, // 基线分配（只读）
}

impl MonthlyRecord {
    /// 分组键；任一分量缺失时返回 None（空键保护）
    pub fn group_key(&self) -> Option<GroupKey> {
        Some(GroupKey {
            sku: self.sku.clone()?,
            pl: self.pl.clone()?,
            plant: self.plant.clone()?,
            market_level: self.market_level.clone()?,
            month: self.month.clone()?,
        })
    }

    /// Rebalanced = Rebalancing + Neptune_Allocation（任一缺失 → None）
    pub fn rebalanced(&self) -> Option<f64> {
        Some(self.rebalancing? + self.neptune_allocation?)
    }
}

/// 月度表列位置（一次解析，逐行读取）
#[derive(Debug, Clone, Copy)]
pub struct MonthlyColumns {
    sku: usize,
    pl: usize,
    plant: usize,
    market_level: usize,
    month: usize,
    country: usize,
    rebalancing: usize,
    neptune_allocation: usize,
}

impl MonthlyColumns {
    /// 解析列位置并检查数值列类型
    pub fn resolve(table: &Table) -> Result<Self, TableError> {
        table.require_columns(&columns::MONTHLY_REQUIRED)?;
        Ok(Self {
            sku: table.require_column(columns::SKU)?,
            pl: table.require_column(columns::PL)?,
            plant: table.require_column(columns::PLANT)?,
            market_level: table.require_column(columns::MARKET_LEVEL)?,
            month: table.require_column(columns::MONTH)?,
            country: table.require_column(columns::COUNTRY)?,
            rebalancing: table.require_numeric_column(columns::REBALANCING)?,
            neptune_allocation: table.require_numeric_column(columns::NEPTUNE_ALLOCATION)?,
        })
    }

    pub fn read(&self, table: &Table, row: usize) -> Result<MonthlyRecord, TableError> {
        Ok(MonthlyRecord {
            row_number: row,
            sku: key_at(table, row, self.sku),
            pl: key_at(table, row, self.pl),
            plant: key_at(table, row, self.plant),
            market_level: key_at(table, row, self.market_level),
            month: key_at(table, row, self.month),
            country: key_at(table, row, self.country),
            rebalancing: table.numeric_at(row, self.rebalancing)?,
            neptune_allocation: table.numeric_at(row, self.neptune_allocation)?,
        })
    }
}

// ==========================================
// WeeklyRecord - 周度分配记录（类型化视图）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRecord {
    pub row_number: usize,
    pub country: Option<String>,
    pub hood: Option<f64>, // 周度量
}

#[derive(Debug, Clone, Copy)]
pub struct WeeklyColumns {
    country: usize,
    hood: usize,
}

impl WeeklyColumns {
    pub fn resolve(table: &Table) -> Result<Self, TableError> {
        table.require_columns(&columns::WEEKLY_REQUIRED)?;
        Ok(Self {
            country: table.require_column(columns::COUNTRY)?,
            hood: table.require_numeric_column(columns::HOOD)?,
        })
    }

    pub fn read(&self, table: &Table, row: usize) -> Result<WeeklyRecord, TableError> {
        Ok(WeeklyRecord {
            row_number: row,
            country: key_at(table, row, self.country),
            hood: table.numeric_at(row, self.hood)?,
        })
    }
}

fn key_at(table: &Table, row: usize, col: usize) -> Option<String> {
    table.cell(row, col).and_then(CellValue::key_string)
}

// ==========================================
// 计算汇总
// ==========================================

/// 权重计算汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightSummary {
    pub rows: usize,
    pub groups: usize,
    pub zero_sum_groups: usize, // 组内合计为 0，权重全部置 0
    pub null_key_rows: usize,   // 分组键缺失，权重置 0
    pub missing_value_rows: usize, // Rebalanced 缺失，权重置 0
}

/// 周度传播汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropagationSummary {
    pub rows: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// 在月度表中对应多个不同权重的国家（按首行取值）
    pub ambiguous_countries: Vec<String>,
}
