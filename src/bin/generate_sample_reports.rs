// ==========================================
// 示例报表生成器
// ==========================================
// 用途: 生成月度/周度示例输入报表
// 输出: nwe.xlsx / weekly.xlsx（工作目录）
//       samples/nwe.csv / samples/weekly.csv
// 覆盖: 正常分组、零合计分组、跨分组国家、未匹配国家
// ==========================================

use chrono::{Duration, NaiveDate};
use csv::Writer;
use rust_xlsxwriter::{Format, Workbook};
use std::error::Error;
use std::fs;

const MONTHLY_HEADER: &[&str] = &[
    "SKU",
    "PL",
    "Plant",
    "Market_level",
    "Month",
    "Country",
    "Rebalancing",
    "Neptune_Allocation",
];

const WEEKLY_HEADER: &[&str] = &["Week", "SKU", "Country", "Hood"];

// 月度记录
struct MonthlyRow {
    sku: &'static str,
    pl: &'static str,
    plant: &'static str,
    market_level: &'static str,
    month: &'static str,
    country: &'static str,
    rebalancing: f64,
    neptune_allocation: f64,
}

impl MonthlyRow {
    fn text_fields(&self) -> [&str; 6] {
        [
            self.sku,
            self.pl,
            self.plant,
            self.market_level,
            self.month,
            self.country,
        ]
    }
}

// 周度记录
struct WeeklyRow {
    week: String,
    sku: &'static str,
    country: &'static str,
    hood: f64,
}

fn monthly_rows() -> Vec<MonthlyRow> {
    let row = |sku: &'static str,
               plant: &'static str,
               country: &'static str,
               rebalancing: f64,
               neptune_allocation: f64| MonthlyRow {
        sku,
        pl: "PL01",
        plant,
        market_level: "L1",
        month: "2024-01",
        country,
        rebalancing,
        neptune_allocation,
    };

    vec![
        // 正常分组
        row("SKU-A", "P1", "FR", 10.0, 0.0),
        row("SKU-A", "P1", "DE", 30.0, 0.0),
        // 基线 + 调整
        row("SKU-B", "P2", "ES", 0.0, 120.0),
        row("SKU-B", "P2", "NL", -20.0, 100.0),
        row("SKU-B", "P2", "BE", 5.0, 15.0),
        // 零合计分组
        row("SKU-C", "P1", "PT", 0.0, 0.0),
        row("SKU-C", "P1", "AT", 0.0, 0.0),
        // FR 再次出现在其他分组（关联时取首行）
        row("SKU-D", "P3", "FR", 50.0, 50.0),
        row("SKU-D", "P3", "PL", 0.0, 100.0),
    ]
}

fn weekly_rows() -> Result<Vec<WeeklyRow>, Box<dyn Error>> {
    // 2024-01 的四个周一
    let first_monday = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("无效日期")?;
    let countries: [(&'static str, &'static str, f64); 5] = [
        ("SKU-A", "FR", 200.0),
        ("SKU-A", "DE", 300.0),
        ("SKU-B", "NL", 90.0),
        ("SKU-C", "PT", 40.0),
        ("SKU-E", "IT", 80.0), // 月度表中不存在
    ];

    let mut rows = Vec::new();
    for week in 0..4 {
        let monday = first_monday + Duration::weeks(week);
        for (sku, country, hood) in countries {
            rows.push(WeeklyRow {
                week: monday.format("%Y-%m-%d").to_string(),
                sku,
                country,
                hood,
            });
        }
    }
    Ok(rows)
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("开始生成示例报表...");

    let monthly = monthly_rows();
    let weekly = weekly_rows()?;

    write_monthly_xlsx("nwe.xlsx", &monthly)?;
    write_weekly_xlsx("weekly.xlsx", &weekly)?;

    fs::create_dir_all("samples")?;
    write_monthly_csv("samples/nwe.csv", &monthly)?;
    write_weekly_csv("samples/weekly.csv", &weekly)?;

    println!(
        "✓ 示例报表生成完成: 月度 {} 行, 周度 {} 行",
        monthly.len(),
        weekly.len()
    );
    Ok(())
}

fn write_monthly_xlsx(path: &str, rows: &[MonthlyRow]) -> Result<(), Box<dyn Error>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Monthly_Report")?;

    for (col, name) in MONTHLY_HEADER.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }
    for (idx, row) in rows.iter().enumerate() {
        let r = (idx + 1) as u32;
        for (col, value) in row.text_fields().iter().enumerate() {
            sheet.write_string(r, col as u16, *value)?;
        }
        sheet.write_number(r, 6, row.rebalancing)?;
        sheet.write_number(r, 7, row.neptune_allocation)?;
    }

    workbook.save(path)?;
    println!("  → {}", path);
    Ok(())
}

fn write_weekly_xlsx(path: &str, rows: &[WeeklyRow]) -> Result<(), Box<dyn Error>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Weekly_Report")?;

    for (col, name) in WEEKLY_HEADER.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }
    for (idx, row) in rows.iter().enumerate() {
        let r = (idx + 1) as u32;
        sheet.write_string(r, 0, &row.week)?;
        sheet.write_string(r, 1, row.sku)?;
        sheet.write_string(r, 2, row.country)?;
        sheet.write_number(r, 3, row.hood)?;
    }

    workbook.save(path)?;
    println!("  → {}", path);
    Ok(())
}

fn write_monthly_csv(path: &str, rows: &[MonthlyRow]) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_path(path)?;
    wtr.write_record(MONTHLY_HEADER)?;
    for row in rows {
        let mut record: Vec<String> = row.text_fields().iter().map(|s| s.to_string()).collect();
        record.push(row.rebalancing.to_string());
        record.push(row.neptune_allocation.to_string());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    println!("  → {}", path);
    Ok(())
}

fn write_weekly_csv(path: &str, rows: &[WeeklyRow]) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_path(path)?;
    wtr.write_record(WEEKLY_HEADER)?;
    for row in rows {
        wtr.write_record([
            row.week.as_str(),
            row.sku,
            row.country,
            row.hood.to_string().as_str(),
        ])?;
    }
    wtr.flush()?;
    println!("  → {}", path);
    Ok(())
}
