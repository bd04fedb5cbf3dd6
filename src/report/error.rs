// ==========================================
// 分配报表重算工具 - 报表导出错误类型
// ==========================================

use thiserror::Error;

/// 报表导出错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Excel 生成失败: {0}")]
    WorkbookError(String),

    #[error("表过大，无法写入工作表: {0}")]
    SheetLimitExceeded(String),

    #[error("文件写出失败: {0}")]
    FileWriteError(String),
}

impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ExportError::WorkbookError(err.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::FileWriteError(err.to_string())
    }
}

/// Result 类型别名
pub type ExportResult<T> = Result<T, ExportError>;
