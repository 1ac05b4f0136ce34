//! # 错误类型模块
//!
//! 编解码核心只返回 [`StegoError`]，命令行层再用 `anyhow` 附加上下文。

use thiserror::Error;

/// 嵌入或提取过程中可能出现的错误。每个错误只影响单次调用。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StegoError {
    /// 提取时魔数不匹配。
    #[error("No encoded data found in the image.")]
    NoEncodedData,

    /// 嵌入所需的像素步数超过图像可用的像素步数，缓冲区已恢复原状。
    #[error(
        "Not enough space in the image to hide the file. \nRequired: {required} pixel-steps, Available: {available} ({:.1}% of the available space)",
        usage_percent(*.required, *.available)
    )]
    InsufficientCapacity { required: usize, available: usize },

    /// 提取时在满足头部声明的长度之前就用完了像素。
    #[error(
        "Not enough pixels to read the {section} section. \nThe image is corrupted or was not produced by this tool."
    )]
    CorruptedOrForeignImage { section: &'static str },

    /// 位深越界、缓冲区尺寸不符或字段长度超出单字节范围。
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// 所需像素步占可用像素步的百分比。
pub fn usage_percent(required: usize, available: usize) -> f64 {
    if available == 0 {
        return f64::INFINITY;
    }
    required as f64 * 100.0 / available as f64
}
