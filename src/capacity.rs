//! # 容量规划模块
//!
//! 决定名称、类型、内容三个变长段使用的步长，并估算图像还能容纳多少字节。
//! 规划与容量显示共用 [`section_steps`] 这一个计数函数，两者的结果始终一致。
//! 计数假设所有像素都完全不透明；含透明像素时，自动步长由 [`shrink_spacing`] 逐次缩小。

use std::fmt;
use std::str::FromStr;

use crate::constants::{HEADER_LEN, MAGIC};
use crate::steganography::BitDepth;

/// 变长段的扫描步长。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Spacing {
    /// 选择恰好能填满可用像素的最大步长。
    #[default]
    Auto,
    /// 调用方指定的步长，0 按 1 处理。
    Fixed(u32),
}

impl Spacing {
    /// 调用方指定步长时的实际步长；自动模式返回 `None`。
    pub fn stride(self) -> Option<u32> {
        match self {
            Self::Auto => None,
            Self::Fixed(s) => Some(s.max(1)),
        }
    }
}

impl FromStr for Spacing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        s.parse::<u32>()
            .map(Self::Fixed)
            .map_err(|_| format!("expected 'auto' or a non-negative integer, got '{s}'"))
    }
}

impl fmt::Display for Spacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Fixed(s) => write!(f, "{s}"),
        }
    }
}

/// 三个变长段的字节长度。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sections {
    pub name: usize,
    pub mime_type: usize,
    pub content: usize,
}

impl Sections {
    /// 三个段在步长为 1 时各自所需像素步之和。
    pub fn variable_steps(&self, depth: BitDepth) -> usize {
        section_steps(self.name, depth)
            + section_steps(self.mime_type, depth)
            + section_steps(self.content, depth)
    }
}

/// 写入 `byte_len` 个字节所需的像素步数：`ceil(byte_len * 8 / (3 * n))`。
pub fn section_steps(byte_len: usize, depth: BitDepth) -> usize {
    (byte_len * 8).div_ceil(depth.bits_per_step())
}

/// 魔数与头部以步长 1 写入时占用的像素步数。两者分别写入，各自向上取整。
pub fn header_steps(depth: BitDepth) -> usize {
    section_steps(MAGIC.len(), depth) + section_steps(HEADER_LEN, depth)
}

/// 整个帧在步长 `stride` 下结束时的游标。大于像素总数即表示放不下。
pub fn required_steps(start: usize, depth: BitDepth, sections: &Sections, stride: u32) -> usize {
    let variable = sections
        .variable_steps(depth)
        .saturating_mul(stride.max(1) as usize);
    start
        .saturating_add(header_steps(depth))
        .saturating_add(variable)
}

/// 解析变长段使用的步长。
///
/// 指定步长时只做 `>= 1` 的规范化，不检查能否放下。
/// 自动模式下返回满足 `required_steps <= pixel_count` 的最大步长 (至少为 1)；
/// 即使步长为 1 也放不下时同样返回 1，由嵌入后的溢出检查报告失败。
pub fn plan_spacing(
    pixel_count: usize,
    depth: BitDepth,
    start: usize,
    sections: &Sections,
    spacing: Spacing,
) -> u32 {
    if let Some(stride) = spacing.stride() {
        return stride;
    }

    let variable = sections.variable_steps(depth);
    if variable == 0 {
        return 1;
    }

    let available = pixel_count.saturating_sub(start.saturating_add(header_steps(depth)));
    let stride = (available / variable).clamp(1, u32::MAX as usize);
    stride as u32
}

/// 自动步长写完后游标越界 (透明像素不携带数据) 时，给出下一次尝试的更小步长。
///
/// 按变长段实际占用的像素步与剩余像素步的比例缩小步长，且至少减 1，最小为 1。
/// `variable_start` 是头部写完后的游标，`end` 是越界的结束游标。
pub fn shrink_spacing(spacing: u32, variable_start: usize, end: usize, pixel_count: usize) -> u32 {
    let used = end.saturating_sub(variable_start).max(1) as u128;
    let room = pixel_count.saturating_sub(variable_start) as u128;
    let scaled = (spacing as u128 * room / used).min(u32::MAX as u128) as u32;
    scaled.min(spacing.saturating_sub(1)).max(1)
}

/// 估算在给定名称与类型长度下，内容段最多能放下的字节数。
///
/// 自动步长按步长 1 估算，也就是图像能承载的上限。
pub fn estimate_capacity(
    pixel_count: usize,
    depth: BitDepth,
    spacing: Spacing,
    start: usize,
    name_len: usize,
    type_len: usize,
) -> usize {
    let stride = spacing.stride().unwrap_or(1) as usize;
    let fixed = Sections {
        name: name_len,
        mime_type: type_len,
        content: 0,
    };
    let used = required_steps(start, depth, &fixed, stride as u32);
    let content_steps = pixel_count.saturating_sub(used) / stride;
    let bytes = content_steps * depth.bits_per_step() / 8;
    bytes.min(u32::MAX as usize)
}
