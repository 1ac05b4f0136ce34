//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::Parser;
use std::path::PathBuf;

use crate::capacity::Spacing;
use crate::constants::{DEFAULT_BIT_DEPTH, MAX_BIT_DEPTH, MIN_BIT_DEPTH};

/// 一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在无损格式图像 (如 PNG, BMP) 中隐藏或恢复完整的文件。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在无损格式图像 (如 PNG, BMP) 中隐藏或恢复完整的文件 (文件名、MIME 类型与内容)。"
)]
pub struct Cli {
    /// 输出调试日志。
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：hide (隐藏)、recover (恢复) 和 capacity (容量)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 在无损格式图像 (如 PNG, BMP) 中隐藏一个文件。
    Hide(HideArgs),

    /// 从经过隐写的图像中恢复隐藏的文件。
    Recover(RecoverArgs),

    /// 估算图像还能隐藏多少字节。
    Capacity(CapacityArgs),
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 用于隐写的输入图像文件路径 (如 PNG, BMP)。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的文件路径。
    #[arg(short, long)]
    pub file: PathBuf,

    /// 隐写完成后，保存结果图像的输出路径。默认为输入图像旁的 `doctored_<名称>.png`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 每个颜色通道使用的最低有效位数。
    #[arg(short, long, default_value_t = DEFAULT_BIT_DEPTH,
          value_parser = clap::value_parser!(u8).range(MIN_BIT_DEPTH as i64..=MAX_BIT_DEPTH as i64))]
    pub bits: u8,

    /// 变长段的像素步长：`auto` 或非负整数。
    #[arg(short, long, default_value_t = Spacing::Auto)]
    pub spacing: Spacing,

    /// 帧开始的像素步。
    #[arg(short, long, default_value_t = 0)]
    pub offset: usize,

    /// 记录在帧中的 MIME 类型。默认为 `application/octet-stream`。
    #[arg(short, long)]
    pub mime_type: Option<String>,

    /// 目标文件已存在时覆盖它。
    #[arg(long)]
    pub force: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏文件的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复出的文件的保存路径。默认为图像旁的 `recovered_<隐藏的文件名>`。
    #[arg(short = 'O', long)]
    pub output: Option<PathBuf>,

    /// 隐藏时使用的位深。
    #[arg(short, long, default_value_t = DEFAULT_BIT_DEPTH,
          value_parser = clap::value_parser!(u8).range(MIN_BIT_DEPTH as i64..=MAX_BIT_DEPTH as i64))]
    pub bits: u8,

    /// 隐藏时使用的起始像素步。
    #[arg(short, long, default_value_t = 0)]
    pub offset: usize,

    /// 目标文件已存在时覆盖它。
    #[arg(long)]
    pub force: bool,
}

/// 'capacity' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CapacityArgs {
    /// 要估算的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 每个颜色通道使用的最低有效位数。
    #[arg(short, long, default_value_t = DEFAULT_BIT_DEPTH,
          value_parser = clap::value_parser!(u8).range(MIN_BIT_DEPTH as i64..=MAX_BIT_DEPTH as i64))]
    pub bits: u8,

    /// 变长段的像素步长：`auto` 或非负整数。
    #[arg(short, long, default_value_t = Spacing::Auto)]
    pub spacing: Spacing,

    /// 帧开始的像素步。
    #[arg(short, long, default_value_t = 0)]
    pub offset: usize,

    /// 打算隐藏的文件。提供时会检查它是否放得下。
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// 记录在帧中的 MIME 类型。
    #[arg(short, long)]
    pub mime_type: Option<String>,
}
