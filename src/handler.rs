//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 与 `capacity` 子命令的高级业务逻辑。
//! 本模块负责图像解码与文件 I/O、调用核心编解码函数以及向用户报告结果。

use crate::capacity::estimate_capacity;
use crate::cli::{CapacityArgs, HideArgs, RecoverArgs};
use crate::constants::{DEFAULT_MIME_TYPE, HIDE_OUTPUT_PREFIX, RECOVER_OUTPUT_PREFIX};
use crate::frame::{EmbedOptions, HiddenFile, embed, extract};
use crate::steganography::BitDepth;
use anyhow::{Context, Result};
use colored::Colorize;
use image::RgbaImage;
use std::fs;
use std::path::{Path, PathBuf};

/// 读取图像并转换为 RGBA8 缓冲区。
fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let picture = image::open(path).with_context(|| {
        format!(
            "Unable to read image file: {}",
            path.to_string_lossy().red().bold()
        )
    })?;
    Ok(picture.to_rgba8())
}

/// 目标文件已存在且未指定 `--force` 时拒绝继续。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

/// `hide` 的默认输出路径：输入图像旁的 `doctored_<名称>.png`。
fn default_hide_path(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    image.with_file_name(format!("{HIDE_OUTPUT_PREFIX}{stem}.png"))
}

/// `recover` 的默认输出路径：图像旁的 `recovered_<隐藏的文件名>`。
/// 隐藏的文件名只取最后一个路径分量，防止写到图像目录之外。
fn default_recover_path(image: &Path, hidden_name: &str) -> PathBuf {
    let name = Path::new(hidden_name)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| {
            let stem = image
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            format!("{stem}.bin")
        });
    image.with_file_name(format!("{RECOVER_OUTPUT_PREFIX}{name}"))
}

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取图像和待隐藏的文件、调用帧编码函数把文件名、MIME 类型和内容一起嵌入，
/// 最后将结果写入目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径与编码参数的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像或文件。
/// * 目标文件已存在且没有指定 `--force`。
/// * 图像没有足够的空间来隐藏文件 (此时不会写出任何文件)。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| default_hide_path(&args.image));
    ensure_writable(&dest, args.force)?;

    let mut picture = load_rgba(&args.image)?;

    let content = fs::read(&args.file).with_context(|| {
        format!(
            "Unable to read file to hide: {}",
            args.file.to_string_lossy().red().bold()
        )
    })?;

    let name = args
        .file
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime_type = args
        .mime_type
        .clone()
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
    let file = HiddenFile::new(name, mime_type, content);

    let options = EmbedOptions {
        bit_depth: BitDepth::new(args.bits)?,
        spacing: args.spacing,
        start: args.offset,
    };

    let (width, height) = picture.dimensions();
    let embedded = embed(&mut picture, width, height, &file, &options).with_context(|| {
        format!(
            "Failed to hide {} in {}.",
            args.file.to_string_lossy().red().bold(),
            args.image.to_string_lossy().red().bold()
        )
    })?;

    picture.save(&dest).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The file has been successfully hidden (spacing {}, {} of {} pixel-steps used) and saved: {}",
        embedded.spacing.to_string().green(),
        embedded.end_step.to_string().green(),
        (width as usize * height as usize).to_string().green(),
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、调用帧解码函数恢复文件名、MIME 类型和内容，
/// 最后将恢复的内容写入目标文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径与解码参数的 `RecoverArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像文件。
/// * 图像中没有隐藏数据，或数据已损坏。
/// * 目标文件已存在且没有指定 `--force`。
/// * 无法写入到目标文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let picture = load_rgba(&args.image)?;
    let depth = BitDepth::new(args.bits)?;

    let (width, height) = picture.dimensions();
    let file = extract(&picture, width, height, depth, args.offset).with_context(|| {
        format!(
            "Failed to recover a hidden file from '{}'. \nThe image may not contain hidden data or is corrupted.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_recover_path(&args.image, &file.name));
    ensure_writable(&output, args.force)?;

    fs::write(&output, &file.content).with_context(|| {
        format!(
            "Unable to write to target file: {}",
            output.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The file {} ({}, {} bytes) has been successfully recovered and saved: {}",
        file.name.bold(),
        file.mime_type,
        file.content.len(),
        output.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Capacity' 命令的执行逻辑。
///
/// 打印在给定位深和步长下图像最多能隐藏的内容字节数。
/// 如果提供了文件，同时报告该文件是否放得下。
///
/// # Errors
///
/// 无法读取图像或文件时返回错误。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let picture = load_rgba(&args.image)?;
    let depth = BitDepth::new(args.bits)?;
    let (width, height) = picture.dimensions();
    let pixel_count = width as usize * height as usize;

    let mime_type = args
        .mime_type
        .clone()
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
    let name = args
        .file
        .as_ref()
        .and_then(|path| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let capacity = estimate_capacity(
        pixel_count,
        depth,
        args.spacing,
        args.offset,
        name.len(),
        mime_type.len(),
    );

    println!(
        "{}x{} image, bit depth {}, spacing {}: about {} bytes of content fit.",
        width,
        height,
        depth.bits(),
        args.spacing,
        capacity.to_string().green().bold()
    );

    if let Some(path) = &args.file {
        let size = fs::metadata(path)
            .with_context(|| {
                format!(
                    "Unable to read file: {}",
                    path.to_string_lossy().red().bold()
                )
            })?
            .len();
        if size <= capacity as u64 {
            println!(
                "{} ({} bytes) fits.",
                path.to_string_lossy().green().bold(),
                size
            );
        } else {
            println!(
                "{} ({} bytes) does not fit.",
                path.to_string_lossy().red().bold(),
                size
            );
        }
    }

    Ok(())
}
