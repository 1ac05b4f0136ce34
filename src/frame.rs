//! # 帧编解码模块
//!
//! 把一个带名称和 MIME 类型的文件组织成帧并嵌入 RGBA 缓冲区，或者反过来提取出来。
//!
//! ```text
//! [2 字节 ] 魔数 {42, 52}                    步长 1
//! [10 字节] 头部: payload_len (u32 BE)        步长 1
//!                name_len (u8), type_len (u8)
//!                spacing (u32 BE)
//! [name_len 字节   ] 文件名                   步长 spacing
//! [type_len 字节   ] MIME 类型                步长 spacing
//! [payload_len 字节] 文件内容                 步长 spacing
//! ```
//!
//! 嵌入要么完全成功，要么把缓冲区恢复成调用前的样子。

use log::{debug, warn};

use crate::capacity::{Sections, Spacing, plan_spacing, section_steps, shrink_spacing};
use crate::constants::{CHANNELS_PER_PIXEL, HEADER_LEN, MAGIC, MAX_SECTION_LEN};
use crate::error::StegoError;
use crate::steganography::{BitDepth, pack, unpack};

/// 隐藏在图像中的文件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenFile {
    pub name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl HiddenFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content,
        }
    }

    fn sections(&self) -> Sections {
        Sections {
            name: self.name.len(),
            mime_type: self.mime_type.len(),
            content: self.content.len(),
        }
    }
}

/// 魔数之后的固定头部。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub payload_len: u32,
    pub name_len: u8,
    pub type_len: u8,
    pub spacing: u32,
}

impl FrameHeader {
    /// 为 `file` 构造头部，检查各长度字段是否放得下。
    ///
    /// # Errors
    ///
    /// 名称或类型超过 255 字节、内容超过 `u32::MAX` 字节时返回
    /// [`StegoError::InvalidParameter`]。
    pub fn for_file(file: &HiddenFile, spacing: u32) -> Result<Self, StegoError> {
        Ok(Self {
            payload_len: u32::try_from(file.content.len()).map_err(|_| {
                StegoError::InvalidParameter(format!(
                    "file content is {} bytes, the frame holds at most {} bytes",
                    file.content.len(),
                    u32::MAX
                ))
            })?,
            name_len: short_len("file name", &file.name)?,
            type_len: short_len("MIME type", &file.mime_type)?,
            spacing,
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut buffer = [0u8; HEADER_LEN];
        buffer[0..4].copy_from_slice(&self.payload_len.to_be_bytes());
        buffer[4] = self.name_len;
        buffer[5] = self.type_len;
        buffer[6..10].copy_from_slice(&self.spacing.to_be_bytes());
        buffer
    }

    pub fn from_bytes(data: &[u8; HEADER_LEN]) -> Self {
        Self {
            payload_len: u32::from_be_bytes([data[0], data[1], data[2], data[3]]),
            name_len: data[4],
            type_len: data[5],
            spacing: u32::from_be_bytes([data[6], data[7], data[8], data[9]]),
        }
    }
}

fn short_len(field: &str, value: &str) -> Result<u8, StegoError> {
    u8::try_from(value.len()).map_err(|_| {
        StegoError::InvalidParameter(format!(
            "{field} is {} bytes long, at most {MAX_SECTION_LEN} bytes fit in the frame header",
            value.len()
        ))
    })
}

/// 嵌入参数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedOptions {
    pub bit_depth: BitDepth,
    pub spacing: Spacing,
    /// 帧开始的像素步。
    pub start: usize,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            bit_depth: BitDepth::default(),
            spacing: Spacing::Auto,
            start: 0,
        }
    }
}

/// 一次成功嵌入的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Embedded {
    /// 最后一个段写完后的游标。
    pub end_step: usize,
    /// 变长段实际使用的步长。
    pub spacing: u32,
}

/// 检查缓冲区长度与尺寸是否一致，返回像素总数。
fn pixel_count(pix: &[u8], width: u32, height: u32) -> Result<usize, StegoError> {
    let pixels = width as usize * height as usize;
    if pixels.checked_mul(CHANNELS_PER_PIXEL) != Some(pix.len()) {
        return Err(StegoError::InvalidParameter(format!(
            "RGBA buffer holds {} bytes, a {width}x{height} image needs {}",
            pix.len(),
            pixels.saturating_mul(CHANNELS_PER_PIXEL)
        )));
    }
    Ok(pixels)
}

/// 从 `start` 开始依次写入魔数、头部和三个变长段。
///
/// 返回头部写完后的游标与最终游标。
fn write_frame(
    pix: &mut [u8],
    file: &HiddenFile,
    header: &FrameHeader,
    depth: BitDepth,
    start: usize,
) -> (usize, usize) {
    let cursor = pack(pix, &MAGIC, depth, start, 1);
    let variable_start = pack(pix, &header.to_bytes(), depth, cursor, 1);

    let stride = header.spacing as usize;
    let mut cursor = variable_start;
    for (section, bytes) in [
        ("name", file.name.as_bytes()),
        ("type", file.mime_type.as_bytes()),
        ("content", file.content.as_slice()),
    ] {
        let start = cursor;
        cursor = pack(pix, bytes, depth, cursor, stride);
        debug!("Wrote {section} section: {} bytes, steps {start}..{cursor}", bytes.len());
    }

    (variable_start, cursor)
}

/// 把 `file` 嵌入 `pix` (宽 `width`、高 `height` 的 RGBA8 行优先缓冲区)。
///
/// 自动步长按全部像素不透明来规划；透明像素使帧越界时，恢复缓冲区并用更小的步长重写，
/// 直到放下或步长降到 1。
///
/// # Errors
///
/// * [`StegoError::InvalidParameter`]：缓冲区尺寸不符，或文件字段超出头部的长度范围。
/// * [`StegoError::InsufficientCapacity`]：图像放不下整个帧，此时缓冲区已恢复原状。
pub fn embed(
    pix: &mut [u8],
    width: u32,
    height: u32,
    file: &HiddenFile,
    options: &EmbedOptions,
) -> Result<Embedded, StegoError> {
    let pixel_count = pixel_count(pix, width, height)?;
    let depth = options.bit_depth;
    // 先验证长度字段，失败时缓冲区还没有被改动
    let mut header = FrameHeader::for_file(file, 1)?;

    let snapshot = pix.to_vec();

    let mut spacing = plan_spacing(
        pixel_count,
        depth,
        options.start,
        &file.sections(),
        options.spacing,
    );
    debug!(
        "Embedding {} bytes at bit depth {} with spacing {spacing} ({})",
        file.content.len(),
        depth.bits(),
        options.spacing
    );

    loop {
        header.spacing = spacing;
        let (variable_start, end) = write_frame(pix, file, &header, depth, options.start);
        if end <= pixel_count {
            return Ok(Embedded {
                end_step: end,
                spacing,
            });
        }

        pix.copy_from_slice(&snapshot);

        if options.spacing != Spacing::Auto || spacing == 1 {
            warn!("Frame needs {end} pixel-steps but the image has {pixel_count}, changes rolled back");
            return Err(StegoError::InsufficientCapacity {
                required: end,
                available: pixel_count,
            });
        }

        spacing = shrink_spacing(spacing, variable_start, end, pixel_count);
        debug!("Frame overran the image ({end} > {pixel_count}), retrying with spacing {spacing}");
    }
}

/// 读出一个段。所需像素步的下限已经超出图像时直接失败，避免为伪造的长度分配内存。
fn read_section(
    pix: &[u8],
    len: usize,
    depth: BitDepth,
    start: usize,
    stride: usize,
    section: &'static str,
) -> Result<(Vec<u8>, usize), StegoError> {
    let pixel_count = pix.len() / CHANNELS_PER_PIXEL;
    let lower_bound = start.saturating_add(section_steps(len, depth).saturating_mul(stride));
    if lower_bound > pixel_count {
        return Err(StegoError::CorruptedOrForeignImage { section });
    }

    let (bytes, cursor) = unpack(pix, len, depth, start, stride)
        .map_err(|_| StegoError::CorruptedOrForeignImage { section })?;
    debug!("Read {section} section: {len} bytes, steps {start}..{cursor}");
    Ok((bytes, cursor))
}

/// 从 `pix` 中提取以 `start` 像素步开始的帧。
///
/// # Errors
///
/// * [`StegoError::InvalidParameter`]：缓冲区尺寸不符。
/// * [`StegoError::NoEncodedData`]：魔数不匹配，或图像小到连魔数都读不出。
/// * [`StegoError::CorruptedOrForeignImage`]：头部声明的长度超出了图像能提供的像素。
pub fn extract(
    pix: &[u8],
    width: u32,
    height: u32,
    depth: BitDepth,
    start: usize,
) -> Result<HiddenFile, StegoError> {
    pixel_count(pix, width, height)?;

    let (magic, cursor) = unpack(pix, MAGIC.len(), depth, start, 1)
        .map_err(|_| StegoError::NoEncodedData)?;
    if magic != MAGIC {
        return Err(StegoError::NoEncodedData);
    }

    let (raw_header, cursor) = read_section(pix, HEADER_LEN, depth, cursor, 1, "header")?;
    let mut header_bytes = [0u8; HEADER_LEN];
    header_bytes.copy_from_slice(&raw_header);
    let header = FrameHeader::from_bytes(&header_bytes);
    debug!("Found frame header: {header:?}");

    let stride = header.spacing.max(1) as usize;
    let (name, cursor) = read_section(pix, header.name_len as usize, depth, cursor, stride, "name")?;
    let (mime_type, cursor) =
        read_section(pix, header.type_len as usize, depth, cursor, stride, "type")?;
    let (content, _) = read_section(
        pix,
        header.payload_len as usize,
        depth,
        cursor,
        stride,
        "content",
    )?;

    Ok(HiddenFile {
        name: String::from_utf8_lossy(&name).into_owned(),
        mime_type: String::from_utf8_lossy(&mime_type).into_owned(),
        content,
    })
}
