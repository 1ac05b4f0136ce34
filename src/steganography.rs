//! # 位打包模块
//!
//! 把字节流写入 (或读出) RGBA 缓冲区中颜色通道的最低有效位。
//! 扫描以"像素步"为单位，每次前进 `spacing` 个像素；只有 Alpha 为 255 的像素步
//! 携带数据，其余像素步只推进游标，不消耗任何数据位。

use crate::constants::{
    ALPHA_CHANNEL, CHANNELS_PER_PIXEL, COLOR_CHANNELS, DEFAULT_BIT_DEPTH, MAX_BIT_DEPTH,
    MIN_BIT_DEPTH, OPAQUE,
};
use crate::error::StegoError;

/// 每个颜色通道使用的最低有效位数，取值 1 到 8。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitDepth(u8);

impl BitDepth {
    /// # Errors
    ///
    /// 位深不在 1 到 8 之间时返回 [`StegoError::InvalidParameter`]。
    pub fn new(bits: u8) -> Result<Self, StegoError> {
        if !(MIN_BIT_DEPTH..=MAX_BIT_DEPTH).contains(&bits) {
            return Err(StegoError::InvalidParameter(format!(
                "bit depth must be between {MIN_BIT_DEPTH} and {MAX_BIT_DEPTH}, got {bits}"
            )));
        }
        Ok(Self(bits))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// 一个合格像素步携带的数据位数 (每个颜色通道 n 位)。
    pub fn bits_per_step(self) -> usize {
        COLOR_CHANNELS * self.0 as usize
    }
}

impl Default for BitDepth {
    fn default() -> Self {
        Self(DEFAULT_BIT_DEPTH)
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = StegoError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

/// 像素步是否可以携带数据。
fn is_eligible(pixel: &[u8]) -> bool {
    pixel[ALPHA_CHANNEL] == OPAQUE
}

/// 取出比特流中的第 `index` 位，0 号位是第一个字节的最高位。
fn stream_bit(bytes: &[u8], index: usize) -> u8 {
    (bytes[index >> 3] >> (7 - (index & 7))) & 1
}

/// 把 `bytes` 按最高位优先的顺序写入缓冲区，从像素步 `start` 开始，步长为 `spacing`。
///
/// 每个合格像素步依次向 R、G、B 三个通道各写入 `depth` 位，通道中更高的位保持不变。
/// 最后一个像素步只改动实际写入的位。
///
/// 返回写完后的游标。如果扫描在写完之前越过了最后一个像素，函数立即返回
/// 预计的结束游标 (假设剩余像素步全部合格)，它一定大于像素总数，由调用方判定溢出。
pub fn pack(pix: &mut [u8], bytes: &[u8], depth: BitDepth, start: usize, spacing: usize) -> usize {
    let spacing = spacing.max(1);
    let pixel_count = pix.len() / CHANNELS_PER_PIXEL;
    let bits = depth.bits() as usize;
    let total_bits = bytes.len() * 8;

    let mut written = 0;
    let mut step = start;

    while written < total_bits {
        if step >= pixel_count {
            let remaining_steps = (total_bits - written).div_ceil(depth.bits_per_step());
            return step.saturating_add(remaining_steps.saturating_mul(spacing));
        }

        let offset = step * CHANNELS_PER_PIXEL;
        let pixel = &mut pix[offset..offset + CHANNELS_PER_PIXEL];

        if is_eligible(pixel) {
            'channels: for channel in pixel[..COLOR_CHANNELS].iter_mut() {
                for bit in 0..bits {
                    if written == total_bits {
                        break 'channels;
                    }
                    let shift = bits - bit - 1;
                    *channel = (*channel & !(1 << shift)) | (stream_bit(bytes, written) << shift);
                    written += 1;
                }
            }
        }

        step = step.saturating_add(spacing);
    }

    step
}

/// [`pack`] 的逆操作：从像素步 `start` 开始以步长 `spacing` 读出 `byte_count` 个字节。
///
/// 返回读出的字节以及读完后的游标。
///
/// # Errors
///
/// 在读满 `byte_count` 个字节之前游标越过了最后一个像素时，返回
/// [`StegoError::CorruptedOrForeignImage`]。
pub fn unpack(
    pix: &[u8],
    byte_count: usize,
    depth: BitDepth,
    start: usize,
    spacing: usize,
) -> Result<(Vec<u8>, usize), StegoError> {
    let spacing = spacing.max(1);
    let pixel_count = pix.len() / CHANNELS_PER_PIXEL;
    let bits = depth.bits() as usize;
    let total_bits = byte_count * 8;

    let mut bytes = vec![0u8; byte_count];
    let mut read = 0;
    let mut step = start;

    while read < total_bits {
        if step >= pixel_count {
            return Err(StegoError::CorruptedOrForeignImage {
                section: "pixel data",
            });
        }

        let offset = step * CHANNELS_PER_PIXEL;
        let pixel = &pix[offset..offset + CHANNELS_PER_PIXEL];

        if is_eligible(pixel) {
            'channels: for &channel in &pixel[..COLOR_CHANNELS] {
                for bit in 0..bits {
                    if read == total_bits {
                        break 'channels;
                    }
                    let value = (channel >> (bits - bit - 1)) & 1;
                    bytes[read >> 3] |= value << (7 - (read & 7));
                    read += 1;
                }
            }
        }

        step = step.saturating_add(spacing);
    }

    Ok((bytes, step))
}
