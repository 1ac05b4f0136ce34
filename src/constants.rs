/// 帧开头的魔数。提取时前两个字节必须与之完全一致，否则视为图像中没有隐藏数据。
pub const MAGIC: [u8; 2] = [42, 52];

/// 固定头部的字节数：`payload_len: u32` + `name_len: u8` + `type_len: u8` + `spacing: u32`，
/// 全部为大端序。
pub const HEADER_LEN: usize = 10;

/// 魔数与头部合计占用的字节数，两者总是以步长 1 写入。
pub const FRAME_OVERHEAD: usize = MAGIC.len() + HEADER_LEN;

/// 每个像素的通道数 (R, G, B, A)。
pub const CHANNELS_PER_PIXEL: usize = 4;

/// 携带数据的颜色通道数 (R, G, B)，Alpha 通道从不写入。
pub const COLOR_CHANNELS: usize = 3;

/// Alpha 通道的下标。
pub const ALPHA_CHANNEL: usize = 3;

/// 完全不透明的 Alpha 值。只有 Alpha 等于该值的像素才会携带数据。
pub const OPAQUE: u8 = 255;

/// 每个通道可用的最低有效位数的取值范围。
pub const MIN_BIT_DEPTH: u8 = 1;
pub const MAX_BIT_DEPTH: u8 = 8;

/// 未指定时使用的位深。
pub const DEFAULT_BIT_DEPTH: u8 = 2;

/// 名称与类型字段各自只有一个字节的长度。
pub const MAX_SECTION_LEN: usize = u8::MAX as usize;

/// 未指定 MIME 类型时使用的类型。
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// 默认输出文件名的前缀。
pub const HIDE_OUTPUT_PREFIX: &str = "doctored_";
pub const RECOVER_OUTPUT_PREFIX: &str = "recovered_";
