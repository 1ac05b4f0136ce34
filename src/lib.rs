//! # lsb_stash 库
//!
//! 本库包含 LSB 隐写工具的核心逻辑：把一个完整的文件 (文件名、MIME 类型、内容)
//! 嵌入 RGBA 图像的像素数据，并能无损地提取出来。
//!
//! ```
//! use lsb_stash::frame::{EmbedOptions, HiddenFile, embed, extract};
//!
//! let (width, height) = (64, 64);
//! let mut pixels = vec![255u8; width as usize * height as usize * 4];
//! let file = HiddenFile::new("note.txt", "text/plain", b"hello".to_vec());
//! let options = EmbedOptions::default();
//!
//! embed(&mut pixels, width, height, &file, &options).unwrap();
//! let recovered = extract(&pixels, width, height, options.bit_depth, 0).unwrap();
//! assert_eq!(recovered, file);
//! ```

// 声明库包含的所有模块。

pub mod capacity;
pub mod cli;
pub mod constants;
pub mod error;
pub mod frame;
pub mod handler;
pub mod steganography;
