use anyhow::Ok;
use image::{ImageBuffer, Rgba};
use lsb_stash::{
    capacity::Spacing,
    cli::{CapacityArgs, HideArgs, RecoverArgs},
    handler::{handle_capacity, handle_hide, handle_recover},
};
use rand::RngCore;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// 一个辅助函数，用于创建一个带有随机像素的测试图像
fn create_test_image(path: &Path, width: u32, height: u32) {
    let mut img_buf = ImageBuffer::new(width, height);
    let mut raw_pixels = vec![0u8; (width * height * 4) as usize];
    rand::rng().fill_bytes(&mut raw_pixels);

    img_buf
        .pixels_mut()
        .zip(raw_pixels.chunks_exact(4))
        .for_each(|(pixel, chunk)| {
            *pixel = Rgba([chunk[0], chunk[1], chunk[2], 255]);
        });

    img_buf.save(path).expect("Failed to create test image.");
}

/// 创建一张纯色、从未隐藏过数据的图像
fn create_plain_image(path: &Path, width: u32, height: u32) {
    ImageBuffer::from_pixel(width, height, Rgba([0u8, 0, 0, 255]))
        .save(path)
        .expect("Failed to create test image.");
}

fn hide_args(image: &Path, file: &Path, dest: Option<PathBuf>) -> HideArgs {
    HideArgs {
        image: image.to_path_buf(),
        file: file.to_path_buf(),
        dest,
        bits: 2,
        spacing: Spacing::Auto,
        offset: 0,
        mime_type: Some("text/plain".to_string()),
        force: false,
    }
}

fn recover_args(image: &Path, output: Option<PathBuf>) -> RecoverArgs {
    RecoverArgs {
        image: image.to_path_buf(),
        output,
        bits: 2,
        offset: 0,
        force: false,
    }
}

/// 验证从隐藏到恢复的完整流程
#[test]
fn test_handle_hide_and_recover_integration() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.png");
    let hidden_image_path = dir.path().join("hidden.png");
    let source_file_path = dir.path().join("source.txt");
    let recovered_file_path = dir.path().join("recovered.txt");

    create_test_image(&original_image_path, 100, 100);
    let original_text = "This is a test message for the handler! 这是一个给处理器的测试信息！";
    fs::write(&source_file_path, original_text)?;

    // 2. 测试 handle_hide
    handle_hide(hide_args(
        &original_image_path,
        &source_file_path,
        Some(hidden_image_path.clone()),
    ))?;
    assert!(
        hidden_image_path.exists(),
        "Hidden image should be created."
    );

    // 3. 测试 handle_recover
    handle_recover(recover_args(
        &hidden_image_path,
        Some(recovered_file_path.clone()),
    ))?;
    assert!(
        recovered_file_path.exists(),
        "Recovered file should be created."
    );

    // 4. 验证结果
    let recovered_text = fs::read_to_string(&recovered_file_path)?;
    assert_eq!(
        original_text, recovered_text,
        "Recovered text must match the original."
    );

    Ok(())
}

/// 验证当用户不提供输出路径时，是否能正确生成默认路径并完成操作
#[test]
fn test_handle_hide_and_recover_with_defaults() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.png");
    let source_file_path = dir.path().join("source.bin");

    create_test_image(&original_image_path, 100, 100);
    let original_bytes: Vec<u8> = (0..=255).collect();
    fs::write(&source_file_path, &original_bytes)?;

    // 2. 测试 handle_hide，不提供 dest 路径
    handle_hide(hide_args(&original_image_path, &source_file_path, None))?;

    // 验证默认的隐藏图像文件是否已创建
    let expected_hidden_path = dir.path().join("doctored_original.png");
    assert!(
        expected_hidden_path.exists(),
        "Default hidden image should be created at: {:?}",
        expected_hidden_path
    );

    // 3. 测试 handle_recover，不提供输出路径，文件名取自图像中隐藏的名称
    handle_recover(recover_args(&expected_hidden_path, None))?;

    let expected_recovered_path = dir.path().join("recovered_source.bin");
    assert!(
        expected_recovered_path.exists(),
        "Default recovered file should be created at: {:?}",
        expected_recovered_path
    );

    // 4. 验证结果
    let recovered_bytes = fs::read(&expected_recovered_path)?;
    assert_eq!(
        original_bytes, recovered_bytes,
        "Recovered bytes from default file must match the original."
    );

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let image_path = dir.path().join("image.png");
    let file_path = dir.path().join("text.txt");
    let dest_path = dir.path().join("dest.png");

    create_test_image(&image_path, 50, 50);
    fs::write(&file_path, "some text")?;

    // 2. 场景一：测试覆盖保护
    fs::write(&dest_path, "this is a dummy file to be overwritten")?;
    assert!(dest_path.exists());

    let result = handle_hide(hide_args(&image_path, &file_path, Some(dest_path.clone())));
    assert!(result.is_err(), "Execution should fail without --force when file exists.");
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }

    // 3. 场景二：测试强制覆盖
    let mut hide_args_with_force = hide_args(&image_path, &file_path, Some(dest_path.clone()));
    hide_args_with_force.force = true;

    let result = handle_hide(hide_args_with_force);
    assert!(result.is_ok(), "Execution should succeed with --force when file exists.");

    // 验证文件确实被覆盖（内容不再是 "this is a dummy file..."）
    let dummy_content = fs::read(&dest_path)?;
    assert_ne!(dummy_content, b"this is a dummy file to be overwritten");

    Ok(())
}

/// 验证空间不足时的错误处理
#[test]
fn test_handle_hide_not_enough_space() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let image_path = dir.path().join("small.png");
    let file_path = dir.path().join("large.txt");
    let dest_path = dir.path().join("dest.png");

    // 创建一个非常小的图片
    create_test_image(&image_path, 10, 10);
    // 创建一个非常大的文本
    let large_text = "a".repeat(5000);
    fs::write(&file_path, large_text)?;

    // 2. 执行并断言错误
    let result = handle_hide(hide_args(&image_path, &file_path, Some(dest_path.clone())));

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("Failed to hide"));
        assert!(format!("{e:#}").contains("Not enough space"));
    }
    assert!(!dest_path.exists(), "No image should be written on failure.");

    Ok(())
}

/// 验证固定步长与更高位深也能完整往返
#[test]
fn test_hide_and_recover_with_fixed_spacing() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("image.png");
    let hidden_path = dir.path().join("hidden.png");
    let file_path = dir.path().join("data.json");
    let recovered_path = dir.path().join("out.json");

    create_test_image(&image_path, 64, 64);
    fs::write(&file_path, r#"{"hello": "world"}"#)?;

    let mut args = hide_args(&image_path, &file_path, Some(hidden_path.clone()));
    args.bits = 4;
    args.spacing = Spacing::Fixed(5);
    args.offset = 7;
    args.mime_type = Some("application/json".to_string());
    handle_hide(args)?;

    let mut args = recover_args(&hidden_path, Some(recovered_path.clone()));
    args.bits = 4;
    args.offset = 7;
    handle_recover(args)?;

    assert_eq!(fs::read_to_string(&recovered_path)?, r#"{"hello": "world"}"#);

    Ok(())
}

/// 验证从未隐藏过数据的图像中恢复会失败，且不会写出任何文件
#[test]
fn test_recover_from_clean_image_fails() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("clean.png");
    let output_path = dir.path().join("out.bin");

    create_plain_image(&image_path, 40, 40);

    let result = handle_recover(recover_args(&image_path, Some(output_path.clone())));
    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("Failed to recover a hidden file"));
        assert!(format!("{e:#}").contains("No encoded data"));
    }
    assert!(!output_path.exists());

    Ok(())
}

/// 验证容量估算命令可以正常执行
#[test]
fn test_handle_capacity() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("image.png");
    let file_path = dir.path().join("file.txt");

    create_plain_image(&image_path, 32, 32);
    fs::write(&file_path, "short")?;

    handle_capacity(CapacityArgs {
        image: image_path.clone(),
        bits: 1,
        spacing: Spacing::Auto,
        offset: 0,
        file: Some(file_path),
        mime_type: None,
    })?;

    let result = handle_capacity(CapacityArgs {
        image: dir.path().join("missing.png"),
        bits: 1,
        spacing: Spacing::Fixed(2),
        offset: 0,
        file: None,
        mime_type: None,
    });
    assert!(result.is_err());

    Ok(())
}
