use std::io::Write;

use indicatif::ProgressStyle;

/// 批处理进度条样式
pub fn pb_style() -> ProgressStyle {
    ProgressStyle::with_template("{wide_bar} {pos}/{len} [{elapsed_precise}<{eta_precise}] {msg}")
        .expect("failed to build progress style")
}

/// 打印提示符并从标准输入读取一行，EOF 返回 None
pub fn read_line(prompt: &str) -> anyhow::Result<Option<String>> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut buf = String::new();
    if std::io::stdin().read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim().to_owned()))
}
