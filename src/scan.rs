use std::path::{Path, PathBuf};

use log::warn;
use regex::Regex;
use walkdir::WalkDir;

/// 支持的图片扩展名，大小写不敏感
pub const IMAGE_EXTS: &str = "jpg,jpeg,png,gif,webp,bmp,tif,tiff";

fn ext_regex() -> Regex {
    Regex::new(&format!("(?i)^({})$", IMAGE_EXTS.replace(',', "|"))).expect("failed to build regex")
}

/// 展开参数列表里的图片
///
/// 存在的文件按扩展名过滤，目录递归扫描，不存在的参数按 `*` 通配符
/// 展开后再扫描。返回排序去重后的绝对路径，保证多次运行顺序一致。
pub fn find_images(args: &[String]) -> Vec<PathBuf> {
    let re = ext_regex();
    let mut found = Vec::new();
    for arg in args {
        let path = Path::new(arg);
        if path.exists() {
            scan_path(path, &re, &mut found);
        } else {
            for path in expand_glob(arg) {
                scan_path(&path, &re, &mut found);
            }
        }
    }

    let mut found =
        found.into_iter().filter_map(|p| std::path::absolute(p).ok()).collect::<Vec<_>>();
    found.sort();
    found.dedup();
    found
}

fn scan_path(path: &Path, re: &Regex, found: &mut Vec<PathBuf>) {
    if path.is_file() {
        if is_image(path, re) {
            found.push(path.to_path_buf());
        }
        return;
    }
    for entry in WalkDir::new(path) {
        match entry {
            Ok(entry) => {
                let entry = entry.into_path();
                if entry.is_file() && is_image(&entry, re) {
                    found.push(entry);
                }
            }
            Err(e) => warn!("跳过无法读取的条目: {e}"),
        }
    }
}

fn is_image(path: &Path, re: &Regex) -> bool {
    path.extension().map(|ext| re.is_match(&ext.to_string_lossy())) == Some(true)
}

/// 展开路径最后一段中的 `*` 通配符
///
/// 只支持文件名部分的 `*`，更复杂的模式交给 shell。没有通配符或
/// 目录不可读时返回空列表。
pub fn expand_glob(pattern: &str) -> Vec<PathBuf> {
    let path = Path::new(pattern);
    let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
        return vec![];
    };
    if !name.contains('*') {
        return vec![];
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let re = Regex::new(&format!("(?i)^{}$", regex::escape(&name).replace(r"\*", ".*")))
        .expect("failed to build regex");

    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("无法读取目录 {}: {e}", dir.display());
            return vec![];
        }
    };
    let mut matches = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.file_name().map(|n| re.is_match(&n.to_string_lossy())) == Some(true))
        .collect::<Vec<_>>();
    matches.sort();
    matches
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn touch(path: &Path) {
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn scans_directories_recursively_with_allowed_exts() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("sub"))?;
        touch(&dir.path().join("a.png"));
        touch(&dir.path().join("b.JPG"));
        touch(&dir.path().join("sub/c.webp"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("noext"));

        let found = find_images(&[dir.path().to_string_lossy().to_string()]);
        let names = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, ["a.png", "b.JPG", "c.webp"]);
        Ok(())
    }

    #[test]
    fn repeated_args_are_deduplicated() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let img = dir.path().join("a.png");
        touch(&img);

        let arg = img.to_string_lossy().to_string();
        let found = find_images(&[arg.clone(), arg]);
        assert_eq!(found.len(), 1);
        Ok(())
    }

    #[test]
    fn glob_expands_star_in_file_name() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        touch(&dir.path().join("a.png"));
        touch(&dir.path().join("b.png"));
        touch(&dir.path().join("c.gif"));

        let pattern = dir.path().join("*.png").to_string_lossy().to_string();
        let found = find_images(&[pattern]);
        assert_eq!(found.len(), 2);
        Ok(())
    }

    #[test]
    fn missing_path_without_glob_finds_nothing() {
        let found = find_images(&["/no/such/dir".to_string()]);
        assert!(found.is_empty());
    }
}
