use std::io;
use std::path::Path;

use thiserror::Error;

/// 哈希计算错误
#[derive(Debug, Error)]
pub enum HashError {
    /// 读取文件失败，没有哈希的图片无法生成记录
    #[error("读取文件失败: {0}")]
    IoFailure(#[from] io::Error),
}

/// 计算字节内容的 blake3 哈希，返回 64 位小写十六进制
pub fn hash_bytes(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// 计算文件内容的哈希
pub fn hash_file(path: impl AsRef<Path>) -> Result<String, HashError> {
    let data = std::fs::read(path)?;
    Ok(hash_bytes(&data))
}
