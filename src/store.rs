use std::collections::HashSet;
use std::ops::AddAssign;
use std::path::Path;

use log::warn;

use crate::record::{ParseError, Record};

/// 单条记录的插入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestResult {
    Added,
    Duplicate,
}

/// 批量加载的统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    /// 新增的记录数
    pub added: usize,
    /// 因哈希重复被丢弃的记录数
    pub duplicates: usize,
    /// 无法解析而跳过的行数
    pub malformed: usize,
}

impl AddAssign for IngestSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.added += rhs.added;
        self.duplicates += rhs.duplicates;
        self.malformed += rhs.malformed;
    }
}

/// 以内容哈希去重的记录集合
///
/// 加载完成后只读，过滤只产生借用，不修改集合本身。
/// 不变量：`len() + duplicates()` 等于成功解析并插入的记录总数。
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    seen: HashSet<String>,
    duplicates: usize,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入一条记录
    ///
    /// 哈希已存在时丢弃新记录并计数，保留先插入的那条。
    pub fn ingest(&mut self, record: Record) -> IngestResult {
        if self.seen.contains(&record.hash) {
            self.duplicates += 1;
            return IngestResult::Duplicate;
        }
        self.seen.insert(record.hash.clone());
        self.records.push(record);
        IngestResult::Added
    }

    /// 逐行解析并插入，空行忽略，无法解析的行跳过并计数
    pub fn load_lines<'a>(&mut self, lines: impl IntoIterator<Item = &'a str>) -> IngestSummary {
        let mut summary = IngestSummary::default();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            match Record::parse(line) {
                Ok(record) => match self.ingest(record) {
                    IngestResult::Added => summary.added += 1,
                    IngestResult::Duplicate => summary.duplicates += 1,
                },
                Err(ParseError::MalformedLine(reason)) => {
                    warn!("跳过无法解析的行: {reason}");
                    summary.malformed += 1;
                }
            }
        }
        summary
    }

    /// 加载一个记录文件
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> std::io::Result<IngestSummary> {
        let content = std::fs::read_to_string(path)?;
        Ok(self.load_lines(content.lines()))
    }

    /// 按插入顺序遍历所有记录，可以反复调用
    pub fn all(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 因哈希重复被丢弃的记录总数
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}
