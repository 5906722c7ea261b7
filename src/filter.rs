use std::collections::HashSet;

use crate::record::Record;
use crate::store::RecordStore;

/// 评分比较方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOp {
    /// 不低于
    AtLeast,
    /// 等于
    Exactly,
}

/// 评分过滤条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankFilter {
    pub op: RankOp,
    pub value: u8,
}

impl RankFilter {
    fn matches(&self, rank: u8) -> bool {
        match self.op {
            RankOp::AtLeast => rank >= self.value,
            RankOp::Exactly => rank == self.value,
        }
    }
}

/// 一次过滤查询，构造后不可变，求值后即丢弃
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterQuery {
    /// 小写化后的关键词，记录必须包含全部关键词才算匹配
    pub keywords: Vec<String>,
    /// 可选的评分约束
    pub rank: Option<RankFilter>,
    /// 是否启用子串匹配
    pub partial: bool,
}

impl FilterQuery {
    /// 解析用户输入的过滤表达式
    ///
    /// 表达式按逗号切分，`rank>=N` 和 `rank=N` 是评分约束，`RANK N`
    /// 等价于 `rank>=N`（沿用查看器里"最低评分"的含义），其余字段都是
    /// 关键词。数值无法解析的评分字段按普通关键词处理。空表达式匹配
    /// 全部记录。
    pub fn parse(expr: &str, partial: bool) -> Self {
        let mut keywords = Vec::new();
        let mut rank = None;
        for term in expr.split(',') {
            let term = term.trim();
            if term.is_empty() {
                continue;
            }
            if let Some(filter) = parse_rank_term(term) {
                rank.get_or_insert(filter);
                continue;
            }
            let term = term.to_lowercase();
            if !keywords.contains(&term) {
                keywords.push(term);
            }
        }
        Self { keywords, rank, partial }
    }
}

fn parse_rank_term(term: &str) -> Option<RankFilter> {
    let lower = term.to_lowercase();
    let (op, value) = if let Some(value) = lower.strip_prefix("rank>=") {
        (RankOp::AtLeast, value)
    } else if let Some(value) = lower.strip_prefix("rank=") {
        (RankOp::Exactly, value)
    } else if let Some(value) = lower.strip_prefix("rank ") {
        (RankOp::AtLeast, value)
    } else {
        return None;
    };
    value.trim().parse().ok().map(|value| RankFilter { op, value })
}

/// 对集合中的全部记录求值，返回匹配记录的只读引用
///
/// 结果顺序就是集合的遍历顺序（插入顺序），不做额外排序。
pub fn evaluate<'a>(store: &'a RecordStore, query: &FilterQuery) -> Vec<&'a Record> {
    store.all().filter(|record| matches(record, query)).collect()
}

fn matches(record: &Record, query: &FilterQuery) -> bool {
    if let Some(rank) = &query.rank {
        if !rank.matches(record.rank) {
            return false;
        }
    }
    if query.keywords.is_empty() {
        return true;
    }
    if query.partial {
        // 子串匹配沿用原查看器的语义：任一过滤词出现在任一关键词里即可
        return query
            .keywords
            .iter()
            .any(|k| record.keywords.iter().any(|kw| kw.to_lowercase().contains(k)));
    }
    // 精确匹配要求整词相等，"art" 不匹配 "artist"
    let tokens = record.keywords.iter().map(|kw| kw.to_lowercase()).collect::<HashSet<_>>();
    query.keywords.iter().all(|k| tokens.contains(k))
}
