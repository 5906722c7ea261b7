use thiserror::Error;

/// 内容哈希的十六进制长度
pub const HASH_HEX_LEN: usize = 64;

/// 记录行解析错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// 无法解析的记录行，跳过并计数，不中断加载
    #[error("无法解析的记录行: {0}")]
    MalformedLine(String),
}

/// 一条图片记录
///
/// 行格式为 `路径,关键词...,RANK n,哈希`，路径在行首，哈希在行尾，
/// RANK 字段和关键词字段之间的顺序不作要求。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 图片路径
    pub path: String,
    /// 描述关键词，保持存储顺序
    pub keywords: Vec<String>,
    /// 质量评分
    pub rank: u8,
    /// 图片内容哈希，作为去重时的唯一标识
    pub hash: String,
}

impl Record {
    /// 解析一行记录，各字段先去除首尾空白再校验
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let fields = line.split(',').map(str::trim).collect::<Vec<_>>();
        if fields.len() < 3 {
            return Err(ParseError::MalformedLine(format!("字段数不足: {line}")));
        }

        let path = fields[0];
        if path.is_empty() {
            return Err(ParseError::MalformedLine(format!("路径为空: {line}")));
        }

        let hash = fields[fields.len() - 1];
        if !is_hash_token(hash) {
            return Err(ParseError::MalformedLine(format!("行尾不是内容哈希: {line}")));
        }

        let mut rank = None;
        let mut keywords = Vec::new();
        for field in &fields[1..fields.len() - 1] {
            if let Some(value) = parse_rank_token(field) {
                if rank.replace(value?).is_some() {
                    return Err(ParseError::MalformedLine(format!("出现多个 RANK 字段: {line}")));
                }
            } else if !field.is_empty() {
                keywords.push((*field).to_string());
            }
        }
        let Some(rank) = rank else {
            return Err(ParseError::MalformedLine(format!("缺少 RANK 字段: {line}")));
        };

        Ok(Self { path: path.to_string(), keywords, rank, hash: hash.to_ascii_lowercase() })
    }

    /// 序列化为一行记录，与 [`Record::parse`] 互逆
    ///
    /// 行格式用逗号分隔字段，关键词里不允许出现逗号。
    pub fn to_line(&self) -> String {
        debug_assert!(
            self.keywords.iter().all(|kw| !kw.contains(',')),
            "关键词不能包含逗号: {:?}",
            self.keywords
        );
        let mut fields = Vec::with_capacity(self.keywords.len() + 3);
        fields.push(self.path.as_str());
        fields.extend(self.keywords.iter().map(String::as_str));
        let rank = format!("RANK {}", self.rank);
        fields.push(&rank);
        fields.push(&self.hash);
        fields.join(",")
    }
}

/// 把推理服务返回的自由文本解析为关键词列表和评分
///
/// 模型输出不可信，必须带着正文一起严格校验：关键词按逗号切分、去重
/// （大小写不敏感，保留首次出现的拼写）后按字典序排序；正文中必须出现
/// 一个 1~10 的 `RANK n` 字段，缺失或超出范围都按无效响应处理。
/// 模型偶尔会复述 RANK，只有第一个生效，后续所有形如 `RANK ...` 的
/// 字段（包括数值无效的）直接丢弃，不会混进关键词。
pub fn parse_description(text: &str) -> Result<(Vec<String>, u8), ParseError> {
    let mut rank = None;
    let mut keywords = Vec::new();
    for part in text.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some(value) = parse_rank_token(part) {
            if rank.is_none() {
                rank = Some(value?);
            }
            continue;
        }
        keywords.push(part);
    }

    match rank {
        Some(rank) if (1..=10).contains(&rank) => Ok((normalize_keywords(&keywords), rank)),
        Some(rank) => Err(ParseError::MalformedLine(format!("RANK 超出范围: {rank}"))),
        None => Err(ParseError::MalformedLine(format!("响应中没有 RANK 字段: {text}"))),
    }
}

/// 关键词规范化：大小写不敏感地去重，保留首次出现的拼写，再按字典序排序
fn normalize_keywords(parts: &[&str]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut cleaned = Vec::with_capacity(parts.len());
    for part in parts {
        if seen.insert(part.to_lowercase()) {
            cleaned.push((*part).to_string());
        }
    }
    cleaned.sort_by_key(|kw| kw.to_lowercase());
    cleaned
}

/// 匹配 `RANK <整数>` 字段：`RANK` 区分大小写，后接单个空格和整数。
/// 形如 RANK 但数值无法解析的字段视为格式错误而不是关键词。
fn parse_rank_token(field: &str) -> Option<Result<u8, ParseError>> {
    let value = field.strip_prefix("RANK ")?;
    Some(
        value
            .parse::<u8>()
            .map_err(|_| ParseError::MalformedLine(format!("无效的 RANK 值: {field}"))),
    )
}

fn is_hash_token(field: &str) -> bool {
    field.len() == HASH_HEX_LEN && field.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn hash_of(seed: &[u8]) -> String {
        crate::hash::hash_bytes(seed)
    }

    #[test]
    fn parse_example_line() {
        let hash = hash_of(b"a");
        let line = format!("/img/a.png,cat,mat,RANK 7,{hash}");
        let record = Record::parse(&line).unwrap();
        assert_eq!(record.path, "/img/a.png");
        assert_eq!(record.keywords, ["cat", "mat"]);
        assert_eq!(record.rank, 7);
        assert_eq!(record.hash, hash);
    }

    #[test]
    fn round_trip() {
        let record = Record {
            path: "/img/b.png".to_string(),
            keywords: vec!["Sunset".to_string(), "beach".to_string(), "photo".to_string()],
            rank: 9,
            hash: hash_of(b"b"),
        };
        assert_eq!(Record::parse(&record.to_line()).unwrap(), record);
    }

    #[test]
    fn rank_position_is_order_independent() {
        let hash = hash_of(b"c");
        let record = Record::parse(&format!("/img/c.png,RANK 3,cat,mat,{hash}")).unwrap();
        assert_eq!(record.rank, 3);
        assert_eq!(record.keywords, ["cat", "mat"]);
    }

    #[test]
    fn fields_are_trimmed_and_hash_lowercased() {
        let hash = hash_of(b"d").to_ascii_uppercase();
        let record = Record::parse(&format!(" /img/d.png , cat ,  RANK 5 , {hash} ")).unwrap();
        assert_eq!(record.path, "/img/d.png");
        assert_eq!(record.keywords, ["cat"]);
        assert_eq!(record.hash, hash.to_ascii_lowercase());
    }

    #[rstest]
    #[case::too_few_fields("/img/a.png,cat")]
    #[case::no_rank("/img/a.png,cat,0000000000000000000000000000000000000000000000000000000000000000")]
    #[case::rank_not_integer("/img/a.png,RANK x,0000000000000000000000000000000000000000000000000000000000000000")]
    #[case::rank_lowercase("/img/a.png,rank 7,0000000000000000000000000000000000000000000000000000000000000000")]
    #[case::duplicate_rank("/img/a.png,RANK 7,RANK 8,0000000000000000000000000000000000000000000000000000000000000000")]
    #[case::hash_too_short("/img/a.png,cat,RANK 7,abcd1234")]
    #[case::hash_not_hex("/img/a.png,cat,RANK 7,zzzz000000000000000000000000000000000000000000000000000000000000")]
    #[case::empty_path(",cat,RANK 7,0000000000000000000000000000000000000000000000000000000000000000")]
    fn malformed_lines(#[case] line: &str) {
        assert!(matches!(Record::parse(line), Err(ParseError::MalformedLine(_))));
    }

    #[test]
    #[should_panic(expected = "关键词不能包含逗号")]
    fn serializing_comma_keyword_is_rejected() {
        let record = Record {
            path: "/img/a.png".to_string(),
            keywords: vec!["cat, mat".to_string()],
            rank: 7,
            hash: hash_of(b"a"),
        };
        let _ = record.to_line();
    }

    #[test]
    fn later_rank_tokens_are_dropped() {
        let (keywords, rank) = parse_description("cat, RANK 7, RANK banana, dog").unwrap();
        assert_eq!(keywords, ["cat", "dog"]);
        assert_eq!(rank, 7);
    }

    #[test]
    fn description_is_normalized() {
        let (keywords, rank) =
            parse_description("Sunset, beach, RANK 8, Beach, ocean , photo").unwrap();
        assert_eq!(keywords, ["beach", "ocean", "photo", "Sunset"]);
        assert_eq!(rank, 8);
    }

    #[rstest]
    #[case::no_rank("cat, mat, photo")]
    #[case::rank_zero("cat, RANK 0, photo")]
    #[case::rank_too_big("cat, RANK 11, photo")]
    #[case::rank_not_integer("cat, RANK nine, photo")]
    #[case::empty("")]
    fn bad_descriptions(#[case] text: &str) {
        assert!(parse_description(text).is_err());
    }
}
