use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use log::info;
use tokio::task::block_in_place;

use crate::cli::CommandExtend;
use crate::config::Opts;
use crate::filter::{self, FilterQuery};
use crate::store::{IngestSummary, RecordStore};
use crate::utils::read_line;

/// 查看模式：加载记录文件后按关键词和评分过滤浏览
///
/// 给出 `--filter` 时执行一次过滤并退出，否则进入交互循环。
#[derive(Debug, Clone)]
pub struct ViewCommand {
    /// 记录文件，按参数顺序加载
    pub files: Vec<PathBuf>,
}

impl CommandExtend for ViewCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let mut store = RecordStore::new();
        let mut summary = IngestSummary::default();
        for file in &self.files {
            info!("加载记录文件: {}", file.display());
            summary += store
                .load_file(file)
                .with_context(|| format!("读取记录文件失败: {}", file.display()))?;
        }
        info!(
            "加载完成: 新增 {}，重复 {}，无法解析 {}",
            summary.added, summary.duplicates, summary.malformed
        );
        if store.is_empty() {
            bail!("记录文件中没有任何图片数据");
        }

        if let Some(expr) = &opts.filter {
            print_result(&store, &FilterQuery::parse(expr, opts.partial));
            return Ok(());
        }

        // 交互循环：空行显示全部，q 退出
        loop {
            let Some(input) = block_in_place(|| read_line("filter> "))? else {
                break;
            };
            if input == "q" || input == "quit" {
                break;
            }
            print_result(&store, &FilterQuery::parse(&input, opts.partial));
        }
        Ok(())
    }
}

fn print_result(store: &RecordStore, query: &FilterQuery) {
    let result = filter::evaluate(store, query);
    for record in &result {
        println!("{}\t{}\t{}", record.rank, record.path, record.keywords.join(", "));
    }
    println!("{} / {} 张图片匹配，去重丢弃 {} 条", result.len(), store.len(), store.duplicates());
}
