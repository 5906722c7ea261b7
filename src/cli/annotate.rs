use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, bail};
use futures::StreamExt;
use indicatif::ProgressBar;
use log::{info, warn};
use tokio::sync::mpsc::{Sender, channel};
use tokio::task::JoinHandle;

use crate::cli::CommandExtend;
use crate::config::Opts;
use crate::hash::{self, HashError};
use crate::ollama::{InferenceError, OllamaClient};
use crate::record::{self, Record};
use crate::scan;
use crate::utils::pb_style;

/// 批量标注：对每张图片计算内容哈希并请求推理服务，向标准输出逐行
/// 写出记录。单张图片失败只记 warning，不影响其余图片。
#[derive(Debug, Clone)]
pub struct AnnotateCommand {
    /// 待扫描的图片、目录或通配符参数
    pub paths: Vec<String>,
}

impl CommandExtend for AnnotateCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let images = scan::find_images(&self.paths);
        if images.is_empty() {
            bail!("没有找到匹配的图片");
        }
        info!("扫描完成，共 {} 张图片", images.len());

        let client = Arc::new(OllamaClient::new(&opts.ollama)?);
        let jobs = opts.jobs.max(1);
        let pb = ProgressBar::new(images.len() as u64).with_style(pb_style());

        // 记录行经由通道汇聚到单个写出任务，并发时也保证整行输出
        let (line_tx, mut line_rx) = channel::<String>(jobs * 2);
        let writer: JoinHandle<()> = tokio::spawn(async move {
            while let Some(line) = line_rx.recv().await {
                println!("{line}");
            }
        });

        let mut annotated = 0;
        {
            let futs: Vec<_> = images
                .iter()
                .map(|path| annotate_one(client.clone(), path, line_tx.clone(), pb.clone()))
                .collect();
            let mut results = futures::stream::iter(futs).buffer_unordered(jobs);
            while let Some(ok) = results.next().await {
                if ok {
                    annotated += 1;
                }
                pb.inc(1);
            }
        }
        drop(line_tx);
        writer.await?;
        pb.finish_and_clear();

        let failed = images.len() - annotated;
        info!("标注完成: 成功 {annotated}，失败 {failed}");
        if annotated == 0 {
            bail!("没有图片标注成功");
        }
        Ok(())
    }
}

async fn annotate_one(
    client: Arc<OllamaClient>,
    path: &Path,
    line_tx: Sender<String>,
    pb: ProgressBar,
) -> bool {
    pb.set_message(path.display().to_string());
    match process_image(&client, path).await {
        Ok(record) => line_tx.send(record.to_line()).await.is_ok(),
        Err(e) => {
            warn!("跳过 {}: {e}", path.display());
            false
        }
    }
}

/// 处理单张图片：读取、哈希、请求推理、校验响应
async fn process_image(client: &OllamaClient, path: &Path) -> Result<Record> {
    let data = tokio::fs::read(path).await.map_err(HashError::IoFailure)?;
    let hash = hash::hash_bytes(&data);

    let text = client.describe(&data).await?;
    let (keywords, rank) = record::parse_description(&text)
        .map_err(|e| InferenceError::BadResponse(e.to_string()))?;

    Ok(Record { path: path.display().to_string(), keywords, rank, hash })
}
