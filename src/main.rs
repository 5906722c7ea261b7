use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::debug;

use autoky::cli::{AnnotateCommand, CommandExtend, ViewCommand};
use autoky::config::Opts;
use autoky::scan;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let opts = Opts::parse();
    match classify(&opts.paths) {
        Mode::View(files) => {
            debug!("进入查看模式，共 {} 个记录文件", files.len());
            ViewCommand { files }.run(&opts).await
        }
        Mode::Annotate(paths) => {
            debug!("进入标注模式");
            AnnotateCommand { paths }.run(&opts).await
        }
    }
}

enum Mode {
    Annotate(Vec<String>),
    View(Vec<PathBuf>),
}

/// 根据参数类型推断运行模式
///
/// 全部参数都解析为 txt 记录文件时进入查看模式，出现任何其他参数则
/// 整次调用进入标注模式。
fn classify(args: &[String]) -> Mode {
    let mut txt_files = Vec::new();
    let mut other = false;
    for arg in args {
        let path = PathBuf::from(arg);
        if arg.ends_with("*.txt") {
            txt_files.extend(scan::expand_glob(arg));
        } else if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
            && path.is_file()
        {
            txt_files.push(path);
        } else {
            other = true;
        }
    }
    if !txt_files.is_empty() && !other {
        Mode::View(txt_files)
    } else {
        Mode::Annotate(args.to_vec())
    }
}
