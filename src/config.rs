use clap::Parser;

/// 默认的 Ollama 服务地址
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// 默认的视觉模型
pub const DEFAULT_MODEL: &str = "gemma3:12b";

/// 默认的提示词，要求模型返回逗号分隔的关键词和一个 RANK 评分
pub const DEFAULT_PROMPT: &str = "Provide just a comma-separated list of keywords that someone searching for this image, \
or one with a similar visual or emotional tone, might use to find it, including dominant colors and themes, with no comments. \
As a single keyword, one time, display the word RANK and how good the image is, on a scale from 1 to 10, such as 'RANK 4'. \
As the final keyword, specify the high-level type of the image, such as photo, drawing, receipt or whatever it is.";

#[derive(Parser, Debug, Clone)]
pub struct OllamaOptions {
    /// Ollama 服务地址
    #[arg(long, value_name = "URL", default_value = DEFAULT_OLLAMA_URL)]
    pub ollama_url: String,
    /// 使用的视觉模型
    #[arg(short, long, value_name = "MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,
    /// 发送给模型的提示词
    #[arg(long, value_name = "PROMPT", default_value = DEFAULT_PROMPT, hide_default_value = true)]
    pub prompt: String,
    /// 单次推理请求的超时时间（秒）
    #[arg(long, value_name = "SECONDS", default_value_t = 15)]
    pub timeout: u64,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "autoky", version)]
pub struct Opts {
    /// 图片、目录、通配符参数进入标注模式，*.txt 记录文件进入查看模式
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<String>,
    #[command(flatten)]
    pub ollama: OllamaOptions,
    /// 标注模式下并发处理的图片数量
    #[arg(short, long, value_name = "N", default_value_t = 1)]
    pub jobs: usize,
    /// 查看模式下启用关键词子串匹配
    #[arg(long)]
    pub partial: bool,
    /// 查看模式下执行一次过滤并输出结果，不进入交互
    #[arg(short, long, value_name = "EXPR")]
    pub filter: Option<String>,
}
