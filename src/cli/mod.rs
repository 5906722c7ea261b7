mod annotate;
mod view;

pub use annotate::*;
pub use view::*;

use crate::config::Opts;

pub trait CommandExtend {
    fn run(&self, opts: &Opts) -> impl std::future::Future<Output = anyhow::Result<()>> + Send;
}
