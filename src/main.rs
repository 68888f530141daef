// ==========================================
// 游泳比赛编组系统 - 命令行主入口
// ==========================================

use anyhow::Result;
use clap::Parser;

use swim_meet::cli::{self, Cli};
use swim_meet::logging;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::debug!("{} {}", swim_meet::APP_NAME, swim_meet::VERSION);
    cli::run(cli)
}
