use anyhow::Context;
use tokio::net::TcpListener;

use tripbook::backend::{self, BackendState};
use tripbook::config::Config;
use tripbook::controller::FlightController;
use tripbook::logging;

/// 启动开发用后端: 内存中的航班与预订数据
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置
    let config = Config::load().context("failed to load config")?;
    let _log_guard = logging::init(&config.logging, "server");
    config.log_source();

    // 初始化航班控制器并添加示例航班
    let controller = FlightController::with_sample_data();
    let state = BackendState::new(controller).with_faults(&config.server);

    let listener = TcpListener::bind(&config.server.address)
        .await
        .with_context(|| format!("failed to bind {}", config.server.address))?;
    if config.server.failure_rate > 0.0 || config.server.latency_ms > 0 {
        tracing::info!(
            latency_ms = config.server.latency_ms,
            failure_rate = config.server.failure_rate,
            "Fault injection enabled"
        );
    }

    backend::serve(listener, state).await?;
    Ok(())
}
