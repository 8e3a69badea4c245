//! Anoa - 事实核验故事与带货素材生成服务
//!
//! - Domain: story/, affiliate/, audio (Bounded Contexts)
//! - Application: commands, queries, ports, batch
//! - Infrastructure: http, memory, adapters, events

use std::sync::Arc;
use std::time::Duration;

use anoa::application::ports::{GenerationGatewayPort, SessionStorePort};
use anoa::config::{load_config, print_config};
use anoa::infrastructure::adapters::gemini::{
    FakeGeminiClient, GeminiClientConfig, HttpGeminiClient,
};
use anoa::infrastructure::events::EventPublisher;
use anoa::infrastructure::http::{AppState, HttpServer, ServerConfig};
use anoa::infrastructure::memory::InMemorySessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},anoa={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Anoa - 事实核验故事与带货素材生成服务");
    print_config(&config);

    // 创建生成端（fake 用于离线联调）
    let gateway: Arc<dyn GenerationGatewayPort> = if config.gemini.use_fake {
        tracing::warn!("Using fake generation gateway, no external calls will be made");
        Arc::new(FakeGeminiClient::new(config.audio.default_sample_rate))
    } else {
        let gemini_config = GeminiClientConfig {
            base_url: config.gemini.base_url.clone(),
            api_key: config.gemini.api_key.clone(),
            text_model: config.gemini.text_model.clone(),
            image_model: config.gemini.image_model.clone(),
            tts_model: config.gemini.tts_model.clone(),
            timeout_secs: config.gemini.timeout_secs,
            max_retries: config.gemini.max_retries,
            default_sample_rate: config.audio.default_sample_rate,
        };
        Arc::new(HttpGeminiClient::new(gemini_config).map_err(|e| anyhow::anyhow!("{}", e))?)
    };

    // 创建会话产物仓库与事件发布器
    let sessions: Arc<InMemorySessionStore> =
        InMemorySessionStore::new(config.audio.default_voice.clone()).arc();
    let event_publisher = EventPublisher::new().arc();

    // 后台过期会话清理
    let sweep_sessions: Arc<dyn SessionStorePort> = sessions.clone();
    let sweep_publisher = event_publisher.clone();
    let expire_secs = config.session.expire_secs;
    let sweep_interval = Duration::from_secs(config.session.sweep_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        loop {
            ticker.tick().await;
            for session_id in sweep_sessions.expired_sessions(expire_secs) {
                sweep_publisher.publish_session_closed(&session_id, "expired");
                if sweep_sessions.close(&session_id).is_ok() {
                    sweep_publisher.unregister_session(&session_id);
                    tracing::info!(session_id = %session_id, "Idle session expired");
                }
            }
        }
    });

    // 创建 HTTP 服务器
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        max_body_bytes: config.server.max_body_bytes,
    };
    let state = AppState::new(sessions, gateway, event_publisher);
    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
