use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chess_server::{ChessServer, MemoryAuthService, MemoryGameStore, ServerContext};
use protocol::{Color, NetworkConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chess_server=debug".parse()?),
        )
        .init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| NetworkConfig::default().addr());

    info!("国际象棋服务端启动中...");

    let auth = Arc::new(MemoryAuthService::new());
    let store = Arc::new(MemoryGameStore::new());

    // 演示用对局和令牌
    auth.issue("white-token", "白方玩家").await;
    auth.issue("black-token", "黑方玩家").await;
    let game_id = store.create("对局一").await;
    store.claim_seat(game_id, Color::White, "白方玩家").await?;
    store.claim_seat(game_id, Color::Black, "黑方玩家").await?;
    info!("演示对局已创建: game_id={}", game_id);

    let ctx = Arc::new(ServerContext::new(auth, store));
    let server = ChessServer::bind(ctx, &addr).await?;
    server.serve().await?;

    Ok(())
}
