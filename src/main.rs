use std::{fs::create_dir, time::Duration};

use axum::{extract::DefaultBodyLimit, http::Method, Router};
use crm_lite::{database::get_db, libs::cache::clear_cache, log, CONFIG};
use tower_http::cors::{Any, CorsLayer};
#[tokio::main]
async fn main() {
    _create_all_dir().unwrap();

    // 启动就读档，坏档直接失败而不是带着空数据跑
    {
        let db = get_db();
        let db = db.lock().await;
        log!("已载入{}位客户", db.customers().len());
    }
    let router = Router::new()
        .merge(crm_lite::pages::pages_router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_headers(Any),
        )
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024));
    std::thread::spawn(|| { // 定时任务，每过10分钟清空所有缓存
        tokio::runtime::Runtime::new().unwrap().block_on(async {
            let mut interval = tokio::time::interval(Duration::from_secs(600));
            loop {
                interval.tick().await;
                clear_cache();
            }
        })
    });
    axum::serve(
        tokio::net::TcpListener::bind(format!("0.0.0.0:{}", CONFIG.port()))
            .await
            .unwrap(),
        router,
    )
    .await
    .unwrap()
}
fn _create_all_dir() -> std::io::Result<()> {
    _create_dir("config")?;
    _create_dir("data")?;
    Ok(())
}
fn _create_dir(path: &str) -> std::io::Result<()> {
    match create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) => match e.kind() {
            std::io::ErrorKind::AlreadyExists => Ok(()),
            _ => Err(e),
        },
    }
}
