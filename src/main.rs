//! # FundLab 数据层运维入口
//!
//! 连接数据库、应用迁移并输出各实体的行数概况，
//! 用于部署后的连通性自检

use tracing::{error, info};

use fundlab_data::{init_logging, load_config, AppConfig, DataClient, Result};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("数据层自检失败: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // 配置文件缺失时回落到默认配置（内存库），便于本地快速验证
    let config = load_config().unwrap_or_else(|e| {
        eprintln!("加载配置失败，使用默认配置: {e}");
        AppConfig::default()
    });

    init_logging(&config.log, config.error_format);

    let client = DataClient::connect(&config).await?;
    fundlab_data::check_database_status(client.connection()).await?;

    info!("用户数: {}", client.users().count(None).await?);
    info!("文章数: {}", client.articles().count(None).await?);
    info!("动态数: {}", client.posts().count(None).await?);
    info!("评论数: {}", client.comments().count(None).await?);
    info!(
        "模拟账户数: {}",
        client.simulation_accounts().count(None).await?
    );

    client.disconnect().await?;
    info!("数据层自检完成");
    Ok(())
}
