// ==========================================
// 门店拜访调度系统 - 手动周期触发
// ==========================================
// 与 HTTP 入口等价的命令行触发,便于调试与补跑:
//   run_cycle <morning|evening> [YYYY-MM-DD]
// 输出: CycleOutcome JSON 到标准输出
// 退出码: 0 周期完成 (含部分失败),1 致命条件/参数错误
// ==========================================

use anyhow::{bail, Context};
use chrono::{NaiveDate, Utc};
use store_visit_aps::app::{get_default_db_path, AppState};
use store_visit_aps::domain::types::CycleType;
use store_visit_aps::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().collect();

    let cycle_type = match args.get(1).map(String::as_str) {
        Some("morning") => CycleType::Morning,
        Some("evening") => CycleType::Evening,
        _ => {
            eprintln!("用法: run_cycle <morning|evening> [YYYY-MM-DD]");
            bail!("缺少或非法的周期类型参数");
        }
    };

    let target_date = match args.get(2) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("非法日期参数: {}", raw))?,
        None => Utc::now().date_naive(),
    };

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let app_state = AppState::new(db_path)
        .map_err(|e| anyhow::anyhow!(e))
        .context("无法初始化AppState")?;

    let orchestrator = app_state
        .build_orchestrator()
        .map_err(|e| anyhow::anyhow!(e))
        .context("无法组装周期编排引擎")?;

    let outcome = orchestrator
        .run_cycle(cycle_type, target_date)
        .await
        .context("周期执行失败")?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(())
}
