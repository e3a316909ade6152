//! 日誌初始化

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日誌系統
///
/// 日誌級別由 `RUST_LOG` 控制，預設為 `info`，
/// 例如 `RUST_LOG=mrp_schedule=debug`。日誌寫到標準錯誤，
/// 標準輸出只留給報表。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

/// 測試用日誌（debug 級別，輸出到測試擷取器）
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
