//! 日志初始化

use tracing::Level;

/// 安装 fmt 订阅器；已安装时忽略
///
/// # 返回
/// 本次调用是否安装成功
pub fn init(level: Level) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .is_ok()
}

/// 解析日志级别名（`trace` / `debug` / `info` / `warn` / `error`，不区分大小写）
pub fn parse_level(name: &str) -> Option<Level> {
    name.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_ignored() {
        init(Level::DEBUG);
        assert!(!init(Level::INFO));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("warn"), Some(Level::WARN));
        assert_eq!(parse_level(" INFO "), Some(Level::INFO));
        assert_eq!(parse_level("loud"), None);
    }
}
