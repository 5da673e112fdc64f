//! # Error 模块
//!
//! 定义 motion-runtime 中使用的错误类型。
//!
//! 这一层的错误都不面向最终用户：调用方捕获后记录日志，
//! 对应区域降级为"无动画"的静态可见状态。

use thiserror::Error;

use crate::dom::NodeId;

/// 动效引擎错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    /// 选择器没有匹配到任何节点
    #[error("选择器 '{selector}' 未匹配到任何节点")]
    ElementNotFound { selector: String },

    /// 节点已从文档中移除
    #[error("节点 {node} 已脱离文档")]
    NodeDetached { node: NodeId },

    /// 节点没有可拆分的文本
    #[error("节点 {node} 没有文本内容")]
    EmptyText { node: NodeId },

    /// 节点仍持有拆分包装节点，未先 revert
    #[error("节点 {node} 已被拆分，必须先 revert")]
    AlreadySplit { node: NodeId },

    /// 平滑滚动尚未初始化
    #[error("平滑滚动引擎尚未初始化")]
    EngineNotInitialized,

    /// 无效的选择器
    #[error("无效的选择器 '{selector}' - {message}")]
    InvalidSelector { selector: String, message: String },

    /// 无效的触发阈值
    #[error("无效的触发阈值 '{input}' - {message}")]
    InvalidThreshold { input: String, message: String },

    /// 无效的 toggle actions
    #[error("无效的 toggle actions '{input}'")]
    InvalidToggleActions { input: String },

    /// 未知缓动函数名
    #[error("未知缓动函数 '{name}'")]
    UnknownEasing { name: String },
}

/// Result 类型别名
pub type MotionResult<T> = Result<T, MotionError>;

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),

    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    IoError(String),

    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}
