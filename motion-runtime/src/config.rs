//! # Config 模块
//!
//! 引擎配置，集中管理断点、选择器、触发阈值与各组件参数。
//!
//! ## 配置优先级
//!
//! 1. 配置文件（JSON）
//! 2. 默认值（缺省字段逐项回退）

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cursor::CursorConfig;
use crate::dom::Selector;
use crate::error::ConfigError;
use crate::frame::FrameConfig;
use crate::logging;
use crate::pointer_fx::PointerFxConfig;
use crate::scroll::ScrollConfig;
use crate::trigger::{Threshold, ToggleActions};

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 视口宽度断点
    #[serde(default)]
    pub breakpoints: Breakpoints,

    /// 平滑滚动配置
    #[serde(default)]
    pub scroll: ScrollConfig,

    /// 光标配置
    #[serde(default)]
    pub cursor: CursorConfig,

    /// 磁吸 / 倾斜 / 悬停放大的元素选择器
    #[serde(default)]
    pub pointer_fx: PointerFxConfig,

    /// 滚动触发配置
    #[serde(default)]
    pub triggers: TriggerConfig,

    /// 文字效果的目标选择器
    #[serde(default)]
    pub text: TextFxConfig,

    /// 页面过渡配置
    #[serde(default)]
    pub transitions: TransitionConfig,

    /// 帧驱动配置
    #[serde(default)]
    pub frame: FrameConfig,

    /// 日志级别
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// 视口宽度断点（像素）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakpoints {
    /// 宽于此值启用平滑滚动与自定义光标
    #[serde(default = "default_desktop")]
    pub desktop: f32,

    /// 窄于此值不拆分段落与标题
    #[serde(default = "default_split_text")]
    pub split_text: f32,
}

/// 滚动触发配置
///
/// 阈值格式见 [`Threshold`]，动作格式见 [`ToggleActions`]。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// 通用效果的起始阈值
    #[serde(default = "default_start")]
    pub start: String,

    /// 通用效果的结束阈值
    #[serde(default = "default_end")]
    pub end: String,

    #[serde(default = "default_toggle_actions")]
    pub toggle_actions: String,

    /// 段落 / 标题在桌面宽度下的起始阈值
    #[serde(default = "default_split_start")]
    pub split_start: String,

    /// 段落 / 标题在窄屏（不超过 desktop 断点）下的起始阈值
    #[serde(default = "default_split_start_compact")]
    pub split_start_compact: String,

    /// 段落 / 标题的结束阈值：元素底边越过视口顶边
    #[serde(default = "default_split_end")]
    pub split_end: String,

    #[serde(default = "default_split_toggle_actions")]
    pub split_toggle_actions: String,
}

/// 一对循环换位的文字
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopPair {
    /// 初始可见的一行
    pub a: String,
    /// 换入的一行
    pub b: String,
    /// A 在第一次换位前按首屏效果入场
    #[serde(default)]
    pub intro: bool,
}

/// 文字效果的目标选择器
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFxConfig {
    /// 按词拆分、滚动触发的段落
    #[serde(default = "default_paragraph_selector")]
    pub paragraph_selector: String,

    /// 按字符拆分、滚动触发的标题
    #[serde(default = "default_title_selector")]
    pub title_selector: String,

    /// 首屏按字符入场的标题
    #[serde(default = "default_landing_selector")]
    pub landing_selector: String,

    /// 首屏淡入的装饰元素
    #[serde(default = "default_fade_selector")]
    pub fade_selector: String,

    #[serde(default = "default_loop_pairs")]
    pub loop_pairs: Vec<LoopPair>,
}

/// 页面过渡的节点选择器
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// 进入 / 退出 / 淡入 / 滑入 / 裁剪揭示的页面主体
    #[serde(default = "default_content_selector")]
    pub content_selector: String,

    /// 幕布覆盖层
    #[serde(default = "default_curtain_selector")]
    pub curtain_selector: String,

    /// 加载层
    #[serde(default = "default_loading_selector")]
    pub loading_selector: String,

    /// 加载完成后入场的主内容
    #[serde(default = "default_main_selector")]
    pub main_selector: String,
}

// ========== 默认值 ==========

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            breakpoints: Breakpoints::default(),
            scroll: ScrollConfig::default(),
            cursor: CursorConfig::default(),
            pointer_fx: PointerFxConfig::default(),
            triggers: TriggerConfig::default(),
            text: TextFxConfig::default(),
            transitions: TransitionConfig::default(),
            frame: FrameConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            desktop: default_desktop(),
            split_text: default_split_text(),
        }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: default_end(),
            toggle_actions: default_toggle_actions(),
            split_start: default_split_start(),
            split_start_compact: default_split_start_compact(),
            split_end: default_split_end(),
            split_toggle_actions: default_split_toggle_actions(),
        }
    }
}

impl Default for TextFxConfig {
    fn default() -> Self {
        Self {
            paragraph_selector: default_paragraph_selector(),
            title_selector: default_title_selector(),
            landing_selector: default_landing_selector(),
            fade_selector: default_fade_selector(),
            loop_pairs: default_loop_pairs(),
        }
    }
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            content_selector: default_content_selector(),
            curtain_selector: default_curtain_selector(),
            loading_selector: default_loading_selector(),
            main_selector: default_main_selector(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_desktop() -> f32 {
    1024.0
}

fn default_split_text() -> f32 {
    900.0
}

fn default_start() -> String {
    "top 80%".to_string()
}

fn default_end() -> String {
    "bottom 20%".to_string()
}

fn default_toggle_actions() -> String {
    "play none none reverse".to_string()
}

fn default_split_start() -> String {
    "20% 60%".to_string()
}

fn default_split_start_compact() -> String {
    "top 60%".to_string()
}

fn default_split_end() -> String {
    "bottom top".to_string()
}

fn default_split_toggle_actions() -> String {
    "play pause resume reverse".to_string()
}

fn default_paragraph_selector() -> String {
    ".para".to_string()
}

fn default_title_selector() -> String {
    ".title".to_string()
}

fn default_landing_selector() -> String {
    ".landing-info h3, .landing-intro h2, .landing-intro h1".to_string()
}

fn default_fade_selector() -> String {
    ".header, .icons-section, .nav-fade".to_string()
}

fn default_loop_pairs() -> Vec<LoopPair> {
    vec![
        LoopPair {
            a: ".landing-h2-info".to_string(),
            b: ".landing-h2-info-1".to_string(),
            intro: true,
        },
        LoopPair {
            a: ".landing-h2-1".to_string(),
            b: ".landing-h2-2".to_string(),
            intro: false,
        },
    ]
}

fn default_content_selector() -> String {
    ".page-content".to_string()
}

fn default_curtain_selector() -> String {
    ".transition-curtain".to_string()
}

fn default_loading_selector() -> String {
    ".loading-screen".to_string()
}

fn default_main_selector() -> String {
    ".main-content".to_string()
}

// ========== 解析后的触发参数 ==========

/// 解析后的触发参数，供引擎直接使用
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTriggers {
    pub start: Threshold,
    pub end: Threshold,
    pub toggle_actions: ToggleActions,
    pub split_start: Threshold,
    pub split_start_compact: Threshold,
    pub split_end: Threshold,
    pub split_toggle_actions: ToggleActions,
}

impl TriggerConfig {
    /// 解析全部阈值与动作字符串
    pub fn resolve(&self) -> Result<ResolvedTriggers, ConfigError> {
        let threshold = |s: &str| {
            s.parse::<Threshold>()
                .map_err(|e| ConfigError::ValidationFailed(e.to_string()))
        };
        let actions = |s: &str| {
            s.parse::<ToggleActions>()
                .map_err(|e| ConfigError::ValidationFailed(e.to_string()))
        };
        Ok(ResolvedTriggers {
            start: threshold(&self.start)?,
            end: threshold(&self.end)?,
            toggle_actions: actions(&self.toggle_actions)?,
            split_start: threshold(&self.split_start)?,
            split_start_compact: threshold(&self.split_start_compact)?,
            split_end: threshold(&self.split_end)?,
            split_toggle_actions: actions(&self.split_toggle_actions)?,
        })
    }
}

impl EngineConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!(path = %path.display(), "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.breakpoints.desktop.is_nan()
            || self.breakpoints.split_text.is_nan()
            || self.breakpoints.desktop <= 0.0
            || self.breakpoints.split_text <= 0.0
        {
            return Err(ConfigError::ValidationFailed(
                "断点必须为正数".to_string(),
            ));
        }

        let scroll = &self.scroll;
        if !scroll.duration.is_finite() || scroll.duration < 0.0 {
            return Err(ConfigError::ValidationFailed(format!(
                "滚动补间时长无效: {}",
                scroll.duration
            )));
        }
        if !scroll.wheel_multiplier.is_finite() || !scroll.touch_multiplier.is_finite() {
            return Err(ConfigError::ValidationFailed(
                "滚动倍率必须为有限数".to_string(),
            ));
        }

        for (name, value) in [
            ("smoothing", self.cursor.smoothing),
            ("hover_smoothing", self.cursor.hover_smoothing),
        ] {
            if value.is_nan() || value <= 0.0 || value > 1.0 {
                return Err(ConfigError::ValidationFailed(format!(
                    "光标 {name} 必须在 (0, 1] 之间: {value}"
                )));
            }
        }

        if let Some(max) = self.frame.max_frame_delta
            && (max.is_nan() || max <= 0.0)
        {
            return Err(ConfigError::ValidationFailed(format!(
                "max_frame_delta 必须为正数: {max}"
            )));
        }

        self.triggers.resolve()?;

        let mut selectors = vec![
            &self.cursor.cursor_selector,
            &self.cursor.dot_selector,
            &self.cursor.interactive_selector,
            &self.text.paragraph_selector,
            &self.text.title_selector,
            &self.text.landing_selector,
            &self.text.fade_selector,
            &self.pointer_fx.magnetic_selector,
            &self.pointer_fx.tilt_selector,
            &self.pointer_fx.hover_scale_selector,
            &self.transitions.content_selector,
            &self.transitions.curtain_selector,
            &self.transitions.loading_selector,
            &self.transitions.main_selector,
        ];
        for pair in &self.text.loop_pairs {
            selectors.push(&pair.a);
            selectors.push(&pair.b);
        }
        for selector in selectors {
            Selector::parse(selector).map_err(|e| ConfigError::ValidationFailed(e.to_string()))?;
        }

        if logging::parse_level(&self.log_level).is_none() {
            return Err(ConfigError::ValidationFailed(format!(
                "未知日志级别: {}",
                self.log_level
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.breakpoints.desktop, 1024.0);
        assert_eq!(config.breakpoints.split_text, 900.0);
        assert_eq!(config.text.loop_pairs.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_falls_back_per_field() {
        let json = r#"{ "breakpoints": { "desktop": 1280 }, "scroll": { "duration": 0.8 } }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.breakpoints.desktop, 1280.0);
        assert_eq!(config.breakpoints.split_text, 900.0);
        assert_eq!(config.scroll.duration, 0.8);
        assert_eq!(config.scroll.touch_multiplier, 2.0);
        assert_eq!(config.triggers.start, "top 80%");
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();

        // 无效阈值
        config.triggers.split_start = "20%".to_string();
        assert!(config.validate().is_err());

        config.triggers.split_start = default_split_start();
        config.cursor.smoothing = 0.0;
        assert!(config.validate().is_err());

        config.cursor.smoothing = 0.15;
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());

        config.log_level = "debug".to_string();
        config.text.title_selector = "[unterminated".to_string();
        assert!(config.validate().is_err());

        config.text.title_selector = default_title_selector();
        config.pointer_fx.tilt_selector = "[data-tilt".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pointer_fx_and_transition_defaults() {
        let json = r#"{ "pointer_fx": { "tilt_selector": ".card" }, "transitions": { "main_selector": "main" } }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.pointer_fx.tilt_selector, ".card");
        assert_eq!(config.pointer_fx.magnetic_selector, "[data-magnetic]");
        assert_eq!(config.transitions.main_selector, "main");
        assert_eq!(config.transitions.curtain_selector, ".transition-curtain");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load(dir.path().join("missing.json"));
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("motion.json");

        let mut config = EngineConfig::default();
        config.breakpoints.desktop = 1440.0;
        config.frame.max_frame_delta = Some(0.1);
        config.save(&path).unwrap();

        let loaded = EngineConfig::load(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_invalid_json_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(EngineConfig::load(&path), EngineConfig::default());
    }

    #[test]
    fn test_resolve_triggers() {
        let resolved = TriggerConfig::default().resolve().unwrap();
        assert_eq!(resolved.start.to_string(), "0% 80%");
        assert_eq!(resolved.split_toggle_actions.to_string(), "play pause resume reverse");
        assert_eq!(resolved.split_end.to_string(), "100% 0%");
        assert_ne!(resolved.split_end, resolved.end);
    }

    #[test]
    fn test_invalid_split_end_fails_resolve() {
        let mut config = TriggerConfig::default();
        config.split_end = "bottom nowhere".to_string();
        assert!(config.resolve().is_err());
    }
}
