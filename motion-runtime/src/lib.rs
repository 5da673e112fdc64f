//! # Motion Runtime
//!
//! 无头的文字拆分与滚动同步动效引擎。
//!
//! ## 架构概述
//!
//! `motion-runtime` 不负责布局与绘制。渲染层持有节点树（[`Document`]），
//! 按帧把它借给引擎；引擎只读写节点的动画属性与拆分包装节点：
//!
//! ```text
//! Host                               MotionEngine
//!   │                                     │
//!   │── init_animations(doc, viewport) ──►│ 拆分、时间线、触发器
//!   │── on_wheel / on_resize / pointer ──►│
//!   │── tick(doc, now) ──────────────────►│ 滚动 → 触发器 → 动画 → 光标
//!   │◄── FrameReport ─────────────────────│
//!   │── teardown(doc) ───────────────────►│ 还原拆分
//! ```
//!
//! ## 模块结构
//!
//! - [`dom`]：节点树、选择器与 `Animatable` 的实现
//! - [`animation`]：时间线、缓动与动画系统
//! - [`effects`]：效果默认值与参数合并
//! - [`splitter`]：可还原的文字拆分
//! - [`scroll`]：虚拟平滑滚动
//! - [`trigger`]：滚动触发器
//! - [`cursor`]：跟随指针的光标
//! - [`pointer_fx`]：磁吸、倾斜与悬停放大
//! - [`looping`]：循环换字
//! - [`frame`]：每帧驱动器
//! - [`engine`]：引擎上下文
//! - [`config`]：引擎配置
//! - [`logging`]：日志初始化
//! - [`error`]：错误类型

pub mod animation;
pub mod config;
pub mod cursor;
pub mod dom;
pub mod effects;
pub mod engine;
pub mod error;
pub mod frame;
pub mod logging;
pub mod looping;
pub mod pointer_fx;
pub mod scroll;
pub mod splitter;
pub mod trigger;

// 重导出核心类型
pub use animation::{
    Animatable, AnimationEvent, AnimationSystem, ControlAction, EasingFunction, KillMode, Prop,
    Repeat, Timeline, TimelineId, Track,
};
pub use config::EngineConfig;
pub use cursor::{CursorConfig, CursorEvent, CursorFollower, CursorVariant};
pub use dom::{Document, NodeId, Rect};
pub use effects::{
    EffectKind, MotionDescriptor, MotionDescriptorBuilder, MotionOptions, PageTransition, TargetSet,
};
pub use engine::{FrameReport, InitReport, MotionEngine, ScrollTarget, TriggerOptions, Viewport};
pub use error::{ConfigError, MotionError, MotionResult};
pub use frame::{FrameDriver, FrameTask};
pub use looping::{LoopPhase, LoopingTextSwapper};
pub use pointer_fx::{PointerEffect, PointerFxConfig, PointerFxController, PointerFxEvent};
pub use scroll::{ScrollConfig, ScrollContext, ScrollFrame, ScrollToOptions, VirtualScroll};
pub use splitter::{SplitRegistry, SplitUnit, TextSplitter};
pub use trigger::{ScrollTriggerRegistry, Threshold, ToggleActions, TriggerEvent, TriggerPhase};
