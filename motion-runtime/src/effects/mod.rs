//! # Effects 模块
//!
//! 统一的效果定义与参数合并。
//!
//! ## 核心流程
//!
//! ```text
//! EffectKind + MotionOptions + TargetSet
//!        ↓ MotionDescriptorBuilder::build()
//! MotionDescriptor (不可变，只能消费一次)
//!        ↓ into_timeline() / append_to()
//! Timeline → AnimationSystem
//! ```
//!
//! ## 模块组成
//!
//! - [`registry`]: 效果类型与默认参数（唯一来源）
//! - [`builder`]: 默认值与调用方选项的合并
//! - [`sequences`]: 多段组合的时间线（页面过渡、故障闪现、波浪）

pub mod builder;
pub mod registry;
pub mod sequences;

pub use builder::{MotionDescriptor, MotionDescriptorBuilder, MotionOptions, TargetSet, merge};
pub use registry::{EffectDefaults, EffectKind, SlideDirection, VisualState, defaults};
pub use sequences::PageTransition;
