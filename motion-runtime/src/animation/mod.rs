//! # Animation 模块
//!
//! 通用动画系统，负责管理所有时间线。
//!
//! ## 核心设计理念
//!
//! 动画系统只负责 **时间轴管理**：
//! - 知道某个属性从 A 到 B 需要在 duration 内变化
//! - 通过 `Animatable` 直接写入目标属性
//! - **不假设目标类型**，节点树自己决定如何使用这些值
//!
//! ## 核心概念
//!
//! - `Track`: 单个 (节点, 属性) 的补间
//! - `Timeline`: 一组轨道，统一播放/暂停/反向/循环
//! - `AnimationSystem`: 时间线管理器，保证每个目标最多一条时间线
//! - `EasingFunction`: 缓动函数
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let mut tl = Timeline::new();
//! tl.add_track(Track::new(node, Prop::Opacity, Some(0.0), 1.0).at(0.0, 0.6));
//! let id = system.insert(&[node], tl.playing(), KillMode::Complete, &mut doc);
//! system.update(dt, &mut doc);
//! ```

mod easing;
mod system;
mod timeline;
mod traits;
mod transform;

pub use easing::{EaseDirection, EasingFunction};
pub use system::{AnimationSystem, KillMode};
pub use timeline::{
    ControlAction, Direction, PlayState, Repeat, Timeline, TimelineId, TimelineStep, Track,
};
pub use traits::{Animatable, Prop};
pub use transform::Vec2;

/// 动画事件
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationEvent {
    /// 时间线开始播放
    Started(TimelineId),
    /// 进入新一轮循环
    Repeated(TimelineId),
    /// 到达终点（或反向回到起点）
    Completed(TimelineId),
    /// 时间线被移除
    Killed(TimelineId),
}
