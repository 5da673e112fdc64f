//! # Trigger 模块
//!
//! 滚动触发器：当元素的某条边与视口的某条边重合时控制时间线。
//!
//! - [`threshold`]: `"top 80%"` 形式的阈值与 toggle actions 解析
//! - [`registry`]: 绑定注册表、阶段机与重新绑定

pub mod registry;
pub mod threshold;

pub use registry::{
    ScrollTriggerBinding, ScrollTriggerRegistry, Transition, TriggerEvent, TriggerId,
    TriggerPhase, TriggerSpec,
};
pub use threshold::{Edge, Threshold, ToggleActions};
