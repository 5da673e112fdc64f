//! 平滑滚动配置

use serde::{Deserialize, Serialize};

use crate::animation::EasingFunction;

/// 滚动方向轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// 手势（滚轮）读取的轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureOrientation {
    #[default]
    Vertical,
    Horizontal,
    /// 取两轴中幅度较大的一个
    Both,
}

/// 平滑滚动配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// 每次滚动补间的时长（秒）
    #[serde(default = "default_duration")]
    pub duration: f32,

    /// 补间曲线，默认 `min(1, 1.001 - 2^(-10t))`
    #[serde(default)]
    pub easing: EasingFunction,

    #[serde(default)]
    pub orientation: Orientation,

    #[serde(default)]
    pub gesture_orientation: GestureOrientation,

    #[serde(default = "default_wheel_multiplier")]
    pub wheel_multiplier: f32,

    #[serde(default = "default_touch_multiplier")]
    pub touch_multiplier: f32,

    /// 无限滚动：偏移在 `[0, limit)` 内回绕而不是钳制
    #[serde(default)]
    pub infinite: bool,

    /// 关闭后滚轮增量立即生效，不做补间
    #[serde(default = "default_smooth_wheel")]
    pub smooth_wheel: bool,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            easing: EasingFunction::SmoothScroll,
            orientation: Orientation::default(),
            gesture_orientation: GestureOrientation::default(),
            wheel_multiplier: default_wheel_multiplier(),
            touch_multiplier: default_touch_multiplier(),
            infinite: false,
            smooth_wheel: default_smooth_wheel(),
        }
    }
}

impl ScrollConfig {
    /// 按手势轴选出滚轮增量
    pub fn wheel_delta(&self, dx: f32, dy: f32) -> f32 {
        let raw = match self.gesture_orientation {
            GestureOrientation::Vertical => dy,
            GestureOrientation::Horizontal => dx,
            GestureOrientation::Both => {
                if dx.abs() > dy.abs() {
                    dx
                } else {
                    dy
                }
            }
        };
        raw * self.wheel_multiplier
    }
}

// 默认值函数
fn default_duration() -> f32 {
    1.2
}

fn default_wheel_multiplier() -> f32 {
    1.0
}

fn default_touch_multiplier() -> f32 {
    2.0
}

fn default_smooth_wheel() -> bool {
    true
}
