//! # Easing 模块
//!
//! 缓动函数库，用于动画与平滑滚动的时间插值。
//!
//! 名称沿用网页动效里常见的写法（`power3.out`、`elastic.out(1, 0.5)` 等），
//! 以便配置文件直接书写。

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MotionError;

/// 缓动方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EaseDirection {
    In,
    Out,
    InOut,
}

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EasingFunction {
    /// 线性（匀速）
    Linear,
    /// 幂函数缓动，`power1` = 二次，`power4` = 五次
    Power(u8, EaseDirection),
    /// 正弦
    Sine(EaseDirection),
    /// 指数
    Expo(EaseDirection),
    /// 圆形
    Circ(EaseDirection),
    /// 回弹（超出后回落），参数为过冲量
    Back(f32, EaseDirection),
    /// 弹性缓出，参数为振幅与周期
    ElasticOut { amplitude: f32, period: f32 },
    /// 弹跳缓出
    BounceOut,
    /// 平滑滚动曲线：`min(1, 1.001 - 2^(-10t))`
    #[default]
    SmoothScroll,
}

impl EasingFunction {
    /// `power3.out`，文本动效的默认缓动
    pub const POWER3_OUT: Self = Self::Power(3, EaseDirection::Out);
    pub const POWER3_IN_OUT: Self = Self::Power(3, EaseDirection::InOut);
    pub const POWER2_OUT: Self = Self::Power(2, EaseDirection::Out);
    pub const POWER2_IN_OUT: Self = Self::Power(2, EaseDirection::InOut);

    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度 (0.0 - 1.0)
    ///
    /// # 返回
    /// - 缓动后的进度值；`Back` / `Elastic` 中段可能超出 [0, 1]
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match *self {
            EasingFunction::Linear => t,
            EasingFunction::Power(power, dir) => {
                let exp = i32::from(power.clamp(1, 4)) + 1;
                directional(t, dir, |x| x.powi(exp))
            }
            EasingFunction::Sine(dir) => directional(t, dir, |x| 1.0 - (x * PI / 2.0).cos()),
            EasingFunction::Expo(dir) => directional(t, dir, |x| {
                if x == 0.0 {
                    0.0
                } else {
                    2.0_f32.powf(10.0 * (x - 1.0))
                }
            }),
            EasingFunction::Circ(dir) => {
                directional(t, dir, |x| 1.0 - (1.0 - x * x).max(0.0).sqrt())
            }
            EasingFunction::Back(overshoot, dir) => {
                directional(t, dir, |x| x * x * ((overshoot + 1.0) * x - overshoot))
            }
            EasingFunction::ElasticOut { amplitude, period } => {
                ease_out_elastic(t, amplitude, period)
            }
            EasingFunction::BounceOut => ease_out_bounce(t),
            EasingFunction::SmoothScroll => (1.001 - 2.0_f32.powf(-10.0 * t)).min(1.0),
        }
    }

    /// 按名称解析，如 `power3.out`、`back.out(1.7)`、`elastic.out(1, 0.5)`
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let (head, args) = match name.split_once('(') {
            Some((head, rest)) => (head, Some(rest.trim_end_matches(')'))),
            None => (name, None),
        };
        let numbers: Vec<f32> = args
            .map(|a| {
                a.split(',')
                    .filter_map(|n| n.trim().parse::<f32>().ok())
                    .collect()
            })
            .unwrap_or_default();

        let (family, dir) = match head.split_once('.') {
            Some((family, dir)) => (family, Some(dir)),
            None => (head, None),
        };
        let direction = match dir.map(|d| d.to_ascii_lowercase()) {
            None => EaseDirection::Out,
            Some(d) if d == "in" => EaseDirection::In,
            Some(d) if d == "out" => EaseDirection::Out,
            Some(d) if d == "inout" => EaseDirection::InOut,
            Some(_) => return None,
        };

        let ease = match family.to_ascii_lowercase().as_str() {
            "none" | "linear" => EasingFunction::Linear,
            "power0" => EasingFunction::Linear,
            "power1" | "quad" => EasingFunction::Power(1, direction),
            "power2" | "cubic" => EasingFunction::Power(2, direction),
            "power3" | "quart" => EasingFunction::Power(3, direction),
            "power4" | "quint" => EasingFunction::Power(4, direction),
            "sine" => EasingFunction::Sine(direction),
            "expo" => EasingFunction::Expo(direction),
            "circ" => EasingFunction::Circ(direction),
            "back" => EasingFunction::Back(numbers.first().copied().unwrap_or(1.7), direction),
            "elastic" if direction == EaseDirection::Out => EasingFunction::ElasticOut {
                amplitude: numbers.first().copied().unwrap_or(1.0),
                period: numbers.get(1).copied().unwrap_or(0.3),
            },
            "bounce" if direction == EaseDirection::Out => EasingFunction::BounceOut,
            "smoothscroll" => EasingFunction::SmoothScroll,
            _ => return None,
        };
        Some(ease)
    }

    /// 规范名称，与 [`from_name`](Self::from_name) 互逆
    pub fn name(&self) -> String {
        fn dir(d: EaseDirection) -> &'static str {
            match d {
                EaseDirection::In => "in",
                EaseDirection::Out => "out",
                EaseDirection::InOut => "inOut",
            }
        }
        match *self {
            EasingFunction::Linear => "none".to_string(),
            EasingFunction::Power(p, d) => format!("power{}.{}", p, dir(d)),
            EasingFunction::Sine(d) => format!("sine.{}", dir(d)),
            EasingFunction::Expo(d) => format!("expo.{}", dir(d)),
            EasingFunction::Circ(d) => format!("circ.{}", dir(d)),
            EasingFunction::Back(o, d) => format!("back.{}({})", dir(d), o),
            EasingFunction::ElasticOut { amplitude, period } => {
                format!("elastic.out({}, {})", amplitude, period)
            }
            EasingFunction::BounceOut => "bounce.out".to_string(),
            EasingFunction::SmoothScroll => "smoothScroll".to_string(),
        }
    }
}

impl FromStr for EasingFunction {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| MotionError::UnknownEasing {
            name: s.to_string(),
        })
    }
}

impl TryFrom<String> for EasingFunction {
    type Error = MotionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EasingFunction> for String {
    fn from(value: EasingFunction) -> Self {
        value.name()
    }
}

impl fmt::Display for EasingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// 由 ease-in 曲线派生 out / inOut
fn directional(t: f32, dir: EaseDirection, ease_in: impl Fn(f32) -> f32) -> f32 {
    match dir {
        EaseDirection::In => ease_in(t),
        EaseDirection::Out => 1.0 - ease_in(1.0 - t),
        EaseDirection::InOut => {
            if t < 0.5 {
                ease_in(t * 2.0) / 2.0
            } else {
                1.0 - ease_in((1.0 - t) * 2.0) / 2.0
            }
        }
    }
}

/// 弹性缓出
fn ease_out_elastic(t: f32, amplitude: f32, period: f32) -> f32 {
    if t == 0.0 {
        return 0.0;
    }
    if t == 1.0 {
        return 1.0;
    }
    let amplitude = amplitude.max(1.0);
    let period = if period <= 0.0 { 0.3 } else { period };
    let shift = period / (2.0 * PI) * (1.0 / amplitude).asin();
    amplitude * 2.0_f32.powf(-10.0 * t) * ((t - shift) * (2.0 * PI) / period).sin() + 1.0
}

/// 弹跳缓出
fn ease_out_bounce(t: f32) -> f32 {
    let n1 = 7.5625;
    let d1 = 2.75;

    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [EasingFunction; 9] = [
        EasingFunction::Linear,
        EasingFunction::POWER3_OUT,
        EasingFunction::POWER2_IN_OUT,
        EasingFunction::Sine(EaseDirection::InOut),
        EasingFunction::Expo(EaseDirection::Out),
        EasingFunction::Circ(EaseDirection::In),
        EasingFunction::Back(1.7, EaseDirection::Out),
        EasingFunction::ElasticOut {
            amplitude: 1.0,
            period: 0.5,
        },
        EasingFunction::BounceOut,
    ];

    #[test]
    fn test_linear() {
        let easing = EasingFunction::Linear;
        assert_eq!(easing.apply(0.0), 0.0);
        assert_eq!(easing.apply(0.5), 0.5);
        assert_eq!(easing.apply(1.0), 1.0);
    }

    #[test]
    fn test_boundaries() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 0.001, "{easing} at t=0");
            assert!((easing.apply(1.0) - 1.0).abs() < 0.001, "{easing} at t=1");
        }
    }

    #[test]
    fn test_in_out_midpoint() {
        let mid = EasingFunction::POWER3_IN_OUT.apply(0.5);
        assert!((mid - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_clamp() {
        let easing = EasingFunction::Linear;
        assert_eq!(easing.apply(-0.5), 0.0);
        assert_eq!(easing.apply(1.5), 1.0);
    }

    #[test]
    fn test_smooth_scroll_curve_is_monotonic() {
        let easing = EasingFunction::SmoothScroll;
        let mut prev = easing.apply(0.0);
        for i in 1..=20 {
            let v = easing.apply(i as f32 / 20.0);
            assert!(v >= prev, "not monotonic at step {i}");
            assert!(v <= 1.0);
            prev = v;
        }
        assert_eq!(easing.apply(1.0), 1.0);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            EasingFunction::from_name("power3.out"),
            Some(EasingFunction::POWER3_OUT)
        );
        assert_eq!(
            EasingFunction::from_name("power2.inOut"),
            Some(EasingFunction::POWER2_IN_OUT)
        );
        assert_eq!(
            EasingFunction::from_name("elastic.out(1, 0.5)"),
            Some(EasingFunction::ElasticOut {
                amplitude: 1.0,
                period: 0.5
            })
        );
        assert_eq!(
            EasingFunction::from_name("back.out(1.7)"),
            Some(EasingFunction::Back(1.7, EaseDirection::Out))
        );
        assert_eq!(EasingFunction::from_name("none"), Some(EasingFunction::Linear));
        assert_eq!(EasingFunction::from_name("wobble.out"), None);
        assert_eq!(EasingFunction::from_name("power3.sideways"), None);
    }

    #[test]
    fn test_name_parses_back() {
        for easing in ALL {
            assert_eq!(EasingFunction::from_name(&easing.name()), Some(easing));
        }
    }

    #[test]
    fn test_serde_by_name() {
        let json = serde_json::to_string(&EasingFunction::POWER3_OUT).unwrap();
        assert_eq!(json, "\"power3.out\"");
        let parsed: EasingFunction = serde_json::from_str("\"expo.inOut\"").unwrap();
        assert_eq!(parsed, EasingFunction::Expo(EaseDirection::InOut));
        assert!(serde_json::from_str::<EasingFunction>("\"nope\"").is_err());
    }
}
