//! 触发阈值与 toggle actions 的解析
//!
//! 阈值格式为 `"<元素边> <视口边>"`，每个边可以是
//! `top` / `center` / `bottom` / `left` / `right`、`N%`、`Npx` 或纯数字（像素）。

use std::fmt;
use std::str::FromStr;

use crate::animation::ControlAction;
use crate::error::MotionError;

/// 盒上的一个位置
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edge {
    /// 相对盒尺寸的百分比
    Percent(f32),
    Pixels(f32),
}

impl Edge {
    /// 换算为距盒起点的像素
    pub fn resolve(&self, size: f32) -> f32 {
        match *self {
            Edge::Percent(p) => size * p / 100.0,
            Edge::Pixels(px) => px,
        }
    }

    fn parse(token: &str) -> Result<Self, String> {
        match token {
            "top" | "left" => return Ok(Edge::Percent(0.0)),
            "center" => return Ok(Edge::Percent(50.0)),
            "bottom" | "right" => return Ok(Edge::Percent(100.0)),
            _ => {}
        }
        let number = |s: &str| {
            s.parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("无法解析 '{token}'"))
        };
        if let Some(percent) = token.strip_suffix('%') {
            return number(percent).map(Edge::Percent);
        }
        if let Some(px) = token.strip_suffix("px") {
            return number(px).map(Edge::Pixels);
        }
        number(token).map(Edge::Pixels)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Percent(p) => write!(f, "{p}%"),
            Edge::Pixels(px) => write!(f, "{px}px"),
        }
    }
}

/// 触发阈值：元素上的 `element` 边与视口的 `viewport` 边重合时触发
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub element: Edge,
    pub viewport: Edge,
}

impl Threshold {
    /// 触发时的绝对滚动偏移
    pub fn scroll_offset(&self, element_start: f32, element_size: f32, viewport_size: f32) -> f32 {
        element_start + self.element.resolve(element_size) - self.viewport.resolve(viewport_size)
    }
}

impl FromStr for Threshold {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: String| MotionError::InvalidThreshold {
            input: s.to_string(),
            message,
        };
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let [element, viewport] = tokens.as_slice() else {
            return Err(invalid(format!("需要两个边，实际为 {}", tokens.len())));
        };
        Ok(Self {
            element: Edge::parse(element).map_err(invalid)?,
            viewport: Edge::parse(viewport).map_err(invalid)?,
        })
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element, self.viewport)
    }
}

/// 四个阶段转换对应的动作：onEnter onLeave onEnterBack onLeaveBack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleActions {
    pub on_enter: ControlAction,
    pub on_leave: ControlAction,
    pub on_enter_back: ControlAction,
    pub on_leave_back: ControlAction,
}

impl Default for ToggleActions {
    /// `play none none reverse`
    fn default() -> Self {
        Self {
            on_enter: ControlAction::Play,
            on_leave: ControlAction::None,
            on_enter_back: ControlAction::None,
            on_leave_back: ControlAction::Reverse,
        }
    }
}

impl FromStr for ToggleActions {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MotionError::InvalidToggleActions {
            input: s.to_string(),
        };
        let actions = s
            .split_whitespace()
            .map(|word| word.parse::<ControlAction>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        let [on_enter, on_leave, on_enter_back, on_leave_back] = actions.as_slice() else {
            return Err(invalid());
        };
        Ok(Self {
            on_enter: *on_enter,
            on_leave: *on_leave,
            on_enter_back: *on_enter_back,
            on_leave_back: *on_leave_back,
        })
    }
}

impl fmt::Display for ToggleActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.on_enter.name(),
            self.on_leave.name(),
            self.on_enter_back.name(),
            self.on_leave_back.name()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        let t: Threshold = "top 80%".parse().unwrap();
        assert_eq!(t.element, Edge::Percent(0.0));
        assert_eq!(t.viewport, Edge::Percent(80.0));

        let t: Threshold = "bottom center".parse().unwrap();
        assert_eq!(t.element, Edge::Percent(100.0));
        assert_eq!(t.viewport, Edge::Percent(50.0));
    }

    #[test]
    fn test_parse_pixels() {
        let t: Threshold = "20px 100".parse().unwrap();
        assert_eq!(t.element, Edge::Pixels(20.0));
        assert_eq!(t.viewport, Edge::Pixels(100.0));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "top".parse::<Threshold>(),
            Err(MotionError::InvalidThreshold { .. })
        ));
        assert!("top middle".parse::<Threshold>().is_err());
        assert!("abc% 10%".parse::<Threshold>().is_err());
        assert!("".parse::<Threshold>().is_err());
    }

    #[test]
    fn test_scroll_offset() {
        let start: Threshold = "top 80%".parse().unwrap();
        assert_eq!(start.scroll_offset(1000.0, 200.0, 1000.0), 200.0);

        let end: Threshold = "bottom 20%".parse().unwrap();
        assert_eq!(end.scroll_offset(1000.0, 200.0, 1000.0), 1000.0);

        let desktop: Threshold = "20% 60%".parse().unwrap();
        assert_eq!(desktop.scroll_offset(1000.0, 500.0, 1000.0), 500.0);
    }

    #[test]
    fn test_toggle_actions() {
        let actions: ToggleActions = "play pause resume reverse".parse().unwrap();
        assert_eq!(actions.on_enter, ControlAction::Play);
        assert_eq!(actions.on_leave, ControlAction::Pause);
        assert_eq!(actions.on_enter_back, ControlAction::Resume);
        assert_eq!(actions.on_leave_back, ControlAction::Reverse);
        assert_eq!(actions.to_string(), "play pause resume reverse");

        assert_eq!(ToggleActions::default().to_string(), "play none none reverse");
        assert!("play none".parse::<ToggleActions>().is_err());
        assert!("play none none rewind".parse::<ToggleActions>().is_err());
    }
}
