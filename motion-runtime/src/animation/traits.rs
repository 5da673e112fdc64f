//! # Traits 模块
//!
//! 动画系统与节点树之间的接口定义。
//!
//! ## 核心概念
//!
//! - `Prop`: 可动画属性（透明度、位移、旋转、缩放、模糊、尺寸、圆角、裁剪）
//! - `Animatable`: 可动画目标接口，由节点树实现

use std::fmt;

use crate::dom::NodeId;

/// 可动画属性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Prop {
    Opacity,
    X,
    Y,
    /// 旋转（度）
    Rotate,
    /// 绕 X / Y 轴的倾斜（度）
    RotateX,
    RotateY,
    Scale,
    /// 纵向缩放，与 `Scale` 相乘
    ScaleY,
    /// 模糊半径（像素）
    Blur,
    Width,
    Height,
    /// 圆角半径（像素）
    Radius,
    /// 右侧裁剪（百分比），100 为完全裁去
    Clip,
}

impl Prop {
    pub const ALL: [Prop; 13] = [
        Prop::Opacity,
        Prop::X,
        Prop::Y,
        Prop::Rotate,
        Prop::RotateX,
        Prop::RotateY,
        Prop::Scale,
        Prop::ScaleY,
        Prop::Blur,
        Prop::Width,
        Prop::Height,
        Prop::Radius,
        Prop::Clip,
    ];

    /// 属性名称
    pub fn name(&self) -> &'static str {
        match self {
            Prop::Opacity => "opacity",
            Prop::X => "x",
            Prop::Y => "y",
            Prop::Rotate => "rotate",
            Prop::RotateX => "rotateX",
            Prop::RotateY => "rotateY",
            Prop::Scale => "scale",
            Prop::ScaleY => "scaleY",
            Prop::Blur => "blur",
            Prop::Width => "width",
            Prop::Height => "height",
            Prop::Radius => "radius",
            Prop::Clip => "clip",
        }
    }

    /// 未设置时的取值：不透明、原始比例，其余为 0
    pub fn neutral(&self) -> f32 {
        match self {
            Prop::Opacity | Prop::Scale | Prop::ScaleY => 1.0,
            _ => 0.0,
        }
    }
}

impl fmt::Display for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 可动画目标接口
///
/// 动画系统只通过此 trait 读写属性，不假设目标的具体类型。
/// 对不存在的节点，`get_property` 返回 `None`，`set_property` 返回 `false`，
/// 调用方据此跳过已被移除的节点。
///
/// ## 实现示例
///
/// ```rust,ignore
/// impl Animatable for MyScene {
///     fn get_property(&self, node: NodeId, prop: Prop) -> Option<f32> {
///         self.nodes.get(&node).map(|n| n.value(prop))
///     }
///
///     fn set_property(&mut self, node: NodeId, prop: Prop, value: f32) -> bool {
///         match self.nodes.get_mut(&node) {
///             Some(n) => { n.set(prop, value); true }
///             None => false,
///         }
///     }
/// }
/// ```
pub trait Animatable {
    /// 获取属性当前值
    fn get_property(&self, node: NodeId, prop: Prop) -> Option<f32>;

    /// 设置属性值
    ///
    /// # 返回
    /// - `true`: 设置成功
    /// - `false`: 节点不存在
    fn set_property(&mut self, node: NodeId, prop: Prop, value: f32) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_values() {
        assert_eq!(Prop::Opacity.neutral(), 1.0);
        assert_eq!(Prop::Scale.neutral(), 1.0);
        assert_eq!(Prop::ScaleY.neutral(), 1.0);
        for prop in [
            Prop::X,
            Prop::Y,
            Prop::Rotate,
            Prop::RotateX,
            Prop::RotateY,
            Prop::Blur,
            Prop::Radius,
            Prop::Clip,
        ] {
            assert_eq!(prop.neutral(), 0.0, "{prop}");
        }
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = Prop::ALL.iter().map(|p| p.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Prop::ALL.len());
    }
}
