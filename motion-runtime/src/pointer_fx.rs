//! # Pointer FX 模块
//!
//! 跟随指针的元素特效，按属性标记挂载：
//!
//! | 标记 | 参数属性 | 指针在元素上 | 离开 |
//! |------|----------|--------------|------|
//! | `data-magnetic` | `data-magnetic-strength`（0.5） | 向指针偏移 `(指针 - 中心) * strength` | 弹回原位 |
//! | `data-tilt` | `data-tilt-max`（15） | 按指针相对中心的位置倾斜，放大 1.05 | 回正 |
//! | `data-hover-scale` | 属性值（1.1） | 进入时放大 | 弹回 1 |
//!
//! 磁吸写 `x` / `y`，倾斜写 `rotateX` / `rotateY` / `scale`，两者可同时作用于一个元素。
//! 倾斜与悬停放大共用 `scale`，后启动的补间替换先前的。

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::animation::{AnimationSystem, KillMode, Prop, Vec2};
use crate::dom::{Document, NodeId, Rect};
use crate::effects::{EffectKind, MotionDescriptorBuilder, defaults};
use crate::error::MotionResult;

/// 指针特效配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerFxConfig {
    #[serde(default = "default_magnetic_selector")]
    pub magnetic_selector: String,

    #[serde(default = "default_tilt_selector")]
    pub tilt_selector: String,

    #[serde(default = "default_hover_scale_selector")]
    pub hover_scale_selector: String,
}

impl Default for PointerFxConfig {
    fn default() -> Self {
        Self {
            magnetic_selector: default_magnetic_selector(),
            tilt_selector: default_tilt_selector(),
            hover_scale_selector: default_hover_scale_selector(),
        }
    }
}

fn default_magnetic_selector() -> String {
    "[data-magnetic]".to_string()
}

fn default_tilt_selector() -> String {
    "[data-tilt]".to_string()
}

fn default_hover_scale_selector() -> String {
    "[data-hover-scale]".to_string()
}

/// 元素特效及其参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEffect {
    Magnetic { strength: f32 },
    Tilt { max: f32 },
    HoverScale { scale: f32 },
}

impl PointerEffect {
    pub fn name(&self) -> &'static str {
        match self {
            PointerEffect::Magnetic { .. } => "magnetic",
            PointerEffect::Tilt { .. } => "tilt",
            PointerEffect::HoverScale { .. } => "hover_scale",
        }
    }

    /// 按节点属性读取参数，缺省或无法解析时取默认值
    fn magnetic(doc: &Document, node: NodeId) -> Self {
        PointerEffect::Magnetic {
            strength: parse_attr(doc, node, "data-magnetic-strength")
                .unwrap_or(defaults::MAGNETIC_STRENGTH),
        }
    }

    fn tilt(doc: &Document, node: NodeId) -> Self {
        PointerEffect::Tilt {
            max: parse_attr(doc, node, "data-tilt-max").unwrap_or(defaults::TILT_MAX),
        }
    }

    fn hover_scale(doc: &Document, node: NodeId) -> Self {
        PointerEffect::HoverScale {
            scale: parse_attr(doc, node, "data-hover-scale").unwrap_or(defaults::HOVER_SCALE),
        }
    }
}

fn parse_attr(doc: &Document, node: NodeId, name: &str) -> Option<f32> {
    doc.attr(node, name)?
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
}

/// 悬停变化
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerFxEvent {
    Enter { node: NodeId, effect: PointerEffect },
    Leave { node: NodeId, effect: PointerEffect },
}

#[derive(Debug, Clone, Copy)]
struct Binding {
    node: NodeId,
    effect: PointerEffect,
    hovered: bool,
    /// 通过 `bind` 加入，不随扫描消失
    manual: bool,
}

/// 指针特效控制器
#[derive(Debug)]
pub struct PointerFxController {
    config: PointerFxConfig,
    bindings: Vec<Binding>,
    attached: bool,
}

impl PointerFxController {
    /// 扫描带标记的元素
    pub fn attach(doc: &Document, config: PointerFxConfig) -> MotionResult<Self> {
        let mut controller = Self {
            config,
            bindings: Vec::new(),
            attached: true,
        };
        controller.scan(doc)?;
        info!(bound = controller.bindings.len(), "指针特效已挂载");
        Ok(controller)
    }

    /// 手动绑定一个元素；同一元素同一特效只保留一份
    pub fn bind(&mut self, node: NodeId, effect: PointerEffect) {
        let existing = self
            .bindings
            .iter_mut()
            .find(|b| b.node == node && b.effect.name() == effect.name());
        match existing {
            Some(binding) => binding.effect = effect,
            None => self.bindings.push(Binding {
                node,
                effect,
                hovered: false,
                manual: true,
            }),
        }
    }

    /// 重新扫描：加入新插入的元素，遗忘已移除的元素，保留悬停状态
    pub fn rescan(&mut self, doc: &Document) -> MotionResult<()> {
        if !self.attached {
            return Ok(());
        }
        self.scan(doc)
    }

    fn scan(&mut self, doc: &Document) -> MotionResult<()> {
        let before = self.bindings.len();
        let mut found = Vec::new();
        for node in doc.query_all(&self.config.magnetic_selector)? {
            found.push((node, PointerEffect::magnetic(doc, node)));
        }
        for node in doc.query_all(&self.config.tilt_selector)? {
            found.push((node, PointerEffect::tilt(doc, node)));
        }
        for node in doc.query_all(&self.config.hover_scale_selector)? {
            found.push((node, PointerEffect::hover_scale(doc, node)));
        }

        let previous = std::mem::take(&mut self.bindings);
        self.bindings = found
            .into_iter()
            .map(|(node, effect)| Binding {
                node,
                effect,
                hovered: previous
                    .iter()
                    .any(|b| b.node == node && b.effect.name() == effect.name() && b.hovered),
                manual: false,
            })
            .collect();
        for binding in previous.into_iter().filter(|b| b.manual) {
            let scanned = self
                .bindings
                .iter()
                .any(|b| b.node == binding.node && b.effect.name() == binding.effect.name());
            // 手动绑定的元素只要仍在文档中就保留
            if !scanned && doc.is_attached(binding.node) {
                self.bindings.push(binding);
            }
        }

        if before != self.bindings.len() {
            debug!(before, after = self.bindings.len(), "指针特效元素集合变化");
        }
        Ok(())
    }

    // ========== 指针事件 ==========

    /// 指针移动（视口坐标）
    pub fn pointer_move(
        &mut self,
        doc: &mut Document,
        animations: &mut AnimationSystem,
        x: f32,
        y: f32,
        scroll_offset: f32,
    ) -> Vec<PointerFxEvent> {
        if !self.attached {
            return Vec::new();
        }
        let pointer = Vec2::new(x, y + scroll_offset);

        let mut events = Vec::new();
        for index in 0..self.bindings.len() {
            let Binding {
                node,
                effect,
                hovered,
                ..
            } = self.bindings[index];
            let Some(rect) = doc.rect(node) else {
                continue;
            };
            let inside = rect.contains(pointer.x, pointer.y);

            match (hovered, inside) {
                (false, true) => {
                    self.bindings[index].hovered = true;
                    debug!(node = %node, effect = effect.name(), "指针进入特效元素");
                    events.push(PointerFxEvent::Enter { node, effect });
                    follow(doc, animations, node, effect, rect, pointer, true);
                }
                (true, true) => follow(doc, animations, node, effect, rect, pointer, false),
                (true, false) => {
                    self.bindings[index].hovered = false;
                    debug!(node = %node, effect = effect.name(), "指针离开特效元素");
                    events.push(PointerFxEvent::Leave { node, effect });
                    release(doc, animations, node, effect);
                }
                (false, false) => {}
            }
        }
        events
    }

    /// 指针离开窗口：所有悬停中的元素按离开处理
    pub fn window_leave(
        &mut self,
        doc: &mut Document,
        animations: &mut AnimationSystem,
    ) -> Vec<PointerFxEvent> {
        let mut events = Vec::new();
        for binding in self.bindings.iter_mut().filter(|b| b.hovered) {
            binding.hovered = false;
            events.push(PointerFxEvent::Leave {
                node: binding.node,
                effect: binding.effect,
            });
            release(doc, animations, binding.node, binding.effect);
        }
        events
    }

    /// 卸载：停止所有绑定元素上的补间并遗忘它们；可重复调用
    pub fn detach(&mut self, doc: &mut Document, animations: &mut AnimationSystem) {
        if !self.attached {
            return;
        }
        self.attached = false;
        for binding in self.bindings.drain(..) {
            animations.kill_owner(binding.node, KillMode::Freeze, doc);
        }
        info!("指针特效已卸载");
    }

    // ========== 查询 ==========

    pub fn bound(&self) -> impl Iterator<Item = (NodeId, PointerEffect)> + '_ {
        self.bindings.iter().map(|b| (b.node, b.effect))
    }

    pub fn is_hovered(&self, node: NodeId) -> bool {
        self.bindings.iter().any(|b| b.node == node && b.hovered)
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

/// 指针在元素上：磁吸与倾斜每次移动都重新瞄准，悬停放大只在进入时启动
fn follow(
    doc: &mut Document,
    animations: &mut AnimationSystem,
    node: NodeId,
    effect: PointerEffect,
    rect: Rect,
    pointer: Vec2,
    entering: bool,
) {
    let half_w = rect.width / 2.0;
    let half_h = rect.height / 2.0;
    let (dx, dy) = (pointer.x - (rect.x + half_w), pointer.y - (rect.y + half_h));

    let builder = match effect {
        PointerEffect::Magnetic { strength } => MotionDescriptorBuilder::new(EffectKind::MagneticPull)
            .to(Prop::X, dx * strength)
            .to(Prop::Y, dy * strength),
        PointerEffect::Tilt { max } => {
            let ratio = |delta: f32, half: f32| if half > 0.0 { delta / half } else { 0.0 };
            MotionDescriptorBuilder::new(EffectKind::Tilt)
                .to(Prop::RotateX, ratio(dy, half_h) * -max)
                .to(Prop::RotateY, ratio(dx, half_w) * max)
        }
        PointerEffect::HoverScale { scale } if entering => {
            MotionDescriptorBuilder::new(EffectKind::HoverScale).to(Prop::Scale, scale)
        }
        PointerEffect::HoverScale { .. } => return,
    };
    start(doc, animations, node, builder);
}

fn release(doc: &mut Document, animations: &mut AnimationSystem, node: NodeId, effect: PointerEffect) {
    let kind = match effect {
        PointerEffect::Magnetic { .. } => EffectKind::MagneticRelease,
        PointerEffect::Tilt { .. } => EffectKind::TiltRelease,
        PointerEffect::HoverScale { .. } => EffectKind::HoverRelease,
    };
    start(doc, animations, node, MotionDescriptorBuilder::new(kind));
}

/// 启动一次性 "to" 补间，替换同一通道上的旧补间
fn start(
    doc: &mut Document,
    animations: &mut AnimationSystem,
    node: NodeId,
    builder: MotionDescriptorBuilder,
) {
    let timeline = builder
        .nodes(vec![node])
        .build()
        .into_timeline(&[node])
        .with_auto_kill()
        .playing();
    animations.insert(&[node], timeline, KillMode::Freeze, doc);
}
