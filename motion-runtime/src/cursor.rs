//! # Cursor 模块
//!
//! 跟随指针的自定义光标。
//!
//! 光标节点每帧以插值逼近指针位置，小圆点直接跟随指针。
//! 悬停交互元素时按其 `data-cursor` 属性切换外观：
//!
//! | `data-cursor` | 进入 | 离开 |
//! |---------------|------|------|
//! | `disable` | 光标缩为 0 | 恢复默认外观 |
//! | `icons` | 光标包住元素（尺寸 + 20，圆角 10） | 恢复默认外观 |
//! | `default` / 缺省 | 光标放大 1.5，小圆点隐藏 | 恢复默认外观，小圆点显示 |
//!
//! 交互元素集合在每次内容变化后通过 [`CursorFollower::rescan`] 重建，
//! 已移除的节点随之被遗忘。

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::animation::{AnimationSystem, Animatable, KillMode, Prop, Vec2};
use crate::dom::{Document, NodeId};
use crate::effects::{EffectKind, MotionDescriptor, MotionDescriptorBuilder, defaults};
use crate::error::{MotionError, MotionResult};

/// 光标配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorConfig {
    /// 光标节点选择器
    #[serde(default = "default_cursor_selector")]
    pub cursor_selector: String,

    /// 小圆点节点选择器
    #[serde(default = "default_dot_selector")]
    pub dot_selector: String,

    /// 交互元素选择器
    #[serde(default = "default_interactive_selector")]
    pub interactive_selector: String,

    /// 每帧插值系数
    #[serde(default = "default_smoothing")]
    pub smoothing: f32,

    /// 悬停时的插值系数
    #[serde(default = "default_hover_smoothing")]
    pub hover_smoothing: f32,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            cursor_selector: default_cursor_selector(),
            dot_selector: default_dot_selector(),
            interactive_selector: default_interactive_selector(),
            smoothing: default_smoothing(),
            hover_smoothing: default_hover_smoothing(),
        }
    }
}

fn default_cursor_selector() -> String {
    ".enhanced-cursor".to_string()
}

fn default_dot_selector() -> String {
    ".enhanced-cursor-dot".to_string()
}

fn default_interactive_selector() -> String {
    "a, button, [data-cursor], .hover-link, input, textarea, [role=button]".to_string()
}

fn default_smoothing() -> f32 {
    defaults::CURSOR_SMOOTHING
}

fn default_hover_smoothing() -> f32 {
    defaults::CURSOR_HOVER_SMOOTHING
}

/// 交互元素声明的光标外观
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorVariant {
    Default,
    /// 悬停时隐藏光标
    Disable,
    /// 光标包住元素
    Icons,
}

impl CursorVariant {
    /// 由 `data-cursor` 的值得出，未知值按默认处理
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("disable") => CursorVariant::Disable,
            Some("icons") => CursorVariant::Icons,
            _ => CursorVariant::Default,
        }
    }
}

/// 悬停变化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorEvent {
    Enter { node: NodeId, variant: CursorVariant },
    Leave { node: NodeId },
}

/// 光标状态，detach 时重置
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CursorState {
    /// 指针原始位置
    pub raw: Vec2,
    /// 插值后的光标位置
    pub smoothed: Vec2,
    pub hovered: Option<(NodeId, CursorVariant)>,
    pub pressed: bool,
}

/// 光标跟随器
#[derive(Debug)]
pub struct CursorFollower {
    config: CursorConfig,
    cursor: NodeId,
    dot: NodeId,
    state: CursorState,
    /// 当前监听的交互元素（文档顺序）
    interactive: Vec<NodeId>,
    attached: bool,
}

impl CursorFollower {
    /// 查找光标与小圆点节点并扫描交互元素
    pub fn attach(doc: &Document, config: CursorConfig) -> MotionResult<Self> {
        let find = |selector: &str| {
            doc.query(selector)?
                .ok_or_else(|| MotionError::ElementNotFound {
                    selector: selector.to_string(),
                })
        };
        let cursor = find(&config.cursor_selector)?;
        let dot = find(&config.dot_selector)?;

        let mut follower = Self {
            config,
            cursor,
            dot,
            state: CursorState::default(),
            interactive: Vec::new(),
            attached: true,
        };
        follower.scan(doc)?;
        info!(
            cursor = %cursor,
            interactive = follower.interactive.len(),
            "光标跟随已挂载"
        );
        Ok(follower)
    }

    // ========== 交互元素 ==========

    /// 重新扫描交互元素：加入新插入的节点，遗忘已移除的节点
    ///
    /// 悬停中的节点被移除时按离开处理。
    pub fn rescan(
        &mut self,
        doc: &mut Document,
        animations: &mut AnimationSystem,
    ) -> MotionResult<Option<CursorEvent>> {
        if !self.attached {
            return Ok(None);
        }
        self.scan(doc)?;

        match self.state.hovered {
            Some((node, _)) if !self.interactive.contains(&node) => {
                Ok(Some(self.leave(doc, animations, node)))
            }
            _ => Ok(None),
        }
    }

    fn scan(&mut self, doc: &Document) -> MotionResult<()> {
        let before = self.interactive.len();
        self.interactive = doc.query_all(&self.config.interactive_selector)?;
        if before != self.interactive.len() {
            debug!(before, after = self.interactive.len(), "交互元素集合变化");
        }
        Ok(())
    }

    /// 视口坐标下位于 `(x, y)` 的最内层交互元素
    fn hit_test(&self, doc: &Document, point: Vec2, scroll_offset: f32) -> Option<NodeId> {
        self.interactive.iter().rev().copied().find(|node| {
            doc.rect(*node)
                .is_some_and(|rect| rect.contains(point.x, point.y + scroll_offset))
        })
    }

    // ========== 指针事件 ==========

    /// 指针移动（视口坐标）
    ///
    /// 只记录位置并判定悬停变化；插值在 [`frame`](Self::frame) 中进行。
    pub fn pointer_move(
        &mut self,
        doc: &mut Document,
        animations: &mut AnimationSystem,
        x: f32,
        y: f32,
        scroll_offset: f32,
    ) -> Option<CursorEvent> {
        if !self.attached {
            return None;
        }
        self.state.raw = Vec2::new(x, y);

        let hit = self.hit_test(doc, self.state.raw, scroll_offset);
        let current = self.state.hovered.map(|(node, _)| node);
        if hit == current {
            return None;
        }

        let mut event = None;
        if let Some(previous) = current {
            event = Some(self.leave(doc, animations, previous));
        }
        if let Some(node) = hit {
            event = Some(self.enter(doc, animations, node));
        }
        event
    }

    fn enter(
        &mut self,
        doc: &mut Document,
        animations: &mut AnimationSystem,
        node: NodeId,
    ) -> CursorEvent {
        let variant = CursorVariant::from_attr(doc.attr(node, "data-cursor"));
        self.state.hovered = Some((node, variant));
        debug!(node = %node, ?variant, "光标进入交互元素");

        match variant {
            CursorVariant::Disable => {
                self.tween(doc, animations, self.cursor, EffectKind::CursorHide, |b| b);
            }
            CursorVariant::Icons => {
                let (width, height) = doc
                    .rect(node)
                    .map(|r| (r.width, r.height))
                    .unwrap_or((defaults::CURSOR_SIZE, defaults::CURSOR_SIZE));
                self.tween(doc, animations, self.cursor, EffectKind::CursorIcons, |b| {
                    b.to(Prop::Width, width + defaults::CURSOR_ICON_PADDING)
                        .to(Prop::Height, height + defaults::CURSOR_ICON_PADDING)
                });
            }
            CursorVariant::Default => {
                self.tween(doc, animations, self.cursor, EffectKind::CursorHover, |b| b);
                self.tween(doc, animations, self.dot, EffectKind::CursorDotHide, |b| b);
            }
        }
        CursorEvent::Enter { node, variant }
    }

    fn leave(
        &mut self,
        doc: &mut Document,
        animations: &mut AnimationSystem,
        node: NodeId,
    ) -> CursorEvent {
        self.state.hovered = None;
        self.state.pressed = false;
        debug!(node = %node, "光标离开交互元素");

        self.tween(doc, animations, self.cursor, EffectKind::CursorLeave, |b| b);
        self.tween(doc, animations, self.dot, EffectKind::CursorDotShow, |b| b);
        CursorEvent::Leave { node }
    }

    /// 在交互元素上按下
    pub fn pointer_down(&mut self, doc: &mut Document, animations: &mut AnimationSystem) {
        if !self.attached || self.state.hovered.is_none() {
            return;
        }
        self.state.pressed = true;
        self.tween(doc, animations, self.cursor, EffectKind::CursorPress, |b| b);
    }

    /// 松开：悬停中回到放大状态，否则回到 1
    pub fn pointer_up(&mut self, doc: &mut Document, animations: &mut AnimationSystem) {
        if !self.attached || !self.state.pressed {
            return;
        }
        self.state.pressed = false;
        let scale = if self.state.hovered.is_some() {
            defaults::CURSOR_HOVER_SCALE
        } else {
            1.0
        };
        self.tween(doc, animations, self.cursor, EffectKind::CursorRelease, |b| {
            b.to(Prop::Scale, scale).ease(defaults::EASE_ELASTIC)
        });
    }

    /// 指针进入窗口
    pub fn window_enter(&mut self, doc: &mut Document, animations: &mut AnimationSystem) {
        if self.attached {
            self.fade(doc, animations, EffectKind::CursorFadeIn);
        }
    }

    /// 指针离开窗口
    pub fn window_leave(&mut self, doc: &mut Document, animations: &mut AnimationSystem) {
        if self.attached {
            self.fade(doc, animations, EffectKind::CursorFadeOut);
        }
    }

    fn fade(&self, doc: &mut Document, animations: &mut AnimationSystem, kind: EffectKind) {
        let nodes = [self.cursor, self.dot];
        let timeline = MotionDescriptorBuilder::new(kind)
            .nodes(nodes.to_vec())
            .build()
            .into_timeline(&nodes)
            .with_auto_kill()
            .playing();
        animations.insert(&nodes, timeline, KillMode::Freeze, doc);
    }

    /// 对单个节点启动一次性 "to" 补间，替换该节点上的旧补间
    fn tween(
        &self,
        doc: &mut Document,
        animations: &mut AnimationSystem,
        node: NodeId,
        kind: EffectKind,
        customize: impl FnOnce(MotionDescriptorBuilder) -> MotionDescriptorBuilder,
    ) {
        let descriptor: MotionDescriptor =
            customize(MotionDescriptorBuilder::new(kind).nodes(vec![node])).build();
        let timeline = descriptor
            .into_timeline(&[node])
            .with_auto_kill()
            .playing();
        animations.insert(&[node], timeline, KillMode::Freeze, doc);
    }

    // ========== 每帧 ==========

    /// 光标位置插值一步，写入光标与小圆点
    pub fn frame(&mut self, doc: &mut Document) {
        if !self.attached {
            return;
        }
        let factor = if self.state.hovered.is_some() {
            self.config.hover_smoothing
        } else {
            self.config.smoothing
        };
        self.state.smoothed = self.state.smoothed.lerp(self.state.raw, factor);

        doc.set_property(self.cursor, Prop::X, self.state.smoothed.x);
        doc.set_property(self.cursor, Prop::Y, self.state.smoothed.y);
        doc.set_property(self.dot, Prop::X, self.state.raw.x);
        doc.set_property(self.dot, Prop::Y, self.state.raw.y);
    }

    /// 卸载：重置状态、遗忘交互元素、停止光标上的补间；可重复调用
    pub fn detach(&mut self, doc: &mut Document, animations: &mut AnimationSystem) {
        if !self.attached {
            return;
        }
        self.attached = false;
        animations.kill_owner(self.cursor, KillMode::Freeze, doc);
        animations.kill_owner(self.dot, KillMode::Freeze, doc);
        self.interactive.clear();
        self.state = CursorState::default();
        info!("光标跟随已卸载");
    }

    // ========== 查询 ==========

    pub fn state(&self) -> &CursorState {
        &self.state
    }

    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    pub fn dot(&self) -> NodeId {
        self.dot
    }

    pub fn interactive(&self) -> &[NodeId] {
        &self.interactive
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}
