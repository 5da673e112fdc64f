//! # Scroll Trigger Registry
//!
//! 把滚动偏移映射为时间线控制动作。
//!
//! 每个绑定维护 `Before → Active → After` 阶段；阶段变化时对绑定的时间线
//! 施加对应的 toggle action。一帧内跨越两条边时两个转换都会上报，但只施加
//! 进入方向的动作（`Enter` 或 `EnterBack`），后一个转换的动作记为 `None`。

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, warn};

use super::threshold::{Threshold, ToggleActions};
use crate::animation::{AnimationSystem, ControlAction, KillMode, TimelineId};
use crate::dom::{Document, NodeId};
use crate::scroll::Orientation;

/// 触发器 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerId(u64);

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TriggerId({})", self.0)
    }
}

/// 绑定阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerPhase {
    /// 尚未到达 start
    #[default]
    Before,
    /// 位于 start 与 end 之间
    Active,
    /// 已越过 end
    After,
}

/// 阶段转换
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Enter,
    Leave,
    EnterBack,
    LeaveBack,
}

impl Transition {
    fn action(&self, actions: &ToggleActions) -> ControlAction {
        match self {
            Transition::Enter => actions.on_enter,
            Transition::Leave => actions.on_leave,
            Transition::EnterBack => actions.on_enter_back,
            Transition::LeaveBack => actions.on_leave_back,
        }
    }
}

/// 一次阶段转换及其施加的动作
///
/// `action` 是实际施加到时间线上的动作，未施加时为 `ControlAction::None`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent {
    pub trigger: TriggerId,
    pub transition: Transition,
    pub action: ControlAction,
}

/// 创建绑定所需的参数
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerSpec {
    pub trigger: NodeId,
    pub start: Threshold,
    pub end: Threshold,
    pub toggle_actions: ToggleActions,
    pub timeline: Option<TimelineId>,
    /// 滚动进度直接映射为时间线进度
    pub scrub: bool,
}

/// 已注册的绑定
///
/// `trigger` 是非拥有句柄：节点脱离文档后绑定在下一次刷新时被移除。
#[derive(Debug, Clone)]
pub struct ScrollTriggerBinding {
    pub spec: TriggerSpec,
    start_px: f32,
    end_px: f32,
    phase: TriggerPhase,
}

impl ScrollTriggerBinding {
    pub fn start_px(&self) -> f32 {
        self.start_px
    }

    pub fn end_px(&self) -> f32 {
        self.end_px
    }

    pub fn phase(&self) -> TriggerPhase {
        self.phase
    }

    /// 按缓存的像素边界计算 scrub 进度
    fn progress(&self, offset: f32) -> f32 {
        let span = self.end_px - self.start_px;
        if span <= 0.0 {
            return if offset >= self.end_px { 1.0 } else { 0.0 };
        }
        ((offset - self.start_px) / span).clamp(0.0, 1.0)
    }

    fn phase_at(&self, offset: f32) -> TriggerPhase {
        if offset < self.start_px {
            TriggerPhase::Before
        } else if offset > self.end_px {
            TriggerPhase::After
        } else {
            TriggerPhase::Active
        }
    }
}

/// 滚动触发器注册表
#[derive(Debug)]
pub struct ScrollTriggerRegistry {
    bindings: BTreeMap<TriggerId, ScrollTriggerBinding>,
    next_id: u64,
    orientation: Orientation,
    viewport_size: f32,
    /// 需要重新计算边界
    dirty: bool,
    refresh_count: u64,
}

impl ScrollTriggerRegistry {
    pub fn new(orientation: Orientation, viewport_size: f32) -> Self {
        Self {
            bindings: BTreeMap::new(),
            next_id: 1,
            orientation,
            viewport_size: viewport_size.max(0.0),
            dirty: false,
            refresh_count: 0,
        }
    }

    // ========== 绑定管理 ==========

    /// 注册绑定，边界立即计算；首次阶段判定在下一次 `update`
    pub fn create(&mut self, doc: &Document, spec: TriggerSpec) -> TriggerId {
        let id = TriggerId(self.next_id);
        self.next_id += 1;

        let mut binding = ScrollTriggerBinding {
            spec,
            start_px: 0.0,
            end_px: 0.0,
            phase: TriggerPhase::Before,
        };
        self.measure(doc, &mut binding);
        debug!(
            trigger = %id,
            node = %binding.spec.trigger,
            start = binding.start_px,
            end = binding.end_px,
            "注册滚动触发器"
        );
        self.bindings.insert(id, binding);
        id
    }

    pub fn kill(&mut self, id: TriggerId) -> bool {
        self.bindings.remove(&id).is_some()
    }

    pub fn kill_all(&mut self) {
        self.bindings.clear();
    }

    /// 移除绑定到某个时间线的所有触发器
    pub fn kill_for_timeline(&mut self, timeline: TimelineId) {
        self.bindings
            .retain(|_, binding| binding.spec.timeline != Some(timeline));
    }

    // ========== 重新绑定 ==========

    /// 标记需要重新计算（尺寸或内容变化）
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn set_viewport_size(&mut self, viewport_size: f32) {
        self.viewport_size = viewport_size.max(0.0);
        self.invalidate();
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// 执行过的重新计算次数
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }

    /// 若有标记，重新计算所有边界并移除节点已脱离的绑定
    ///
    /// # 返回
    /// 是否执行了重新计算
    pub fn refresh(&mut self, doc: &mut Document, animations: &mut AnimationSystem) -> bool {
        if !self.dirty {
            return false;
        }
        self.dirty = false;
        self.refresh_count += 1;

        let detached: Vec<TriggerId> = self
            .bindings
            .iter()
            .filter(|(_, b)| !doc.is_attached(b.spec.trigger))
            .map(|(id, _)| *id)
            .collect();
        for id in detached {
            if let Some(binding) = self.bindings.remove(&id) {
                warn!(trigger = %id, node = %binding.spec.trigger, "触发节点已脱离文档，移除绑定");
                if let Some(timeline) = binding.spec.timeline {
                    animations.kill(timeline, KillMode::Freeze, doc);
                }
            }
        }

        let mut bindings = std::mem::take(&mut self.bindings);
        for binding in bindings.values_mut() {
            self.measure(doc, binding);
        }
        self.bindings = bindings;
        true
    }

    fn measure(&self, doc: &Document, binding: &mut ScrollTriggerBinding) {
        let Some(rect) = doc.rect(binding.spec.trigger) else {
            return;
        };
        let (start, size) = match self.orientation {
            Orientation::Vertical => (rect.y, rect.height),
            Orientation::Horizontal => (rect.x, rect.width),
        };
        binding.start_px = binding
            .spec
            .start
            .scroll_offset(start, size, self.viewport_size);
        binding.end_px = binding
            .spec
            .end
            .scroll_offset(start, size, self.viewport_size)
            .max(binding.start_px);
    }

    // ========== 求值 ==========

    /// 按当前偏移求值所有绑定
    ///
    /// 有标记时先刷新（每帧至多一次），然后施加阶段转换对应的动作；
    /// scrub 绑定直接设置时间线进度。
    pub fn update(
        &mut self,
        doc: &mut Document,
        offset: f32,
        animations: &mut AnimationSystem,
    ) -> Vec<TriggerEvent> {
        self.refresh(doc, animations);

        let mut events = Vec::new();
        for (id, binding) in &mut self.bindings {
            if binding.spec.scrub {
                if let Some(timeline) = binding.spec.timeline {
                    animations.set_progress(timeline, binding.progress(offset));
                }
                binding.phase = binding.phase_at(offset);
                continue;
            }

            let next = binding.phase_at(offset);
            let transitions: &[Transition] = match (binding.phase, next) {
                (TriggerPhase::Before, TriggerPhase::Active) => &[Transition::Enter],
                (TriggerPhase::Before, TriggerPhase::After) => {
                    &[Transition::Enter, Transition::Leave]
                }
                (TriggerPhase::Active, TriggerPhase::After) => &[Transition::Leave],
                (TriggerPhase::Active, TriggerPhase::Before) => &[Transition::LeaveBack],
                (TriggerPhase::After, TriggerPhase::Active) => &[Transition::EnterBack],
                (TriggerPhase::After, TriggerPhase::Before) => {
                    &[Transition::EnterBack, Transition::LeaveBack]
                }
                _ => &[],
            };
            binding.phase = next;

            // 跨越两条边时只施加第一个转换的动作
            for (index, transition) in transitions.iter().enumerate() {
                let action = if index == 0 {
                    transition.action(&binding.spec.toggle_actions)
                } else {
                    ControlAction::None
                };
                if let Some(timeline) = binding.spec.timeline
                    && action != ControlAction::None
                {
                    animations.control(timeline, action);
                }
                debug!(trigger = %id, ?transition, action = action.name(), "触发器阶段变化");
                events.push(TriggerEvent {
                    trigger: *id,
                    transition: *transition,
                    action,
                });
            }
        }
        events
    }

    // ========== 查询 ==========

    pub fn get(&self, id: TriggerId) -> Option<&ScrollTriggerBinding> {
        self.bindings.get(&id)
    }

    pub fn phase(&self, id: TriggerId) -> Option<TriggerPhase> {
        self.bindings.get(&id).map(|b| b.phase)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
