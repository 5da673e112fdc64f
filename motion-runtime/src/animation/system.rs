//! # System 模块
//!
//! 时间线管理器。
//!
//! 每个动画通道（owner 节点上的一个属性）同一时刻最多由一条时间线驱动：
//! ```rust,ignore
//! let id = system.insert(&[para], timeline, KillMode::Complete, &mut doc);
//! // 再次对 para 的同一属性插入时，旧时间线先被完成并移除
//! let events = system.update(dt, &mut doc);
//! ```
//!
//! 只写不同属性的两条时间线可以并存，例如光标的透明度淡出与缩放补间。

use std::collections::HashMap;

use tracing::debug;

use super::{
    Animatable, AnimationEvent, ControlAction, Prop, Timeline, TimelineId, TimelineStep,
};
use crate::dom::NodeId;

/// 动画通道：节点上的一个属性
type Channel = (NodeId, Prop);

/// 移除时间线时如何处理属性值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillMode {
    /// 先跳到终点并渲染，再移除
    Complete,
    /// 保持当前值，直接移除
    Freeze,
}

/// 动画系统
///
/// 管理所有时间线，提供统一的更新和查询接口。
///
/// ## 设计理念
///
/// 动画系统只负责：
/// 1. 推进时间线并通过 `Animatable` 写入属性
/// 2. 维护动画通道到时间线的唯一映射
/// 3. 不持有目标：每次更新时由调用方借出
pub struct AnimationSystem {
    timelines: HashMap<TimelineId, Timeline>,
    /// (owner 节点, 属性) -> 时间线
    owners: HashMap<Channel, TimelineId>,
    next_id: u64,
    /// 待处理的事件队列
    events: Vec<AnimationEvent>,
}

impl Default for AnimationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnimationSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationSystem")
            .field("timelines", &self.timelines.len())
            .field("owners", &self.owners.len())
            .finish()
    }
}

impl AnimationSystem {
    /// 创建新的动画系统
    pub fn new() -> Self {
        Self {
            timelines: HashMap::new(),
            owners: HashMap::new(),
            next_id: 1,
            events: Vec::new(),
        }
    }

    fn next_timeline_id(&mut self) -> TimelineId {
        let id = TimelineId(self.next_id);
        self.next_id += 1;
        id
    }

    // ========== 时间线管理 ==========

    /// 插入时间线并立即渲染其当前状态
    ///
    /// 新时间线认领 `owners` 中各节点上它实际写入的属性；这些通道已被
    /// 其他时间线持有时，旧时间线按 `replace` 处理后整体移除。
    ///
    /// # 返回
    /// 系统分配的唯一 `TimelineId`
    pub fn insert(
        &mut self,
        owners: &[NodeId],
        mut timeline: Timeline,
        replace: KillMode,
        target: &mut dyn Animatable,
    ) -> TimelineId {
        let mut channels: Vec<Channel> = Vec::new();
        for track in timeline.tracks() {
            let channel = (track.node, track.prop);
            if owners.contains(&track.node) && !channels.contains(&channel) {
                channels.push(channel);
            }
        }

        for channel in &channels {
            if let Some(previous) = self.owners.get(channel).copied() {
                debug!(
                    owner = %channel.0,
                    prop = %channel.1,
                    timeline = %previous,
                    "替换通道上的旧时间线"
                );
                self.kill(previous, replace, target);
            }
        }

        let id = self.next_timeline_id();
        timeline.render(target);
        if timeline.is_playing() {
            self.events.push(AnimationEvent::Started(id));
        }
        for channel in channels {
            self.owners.insert(channel, id);
        }
        self.timelines.insert(id, timeline);
        id
    }

    /// 移除时间线
    ///
    /// # 返回
    /// 时间线是否存在
    pub fn kill(&mut self, id: TimelineId, mode: KillMode, target: &mut dyn Animatable) -> bool {
        let Some(mut timeline) = self.timelines.remove(&id) else {
            return false;
        };
        if mode == KillMode::Complete {
            timeline.complete();
            timeline.render(target);
        }
        self.owners.retain(|_, owned| *owned != id);
        self.events.push(AnimationEvent::Killed(id));
        true
    }

    /// 移除 owner 节点任一属性上的所有时间线
    pub fn kill_owner(&mut self, owner: NodeId, mode: KillMode, target: &mut dyn Animatable) -> bool {
        let mut ids: Vec<TimelineId> = self
            .owners
            .iter()
            .filter(|((node, _), _)| *node == owner)
            .map(|(_, id)| *id)
            .collect();
        ids.sort();
        ids.dedup();

        let mut killed = false;
        for id in ids {
            killed |= self.kill(id, mode, target);
        }
        killed
    }

    /// 对时间线施加控制动作，属性在下一次 `update` 时写入
    pub fn control(&mut self, id: TimelineId, action: ControlAction) -> bool {
        match self.timelines.get_mut(&id) {
            Some(timeline) => {
                let was_playing = timeline.is_playing();
                timeline.apply(action);
                if !was_playing && timeline.is_playing() {
                    self.events.push(AnimationEvent::Started(id));
                }
                true
            }
            None => false,
        }
    }

    /// 直接设置进度（scrub）
    pub fn set_progress(&mut self, id: TimelineId, progress: f32) -> bool {
        match self.timelines.get_mut(&id) {
            Some(timeline) => {
                timeline.set_progress(progress);
                true
            }
            None => false,
        }
    }

    /// 推进所有时间线
    ///
    /// # 返回
    /// 返回产生的事件列表
    pub fn update(&mut self, dt: f32, target: &mut dyn Animatable) -> Vec<AnimationEvent> {
        let mut ids: Vec<TimelineId> = self.timelines.keys().copied().collect();
        ids.sort();

        let mut finished = Vec::new();
        for id in ids {
            let Some(timeline) = self.timelines.get_mut(&id) else {
                continue;
            };
            let step = timeline.update(dt);
            if timeline.needs_render() {
                timeline.render(target);
            }
            match step {
                TimelineStep::Repeated => self.events.push(AnimationEvent::Repeated(id)),
                TimelineStep::Completed => {
                    self.events.push(AnimationEvent::Completed(id));
                    if timeline.auto_kill() {
                        finished.push(id);
                    }
                }
                TimelineStep::Idle | TimelineStep::Advanced => {}
            }
        }

        for id in finished {
            self.timelines.remove(&id);
            self.owners.retain(|_, owned| *owned != id);
        }

        // 返回并清空事件队列
        std::mem::take(&mut self.events)
    }

    /// 移除所有时间线
    pub fn clear(&mut self, mode: KillMode, target: &mut dyn Animatable) {
        let mut ids: Vec<TimelineId> = self.timelines.keys().copied().collect();
        ids.sort();
        for id in ids {
            self.kill(id, mode, target);
        }
        self.owners.clear();
        self.events.clear();
    }

    // ========== 查询方法 ==========

    pub fn get(&self, id: TimelineId) -> Option<&Timeline> {
        self.timelines.get(&id)
    }

    pub fn contains(&self, id: TimelineId) -> bool {
        self.timelines.contains_key(&id)
    }

    /// owner 节点上最近插入的时间线
    pub fn timeline_of(&self, owner: NodeId) -> Option<TimelineId> {
        self.owners
            .iter()
            .filter(|((node, _), _)| *node == owner)
            .map(|(_, id)| *id)
            .max()
    }

    /// 驱动某个通道的时间线
    pub fn timeline_for(&self, owner: NodeId, prop: Prop) -> Option<TimelineId> {
        self.owners.get(&(owner, prop)).copied()
    }

    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }

    /// 正在播放的时间线数量
    pub fn active_count(&self) -> usize {
        self.timelines.values().filter(|t| t.is_playing()).count()
    }
}
