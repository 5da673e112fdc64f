//! # Timeline 模块
//!
//! 时间线：一组按起始时间排布的属性轨道，统一播放、暂停、反向与重复。
//!
//! 核心设计：时间线只推进本地时间并计算属性值，写入通过 [`Animatable`] 完成，
//! 不假设目标类型。

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::{Animatable, EasingFunction, Prop};
use crate::dom::NodeId;

/// 时间线 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimelineId(pub(crate) u64);

impl TimelineId {
    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimelineId({})", self.0)
    }
}

/// 重复次数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repeat {
    /// 只播放一遍
    #[default]
    Once,
    /// 播放后再额外重复 n 次
    Count(u32),
    /// 无限循环
    Infinite,
}

/// 播放状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Paused,
    Playing,
    /// 正向到达终点，或反向回到起点
    Completed,
}

/// 播放方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

/// 单次 `update` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineStep {
    /// 未播放
    Idle,
    Advanced,
    /// 进入了新一轮循环
    Repeated,
    Completed,
}

/// 时间线控制动作
///
/// 滚动触发器的 toggle actions 由四个此类动作组成。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlAction {
    Play,
    Pause,
    Resume,
    Reverse,
    Restart,
    /// 回到起点并暂停
    Reset,
    /// 跳到终点
    Complete,
    #[default]
    None,
}

impl ControlAction {
    pub fn name(&self) -> &'static str {
        match self {
            ControlAction::Play => "play",
            ControlAction::Pause => "pause",
            ControlAction::Resume => "resume",
            ControlAction::Reverse => "reverse",
            ControlAction::Restart => "restart",
            ControlAction::Reset => "reset",
            ControlAction::Complete => "complete",
            ControlAction::None => "none",
        }
    }
}

impl FromStr for ControlAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "play" => Ok(ControlAction::Play),
            "pause" => Ok(ControlAction::Pause),
            "resume" => Ok(ControlAction::Resume),
            "reverse" => Ok(ControlAction::Reverse),
            "restart" => Ok(ControlAction::Restart),
            "reset" => Ok(ControlAction::Reset),
            "complete" => Ok(ControlAction::Complete),
            "none" => Ok(ControlAction::None),
            _ => Err(()),
        }
    }
}

/// 属性轨道
///
/// `from` 为 `None` 表示 "to" 补间：首次渲染时从同属性的前一条轨道的终值，
/// 或目标的当前值中取得。
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub node: NodeId,
    pub prop: Prop,
    pub from: Option<f32>,
    pub to: f32,
    /// 在时间线内的起始时间（秒）
    pub start: f32,
    pub duration: f32,
    pub easing: EasingFunction,
    /// 只在第一轮渲染（循环时间线的开场）
    pub lead_in: bool,
}

impl Track {
    pub fn new(node: NodeId, prop: Prop, from: Option<f32>, to: f32) -> Self {
        Self {
            node,
            prop,
            from,
            to,
            start: 0.0,
            duration: 0.0,
            easing: EasingFunction::Linear,
            lead_in: false,
        }
    }

    pub fn at(mut self, start: f32, duration: f32) -> Self {
        self.start = start.max(0.0);
        self.duration = duration.max(0.0);
        self
    }

    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    pub fn as_lead_in(mut self) -> Self {
        self.lead_in = true;
        self
    }

    pub fn end(&self) -> f32 {
        self.start + self.duration
    }

    fn value_at(&self, time: f32, from: f32) -> f32 {
        let t = if self.duration <= 0.0 {
            1.0
        } else {
            ((time - self.start) / self.duration).clamp(0.0, 1.0)
        };
        from + (self.to - from) * self.easing.apply(t)
    }
}

/// 时间线
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    tracks: Vec<Track>,
    duration: f32,
    repeat: Repeat,
    repeat_delay: f32,
    /// 本地时间（秒），范围 `[0, duration]`
    time: f32,
    /// 已完成的循环轮数
    iteration: u32,
    /// 剩余的循环间隔
    waiting: f32,
    direction: Direction,
    state: PlayState,
    /// 完成后由系统自动移除
    auto_kill: bool,
    dirty: bool,
}

impl Timeline {
    /// 创建暂停状态的空时间线
    pub fn new() -> Self {
        Self {
            dirty: true,
            ..Self::default()
        }
    }

    pub fn with_repeat(mut self, repeat: Repeat, repeat_delay: f32) -> Self {
        self.repeat = repeat;
        self.repeat_delay = repeat_delay.max(0.0);
        self
    }

    /// 完成后自动从系统中移除（一次性补间）
    pub fn with_auto_kill(mut self) -> Self {
        self.auto_kill = true;
        self
    }

    /// 创建后立即播放
    pub fn playing(mut self) -> Self {
        self.play();
        self
    }

    pub fn add_track(&mut self, track: Track) {
        self.duration = self.duration.max(track.end());
        self.tracks.push(track);
        self.dirty = true;
    }

    // ========== 查询 ==========

    /// 单轮时长（不含循环间隔）
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// 单轮进度 (0.0 - 1.0)
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return if self.state == PlayState::Completed { 1.0 } else { 0.0 };
        }
        (self.time / self.duration).clamp(0.0, 1.0)
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn is_completed(&self) -> bool {
        self.state == PlayState::Completed
    }

    /// 是否处于循环间隔中
    pub fn is_waiting(&self) -> bool {
        self.waiting > 0.0
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn repeat(&self) -> Repeat {
        self.repeat
    }

    pub fn auto_kill(&self) -> bool {
        self.auto_kill
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// 涉及的节点（去重，保持首次出现顺序）
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = Vec::new();
        for track in &self.tracks {
            if !out.contains(&track.node) {
                out.push(track.node);
            }
        }
        out
    }

    /// 播放中或控制后尚未渲染
    pub fn needs_render(&self) -> bool {
        self.dirty || self.state == PlayState::Playing
    }

    fn has_repeats_left(&self) -> bool {
        match self.repeat {
            Repeat::Once => false,
            Repeat::Count(n) => self.iteration < n,
            Repeat::Infinite => true,
        }
    }

    // ========== 控制 ==========

    /// 从当前位置正向播放
    pub fn play(&mut self) {
        self.direction = Direction::Forward;
        self.state = if self.duration > 0.0 && self.time >= self.duration && !self.has_repeats_left()
        {
            PlayState::Completed
        } else {
            PlayState::Playing
        };
        self.dirty = true;
    }

    pub fn pause(&mut self) {
        if self.state == PlayState::Playing {
            self.state = PlayState::Paused;
        }
    }

    /// 按暂停前的方向继续
    pub fn resume(&mut self) {
        if self.state == PlayState::Paused {
            self.state = PlayState::Playing;
        }
    }

    /// 从当前位置反向播放
    pub fn reverse(&mut self) {
        self.direction = Direction::Reverse;
        self.waiting = 0.0;
        self.state = if self.time <= 0.0 {
            PlayState::Completed
        } else {
            PlayState::Playing
        };
        self.dirty = true;
    }

    pub fn restart(&mut self) {
        self.rewind();
        self.state = PlayState::Playing;
    }

    pub fn reset(&mut self) {
        self.rewind();
        self.state = PlayState::Paused;
    }

    /// 跳到终点并停止
    pub fn complete(&mut self) {
        self.time = self.duration;
        self.waiting = 0.0;
        self.direction = Direction::Forward;
        self.state = PlayState::Completed;
        self.dirty = true;
    }

    /// 跳到指定时间，不改变播放状态
    pub fn seek(&mut self, time: f32) {
        self.time = time.clamp(0.0, self.duration);
        self.waiting = 0.0;
        self.dirty = true;
    }

    pub fn set_progress(&mut self, progress: f32) {
        self.seek(progress.clamp(0.0, 1.0) * self.duration);
    }

    pub fn apply(&mut self, action: ControlAction) {
        match action {
            ControlAction::Play => self.play(),
            ControlAction::Pause => self.pause(),
            ControlAction::Resume => self.resume(),
            ControlAction::Reverse => self.reverse(),
            ControlAction::Restart => self.restart(),
            ControlAction::Reset => self.reset(),
            ControlAction::Complete => self.complete(),
            ControlAction::None => {}
        }
    }

    fn rewind(&mut self) {
        self.time = 0.0;
        self.iteration = 0;
        self.waiting = 0.0;
        self.direction = Direction::Forward;
        self.dirty = true;
    }

    // ========== 推进 ==========

    /// 推进本地时间
    pub fn update(&mut self, dt: f32) -> TimelineStep {
        if self.state != PlayState::Playing {
            return TimelineStep::Idle;
        }
        if self.duration <= 0.0 {
            self.time = 0.0;
            self.state = PlayState::Completed;
            self.dirty = true;
            return TimelineStep::Completed;
        }
        match self.direction {
            Direction::Forward => self.advance_forward(dt.max(0.0)),
            Direction::Reverse => {
                self.time -= dt.max(0.0);
                if self.time <= 0.0 {
                    self.time = 0.0;
                    self.state = PlayState::Completed;
                    self.dirty = true;
                    TimelineStep::Completed
                } else {
                    TimelineStep::Advanced
                }
            }
        }
    }

    fn advance_forward(&mut self, dt: f32) -> TimelineStep {
        let mut remaining = dt;
        let mut step = TimelineStep::Advanced;
        loop {
            if self.waiting > 0.0 {
                if remaining < self.waiting {
                    self.waiting -= remaining;
                    return step;
                }
                remaining -= self.waiting;
                self.waiting = 0.0;
                self.time = 0.0;
            }

            let room = self.duration - self.time;
            if remaining < room {
                self.time += remaining;
                return step;
            }
            remaining -= room;

            if !self.has_repeats_left() {
                self.time = self.duration;
                self.state = PlayState::Completed;
                self.dirty = true;
                return TimelineStep::Completed;
            }

            self.iteration += 1;
            step = TimelineStep::Repeated;
            if self.repeat_delay > 0.0 {
                // 间隔期间停在终态
                self.time = self.duration;
                self.waiting = self.repeat_delay;
            } else {
                self.time = 0.0;
            }
            if remaining <= 0.0 {
                return step;
            }
        }
    }

    // ========== 渲染 ==========

    /// 把当前时间对应的属性值写入目标
    ///
    /// 每个 (节点, 属性) 取起始时间不晚于当前时间的最后一条轨道；
    /// 尚无轨道开始时取最早轨道的起始值。已移除的节点被跳过，
    /// 开场轨道从第二轮起不再参与。
    ///
    /// # 返回
    /// 实际写入的属性数
    pub fn render(&mut self, target: &mut dyn Animatable) -> usize {
        self.capture(&*target);
        self.dirty = false;

        let mut chosen: BTreeMap<(NodeId, Prop), (usize, bool)> = BTreeMap::new();
        for (index, track) in self.tracks.iter().enumerate() {
            if track.lead_in && self.iteration > 0 {
                continue;
            }
            let started = track.start <= self.time;
            let key = (track.node, track.prop);
            match chosen.get_mut(&key) {
                None => {
                    chosen.insert(key, (index, started));
                }
                Some(entry) => {
                    let current = &self.tracks[entry.0];
                    let replace = if started {
                        !entry.1 || current.start <= track.start
                    } else {
                        !entry.1 && track.start < current.start
                    };
                    if replace {
                        *entry = (index, started);
                    }
                }
            }
        }

        let mut written = 0;
        for ((node, prop), (index, started)) in chosen {
            let track = &self.tracks[index];
            let Some(from) = track.from else {
                continue;
            };
            let value = if started {
                track.value_at(self.time, from)
            } else {
                from
            };
            if target.set_property(node, prop, value) {
                written += 1;
            }
        }
        written
    }

    /// 为 "to" 轨道确定起始值
    fn capture(&mut self, target: &dyn Animatable) {
        for index in 0..self.tracks.len() {
            if self.tracks[index].from.is_some() {
                continue;
            }
            let track = &self.tracks[index];
            let previous = self.tracks[..index]
                .iter()
                .filter(|t| t.node == track.node && t.prop == track.prop && t.start <= track.start)
                .max_by(|a, b| a.start.total_cmp(&b.start))
                .map(|t| t.to);
            let value = previous.or_else(|| target.get_property(track.node, track.prop));
            self.tracks[index].from = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    fn doc_with_node() -> (Document, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let node = doc.append_element(root, "span", &[], Some("a")).unwrap();
        (doc, node)
    }

    fn fade(node: NodeId, duration: f32) -> Timeline {
        let mut tl = Timeline::new();
        tl.add_track(Track::new(node, Prop::Opacity, Some(0.0), 1.0).at(0.0, duration));
        tl
    }

    #[test]
    fn test_paused_timeline_renders_from_state() {
        let (mut doc, node) = doc_with_node();
        let mut tl = fade(node, 1.0);

        assert_eq!(tl.state(), PlayState::Paused);
        tl.render(&mut doc);
        assert_eq!(doc.get_property(node, Prop::Opacity), Some(0.0));
        assert_eq!(tl.update(0.5), TimelineStep::Idle);
    }

    #[test]
    fn test_play_to_completion() {
        let (mut doc, node) = doc_with_node();
        let mut tl = fade(node, 1.0).playing();

        assert_eq!(tl.update(0.5), TimelineStep::Advanced);
        tl.render(&mut doc);
        assert_eq!(doc.get_property(node, Prop::Opacity), Some(0.5));

        assert_eq!(tl.update(0.6), TimelineStep::Completed);
        tl.render(&mut doc);
        assert_eq!(doc.get_property(node, Prop::Opacity), Some(1.0));
        assert!(tl.is_completed());
        assert_eq!(tl.progress(), 1.0);
    }

    #[test]
    fn test_reverse_continues_from_current_position() {
        let (mut doc, node) = doc_with_node();
        let mut tl = fade(node, 1.0).playing();
        tl.update(0.5);

        tl.reverse();
        assert!(tl.is_playing());
        assert!((tl.time() - 0.5).abs() < 1e-6);

        tl.update(0.2);
        assert!((tl.time() - 0.3).abs() < 1e-6);

        assert_eq!(tl.update(1.0), TimelineStep::Completed);
        tl.render(&mut doc);
        assert_eq!(doc.get_property(node, Prop::Opacity), Some(0.0));
    }

    #[test]
    fn test_reverse_at_start_is_noop() {
        let (_, node) = doc_with_node();
        let mut tl = fade(node, 1.0);
        tl.reverse();
        assert_eq!(tl.time(), 0.0);
        assert!(!tl.is_playing());

        tl.play();
        assert!(tl.is_playing());
    }

    #[test]
    fn test_pause_and_resume_keep_direction() {
        let (_, node) = doc_with_node();
        let mut tl = fade(node, 1.0).playing();
        tl.update(0.6);
        tl.reverse();
        tl.pause();
        assert_eq!(tl.update(0.1), TimelineStep::Idle);

        tl.resume();
        tl.update(0.1);
        assert_eq!(tl.direction(), Direction::Reverse);
        assert!((tl.time() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_to_track_captures_current_value() {
        let (mut doc, node) = doc_with_node();
        doc.set_property(node, Prop::Scale, 1.5);

        let mut tl = Timeline::new();
        tl.add_track(Track::new(node, Prop::Scale, None, 0.0).at(0.0, 1.0));
        tl.play();
        tl.update(0.5);
        tl.render(&mut doc);

        assert_eq!(tl.tracks()[0].from, Some(1.5));
        assert_eq!(doc.get_property(node, Prop::Scale), Some(0.75));
    }

    #[test]
    fn test_sequenced_tracks_chain_values() {
        let (mut doc, node) = doc_with_node();
        let mut tl = Timeline::new();
        tl.add_track(Track::new(node, Prop::Y, Some(80.0), 0.0).at(1.0, 1.0));
        tl.add_track(Track::new(node, Prop::Y, None, -80.0).at(3.0, 1.0));

        tl.render(&mut doc);
        assert_eq!(doc.get_property(node, Prop::Y), Some(80.0));
        assert_eq!(tl.tracks()[1].from, Some(0.0));

        tl.seek(2.5);
        tl.render(&mut doc);
        assert_eq!(doc.get_property(node, Prop::Y), Some(0.0));

        tl.seek(4.0);
        tl.render(&mut doc);
        assert_eq!(doc.get_property(node, Prop::Y), Some(-80.0));
    }

    #[test]
    fn test_repeat_with_delay() {
        let (_, node) = doc_with_node();
        let mut tl = fade(node, 1.0).with_repeat(Repeat::Infinite, 1.0).playing();

        assert_eq!(tl.update(1.0), TimelineStep::Repeated);
        assert!(tl.is_waiting());
        assert_eq!(tl.time(), 1.0);

        tl.update(0.5);
        assert!(tl.is_waiting());

        tl.update(0.75);
        assert!(!tl.is_waiting());
        assert!((tl.time() - 0.25).abs() < 1e-5);
        assert_eq!(tl.iteration(), 1);
        assert!(tl.is_playing());
    }

    #[test]
    fn test_repeat_count() {
        let (_, node) = doc_with_node();
        let mut tl = fade(node, 1.0).with_repeat(Repeat::Count(1), 0.0).playing();

        assert_eq!(tl.update(1.0), TimelineStep::Repeated);
        assert_eq!(tl.update(1.0), TimelineStep::Completed);
        assert_eq!(tl.iteration(), 1);
    }

    #[test]
    fn test_complete_and_reset() {
        let (mut doc, node) = doc_with_node();
        let mut tl = fade(node, 1.0);

        tl.complete();
        tl.render(&mut doc);
        assert_eq!(doc.get_property(node, Prop::Opacity), Some(1.0));

        tl.reset();
        assert_eq!(tl.state(), PlayState::Paused);
        tl.render(&mut doc);
        assert_eq!(doc.get_property(node, Prop::Opacity), Some(0.0));
    }

    #[test]
    fn test_lead_in_renders_first_cycle_only() {
        let (mut doc, node) = doc_with_node();
        let mut tl = Timeline::new().with_repeat(Repeat::Infinite, 0.0);
        tl.add_track(
            Track::new(node, Prop::Opacity, Some(0.0), 1.0)
                .at(0.0, 0.5)
                .as_lead_in(),
        );
        tl.add_track(Track::new(node, Prop::Y, Some(0.0), 10.0).at(1.0, 1.0));
        let mut tl = tl.playing();

        tl.render(&mut doc);
        assert_eq!(doc.get_property(node, Prop::Opacity), Some(0.0));
        tl.update(0.5);
        tl.render(&mut doc);
        assert_eq!(doc.get_property(node, Prop::Opacity), Some(1.0));

        // 第二轮开始时开场轨道不再把透明度拉回 0
        assert_eq!(tl.update(1.75), TimelineStep::Repeated);
        tl.render(&mut doc);
        assert_eq!(tl.iteration(), 1);
        assert_eq!(doc.get_property(node, Prop::Opacity), Some(1.0));
        assert_eq!(doc.get_property(node, Prop::Y), Some(0.0));
    }

    #[test]
    fn test_render_skips_removed_nodes() {
        let (mut doc, node) = doc_with_node();
        let mut tl = fade(node, 1.0);
        doc.remove(node);
        assert_eq!(tl.render(&mut doc), 0);
    }

    #[test]
    fn test_control_action_parse() {
        assert_eq!("play".parse(), Ok(ControlAction::Play));
        assert_eq!("none".parse(), Ok(ControlAction::None));
        assert!("jump".parse::<ControlAction>().is_err());
        assert_eq!(ControlAction::Reverse.name(), "reverse");
    }
}
