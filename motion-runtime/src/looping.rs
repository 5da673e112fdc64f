//! # Looping 模块
//!
//! 两行文字循环换位。
//!
//! 一条无限循环的时间线，每轮：
//!
//! ```text
//! 0s ─── 4s ───────────── 10s ─────────── 结束 ── 间隔 1s ──┐
//!        B 进入 / A 退出      A 返回 / B 退出                 │
//! ◀──────────────────────────────────────────────────────────┘
//! ```
//!
//! 可选的开场效果作用于 A，只在第一轮播放，在第一次换位之前结束。

use tracing::info;

use crate::animation::{AnimationSystem, KillMode, Repeat, Timeline, TimelineId};
use crate::dom::{Document, NodeId};
use crate::effects::{EffectKind, MotionDescriptorBuilder, defaults};

/// 当前所处的换位阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// 第一次换位之前，或两轮之间的间隔
    Idle,
    /// B 正在进入
    Entering,
    /// B 停留
    Holding,
    /// A 返回、B 退出
    Exiting,
}

/// 循环换字
#[derive(Debug)]
pub struct LoopingTextSwapper {
    text_a: Vec<NodeId>,
    text_b: Vec<NodeId>,
    timeline: Option<TimelineId>,
    /// B 全部进入完毕的时间
    enter_end: f32,
    /// 第二次换位开始的时间
    exit_start: f32,
}

impl LoopingTextSwapper {
    /// 构建循环时间线并开始播放
    ///
    /// `text_a` / `text_b` 为两行文字拆分后的字符节点。
    pub fn start(
        doc: &mut Document,
        animations: &mut AnimationSystem,
        text_a: Vec<NodeId>,
        text_b: Vec<NodeId>,
    ) -> Self {
        Self::start_with_intro(doc, animations, text_a, text_b, None)
    }

    /// 同 [`start`](Self::start)，A 先以 `intro` 效果入场
    pub fn start_with_intro(
        doc: &mut Document,
        animations: &mut AnimationSystem,
        text_a: Vec<NodeId>,
        text_b: Vec<NodeId>,
        intro: Option<EffectKind>,
    ) -> Self {
        let first = defaults::SWAP_DELAY;
        let second = defaults::SWAP_DELAY * 2.0 + 1.0;

        let mut timeline =
            Timeline::new().with_repeat(Repeat::Infinite, defaults::SWAP_REPEAT_DELAY);
        let segment = |kind: EffectKind, nodes: &[NodeId], delay: f32| {
            MotionDescriptorBuilder::new(kind)
                .nodes(nodes.to_vec())
                .delay(delay)
                .build()
        };
        if let Some(kind) = intro {
            MotionDescriptorBuilder::new(kind)
                .nodes(text_a.clone())
                .build()
                .append_lead_in_to(&mut timeline, &text_a, 0.0);
        }
        segment(EffectKind::SwapEnter, &text_b, first).append_to(&mut timeline, &text_b, 0.0);
        segment(EffectKind::SwapReturn, &text_a, second).append_to(&mut timeline, &text_a, 1.0);
        segment(EffectKind::SwapExit, &text_a, first).append_to(&mut timeline, &text_a, 0.0);
        segment(EffectKind::SwapExit, &text_b, second).append_to(&mut timeline, &text_b, 1.0);

        let stagger_span = |count: usize| count.saturating_sub(1) as f32 * defaults::SWAP_STAGGER;
        let enter_end = first + stagger_span(text_b.len()) + defaults::SWAP_DURATION;
        let exit_start = 1.0 + second;

        let owners: Vec<NodeId> = text_a.iter().chain(text_b.iter()).copied().collect();
        let id = animations.insert(&owners, timeline.playing(), KillMode::Freeze, doc);
        info!(
            timeline = %id,
            a = text_a.len(),
            b = text_b.len(),
            intro = intro.map(|kind| kind.name()),
            "循环换字开始"
        );

        Self {
            text_a,
            text_b,
            timeline: Some(id),
            enter_end,
            exit_start,
        }
    }

    /// 由时间线位置推导当前阶段
    pub fn phase(&self, animations: &AnimationSystem) -> LoopPhase {
        let Some(timeline) = self.timeline.and_then(|id| animations.get(id)) else {
            return LoopPhase::Idle;
        };
        if timeline.is_waiting() {
            return LoopPhase::Idle;
        }
        let time = timeline.time();
        if time < defaults::SWAP_DELAY {
            LoopPhase::Idle
        } else if time < self.enter_end {
            LoopPhase::Entering
        } else if time < self.exit_start {
            LoopPhase::Holding
        } else {
            LoopPhase::Exiting
        }
    }

    pub fn timeline(&self) -> Option<TimelineId> {
        self.timeline
    }

    pub fn text_a(&self) -> &[NodeId] {
        &self.text_a
    }

    pub fn text_b(&self) -> &[NodeId] {
        &self.text_b
    }

    pub fn is_running(&self) -> bool {
        self.timeline.is_some()
    }

    /// 停止循环，节点保持当前状态；可重复调用
    pub fn teardown(&mut self, doc: &mut Document, animations: &mut AnimationSystem) {
        if let Some(id) = self.timeline.take() {
            animations.kill(id, KillMode::Freeze, doc);
            info!(timeline = %id, "循环换字停止");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Animatable, Prop};
    use crate::splitter::{SplitUnit, TextSplitter};

    fn setup() -> (Document, AnimationSystem, LoopingTextSwapper) {
        setup_with(None)
    }

    fn setup_with(intro: Option<EffectKind>) -> (Document, AnimationSystem, LoopingTextSwapper) {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append_element(root, "h2", &[], Some("DEV")).unwrap();
        let b = doc.append_element(root, "h2", &[], Some("OPS")).unwrap();
        let a_split = TextSplitter::split(&mut doc, a, SplitUnit::Chars).unwrap();
        let b_split = TextSplitter::split(&mut doc, b, SplitUnit::Chars).unwrap();

        let mut animations = AnimationSystem::new();
        let swapper = LoopingTextSwapper::start_with_intro(
            &mut doc,
            &mut animations,
            a_split.nodes(),
            b_split.nodes(),
            intro,
        );
        (doc, animations, swapper)
    }

    fn advance(doc: &mut Document, animations: &mut AnimationSystem, seconds: f32) {
        let steps = (seconds / 0.05).round() as usize;
        for _ in 0..steps {
            animations.update(0.05, doc);
        }
    }

    #[test]
    fn test_initial_state() {
        let (doc, animations, swapper) = setup();
        assert_eq!(swapper.phase(&animations), LoopPhase::Idle);

        let b0 = swapper.text_b()[0];
        let a0 = swapper.text_a()[0];
        assert_eq!(doc.get_property(b0, Prop::Opacity), Some(0.0));
        assert_eq!(doc.get_property(b0, Prop::Y), Some(80.0));
        assert_eq!(doc.get_property(a0, Prop::Y), Some(0.0));
    }

    #[test]
    fn test_phases_follow_timeline() {
        let (mut doc, mut animations, swapper) = setup();

        advance(&mut doc, &mut animations, 4.5);
        assert_eq!(swapper.phase(&animations), LoopPhase::Entering);

        advance(&mut doc, &mut animations, 3.0);
        assert_eq!(swapper.phase(&animations), LoopPhase::Holding);
        let b0 = swapper.text_b()[0];
        let a0 = swapper.text_a()[0];
        assert!((doc.get_property(b0, Prop::Y).unwrap()).abs() < 1e-3);
        assert!((doc.get_property(a0, Prop::Y).unwrap() + 80.0).abs() < 1e-3);

        advance(&mut doc, &mut animations, 3.0);
        assert_eq!(swapper.phase(&animations), LoopPhase::Exiting);
    }

    #[test]
    fn test_cycle_repeats_after_delay() {
        let (mut doc, mut animations, swapper) = setup();
        let a0 = swapper.text_a()[0];
        let b0 = swapper.text_b()[0];

        // 一轮结束后的间隔：A 回到原位，B 已退出
        advance(&mut doc, &mut animations, 11.9);
        let timeline = animations.get(swapper.timeline().unwrap()).unwrap();
        assert!(timeline.is_waiting());
        assert_eq!(swapper.phase(&animations), LoopPhase::Idle);
        assert!(doc.get_property(a0, Prop::Y).unwrap().abs() < 1e-3);
        assert!((doc.get_property(b0, Prop::Y).unwrap() + 80.0).abs() < 1e-3);

        // 下一轮从头开始
        advance(&mut doc, &mut animations, 1.0);
        let timeline = animations.get(swapper.timeline().unwrap()).unwrap();
        assert_eq!(timeline.iteration(), 1);
        assert!(timeline.is_playing());
        assert_eq!(doc.get_property(b0, Prop::Y), Some(80.0));
        assert_eq!(doc.get_property(b0, Prop::Opacity), Some(0.0));
    }

    #[test]
    fn test_intro_plays_before_first_swap_only() {
        let (mut doc, mut animations, swapper) = setup_with(Some(EffectKind::LandingIntro));
        let a0 = swapper.text_a()[0];
        assert_eq!(doc.get_property(a0, Prop::Opacity), Some(0.0));
        assert_eq!(doc.get_property(a0, Prop::Y), Some(80.0));
        assert_eq!(doc.get_property(a0, Prop::Blur), Some(5.0));

        // 开场结束，第一次换位尚未开始
        advance(&mut doc, &mut animations, 3.0);
        assert_eq!(swapper.phase(&animations), LoopPhase::Idle);
        assert_eq!(doc.get_property(a0, Prop::Opacity), Some(1.0));
        assert!(doc.get_property(a0, Prop::Y).unwrap().abs() < 1e-3);
        assert_eq!(doc.get_property(a0, Prop::Blur), Some(0.0));

        // 第二轮开始时 A 保持可见
        advance(&mut doc, &mut animations, 10.0);
        let timeline = animations.get(swapper.timeline().unwrap()).unwrap();
        assert_eq!(timeline.iteration(), 1);
        assert!(timeline.is_playing());
        assert_eq!(doc.get_property(a0, Prop::Opacity), Some(1.0));
        assert!(doc.get_property(a0, Prop::Y).unwrap().abs() < 1e-3);
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let (mut doc, mut animations, mut swapper) = setup();
        swapper.teardown(&mut doc, &mut animations);
        swapper.teardown(&mut doc, &mut animations);
        assert!(!swapper.is_running());
        assert!(animations.is_empty());
        assert_eq!(swapper.phase(&animations), LoopPhase::Idle);
    }
}
