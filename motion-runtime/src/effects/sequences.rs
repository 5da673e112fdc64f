//! # Sequences
//!
//! 由多段效果组合而成的时间线：页面过渡与字符特效。
//!
//! 这里只构建暂停状态的 [`Timeline`]；插入 `AnimationSystem` 与播放由调用方决定。

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::builder::{MotionDescriptorBuilder, MotionOptions};
use super::registry::{EffectKind, SlideDirection, defaults};
use crate::animation::{Prop, Repeat, Timeline};
use crate::dom::NodeId;

/// 页面过渡
///
/// `content` 为页面主体节点；`Curtain` 与 `Loading` 另需一个覆盖层节点。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageTransition {
    Enter,
    Exit,
    Fade,
    /// 从一侧整屏滑入，`distance` 通常取视口宽度或高度
    Slide {
        direction: SlideDirection,
        distance: f32,
    },
    /// 覆盖层展开后收起
    Curtain,
    Reveal,
    /// 覆盖层淡出，主体随后入场
    Loading,
}

impl PageTransition {
    pub fn name(&self) -> &'static str {
        match self {
            PageTransition::Enter => "enter",
            PageTransition::Exit => "exit",
            PageTransition::Fade => "fade",
            PageTransition::Slide { .. } => "slide",
            PageTransition::Curtain => "curtain",
            PageTransition::Reveal => "reveal",
            PageTransition::Loading => "loading",
        }
    }

    /// 是否需要覆盖层节点
    pub fn uses_overlay(&self) -> bool {
        matches!(self, PageTransition::Curtain | PageTransition::Loading)
    }

    /// 构建过渡时间线
    pub fn timeline(&self, content: &[NodeId], overlay: &[NodeId]) -> Timeline {
        let mut timeline = Timeline::new();
        let append = |timeline: &mut Timeline, kind: EffectKind, nodes: &[NodeId], at: f32| {
            MotionDescriptorBuilder::new(kind)
                .nodes(nodes.to_vec())
                .build()
                .append_to(timeline, nodes, at);
        };

        match *self {
            PageTransition::Enter => append(&mut timeline, EffectKind::PageEnter, content, 0.0),
            PageTransition::Exit => append(&mut timeline, EffectKind::PageExit, content, 0.0),
            PageTransition::Fade => append(&mut timeline, EffectKind::PageFade, content, 0.0),
            PageTransition::Slide {
                direction,
                distance,
            } => {
                MotionDescriptorBuilder::new(EffectKind::PageSlide(direction))
                    .nodes(content.to_vec())
                    .options(MotionOptions {
                        distance: Some(distance),
                        ..Default::default()
                    })
                    .build()
                    .append_to(&mut timeline, content, 0.0);
            }
            PageTransition::Curtain => {
                append(&mut timeline, EffectKind::CurtainIn, overlay, 0.0);
                append(
                    &mut timeline,
                    EffectKind::CurtainOut,
                    overlay,
                    defaults::CURTAIN_DURATION / 2.0,
                );
            }
            PageTransition::Reveal => append(&mut timeline, EffectKind::RevealClip, content, 0.0),
            PageTransition::Loading => {
                append(&mut timeline, EffectKind::LoadingFade, overlay, 0.0);
                append(
                    &mut timeline,
                    EffectKind::LoadingContent,
                    content,
                    defaults::LOADING_FADE_DURATION - defaults::LOADING_OVERLAP,
                );
            }
        }
        timeline
    }
}

/// 故障闪现：每个字符从随机偏移处出现
///
/// 第 i 个字符在 `i * GLITCH_STAGGER` 开始，偏移在 `[-intensity, intensity]` 内均匀取值。
pub fn glitch(chars: &[NodeId], intensity: f32, rng: &mut impl Rng) -> Timeline {
    let intensity = intensity.abs();
    let mut timeline = Timeline::new();
    for (index, node) in chars.iter().enumerate() {
        let x = rng.gen_range(-intensity..=intensity);
        let y = rng.gen_range(-intensity..=intensity);
        MotionDescriptorBuilder::new(EffectKind::Glitch)
            .nodes(vec![*node])
            .options(MotionOptions {
                x: Some(x),
                y: Some(y),
                ..Default::default()
            })
            .build()
            .append_to(
                &mut timeline,
                &[*node],
                index as f32 * defaults::GLITCH_STAGGER,
            );
    }
    timeline
}

/// 波浪：字符依次上扬 `amplitude` 再回落
///
/// 回落段从 `max(上扬错开总长, WAVE_DURATION / 2)` 起，每个字符的回落不早于自己的上扬结束。
pub fn wave(chars: &[NodeId], amplitude: f32, repeat: Repeat) -> Timeline {
    let half = defaults::WAVE_DURATION / 2.0;
    let rise_span = chars.len().saturating_sub(1) as f32 * defaults::WAVE_STAGGER;

    let mut timeline = Timeline::new().with_repeat(repeat, 0.0);
    MotionDescriptorBuilder::new(EffectKind::WaveRise)
        .nodes(chars.to_vec())
        .to(Prop::Y, -amplitude)
        .build()
        .append_to(&mut timeline, chars, 0.0);
    MotionDescriptorBuilder::new(EffectKind::WaveFall)
        .nodes(chars.to_vec())
        .build()
        .append_to(&mut timeline, chars, rise_span.max(half));
    timeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Animatable, AnimationSystem, KillMode};
    use crate::dom::Document;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn chars(count: usize) -> (Document, Vec<NodeId>) {
        let mut doc = Document::new();
        let root = doc.root();
        let nodes = (0..count)
            .map(|_| doc.append_element(root, "span", &[], Some("x")).unwrap())
            .collect();
        (doc, nodes)
    }

    fn run(doc: &mut Document, timeline: Timeline, owners: &[NodeId], seconds: f32) {
        let mut animations = AnimationSystem::new();
        animations.insert(owners, timeline.playing(), KillMode::Freeze, doc);
        let steps = (seconds / 0.05).round() as usize;
        for _ in 0..steps {
            animations.update(0.05, doc);
        }
    }

    #[test]
    fn test_curtain_opens_then_closes() {
        let (mut doc, nodes) = chars(1);
        let overlay = nodes[0];
        let timeline = PageTransition::Curtain.timeline(&[], &[overlay]);
        assert_eq!(timeline.duration(), 1.0);

        let mut animations = AnimationSystem::new();
        animations.insert(&[overlay], timeline.playing(), KillMode::Freeze, &mut doc);
        assert_eq!(doc.get_property(overlay, Prop::ScaleY), Some(0.0));
        for _ in 0..10 {
            animations.update(0.05, &mut doc);
        }
        assert!((doc.get_property(overlay, Prop::ScaleY).unwrap() - 1.0).abs() < 1e-4);
        for _ in 0..12 {
            animations.update(0.05, &mut doc);
        }
        assert_eq!(doc.get_property(overlay, Prop::ScaleY), Some(0.0));
    }

    #[test]
    fn test_loading_overlaps_content_entry() {
        let (mut doc, nodes) = chars(2);
        let (overlay, content) = (nodes[0], nodes[1]);
        let timeline = PageTransition::Loading.timeline(&[content], &[overlay]);

        let starts: Vec<(NodeId, f32)> = timeline.tracks().iter().map(|t| (t.node, t.start)).collect();
        assert!(starts.contains(&(overlay, 0.0)));
        assert!(starts.iter().any(|(n, s)| *n == content && (*s - 0.2).abs() < 1e-6));

        run(&mut doc, timeline, &nodes, 1.2);
        assert_eq!(doc.get_property(overlay, Prop::Opacity), Some(0.0));
        assert_eq!(doc.get_property(content, Prop::Opacity), Some(1.0));
        assert_eq!(doc.get_property(content, Prop::Y), Some(0.0));
    }

    #[test]
    fn test_slide_starts_off_screen() {
        let (mut doc, nodes) = chars(1);
        let transition = PageTransition::Slide {
            direction: SlideDirection::Left,
            distance: 1280.0,
        };
        let timeline = transition.timeline(&nodes, &[]);
        let mut animations = AnimationSystem::new();
        animations.insert(&nodes, timeline, KillMode::Freeze, &mut doc);
        assert_eq!(doc.get_property(nodes[0], Prop::X), Some(-1280.0));
        assert_eq!(doc.get_property(nodes[0], Prop::Opacity), Some(0.0));
    }

    #[test]
    fn test_exit_leaves_content_hidden() {
        let (mut doc, nodes) = chars(1);
        run(&mut doc, PageTransition::Exit.timeline(&nodes, &[]), &nodes, 0.6);
        assert_eq!(doc.get_property(nodes[0], Prop::Opacity), Some(0.0));
        assert_eq!(doc.get_property(nodes[0], Prop::Y), Some(-30.0));
    }

    #[test]
    fn test_glitch_offsets_within_intensity() {
        let (mut doc, nodes) = chars(6);
        let mut rng = StdRng::seed_from_u64(7);
        let timeline = glitch(&nodes, 5.0, &mut rng);

        for (index, node) in nodes.iter().enumerate() {
            let track = timeline
                .tracks()
                .iter()
                .find(|t| t.node == *node && t.prop == Prop::X)
                .unwrap();
            assert!((track.start - index as f32 * 0.02).abs() < 1e-6);
            let from = track.from.unwrap();
            assert!((-5.0..=5.0).contains(&from));
        }

        run(&mut doc, timeline, &nodes, 0.5);
        for node in &nodes {
            assert_eq!(doc.get_property(*node, Prop::X), Some(0.0));
            assert_eq!(doc.get_property(*node, Prop::Y), Some(0.0));
            assert_eq!(doc.get_property(*node, Prop::Opacity), Some(1.0));
        }
    }

    #[test]
    fn test_wave_rises_and_settles() {
        let (mut doc, nodes) = chars(3);
        let timeline = wave(&nodes, 20.0, Repeat::Once);
        // 3 个字符：上扬段 0.1s 的错开不足 0.3s，回落从 0.3s 起
        let fall_start = timeline
            .tracks()
            .iter()
            .filter(|t| t.node == nodes[0] && t.prop == Prop::Y)
            .map(|t| t.start)
            .fold(0.0_f32, f32::max);
        assert!((fall_start - 0.3).abs() < 1e-6);

        let mut animations = AnimationSystem::new();
        animations.insert(&nodes, timeline.playing(), KillMode::Freeze, &mut doc);
        for _ in 0..6 {
            animations.update(0.05, &mut doc);
        }
        assert!((doc.get_property(nodes[0], Prop::Y).unwrap() + 20.0).abs() < 1e-3);
        for _ in 0..20 {
            animations.update(0.05, &mut doc);
        }
        for node in &nodes {
            assert_eq!(doc.get_property(*node, Prop::Y), Some(0.0));
        }
    }
}
