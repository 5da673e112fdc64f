//! # Motion Descriptor Builder
//!
//! 将效果类型与调用方选项合并为 `MotionDescriptor`。
//!
//! 这是 EffectKind → MotionDescriptor 的**唯一转换入口**。
//! 合并是纯函数，不访问节点树；目标解析推迟到转换为时间线之前。

use tracing::debug;

use super::registry::{EffectDefaults, EffectKind, SlideDirection, VisualState, defaults};
use crate::animation::{EasingFunction, Prop, Repeat, Timeline, Track};
use crate::dom::{Document, NodeId};
use crate::error::{MotionError, MotionResult};

/// 动画目标
#[derive(Debug, Clone, PartialEq)]
pub enum TargetSet {
    /// 选择器，转换时在文档中查询
    Selector(String),
    /// 已知节点（例如拆分得到的包装节点）
    Nodes(Vec<NodeId>),
}

impl TargetSet {
    /// 解析为当前仍挂载的节点
    ///
    /// - 选择器无匹配：`ElementNotFound`
    /// - 节点全部已移除：`NodeDetached`
    pub fn resolve(&self, doc: &Document) -> MotionResult<Vec<NodeId>> {
        match self {
            TargetSet::Selector(selector) => {
                let nodes = doc.query_all(selector)?;
                if nodes.is_empty() {
                    return Err(MotionError::ElementNotFound {
                        selector: selector.clone(),
                    });
                }
                Ok(nodes)
            }
            TargetSet::Nodes(nodes) => {
                let attached: Vec<NodeId> = nodes
                    .iter()
                    .copied()
                    .filter(|n| doc.is_attached(*n))
                    .collect();
                match nodes.first() {
                    Some(first) if attached.is_empty() => {
                        Err(MotionError::NodeDetached { node: *first })
                    }
                    _ => Ok(attached),
                }
            }
        }
    }
}

/// 调用方选项
///
/// 全部字段可选，未指定时使用效果默认值。
/// `x` / `y` / `opacity` / `scale` / `rotate` / `blur` 覆盖起始状态；
/// 对没有起始状态的 "to" 补间则覆盖终止状态。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionOptions {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub opacity: Option<f32>,
    pub scale: Option<f32>,
    pub rotate: Option<f32>,
    pub blur: Option<f32>,
    /// 方向相关效果的方向
    pub direction: Option<SlideDirection>,
    /// 方向相关效果的位移距离
    pub distance: Option<f32>,
    /// 额外的终止状态
    pub to: VisualState,
    pub duration: Option<f32>,
    pub stagger: Option<f32>,
    pub ease: Option<EasingFunction>,
    pub delay: Option<f32>,
    pub repeat: Option<Repeat>,
    pub repeat_delay: Option<f32>,
}

impl MotionOptions {
    fn shorthand(&self) -> [(Prop, Option<f32>); 6] {
        [
            (Prop::X, self.x),
            (Prop::Y, self.y),
            (Prop::Opacity, self.opacity),
            (Prop::Scale, self.scale),
            (Prop::Rotate, self.rotate),
            (Prop::Blur, self.blur),
        ]
    }
}

/// 动画描述
///
/// 不可变、不可克隆；通过 [`into_timeline`](Self::into_timeline) 或
/// [`append_to`](Self::append_to) 按值消费一次。
#[derive(Debug, PartialEq)]
pub struct MotionDescriptor {
    kind: EffectKind,
    targets: TargetSet,
    from: VisualState,
    to: VisualState,
    duration: f32,
    stagger: f32,
    ease: EasingFunction,
    delay: f32,
    repeat: Repeat,
    repeat_delay: f32,
}

impl MotionDescriptor {
    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    pub fn from(&self) -> &VisualState {
        &self.from
    }

    pub fn to(&self) -> &VisualState {
        &self.to
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn stagger(&self) -> f32 {
        self.stagger
    }

    pub fn ease(&self) -> EasingFunction {
        self.ease
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    pub fn repeat(&self) -> Repeat {
        self.repeat
    }

    pub fn repeat_delay(&self) -> f32 {
        self.repeat_delay
    }

    /// 在文档中解析目标
    pub fn resolve_targets(&self, doc: &Document) -> MotionResult<Vec<NodeId>> {
        self.targets.resolve(doc)
    }

    /// 转换为独立的时间线（暂停状态）
    pub fn into_timeline(self, nodes: &[NodeId]) -> Timeline {
        let mut timeline = Timeline::new().with_repeat(self.repeat, self.repeat_delay);
        self.append_to(&mut timeline, nodes, 0.0);
        timeline
    }

    /// 作为一段追加到已有时间线的 `position` 秒处
    ///
    /// 第 i 个节点的起始时间为 `position + delay + i * stagger`。
    pub fn append_to(self, timeline: &mut Timeline, nodes: &[NodeId], position: f32) {
        self.append_tracks(timeline, nodes, position, false);
    }

    /// 作为循环时间线的开场追加：只在第一轮播放
    pub fn append_lead_in_to(self, timeline: &mut Timeline, nodes: &[NodeId], position: f32) {
        self.append_tracks(timeline, nodes, position, true);
    }

    fn append_tracks(self, timeline: &mut Timeline, nodes: &[NodeId], position: f32, lead_in: bool) {
        let mut props: Vec<Prop> = self.to.props().collect();
        for prop in self.from.props() {
            if !props.contains(&prop) {
                props.push(prop);
            }
        }

        for (index, node) in nodes.iter().enumerate() {
            let start = position + self.delay + index as f32 * self.stagger;
            for prop in &props {
                let to = self.to.get(*prop).unwrap_or_else(|| prop.neutral());
                let track = Track::new(*node, *prop, self.from.get(*prop), to)
                    .at(start, self.duration)
                    .with_easing(self.ease);
                timeline.add_track(if lead_in { track.as_lead_in() } else { track });
            }
        }
    }
}

/// 合并效果默认值与调用方选项
///
/// 纯函数：调用方指定的字段覆盖默认值，未指定的回退到默认值。
pub fn merge(
    kind: EffectKind,
    defaults: EffectDefaults,
    options: MotionOptions,
    targets: TargetSet,
) -> MotionDescriptor {
    let EffectDefaults {
        mut from,
        mut to,
        duration,
        stagger,
        ease,
        delay,
        repeat,
        repeat_delay,
    } = defaults;

    let to_tween = from.is_empty();
    for (prop, value) in options.shorthand() {
        if let Some(value) = value {
            if to_tween {
                to.set(prop, value);
            } else {
                from.set(prop, value);
            }
        }
    }
    for (prop, value) in options.to.iter() {
        to.set(prop, value);
    }

    MotionDescriptor {
        kind,
        targets,
        from,
        to,
        duration: options.duration.unwrap_or(duration).max(0.0),
        stagger: options.stagger.unwrap_or(stagger).max(0.0),
        ease: options.ease.unwrap_or(ease),
        delay: options.delay.unwrap_or(delay).max(0.0),
        repeat: options.repeat.unwrap_or(repeat),
        repeat_delay: options.repeat_delay.unwrap_or(repeat_delay).max(0.0),
    }
}

/// 把方向与距离换算成起始偏移，写入默认起始状态
///
/// 显式的 `x` / `y` 随后在 [`merge`] 中覆盖这里的结果。
fn resolve_direction(kind: EffectKind, options: &MotionOptions, mut base: EffectDefaults) -> EffectDefaults {
    let (EffectKind::Slide(default_direction) | EffectKind::PageSlide(default_direction)) = kind
    else {
        return base;
    };
    let direction = options.direction.unwrap_or(default_direction);
    let distance = options.distance.unwrap_or(defaults::SLIDE_DISTANCE);
    let (x, y) = direction.offset(distance);
    base.from.set(Prop::X, x);
    base.from.set(Prop::Y, y);
    base
}

/// 动画描述构建器
///
/// ```rust,ignore
/// let descriptor = MotionDescriptorBuilder::new(EffectKind::Reveal)
///     .selector(".section")
///     .duration(0.8)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct MotionDescriptorBuilder {
    kind: EffectKind,
    targets: TargetSet,
    options: MotionOptions,
}

impl MotionDescriptorBuilder {
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            targets: TargetSet::Nodes(Vec::new()),
            options: MotionOptions::default(),
        }
    }

    pub fn targets(mut self, targets: TargetSet) -> Self {
        self.targets = targets;
        self
    }

    pub fn selector(self, selector: &str) -> Self {
        self.targets(TargetSet::Selector(selector.to_string()))
    }

    pub fn nodes(self, nodes: Vec<NodeId>) -> Self {
        self.targets(TargetSet::Nodes(nodes))
    }

    /// 整体替换选项
    pub fn options(mut self, options: MotionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn duration(mut self, duration: f32) -> Self {
        self.options.duration = Some(duration);
        self
    }

    pub fn delay(mut self, delay: f32) -> Self {
        self.options.delay = Some(delay);
        self
    }

    pub fn stagger(mut self, stagger: f32) -> Self {
        self.options.stagger = Some(stagger);
        self
    }

    pub fn ease(mut self, ease: EasingFunction) -> Self {
        self.options.ease = Some(ease);
        self
    }

    pub fn to(mut self, prop: Prop, value: f32) -> Self {
        self.options.to.set(prop, value);
        self
    }

    pub fn build(self) -> MotionDescriptor {
        let base = resolve_direction(self.kind, &self.options, self.kind.defaults());
        debug!(effect = self.kind.name(), "构建动画描述");
        merge(self.kind, base, self.options, self.targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_unspecified() {
        let desc = MotionDescriptorBuilder::new(EffectKind::Reveal).build();
        assert_eq!(desc.duration(), 0.6);
        assert_eq!(desc.stagger(), 0.05);
        assert_eq!(desc.ease(), EasingFunction::POWER3_OUT);
        assert_eq!(desc.from().get(Prop::Y), Some(60.0));
        assert_eq!(desc.from().get(Prop::Opacity), Some(0.0));
        assert_eq!(desc.to().get(Prop::Y), Some(0.0));
    }

    #[test]
    fn test_caller_overrides_win() {
        let options = MotionOptions {
            y: Some(20.0),
            duration: Some(2.0),
            ease: Some(EasingFunction::Linear),
            ..Default::default()
        };
        let desc = MotionDescriptorBuilder::new(EffectKind::Reveal)
            .options(options)
            .build();
        assert_eq!(desc.from().get(Prop::Y), Some(20.0));
        assert_eq!(desc.duration(), 2.0);
        assert_eq!(desc.ease(), EasingFunction::Linear);
        // 未指定的仍为默认值
        assert_eq!(desc.stagger(), 0.05);
    }

    #[test]
    fn test_direction_resolves_to_offsets() {
        let options = MotionOptions {
            direction: Some(SlideDirection::Up),
            distance: Some(40.0),
            ..Default::default()
        };
        let desc = MotionDescriptorBuilder::new(EffectKind::Slide(SlideDirection::Left))
            .options(options)
            .build();
        assert_eq!(desc.from().get(Prop::X), Some(0.0));
        assert_eq!(desc.from().get(Prop::Y), Some(-40.0));
    }

    #[test]
    fn test_page_slide_uses_caller_distance() {
        let options = MotionOptions {
            distance: Some(1280.0),
            ..Default::default()
        };
        let desc = MotionDescriptorBuilder::new(EffectKind::PageSlide(SlideDirection::Right))
            .options(options)
            .build();
        assert_eq!(desc.from().get(Prop::X), Some(1280.0));
        assert_eq!(desc.from().get(Prop::Opacity), Some(0.0));
        assert_eq!(desc.to().get(Prop::X), Some(0.0));
    }

    #[test]
    fn test_explicit_offset_beats_direction() {
        let options = MotionOptions {
            distance: Some(40.0),
            x: Some(5.0),
            ..Default::default()
        };
        let desc = MotionDescriptorBuilder::new(EffectKind::Slide(SlideDirection::Left))
            .options(options)
            .build();
        assert_eq!(desc.from().get(Prop::X), Some(5.0));
    }

    #[test]
    fn test_to_tween_shorthand_targets_end_state() {
        let desc = MotionDescriptorBuilder::new(EffectKind::CursorHover)
            .options(MotionOptions {
                scale: Some(2.0),
                ..Default::default()
            })
            .build();
        assert!(desc.from().is_empty());
        assert_eq!(desc.to().get(Prop::Scale), Some(2.0));
    }

    #[test]
    fn test_timeline_stagger_layout() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append_element(root, "span", &[], Some("a")).unwrap();
        let b = doc.append_element(root, "span", &[], Some("b")).unwrap();

        let desc = MotionDescriptorBuilder::new(EffectKind::Fade)
            .nodes(vec![a, b])
            .stagger(0.5)
            .delay(1.0)
            .duration(1.0)
            .build();
        let nodes = desc.resolve_targets(&doc).unwrap();
        let timeline = desc.into_timeline(&nodes);

        let starts: Vec<f32> = timeline.tracks().iter().map(|t| t.start).collect();
        assert_eq!(starts, vec![1.0, 1.5]);
        assert_eq!(timeline.duration(), 2.5);
    }

    #[test]
    fn test_resolve_missing_selector() {
        let doc = Document::new();
        let desc = MotionDescriptorBuilder::new(EffectKind::Fade)
            .selector(".missing")
            .build();
        assert_eq!(
            desc.resolve_targets(&doc),
            Err(MotionError::ElementNotFound {
                selector: ".missing".to_string()
            })
        );
    }

    #[test]
    fn test_resolve_detached_nodes() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append_element(root, "span", &[], None).unwrap();
        doc.remove(a);

        let targets = TargetSet::Nodes(vec![a]);
        assert_eq!(
            targets.resolve(&doc),
            Err(MotionError::NodeDetached { node: a })
        );
    }
}
