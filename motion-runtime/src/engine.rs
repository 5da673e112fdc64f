//! # Engine 模块
//!
//! 动效引擎上下文：拥有帧驱动、动画系统、拆分注册表、平滑滚动、
//! 滚动触发器、光标、指针特效与循环换字，是每帧唯一的写入者。
//!
//! ## 生命周期
//!
//! ```text
//! new(config)
//!   ↓ init_animations(doc, viewport)    幂等
//! Running ── on_resize / on_content_changed / 输入事件 / tick
//!   ↓ teardown(doc)                      幂等，之后事件被忽略
//! TornDown
//! ```
//!
//! ## 失败隔离
//!
//! 每个区域（首屏标题、循环换字、段落、标题……）独立启动。
//! 单个区域失败只记录 `warn!` 并计数，不影响其他区域；
//! 失败的区域不会被隐藏，保持静态可见。

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::animation::{
    AnimationEvent, AnimationSystem, EaseDirection, EasingFunction, KillMode, Prop, Repeat,
    Timeline, TimelineId, Track,
};
use crate::config::{EngineConfig, ResolvedTriggers};
use crate::cursor::{CursorEvent, CursorFollower};
use crate::dom::{Document, NodeId};
use crate::effects::{
    EffectKind, MotionDescriptorBuilder, MotionOptions, PageTransition, TargetSet, sequences,
};
use crate::error::{ConfigError, MotionError, MotionResult};
use crate::frame::{FrameDriver, FrameTask};
use crate::looping::LoopingTextSwapper;
use crate::pointer_fx::PointerFxController;
use crate::scroll::{Orientation, ScrollContext, ScrollToOptions};
use crate::splitter::{SplitRegistry, SplitUnit};
use crate::trigger::{
    Edge, ScrollTriggerRegistry, Threshold, ToggleActions, TriggerEvent, TriggerId, TriggerSpec,
};

/// 视口尺寸（像素）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// `init_animations` 的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    pub smooth_scroll: bool,
    pub cursor: bool,
    pub pointer_fx: bool,
    /// 成功启动动画的区域数
    pub animated: usize,
    /// 失败并保持静态的区域数
    pub failed: usize,
    /// 引擎已在运行，本次调用没有做任何事
    pub already_running: bool,
}

/// 滚动目标
#[derive(Debug, Clone, PartialEq)]
pub enum ScrollTarget {
    Offset(f32),
    Node(NodeId),
    /// 第一个匹配的元素
    Selector(String),
}

/// `animate` 的滚动触发选项；字段缺省时取配置中的默认值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerOptions {
    /// 触发节点，缺省为第一个目标
    pub trigger: Option<NodeId>,
    pub start: Option<Threshold>,
    pub end: Option<Threshold>,
    pub toggle_actions: Option<ToggleActions>,
    pub scrub: bool,
}

/// 单帧的输出
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub dt: f32,
    /// 本帧用于求值触发器的滚动偏移
    pub offset: f32,
    pub triggers: Vec<TriggerEvent>,
    pub animations: Vec<AnimationEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    Idle,
    Running,
    TornDown,
}

/// 拆分文字区域当前的时间线与触发器
#[derive(Debug, Clone, Copy)]
struct SplitRegion {
    timeline: TimelineId,
    trigger: TriggerId,
}

/// 动效引擎
#[derive(Debug)]
pub struct MotionEngine {
    config: EngineConfig,
    resolved: ResolvedTriggers,
    state: EngineState,
    viewport: Viewport,
    /// 没有平滑滚动时由原生滚动事件提供的偏移
    native_offset: f32,
    paused: bool,
    driver: FrameDriver,
    animations: AnimationSystem,
    splits: SplitRegistry,
    scroll: ScrollContext,
    triggers: ScrollTriggerRegistry,
    cursor: Option<CursorFollower>,
    pointer_fx: Option<PointerFxController>,
    /// 故障闪现的随机偏移
    rng: StdRng,
    loopers: Vec<LoopingTextSwapper>,
    split_regions: HashMap<NodeId, SplitRegion>,
    report: InitReport,
}

impl MotionEngine {
    /// 创建引擎；配置无效时返回错误
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let resolved = config.triggers.resolve()?;
        Ok(Self {
            driver: FrameDriver::new(&config.frame),
            triggers: ScrollTriggerRegistry::new(config.scroll.orientation, 0.0),
            config,
            resolved,
            state: EngineState::Idle,
            viewport: Viewport::default(),
            native_offset: 0.0,
            paused: false,
            animations: AnimationSystem::new(),
            splits: SplitRegistry::new(),
            scroll: ScrollContext::new(),
            cursor: None,
            pointer_fx: None,
            rng: StdRng::from_entropy(),
            loopers: Vec::new(),
            split_regions: HashMap::new(),
            report: InitReport::default(),
        })
    }

    // ========== 生命周期 ==========

    /// 挂载：启用平滑滚动、光标与指针特效（桌面宽度），启动首屏动画、循环换字与段落拆分
    ///
    /// 已在运行时直接返回 `already_running`。
    pub fn init_animations(&mut self, doc: &mut Document, viewport: Viewport) -> InitReport {
        if self.state == EngineState::Running {
            debug!("引擎已在运行，忽略重复初始化");
            return InitReport {
                already_running: true,
                ..self.report.clone()
            };
        }

        self.state = EngineState::Running;
        self.report = InitReport::default();
        self.viewport = viewport;
        self.triggers.set_viewport_size(self.axis_viewport());
        self.driver.register(FrameTask::Triggers);
        self.driver.register(FrameTask::Animations);

        if self.is_desktop() {
            self.enable_smooth_scroll(doc);
            self.enable_cursor(doc);
            self.enable_pointer_fx(doc);
        }
        self.set_paused(false);

        self.landing_intro(doc);
        self.fade_in(doc);
        self.loop_swaps(doc);
        self.set_split_text(doc);

        info!(
            smooth_scroll = self.report.smooth_scroll,
            cursor = self.report.cursor,
            pointer_fx = self.report.pointer_fx,
            animated = self.report.animated,
            failed = self.report.failed,
            "动效引擎初始化完成"
        );
        self.report.clone()
    }

    /// 卸载：停止循环、触发器、光标、指针特效、平滑滚动与所有时间线，还原拆分；可重复调用
    pub fn teardown(&mut self, doc: &mut Document) {
        if self.state != EngineState::Running {
            return;
        }

        for looper in &mut self.loopers {
            looper.teardown(doc, &mut self.animations);
        }
        self.loopers.clear();
        self.triggers.kill_all();
        self.split_regions.clear();
        if let Some(mut cursor) = self.cursor.take() {
            cursor.detach(doc, &mut self.animations);
        }
        if let Some(mut fx) = self.pointer_fx.take() {
            fx.detach(doc, &mut self.animations);
        }
        self.scroll.destroy();
        self.animations.clear(KillMode::Complete, doc);
        self.splits.revert_all(doc);
        self.driver.clear();

        self.state = EngineState::TornDown;
        info!("动效引擎已卸载");
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    fn is_desktop(&self) -> bool {
        self.viewport.width > self.config.breakpoints.desktop
    }

    fn axis_viewport(&self) -> f32 {
        match self.config.scroll.orientation {
            Orientation::Vertical => self.viewport.height,
            Orientation::Horizontal => self.viewport.width,
        }
    }

    fn content_size(&self, doc: &Document) -> f32 {
        let rect = doc.rect(doc.root()).unwrap_or_default();
        match self.config.scroll.orientation {
            Orientation::Vertical => rect.height,
            Orientation::Horizontal => rect.width,
        }
    }

    fn enable_smooth_scroll(&mut self, doc: &Document) {
        let content = self.content_size(doc);
        let viewport = self.axis_viewport();
        let paused = self.paused;
        let scroll = self.scroll.init(self.config.scroll.clone());
        scroll.set_dimensions(content, viewport);
        scroll.set_paused(paused);
        self.driver.register(FrameTask::Scroll);
        self.report.smooth_scroll = true;
    }

    fn disable_smooth_scroll(&mut self) {
        if let Some(scroll) = self.scroll.get() {
            self.native_offset = scroll.offset();
        }
        self.scroll.destroy();
        self.driver.unregister(FrameTask::Scroll);
        self.report.smooth_scroll = false;
    }

    fn enable_cursor(&mut self, doc: &Document) {
        if self.cursor.is_some() {
            return;
        }
        match CursorFollower::attach(doc, self.config.cursor.clone()) {
            Ok(cursor) => {
                self.cursor = Some(cursor);
                self.driver.register(FrameTask::Cursor);
                self.report.cursor = true;
            }
            Err(e) => {
                warn!(error = %e, "光标跟随挂载失败");
                self.report.cursor = false;
            }
        }
    }

    fn disable_cursor(&mut self, doc: &mut Document) {
        if let Some(mut cursor) = self.cursor.take() {
            cursor.detach(doc, &mut self.animations);
        }
        self.driver.unregister(FrameTask::Cursor);
        self.report.cursor = false;
    }

    fn enable_pointer_fx(&mut self, doc: &Document) {
        if self.pointer_fx.is_some() {
            return;
        }
        match PointerFxController::attach(doc, self.config.pointer_fx.clone()) {
            Ok(fx) => {
                self.pointer_fx = Some(fx);
                self.report.pointer_fx = true;
            }
            Err(e) => {
                warn!(error = %e, "指针特效挂载失败");
                self.report.pointer_fx = false;
            }
        }
    }

    fn disable_pointer_fx(&mut self, doc: &mut Document) {
        if let Some(mut fx) = self.pointer_fx.take() {
            fx.detach(doc, &mut self.animations);
        }
        self.report.pointer_fx = false;
    }

    /// 记录区域结果
    fn record<T>(&mut self, region: &str, result: MotionResult<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.report.animated += 1;
                Some(value)
            }
            Err(e) => {
                warn!(region, error = %e, "区域动画启动失败，保持静态");
                self.report.failed += 1;
                None
            }
        }
    }

    // ========== 首屏 ==========

    /// 首屏标题按字符入场，所有字符共用一条时间线
    fn landing_intro(&mut self, doc: &mut Document) {
        let selector = self.config.text.landing_selector.clone();
        let roots = doc.query_all(&selector).and_then(|roots| {
            if roots.is_empty() {
                Err(MotionError::ElementNotFound { selector })
            } else {
                Ok(roots)
            }
        });
        let Some(roots) = self.record("landing", roots) else {
            return;
        };

        let mut chars = Vec::new();
        for root in roots {
            match self.splits.resplit(doc, root, SplitUnit::Chars) {
                Ok(splitter) => chars.extend(splitter.nodes()),
                Err(e) => {
                    warn!(node = %root, error = %e, "首屏标题拆分失败，保持静态");
                    self.report.failed += 1;
                }
            }
        }
        if chars.is_empty() {
            return;
        }

        let timeline = MotionDescriptorBuilder::new(EffectKind::LandingIntro)
            .nodes(chars.clone())
            .build()
            .into_timeline(&chars)
            .playing();
        self.animations
            .insert(&chars, timeline, KillMode::Complete, doc);
    }

    /// 首屏装饰元素淡入
    fn fade_in(&mut self, doc: &mut Document) {
        let descriptor = MotionDescriptorBuilder::new(EffectKind::Fade)
            .selector(&self.config.text.fade_selector)
            .duration(1.2)
            .delay(0.1)
            .ease(EasingFunction::Power(1, EaseDirection::InOut))
            .build();
        let nodes = descriptor.resolve_targets(doc);
        let Some(nodes) = self.record("fade", nodes) else {
            return;
        };
        let timeline = descriptor.into_timeline(&nodes).playing();
        self.animations
            .insert(&nodes, timeline, KillMode::Complete, doc);
    }

    /// 为每对配置的文字启动循环换位；`intro` 的一对先让 A 入场
    fn loop_swaps(&mut self, doc: &mut Document) {
        let pairs = self.config.text.loop_pairs.clone();
        for pair in pairs {
            let intro = pair.intro.then_some(EffectKind::LandingIntro);
            let result = self.start_loop(doc, &pair.a, &pair.b, intro);
            if let Some(looper) = self.record("loop", result) {
                self.loopers.push(looper);
            }
        }
    }

    fn start_loop(
        &mut self,
        doc: &mut Document,
        a: &str,
        b: &str,
        intro: Option<EffectKind>,
    ) -> MotionResult<LoopingTextSwapper> {
        let find = |doc: &Document, selector: &str| {
            doc.query(selector)?
                .ok_or_else(|| MotionError::ElementNotFound {
                    selector: selector.to_string(),
                })
        };
        let a_root = find(doc, a)?;
        let b_root = find(doc, b)?;
        let a_chars = self.splits.resplit(doc, a_root, SplitUnit::Chars)?.nodes();
        let b_chars = self.splits.resplit(doc, b_root, SplitUnit::Chars)?.nodes();
        Ok(LoopingTextSwapper::start_with_intro(
            doc,
            &mut self.animations,
            a_chars,
            b_chars,
            intro,
        ))
    }

    // ========== 段落与标题 ==========

    /// 重新拆分段落与标题并绑定滚动触发器
    ///
    /// 可重复调用：每个区域先完成并移除旧时间线，还原旧拆分，再重新拆分绑定。
    /// 视口窄于拆分断点时不做任何事。
    ///
    /// # 返回
    /// 成功绑定的区域数
    pub fn set_split_text(&mut self, doc: &mut Document) -> usize {
        if self.state != EngineState::Running
            || self.viewport.width < self.config.breakpoints.split_text
        {
            return 0;
        }

        self.drop_detached_regions(doc);

        let start = if self.viewport.width <= self.config.breakpoints.desktop {
            self.resolved.split_start_compact
        } else {
            self.resolved.split_start
        };

        let mut bound = 0;
        let regions = [
            (
                self.config.text.paragraph_selector.clone(),
                SplitUnit::Words,
                EffectKind::ParagraphReveal,
            ),
            (
                self.config.text.title_selector.clone(),
                SplitUnit::Chars,
                EffectKind::TitleReveal,
            ),
        ];
        for (selector, unit, kind) in regions {
            let roots = match doc.query_all(&selector) {
                Ok(roots) => roots,
                Err(e) => {
                    warn!(selector = %selector, error = %e, "拆分选择器无效");
                    continue;
                }
            };
            for root in roots {
                if unit == SplitUnit::Words {
                    doc.add_class(root, "visible");
                }
                let result = self.bind_split_region(doc, root, unit, kind, start);
                if self.record("split_text", result).is_some() {
                    bound += 1;
                }
            }
        }
        debug!(bound, "段落与标题重新绑定");
        bound
    }

    fn bind_split_region(
        &mut self,
        doc: &mut Document,
        root: NodeId,
        unit: SplitUnit,
        kind: EffectKind,
        start: Threshold,
    ) -> MotionResult<()> {
        if let Some(previous) = self.split_regions.remove(&root) {
            self.animations
                .kill(previous.timeline, KillMode::Complete, doc);
            self.triggers.kill(previous.trigger);
        }

        let nodes = self.splits.resplit(doc, root, unit)?.nodes();
        let timeline = MotionDescriptorBuilder::new(kind)
            .nodes(nodes.clone())
            .build()
            .into_timeline(&nodes);
        let timeline = self
            .animations
            .insert(&nodes, timeline, KillMode::Complete, doc);

        let trigger_node = doc
            .parent(root)
            .and_then(|parent| doc.parent(parent))
            .unwrap_or(root);
        let trigger = self.triggers.create(
            doc,
            TriggerSpec {
                trigger: trigger_node,
                start,
                end: self.resolved.split_end,
                toggle_actions: self.resolved.split_toggle_actions,
                timeline: Some(timeline),
                scrub: false,
            },
        );
        self.split_regions
            .insert(root, SplitRegion { timeline, trigger });
        Ok(())
    }

    fn drop_detached_regions(&mut self, doc: &mut Document) {
        let detached: Vec<NodeId> = self
            .split_regions
            .keys()
            .copied()
            .filter(|root| !doc.is_attached(*root))
            .collect();
        for root in detached {
            if let Some(region) = self.split_regions.remove(&root) {
                self.animations
                    .kill(region.timeline, KillMode::Freeze, doc);
                self.triggers.kill(region.trigger);
            }
            // 节点已不在文档中，只丢弃记录
            let _ = self.splits.revert(doc, root);
        }
    }

    // ========== 通用效果 ==========

    /// 对目标启动一个效果
    ///
    /// 有 `trigger` 时时间线以暂停状态插入并绑定滚动触发器，否则立即播放。
    pub fn animate(
        &mut self,
        doc: &mut Document,
        kind: EffectKind,
        targets: TargetSet,
        options: MotionOptions,
        trigger: Option<TriggerOptions>,
    ) -> MotionResult<TimelineId> {
        if self.state != EngineState::Running {
            return Err(MotionError::EngineNotInitialized);
        }
        let nodes = targets.resolve(doc)?;
        let Some(&first) = nodes.first() else {
            return Err(MotionError::ElementNotFound {
                selector: format!("{targets:?}"),
            });
        };
        let timeline = MotionDescriptorBuilder::new(kind)
            .targets(targets)
            .options(options)
            .build()
            .into_timeline(&nodes);

        let Some(trigger) = trigger else {
            return Ok(self
                .animations
                .insert(&nodes, timeline.playing(), KillMode::Complete, doc));
        };

        let id = self
            .animations
            .insert(&nodes, timeline, KillMode::Complete, doc);
        self.triggers.create(
            doc,
            TriggerSpec {
                trigger: trigger.trigger.unwrap_or(first),
                start: trigger.start.unwrap_or(self.resolved.start),
                end: trigger.end.unwrap_or(self.resolved.end),
                toggle_actions: trigger
                    .toggle_actions
                    .unwrap_or(self.resolved.toggle_actions),
                timeline: Some(id),
                scrub: trigger.scrub,
            },
        );
        Ok(id)
    }

    /// 视差：节点在穿过视口期间线性上移 `limit * speed`
    pub fn parallax(
        &mut self,
        doc: &mut Document,
        node: NodeId,
        speed: f32,
    ) -> MotionResult<TriggerId> {
        if self.state != EngineState::Running {
            return Err(MotionError::EngineNotInitialized);
        }
        if !doc.is_attached(node) {
            return Err(MotionError::NodeDetached { node });
        }

        let limit = match self.scroll.get() {
            Some(scroll) => scroll.limit(),
            None => (self.content_size(doc) - self.axis_viewport()).max(0.0),
        };
        let mut timeline = Timeline::new();
        timeline.add_track(Track::new(node, Prop::Y, None, -limit * speed).at(0.0, 1.0));
        let id = self
            .animations
            .insert(&[node], timeline, KillMode::Complete, doc);

        Ok(self.triggers.create(
            doc,
            TriggerSpec {
                trigger: node,
                start: Threshold {
                    element: Edge::Percent(0.0),
                    viewport: Edge::Percent(100.0),
                },
                end: Threshold {
                    element: Edge::Percent(100.0),
                    viewport: Edge::Percent(0.0),
                },
                toggle_actions: ToggleActions::default(),
                timeline: Some(id),
                scrub: true,
            },
        ))
    }

    // ========== 页面过渡与文字特效 ==========

    /// 播放页面过渡，节点由过渡配置中的选择器给出
    pub fn page_transition(
        &mut self,
        doc: &mut Document,
        transition: PageTransition,
    ) -> MotionResult<TimelineId> {
        if self.state != EngineState::Running {
            return Err(MotionError::EngineNotInitialized);
        }
        let selectors = &self.config.transitions;
        let (content, overlay) = match transition {
            PageTransition::Curtain => (None, Some(&selectors.curtain_selector)),
            PageTransition::Loading => (
                Some(&selectors.main_selector),
                Some(&selectors.loading_selector),
            ),
            _ => (Some(&selectors.content_selector), None),
        };
        let content = match content {
            Some(selector) => TargetSet::Selector(selector.clone()).resolve(doc)?,
            None => Vec::new(),
        };
        let overlay = match overlay {
            Some(selector) => TargetSet::Selector(selector.clone()).resolve(doc)?,
            None => Vec::new(),
        };

        let timeline = transition.timeline(&content, &overlay).playing();
        let owners: Vec<NodeId> = content.iter().chain(overlay.iter()).copied().collect();
        let id = self
            .animations
            .insert(&owners, timeline, KillMode::Complete, doc);
        info!(transition = transition.name(), timeline = %id, "页面过渡开始");
        Ok(id)
    }

    /// 按字符拆分后播放故障闪现
    pub fn glitch_text(
        &mut self,
        doc: &mut Document,
        root: NodeId,
        intensity: f32,
    ) -> MotionResult<TimelineId> {
        let chars = self.split_chars(doc, root)?;
        let timeline = sequences::glitch(&chars, intensity, &mut self.rng).playing();
        Ok(self
            .animations
            .insert(&chars, timeline, KillMode::Complete, doc))
    }

    /// 按字符拆分后播放波浪
    pub fn wave_text(
        &mut self,
        doc: &mut Document,
        root: NodeId,
        amplitude: f32,
        repeat: Repeat,
    ) -> MotionResult<TimelineId> {
        let chars = self.split_chars(doc, root)?;
        let timeline = sequences::wave(&chars, amplitude, repeat).playing();
        Ok(self
            .animations
            .insert(&chars, timeline, KillMode::Complete, doc))
    }

    fn split_chars(&mut self, doc: &mut Document, root: NodeId) -> MotionResult<Vec<NodeId>> {
        if self.state != EngineState::Running {
            return Err(MotionError::EngineNotInitialized);
        }
        if !doc.is_attached(root) {
            return Err(MotionError::NodeDetached { node: root });
        }
        Ok(self.splits.resplit(doc, root, SplitUnit::Chars)?.nodes())
    }

    // ========== 滚动 ==========

    /// 暂停 / 恢复平滑滚动
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        if let Some(scroll) = self.scroll.get_mut() {
            scroll.set_paused(paused);
        }
    }

    /// 滚动到偏移或元素；平滑滚动未启用时为空操作
    pub fn scroll_to(
        &mut self,
        doc: &Document,
        target: ScrollTarget,
        options: ScrollToOptions,
    ) -> bool {
        if self.state != EngineState::Running {
            return false;
        }
        let node = match &target {
            ScrollTarget::Offset(offset) => return self.scroll.scroll_to(*offset, options),
            ScrollTarget::Node(node) => Some(*node),
            ScrollTarget::Selector(selector) => doc.query(selector).ok().flatten(),
        };
        let Some(rect) = node.and_then(|n| doc.rect(n)) else {
            warn!(?target, "滚动目标不存在或没有布局");
            return false;
        };
        let offset = match self.config.scroll.orientation {
            Orientation::Vertical => rect.y,
            Orientation::Horizontal => rect.x,
        };
        self.scroll.scroll_to(offset, options)
    }

    pub fn on_wheel(&mut self, dx: f32, dy: f32) {
        if self.state != EngineState::Running {
            return;
        }
        if let Some(scroll) = self.scroll.get_mut() {
            scroll.on_wheel(dx, dy);
        }
    }

    pub fn on_touch(&mut self, delta: f32) {
        if self.state != EngineState::Running {
            return;
        }
        if let Some(scroll) = self.scroll.get_mut() {
            scroll.on_touch(delta);
        }
    }

    /// 原生滚动事件
    ///
    /// # 返回
    /// 宿主应呈现的偏移
    pub fn on_native_scroll(&mut self, offset: f32) -> f32 {
        if self.state != EngineState::Running {
            return offset;
        }
        match self.scroll.get_mut() {
            Some(scroll) => scroll.on_native_scroll(offset),
            None => {
                self.native_offset = offset.max(0.0);
                self.native_offset
            }
        }
    }

    /// 当前滚动偏移
    pub fn scroll_offset(&self) -> f32 {
        self.scroll
            .get()
            .map_or(self.native_offset, |scroll| scroll.offset())
    }

    // ========== 布局变化 ==========

    /// 视口尺寸变化
    ///
    /// 跨越桌面断点时切换平滑滚动、光标与指针特效；段落与标题重新拆分绑定。
    pub fn on_resize(&mut self, doc: &mut Document, viewport: Viewport) {
        if self.state != EngineState::Running {
            return;
        }
        let was_desktop = self.is_desktop();
        self.viewport = viewport;
        let desktop = self.is_desktop();

        self.triggers.set_viewport_size(self.axis_viewport());
        let content = self.content_size(doc);
        let axis = self.axis_viewport();
        if let Some(scroll) = self.scroll.get_mut() {
            scroll.set_dimensions(content, axis);
        }

        if desktop != was_desktop {
            info!(width = viewport.width, desktop, "跨越桌面断点");
            if desktop {
                self.enable_smooth_scroll(doc);
                self.enable_cursor(doc);
                self.enable_pointer_fx(doc);
            } else {
                self.disable_smooth_scroll();
                self.disable_cursor(doc);
                self.disable_pointer_fx(doc);
            }
        }
        self.set_split_text(doc);
    }

    /// 内容变化（节点插入或移除）
    pub fn on_content_changed(&mut self, doc: &mut Document) {
        if self.state != EngineState::Running {
            return;
        }
        self.triggers.invalidate();
        let content = self.content_size(doc);
        let axis = self.axis_viewport();
        if let Some(scroll) = self.scroll.get_mut() {
            scroll.set_dimensions(content, axis);
        }
        if let Some(cursor) = &mut self.cursor
            && let Err(e) = cursor.rescan(doc, &mut self.animations)
        {
            warn!(error = %e, "交互元素扫描失败");
        }
        if let Some(fx) = &mut self.pointer_fx
            && let Err(e) = fx.rescan(doc)
        {
            warn!(error = %e, "指针特效元素扫描失败");
        }
    }

    // ========== 指针 ==========

    /// 指针移动（视口坐标）：指针特效随之更新，返回光标的悬停变化
    pub fn pointer_move(&mut self, doc: &mut Document, x: f32, y: f32) -> Option<CursorEvent> {
        if self.state != EngineState::Running {
            return None;
        }
        let offset = self.scroll_offset();
        if let Some(fx) = &mut self.pointer_fx {
            fx.pointer_move(doc, &mut self.animations, x, y, offset);
        }
        let cursor = self.cursor.as_mut()?;
        cursor.pointer_move(doc, &mut self.animations, x, y, offset)
    }

    pub fn pointer_down(&mut self, doc: &mut Document) {
        if let Some(cursor) = &mut self.cursor {
            cursor.pointer_down(doc, &mut self.animations);
        }
    }

    pub fn pointer_up(&mut self, doc: &mut Document) {
        if let Some(cursor) = &mut self.cursor {
            cursor.pointer_up(doc, &mut self.animations);
        }
    }

    pub fn window_enter(&mut self, doc: &mut Document) {
        if let Some(cursor) = &mut self.cursor {
            cursor.window_enter(doc, &mut self.animations);
        }
    }

    pub fn window_leave(&mut self, doc: &mut Document) {
        if let Some(cursor) = &mut self.cursor {
            cursor.window_leave(doc, &mut self.animations);
        }
        if let Some(fx) = &mut self.pointer_fx {
            fx.window_leave(doc, &mut self.animations);
        }
    }

    // ========== 每帧 ==========

    /// 以时间戳（秒）驱动一帧
    pub fn tick(&mut self, doc: &mut Document, now: f64) -> FrameReport {
        let dt = self.driver.advance(now);
        self.frame(doc, dt)
    }

    /// 推进一帧：滚动积分 → 触发器刷新与求值 → 动画推进 → 光标插值
    pub fn frame(&mut self, doc: &mut Document, dt: f32) -> FrameReport {
        let mut report = FrameReport {
            dt,
            offset: self.native_offset,
            ..FrameReport::default()
        };
        if self.state != EngineState::Running {
            return report;
        }

        for task in self.driver.tasks() {
            match task {
                FrameTask::Scroll => {
                    if let Some(scroll) = self.scroll.get_mut() {
                        report.offset = scroll.tick(dt).offset;
                    }
                }
                FrameTask::Triggers => {
                    report.triggers =
                        self.triggers
                            .update(doc, report.offset, &mut self.animations);
                }
                FrameTask::Animations => {
                    report.animations = self.animations.update(dt, doc);
                }
                FrameTask::Cursor => {
                    if let Some(cursor) = &mut self.cursor {
                        cursor.frame(doc);
                    }
                }
            }
        }
        report
    }

    // ========== 查询 ==========

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn animations(&self) -> &AnimationSystem {
        &self.animations
    }

    pub fn splits(&self) -> &SplitRegistry {
        &self.splits
    }

    pub fn scroll(&self) -> &ScrollContext {
        &self.scroll
    }

    pub fn triggers(&self) -> &ScrollTriggerRegistry {
        &self.triggers
    }

    pub fn cursor(&self) -> Option<&CursorFollower> {
        self.cursor.as_ref()
    }

    pub fn pointer_fx(&self) -> Option<&PointerFxController> {
        self.pointer_fx.as_ref()
    }

    pub fn loopers(&self) -> &[LoopingTextSwapper] {
        &self.loopers
    }

    pub fn driver(&self) -> &FrameDriver {
        &self.driver
    }

    /// 拆分文字区域当前的时间线
    pub fn split_timeline(&self, root: NodeId) -> Option<TimelineId> {
        self.split_regions.get(&root).map(|region| region.timeline)
    }

    pub fn split_trigger(&self, root: NodeId) -> Option<TriggerId> {
        self.split_regions.get(&root).map(|region| region.trigger)
    }
}
