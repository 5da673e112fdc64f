//! # Scroll 模块
//!
//! 虚拟平滑滚动层：滚动偏移与原生滚动解耦，由帧驱动的补间推进。
//!
//! ## 核心概念
//!
//! - [`VirtualScroll`]: 当前偏移、目标偏移、速度与补间状态
//! - [`ScrollContext`]: 每个引擎上下文最多一个实例；`init` 幂等，`destroy` 后调用均为空操作
//! - [`ScrollFrame`]: 每帧输出，驱动滚动触发器
//!
//! 同一帧内的多次滚轮/触摸增量会被合并，在下一次 `tick` 中统一消费。

mod config;

use tracing::{debug, info};

use crate::animation::EasingFunction;

pub use config::{GestureOrientation, Orientation, ScrollConfig};

/// 滚动方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    #[default]
    Idle,
    /// 偏移增大
    Forward,
    /// 偏移减小
    Backward,
}

/// 每帧的滚动状态
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollFrame {
    pub offset: f32,
    /// 像素/秒
    pub velocity: f32,
    pub direction: ScrollDirection,
    /// `offset / limit`，limit 为 0 时为 0
    pub progress: f32,
    /// 本帧偏移是否变化
    pub changed: bool,
}

/// `scroll_to` 完成回调
pub type ScrollCallback = Box<dyn FnOnce()>;

/// `scroll_to` 选项
#[derive(Default)]
pub struct ScrollToOptions {
    /// 附加在目标上的偏移
    pub offset: f32,
    /// 覆盖配置中的补间时长
    pub duration: Option<f32>,
    pub easing: Option<EasingFunction>,
    /// 跳过补间直接到达
    pub immediate: bool,
    /// 补间期间忽略用户输入
    pub lock: bool,
    /// 暂停状态下也执行
    pub force: bool,
    pub on_complete: Option<ScrollCallback>,
}

impl std::fmt::Debug for ScrollToOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollToOptions")
            .field("offset", &self.offset)
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .field("immediate", &self.immediate)
            .field("lock", &self.lock)
            .field("force", &self.force)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl ScrollToOptions {
    pub fn immediate() -> Self {
        Self {
            immediate: true,
            ..Default::default()
        }
    }
}

/// 进行中的滚动补间
struct ScrollTween {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
    easing: EasingFunction,
    lock: bool,
    on_complete: Option<ScrollCallback>,
}

/// 虚拟滚动状态
pub struct VirtualScroll {
    config: ScrollConfig,
    current: f32,
    target: f32,
    velocity: f32,
    direction: ScrollDirection,
    paused: bool,
    content_size: f32,
    viewport_size: f32,
    /// 合并后尚未消费的输入增量
    pending_delta: f32,
    animation: Option<ScrollTween>,
    /// 立即跳转后，下一帧需要报告变化
    jumped: bool,
}

impl std::fmt::Debug for VirtualScroll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualScroll")
            .field("current", &self.current)
            .field("target", &self.target)
            .field("velocity", &self.velocity)
            .field("paused", &self.paused)
            .field("content_size", &self.content_size)
            .field("viewport_size", &self.viewport_size)
            .field("animating", &self.animation.is_some())
            .finish()
    }
}

impl VirtualScroll {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            current: 0.0,
            target: 0.0,
            velocity: 0.0,
            direction: ScrollDirection::Idle,
            paused: false,
            content_size: 0.0,
            viewport_size: 0.0,
            pending_delta: 0.0,
            animation: None,
            jumped: false,
        }
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    // ========== 尺寸 ==========

    /// 更新内容与视口尺寸（沿滚动轴），并重新钳制偏移
    pub fn set_dimensions(&mut self, content_size: f32, viewport_size: f32) {
        self.content_size = content_size.max(0.0);
        self.viewport_size = viewport_size.max(0.0);
        if !self.config.infinite {
            let clamped = self.clamp(self.current);
            if clamped != self.current {
                self.jumped = true;
            }
            self.current = clamped;
            self.target = self.clamp(self.target);
            if let Some(tween) = &mut self.animation {
                tween.to = self.target;
            }
        }
    }

    /// 最大偏移 `content - viewport`
    pub fn limit(&self) -> f32 {
        (self.content_size - self.viewport_size).max(0.0)
    }

    fn clamp(&self, value: f32) -> f32 {
        value.clamp(0.0, self.limit())
    }

    /// 把内部偏移换算为对外偏移
    fn wrap(&self, value: f32) -> f32 {
        if self.config.infinite {
            let limit = self.limit();
            if limit > 0.0 {
                return value.rem_euclid(limit);
            }
            return 0.0;
        }
        value
    }

    // ========== 查询 ==========

    /// 当前偏移（无限模式下已回绕）
    pub fn offset(&self) -> f32 {
        self.wrap(self.current)
    }

    pub fn target(&self) -> f32 {
        self.wrap(self.target)
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    fn is_locked(&self) -> bool {
        self.animation.as_ref().is_some_and(|a| a.lock)
    }

    pub fn progress(&self) -> f32 {
        let limit = self.limit();
        if limit <= 0.0 {
            0.0
        } else {
            (self.offset() / limit).clamp(0.0, 1.0)
        }
    }

    // ========== 输入 ==========

    /// 滚轮输入，合并到下一帧
    pub fn on_wheel(&mut self, dx: f32, dy: f32) {
        if self.paused || self.is_locked() {
            return;
        }
        self.pending_delta += self.config.wheel_delta(dx, dy);
    }

    /// 触摸拖动输入，合并到下一帧
    pub fn on_touch(&mut self, delta: f32) {
        if self.paused || self.is_locked() {
            return;
        }
        self.pending_delta += delta * self.config.touch_multiplier;
    }

    /// 原生滚动事件
    ///
    /// 空闲时采纳原生偏移；暂停时返回保持的偏移，宿主据此压制原生滚动。
    ///
    /// # 返回
    /// 宿主应呈现的偏移
    pub fn on_native_scroll(&mut self, offset: f32) -> f32 {
        if self.paused || self.animation.is_some() || self.pending_delta != 0.0 {
            return self.offset();
        }
        let adopted = if self.config.infinite {
            offset
        } else {
            self.clamp(offset)
        };
        if adopted != self.current {
            self.current = adopted;
            self.target = adopted;
            self.jumped = true;
        }
        self.offset()
    }

    /// 暂停 / 恢复。暂停期间状态保留，输入被忽略
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            debug!(paused, "平滑滚动暂停状态变化");
        }
        self.paused = paused;
        if paused {
            self.pending_delta = 0.0;
        }
    }

    pub fn pause(&mut self) {
        self.set_paused(true);
    }

    pub fn resume(&mut self) {
        self.set_paused(false);
    }

    /// 滚动到指定偏移
    ///
    /// # 返回
    /// 是否被接受（暂停或锁定时，未指定 `force` 会被忽略）
    pub fn scroll_to(&mut self, target: f32, options: ScrollToOptions) -> bool {
        if (self.paused || self.is_locked()) && !options.force {
            debug!(target, "滚动被忽略：已暂停或锁定");
            return false;
        }

        let raw = target + options.offset;
        let destination = if self.config.infinite {
            raw
        } else {
            self.clamp(raw)
        };
        self.pending_delta = 0.0;

        if options.immediate {
            let previous = self.current;
            self.current = destination;
            self.target = destination;
            self.velocity = 0.0;
            self.direction = direction_of(destination - previous);
            self.animation = None;
            self.jumped = true;
            if let Some(callback) = options.on_complete {
                callback();
            }
            return true;
        }

        self.start_tween(
            destination,
            options.duration.unwrap_or(self.config.duration),
            options.easing.unwrap_or(self.config.easing),
            options.lock,
            options.on_complete,
        );
        true
    }

    fn start_tween(
        &mut self,
        to: f32,
        duration: f32,
        easing: EasingFunction,
        lock: bool,
        on_complete: Option<ScrollCallback>,
    ) {
        self.target = to;
        self.animation = Some(ScrollTween {
            from: self.current,
            to,
            elapsed: 0.0,
            duration: duration.max(0.0),
            easing,
            lock,
            on_complete,
        });
    }

    // ========== 推进 ==========

    /// 推进一帧
    pub fn tick(&mut self, dt: f32) -> ScrollFrame {
        let previous = self.current;
        let mut changed = std::mem::take(&mut self.jumped);

        if !self.paused {
            self.consume_pending();
            self.advance(dt);
        }

        let moved = self.current - previous;
        if moved != 0.0 {
            changed = true;
        }
        self.velocity = if dt > 0.0 { moved / dt } else { 0.0 };
        if moved != 0.0 {
            self.direction = direction_of(moved);
        } else if self.animation.is_none() {
            self.direction = ScrollDirection::Idle;
        }

        ScrollFrame {
            offset: self.offset(),
            velocity: self.velocity,
            direction: self.direction,
            progress: self.progress(),
            changed,
        }
    }

    fn consume_pending(&mut self) {
        let delta = std::mem::take(&mut self.pending_delta);
        if delta == 0.0 {
            return;
        }
        let destination = if self.config.infinite {
            self.target + delta
        } else {
            self.clamp(self.target + delta)
        };
        if self.config.smooth_wheel {
            self.start_tween(
                destination,
                self.config.duration,
                self.config.easing,
                false,
                None,
            );
        } else {
            self.current = destination;
            self.target = destination;
            self.animation = None;
        }
    }

    fn advance(&mut self, dt: f32) {
        let bounds = (!self.config.infinite).then(|| self.limit());
        let Some(tween) = &mut self.animation else {
            return;
        };
        tween.elapsed += dt.max(0.0);
        let t = if tween.duration <= 0.0 {
            1.0
        } else {
            (tween.elapsed / tween.duration).min(1.0)
        };
        let mut value = tween.from + (tween.to - tween.from) * tween.easing.apply(t);
        // 过冲缓动不得越过 [0, limit]
        if let Some(limit) = bounds {
            value = value.clamp(0.0, limit);
        }

        if t >= 1.0 {
            self.current = tween.to;
            let callback = tween.on_complete.take();
            self.animation = None;
            if let Some(callback) = callback {
                callback();
            }
        } else {
            self.current = value;
        }
    }
}

fn direction_of(delta: f32) -> ScrollDirection {
    if delta > 0.0 {
        ScrollDirection::Forward
    } else if delta < 0.0 {
        ScrollDirection::Backward
    } else {
        ScrollDirection::Idle
    }
}

/// 平滑滚动上下文：每个引擎至多一个实例
#[derive(Debug, Default)]
pub struct ScrollContext {
    instance: Option<VirtualScroll>,
}

impl ScrollContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 初始化；已初始化时返回现有实例，配置不变
    pub fn init(&mut self, config: ScrollConfig) -> &mut VirtualScroll {
        if self.instance.is_none() {
            info!("平滑滚动初始化");
        }
        self.instance.get_or_insert_with(|| VirtualScroll::new(config))
    }

    pub fn get(&self) -> Option<&VirtualScroll> {
        self.instance.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut VirtualScroll> {
        self.instance.as_mut()
    }

    pub fn is_initialized(&self) -> bool {
        self.instance.is_some()
    }

    /// 未初始化时记录日志并忽略
    pub fn scroll_to(&mut self, target: f32, options: ScrollToOptions) -> bool {
        match self.instance.as_mut() {
            Some(scroll) => scroll.scroll_to(target, options),
            None => {
                debug!(target, "平滑滚动未初始化，忽略 scroll_to");
                false
            }
        }
    }

    /// 销毁实例；之后的调用均为空操作
    pub fn destroy(&mut self) {
        if self.instance.take().is_some() {
            info!("平滑滚动已销毁");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::animation::EaseDirection;

    fn scroll() -> VirtualScroll {
        let mut scroll = VirtualScroll::new(ScrollConfig::default());
        scroll.set_dimensions(5000.0, 800.0);
        scroll
    }

    fn run(scroll: &mut VirtualScroll, seconds: f32) -> ScrollFrame {
        let mut frame = ScrollFrame::default();
        let steps = (seconds / 0.016).ceil() as usize;
        for _ in 0..steps {
            frame = scroll.tick(0.016);
        }
        frame
    }

    #[test]
    fn test_immediate_scroll_to() {
        let mut scroll = scroll();
        assert!(scroll.scroll_to(1000.0, ScrollToOptions::immediate()));
        let frame = scroll.tick(0.016);
        assert_eq!(frame.offset, 1000.0);
        assert!(frame.changed);
        assert!(!scroll.is_animating());
    }

    #[test]
    fn test_eased_scroll_to_reaches_target() {
        let mut scroll = scroll();
        scroll.scroll_to(1000.0, ScrollToOptions::default());

        let mid = run(&mut scroll, 0.3);
        assert!(mid.offset > 0.0 && mid.offset < 1000.0);
        assert_eq!(mid.direction, ScrollDirection::Forward);
        assert!(mid.velocity > 0.0);

        let end = run(&mut scroll, 1.0);
        assert_eq!(end.offset, 1000.0);
        assert!(!scroll.is_animating());
    }

    #[test]
    fn test_clamp_to_limit() {
        let mut scroll = scroll();
        scroll.scroll_to(99_999.0, ScrollToOptions::immediate());
        assert_eq!(scroll.offset(), 4200.0);

        scroll.scroll_to(-50.0, ScrollToOptions::immediate());
        assert_eq!(scroll.offset(), 0.0);

        for _ in 0..20 {
            scroll.on_wheel(0.0, -500.0);
        }
        let frame = run(&mut scroll, 2.0);
        assert_eq!(frame.offset, 0.0);
    }

    #[test]
    fn test_overshooting_ease_stays_within_limit() {
        let mut scroll = scroll();
        let options = ScrollToOptions {
            easing: Some(EasingFunction::Back(1.7, EaseDirection::Out)),
            ..ScrollToOptions::default()
        };
        scroll.scroll_to(4200.0, options);

        for _ in 0..100 {
            let frame = scroll.tick(0.016);
            assert!(frame.offset >= 0.0 && frame.offset <= 4200.0);
            assert!(frame.progress <= 1.0);
        }
        assert_eq!(scroll.offset(), 4200.0);
    }

    #[test]
    fn test_resize_reclamps() {
        let mut scroll = scroll();
        scroll.scroll_to(4000.0, ScrollToOptions::immediate());
        scroll.set_dimensions(2000.0, 800.0);
        assert_eq!(scroll.offset(), 1200.0);
    }

    #[test]
    fn test_wheel_deltas_are_batched() {
        let mut scroll = scroll();
        scroll.on_wheel(0.0, 100.0);
        scroll.on_wheel(0.0, 150.0);
        scroll.tick(0.0);
        assert_eq!(scroll.target(), 250.0);

        let frame = run(&mut scroll, 1.3);
        assert_eq!(frame.offset, 250.0);
    }

    #[test]
    fn test_touch_multiplier() {
        let mut scroll = scroll();
        scroll.on_touch(50.0);
        scroll.tick(0.0);
        assert_eq!(scroll.target(), 100.0);
    }

    #[test]
    fn test_paused_ignores_input_and_holds_native() {
        let mut scroll = scroll();
        scroll.scroll_to(300.0, ScrollToOptions::immediate());
        scroll.pause();

        scroll.on_wheel(0.0, 500.0);
        assert!(!scroll.scroll_to(900.0, ScrollToOptions::immediate()));
        assert_eq!(scroll.on_native_scroll(700.0), 300.0);
        let frame = run(&mut scroll, 0.5);
        assert_eq!(frame.offset, 300.0);

        // force 可以绕过暂停
        assert!(scroll.scroll_to(
            900.0,
            ScrollToOptions {
                immediate: true,
                force: true,
                ..Default::default()
            }
        ));
        assert_eq!(scroll.offset(), 900.0);

        scroll.resume();
        assert_eq!(scroll.on_native_scroll(700.0), 700.0);
    }

    #[test]
    fn test_lock_ignores_user_input() {
        let mut scroll = scroll();
        scroll.scroll_to(
            1000.0,
            ScrollToOptions {
                lock: true,
                ..Default::default()
            },
        );
        scroll.on_wheel(0.0, 2000.0);
        assert!(!scroll.scroll_to(0.0, ScrollToOptions::immediate()));
        let frame = run(&mut scroll, 1.3);
        assert_eq!(frame.offset, 1000.0);
    }

    #[test]
    fn test_on_complete_fires_once() {
        let mut scroll = scroll();
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        scroll.scroll_to(
            500.0,
            ScrollToOptions {
                duration: Some(0.1),
                on_complete: Some(Box::new(move || counter.set(counter.get() + 1))),
                ..Default::default()
            },
        );
        run(&mut scroll, 0.5);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_infinite_wraps() {
        let config = ScrollConfig {
            infinite: true,
            ..Default::default()
        };
        let mut scroll = VirtualScroll::new(config);
        scroll.set_dimensions(1200.0, 200.0);
        scroll.scroll_to(1100.0, ScrollToOptions::immediate());
        assert_eq!(scroll.offset(), 100.0);
        scroll.scroll_to(-100.0, ScrollToOptions::immediate());
        assert_eq!(scroll.offset(), 900.0);
    }

    #[test]
    fn test_context_init_is_idempotent() {
        let mut context = ScrollContext::new();
        assert!(!context.scroll_to(100.0, ScrollToOptions::immediate()));

        context.init(ScrollConfig::default()).set_dimensions(2000.0, 500.0);
        let again = context.init(ScrollConfig {
            duration: 5.0,
            ..Default::default()
        });
        assert_eq!(again.config().duration, 1.2);
        assert_eq!(again.limit(), 1500.0);

        context.destroy();
        context.destroy();
        assert!(!context.is_initialized());
        assert!(!context.scroll_to(100.0, ScrollToOptions::immediate()));
    }
}
