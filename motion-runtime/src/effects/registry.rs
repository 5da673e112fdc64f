//! # Effect Registry
//!
//! 效果类型定义与默认参数。
//! 这是所有效果名称、默认值的**唯一来源**。

use serde::{Deserialize, Serialize};

use crate::animation::{EaseDirection, EasingFunction, Prop, Repeat};

/// 滑入方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideDirection {
    Left,
    Right,
    Up,
    Down,
}

impl SlideDirection {
    /// 起始偏移 `(x, y)`：从哪一侧滑入
    pub fn offset(&self, distance: f32) -> (f32, f32) {
        match self {
            SlideDirection::Left => (-distance, 0.0),
            SlideDirection::Right => (distance, 0.0),
            SlideDirection::Up => (0.0, -distance),
            SlideDirection::Down => (0.0, distance),
        }
    }
}

/// 效果类型
///
/// ## 语义说明
///
/// - 通用入场：`Reveal` / `Fade` / `Scale` / `Blur` / `Slide` / `StaggeredReveal`
/// - 文本预设：`CharReveal` / `WordReveal` / `LineReveal` / `Typewriter`，
///   作用于拆分后的包装节点
/// - 页面区域：`ParagraphReveal` / `TitleReveal`（滚动触发），`LandingIntro`，
///   `SectionReveal`
/// - 循环换字：`SwapEnter` / `SwapExit` / `SwapReturn`
/// - 光标：`Cursor*`，作用于光标节点的 "to" 补间
/// - 页面过渡：`Page*` / `Curtain*` / `RevealClip` / `Loading*`
/// - 文字特效：`Glitch` / `WaveRise` / `WaveFall`
/// - 指针特效：`Magnetic*` / `Hover*` / `Tilt*`，均为 "to" 补间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Reveal,
    Fade,
    Scale,
    Blur,
    Slide(SlideDirection),
    StaggeredReveal,
    CharReveal,
    WordReveal,
    LineReveal,
    Typewriter,
    ParagraphReveal,
    TitleReveal,
    LandingIntro,
    SectionReveal,
    /// 下一行文字自下方进入
    SwapEnter,
    /// 当前文字向上退出
    SwapExit,
    /// 退出的文字自下方返回
    SwapReturn,
    /// `data-cursor="disable"`：光标缩为 0
    CursorHide,
    /// `data-cursor="icons"`：光标包住目标，尺寸由调用方给出
    CursorIcons,
    /// 悬停普通交互元素：光标放大
    CursorHover,
    /// 离开交互元素：恢复默认外观
    CursorLeave,
    CursorPress,
    CursorRelease,
    /// 小圆点隐藏 / 显示
    CursorDotHide,
    CursorDotShow,
    /// 指针离开 / 进入窗口
    CursorFadeOut,
    CursorFadeIn,
    /// 页面内容自下方淡入
    PageEnter,
    /// 页面内容向上淡出
    PageExit,
    /// 页面内容从一侧整屏滑入，距离由调用方按布局盒给出
    PageSlide(SlideDirection),
    PageFade,
    /// 幕布展开 / 收起（纵向缩放）
    CurtainIn,
    CurtainOut,
    /// 自左向右去除裁剪
    RevealClip,
    /// 加载层淡出
    LoadingFade,
    /// 加载完成后主内容入场
    LoadingContent,
    /// 字符从随机偏移处闪现，偏移由调用方逐个给出
    Glitch,
    /// 波浪：字符上扬 / 回落
    WaveRise,
    WaveFall,
    /// 元素被指针吸引，位移由调用方给出
    MagneticPull,
    MagneticRelease,
    HoverScale,
    HoverRelease,
    /// 元素随指针倾斜，角度由调用方给出
    Tilt,
    TiltRelease,
}

/// 各效果的默认参数
///
/// 这些常量是效果参数的**唯一来源**，任何需要默认时长、错开间隔的地方
/// 都应使用这些常量，而非硬编码数字。
pub mod defaults {
    use crate::animation::{EaseDirection, EasingFunction};

    // 时长（秒）
    pub const DURATION_FAST: f32 = 0.3;
    pub const DURATION_NORMAL: f32 = 0.6;
    pub const DURATION_SLOW: f32 = 1.0;
    pub const DURATION_VERY_SLOW: f32 = 1.5;

    // 错开间隔（秒）
    pub const STAGGER_FAST: f32 = 0.02;
    pub const STAGGER_NORMAL: f32 = 0.05;
    pub const STAGGER_SLOW: f32 = 0.1;

    /// 未指定缓动时的全局默认
    pub const EASE: EasingFunction = EasingFunction::POWER3_OUT;
    pub const EASE_SMOOTH: EasingFunction = EasingFunction::POWER2_OUT;
    pub const EASE_BACK: EasingFunction = EasingFunction::Back(1.7, EaseDirection::Out);
    pub const EASE_ELASTIC: EasingFunction = EasingFunction::ElasticOut {
        amplitude: 1.0,
        period: 0.5,
    };

    pub const REVEAL_Y: f32 = 60.0;
    pub const SCALE_FROM: f32 = 0.9;
    pub const BLUR_FROM: f32 = 10.0;
    pub const BLUR_Y: f32 = 40.0;
    pub const SLIDE_DISTANCE: f32 = 100.0;
    pub const STAGGERED_Y: f32 = 80.0;

    pub const CHAR_Y: f32 = 80.0;
    pub const CHAR_ROTATE: f32 = 10.0;
    pub const CHAR_BLUR: f32 = 5.0;
    pub const WORD_Y: f32 = 60.0;
    pub const LINE_Y: f32 = 100.0;

    pub const PARAGRAPH_DURATION: f32 = 1.0;
    pub const PARAGRAPH_STAGGER: f32 = 0.02;
    pub const TITLE_DURATION: f32 = 0.8;
    pub const TITLE_STAGGER: f32 = 0.03;

    pub const LANDING_DURATION: f32 = 1.2;
    pub const LANDING_STAGGER: f32 = 0.025;
    pub const LANDING_DELAY: f32 = 0.3;

    /// 循环换字：每段 1.2 秒，字符间隔 0.1 秒，进入/退出偏移 80
    pub const SWAP_DURATION: f32 = 1.2;
    pub const SWAP_STAGGER: f32 = 0.1;
    pub const SWAP_OFFSET: f32 = 80.0;
    /// 第一次换字的延迟；第二次在 `2 * SWAP_DELAY + 1` 秒处
    pub const SWAP_DELAY: f32 = 4.0;
    pub const SWAP_REPEAT_DELAY: f32 = 1.0;

    /// 光标跟随的插值系数（悬停时更快）
    pub const CURSOR_SMOOTHING: f32 = 0.15;
    pub const CURSOR_HOVER_SMOOTHING: f32 = 0.2;

    pub const CURSOR_HOVER_SCALE: f32 = 1.5;
    pub const CURSOR_PRESS_SCALE: f32 = 0.8;
    pub const CURSOR_SIZE: f32 = 50.0;
    pub const CURSOR_RADIUS: f32 = 25.0;
    pub const CURSOR_ICON_PADDING: f32 = 20.0;
    pub const CURSOR_ICON_RADIUS: f32 = 10.0;
    pub const CURSOR_DOT_DURATION: f32 = 0.2;
    pub const CURSOR_PRESS_DURATION: f32 = 0.1;
    pub const CURSOR_RELEASE_DURATION: f32 = 0.2;

    // ========== 页面过渡 ==========

    pub const EASE_PAGE: EasingFunction = EasingFunction::POWER3_IN_OUT;
    pub const PAGE_ENTER_Y: f32 = 50.0;
    pub const PAGE_ENTER_DURATION: f32 = 0.8;
    pub const PAGE_EXIT_Y: f32 = -30.0;
    pub const PAGE_EXIT_DURATION: f32 = 0.5;
    pub const PAGE_FADE_DURATION: f32 = 0.5;
    /// 幕布展开与收起合计
    pub const CURTAIN_DURATION: f32 = 1.0;
    pub const REVEAL_CLIP_DURATION: f32 = 1.2;
    pub const LOADING_FADE_DURATION: f32 = 0.5;
    pub const LOADING_CONTENT_Y: f32 = 30.0;
    pub const LOADING_CONTENT_DURATION: f32 = 0.8;
    /// 主内容入场与加载层淡出的重叠
    pub const LOADING_OVERLAP: f32 = 0.3;

    // ========== 文字特效 ==========

    pub const GLITCH_DURATION: f32 = 0.05;
    pub const GLITCH_INTENSITY: f32 = 5.0;
    pub const GLITCH_STAGGER: f32 = 0.02;
    pub const WAVE_AMPLITUDE: f32 = 20.0;
    /// 上扬与回落合计
    pub const WAVE_DURATION: f32 = 0.6;
    pub const WAVE_STAGGER: f32 = 0.05;

    // ========== 指针特效 ==========

    /// 松开后的回弹
    pub const EASE_SPRING: EasingFunction = EasingFunction::ElasticOut {
        amplitude: 1.0,
        period: 0.3,
    };
    pub const MAGNETIC_STRENGTH: f32 = 0.5;
    pub const MAGNETIC_DURATION: f32 = 0.5;
    pub const MAGNETIC_RELEASE_DURATION: f32 = 0.8;
    pub const HOVER_SCALE: f32 = 1.1;
    pub const HOVER_SCALE_DURATION: f32 = 0.4;
    pub const HOVER_RELEASE_DURATION: f32 = 0.6;
    pub const TILT_MAX: f32 = 15.0;
    pub const TILT_SCALE: f32 = 1.05;
    pub const TILT_DURATION: f32 = 0.3;
    pub const TILT_RELEASE_DURATION: f32 = 0.5;
}

/// 属性状态：有序的 (属性, 值) 列表
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisualState(Vec<(Prop, f32)>);

impl VisualState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置属性，已存在时覆盖
    pub fn with(mut self, prop: Prop, value: f32) -> Self {
        self.set(prop, value);
        self
    }

    pub fn set(&mut self, prop: Prop, value: f32) {
        match self.0.iter_mut().find(|(p, _)| *p == prop) {
            Some(entry) => entry.1 = value,
            None => self.0.push((prop, value)),
        }
    }

    pub fn get(&self, prop: Prop) -> Option<f32> {
        self.0.iter().find(|(p, _)| *p == prop).map(|(_, v)| *v)
    }

    pub fn props(&self) -> impl Iterator<Item = Prop> + '_ {
        self.0.iter().map(|(p, _)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Prop, f32)> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// 效果的完整默认参数
#[derive(Debug, Clone, PartialEq)]
pub struct EffectDefaults {
    /// 起始状态；为空表示 "to" 补间（从当前值出发）
    pub from: VisualState,
    pub to: VisualState,
    pub duration: f32,
    pub stagger: f32,
    pub ease: EasingFunction,
    pub delay: f32,
    pub repeat: Repeat,
    pub repeat_delay: f32,
}

impl EffectDefaults {
    fn tween(from: VisualState, to: VisualState, duration: f32, ease: EasingFunction) -> Self {
        Self {
            from,
            to,
            duration,
            stagger: 0.0,
            ease,
            delay: 0.0,
            repeat: Repeat::Once,
            repeat_delay: 0.0,
        }
    }

    fn stagger(mut self, stagger: f32) -> Self {
        self.stagger = stagger;
        self
    }

    fn delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }
}

/// 入场终态：不透明、无位移
fn settled() -> VisualState {
    VisualState::new()
        .with(Prop::Opacity, 1.0)
        .with(Prop::Y, 0.0)
}

impl EffectKind {
    /// 效果名称（日志用）
    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::Reveal => "reveal",
            EffectKind::Fade => "fade",
            EffectKind::Scale => "scale",
            EffectKind::Blur => "blur",
            EffectKind::Slide(_) => "slide",
            EffectKind::StaggeredReveal => "staggered_reveal",
            EffectKind::CharReveal => "char_reveal",
            EffectKind::WordReveal => "word_reveal",
            EffectKind::LineReveal => "line_reveal",
            EffectKind::Typewriter => "typewriter",
            EffectKind::ParagraphReveal => "paragraph_reveal",
            EffectKind::TitleReveal => "title_reveal",
            EffectKind::LandingIntro => "landing_intro",
            EffectKind::SectionReveal => "section_reveal",
            EffectKind::SwapEnter => "swap_enter",
            EffectKind::SwapExit => "swap_exit",
            EffectKind::SwapReturn => "swap_return",
            EffectKind::CursorHide => "cursor_hide",
            EffectKind::CursorIcons => "cursor_icons",
            EffectKind::CursorHover => "cursor_hover",
            EffectKind::CursorLeave => "cursor_leave",
            EffectKind::CursorPress => "cursor_press",
            EffectKind::CursorRelease => "cursor_release",
            EffectKind::CursorDotHide => "cursor_dot_hide",
            EffectKind::CursorDotShow => "cursor_dot_show",
            EffectKind::CursorFadeOut => "cursor_fade_out",
            EffectKind::CursorFadeIn => "cursor_fade_in",
            EffectKind::PageEnter => "page_enter",
            EffectKind::PageExit => "page_exit",
            EffectKind::PageSlide(_) => "page_slide",
            EffectKind::PageFade => "page_fade",
            EffectKind::CurtainIn => "curtain_in",
            EffectKind::CurtainOut => "curtain_out",
            EffectKind::RevealClip => "reveal_clip",
            EffectKind::LoadingFade => "loading_fade",
            EffectKind::LoadingContent => "loading_content",
            EffectKind::Glitch => "glitch",
            EffectKind::WaveRise => "wave_rise",
            EffectKind::WaveFall => "wave_fall",
            EffectKind::MagneticPull => "magnetic_pull",
            EffectKind::MagneticRelease => "magnetic_release",
            EffectKind::HoverScale => "hover_scale",
            EffectKind::HoverRelease => "hover_release",
            EffectKind::Tilt => "tilt",
            EffectKind::TiltRelease => "tilt_release",
        }
    }

    /// 方向相关效果（调用方的 direction 选项生效）
    pub fn is_directional(&self) -> bool {
        matches!(self, EffectKind::Slide(_) | EffectKind::PageSlide(_))
    }

    /// 该效果的默认参数
    pub fn defaults(&self) -> EffectDefaults {
        use defaults::*;

        match *self {
            EffectKind::Reveal => EffectDefaults::tween(
                VisualState::new()
                    .with(Prop::Y, REVEAL_Y)
                    .with(Prop::Opacity, 0.0),
                settled(),
                DURATION_NORMAL,
                EASE,
            )
            .stagger(STAGGER_NORMAL),

            EffectKind::Fade => EffectDefaults::tween(
                VisualState::new().with(Prop::Opacity, 0.0),
                VisualState::new().with(Prop::Opacity, 1.0),
                DURATION_NORMAL,
                EASE_SMOOTH,
            ),

            EffectKind::Scale => EffectDefaults::tween(
                VisualState::new()
                    .with(Prop::Scale, SCALE_FROM)
                    .with(Prop::Opacity, 0.0),
                VisualState::new()
                    .with(Prop::Scale, 1.0)
                    .with(Prop::Opacity, 1.0),
                DURATION_NORMAL,
                EASE_BACK,
            ),

            EffectKind::Blur => EffectDefaults::tween(
                VisualState::new()
                    .with(Prop::Blur, BLUR_FROM)
                    .with(Prop::Y, BLUR_Y)
                    .with(Prop::Opacity, 0.0),
                settled().with(Prop::Blur, 0.0),
                DURATION_SLOW,
                EasingFunction::POWER3_IN_OUT,
            ),

            EffectKind::Slide(direction) => {
                let (x, y) = direction.offset(SLIDE_DISTANCE);
                EffectDefaults::tween(
                    VisualState::new()
                        .with(Prop::X, x)
                        .with(Prop::Y, y)
                        .with(Prop::Opacity, 0.0),
                    settled().with(Prop::X, 0.0),
                    DURATION_NORMAL,
                    EASE,
                )
            }

            EffectKind::StaggeredReveal => EffectDefaults::tween(
                VisualState::new()
                    .with(Prop::Y, STAGGERED_Y)
                    .with(Prop::Opacity, 0.0),
                settled(),
                DURATION_SLOW,
                EASE,
            )
            .stagger(STAGGER_NORMAL),

            EffectKind::CharReveal => EffectDefaults::tween(
                VisualState::new()
                    .with(Prop::Opacity, 0.0)
                    .with(Prop::Y, CHAR_Y)
                    .with(Prop::Rotate, CHAR_ROTATE)
                    .with(Prop::Blur, CHAR_BLUR),
                settled().with(Prop::Rotate, 0.0).with(Prop::Blur, 0.0),
                DURATION_SLOW,
                EASE,
            )
            .stagger(0.03),

            EffectKind::WordReveal => EffectDefaults::tween(
                VisualState::new()
                    .with(Prop::Opacity, 0.0)
                    .with(Prop::Y, WORD_Y),
                settled(),
                0.8,
                EASE,
            )
            .stagger(STAGGER_NORMAL),

            EffectKind::LineReveal => EffectDefaults::tween(
                VisualState::new()
                    .with(Prop::Opacity, 0.0)
                    .with(Prop::Y, LINE_Y),
                settled(),
                DURATION_SLOW,
                EasingFunction::POWER3_IN_OUT,
            )
            .stagger(0.15),

            EffectKind::Typewriter => EffectDefaults::tween(
                VisualState::new().with(Prop::Opacity, 0.0),
                VisualState::new().with(Prop::Opacity, 1.0),
                0.1,
                EasingFunction::Linear,
            )
            .stagger(STAGGER_NORMAL),

            EffectKind::ParagraphReveal => EffectDefaults::tween(
                VisualState::new()
                    .with(Prop::Opacity, 0.0)
                    .with(Prop::Y, CHAR_Y),
                settled(),
                PARAGRAPH_DURATION,
                EASE,
            )
            .stagger(PARAGRAPH_STAGGER),

            EffectKind::TitleReveal => EffectDefaults::tween(
                VisualState::new()
                    .with(Prop::Opacity, 0.0)
                    .with(Prop::Y, CHAR_Y)
                    .with(Prop::Rotate, CHAR_ROTATE),
                settled().with(Prop::Rotate, 0.0),
                TITLE_DURATION,
                EasingFunction::POWER2_IN_OUT,
            )
            .stagger(TITLE_STAGGER),

            EffectKind::LandingIntro => EffectDefaults::tween(
                VisualState::new()
                    .with(Prop::Opacity, 0.0)
                    .with(Prop::Y, CHAR_Y)
                    .with(Prop::Blur, CHAR_BLUR),
                settled().with(Prop::Blur, 0.0),
                LANDING_DURATION,
                EasingFunction::POWER3_IN_OUT,
            )
            .stagger(LANDING_STAGGER)
            .delay(LANDING_DELAY),

            EffectKind::SectionReveal => EffectDefaults::tween(
                VisualState::new()
                    .with(Prop::Opacity, 0.0)
                    .with(Prop::Y, CHAR_Y),
                settled(),
                DURATION_SLOW,
                EASE,
            ),

            EffectKind::SwapEnter => EffectDefaults::tween(
                VisualState::new()
                    .with(Prop::Opacity, 0.0)
                    .with(Prop::Y, SWAP_OFFSET),
                settled(),
                SWAP_DURATION,
                EasingFunction::POWER3_IN_OUT,
            )
            .stagger(SWAP_STAGGER),

            EffectKind::SwapExit => EffectDefaults::tween(
                VisualState::new().with(Prop::Y, 0.0),
                VisualState::new().with(Prop::Y, -SWAP_OFFSET),
                SWAP_DURATION,
                EasingFunction::POWER3_IN_OUT,
            )
            .stagger(SWAP_STAGGER),

            EffectKind::SwapReturn => EffectDefaults::tween(
                VisualState::new().with(Prop::Y, SWAP_OFFSET),
                VisualState::new().with(Prop::Y, 0.0),
                SWAP_DURATION,
                EasingFunction::POWER3_IN_OUT,
            )
            .stagger(SWAP_STAGGER),

            EffectKind::CursorHide => EffectDefaults::tween(
                VisualState::new(),
                VisualState::new().with(Prop::Scale, 0.0),
                DURATION_FAST,
                EASE_SMOOTH,
            ),

            EffectKind::CursorIcons => EffectDefaults::tween(
                VisualState::new(),
                VisualState::new().with(Prop::Radius, CURSOR_ICON_RADIUS),
                DURATION_FAST,
                EASE_SMOOTH,
            ),

            EffectKind::CursorHover => EffectDefaults::tween(
                VisualState::new(),
                VisualState::new().with(Prop::Scale, CURSOR_HOVER_SCALE),
                DURATION_FAST,
                EASE_ELASTIC,
            ),

            EffectKind::CursorLeave => EffectDefaults::tween(
                VisualState::new(),
                VisualState::new()
                    .with(Prop::Scale, 1.0)
                    .with(Prop::Width, CURSOR_SIZE)
                    .with(Prop::Height, CURSOR_SIZE)
                    .with(Prop::Radius, CURSOR_RADIUS),
                DURATION_FAST,
                EASE_SMOOTH,
            ),

            EffectKind::CursorPress => EffectDefaults::tween(
                VisualState::new(),
                VisualState::new().with(Prop::Scale, CURSOR_PRESS_SCALE),
                CURSOR_PRESS_DURATION,
                EASE_SMOOTH,
            ),

            EffectKind::CursorRelease => EffectDefaults::tween(
                VisualState::new(),
                VisualState::new().with(Prop::Scale, 1.0),
                CURSOR_RELEASE_DURATION,
                EASE_SMOOTH,
            ),

            EffectKind::CursorDotHide => EffectDefaults::tween(
                VisualState::new(),
                VisualState::new().with(Prop::Scale, 0.0),
                CURSOR_DOT_DURATION,
                EASE_SMOOTH,
            ),

            EffectKind::CursorDotShow => EffectDefaults::tween(
                VisualState::new(),
                VisualState::new().with(Prop::Scale, 1.0),
                DURATION_FAST,
                EASE_SMOOTH,
            ),

            EffectKind::CursorFadeOut => EffectDefaults::tween(
                VisualState::new(),
                VisualState::new().with(Prop::Opacity, 0.0),
                DURATION_FAST,
                EASE_SMOOTH,
            ),

            EffectKind::CursorFadeIn => EffectDefaults::tween(
                VisualState::new(),
                VisualState::new().with(Prop::Opacity, 1.0),
                DURATION_FAST,
                EASE_SMOOTH,
            ),

            EffectKind::PageEnter => EffectDefaults::tween(
                VisualState::new()
                    .with(Prop::Opacity, 0.0)
                    .with(Prop::Y, PAGE_ENTER_Y),
                settled(),
                PAGE_ENTER_DURATION,
                EASE_PAGE,
            ),

            EffectKind::PageExit => EffectDefaults::tween(
                VisualState::new(),
                VisualState::new()
                    .with(Prop::Opacity, 0.0)
                    .with(Prop::Y, PAGE_EXIT_Y),
                PAGE_EXIT_DURATION,
                EasingFunction::Power(2, EaseDirection::In),
            ),

            EffectKind::PageSlide(direction) => {
                let (x, y) = direction.offset(SLIDE_DISTANCE);
                EffectDefaults::tween(
                    VisualState::new()
                        .with(Prop::X, x)
                        .with(Prop::Y, y)
                        .with(Prop::Opacity, 0.0),
                    settled().with(Prop::X, 0.0),
                    PAGE_ENTER_DURATION,
                    EASE_PAGE,
                )
            }

            EffectKind::PageFade => EffectDefaults::tween(
                VisualState::new().with(Prop::Opacity, 0.0),
                VisualState::new().with(Prop::Opacity, 1.0),
                PAGE_FADE_DURATION,
                EasingFunction::POWER2_IN_OUT,
            ),

            EffectKind::CurtainIn => EffectDefaults::tween(
                VisualState::new().with(Prop::ScaleY, 0.0),
                VisualState::new().with(Prop::ScaleY, 1.0),
                CURTAIN_DURATION / 2.0,
                EasingFunction::Power(4, EaseDirection::InOut),
            ),

            EffectKind::CurtainOut => EffectDefaults::tween(
                VisualState::new(),
                VisualState::new().with(Prop::ScaleY, 0.0),
                CURTAIN_DURATION / 2.0,
                EasingFunction::Power(4, EaseDirection::InOut),
            ),

            EffectKind::RevealClip => EffectDefaults::tween(
                VisualState::new()
                    .with(Prop::Clip, 100.0)
                    .with(Prop::Opacity, 0.0),
                VisualState::new()
                    .with(Prop::Clip, 0.0)
                    .with(Prop::Opacity, 1.0),
                REVEAL_CLIP_DURATION,
                EASE,
            )
            .stagger(STAGGER_SLOW),

            EffectKind::LoadingFade => EffectDefaults::tween(
                VisualState::new(),
                VisualState::new().with(Prop::Opacity, 0.0),
                LOADING_FADE_DURATION,
                EasingFunction::POWER2_IN_OUT,
            ),

            EffectKind::LoadingContent => EffectDefaults::tween(
                VisualState::new()
                    .with(Prop::Opacity, 0.0)
                    .with(Prop::Y, LOADING_CONTENT_Y),
                settled(),
                LOADING_CONTENT_DURATION,
                EASE,
            ),

            EffectKind::Glitch => EffectDefaults::tween(
                VisualState::new()
                    .with(Prop::X, 0.0)
                    .with(Prop::Y, 0.0)
                    .with(Prop::Opacity, 0.0),
                settled().with(Prop::X, 0.0),
                GLITCH_DURATION,
                EASE_SMOOTH,
            )
            .stagger(GLITCH_STAGGER),

            EffectKind::WaveRise => EffectDefaults::tween(
                VisualState::new().with(Prop::Y, 0.0),
                VisualState::new().with(Prop::Y, -WAVE_AMPLITUDE),
                WAVE_DURATION / 2.0,
                EASE_SMOOTH,
            )
            .stagger(WAVE_STAGGER),

            EffectKind::WaveFall => EffectDefaults::tween(
                VisualState::new(),
                VisualState::new().with(Prop::Y, 0.0),
                WAVE_DURATION / 2.0,
                EasingFunction::Power(2, EaseDirection::In),
            )
            .stagger(WAVE_STAGGER),

            EffectKind::MagneticPull => EffectDefaults::tween(
                VisualState::new(),
                VisualState::new().with(Prop::X, 0.0).with(Prop::Y, 0.0),
                MAGNETIC_DURATION,
                EASE,
            ),

            EffectKind::MagneticRelease => EffectDefaults::tween(
                VisualState::new(),
                VisualState::new().with(Prop::X, 0.0).with(Prop::Y, 0.0),
                MAGNETIC_RELEASE_DURATION,
                EASE_SPRING,
            ),

            EffectKind::HoverScale => EffectDefaults::tween(
                VisualState::new(),
                VisualState::new().with(Prop::Scale, HOVER_SCALE),
                HOVER_SCALE_DURATION,
                EASE_SMOOTH,
            ),

            EffectKind::HoverRelease => EffectDefaults::tween(
                VisualState::new(),
                VisualState::new().with(Prop::Scale, 1.0),
                HOVER_RELEASE_DURATION,
                EASE_SPRING,
            ),

            EffectKind::Tilt => EffectDefaults::tween(
                VisualState::new(),
                VisualState::new()
                    .with(Prop::RotateX, 0.0)
                    .with(Prop::RotateY, 0.0)
                    .with(Prop::Scale, TILT_SCALE),
                TILT_DURATION,
                EASE_SMOOTH,
            ),

            EffectKind::TiltRelease => EffectDefaults::tween(
                VisualState::new(),
                VisualState::new()
                    .with(Prop::RotateX, 0.0)
                    .with(Prop::RotateY, 0.0)
                    .with(Prop::Scale, 1.0),
                TILT_RELEASE_DURATION,
                EASE_SMOOTH,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_offsets() {
        assert_eq!(SlideDirection::Left.offset(100.0), (-100.0, 0.0));
        assert_eq!(SlideDirection::Right.offset(100.0), (100.0, 0.0));
        assert_eq!(SlideDirection::Up.offset(50.0), (0.0, -50.0));
        assert_eq!(SlideDirection::Down.offset(50.0), (0.0, 50.0));
    }

    #[test]
    fn test_paragraph_and_title_defaults() {
        let para = EffectKind::ParagraphReveal.defaults();
        assert_eq!(para.duration, 1.0);
        assert_eq!(para.stagger, 0.02);
        assert_eq!(para.ease, EasingFunction::POWER3_OUT);
        assert_eq!(para.from.get(Prop::Y), Some(80.0));

        let title = EffectKind::TitleReveal.defaults();
        assert_eq!(title.duration, 0.8);
        assert_eq!(title.stagger, 0.03);
        assert_eq!(title.ease, EasingFunction::POWER2_IN_OUT);
        assert_eq!(title.from.get(Prop::Rotate), Some(10.0));
    }

    #[test]
    fn test_cursor_effects_are_to_tweens() {
        for kind in [
            EffectKind::CursorHide,
            EffectKind::CursorHover,
            EffectKind::CursorLeave,
            EffectKind::CursorPress,
        ] {
            assert!(kind.defaults().from.is_empty(), "{}", kind.name());
        }
        assert_eq!(
            EffectKind::CursorHide.defaults().to.get(Prop::Scale),
            Some(0.0)
        );
    }

    #[test]
    fn test_page_transition_defaults() {
        let enter = EffectKind::PageEnter.defaults();
        assert_eq!(enter.duration, 0.8);
        assert_eq!(enter.ease, EasingFunction::POWER3_IN_OUT);
        assert_eq!(enter.from.get(Prop::Y), Some(50.0));

        let exit = EffectKind::PageExit.defaults();
        assert!(exit.from.is_empty());
        assert_eq!(exit.to.get(Prop::Y), Some(-30.0));
        assert_eq!(exit.ease, EasingFunction::Power(2, EaseDirection::In));

        let curtain = EffectKind::CurtainIn.defaults();
        assert_eq!(curtain.duration, 0.5);
        assert_eq!(curtain.from.get(Prop::ScaleY), Some(0.0));

        let reveal = EffectKind::RevealClip.defaults();
        assert_eq!(reveal.stagger, 0.1);
        assert_eq!(reveal.from.get(Prop::Clip), Some(100.0));
        assert!(EffectKind::PageSlide(SlideDirection::Up).is_directional());
    }

    #[test]
    fn test_pointer_effects_are_to_tweens() {
        for kind in [
            EffectKind::MagneticPull,
            EffectKind::MagneticRelease,
            EffectKind::HoverScale,
            EffectKind::HoverRelease,
            EffectKind::Tilt,
            EffectKind::TiltRelease,
        ] {
            assert!(kind.defaults().from.is_empty(), "{}", kind.name());
        }
        let release = EffectKind::MagneticRelease.defaults();
        assert_eq!(release.duration, 0.8);
        assert_eq!(
            release.ease,
            EasingFunction::ElasticOut {
                amplitude: 1.0,
                period: 0.3
            }
        );
        assert_eq!(EffectKind::Tilt.defaults().to.get(Prop::Scale), Some(1.05));
    }

    #[test]
    fn test_visual_state_set_overrides() {
        let state = VisualState::new()
            .with(Prop::Y, 10.0)
            .with(Prop::Y, 20.0);
        assert_eq!(state.len(), 1);
        assert_eq!(state.get(Prop::Y), Some(20.0));
        assert_eq!(state.get(Prop::X), None);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&EffectKind::Slide(SlideDirection::Left)).unwrap();
        assert_eq!(json, r#"{"slide":"left"}"#);
        let kind: EffectKind = serde_json::from_str("\"paragraph_reveal\"").unwrap();
        assert_eq!(kind, EffectKind::ParagraphReveal);
        let kind: EffectKind = serde_json::from_str(r#"{"page_slide":"right"}"#).unwrap();
        assert_eq!(kind, EffectKind::PageSlide(SlideDirection::Right));
    }
}
