//! # Frame 模块
//!
//! 单一的每帧驱动器。
//!
//! 组件注册自己的 [`FrameTask`]，驱动器按固定顺序产出：
//! 滚动积分 → 触发器刷新与求值 → 动画推进 → 光标插值。

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// 每帧任务，声明顺序即执行顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrameTask {
    Scroll,
    Triggers,
    Animations,
    Cursor,
}

/// 帧驱动配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    /// 单帧 dt 上限（秒）；`None` 表示不做平滑
    #[serde(default)]
    pub max_frame_delta: Option<f32>,
}

/// 帧驱动器
#[derive(Debug, Default)]
pub struct FrameDriver {
    tasks: BTreeSet<FrameTask>,
    last: Option<f64>,
    max_frame_delta: Option<f32>,
    frame_count: u64,
}

impl FrameDriver {
    pub fn new(config: &FrameConfig) -> Self {
        Self {
            max_frame_delta: config.max_frame_delta.filter(|m| *m > 0.0),
            ..Self::default()
        }
    }

    /// 注册任务；已注册时返回 false
    pub fn register(&mut self, task: FrameTask) -> bool {
        let added = self.tasks.insert(task);
        if added {
            debug!(?task, "注册帧任务");
        }
        added
    }

    /// 注销任务；未注册时返回 false
    pub fn unregister(&mut self, task: FrameTask) -> bool {
        let removed = self.tasks.remove(&task);
        if removed {
            debug!(?task, "注销帧任务");
        }
        removed
    }

    pub fn is_registered(&self, task: FrameTask) -> bool {
        self.tasks.contains(&task)
    }

    /// 按执行顺序列出已注册的任务
    pub fn tasks(&self) -> Vec<FrameTask> {
        self.tasks.iter().copied().collect()
    }

    /// 由时间戳（秒）计算本帧 dt
    ///
    /// 第一帧 dt 为 0；时间倒退时 dt 为 0。
    pub fn advance(&mut self, now: f64) -> f32 {
        let dt = match self.last {
            Some(last) => (now - last).max(0.0) as f32,
            None => 0.0,
        };
        self.last = Some(now);
        self.frame_count += 1;
        match self.max_frame_delta {
            Some(max) => dt.min(max),
            None => dt,
        }
    }

    /// 忘记上一帧时间戳，下一帧 dt 重新为 0
    pub fn reset_clock(&mut self) {
        self.last = None;
    }

    /// 注销所有任务并重置时钟
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.last = None;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_run_in_fixed_order() {
        let mut driver = FrameDriver::default();
        driver.register(FrameTask::Cursor);
        driver.register(FrameTask::Animations);
        driver.register(FrameTask::Scroll);
        driver.register(FrameTask::Triggers);
        assert!(!driver.register(FrameTask::Scroll));

        assert_eq!(
            driver.tasks(),
            vec![
                FrameTask::Scroll,
                FrameTask::Triggers,
                FrameTask::Animations,
                FrameTask::Cursor
            ]
        );

        assert!(driver.unregister(FrameTask::Cursor));
        assert!(!driver.unregister(FrameTask::Cursor));
        assert!(!driver.is_registered(FrameTask::Cursor));
    }

    #[test]
    fn test_advance_computes_dt() {
        let mut driver = FrameDriver::default();
        assert_eq!(driver.advance(10.0), 0.0);
        assert!((driver.advance(10.5) - 0.5).abs() < 1e-6);
        assert_eq!(driver.advance(10.0), 0.0);
        assert_eq!(driver.frame_count(), 3);

        driver.reset_clock();
        assert_eq!(driver.advance(100.0), 0.0);
    }

    #[test]
    fn test_max_frame_delta() {
        let mut driver = FrameDriver::new(&FrameConfig {
            max_frame_delta: Some(0.1),
        });
        driver.advance(0.0);
        assert!((driver.advance(2.0) - 0.1).abs() < 1e-6);
    }
}
