//! 集成测试公共设施

#![allow(dead_code)]

use marionette_driver::{ControlState, Figure, RecordingDriver};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

/// 控制周期（50 Hz）
pub const TICK_MS: u64 = 20;

/// 以固定步长驱动 Figure 的测试夹具
pub struct Harness {
    pub figure: Figure,
    pub state: ControlState,
    pub driver: RecordingDriver,
    pub rng: StdRng,
    now_ms: u64,
    started: bool,
}

impl Harness {
    pub fn new(seed: u64) -> Self {
        Self::with_parts(Figure::new(), ControlState::in_memory(), seed)
    }

    pub fn with_parts(figure: Figure, state: ControlState, seed: u64) -> Self {
        Self {
            figure,
            state,
            driver: RecordingDriver::new(),
            rng: StdRng::seed_from_u64(seed),
            now_ms: 0,
            started: false,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// 执行下一个 tick（第一个 tick 在 0 ms）
    pub fn step(&mut self) {
        if self.started {
            self.now_ms += TICK_MS;
        }
        self.started = true;
        self.figure.tick(
            Duration::from_millis(self.now_ms),
            &self.state,
            &mut self.driver,
            &mut self.rng,
        );
    }

    /// 一直 tick 到 `ms`（含）
    pub fn run_until(&mut self, ms: u64) {
        while !self.started || self.now_ms + TICK_MS <= ms {
            self.step();
        }
    }

    /// 再运行 `ms` 毫秒
    pub fn run_for(&mut self, ms: u64) {
        let end = self.now_ms + ms;
        self.run_until(end);
    }
}
