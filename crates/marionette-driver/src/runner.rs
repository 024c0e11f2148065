//! Loop Runner - 控制循环
//!
//! 按固定频率调用 [`Figure::tick`]，直到停止标志被置位或达到最大迭代次数。
//!
//! - **精确定时**: 使用 `spin_sleep` 实现低抖动延时，按绝对截止时间休眠，不累积漂移
//! - **超时处理**: 某个 tick 超过周期时只计数；落后超过一个周期时重新对齐，不补跑

use crate::config::{DEFAULT_FREQUENCY_HZ, LoopSection, validate_frequency};
use crate::error::DriverError;
use crate::figure::Figure;
use crate::hal::ActuatorDriver;
use crate::state::ControlState;
use rand::Rng;
use spin_sleep::SpinSleeper;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// 控制循环配置
#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    /// 控制频率（Hz）
    ///
    /// 例如：50.0 表示 20 ms 周期
    pub frequency_hz: f64,

    /// 最大迭代次数（None 表示一直运行到停止标志置位）
    pub max_iterations: Option<usize>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            max_iterations: None,
        }
    }
}

impl From<&LoopSection> for LoopConfig {
    fn from(section: &LoopSection) -> Self {
        Self {
            frequency_hz: section.frequency_hz,
            max_iterations: None,
        }
    }
}

impl LoopConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frequency_hz)
    }
}

/// 循环结束时的统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopStats {
    pub iterations: usize,
    /// 超过截止时间的 tick 数
    pub overruns: usize,
}

/// 运行控制循环
///
/// 这是一个阻塞函数。`now` 按循环启动以来的时间传给 `Figure::tick`。
///
/// # 返回
///
/// - `Ok(LoopStats)`: 停止标志置位或达到 `max_iterations`
/// - `Err(DriverError::Config)`: 频率无效
pub fn run_control_loop<D, R>(
    figure: &mut Figure,
    state: &ControlState,
    driver: &mut D,
    rng: &mut R,
    config: &LoopConfig,
    stop: &AtomicBool,
) -> Result<LoopStats, DriverError>
where
    D: ActuatorDriver + ?Sized,
    R: Rng + ?Sized,
{
    validate_frequency(config.frequency_hz)?;

    let period = config.period();
    let sleeper = SpinSleeper::default();
    let mut stats = LoopStats::default();

    info!("Control loop started at {} Hz", config.frequency_hz);

    let start = Instant::now();
    let mut deadline = start;

    loop {
        if let Some(max_iter) = config.max_iterations
            && stats.iterations >= max_iter
        {
            break;
        }
        if stop.load(Ordering::Acquire) {
            info!("Stop requested, leaving control loop");
            break;
        }

        figure.tick(start.elapsed(), state, driver, rng);
        stats.iterations += 1;

        deadline += period;
        let now = Instant::now();
        if now < deadline {
            sleeper.sleep(deadline - now);
        } else {
            stats.overruns += 1;
            if now - deadline > period {
                debug!("Control loop fell behind by {:?}, realigning", now - deadline);
                deadline = now;
            }
        }
    }

    info!(
        "Control loop finished: {} iterations, {} overruns",
        stats.iterations, stats.overruns
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::RecordingDriver;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_loop_config_default() {
        let config = LoopConfig::default();
        assert_eq!(config.frequency_hz, 50.0);
        assert_eq!(config.max_iterations, None);
        assert_eq!(config.period(), Duration::from_millis(20));
    }

    #[test]
    fn test_runs_max_iterations() {
        let mut figure = Figure::new();
        let state = ControlState::in_memory();
        let mut driver = RecordingDriver::new();
        let mut rng = StdRng::seed_from_u64(1);
        let config = LoopConfig {
            frequency_hz: 500.0,
            max_iterations: Some(5),
        };

        let stats = run_control_loop(
            &mut figure,
            &state,
            &mut driver,
            &mut rng,
            &config,
            &AtomicBool::new(false),
        )
        .unwrap();
        assert_eq!(stats.iterations, 5);
        // 第一个 tick 写入全部通道
        assert_eq!(driver.channel_writes().len(), 10);
    }

    #[test]
    fn test_stop_flag_checked_before_tick() {
        let mut figure = Figure::new();
        let state = ControlState::in_memory();
        let mut driver = RecordingDriver::new();
        let mut rng = StdRng::seed_from_u64(2);

        let stats = run_control_loop(
            &mut figure,
            &state,
            &mut driver,
            &mut rng,
            &LoopConfig::default(),
            &AtomicBool::new(true),
        )
        .unwrap();
        assert_eq!(stats.iterations, 0);
        assert!(driver.events().is_empty());
    }

    #[test]
    fn test_invalid_frequency() {
        let mut figure = Figure::new();
        let state = ControlState::in_memory();
        let mut driver = RecordingDriver::new();
        let mut rng = StdRng::seed_from_u64(3);
        let config = LoopConfig {
            frequency_hz: 0.0,
            max_iterations: Some(1),
        };

        let result = run_control_loop(
            &mut figure,
            &state,
            &mut driver,
            &mut rng,
            &config,
            &AtomicBool::new(false),
        );
        assert!(matches!(result, Err(DriverError::Config(_))));
    }
}
