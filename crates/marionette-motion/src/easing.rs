//! 缓动函数
//!
//! 所有轴控制器共用的二次缓入缓出曲线。
//!
//! # 算法
//!
//! ```text
//! ease(t) = 2t²            (t < 0.5)
//! ease(t) = t(4 - 2t) - 1  (t ≥ 0.5)
//! ```
//!
//! 两段在 `t = 0.5` 处连续（值为 0.5），曲线关于 `(0.5, 0.5)` 中心对称。

/// 二次缓入缓出
///
/// 输入会先钳位到 `[0, 1]`，因此 `ease(0) = 0`、`ease(1) = 1`。
pub fn ease_in_out_quad(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        t * (4.0 - 2.0 * t) - 1.0
    }
}

/// 在 `start` 与 `target` 之间插值
///
/// # 参数
///
/// - `start`: 本段运动的起点（接受新目标时记录的位置）
/// - `current`: 当前位置，仅用于判断运动方向和是否已到位
/// - `target`: 目标位置
/// - `progress`: 时间进度，超过 1.0 的部分被截断
///
/// # 返回
///
/// 已到位时原样返回 `target`；否则返回缓动后的位置，
/// 结果不会越过 `target`，也不会离开 `[min(start, target), max(start, target)]`。
pub fn interpolate(start: f64, current: f64, target: f64, progress: f64) -> f64 {
    if current == target {
        return target;
    }

    let e = ease_in_out_quad(progress.min(1.0));
    let (lo, hi) = if start <= target {
        (start, target)
    } else {
        (target, start)
    };

    let value = if current < target {
        (start + (target - start) * e).min(target)
    } else {
        (start - (start - target) * e).max(target)
    };

    value.clamp(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_endpoints() {
        assert_eq!(ease_in_out_quad(0.0), 0.0);
        assert_eq!(ease_in_out_quad(1.0), 1.0);
        assert!((ease_in_out_quad(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_ease_symmetry() {
        for i in 0..=50 {
            let t = i as f64 / 100.0;
            let lhs = ease_in_out_quad(t);
            let rhs = 1.0 - ease_in_out_quad(1.0 - t);
            assert!((lhs - rhs).abs() < 1e-12, "t = {}", t);
        }
    }

    #[test]
    fn test_ease_out_of_range_input() {
        assert_eq!(ease_in_out_quad(-3.0), 0.0);
        assert_eq!(ease_in_out_quad(7.5), 1.0);
    }

    #[test]
    fn test_interpolate_settled_is_noop() {
        assert_eq!(interpolate(10.0, 42.0, 42.0, 0.3), 42.0);
        assert_eq!(interpolate(-5.0, -5.0, -5.0, 0.9), -5.0);
    }

    #[test]
    fn test_interpolate_both_directions() {
        // 正向
        let up = interpolate(0.0, 0.0, 100.0, 0.25);
        assert!((up - 12.5).abs() < 1e-10);

        // 反向
        let down = interpolate(100.0, 100.0, 0.0, 0.25);
        assert!((down - 87.5).abs() < 1e-10);
    }

    #[test]
    fn test_interpolate_caps_progress() {
        assert_eq!(interpolate(0.0, 10.0, 50.0, 1.0), 50.0);
        assert_eq!(interpolate(0.0, 10.0, 50.0, 3.0), 50.0);
        assert_eq!(interpolate(50.0, 10.0, -20.0, 2.0), -20.0);
    }
}
