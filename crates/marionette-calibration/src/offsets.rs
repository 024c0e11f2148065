//! 每轴校准偏移

use marionette_motion::AxisId;

/// 每个逻辑轴一个有符号整数偏移
///
/// 偏移在下发目标前加到逻辑命令值上，从不写入轴的 `current` / `target`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalibrationOffsets {
    values: [i16; AxisId::ALL.len()],
}

impl CalibrationOffsets {
    /// 全零偏移
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn get(&self, axis: AxisId) -> i16 {
        self.values[axis.index()]
    }

    pub fn set(&mut self, axis: AxisId, value: i16) {
        self.values[axis.index()] = value;
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0)
    }

    /// 把偏移加到逻辑值上
    pub fn apply(&self, axis: AxisId, logical: f64) -> f64 {
        logical + f64::from(self.get(axis))
    }

    pub fn iter(&self) -> impl Iterator<Item = (AxisId, i16)> + '_ {
        AxisId::ALL.iter().map(|axis| (*axis, self.get(*axis)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_get_set() {
        let mut offsets = CalibrationOffsets::zero();
        assert!(offsets.is_zero());

        offsets.set(AxisId::TorsoTiltSideways, -7);
        assert_eq!(offsets.get(AxisId::TorsoTiltSideways), -7);
        assert_eq!(offsets.get(AxisId::NeckRotate), 0);
        assert!(!offsets.is_zero());
    }

    #[test]
    fn test_apply_adds_offset() {
        let mut offsets = CalibrationOffsets::zero();
        offsets.set(AxisId::NeckRotate, 10);
        assert_eq!(offsets.apply(AxisId::NeckRotate, 30.0), 40.0);
        assert_eq!(offsets.apply(AxisId::Monocle, 30.0), 30.0);
    }

    #[test]
    fn test_iter_covers_every_axis() {
        let offsets = CalibrationOffsets::zero();
        assert_eq!(offsets.iter().count(), AxisId::ALL.len());
    }
}
