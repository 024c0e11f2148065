//! Builder 模式实现
//!
//! 提供链式构造 [`Figure`] 实例的便捷方式。

use crate::config::{Features, FigureConfig};
use crate::figure::Figure;
use marionette_motion::{AxisController, AxisId, AxisSpec};

/// Figure Builder（链式构造）
///
/// # Example
///
/// ```
/// use marionette_driver::{Features, FigureBuilder};
/// use marionette_motion::{AxisId, AxisSpec};
///
/// // 默认参数
/// let figure = FigureBuilder::new().build();
///
/// // 关闭灯光，放慢单片眼镜
/// let mut features = Features::all();
/// features.torso_lights = false;
/// let figure = FigureBuilder::new()
///     .features(features)
///     .axis_spec(AxisId::Monocle, AxisSpec::new(0.0, 100.0).with_ms_per_unit(20.0))
///     .build();
/// assert_eq!(figure.axis(AxisId::Monocle).spec().ms_per_unit, 20.0);
/// ```
#[derive(Debug, Clone)]
pub struct FigureBuilder {
    features: Features,
    specs: [AxisSpec; AxisId::ALL.len()],
}

impl FigureBuilder {
    /// 创建新的 Builder（全部功能开启，默认轴参数）
    pub fn new() -> Self {
        Self {
            features: Features::all(),
            specs: AxisId::ALL.map(AxisId::spec),
        }
    }

    /// 以配置文件中的功能开关创建
    pub fn from_config(config: &FigureConfig) -> Self {
        Self::new().features(config.features)
    }

    /// 设置功能开关（可选，默认全部开启）
    pub fn features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    /// 覆盖某个轴的运动参数（可选）
    pub fn axis_spec(mut self, axis: AxisId, spec: AxisSpec) -> Self {
        self.specs[axis.index()] = spec;
        self
    }

    /// 构建 Figure，所有轴停在初始位置
    pub fn build(self) -> Figure {
        Figure::from_parts(self.specs.map(AxisController::new), self.features)
    }
}

impl Default for FigureBuilder {
    fn default() -> Self {
        Self::new()
    }
}
