//! 校准文档格式
//!
//! ```json
//! {
//!   "neck":    { "rotation": 0, "tiltForward": 0, "tiltSideways": 0 },
//!   "body":    { "rotation": 0, "tiltForward": 0, "tiltSideways": 0 },
//!   "monocle": { "position": 0 }
//! }
//! ```
//!
//! 读取时缺失的键一律取 0。

use crate::error::CalibrationError;
use crate::offsets::CalibrationOffsets;
use marionette_motion::AxisId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JointSection {
    pub rotation: i16,
    pub tilt_forward: i16,
    pub tilt_sideways: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonocleSection {
    pub position: i16,
}

/// 持久化的校准文档
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationDocument {
    pub neck: JointSection,
    pub body: JointSection,
    pub monocle: MonocleSection,
}

impl CalibrationDocument {
    /// 解析 JSON 文本
    pub fn from_json(text: &str) -> Result<Self, CalibrationError> {
        serde_json::from_str(text).map_err(CalibrationError::Parse)
    }

    /// 序列化为带缩进的 JSON 文本
    pub fn to_json(&self) -> Result<String, CalibrationError> {
        serde_json::to_string_pretty(self).map_err(CalibrationError::Serialize)
    }
}

impl From<&CalibrationOffsets> for CalibrationDocument {
    fn from(offsets: &CalibrationOffsets) -> Self {
        Self {
            neck: JointSection {
                rotation: offsets.get(AxisId::NeckRotate),
                tilt_forward: offsets.get(AxisId::NeckTiltForward),
                tilt_sideways: offsets.get(AxisId::NeckTiltSideways),
            },
            body: JointSection {
                rotation: offsets.get(AxisId::TorsoRotate),
                tilt_forward: offsets.get(AxisId::TorsoTiltForward),
                tilt_sideways: offsets.get(AxisId::TorsoTiltSideways),
            },
            monocle: MonocleSection {
                position: offsets.get(AxisId::Monocle),
            },
        }
    }
}

impl From<&CalibrationDocument> for CalibrationOffsets {
    fn from(doc: &CalibrationDocument) -> Self {
        let mut offsets = CalibrationOffsets::zero();
        offsets.set(AxisId::NeckRotate, doc.neck.rotation);
        offsets.set(AxisId::NeckTiltForward, doc.neck.tilt_forward);
        offsets.set(AxisId::NeckTiltSideways, doc.neck.tilt_sideways);
        offsets.set(AxisId::TorsoRotate, doc.body.rotation);
        offsets.set(AxisId::TorsoTiltForward, doc.body.tilt_forward);
        offsets.set(AxisId::TorsoTiltSideways, doc.body.tilt_sideways);
        offsets.set(AxisId::Monocle, doc.monocle.position);
        offsets
    }
}

/// 把文档中的 `part.param` 解析为轴
///
/// `part` 为 `neck` / `body` / `monocle`，`param` 为
/// `rotation` / `tiltForward` / `tiltSideways` / `position`。
pub fn axis_for(part: &str, param: &str) -> Result<AxisId, CalibrationError> {
    let axis = match (part, param) {
        ("neck", "rotation") => AxisId::NeckRotate,
        ("neck", "tiltForward") => AxisId::NeckTiltForward,
        ("neck", "tiltSideways") => AxisId::NeckTiltSideways,
        ("body", "rotation") => AxisId::TorsoRotate,
        ("body", "tiltForward") => AxisId::TorsoTiltForward,
        ("body", "tiltSideways") => AxisId::TorsoTiltSideways,
        ("monocle", "position") => AxisId::Monocle,
        _ => {
            return Err(CalibrationError::UnknownTarget {
                part: part.to_string(),
                param: param.to_string(),
            });
        },
    };
    Ok(axis)
}
