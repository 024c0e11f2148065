//! 遥控请求编解码
//!
//! 遥控端（网页、CLI Shell）发送一个 JSON 对象，所有字段可选：
//!
//! ```json
//! {
//!   "automatic": false,
//!   "face": { "all": 3 },
//!   "neck": { "rotate": 40, "tiltForward": -10, "tiltSideways": 0 },
//!   "body": { "rotate": 0, "tiltForward": 0, "tiltSideways": 20 },
//!   "monocle": { "position": 80 },
//!   "torso": { "lightMode": 4 },
//!   "calibration": { "action": "setMiddleAndLock" }
//! }
//! ```
//!
//! 字段按上面的顺序依次应用，`automatic` 最先；之后任何手动字段都会切回手动模式。
//! 应答总是回显完整的当前状态（[`StatusReport`]），包括文档形式的校准偏移。
//!
//! 校准请求要么是 `action`（`setMiddleAndLock` / `unlockServos` / `reset` / `save`），
//! 要么是 `part` + `param` + `value`。校准请求最后应用，出错时前面的字段已经生效。

use crate::error::RemoteError;
use crate::state::ControlState;
use marionette_calibration::{CalibrationDocument, CalibrationError, axis_for};
use marionette_motion::{AxisId, EyeState, LightMode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// 遥控请求
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automatic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face: Option<FaceRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neck: Option<JointRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<JointRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monocle: Option<MonocleRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub torso: Option<TorsoRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calibration: Option<CalibrationRequest>,
}

/// 眼睛命令（[`EyeState`] 的数值编码）
///
/// `all` 存在时忽略 `left` / `right`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<u8>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JointRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tilt_forward: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tilt_sideways: Option<i16>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonocleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i16>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TorsoRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light_mode: Option<u8>,
}

/// 校准请求
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i16>,
}

impl CalibrationRequest {
    pub fn action(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            ..Self::default()
        }
    }

    pub fn set(part: impl Into<String>, param: impl Into<String>, value: i16) -> Self {
        Self {
            action: None,
            part: Some(part.into()),
            param: Some(param.into()),
            value: Some(value),
        }
    }
}

/// 回显给遥控端的状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub automatic: bool,
    pub locked: bool,
    pub face: FaceStatus,
    pub neck: JointStatus,
    pub body: JointStatus,
    pub monocle: MonocleStatus,
    pub torso: TorsoStatus,
    pub calibration: CalibrationDocument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceStatus {
    pub all: u8,
    pub left: u8,
    pub right: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JointStatus {
    pub rotate: i16,
    pub tilt_forward: i16,
    pub tilt_sideways: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonocleStatus {
    pub position: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TorsoStatus {
    pub light_mode: u8,
}

impl StatusReport {
    /// 读取当前共享状态
    pub fn from_state(state: &ControlState) -> Self {
        let snapshot = state.snapshot();
        let commands = snapshot.commands;
        Self {
            automatic: snapshot.mode.is_automatic(),
            locked: snapshot.locked,
            face: FaceStatus {
                all: commands.face.all.as_u8(),
                left: commands.face.left.as_u8(),
                right: commands.face.right.as_u8(),
            },
            neck: JointStatus {
                rotate: commands.axis(AxisId::NeckRotate),
                tilt_forward: commands.axis(AxisId::NeckTiltForward),
                tilt_sideways: commands.axis(AxisId::NeckTiltSideways),
            },
            body: JointStatus {
                rotate: commands.axis(AxisId::TorsoRotate),
                tilt_forward: commands.axis(AxisId::TorsoTiltForward),
                tilt_sideways: commands.axis(AxisId::TorsoTiltSideways),
            },
            monocle: MonocleStatus {
                position: commands.axis(AxisId::Monocle),
            },
            torso: TorsoStatus {
                light_mode: commands.light_mode.as_u8(),
            },
            calibration: CalibrationDocument::from(&snapshot.offsets),
        }
    }
}

/// 把请求应用到共享状态，返回应用后的状态
pub fn apply_request(
    state: &ControlState,
    request: &ControlRequest,
) -> Result<StatusReport, RemoteError> {
    if let Some(automatic) = request.automatic {
        debug!("Remote: automatic = {}", automatic);
        state.set_automatic(automatic);
    }

    if let Some(face) = &request.face {
        apply_face(state, face);
    }

    if let Some(neck) = &request.neck {
        apply_joint(
            state,
            neck,
            [AxisId::NeckRotate, AxisId::NeckTiltForward, AxisId::NeckTiltSideways],
        );
    }

    if let Some(body) = &request.body {
        apply_joint(
            state,
            body,
            [AxisId::TorsoRotate, AxisId::TorsoTiltForward, AxisId::TorsoTiltSideways],
        );
    }

    if let Some(position) = request.monocle.and_then(|m| m.position) {
        state.command_monocle(position);
    }

    if let Some(code) = request.torso.and_then(|t| t.light_mode) {
        state.command_light_mode(LightMode::from_u8(code));
    }

    if let Some(calibration) = &request.calibration {
        apply_calibration(state, calibration)?;
    }

    Ok(StatusReport::from_state(state))
}

/// 解析 JSON 请求、应用并序列化应答
pub fn handle_json(state: &ControlState, body: &str) -> Result<String, RemoteError> {
    let request: ControlRequest = serde_json::from_str(body).map_err(|e| {
        warn!("Rejected malformed remote request: {}", e);
        RemoteError::Json(e)
    })?;
    let report = apply_request(state, &request)?;
    Ok(serde_json::to_string(&report)?)
}

fn apply_face(state: &ControlState, face: &FaceRequest) {
    if let Some(all) = face.all {
        state.command_face_all(EyeState::from_u8(all));
        return;
    }
    if let Some(left) = face.left {
        state.command_face_left(EyeState::from_u8(left));
    }
    if let Some(right) = face.right {
        state.command_face_right(EyeState::from_u8(right));
    }
}

fn apply_joint(state: &ControlState, joint: &JointRequest, axes: [AxisId; 3]) {
    let values = [joint.rotate, joint.tilt_forward, joint.tilt_sideways];
    for (axis, value) in axes.into_iter().zip(values) {
        if let Some(value) = value {
            state.command_axis(axis, value);
        }
    }
}

fn apply_calibration(
    state: &ControlState,
    request: &CalibrationRequest,
) -> Result<(), RemoteError> {
    if let Some(action) = request.action.as_deref() {
        return match action {
            "setMiddleAndLock" => {
                state.center_and_lock();
                Ok(())
            },
            "unlockServos" => {
                state.unlock();
                Ok(())
            },
            "reset" => Ok(state.reset_calibration()?),
            "save" => Ok(state.save_calibration()?),
            other => {
                warn!("Unknown calibration action: {}", other);
                Err(RemoteError::UnknownAction(other.to_string()))
            },
        };
    }

    let (Some(part), Some(param), Some(value)) =
        (request.part.as_deref(), request.param.as_deref(), request.value)
    else {
        return Err(RemoteError::Invalid(
            "calibration needs either action or part, param and value".to_string(),
        ));
    };

    let axis = axis_for(part, param).map_err(|e| match e {
        CalibrationError::UnknownTarget { part, param } => {
            warn!("Unknown calibration target: {}.{}", part, param);
            RemoteError::UnknownCalibrationTarget { part, param }
        },
        other => RemoteError::Calibration(other),
    })?;

    info!("Remote: calibration {}.{} = {}", part, param, value);
    state.set_calibration(axis, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::ControlMode;

    fn parse(json: &str) -> ControlRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_empty_request_echoes_state() {
        let state = ControlState::in_memory();
        let report = apply_request(&state, &ControlRequest::default()).unwrap();
        assert!(report.automatic);
        assert!(!report.locked);
        assert_eq!(report.face, FaceStatus { all: 0, left: 3, right: 3 });
        assert_eq!(report.calibration, CalibrationDocument::default());
    }

    #[test]
    fn test_neck_and_body_commands() {
        let state = ControlState::in_memory();
        let report = apply_request(
            &state,
            &parse(r#"{"neck":{"rotate":40,"tiltSideways":-20},"body":{"tiltForward":15}}"#),
        )
        .unwrap();

        assert!(!report.automatic);
        assert_eq!(report.neck.rotate, 40);
        assert_eq!(report.neck.tilt_forward, 0);
        assert_eq!(report.neck.tilt_sideways, -20);
        assert_eq!(report.body.tilt_forward, 15);
    }

    #[test]
    fn test_automatic_is_applied_before_manual_fields() {
        let state = ControlState::in_memory();
        apply_request(&state, &parse(r#"{"automatic":true,"monocle":{"position":70}}"#)).unwrap();
        assert_eq!(state.mode(), ControlMode::Manual);
        assert_eq!(state.commands().axis(AxisId::Monocle), 70);
    }

    #[test]
    fn test_face_all_overrides_individual_eyes() {
        let state = ControlState::in_memory();
        let report =
            apply_request(&state, &parse(r#"{"face":{"all":5,"left":2,"right":2}}"#)).unwrap();
        assert_eq!(report.face, FaceStatus { all: 5, left: 0, right: 0 });

        let report = apply_request(&state, &parse(r#"{"face":{"left":6}}"#)).unwrap();
        assert_eq!(report.face, FaceStatus { all: 0, left: 6, right: 0 });
    }

    #[test]
    fn test_light_mode_codes() {
        let state = ControlState::in_memory();
        let report = apply_request(&state, &parse(r#"{"torso":{"lightMode":4}}"#)).unwrap();
        assert_eq!(report.torso.light_mode, 4);

        // 未知编码视为 Off
        let report = apply_request(&state, &parse(r#"{"torso":{"lightMode":42}}"#)).unwrap();
        assert_eq!(report.torso.light_mode, 0);
    }

    #[test]
    fn test_calibration_actions() {
        let state = ControlState::in_memory();
        let report = apply_request(
            &state,
            &ControlRequest {
                calibration: Some(CalibrationRequest::action("setMiddleAndLock")),
                ..ControlRequest::default()
            },
        )
        .unwrap();
        assert!(report.locked);
        assert!(!report.automatic);

        let report = apply_request(
            &state,
            &ControlRequest {
                calibration: Some(CalibrationRequest::action("unlockServos")),
                ..ControlRequest::default()
            },
        )
        .unwrap();
        assert!(!report.locked);
    }

    #[test]
    fn test_calibration_set_echoes_document() {
        let state = ControlState::in_memory();
        let report = apply_request(
            &state,
            &parse(r#"{"calibration":{"part":"body","param":"tiltSideways","value":-7}}"#),
        )
        .unwrap();
        assert_eq!(report.calibration.body.tilt_sideways, -7);
        assert_eq!(state.calibration_offset(AxisId::TorsoTiltSideways), -7);
    }

    #[test]
    fn test_unknown_calibration_requests_rejected() {
        let state = ControlState::in_memory();

        let err = apply_request(&state, &parse(r#"{"calibration":{"action":"dance"}}"#))
            .unwrap_err();
        assert!(matches!(err, RemoteError::UnknownAction(a) if a == "dance"));

        let err = apply_request(
            &state,
            &parse(r#"{"calibration":{"part":"tail","param":"rotation","value":1}}"#),
        )
        .unwrap_err();
        assert!(matches!(err, RemoteError::UnknownCalibrationTarget { .. }));

        let err =
            apply_request(&state, &parse(r#"{"calibration":{"part":"neck"}}"#)).unwrap_err();
        assert!(matches!(err, RemoteError::Invalid(_)));

        assert!(state.offsets().is_zero());
    }

    #[test]
    fn test_handle_json() {
        let state = ControlState::in_memory();
        let reply = handle_json(&state, r#"{"neck":{"rotate":25}}"#).unwrap();
        let value: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(value["automatic"], false);
        assert_eq!(value["neck"]["rotate"], 25);
        assert_eq!(value["torso"]["lightMode"], 0);
        assert_eq!(value["calibration"]["monocle"]["position"], 0);

        assert!(matches!(
            handle_json(&state, "{not json"),
            Err(RemoteError::Json(_))
        ));
        // 字段类型错误同样拒绝
        assert!(matches!(
            handle_json(&state, r#"{"neck":{"rotate":"left"}}"#),
            Err(RemoteError::Json(_))
        ));
    }

    #[test]
    fn test_request_serializes_only_present_fields() {
        let request = ControlRequest {
            monocle: Some(MonocleRequest { position: Some(30) }),
            ..ControlRequest::default()
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"monocle":{"position":30}}"#
        );
    }
}
