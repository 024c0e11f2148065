//! 眼睛 / 面部命令
//!
//! 面部显示由外部驱动绘制，这里只维护手动模式下的眼睛命令。
//! Blink 是一次性命令：被应用一次后自动回到 Open，避免每个 tick 反复眨眼。

/// 眼睛状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum EyeState {
    /// 无命令
    #[default]
    None = 0,
    Open = 1,
    Closed = 2,
    Blink = 3,
    Focus = 4,
    Sad = 5,
    Angry = 6,
}

impl EyeState {
    /// 从 u8 转换
    ///
    /// 未知值视为 None。
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Open,
            2 => Self::Closed,
            3 => Self::Blink,
            4 => Self::Focus,
            5 => Self::Sad,
            6 => Self::Angry,
            _ => Self::None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_none(self) -> bool {
        self == Self::None
    }

    pub fn name(self) -> &'static str {
        match self {
            EyeState::None => "none",
            EyeState::Open => "open",
            EyeState::Closed => "closed",
            EyeState::Blink => "blink",
            EyeState::Focus => "focus",
            EyeState::Sad => "sad",
            EyeState::Angry => "angry",
        }
    }

    /// 按名称解析（不区分大小写）
    pub fn from_name(name: &str) -> Option<Self> {
        let state = match name.to_ascii_lowercase().as_str() {
            "none" => EyeState::None,
            "open" => EyeState::Open,
            "closed" | "close" => EyeState::Closed,
            "blink" => EyeState::Blink,
            "focus" => EyeState::Focus,
            "sad" => EyeState::Sad,
            "angry" => EyeState::Angry,
            _ => return None,
        };
        Some(state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eye {
    Left,
    Right,
}

/// 手动模式下的面部命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceCommands {
    /// 双眼命令，非 None 时优先于单眼命令
    pub all: EyeState,
    pub left: EyeState,
    pub right: EyeState,
}

impl Default for FaceCommands {
    fn default() -> Self {
        Self::automatic_defaults()
    }
}

impl FaceCommands {
    /// 进入自动模式时的默认值
    ///
    /// 单眼默认是 Blink：切回手动后的第一个 tick 双眼各眨一次，之后保持 Open。
    /// 这一次眨眼是有意保留的行为，不是残留命令。
    pub fn automatic_defaults() -> Self {
        Self {
            all: EyeState::None,
            left: EyeState::Blink,
            right: EyeState::Blink,
        }
    }

    /// 设置双眼命令，同时清除单眼命令
    pub fn set_all(&mut self, state: EyeState) {
        self.all = state;
        self.left = EyeState::None;
        self.right = EyeState::None;
    }

    /// 设置单眼命令，同时清除双眼命令
    pub fn set_eye(&mut self, eye: Eye, state: EyeState) {
        self.all = EyeState::None;
        match eye {
            Eye::Left => self.left = state,
            Eye::Right => self.right = state,
        }
    }

    /// 取出本 tick 要应用的命令
    ///
    /// 已应用的 Blink 被替换为 Open。
    pub fn take_pending(&mut self) -> Vec<(Eye, EyeState)> {
        let mut pending = Vec::with_capacity(2);

        if !self.all.is_none() {
            pending.push((Eye::Left, self.all));
            pending.push((Eye::Right, self.all));
            self.all = consume_blink(self.all);
            return pending;
        }

        if !self.left.is_none() {
            pending.push((Eye::Left, self.left));
            self.left = consume_blink(self.left);
        }
        if !self.right.is_none() {
            pending.push((Eye::Right, self.right));
            self.right = consume_blink(self.right);
        }
        pending
    }
}

fn consume_blink(state: EyeState) -> EyeState {
    if state == EyeState::Blink {
        EyeState::Open
    } else {
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eye_state_conversions() {
        for v in 0..=6u8 {
            assert_eq!(EyeState::from_u8(v).as_u8(), v);
        }
        assert_eq!(EyeState::from_u8(42), EyeState::None);
        assert_eq!(EyeState::from_name("Angry"), Some(EyeState::Angry));
        assert_eq!(EyeState::from_name("wink"), None);
    }

    #[test]
    fn test_all_blink_is_single_shot() {
        let mut face = FaceCommands::automatic_defaults();
        face.set_all(EyeState::Blink);

        let first = face.take_pending();
        assert_eq!(
            first,
            vec![(Eye::Left, EyeState::Blink), (Eye::Right, EyeState::Blink)]
        );

        let second = face.take_pending();
        assert_eq!(
            second,
            vec![(Eye::Left, EyeState::Open), (Eye::Right, EyeState::Open)]
        );
    }

    #[test]
    fn test_defaults_blink_once_then_open() {
        let mut face = FaceCommands::automatic_defaults();
        assert_eq!(
            face.take_pending(),
            vec![(Eye::Left, EyeState::Blink), (Eye::Right, EyeState::Blink)]
        );
        for _ in 0..3 {
            assert_eq!(
                face.take_pending(),
                vec![(Eye::Left, EyeState::Open), (Eye::Right, EyeState::Open)]
            );
        }
    }

    #[test]
    fn test_individual_eyes() {
        let mut face = FaceCommands::automatic_defaults();
        face.set_eye(Eye::Left, EyeState::Sad);
        face.set_eye(Eye::Right, EyeState::None);

        assert_eq!(face.take_pending(), vec![(Eye::Left, EyeState::Sad)]);
        assert_eq!(face.take_pending(), vec![(Eye::Left, EyeState::Sad)]);
    }

    #[test]
    fn test_set_all_clears_individual() {
        let mut face = FaceCommands::automatic_defaults();
        face.set_all(EyeState::Focus);
        assert_eq!(face.left, EyeState::None);
        assert_eq!(face.right, EyeState::None);

        face.set_eye(Eye::Right, EyeState::Closed);
        assert_eq!(face.all, EyeState::None);
    }
}
