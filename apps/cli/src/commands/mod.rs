//! 命令定义和实现

pub mod calibration;
pub mod run;

pub use calibration::CalibrationCommand;
pub use run::RunCommand;
