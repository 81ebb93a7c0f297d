use alloc::string::String;

use thiserror::Error;

/// 构造字节流时可能出现的配置错误。
///
/// # 教案式说明
/// - **意图（Why）**：字节流自身的读写操作遵循“钳制而非失败”的契约，从不返回错误；
///   唯一可能失败的环节是把外部配置转换为可用的容量参数，此处集中描述这些失败路径。
/// - **契约（What）**：每个变体对应一个稳定错误码（见 [`ConfigError::code`]），
///   便于调用方在日志或告警中做聚合。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// 配置文本无法反序列化为 [`StreamConfig`](crate::StreamConfig)。
    #[error("字节流配置解析失败: {reason}")]
    Parse { reason: String },
    /// 容量超过允许的上限；默认上限为目标平台 `usize` 可寻址的范围。
    #[error("字节流容量 {capacity} 超出上限 {limit}")]
    CapacityOutOfRange { capacity: u64, limit: u64 },
}

impl ConfigError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Parse { .. } => codes::CONFIG_PARSE_FAILED,
            ConfigError::CapacityOutOfRange { .. } => codes::CAPACITY_OUT_OF_RANGE,
        }
    }
}

/// 字节流相关的稳定错误码。
pub mod codes {
    pub const CONFIG_PARSE_FAILED: &str = "spark.byte_stream.config.parse_failed";
    pub const CAPACITY_OUT_OF_RANGE: &str = "spark.byte_stream.config.capacity_out_of_range";
}
