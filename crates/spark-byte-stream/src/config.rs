use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 字节流的构造配置，唯一的可识别选项是容量上限。
///
/// # 契约说明（What）
/// - `capacity`：任意时刻允许缓冲的最大字节数；`0` 合法，此时字节流只能被关闭而无法承载数据；
/// - 反序列化时拒绝未知字段，避免拼写错误被静默忽略。
///
/// # 使用方式（How）
/// ```
/// use spark_byte_stream::StreamConfig;
///
/// let config = StreamConfig::from_toml_str("capacity = 4096").unwrap();
/// assert_eq!(config, StreamConfig::new(4096));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamConfig {
    pub capacity: u64,
}

impl StreamConfig {
    pub const fn new(capacity: u64) -> Self {
        Self { capacity }
    }

    /// 目标平台可寻址的最大容量。
    pub const ADDRESSABLE_LIMIT: u64 = usize::MAX as u64;

    /// 校验容量能否在当前平台上寻址。
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_within(Self::ADDRESSABLE_LIMIT)
    }

    /// 校验容量不超过调用方给定的上限 `limit`（含端点）。
    ///
    /// 上层可借此施加比平台寻址范围更严格的内存预算。
    pub fn validate_within(&self, limit: u64) -> Result<(), ConfigError> {
        if self.capacity > limit {
            return Err(ConfigError::CapacityOutOfRange {
                capacity: self.capacity,
                limit,
            });
        }
        Ok(())
    }

    /// 从 TOML 文本解析并校验配置。
    #[cfg(feature = "std")]
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        use alloc::string::ToString;

        let config: Self = toml::from_str(input).map_err(|err| ConfigError::Parse {
            reason: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_valid() {
        assert_eq!(StreamConfig::new(0).validate(), Ok(()));
    }

    #[test]
    fn capacity_at_limit_is_valid() {
        assert_eq!(StreamConfig::new(1024).validate_within(1024), Ok(()));
        assert_eq!(StreamConfig::new(0).validate_within(0), Ok(()));
    }

    #[test]
    fn capacity_beyond_limit_is_rejected() {
        let err = StreamConfig::new(1025).validate_within(1024).unwrap_err();
        assert_eq!(
            err,
            ConfigError::CapacityOutOfRange {
                capacity: 1025,
                limit: 1024,
            }
        );
        assert_eq!(err.code(), crate::error::codes::CAPACITY_OUT_OF_RANGE);
    }

    #[test]
    fn addressable_limit_matches_platform_width() {
        assert_eq!(StreamConfig::ADDRESSABLE_LIMIT, usize::MAX as u64);
        assert_eq!(
            StreamConfig::new(StreamConfig::ADDRESSABLE_LIMIT).validate(),
            Ok(())
        );
    }

    #[cfg(target_pointer_width = "32")]
    #[test]
    fn capacity_beyond_usize_is_rejected() {
        let err = StreamConfig::new(u64::MAX).validate().unwrap_err();
        assert_eq!(err.code(), crate::error::codes::CAPACITY_OUT_OF_RANGE);
    }
}
