#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

//! `spark-byte-stream` 提供容量有界、按序交付的字节流缓冲，拆分为写端与读端两个句柄。
//!
//! # 模块定位（Why）
//! - 可靠字节流协议（TCP 类传输栈）需要在“报文到达/离开”与“应用读写”之间解耦，
//!   本 crate 提供这层被动缓冲：不调度、不阻塞，只负责容量约束、关闭与排空语义以及记账不变式。
//! - 报文分帧、重传、拥塞控制与套接字 IO 均由上层组件负责，它们向 [`Writer`] 喂入字节，
//!   从 [`Reader`] 排空字节。
//!
//! # 设计概要（How）
//! - `state` 模块持有唯一的共享状态块，维护分片缓冲、容量、关闭/错误标记与两个累计计数；
//! - [`Writer`] 暴露追加与关闭能力，[`Reader`] 暴露查看、移除与结束观测能力，
//!   两者都不实现 `Clone`，保证每条字节流恰好各有一个；
//! - 共享状态以 `spin::Mutex` 保护，句柄满足 `Send + Sync`，可以分别移交到不同线程；
//!   启用 `loom-model` 并以 `--cfg loom` 编译时切换为 Loom 原语以做模型检查。
//!
//! # 契约说明（What）
//! - 超出剩余容量的写入被截断，超出缓冲长度的弹出被钳制，关闭后的写入被忽略，均不报错；
//! - 任意操作序列之后都满足 `bytes_buffered <= capacity` 与 `bytes_pushed - bytes_popped == bytes_buffered`；
//! - 终止信号只有 [`Reader::is_finished`]：写端已关闭且缓冲已排空。
//!
//! ```
//! use spark_byte_stream::ByteStream;
//!
//! let (mut writer, mut reader) = ByteStream::split(4);
//! writer.push(b"abcdef");
//! assert_eq!(reader.peek().as_ref(), b"abcd");
//! reader.pop(2);
//! writer.push(b"xy");
//! writer.close();
//! assert_eq!(reader.read_up_to(4).as_ref(), b"cdxy");
//! assert!(reader.is_finished());
//! ```

extern crate alloc;

mod config;
mod error;
#[cfg(feature = "std")]
mod io;
mod reader;
mod snapshot;
mod state;
mod sync;
mod writer;

pub use config::StreamConfig;
pub use error::{ConfigError, codes};
pub use reader::Reader;
pub use snapshot::StreamSnapshot;
pub use writer::Writer;

use crate::state::StreamState;
use crate::sync::{Arc, Mutex};

/// 创建字节流并拆分为写端与读端的入口。
pub struct ByteStream;

impl ByteStream {
    /// 以给定容量创建字节流，返回共享同一状态的 [`Writer`] 与 [`Reader`]。
    ///
    /// - 容量为 `0` 的字节流无法承载任何字节，只能被关闭；
    /// - 本函数不校验容量，接受任意 `u64`。超出平台可寻址范围的容量等价于
    ///   “仅受可用内存约束”，缓冲长度本身永远不会超过 `usize`；
    /// - 需要把容量当作外部输入校验时，使用 [`ByteStream::from_config`] 或
    ///   [`ByteStream::from_config_within`]，二者在越界时返回
    ///   [`ConfigError::CapacityOutOfRange`]。
    pub fn split(capacity: u64) -> (Writer, Reader) {
        let shared = Arc::new(Mutex::new(StreamState::new(capacity)));
        let writer = Writer::new(Arc::clone(&shared));
        let reader = Reader::new(shared);
        (writer, reader)
    }

    /// 校验配置后创建字节流，容量上限为平台可寻址范围。
    pub fn from_config(config: &StreamConfig) -> Result<(Writer, Reader), ConfigError> {
        Self::from_config_within(config, StreamConfig::ADDRESSABLE_LIMIT)
    }

    /// 以调用方给定的容量上限校验配置后创建字节流。
    pub fn from_config_within(
        config: &StreamConfig,
        limit: u64,
    ) -> Result<(Writer, Reader), ConfigError> {
        config.validate_within(limit)?;
        Ok(Self::split(config.capacity))
    }
}
