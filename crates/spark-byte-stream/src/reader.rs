use core::fmt;

use bytes::Bytes;

use crate::snapshot::StreamSnapshot;
use crate::state::StreamState;
use crate::sync::{Arc, Mutex};

/// 字节流的读端句柄：唯一允许查看、移除头部字节并观测结束状态的角色。
///
/// # 设计动机（Why）
/// - 下游排空组件（交付给应用或发往传输层）以 `peek` + `pop` 循环消费数据，
///   `peek` 返回引用计数的 [`Bytes`]，持有期间不占用内部锁，写端可以并行推进。
/// - 请求弹出的长度超过已缓冲字节时被钳制，而非报错，调用方无需预先校验长度。
///
/// # 契约说明（What）
/// - 每条字节流恰好存在一个 `Reader`，类型不实现 `Clone`；
/// - `peek` 仅在缓冲为空时返回空视图，否则返回非空的流序前缀，但不保证覆盖全部缓冲；
/// - [`is_finished`](Self::is_finished) 是唯一的终止信号：写端已关闭且缓冲已排空。
pub struct Reader {
    shared: Arc<Mutex<StreamState>>,
}

impl Reader {
    pub(crate) fn new(shared: Arc<Mutex<StreamState>>) -> Self {
        Self { shared }
    }

    /// 返回缓冲头部的一段连续字节，不移除。
    ///
    /// 连续多次 `push` 写入的数据会合并为一段返回；通过 `push_bytes` 追加的分片按原样返回。
    /// 需要消费全部数据时应循环 `peek` + [`pop`](Self::pop)。
    pub fn peek(&self) -> Bytes {
        self.shared.lock().peek()
    }

    /// 从头部丢弃 `min(len, bytes_buffered())` 个字节。
    pub fn pop(&mut self, len: u64) {
        let (popped, buffered) = {
            let mut state = self.shared.lock();
            let buffered = state.buffered();
            (state.pop(len), buffered)
        };
        if len > buffered {
            tracing::trace!(requested = len, popped, "pop clamped to buffered bytes");
        }
    }

    /// 取出并返回至多 `max_len` 字节，等价于一次 `peek` + `pop` 的组合。
    ///
    /// 数据位于同一分片内时零拷贝返回，否则拷贝为一段连续缓冲。
    pub fn read_up_to(&mut self, max_len: u64) -> Bytes {
        self.shared.lock().read(max_len)
    }

    pub fn bytes_buffered(&self) -> u64 {
        self.shared.lock().buffered()
    }

    pub fn bytes_popped(&self) -> u64 {
        self.shared.lock().popped()
    }

    /// 写端已关闭且所有已推送字节都已被弹出。
    pub fn is_finished(&self) -> bool {
        self.shared.lock().is_finished()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().is_closed()
    }

    pub fn has_error(&self) -> bool {
        self.shared.lock().has_error()
    }

    /// 读端发现流不可继续使用时标记错误，写端随后的 `push` 全部失效。
    pub fn set_error(&mut self) {
        if self.shared.lock().set_error() {
            tracing::warn!(side = "reader", "byte stream marked as errored");
        }
    }

    pub fn capacity(&self) -> u64 {
        self.shared.lock().capacity()
    }

    pub fn snapshot(&self) -> StreamSnapshot {
        self.shared.lock().snapshot()
    }
}

impl fmt::Debug for Reader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}
