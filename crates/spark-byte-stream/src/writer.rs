use core::fmt;

use bytes::Bytes;

use crate::snapshot::StreamSnapshot;
use crate::state::StreamState;
use crate::sync::{Arc, Mutex};

/// 字节流的写端句柄：唯一允许追加字节与发出关闭信号的角色。
///
/// # 设计动机（Why）
/// - 上游喂数组件（报文重组、应用写入）只需要“写入 + 关闭 + 查询剩余容量”三类能力，
///   将其收拢为独立类型后，读端操作在类型层面就不可达。
/// - 超出剩余容量的字节被静默截断而非报错，调用方可以乐观地 `push`，
///   再依据 [`available_capacity`](Self::available_capacity) 决定何时施加背压。
///
/// # 契约说明（What）
/// - 每条字节流恰好存在一个 `Writer`，类型不实现 `Clone`；
/// - 关闭或进入错误态之后，所有 `push` 均为空操作；
/// - 任意参数均不会触发错误或 panic。
pub struct Writer {
    shared: Arc<Mutex<StreamState>>,
}

impl Writer {
    pub(crate) fn new(shared: Arc<Mutex<StreamState>>) -> Self {
        Self { shared }
    }

    /// 写入 `data` 中不超过剩余容量的前缀，其余字节被丢弃。
    pub fn push(&mut self, data: &[u8]) {
        self.push_counted(data);
    }

    /// 与 [`push`](Self::push) 语义一致，但被接纳的前缀直接复用 `data` 的存储。
    pub fn push_bytes(&mut self, data: Bytes) {
        let offered = data.len();
        let (accepted, writable) = {
            let mut state = self.shared.lock();
            let writable = state.accepts_writes();
            (state.push_bytes(data), writable)
        };
        trace_push(offered, accepted, writable);
    }

    /// 写入并返回实际接纳的字节数，供 IO 适配层复用。
    pub(crate) fn push_counted(&mut self, data: &[u8]) -> usize {
        let (accepted, writable) = {
            let mut state = self.shared.lock();
            let writable = state.accepts_writes();
            (state.push_slice(data), writable)
        };
        trace_push(data.len(), accepted, writable);
        accepted
    }

    /// 发出流结束信号；重复调用无额外效果。
    pub fn close(&mut self) {
        let (transitioned, pushed) = {
            let mut state = self.shared.lock();
            (state.close(), state.pushed())
        };
        if transitioned {
            tracing::debug!(pushed, "byte stream closed by writer");
        }
    }

    /// 将字节流标记为不可恢复的失败状态，此后 `push` 永久失效。
    pub fn set_error(&mut self) {
        if self.shared.lock().set_error() {
            tracing::warn!(side = "writer", "byte stream marked as errored");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().is_closed()
    }

    pub fn has_error(&self) -> bool {
        self.shared.lock().has_error()
    }

    /// 当前还能写入的字节数；缓冲已满时为 `0`。
    pub fn available_capacity(&self) -> u64 {
        self.shared.lock().available_capacity()
    }

    pub fn capacity(&self) -> u64 {
        self.shared.lock().capacity()
    }

    /// 累计推送的字节数，只计实际被接纳的部分。
    pub fn bytes_pushed(&self) -> u64 {
        self.shared.lock().pushed()
    }

    pub fn snapshot(&self) -> StreamSnapshot {
        self.shared.lock().snapshot()
    }
}

impl fmt::Debug for Writer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

fn trace_push(offered: usize, accepted: usize, writable: bool) {
    if !writable {
        if offered > 0 {
            tracing::debug!(offered, "push dropped: byte stream closed or errored");
        }
    } else if accepted < offered {
        tracing::trace!(offered, accepted, "push truncated to available capacity");
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use crate::ByteStream;

    #[traced_test]
    #[test]
    fn truncated_push_is_traced() {
        let (mut writer, _reader) = ByteStream::split(2);
        writer.push(b"abcd");
        assert!(logs_contain("push truncated to available capacity"));
    }

    #[traced_test]
    #[test]
    fn close_is_logged_once_and_late_push_dropped() {
        let (mut writer, _reader) = ByteStream::split(8);
        writer.close();
        writer.close();
        writer.push(b"late");
        assert!(logs_contain("byte stream closed by writer"));
        assert!(logs_contain("push dropped"));
        logs_assert(|lines: &[&str]| {
            match lines
                .iter()
                .filter(|line| line.contains("byte stream closed by writer"))
                .count()
            {
                1 => Ok(()),
                n => Err(format!("expected one close event, got {n}")),
            }
        });
    }

    #[traced_test]
    #[test]
    fn set_error_warns_once() {
        let (mut writer, _reader) = ByteStream::split(8);
        writer.set_error();
        writer.set_error();
        assert!(logs_contain("byte stream marked as errored"));
        assert!(writer.has_error());
    }
}
