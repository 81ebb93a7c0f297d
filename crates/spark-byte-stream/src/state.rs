use alloc::collections::VecDeque;
use core::cmp;

use bytes::{Buf, Bytes, BytesMut};

use crate::snapshot::StreamSnapshot;

/// 一段已冻结的只读分片。
#[derive(Debug)]
struct Segment {
    bytes: Bytes,
    // 由 `push` 拷贝而来的分片可以与相邻拷贝分片合并。
    copied: bool,
}

/// `StreamState` 是写端与读端共享的唯一状态块。
///
/// # 设计动机（Why）
/// - 可靠字节流协议需要在“报文到达/离开”与“应用读写”之间插入一个有界、有序的缓冲，
///   由外部流控逻辑依据剩余容量做出背压决策。
/// - 将全部记账字段集中于一处，写端与读端只是两组受限的操作视图，
///   可以确保累计计数与实时缓冲长度之间的不变式只有一个维护点。
///
/// # 结构设计（How）
/// - `segments`：已冻结的只读分片，按流序排列，`peek` 返回其首元素的引用计数副本；
///   每个分片记录自己是由 `push` 拷贝而来，还是由 `push_bytes` 零拷贝追加；
/// - `tail`：位于所有分片之后的可写尾部，连续的 `push` 在此合并；
/// - `peek` 会把头部连续的拷贝分片（以及紧随其后的尾部）合并为一段，
///   即便读端只看不取，后续写入也会出现在下一次 `peek` 中；
/// - `buffered`：`segments` 与 `tail` 的总长度，避免每次查询都遍历分片；
/// - `pushed`/`popped`：单调递增的累计计数，与 `closed`/`errored` 相互独立。
///
/// # 契约说明（What）
/// - `buffered <= capacity` 恒成立；
/// - `pushed - popped == buffered` 恒成立；
/// - `closed` 与 `errored` 仅允许 `false -> true` 的单向迁移；
/// - 所有越界参数均被截断或钳制，不产生错误。
///
/// # 风险与取舍（Trade-offs）
/// - `push_bytes` 会先冻结尾部再追加外部分片，以维持流序；零拷贝分片不参与合并，
///   大量交替调用 `push`/`push_bytes` 时，`peek` 单次返回的前缀随之变短。
/// - 合并需要拷贝，单次代价不超过 `capacity` 字节；只看不取的读端每次 `peek` 都可能触发一次合并。
#[derive(Debug)]
pub(crate) struct StreamState {
    capacity: u64,
    segments: VecDeque<Segment>,
    tail: BytesMut,
    buffered: usize,
    closed: bool,
    errored: bool,
    pushed: u64,
    popped: u64,
}

impl StreamState {
    pub(crate) fn new(capacity: u64) -> Self {
        Self {
            capacity,
            segments: VecDeque::new(),
            tail: BytesMut::new(),
            buffered: 0,
            closed: false,
            errored: false,
            pushed: 0,
            popped: 0,
        }
    }

    pub(crate) fn capacity(&self) -> u64 {
        self.capacity
    }

    pub(crate) fn available_capacity(&self) -> u64 {
        self.capacity.saturating_sub(self.buffered as u64)
    }

    pub(crate) fn buffered(&self) -> u64 {
        self.buffered as u64
    }

    pub(crate) fn pushed(&self) -> u64 {
        self.pushed
    }

    pub(crate) fn popped(&self) -> u64 {
        self.popped
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn has_error(&self) -> bool {
        self.errored
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.closed && self.buffered == 0
    }

    /// 写入是否仍被接受：已关闭或已进入错误态时一律丢弃。
    pub(crate) fn accepts_writes(&self) -> bool {
        !self.closed && !self.errored
    }

    /// 计算本次写入可以接纳的字节数。
    fn admissible(&self, offered: usize) -> usize {
        if !self.accepts_writes() {
            return 0;
        }
        // 结果不超过 `offered`，回转为 usize 不会截断。
        cmp::min(self.available_capacity(), offered as u64) as usize
    }

    /// 复制 `data` 中可容纳的前缀到尾部，返回实际接纳的字节数。
    pub(crate) fn push_slice(&mut self, data: &[u8]) -> usize {
        let accepted = self.admissible(data.len());
        if accepted == 0 {
            return 0;
        }
        self.tail.extend_from_slice(&data[..accepted]);
        self.commit_push(accepted);
        accepted
    }

    /// 以零拷贝方式追加 `data` 中可容纳的前缀，返回实际接纳的字节数。
    pub(crate) fn push_bytes(&mut self, mut data: Bytes) -> usize {
        let accepted = self.admissible(data.len());
        if accepted == 0 {
            return 0;
        }
        self.seal_tail();
        data.truncate(accepted);
        self.segments.push_back(Segment {
            bytes: data,
            copied: false,
        });
        self.commit_push(accepted);
        accepted
    }

    fn commit_push(&mut self, accepted: usize) {
        self.buffered += accepted;
        self.pushed += accepted as u64;
        self.debug_check_invariants();
    }

    /// 标记关闭；返回本次调用是否真正完成了状态迁移。
    pub(crate) fn close(&mut self) -> bool {
        !core::mem::replace(&mut self.closed, true)
    }

    /// 标记不可恢复错误；返回本次调用是否真正完成了状态迁移。
    pub(crate) fn set_error(&mut self) -> bool {
        !core::mem::replace(&mut self.errored, true)
    }

    /// 返回当前最长的零拷贝连续前缀；缓冲为空时返回空 `Bytes`。
    pub(crate) fn peek(&mut self) -> Bytes {
        self.coalesce_front();
        self.segments
            .front()
            .map(|segment| segment.bytes.clone())
            .unwrap_or_default()
    }

    /// 将头部连续的拷贝分片合并为一段；若全部分片都是拷贝分片，尾部也一并并入。
    fn coalesce_front(&mut self) {
        let run = self
            .segments
            .iter()
            .take_while(|segment| segment.copied)
            .count();
        let absorb_tail = run == self.segments.len() && !self.tail.is_empty();
        if run + usize::from(absorb_tail) <= 1 {
            if self.segments.is_empty() {
                self.seal_tail();
            }
            return;
        }

        let tail_len = if absorb_tail { self.tail.len() } else { 0 };
        let run_len: usize = self.segments.iter().take(run).map(|s| s.bytes.len()).sum();
        let mut merged = BytesMut::with_capacity(run_len + tail_len);
        for segment in self.segments.drain(..run) {
            merged.extend_from_slice(&segment.bytes);
        }
        if absorb_tail {
            merged.extend_from_slice(&self.tail);
            self.tail.clear();
        }
        self.segments.push_front(Segment {
            bytes: merged.freeze(),
            copied: true,
        });
    }

    /// 从头部丢弃至多 `len` 字节，返回实际丢弃的字节数。
    pub(crate) fn pop(&mut self, len: u64) -> usize {
        let count = cmp::min(len, self.buffered as u64) as usize;
        let mut remaining = count;
        while remaining > 0 {
            match self.segments.front_mut() {
                Some(front) if front.bytes.len() <= remaining => {
                    remaining -= front.bytes.len();
                    self.segments.pop_front();
                }
                Some(front) => {
                    front.bytes.advance(remaining);
                    remaining = 0;
                }
                None => {
                    self.tail.advance(remaining);
                    remaining = 0;
                }
            }
        }
        self.buffered -= count;
        self.popped += count as u64;
        self.debug_check_invariants();
        count
    }

    /// 取出至多 `max_len` 字节；跨分片时拷贝为一段连续缓冲。
    pub(crate) fn read(&mut self, max_len: u64) -> Bytes {
        let wanted = cmp::min(max_len, self.buffered as u64) as usize;
        if wanted == 0 {
            return Bytes::new();
        }
        let first = self.peek();
        if first.len() >= wanted {
            self.pop(wanted as u64);
            return first.slice(..wanted);
        }
        let mut out = BytesMut::with_capacity(wanted);
        while out.len() < wanted {
            let chunk = self.peek();
            let take = cmp::min(chunk.len(), wanted - out.len());
            out.extend_from_slice(&chunk[..take]);
            self.pop(take as u64);
        }
        out.freeze()
    }

    pub(crate) fn snapshot(&self) -> StreamSnapshot {
        StreamSnapshot {
            capacity: self.capacity,
            buffered: self.buffered as u64,
            pushed: self.pushed,
            popped: self.popped,
            closed: self.closed,
            errored: self.errored,
        }
    }

    /// 将尾部已写入的数据冻结为一个只读分片。
    fn seal_tail(&mut self) {
        if !self.tail.is_empty() {
            let sealed = self.tail.split().freeze();
            self.segments.push_back(Segment {
                bytes: sealed,
                copied: true,
            });
        }
    }

    fn debug_check_invariants(&self) {
        debug_assert!(self.buffered as u64 <= self.capacity, "缓冲超出容量");
        debug_assert_eq!(
            self.pushed - self.popped,
            self.buffered as u64,
            "累计计数与缓冲长度失配"
        );
        debug_assert_eq!(
            self.segments
                .iter()
                .map(|segment| segment.bytes.len())
                .sum::<usize>()
                + self.tail.len(),
            self.buffered,
            "分片总长与记账长度失配"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_pushes_coalesce_into_one_peek() {
        let mut state = StreamState::new(16);
        assert_eq!(state.push_slice(b"ab"), 2);
        assert_eq!(state.push_slice(b"cd"), 2);
        assert_eq!(state.peek(), Bytes::from_static(b"abcd"));
    }

    #[test]
    fn push_bytes_preserves_order_after_tail() {
        let mut state = StreamState::new(16);
        state.push_slice(b"ab");
        state.push_bytes(Bytes::from_static(b"cd"));
        state.push_slice(b"ef");
        assert_eq!(state.peek(), Bytes::from_static(b"ab"));
        state.pop(2);
        assert_eq!(state.peek(), Bytes::from_static(b"cd"));
        state.pop(2);
        assert_eq!(state.peek(), Bytes::from_static(b"ef"));
    }

    #[test]
    fn peek_without_pop_sees_later_pushes() {
        let mut state = StreamState::new(2048);
        state.push_slice(b"a");
        assert_eq!(state.peek(), Bytes::from_static(b"a"));
        state.push_slice(&[b'b'; 1000]);
        let view = state.peek();
        assert_eq!(view.len(), 1001);
        assert_eq!(state.segments.len(), 1);
    }

    #[test]
    fn interleaved_push_and_peek_stay_in_one_segment() {
        let mut state = StreamState::new(2048);
        for _ in 0..1024 {
            state.push_slice(b"x");
            state.peek();
        }
        assert_eq!(state.peek().len(), 1024);
        assert_eq!(state.segments.len(), 1);
    }

    #[test]
    fn zero_copy_segment_bounds_the_merge() {
        let mut state = StreamState::new(64);
        state.push_slice(b"ab");
        state.peek();
        state.push_slice(b"cd");
        state.push_bytes(Bytes::from_static(b"ef"));
        state.push_slice(b"gh");
        assert_eq!(state.peek(), Bytes::from_static(b"abcd"));
        state.pop(4);
        assert_eq!(state.peek(), Bytes::from_static(b"ef"));
        state.pop(2);
        assert_eq!(state.peek(), Bytes::from_static(b"gh"));
    }

    #[test]
    fn push_bytes_truncates_to_available_capacity() {
        let mut state = StreamState::new(3);
        assert_eq!(state.push_bytes(Bytes::from_static(b"hello")), 3);
        assert_eq!(state.peek(), Bytes::from_static(b"hel"));
        assert_eq!(state.available_capacity(), 0);
    }

    #[test]
    fn pop_spans_segments_and_tail() {
        let mut state = StreamState::new(16);
        state.push_bytes(Bytes::from_static(b"abc"));
        state.push_slice(b"def");
        assert_eq!(state.pop(4), 4);
        assert_eq!(state.peek(), Bytes::from_static(b"ef"));
        assert_eq!(state.popped(), 4);
        assert_eq!(state.buffered(), 2);
    }

    #[test]
    fn pop_from_unsealed_tail_advances_in_place() {
        let mut state = StreamState::new(8);
        state.push_slice(b"abcd");
        assert_eq!(state.pop(1), 1);
        state.push_slice(b"e");
        assert_eq!(state.peek(), Bytes::from_static(b"bcde"));
    }

    #[test]
    fn read_copies_across_segments() {
        let mut state = StreamState::new(16);
        state.push_bytes(Bytes::from_static(b"ab"));
        state.push_bytes(Bytes::from_static(b"cd"));
        assert_eq!(state.read(3), Bytes::from_static(b"abc"));
        assert_eq!(state.read(10), Bytes::from_static(b"d"));
        assert!(state.read(10).is_empty());
        assert_eq!(state.popped(), 4);
    }

    #[test]
    fn close_and_error_report_first_transition_only() {
        let mut state = StreamState::new(1);
        assert!(state.close());
        assert!(!state.close());
        assert!(state.set_error());
        assert!(!state.set_error());
        assert!(state.is_closed() && state.has_error());
    }

    #[test]
    fn errored_stream_rejects_writes() {
        let mut state = StreamState::new(8);
        state.set_error();
        assert_eq!(state.push_slice(b"abc"), 0);
        assert_eq!(state.push_bytes(Bytes::from_static(b"abc")), 0);
        assert_eq!(state.pushed(), 0);
        assert!(!state.is_finished());
    }
}
