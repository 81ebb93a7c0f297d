use std::collections::VecDeque;

use arbitrary::Arbitrary;
use bytes::Bytes;
use spark_byte_stream::{ByteStream, Reader, Writer};

/// 单条字节流操作。
///
/// - **Why**：覆盖写端与读端的全部变更入口，让 fuzzer 自由组合截断、钳制、关闭与错误标记。
/// - **What**：`Pop`/`Read` 的长度使用 `u16`，既能覆盖“远超缓冲长度”的钳制场景，也不至于让单次用例过慢。
#[derive(Clone, Debug, Arbitrary)]
pub enum StreamOp {
    Push(Vec<u8>),
    PushBytes(Vec<u8>),
    Pop(u16),
    Read(u16),
    Peek,
    Close,
    WriterError,
    ReaderError,
}

/// Fuzz 用例：容量与操作序列。
#[derive(Clone, Debug, Arbitrary)]
pub struct StreamScript {
    pub capacity: u16,
    pub ops: Vec<StreamOp>,
}

/// 以 `VecDeque<u8>` 复述字节流契约的影子模型。
#[derive(Debug)]
struct Shadow {
    capacity: u64,
    buffer: VecDeque<u8>,
    closed: bool,
    errored: bool,
    pushed: u64,
    popped: u64,
}

impl Shadow {
    fn new(capacity: u64) -> Self {
        Self {
            capacity,
            buffer: VecDeque::new(),
            closed: false,
            errored: false,
            pushed: 0,
            popped: 0,
        }
    }

    fn push(&mut self, data: &[u8]) {
        if self.closed || self.errored {
            return;
        }
        let room = self.capacity - self.buffer.len() as u64;
        let accepted = room.min(data.len() as u64) as usize;
        self.buffer.extend(&data[..accepted]);
        self.pushed += accepted as u64;
    }

    fn pop(&mut self, len: u64) -> Vec<u8> {
        let count = len.min(self.buffer.len() as u64) as usize;
        self.popped += count as u64;
        self.buffer.drain(..count).collect()
    }
}

/// 执行单条脚本；真实实现与影子模型出现任何分歧时 panic。
///
/// - **前置条件**：无，任意脚本均应被安全执行。
/// - **后置条件**：若无 panic，则每一步之后容量不变式、记账不变式、计数单调性与终止律均成立，
///   且读出的字节与影子模型一致。
pub fn execute_stream_script(script: &StreamScript) {
    let capacity = u64::from(script.capacity);
    let (mut writer, mut reader) = ByteStream::split(capacity);
    let mut shadow = Shadow::new(capacity);
    let mut last = reader.snapshot();

    for op in &script.ops {
        step(op, &mut writer, &mut reader, &mut shadow);

        let now = reader.snapshot();
        assert!(now.buffered <= now.capacity, "容量不变式被破坏: {now:?}");
        assert_eq!(now.pushed - now.popped, now.buffered, "记账不变式被破坏");
        assert!(now.pushed >= last.pushed && now.popped >= last.popped, "累计计数回退");
        assert_eq!(now.buffered, shadow.buffer.len() as u64);
        assert_eq!(now.pushed, shadow.pushed);
        assert_eq!(now.popped, shadow.popped);
        assert_eq!(now.closed, shadow.closed);
        assert_eq!(now.errored, shadow.errored);
        assert_eq!(reader.is_finished(), shadow.closed && shadow.buffer.is_empty());
        last = now;
    }

    let expected: Vec<u8> = shadow.buffer.iter().copied().collect();
    assert_eq!(reader.read_up_to(u64::MAX).as_ref(), expected.as_slice());
}

fn step(op: &StreamOp, writer: &mut Writer, reader: &mut Reader, shadow: &mut Shadow) {
    match op {
        StreamOp::Push(data) => {
            shadow.push(data);
            writer.push(data);
        }
        StreamOp::PushBytes(data) => {
            shadow.push(data);
            writer.push_bytes(Bytes::copy_from_slice(data));
        }
        StreamOp::Pop(len) => {
            shadow.pop(u64::from(*len));
            reader.pop(u64::from(*len));
        }
        StreamOp::Read(len) => {
            let expected = shadow.pop(u64::from(*len));
            assert_eq!(reader.read_up_to(u64::from(*len)).as_ref(), expected.as_slice());
        }
        StreamOp::Peek => {
            let view = reader.peek();
            assert_eq!(view.is_empty(), shadow.buffer.is_empty());
            assert!(
                shadow.buffer.iter().take(view.len()).eq(view.iter()),
                "peek 返回的不是流序前缀"
            );
        }
        StreamOp::Close => {
            shadow.closed = true;
            writer.close();
        }
        StreamOp::WriterError => {
            shadow.errored = true;
            writer.set_error();
        }
        StreamOp::ReaderError => {
            shadow.errored = true;
            reader.set_error();
        }
    }
}
