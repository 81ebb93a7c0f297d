use bytes::Bytes;
use criterion::{Criterion, Throughput, black_box};
use spark_byte_stream::ByteStream;
use std::{env, time::Duration};

const CAPACITY: u64 = 64 * 1024;
const PAYLOAD: usize = 1500;

/// 字节流吞吐基准：模拟传输栈以 MTU 粒度喂入、以任意粒度排空的典型节奏。
///
/// # 设计背景（Why）
/// - `push` 在尾部合并写入、`peek` 时才冻结分片，需要确认这一策略在高频小写入下不会退化；
/// - `push_bytes` 走零拷贝路径，与拷贝路径对照可以观察分片数量对 `peek` 的影响。
///
/// # 逻辑解析（How）
/// - 每轮迭代持续写入直至容量耗尽，再以 `peek` + `pop` 排空，统计总字节吞吐。
fn bench_push_then_drain(c: &mut Criterion) {
    let payload = vec![0xA5u8; PAYLOAD];
    let shared = Bytes::from(payload.clone());

    let mut group = c.benchmark_group("byte_stream");
    group.throughput(Throughput::Bytes(CAPACITY));

    group.bench_function("push_copy_then_drain", |b| {
        let (mut writer, mut reader) = ByteStream::split(CAPACITY);
        b.iter(|| {
            while writer.available_capacity() > 0 {
                writer.push(&payload);
            }
            loop {
                let chunk = reader.peek();
                if chunk.is_empty() {
                    break;
                }
                reader.pop(black_box(chunk).len() as u64);
            }
        });
    });

    group.bench_function("push_bytes_then_read", |b| {
        let (mut writer, mut reader) = ByteStream::split(CAPACITY);
        b.iter(|| {
            while writer.available_capacity() > 0 {
                writer.push_bytes(shared.clone());
            }
            while reader.bytes_buffered() > 0 {
                black_box(reader.read_up_to(4096));
            }
        });
    });

    group.finish();
}

fn main() {
    let mut quick_mode = false;
    for arg in env::args().skip(1) {
        if arg == "--quick" {
            quick_mode = true;
        }
    }

    let mut criterion = Criterion::default();
    if quick_mode {
        criterion = criterion
            .sample_size(10)
            .warm_up_time(Duration::from_millis(100))
            .measurement_time(Duration::from_millis(250));
    }

    bench_push_then_drain(&mut criterion);
    criterion.final_summary();
}
