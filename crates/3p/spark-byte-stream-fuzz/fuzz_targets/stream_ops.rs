#![no_main]

use libfuzzer_sys::fuzz_target;
use spark_byte_stream_fuzz::{StreamScript, execute_stream_script};

// 由 fuzzer 生成容量与操作序列，差分比较真实字节流与影子模型。
fuzz_target!(|script: StreamScript| {
    execute_stream_script(&script);
});
