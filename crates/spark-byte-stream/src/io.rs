//! `std::io` 适配层：让字节流可以直接接入基于 `Read`/`Write` 的既有代码。
//!
//! # 契约（What）
//! - 写端：字节流已关闭或出错时返回 `BrokenPipe`；缓冲已满返回 `WouldBlock`；
//!   否则返回实际接纳的字节数（可能小于输入长度）。
//! - 读端：`is_finished` 时返回 `Ok(0)` 表示 EOF；缓冲为空但尚未结束时返回 `WouldBlock`；
//!   出错且已排空时返回 `Other`。单次 `read` 至多拷贝一个连续分片。

use std::io;

use crate::{Reader, Writer};

impl io::Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.is_closed() || self.has_error() {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "byte stream no longer accepts writes",
            ));
        }
        match self.push_counted(buf) {
            0 => Err(io::ErrorKind::WouldBlock.into()),
            accepted => Ok(accepted),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Read for Reader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let chunk = self.peek();
        if chunk.is_empty() {
            if self.is_finished() {
                return Ok(0);
            }
            if self.has_error() {
                return Err(io::Error::other("byte stream errored"));
            }
            return Err(io::ErrorKind::WouldBlock.into());
        }
        let copied = chunk.len().min(buf.len());
        buf[..copied].copy_from_slice(&chunk[..copied]);
        self.pop(copied as u64);
        Ok(copied)
    }
}
