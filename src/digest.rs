//! `Content-MD5` computation over a byte range of a seekable stream.

use {
    crate::{
        constants::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE},
        crypto::base64_encode,
        validation::validate_chunk_size,
        SignatureError,
    },
    log::{trace, warn},
    md5::{Digest, Md5},
    std::{
        cmp::min,
        io::{ErrorKind, Read, Result as IOResult, Seek, SeekFrom},
    },
};

/// Holds a stream and seeks it back to where it started when dropped.
struct PositionGuard<'a, S: Seek> {
    stream: &'a mut S,
    origin: u64,
    restored: bool,
}

impl<'a, S: Seek> PositionGuard<'a, S> {
    fn new(stream: &'a mut S) -> IOResult<Self> {
        let origin = stream.stream_position()?;
        Ok(Self {
            stream,
            origin,
            restored: false,
        })
    }

    /// Restore the original position, reporting any failure to do so.
    fn restore(mut self) -> IOResult<()> {
        self.restored = true;
        self.stream.seek(SeekFrom::Start(self.origin))?;
        Ok(())
    }
}

impl<S: Seek> Drop for PositionGuard<'_, S> {
    fn drop(&mut self) {
        if !self.restored {
            if let Err(e) = self.stream.seek(SeekFrom::Start(self.origin)) {
                warn!("Failed to restore stream position {}: {}", self.origin, e);
            }
        }
    }
}

/// Compute the base64-encoded MD5 digest of a byte range of `stream`, suitable for a
/// `Content-MD5` header.
///
/// * `offset` - If non-zero, the stream is first seeked to this absolute position; zero means
///   "start from the current position".
/// * `length` - The number of bytes to digest. A negative value digests to the end of the stream;
///   zero digests nothing.
/// * `chunk_size` - The size of each read; must be positive. Reads never exceed the requested
///   length, and the read buffer is capped at 1 MiB.
///
/// The stream is always returned to the position it had on entry, whether or not digesting
/// succeeds. The `&mut` borrow gives this call exclusive use of the stream until it returns.
pub fn content_md5<S>(stream: &mut S, offset: u64, length: i64, chunk_size: usize) -> Result<String, SignatureError>
where
    S: Read + Seek,
{
    validate_chunk_size(chunk_size)?;

    let mut guard = PositionGuard::new(stream)?;
    if offset != 0 {
        guard.stream.seek(SeekFrom::Start(offset))?;
    }

    // Never allocate more than the range needs, nor more than MAX_CHUNK_SIZE.
    let buf_size = if length > 0 {
        min(min(chunk_size, MAX_CHUNK_SIZE) as u64, length as u64) as usize
    } else {
        min(chunk_size, MAX_CHUNK_SIZE)
    };

    let mut hasher = Md5::new();
    let mut buf = vec![0u8; buf_size];
    let mut remaining = length;
    let mut total = 0u64;

    while remaining != 0 {
        let to_read = if remaining > 0 {
            min(buf_size as u64, remaining as u64) as usize
        } else {
            buf_size
        };

        let n = match guard.stream.read(&mut buf[..to_read]) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        if n == 0 {
            break;
        }

        hasher.update(&buf[..n]);
        total += n as u64;

        if remaining > 0 {
            remaining -= n as i64;
        }
    }

    guard.restore()?;
    trace!("Digested {} bytes at offset {}", total, offset);
    Ok(base64_encode(hasher.finalize()))
}

/// Compute the base64-encoded MD5 digest of everything from the stream's current position to its end.
pub fn content_md5_to_end<S>(stream: &mut S) -> Result<String, SignatureError>
where
    S: Read + Seek,
{
    content_md5(stream, 0, -1, DEFAULT_CHUNK_SIZE)
}

/// Compute the base64-encoded MD5 digest of an in-memory buffer.
pub fn content_md5_bytes(data: &[u8]) -> String {
    base64_encode(Md5::digest(data))
}
