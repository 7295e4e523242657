/// Bounded collection of child process output
use std::io::Read;
use std::process::{ChildStderr, ChildStdout};
use std::thread::{self, JoinHandle};

/// Per-stream byte caps for collected output
#[derive(Debug, Clone)]
pub struct OutputLimits {
    /// Stdout cap (bytes)
    pub stdout_limit: usize,
    /// Stderr cap (bytes)
    pub stderr_limit: usize,
}

impl Default for OutputLimits {
    fn default() -> Self {
        OutputLimits {
            stdout_limit: 8 * 1024 * 1024, // 8 MB stdout
            stderr_limit: 2 * 1024 * 1024, // 2 MB stderr
        }
    }
}

/// Output captured from one stream
#[derive(Debug, Clone, Default)]
pub struct CapturedStream {
    pub data: Vec<u8>,
    /// True when the stream exceeded its cap and was cut off
    pub truncated: bool,
}

impl CapturedStream {
    pub fn into_string(self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

/// Reader threads draining a child's stdout and stderr up to the caps.
///
/// Collection runs concurrently with supervision so the child never blocks
/// on a full pipe, even past the caps or during termination.
pub struct OutputCollector {
    stdout: Option<JoinHandle<CapturedStream>>,
    stderr: Option<JoinHandle<CapturedStream>>,
}

impl OutputCollector {
    /// Spawn reader threads for whichever streams are present
    pub fn spawn(
        stdout: Option<ChildStdout>,
        stderr: Option<ChildStderr>,
        limits: &OutputLimits,
    ) -> Self {
        let stdout_limit = limits.stdout_limit;
        let stderr_limit = limits.stderr_limit;

        let stdout = stdout.map(|stream| thread::spawn(move || collect_stream(stream, stdout_limit)));
        let stderr = stderr.map(|stream| thread::spawn(move || collect_stream(stream, stderr_limit)));

        OutputCollector { stdout, stderr }
    }

    /// Join both readers and return (stdout, stderr)
    pub fn join(self) -> (CapturedStream, CapturedStream) {
        let stdout = match self.stdout {
            Some(handle) => handle.join().unwrap_or_default(),
            None => CapturedStream::default(),
        };
        let stderr = match self.stderr {
            Some(handle) => handle.join().unwrap_or_default(),
            None => CapturedStream::default(),
        };
        (stdout, stderr)
    }

    /// Join both readers and drop everything collected.
    /// Used on the timeout path, where partial output is discarded by policy.
    pub fn discard(self) {
        let _ = self.join();
    }
}

/// Read a stream to EOF, keeping at most `limit` bytes.
/// Past the cap the stream is still drained so the writer never blocks.
fn collect_stream<R: Read>(mut stream: R, limit: usize) -> CapturedStream {
    let mut captured = CapturedStream::default();
    let mut chunk = [0u8; 4096];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break, // EOF
            Ok(n) => {
                if captured.truncated {
                    continue;
                }
                if captured.data.len() + n > limit {
                    let remaining = limit - captured.data.len();
                    captured.data.extend_from_slice(&chunk[..remaining]);
                    captured.truncated = true;
                } else {
                    captured.data.extend_from_slice(&chunk[..n]);
                }
            }
            Err(_) => break,
        }
    }

    captured
}
