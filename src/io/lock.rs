use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Lock file inside the board directory. Never deleted, so every waiter
/// contends on the same inode.
pub const LOCK_FILE: &str = ".lock";

/// How long a command waits for another `vb` process to finish writing
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("board is busy: {path} is held{}", holder_suffix(.holder))]
    Busy { path: PathBuf, holder: Option<u32> },
}

fn holder_suffix(holder: &Option<u32>) -> String {
    holder.map(|pid| format!(" by pid {pid}")).unwrap_or_default()
}

/// Exclusive advisory lock on a board directory. Released when dropped.
#[derive(Debug)]
pub struct BoardLock {
    file: File,
}

impl BoardLock {
    /// Lock `board_dir/.lock`, polling until `timeout` elapses.
    pub fn acquire(board_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = board_dir.join(LOCK_FILE);
        let open_err = |source: std::io::Error| LockError::Open {
            path: path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(open_err)?;

        let deadline = Instant::now() + timeout;
        while !try_flock(&file).map_err(open_err)? {
            if Instant::now() >= deadline {
                let holder = std::fs::read_to_string(&path)
                    .ok()
                    .and_then(|s| s.trim().parse().ok());
                return Err(LockError::Busy {
                    path: path.clone(),
                    holder,
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        }

        // Holder pid is informational only
        if let Err(e) = record_holder(&mut file) {
            tracing::debug!(path = %path.display(), error = %e, "could not record lock holder");
        }
        tracing::trace!(path = %path.display(), "board lock acquired");
        Ok(BoardLock { file })
    }

    pub fn acquire_default(board_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(board_dir, DEFAULT_LOCK_TIMEOUT)
    }
}

impl Drop for BoardLock {
    fn drop(&mut self) {
        let _ = self.file.set_len(0);
        unlock(&self.file);
    }
}

fn record_holder(file: &mut File) -> std::io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    write!(file, "{}", std::process::id())?;
    file.flush()
}

/// `Ok(false)` when another process holds the lock
#[cfg(unix)]
fn try_flock(file: &File) -> std::io::Result<bool> {
    use std::os::unix::io::AsRawFd;
    let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        return Ok(true);
    }
    let err = std::io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
        Ok(false)
    } else {
        Err(err)
    }
}

#[cfg(unix)]
fn unlock(file: &File) {
    use std::os::unix::io::AsRawFd;
    unsafe {
        libc::flock(file.as_raw_fd(), libc::LOCK_UN);
    }
}

#[cfg(not(unix))]
fn try_flock(_file: &File) -> std::io::Result<bool> {
    Ok(true)
}

#[cfg(not(unix))]
fn unlock(_file: &File) {}
