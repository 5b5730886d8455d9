//! Optional subprocess isolation for segment transforms (§4.4.5): "when a
//! per-segment transform is configured and the platform supports process
//! forking, the transformation of a segment may be performed in a forked
//! child to bound memory leakage in heavy transforms." This is an
//! optimisation, not a contract — the in-process path (`run()` called
//! directly) is always correct, and this module exists purely to cap the
//! forked child's heap growth from the parent's perspective once it exits.

use slicedb_errors::{ObjectId, SliceError};

/// Runs `f` in a forked child on platforms that support it, returning the
/// bytes it produced; falls back to running `f` in-process everywhere else
/// (notably non-Unix targets, where `fork` is unavailable).
#[cfg(unix)]
pub fn maybe_forked<F>(f: F) -> Result<Vec<u8>, SliceError>
where
    F: FnOnce() -> Result<Vec<u8>, SliceError>,
{
    use std::io::{Read, Write};
    use std::os::unix::net::UnixStream;

    let (mut parent_sock, mut child_sock) = UnixStream::pair()
        .map_err(|e| SliceError::io(ObjectId::None, e))?;

    match fork::fork() {
        Ok(fork::Fork::Child) => {
            // The child never returns to the caller: it reports its result
            // over the socket and exits directly, so a panic or early exit
            // here can't unwind into code shared with the parent process.
            drop(parent_sock);
            let exit_code = match f() {
                Ok(bytes) => {
                    let len = (bytes.len() as u64).to_be_bytes();
                    let ok = child_sock.write_all(&[1]).and_then(|_| child_sock.write_all(&len)).and_then(|_| child_sock.write_all(&bytes));
                    if ok.is_err() {
                        1
                    } else {
                        0
                    }
                }
                Err(_) => {
                    let _ = child_sock.write_all(&[0]);
                    1
                }
            };
            std::process::exit(exit_code);
        }
        Ok(fork::Fork::Parent(child_pid)) => {
            drop(child_sock);
            let mut status_byte = [0u8; 1];
            parent_sock
                .read_exact(&mut status_byte)
                .map_err(|e| SliceError::io(ObjectId::None, e))?;
            let result = if status_byte[0] == 1 {
                let mut len_bytes = [0u8; 8];
                parent_sock
                    .read_exact(&mut len_bytes)
                    .map_err(|e| SliceError::io(ObjectId::None, e))?;
                let len = u64::from_be_bytes(len_bytes) as usize;
                let mut bytes = vec![0u8; len];
                parent_sock
                    .read_exact(&mut bytes)
                    .map_err(|e| SliceError::io(ObjectId::None, e))?;
                Ok(bytes)
            } else {
                Err(SliceError::data(ObjectId::None, "forked transform child reported failure".to_string()))
            };

            let exit_code = wait_for_exit(child_pid)?;
            if exit_code != 0 {
                return Err(SliceError::io(
                    ObjectId::None,
                    std::io::Error::new(
                        std::io::ErrorKind::Other,
                        format!("transform child exited with status {exit_code}"),
                    ),
                ));
            }

            result
        }
        Err(errno) => Err(SliceError::io(
            ObjectId::None,
            std::io::Error::new(std::io::ErrorKind::Other, format!("fork() failed with errno {errno}")),
        )),
    }
}

/// Blocks until `pid` exits, returning its exit code. `libc::waitpid` is used
/// directly rather than the `fork` crate (which only covers the fork/daemon
/// calls themselves, not reaping).
#[cfg(unix)]
fn wait_for_exit(pid: libc::pid_t) -> Result<i32, SliceError> {
    let mut status: libc::c_int = 0;
    let result = unsafe { libc::waitpid(pid, &mut status, 0) };
    if result == -1 {
        return Err(SliceError::io(ObjectId::None, std::io::Error::last_os_error()));
    }
    if (status & 0x7f) == 0 {
        // WIFEXITED
        Ok((status >> 8) & 0xff)
    } else {
        Ok(1)
    }
}

#[cfg(not(unix))]
pub fn maybe_forked<F>(f: F) -> Result<Vec<u8>, SliceError>
where
    F: FnOnce() -> Result<Vec<u8>, SliceError>,
{
    f()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn runs_the_closure_and_returns_its_bytes() {
        let result = maybe_forked(|| Ok(b"hello".to_vec())).unwrap();
        assert_eq!(result, b"hello");
    }

    #[test]
    fn propagates_a_data_error_from_the_child() {
        let err = maybe_forked(|| Err::<Vec<u8>, _>(SliceError::data(ObjectId::None, "boom".to_string()))).unwrap_err();
        assert_eq!(err.kind(), "data");
    }
}
