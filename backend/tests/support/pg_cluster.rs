//! Shared embedded PostgreSQL cluster for the Diesel adapter suites.
//!
//! `pg-embed-setup-unpriv` leaks the shared cluster guard so PostgreSQL lives
//! for the whole test process. Each integration test binary is its own
//! process, and a postmaster left running on the shared data directory stops
//! the next binary from bootstrapping. An `atexit` hook therefore stops the
//! postmaster recorded at start-up.
//!
//! Set `SKIP_TEST_CLUSTER=1` to skip these suites where PostgreSQL cannot run.

#[cfg(unix)]
use std::ffi::CString;
#[cfg(unix)]
use std::os::unix::ffi::OsStrExt;
#[cfg(unix)]
use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::sync::OnceLock;
#[cfg(unix)]
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

use pg_embedded_setup_unpriv::{BootstrapResult, ClusterHandle};

const CLUSTER_RETRIES: usize = 5;
const CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);
#[cfg(unix)]
const CLUSTER_LOCK_FILE: &str = "foodgram-pg-embedded-cluster.lock";

#[cfg(unix)]
static POSTMASTER_PID: AtomicI32 = AtomicI32::new(0);
#[cfg(unix)]
static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();
#[cfg(unix)]
static LOCK_FD: OnceLock<i32> = OnceLock::new();

/// True when `SKIP_TEST_CLUSTER` is `1`, `true` or `yes` (any case).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker when skipping is allowed; fail loudly otherwise.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Serialise cluster start-up across test binaries with an exclusive `flock`
/// held for the rest of the process.
#[cfg(unix)]
fn lock_cluster_across_processes() -> Result<(), String> {
    if LOCK_FD.get().is_some() {
        return Ok(());
    }
    let path = std::env::temp_dir().join(CLUSTER_LOCK_FILE);
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|err| format!("encode lock path '{}': {err}", path.display()))?;

    // SAFETY: `c_path` is NUL-terminated and outlives the call.
    let fd = unsafe { libc::open(c_path.as_ptr(), libc::O_CREAT | libc::O_RDWR, 0o600) };
    if fd < 0 {
        let err = std::io::Error::last_os_error();
        return Err(format!("open lock file '{}': {err}", path.display()));
    }
    // SAFETY: `fd` was just opened above.
    if unsafe { libc::flock(fd, libc::LOCK_EX) } != 0 {
        let err = std::io::Error::last_os_error();
        // SAFETY: `fd` is valid and unused elsewhere.
        unsafe { libc::close(fd) };
        return Err(format!("lock '{}': {err}", path.display()));
    }
    if LOCK_FD.set(fd).is_err() {
        // SAFETY: another caller already holds the lock; this descriptor is ours.
        unsafe { libc::close(fd) };
    }
    Ok(())
}

/// `initdb` only runs for a fresh data directory, so later processes must
/// present the same password as the first one.
fn ensure_stable_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster library spawns threads.
        unsafe {
            std::env::set_var("PG_PASSWORD", "foodgram_embedded_test");
        }
    }
}

/// Shared cluster for this process, started on first use.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    ensure_stable_password();
    #[cfg(unix)]
    lock_cluster_across_processes()?;
    start_with_retries().map_err(|err| err.to_string())
}

fn start_with_retries() -> BootstrapResult<&'static ClusterHandle> {
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => {
                #[cfg(unix)]
                stop_at_exit(handle);
                return Ok(handle);
            }
            Err(error) if attempt >= CLUSTER_RETRIES => return Err(error),
            Err(_) => {
                std::thread::sleep(CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}

#[cfg(unix)]
fn read_postmaster_pid(data_dir: &Path) -> Option<i32> {
    let dir = cap_std::fs::Dir::open_ambient_dir(data_dir, cap_std::ambient_authority()).ok()?;
    let content = dir.read_to_string("postmaster.pid").ok()?;
    content.lines().next()?.trim().parse().ok()
}

/// SIGTERM the postmaster, then SIGKILL after five seconds.
///
/// Only signals when `postmaster.pid` still names the recorded process.
#[cfg(unix)]
extern "C" fn stop_postmaster() {
    let recorded = POSTMASTER_PID.load(Ordering::Relaxed);
    if recorded <= 0 {
        return;
    }
    let current = DATA_DIR.get().and_then(|dir| read_postmaster_pid(dir));
    if current != Some(recorded) {
        return;
    }

    // SAFETY: `recorded` matches the live `postmaster.pid`.
    if unsafe { libc::kill(recorded, libc::SIGTERM) } != 0 {
        return;
    }
    for _ in 0..50 {
        std::thread::sleep(Duration::from_millis(100));
        // SAFETY: signal 0 only probes for existence.
        if unsafe { libc::kill(recorded, 0) } != 0 {
            return;
        }
    }
    // SAFETY: same process as above, still alive after the grace period.
    unsafe {
        libc::kill(recorded, libc::SIGKILL);
    }
}

#[cfg(unix)]
fn stop_at_exit(handle: &ClusterHandle) {
    let data_dir = &handle.settings().data_dir;
    let Some(pid) = read_postmaster_pid(data_dir) else {
        return;
    };
    if POSTMASTER_PID
        .compare_exchange(0, pid, Ordering::Relaxed, Ordering::Relaxed)
        .is_err()
    {
        return;
    }
    let _ = DATA_DIR.set(data_dir.clone());

    // SAFETY: `stop_postmaster` is a plain `extern "C"` function.
    if unsafe { libc::atexit(stop_postmaster) } != 0 {
        eprintln!("pg-embed: could not register atexit hook; PostgreSQL (PID {pid}) may outlive the tests");
    }
}
