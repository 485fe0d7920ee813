#![allow(dead_code, unused_imports)]

pub use cliprobe_test_utils::builders::{ResolverBuilder, sh};
pub use cliprobe_test_utils::fake_executor::FakeExecutor;
pub use cliprobe_test_utils::{init_tracing, with_timeout};

/// Whether `pid` is still a live (non-zombie) process.
#[cfg(target_os = "linux")]
pub fn process_alive(pid: u32) -> bool {
    let Ok(stat) = std::fs::read_to_string(format!("/proc/{pid}/stat")) else {
        return false;
    };
    // Format: `pid (comm) state ...`; comm may contain spaces or parens.
    match stat.rfind(')').and_then(|i| stat[i + 1..].trim_start().chars().next()) {
        Some('Z') | Some('X') | None => false,
        Some(_) => true,
    }
}

/// Poll until `pid` is gone or `secs` elapse.
#[cfg(target_os = "linux")]
pub fn wait_until_dead(pid: u32, secs: u64) -> bool {
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(secs);
    while std::time::Instant::now() < deadline {
        if !process_alive(pid) {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(50));
    }
    !process_alive(pid)
}
