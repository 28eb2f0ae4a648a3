// io_status.rs - per-phase time and read statistics
use std::fmt;
use std::time::{Duration, Instant};

use tracing::info;

/// Read activity of the current process, as reported by the OS.
///
/// `read_chars` counts bytes handed to `read` calls whether or not they hit the
/// page cache, which is what matters when the same edge file is read twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IOStats {
    pub read_chars: u64,
    pub read_syscalls: u64,
}

impl IOStats {
    /// Difference `self - earlier`, saturating at zero.
    pub fn diff(&self, earlier: &IOStats) -> IOStats {
        IOStats {
            read_chars: self.read_chars.saturating_sub(earlier.read_chars),
            read_syscalls: self.read_syscalls.saturating_sub(earlier.read_syscalls),
        }
    }

    /// True if any read was recorded.
    pub fn has_io(&self) -> bool {
        self.read_chars > 0 || self.read_syscalls > 0
    }

    /// Parses the contents of `/proc/<pid>/io`. Unknown or malformed lines are ignored.
    fn parse_proc_io(content: &str) -> IOStats {
        let mut stats = IOStats::default();
        for line in content.lines() {
            let mut parts = line.split_whitespace();
            if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
                if let Ok(value) = value.parse::<u64>() {
                    match key {
                        "rchar:" => stats.read_chars = value,
                        "syscr:" => stats.read_syscalls = value,
                        _ => {}
                    }
                }
            }
        }
        stats
    }

    #[cfg(target_os = "linux")]
    fn current() -> IOStats {
        std::fs::read_to_string("/proc/self/io")
            .map(|content| Self::parse_proc_io(&content))
            .unwrap_or_default()
    }

    /// Only wall time is measured outside Linux.
    #[cfg(not(target_os = "linux"))]
    fn current() -> IOStats {
        IOStats::default()
    }
}

impl fmt::Display for IOStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "read {} bytes in {} syscalls", self.read_chars, self.read_syscalls)
    }
}

/// The outcome of one measured phase.
pub struct PhaseStats<T> {
    pub result: T,
    pub duration: Duration,
    pub io_stats: IOStats,
}

impl<T> PhaseStats<T> {
    /// Logs a one-line summary of the phase at `info` level.
    pub fn log_summary(&self, phase: &str) {
        info!(
            phase,
            elapsed_us = self.duration.as_micros() as u64,
            read_bytes = self.io_stats.read_chars,
            read_syscalls = self.io_stats.read_syscalls,
            "phase finished"
        );
    }
}

/// Times phases of a run and logs what each one cost.
pub struct PhaseCollector;

impl PhaseCollector {
    /// Runs `f`, recording its wall time and the read activity it caused.
    pub fn measure<F, R>(f: F) -> PhaseStats<R>
    where
        F: FnOnce() -> R,
    {
        let start_io = IOStats::current();
        let start_time = Instant::now();

        let result = f();

        let duration = start_time.elapsed();
        let io_stats = IOStats::current().diff(&start_io);

        PhaseStats {
            result,
            duration,
            io_stats,
        }
    }

    /// Runs `f` and logs its summary under the name `phase`.
    pub fn measure_and_log<F, R>(phase: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let stats = Self::measure(f);
        stats.log_summary(phase);
        stats.result
    }
}

/// Measures a block as a named phase and logs its summary.
///
/// The block runs inside a closure, so `?` in it does not reach the caller;
/// return a `Result` from the block and apply `?` to the macro instead.
#[macro_export]
macro_rules! measure_phase {
    ($name:expr, $code:block) => {{
        $crate::io_status::PhaseCollector::measure_and_log($name, || $code)
    }};
}
