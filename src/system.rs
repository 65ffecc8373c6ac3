use std::fmt::Display;

use sysinfo::{PidExt, ProcessExt, System, SystemExt};
use tracing::warn;

/// Resources used by the bot process, as percentages
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProcessUsage {
    pub cpu: Percentage,
    pub memory: Percentage,
}

/// A percentage displayed with two decimals
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Percentage(pub f64);

impl Percentage {
    /// `part` out of `total`, 0 when `total` is 0
    pub fn of(part: u64, total: u64) -> Self {
        if total == 0 {
            return Percentage(0.0);
        }
        Percentage(part as f64 / total as f64 * 100.0)
    }
}

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

impl ProcessUsage {
    /// Measure the current process
    /// CPU usage is computed between two refreshes, so this waits a bit
    pub async fn sample() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => pid,
            Err(e) => {
                warn!("Could not find the current process: {e}");
                return ProcessUsage::default();
            }
        };

        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();
        sys.refresh_process(pid);
        tokio::time::sleep(System::MINIMUM_CPU_UPDATE_INTERVAL).await;
        sys.refresh_process(pid);

        let Some(process) = sys.process(pid) else {
            warn!("Process {} vanished from the process list", pid.as_u32());
            return ProcessUsage::default();
        };
        // sysinfo reports 100% per fully used core
        let cpus = sys.cpus().len().max(1);
        ProcessUsage {
            cpu: Percentage(process.cpu_usage() as f64 / cpus as f64),
            memory: Percentage::of(process.memory(), sys.total_memory()),
        }
    }
}
