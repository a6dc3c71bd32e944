use log::{log_enabled, trace, warn, Level};
use std::time::Instant;

/// Wall-clock timer around a batch of fixed steps.
///
/// Warns when advancing the simulation cost more wall time than it
/// simulated, which means the world cannot keep up in real time.
pub struct StepTimer {
    start: Instant,
}

impl StepTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn finish(self, simulated_seconds: f64, steps: u32) {
        if steps == 0 {
            return;
        }

        let elapsed = self.start.elapsed().as_secs_f64();
        if elapsed > simulated_seconds {
            warn!(
                "simulation falling behind: {:.2} ms spent advancing {:.2} ms over {steps} fixed steps",
                elapsed * 1e3,
                simulated_seconds * 1e3
            );
        } else if log_enabled!(Level::Trace) {
            trace!("advanced {steps} fixed steps in {:.2} ms", elapsed * 1e3);
        }
    }
}
