//! Progress indicator for long-running background work.
//!
//! The supervisor spawns the work on the runtime's worker threads and, until
//! the work's join handle resolves, redraws a rotating indicator on a single
//! output line. It cannot cancel the work on request; it only gives up on it
//! once the deadline has passed.
use std::{future::Future, io::Write, time::Duration};

use console::style;
use log::{debug, error};
use tokio::time::{self, MissedTickBehavior};

use crate::{Result, SavedError};

/// The four indicator phases, drawn in order.
pub const SPINNER_GLYPHS: [char; 4] = ['-', '\\', '|', '/'];

/// Time each indicator phase stays on screen.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(250);

pub struct ProgressSupervisor<W: Write> {
    out: W,
    frame_interval: Duration,
    deadline: Duration,
    animate: bool,
}

impl<W: Write> ProgressSupervisor<W> {
    /// Creates a supervisor drawing on `out` that abandons work running
    /// longer than `deadline`.
    pub fn new(out: W, deadline: Duration) -> Self {
        Self {
            out,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            deadline,
            animate: true,
        }
    }

    pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval;
        self
    }

    /// Turns the rotating indicator off, e.g. when `out` is not a terminal.
    /// The completion message is still written.
    pub fn with_animation(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Runs `work` on a worker task and shows progress until it finishes.
    ///
    /// Returns the work's own result. If the deadline passes first the task
    /// is aborted and [`SavedError::FetchTimedOut`] is returned.
    pub async fn run<T, F>(&mut self, label: &str, work: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let mut worker = tokio::spawn(work);

        let mut ticker = time::interval(self.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let deadline = time::sleep(self.deadline);
        tokio::pin!(deadline);

        let mut frame = 0usize;
        let joined = loop {
            tokio::select! {
                biased;

                joined = &mut worker => break joined,

                _ = &mut deadline => {
                    worker.abort();
                    self.clear_line(label)?;
                    error!("{} did not finish within {:?}", label, self.deadline);
                    return Err(SavedError::FetchTimedOut {
                        seconds: self.deadline.as_secs(),
                    });
                }

                _ = ticker.tick() => {
                    if self.animate {
                        self.draw(label, SPINNER_GLYPHS[frame % SPINNER_GLYPHS.len()])?;
                    }
                    frame += 1;
                }
            }
        };

        debug!("{} finished after {} frames", label, frame);
        self.clear_line(label)?;
        let result = joined.map_err(|e| SavedError::FetchFailed {
            message: format!("{} worker stopped unexpectedly: {}", label, e),
        })?;
        match &result {
            Ok(_) => writeln!(self.out, "{} {}", label, style("complete").green())?,
            Err(_) => writeln!(self.out, "{} {}", label, style("failed").red())?,
        }
        self.out.flush()?;

        result
    }

    fn draw(&mut self, label: &str, glyph: char) -> Result<()> {
        write!(self.out, "\r{} {}", label, glyph)?;
        self.out.flush()?;
        Ok(())
    }

    fn clear_line(&mut self, label: &str) -> Result<()> {
        if self.animate {
            // label, space and glyph
            write!(self.out, "\r{}\r", " ".repeat(label.chars().count() + 2))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supervisor(deadline: Duration) -> ProgressSupervisor<Vec<u8>> {
        ProgressSupervisor::new(Vec::new(), deadline).with_frame_interval(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn returns_worker_result_and_reports_completion() {
        let mut progress = supervisor(Duration::from_secs(5));

        let value = progress
            .run("Fetching", async {
                time::sleep(Duration::from_millis(40)).await;
                Ok(42)
            })
            .await
            .unwrap();

        assert_eq!(value, 42);
        let output = String::from_utf8(progress.into_inner()).unwrap();
        assert!(output.contains("Fetching -"));
        assert!(output.contains("complete"));
    }

    #[tokio::test]
    async fn indicator_cycles_through_all_phases() {
        let mut progress = supervisor(Duration::from_secs(5));

        progress
            .run("Working", async {
                time::sleep(Duration::from_millis(100)).await;
                Ok(())
            })
            .await
            .unwrap();

        let output = String::from_utf8(progress.into_inner()).unwrap();
        for glyph in SPINNER_GLYPHS {
            assert!(
                output.contains(&format!("\rWorking {glyph}")),
                "missing phase {glyph:?}"
            );
        }
    }

    #[tokio::test]
    async fn worker_errors_are_passed_through() {
        let mut progress = supervisor(Duration::from_secs(5));

        let err = progress
            .run::<(), _>("Fetching", async {
                Err(SavedError::FetchFailed {
                    message: "HTTP 500".to_string(),
                })
            })
            .await
            .unwrap_err();

        assert!(err.to_string().contains("HTTP 500"));
        let output = String::from_utf8(progress.into_inner()).unwrap();
        assert!(!output.contains("complete"));
        assert!(output.contains("failed"));
    }

    #[tokio::test]
    async fn deadline_abandons_hung_work() {
        let mut progress = supervisor(Duration::from_millis(30));

        let err = progress
            .run::<(), _>("Fetching", async {
                time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SavedError::FetchTimedOut { .. }));
        let output = String::from_utf8(progress.into_inner()).unwrap();
        assert!(!output.contains("complete"));
    }

    #[tokio::test]
    async fn without_animation_only_completion_is_written() {
        let mut progress = supervisor(Duration::from_secs(5)).with_animation(false);

        progress
            .run("Fetching", async {
                time::sleep(Duration::from_millis(20)).await;
                Ok(())
            })
            .await
            .unwrap();

        let output = String::from_utf8(progress.into_inner()).unwrap();
        assert!(!output.contains('\r'));
        assert!(output.starts_with("Fetching "));
        assert!(output.contains("complete"));
    }

    #[tokio::test]
    async fn panicking_worker_is_reported_as_fetch_failure() {
        let mut progress = supervisor(Duration::from_secs(5));

        let err = progress
            .run("Fetching", async {
                let fail = true;
                if fail {
                    panic!("boom");
                }
                Ok(())
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SavedError::FetchFailed { .. }));
        let output = String::from_utf8(progress.into_inner()).unwrap();
        assert!(!output.contains("complete"));
    }
}
