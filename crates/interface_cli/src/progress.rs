//! Terminal progress for a billing run
//!
//! Generation and authorization each get a progress bar; declined payments
//! are printed above the bars as they happen.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use domain_billing::{Invoice, RunObserver, RunStage};

const BAR_TEMPLATE: &str = "[{prefix}] {elapsed_precise} {bar:36.cyan/blue} {pos:>4}/{len:4} {msg}";

/// Run observer drawing indicatif progress bars
pub struct ProgressObserver {
    bars: MultiProgress,
    generate: ProgressBar,
    authorize: ProgressBar,
    declined: AtomicUsize,
}

impl ProgressObserver {
    /// Draws to stderr
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Draws nothing; callbacks still count
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let bars = MultiProgress::with_draw_target(target);
        let generate = bars.add(create_progressbar(RunStage::Generate));
        let authorize = bars.add(create_progressbar(RunStage::Authorize));
        Self {
            bars,
            generate,
            authorize,
            declined: AtomicUsize::new(0),
        }
    }

    /// Declines reported so far
    pub fn declined(&self) -> usize {
        self.declined.load(Ordering::Relaxed)
    }

    fn bar(&self, stage: RunStage) -> Option<&ProgressBar> {
        match stage {
            RunStage::Generate => Some(&self.generate),
            RunStage::Authorize => Some(&self.authorize),
            _ => None,
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl RunObserver for ProgressObserver {
    fn on_stage_started(&self, stage: RunStage, total: usize) {
        match self.bar(stage) {
            Some(bar) => {
                bar.set_length(total as u64);
                bar.set_position(0);
                if total == 0 {
                    bar.finish_with_message("nothing to do");
                } else {
                    bar.enable_steady_tick(Duration::from_millis(100));
                }
            }
            None => {
                let _ = self.bars.println(format!("> {}", stage));
            }
        }
    }

    fn on_progress(&self, stage: RunStage, current: usize, total: usize) {
        if let Some(bar) = self.bar(stage) {
            bar.set_position(current as u64);
            if current == total {
                bar.finish_with_message("done");
            }
        }
    }

    fn on_authorization_failed(&self, _invoice: &Invoice, reason: &str) {
        self.declined.fetch_add(1, Ordering::Relaxed);
        self.authorize
            .set_message(format!("{} declined", self.declined()));
        let _ = self.bars.println(format!("! {}", reason));
    }
}

fn create_progressbar(stage: RunStage) -> ProgressBar {
    let progress_bar = ProgressBar::no_length();
    progress_bar.set_prefix(stage.to_string());
    if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
        progress_bar.set_style(style.progress_chars("■■□"));
    }
    progress_bar
}
