//! Viewport watcher
//!
//! Event glue around an `Imager`: schedules the first pass, reacts to
//! window resize and scroll, and polls lazy placeholders on a fixed
//! interval until none are left.

use std::time::{Duration, Instant};

use imager_dom::DomTree;

use crate::orchestrator::{Imager, PassFilter, ScrollOutcome};
use crate::timers::{TimerId, TimerQueue};

/// Window events the host forwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportEvent {
    Resize,
    Scroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchTask {
    InitialPass,
    ScrollCheck,
}

/// Drives an `Imager` from host events and timers
#[derive(Debug)]
pub struct ViewportWatcher {
    imager: Imager,
    timers: TimerQueue<WatchTask>,
    scroll_timer: Option<TimerId>,
    started: bool,
}

impl ViewportWatcher {
    pub fn new(imager: Imager) -> Self {
        Self {
            imager,
            timers: TimerQueue::new(),
            scroll_timer: None,
            started: false,
        }
    }

    /// Schedule the first pass and, in lazy mode, scroll polling
    pub fn start(&mut self, now: Instant) {
        if self.started {
            return;
        }
        self.started = true;

        if self.imager.capabilities().animation_frame {
            self.timers.request_frame(WatchTask::InitialPass, now);
        } else {
            self.timers.set_timeout(WatchTask::InitialPass, Duration::ZERO, now);
        }

        if self.imager.is_lazy() {
            let delay = Duration::from_millis(self.imager.scroll_sample_delay_ms());
            self.scroll_timer = Some(self.timers.set_interval(WatchTask::ScrollCheck, delay, now));
        }
    }

    /// Forward a window event. Events before the first pass are ignored.
    pub fn handle_event(&mut self, tree: &mut DomTree, event: ViewportEvent) {
        if !self.imager.is_initialized() {
            return;
        }
        match event {
            ViewportEvent::Resize if self.imager.watches_resize() => {
                let filter = if self.imager.is_lazy() {
                    PassFilter::ResolvedOrOnScreen
                } else {
                    PassFilter::All
                };
                let elements = self.imager.elements().to_vec();
                self.imager.check_images_need_replacing(tree, &elements, filter);
            }
            ViewportEvent::Scroll if self.imager.is_lazy() => self.imager.mark_scrolled(),
            _ => {}
        }
    }

    /// Run every task due at `now`, returning how many ran
    pub fn tick(&mut self, tree: &mut DomTree, now: Instant) -> usize {
        let ready = self.timers.ready(now);
        for &(id, task) in &ready {
            match task {
                WatchTask::InitialPass => {
                    self.imager.init(tree);
                    if self.imager.is_lazy() && self.imager.pending(tree) == 0 {
                        self.stop_polling();
                    }
                }
                WatchTask::ScrollCheck => {
                    if !self.imager.is_initialized() || self.scroll_timer != Some(id) {
                        continue;
                    }
                    if self.imager.scroll_check(tree) == ScrollOutcome::Finished {
                        self.stop_polling();
                    }
                }
            }
        }
        ready.len()
    }

    fn stop_polling(&mut self) {
        if let Some(id) = self.scroll_timer.take() {
            self.timers.clear(id);
            tracing::debug!("all lazy placeholders resolved, scroll polling stopped");
        }
    }

    /// Nothing scheduled
    pub fn is_idle(&self) -> bool {
        !self.timers.has_pending()
    }

    /// Scroll polling still running
    pub fn is_polling(&self) -> bool {
        self.scroll_timer.is_some()
    }

    /// How long the host loop may sleep
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.timers.time_until_next(now)
    }

    pub fn imager(&self) -> &Imager {
        &self.imager
    }

    pub fn imager_mut(&mut self) -> &mut Imager {
        &mut self.imager
    }

    pub fn into_inner(self) -> Imager {
        self.imager
    }
}
