//! Cue scheduler driving begin/end notifications from a playback offset

use crate::{ActivationTracker, PlaybackClock, Result, SchedulerConfig, Transition};
use cuefire_core::{CueStore, IndexedCue};

/// Receives cue notifications from a [`CueScheduler`].
///
/// Both hooks default to doing nothing; implement the ones you need.
pub trait CueHandler {
    /// Called when the offset enters a cue's interval
    fn on_cue_begin(&mut self, cue: &IndexedCue) {
        let _ = cue;
    }

    /// Called when the offset leaves a cue's interval
    fn on_cue_end(&mut self, cue: &IndexedCue) {
        let _ = cue;
    }
}

/// Handler that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl CueHandler for NoopHandler {}

impl<H: CueHandler + ?Sized> CueHandler for &mut H {
    fn on_cue_begin(&mut self, cue: &IndexedCue) {
        (**self).on_cue_begin(cue);
    }

    fn on_cue_end(&mut self, cue: &IndexedCue) {
        (**self).on_cue_end(cue);
    }
}

/// Adapts a pair of closures into a [`CueHandler`]
pub struct Callbacks<B, E> {
    begin: B,
    end: E,
}

impl<B, E> Callbacks<B, E>
where
    B: FnMut(&IndexedCue),
    E: FnMut(&IndexedCue),
{
    pub fn new(begin: B, end: E) -> Self {
        Self { begin, end }
    }
}

impl<B, E> CueHandler for Callbacks<B, E>
where
    B: FnMut(&IndexedCue),
    E: FnMut(&IndexedCue),
{
    fn on_cue_begin(&mut self, cue: &IndexedCue) {
        (self.begin)(cue);
    }

    fn on_cue_end(&mut self, cue: &IndexedCue) {
        (self.end)(cue);
    }
}

/// Owns a cue list and playback state, and notifies a handler whenever a
/// cue starts or stops being active.
///
/// Notifications are edge-triggered: each activation produces one begin and
/// each deactivation one end, and within one call every end is delivered
/// before any begin.
#[derive(Debug, Default)]
pub struct CueScheduler<H: CueHandler = NoopHandler> {
    store: CueStore,
    clock: PlaybackClock,
    tracker: ActivationTracker,
    config: SchedulerConfig,
    handler: H,
}

impl<H: CueHandler> CueScheduler<H> {
    /// Creates a scheduler with no cues loaded
    pub fn new(handler: H) -> Self {
        Self::with_config(handler, SchedulerConfig::default())
    }

    pub fn with_config(handler: H, config: SchedulerConfig) -> Self {
        Self {
            store: CueStore::new(),
            clock: PlaybackClock::new(),
            tracker: ActivationTracker::new(),
            config,
            handler,
        }
    }

    /// Loads a SubRip or WebVTT document, returning whether it parsed.
    ///
    /// A failed load leaves the scheduler inert until the next successful one.
    pub fn load(&mut self, text: &str) -> bool {
        self.load_with(text, self.config.auto_max_offset)
    }

    /// Like [`CueScheduler::load`], choosing whether the max offset follows
    /// the last cue end
    pub fn load_with(&mut self, text: &str, auto_max_offset: bool) -> bool {
        match self.try_load_with(text, auto_max_offset) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "couldn't load the subtitles, verify the subtitle format");
                false
            }
        }
    }

    /// Loads a document and reports the parse error on failure.
    ///
    /// State is updated exactly as by [`CueScheduler::load`]. Returns the
    /// number of cues loaded.
    pub fn try_load(&mut self, text: &str) -> Result<usize> {
        self.try_load_with(text, self.config.auto_max_offset)
    }

    fn try_load_with(&mut self, text: &str, auto_max_offset: bool) -> Result<usize> {
        self.tracker.clear();
        match self.store.load(text, auto_max_offset) {
            Ok(count) => {
                self.clock.reset();
                tracing::debug!(
                    cues = count,
                    max_offset_ms = self.store.max_offset_ms(),
                    "loaded subtitles"
                );
                Ok(count)
            }
            Err(e) => {
                self.clock.invalidate();
                Err(e.into())
            }
        }
    }

    /// Seeks to `offset_ms` and fires the resulting notifications.
    ///
    /// Works while paused. Ignored while no valid cue list is loaded, for
    /// negative offsets and when the offset has not changed.
    pub fn set_offset(&mut self, offset_ms: f64) {
        if !self.clock.seek(offset_ms) {
            return;
        }
        let transition = self.tracker.apply(offset_ms, &self.store);
        self.dispatch(transition);
    }

    /// Advances playback by `dt_seconds`, looping at the max offset
    pub fn update(&mut self, dt_seconds: f64) {
        if let Some(next) = self.clock.advance(dt_seconds, self.store.max_offset_ms()) {
            self.set_offset(next);
        }
    }

    fn dispatch(&mut self, transition: Transition) {
        for index in transition.ended {
            if let Some(cue) = self.store.get(index) {
                tracing::trace!(index, text = %cue.text, "cue end");
                self.handler.on_cue_end(cue);
            }
        }
        for index in transition.began {
            if let Some(cue) = self.store.get(index) {
                tracing::trace!(index, text = %cue.text, "cue begin");
                self.handler.on_cue_begin(cue);
            }
        }
    }

    /// Forgets which cues are active without firing end notifications
    pub fn clear_fired_events(&mut self) {
        tracing::debug!(fired = self.tracker.fired().len(), "clearing fired cues");
        self.tracker.clear();
    }

    /// Overrides the offset at which playback loops
    pub fn set_max_length(&mut self, value: i64) {
        tracing::debug!(max_offset_ms = value, "max length override");
        self.store.set_max_length(value);
    }

    pub fn max_offset_ms(&self) -> i64 {
        self.store.max_offset_ms()
    }

    /// Stops `update` from advancing the offset
    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// Current offset in milliseconds, or `INVALID_OFFSET` after a failed load
    pub fn offset_ms(&self) -> f64 {
        self.clock.offset_ms()
    }

    pub fn cues(&self) -> &[IndexedCue] {
        self.store.cues()
    }

    pub fn store(&self) -> &CueStore {
        &self.store
    }

    /// Cues considered active as of the last evaluation
    pub fn active_cues(&self) -> impl Iterator<Item = &IndexedCue> + '_ {
        self.tracker
            .fired()
            .iter()
            .filter_map(move |&index| self.store.get(index))
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }
}
