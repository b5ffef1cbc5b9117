// Copyright 2025 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The reveal controller.

use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;
use smallvec::SmallVec;
use unveil_timing::{Clock, ScheduleHandle, StaggerScheduler, StaggerStep, TimerId, TimerQueue};
use unveil_viewport::{SubscriptionHandle, ViewportWatcher, VisibilityEvent};

use crate::config::{RevealConfig, SectionOptions};
use crate::error::RevealError;
use crate::listener::{ListenerHandle, Listeners};
use crate::section::{Section, SectionPhase, Step};

#[derive(Debug)]
struct SectionEntry {
    steps: Vec<Step>,
    revealed: Vec<bool>,
    phase: SectionPhase,
    subscription: SubscriptionHandle,
    schedule: Option<ScheduleHandle>,
    auto_reveal: Option<TimerId>,
    registered_ms: u64,
}

/// Owns the reveal flags of every registered section and drives them from
/// viewport visibility and a stagger schedule.
///
/// The controller is single-threaded and never blocks. Every public call
/// returns synchronously; time-dependent work happens in [`advance`](Self::advance),
/// which the host calls once per event-loop turn (and at
/// [`next_deadline`](Self::next_deadline), if it arms a timer).
///
/// ## Guarantees
///
/// - A step flag goes from `false` to `true` at most once per registration and
///   never goes back while the section stays registered.
/// - Within a section, flags flip in delay order, ties in declaration order.
/// - Activation is one-shot: visibility events after the first are ignored.
/// - A stagger is anchored at the time the section crossed its threshold, not
///   at the turn that noticed it, so a late turn fires the steps it missed.
/// - After [`unregister_section`](Self::unregister_section) returns, no
///   listener hears about that section again, even if its steps were due.
///
/// ## Example
///
/// ```
/// use unveil_reveal::{RevealController, Section};
/// use unveil_timing::ManualClock;
/// use unveil_viewport::IntersectionWatcher;
/// use kurbo::Rect;
///
/// let clock = ManualClock::new();
/// let watcher = IntersectionWatcher::new(Rect::new(0.0, 0.0, 800.0, 600.0));
/// let mut reveal = RevealController::new(watcher, clock.clone());
///
/// reveal
///     .register_section(Section::new("hero").step("title", 100).step("cta", 600))
///     .unwrap();
///
/// // The platform reports the hero fully on screen.
/// reveal.watcher_mut().report_ratio("hero", 1.0, 0);
/// reveal.advance();
///
/// clock.advance(100);
/// reveal.advance();
/// assert!(reveal.is_revealed("hero", "title").unwrap());
/// assert!(!reveal.is_revealed("hero", "cta").unwrap());
/// assert_eq!(reveal.next_deadline(), Some(600));
/// ```
#[derive(Debug)]
pub struct RevealController<W, C> {
    watcher: W,
    clock: C,
    config: RevealConfig,
    sections: HashMap<String, SectionEntry>,
    by_subscription: HashMap<SubscriptionHandle, String>,
    by_schedule: HashMap<ScheduleHandle, String>,
    stagger: StaggerScheduler<usize>,
    auto_reveals: TimerQueue<String>,
    listeners: Listeners,
    /// Reused across turns.
    events: Vec<VisibilityEvent<String>>,
}

impl<W, C> RevealController<W, C>
where
    W: ViewportWatcher<String>,
    C: Clock,
{
    /// Creates a controller with the default configuration.
    pub fn new(watcher: W, clock: C) -> Self {
        Self::from_parts(watcher, clock, RevealConfig::default())
    }

    /// Creates a controller with a validated configuration.
    pub fn with_config(watcher: W, clock: C, config: RevealConfig) -> Result<Self, RevealError> {
        config.validate()?;
        Ok(Self::from_parts(watcher, clock, config))
    }

    fn from_parts(watcher: W, clock: C, config: RevealConfig) -> Self {
        Self {
            watcher,
            clock,
            config,
            sections: HashMap::new(),
            by_subscription: HashMap::new(),
            by_schedule: HashMap::new(),
            stagger: StaggerScheduler::new(),
            auto_reveals: TimerQueue::new(),
            listeners: Listeners::default(),
            events: Vec::new(),
        }
    }

    /// Registers a section with default options.
    ///
    /// See [`register_section_with`](Self::register_section_with).
    pub fn register_section(&mut self, section: Section) -> Result<(), RevealError> {
        self.register_section_with(section, SectionOptions::default())
    }

    /// Registers a section, starts observing it, and sets every flag to `false`.
    ///
    /// Fails with [`RevealError::DuplicateSection`] if the id is taken, and
    /// with [`RevealError::InvalidArgument`] for duplicate step keys or a
    /// threshold outside `[0, 1]`. On failure nothing is registered.
    pub fn register_section_with(
        &mut self,
        section: Section,
        options: SectionOptions,
    ) -> Result<(), RevealError> {
        if self.sections.contains_key(&section.id) {
            return Err(RevealError::DuplicateSection(section.id));
        }
        section.validate()?;

        let now = self.clock.now_ms();
        let threshold = options.threshold.unwrap_or(self.config.default_threshold);
        let subscription = self.watcher.observe(section.id.clone(), threshold)?;
        let auto_reveal = options.auto_reveal_after_ms.map(|delay| {
            let deadline = now.saturating_add(delay);
            self.auto_reveals.schedule(deadline, section.id.clone())
        });

        let Section { id, steps } = section;
        log::debug!(
            "registered section {id:?}: {} steps, threshold {threshold}",
            steps.len()
        );
        self.by_subscription.insert(subscription, id.clone());
        self.sections.insert(
            id,
            SectionEntry {
                revealed: vec![false; steps.len()],
                steps,
                phase: SectionPhase::Registered,
                subscription,
                schedule: None,
                auto_reveal,
                registered_ms: now,
            },
        );
        Ok(())
    }

    /// Unregisters a section, releasing its observation and cancelling any
    /// pending steps and auto-reveal.
    ///
    /// Returns `false` if the section was not registered; calling this twice
    /// is harmless. The id may be registered again afterwards and starts over
    /// with every flag `false`.
    pub fn unregister_section(&mut self, id: &str) -> bool {
        let Some(entry) = self.sections.remove(id) else {
            return false;
        };
        self.watcher.unobserve(entry.subscription);
        self.by_subscription.remove(&entry.subscription);
        if let Some(schedule) = entry.schedule {
            let dropped = self.stagger.cancel(schedule);
            self.by_schedule.remove(&schedule);
            if dropped > 0 {
                log::debug!("unregistered section {id:?} with {dropped} steps still pending");
            }
        }
        if let Some(timer) = entry.auto_reveal {
            self.auto_reveals.cancel(timer);
        }
        log::trace!("unregistered section {id:?}");
        true
    }

    /// Snapshot of a section's flags, keyed by step key.
    pub fn state(&self, id: &str) -> Result<BTreeMap<String, bool>, RevealError> {
        let entry = self.entry(id)?;
        Ok(entry
            .steps
            .iter()
            .zip(&entry.revealed)
            .map(|(step, &revealed)| (step.key.clone(), revealed))
            .collect())
    }

    /// Whether one step of a section has been revealed.
    ///
    /// Unknown step keys read as `false`.
    pub fn is_revealed(&self, id: &str, key: &str) -> Result<bool, RevealError> {
        let entry = self.entry(id)?;
        Ok(entry
            .steps
            .iter()
            .position(|step| step.key == key)
            .is_some_and(|index| entry.revealed[index]))
    }

    /// Lifecycle phase of a section, or `None` if it is not registered.
    #[must_use]
    pub fn phase(&self, id: &str) -> Option<SectionPhase> {
        self.sections.get(id).map(|entry| entry.phase)
    }

    /// Returns `true` if a section with this id is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.sections.contains_key(id)
    }

    /// Ids of every registered section, in no particular order.
    pub fn section_ids(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Number of registered sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Returns `true` if no section is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Subscribes to flag changes.
    ///
    /// The callback receives `(section_id, step_key, revealed)` right after
    /// the flag changes, before the next flag is touched. Listeners run in
    /// subscription order.
    pub fn on_change<F>(&mut self, callback: F) -> ListenerHandle
    where
        F: FnMut(&str, &str, bool) + 'static,
    {
        self.listeners.add(Box::new(callback))
    }

    /// Removes a listener. Returns `false` if it was already removed.
    pub fn remove_listener(&mut self, handle: ListenerHandle) -> bool {
        self.listeners.remove(handle)
    }

    /// Number of subscribed listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Activates a section now, as if it had just become visible.
    ///
    /// Returns `Ok(false)` if the section was already activated. Steps are
    /// scheduled from the current time and fire on later calls to
    /// [`advance`](Self::advance), including steps with zero delay.
    pub fn reveal_now(&mut self, id: &str) -> Result<bool, RevealError> {
        if !self.sections.contains_key(id) {
            return Err(RevealError::UnknownSection(id.to_owned()));
        }
        let now = self.clock.now_ms();
        Ok(self.activate(id, now))
    }

    /// Runs one host turn at the clock's current time.
    ///
    /// Collects visibility crossings from the watcher, fires due auto-reveals,
    /// then fires every due step, notifying listeners after each flag flips.
    /// Crossings start their stagger at the time they were reported with,
    /// so steps that fell due between turns fire on this one.
    /// Returns the number of flags that flipped.
    pub fn advance(&mut self) -> usize {
        let now = self.clock.now_ms();

        let mut events = core::mem::take(&mut self.events);
        self.watcher.drain_events(&mut events);
        for event in events.drain(..) {
            if !event.visible {
                continue;
            }
            // Events for released subscriptions are stale.
            if self.by_subscription.get(&event.handle) != Some(&event.target) {
                continue;
            }
            let Some(entry) = self.sections.get(&event.target) else {
                continue;
            };
            // A crossing reported before this registration counts from registration.
            let start_ms = event.at_ms.max(entry.registered_ms).min(now);
            self.activate(&event.target, start_ms);
        }
        self.events = events;

        while let Some(expired) = self.auto_reveals.pop_due(now) {
            let id = expired.payload;
            if let Some(entry) = self.sections.get_mut(&id) {
                entry.auto_reveal = None;
            }
            log::trace!("auto-revealing section {id:?}");
            // Start from the intended time so a late turn does not shift the stagger.
            self.activate(&id, expired.deadline_ms);
        }

        let mut due: SmallVec<[(ScheduleHandle, usize); 8]> = SmallVec::new();
        self.stagger
            .advance_to(now, |handle, &index| due.push((handle, index)));

        let mut flipped = 0;
        for (handle, index) in due {
            let Some(id) = self.by_schedule.get(&handle) else {
                continue;
            };
            let Some(entry) = self.sections.get_mut(id) else {
                continue;
            };
            entry.revealed[index] = true;
            flipped += 1;
            self.listeners.notify(id, &entry.steps[index].key, true);

            if entry.revealed.iter().all(|&revealed| revealed) {
                entry.phase = SectionPhase::Settled;
                entry.schedule = None;
                log::debug!("section {id:?} settled");
                self.by_schedule.remove(&handle);
            }
        }
        flipped
    }

    /// Earliest time at which [`advance`](Self::advance) has work to do,
    /// ignoring visibility changes the watcher has not reported yet.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.stagger.next_deadline(), self.auto_reveals.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// The controller configuration.
    #[must_use]
    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    /// The viewport watcher.
    #[must_use]
    pub fn watcher(&self) -> &W {
        &self.watcher
    }

    /// Mutable access to the viewport watcher, for feeding it geometry.
    ///
    /// Do not observe or unobserve targets through this reference; register
    /// and unregister sections instead.
    pub fn watcher_mut(&mut self) -> &mut W {
        &mut self.watcher
    }

    /// The clock.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn entry(&self, id: &str) -> Result<&SectionEntry, RevealError> {
        self.sections
            .get(id)
            .ok_or_else(|| RevealError::UnknownSection(id.to_owned()))
    }

    /// Starts a registered section's stagger. One-shot per registration.
    fn activate(&mut self, id: &str, start_ms: u64) -> bool {
        let Some(entry) = self.sections.get_mut(id) else {
            return false;
        };
        if entry.phase != SectionPhase::Registered {
            log::trace!("section {id:?} already activated; ignoring");
            return false;
        }
        if let Some(timer) = entry.auto_reveal.take() {
            self.auto_reveals.cancel(timer);
        }
        if entry.steps.is_empty() {
            entry.phase = SectionPhase::Settled;
            log::debug!("section {id:?} has no steps; settled on activation");
            return true;
        }

        let steps = entry
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| StaggerStep::new(index, step.delay_ms));
        let handle = self.stagger.schedule(start_ms, steps);
        entry.schedule = Some(handle);
        entry.phase = SectionPhase::Activating;
        self.by_schedule.insert(handle, id.to_owned());
        log::debug!("section {id:?} activated at {start_ms}ms");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::string::ToString;
    use core::cell::RefCell;
    use kurbo::Rect;
    use unveil_timing::ManualClock;
    use unveil_viewport::IntersectionWatcher;

    use crate::error::InvalidArgument;

    type Controller = RevealController<IntersectionWatcher<String>, ManualClock>;

    fn controller() -> (Controller, ManualClock) {
        let clock = ManualClock::new();
        let watcher = IntersectionWatcher::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        (RevealController::new(watcher, clock.clone()), clock)
    }

    fn hero() -> Section {
        Section::new("hero")
            .step("title", 100)
            .step("subtitle", 300)
            .step("cta", 600)
    }

    #[test]
    fn registration_starts_hidden() {
        let (mut c, _) = controller();
        c.register_section(hero()).unwrap();
        assert_eq!(c.phase("hero"), Some(SectionPhase::Registered));
        assert!(c.state("hero").unwrap().values().all(|&v| !v));
        assert_eq!(c.next_deadline(), None);
    }

    #[test]
    fn duplicate_registration_is_rejected_without_side_effects() {
        let (mut c, _) = controller();
        c.register_section(hero()).unwrap();
        assert_eq!(
            c.register_section(Section::new("hero").step("other", 1)),
            Err(RevealError::DuplicateSection("hero".into()))
        );
        assert_eq!(c.state("hero").unwrap().len(), 3);
        assert_eq!(c.watcher().len(), 1);
    }

    #[test]
    fn invalid_sections_leave_nothing_behind() {
        let (mut c, _) = controller();
        let dup = Section::new("dup").step("a", 0).step("a", 10);
        assert!(matches!(
            c.register_section(dup),
            Err(RevealError::InvalidArgument(_))
        ));
        let bad_threshold = SectionOptions::new().threshold(2.0);
        assert!(matches!(
            c.register_section_with(hero(), bad_threshold),
            Err(RevealError::InvalidArgument(_))
        ));
        assert!(c.is_empty());
        assert!(c.watcher().is_empty());
    }

    #[test]
    fn unknown_sections_are_reported() {
        let (mut c, _) = controller();
        assert_eq!(
            c.state("nope"),
            Err(RevealError::UnknownSection("nope".into()))
        );
        assert!(c.is_revealed("nope", "x").is_err());
        assert!(c.reveal_now("nope").is_err());
        assert!(!c.unregister_section("nope"));
    }

    #[test]
    fn empty_section_settles_on_activation() {
        let (mut c, _) = controller();
        c.register_section(Section::new("spacer")).unwrap();
        assert_eq!(c.reveal_now("spacer"), Ok(true));
        assert_eq!(c.phase("spacer"), Some(SectionPhase::Settled));
        assert_eq!(c.advance(), 0);
    }

    #[test]
    fn reveal_now_is_one_shot() {
        let (mut c, clock) = controller();
        c.register_section(hero()).unwrap();
        assert_eq!(c.reveal_now("hero"), Ok(true));
        assert_eq!(c.reveal_now("hero"), Ok(false));
        clock.set(600);
        assert_eq!(c.advance(), 3);
        assert_eq!(c.phase("hero"), Some(SectionPhase::Settled));
    }

    #[test]
    fn auto_reveal_starts_from_its_deadline() {
        let (mut c, clock) = controller();
        c.register_section_with(hero(), SectionOptions::new().auto_reveal_after(300))
            .unwrap();
        assert_eq!(c.next_deadline(), Some(300));

        // The host turn arrives late; the stagger is still anchored at 300.
        clock.set(450);
        assert_eq!(c.advance(), 1);
        assert_eq!(c.next_deadline(), Some(600));
        assert!(c.is_revealed("hero", "title").unwrap());
    }

    #[test]
    fn visibility_cancels_pending_auto_reveal() {
        let (mut c, clock) = controller();
        c.register_section_with(hero(), SectionOptions::new().auto_reveal_after(300))
            .unwrap();
        clock.set(10);
        c.watcher_mut().report_ratio("hero", 0.5, 10);
        c.advance();
        assert_eq!(c.phase("hero"), Some(SectionPhase::Activating));
        // Only the stagger remains: first step at 10 + 100.
        assert_eq!(c.next_deadline(), Some(110));
    }

    #[test]
    fn late_turn_keeps_crossing_time() {
        let (mut c, clock) = controller();
        c.register_section(hero()).unwrap();
        c.watcher_mut().report_ratio("hero", 1.0, 0);
        // The host's first turn after the crossing comes 700ms later.
        clock.set(700);
        assert_eq!(c.advance(), 3);
        assert!(c.state("hero").unwrap().values().all(|&v| v));
        assert_eq!(c.phase("hero"), Some(SectionPhase::Settled));
        assert_eq!(c.next_deadline(), None);
    }

    #[test]
    fn crossing_before_registration_counts_from_registration() {
        let (mut c, clock) = controller();
        clock.set(500);
        c.register_section(hero()).unwrap();
        c.watcher_mut().report_ratio("hero", 1.0, 200);
        c.advance();
        assert_eq!(c.next_deadline(), Some(600));
    }

    #[test]
    fn with_config_rejects_out_of_range_threshold() {
        let clock = ManualClock::new();
        let watcher = IntersectionWatcher::<String>::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        let result = RevealController::with_config(
            watcher,
            clock,
            RevealConfig {
                default_threshold: 1.5,
            },
        );
        assert_eq!(
            result.err(),
            Some(RevealError::InvalidArgument(
                InvalidArgument::ThresholdOutOfRange(1.5)
            ))
        );
    }

    #[test]
    fn per_section_threshold_is_respected() {
        let (mut c, _) = controller();
        c.register_section_with(
            Section::new("contact").step("form", 0),
            SectionOptions::new().threshold(0.15),
        )
        .unwrap();
        c.watcher_mut().report_ratio("contact", 0.12, 0);
        c.advance();
        assert_eq!(c.phase("contact"), Some(SectionPhase::Registered));
        c.watcher_mut().report_ratio("contact", 0.15, 0);
        assert_eq!(c.advance(), 1);
        assert_eq!(c.phase("contact"), Some(SectionPhase::Settled));
    }

    #[test]
    fn listener_receives_each_flip() {
        let (mut c, clock) = controller();
        c.register_section(Section::new("cta").step("button", 0)).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        c.on_change(move |section, key, value| {
            sink.borrow_mut()
                .push((section.to_string(), key.to_string(), value));
        });
        c.reveal_now("cta").unwrap();
        clock.advance(1);
        c.advance();
        assert_eq!(
            *seen.borrow(),
            [("cta".to_string(), "button".to_string(), true)]
        );
    }

    #[test]
    fn removed_listener_is_silent() {
        let (mut c, _) = controller();
        c.register_section(Section::new("s").step("k", 0)).unwrap();
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        let h = c.on_change(move |_, _, _| *counter.borrow_mut() += 1);
        assert!(c.remove_listener(h));
        assert!(!c.remove_listener(h));
        c.reveal_now("s").unwrap();
        c.advance();
        assert_eq!(*hits.borrow(), 0);
        assert_eq!(c.listener_count(), 0);
    }
}
