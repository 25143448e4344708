//! The single-actor dispatcher.
//!
//! All external signals funnel through [`Governor::handle_event`] and each
//! event is processed to completion against the persistent store before the
//! next, so session bookkeeping, AFK transitions, and day rollover never
//! race each other. Persistence failures degrade to "allow": the governor
//! never enforces on state it could not read or write.

use chrono::{DateTime, Datelike, Utc};

use crate::afk::{AfkTick, IdleStatus};
use crate::commit::commit;
use crate::domain::Domain;
use crate::event::Event;
use crate::rollover;
use crate::session::Session;
use crate::settings::{EnforcementDecision, Settings};
use crate::state::RuntimeState;
use crate::store::{StateStore, StoreError};

/// The event dispatcher, owning the store it persists through.
#[derive(Debug)]
pub struct Governor<S> {
    store: S,
}

impl<S: StateStore> Governor<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Read access to the underlying store, for status queries.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the governor and returns its store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Processes one event and reports what the overlay collaborator should
    /// do afterwards.
    ///
    /// Infallible by contract: a store failure is logged and answered with
    /// [`EnforcementDecision::Allow`].
    pub fn handle_event(&mut self, event: &Event) -> EnforcementDecision {
        match self.try_handle(event) {
            Ok(decision) => decision,
            Err(err) => {
                tracing::warn!(error = %err, reason = event.reason(), "event dropped on store failure");
                EnforcementDecision::Allow
            }
        }
    }

    fn try_handle(&mut self, event: &Event) -> Result<EnforcementDecision, StoreError> {
        let mut state = self.store.load_runtime()?;
        let settings = self.store.load_settings()?;

        // Configuration changes are handled even before the first settings
        // record exists; everything else needs one.
        if let Event::ConfigChanged { at, settings: new } = event {
            let mut new = new.clone();
            react_to_settings_change(*at, settings.as_ref(), &mut new, &mut state);
            self.store.save_all(&new, &state)?;
            return Ok(current_decision(&new, &state));
        }

        // Remember the raw destination regardless of configuration, so a
        // later re-enable or confirmed return can pick up where we are.
        match event {
            Event::Navigation { destination, .. } => {
                state.last_context = Some(destination.clone());
            }
            Event::FocusChanged { destination, .. } => {
                state.last_context = destination.clone();
            }
            Event::ContextClosed { .. } => state.last_context = None,
            _ => {}
        }

        let Some(mut settings) = settings else {
            tracing::trace!(reason = event.reason(), "no configuration; ignoring");
            self.store.save_runtime(&state)?;
            return Ok(EnforcementDecision::Allow);
        };
        if !settings.global_switch {
            self.store.save_runtime(&state)?;
            return Ok(EnforcementDecision::Allow);
        }

        match event {
            Event::Navigation { at, destination } => {
                sync_session(*at, Some(destination), &mut settings, &mut state);
            }
            Event::FocusChanged { at, destination } => {
                sync_session(*at, destination.as_deref(), &mut settings, &mut state);
            }
            Event::IdleChanged { at, status } => {
                if settings.afk_enabled {
                    match status {
                        IdleStatus::Idle => state.idle.on_idle_signal(*at),
                        IdleStatus::Active => state.idle.on_activity_signal(*at),
                    }
                }
            }
            Event::Tick { at } => on_tick(*at, &mut settings, &mut state),
            Event::ContextClosed { at } => {
                roll_day_if_needed(*at, &mut settings, &mut state);
                if let Some(session) = state.session.take() {
                    commit(*at, &session, &mut settings, &mut state);
                }
                state.enforcement_visible = false;
            }
            Event::ConfigChanged { .. } => unreachable!("handled above"),
        }

        self.store.save_all(&settings, &state)?;
        Ok(current_decision(&settings, &state))
    }
}

/// The decision for the context on screen right now.
const fn current_decision(settings: &Settings, state: &RuntimeState) -> EnforcementDecision {
    if state.enforcement_visible {
        settings.action.decision()
    } else {
        EnforcementDecision::Allow
    }
}

/// Closes the open session (committing it) and opens one for `destination`
/// if it is trackable and commits are not suspended.
///
/// Also recomputes enforcement visibility for the new context: the overlay
/// belongs on block-listed sites with an exhausted budget and nowhere else.
fn sync_session(
    at: DateTime<Utc>,
    destination: Option<&str>,
    settings: &mut Settings,
    state: &mut RuntimeState,
) {
    if let Some(session) = state.session.take() {
        commit(at, &session, settings, state);
    }
    if state.idle.commits_suspended() {
        // Away: the destination was recorded for the eventual return, but
        // no session may open and no overlay belongs on screen. The
        // confirmed return re-runs this evaluation against the live rules.
        state.enforcement_visible = false;
        return;
    }
    let Some(domain) = destination.and_then(Domain::from_url) else {
        state.enforcement_visible = false;
        return;
    };
    state.enforcement_visible = settings.is_blocked(&domain)
        && settings.enforcement_active
        && settings.budget_seconds <= 0.0;
    tracing::debug!(site = %domain, visible = state.enforcement_visible, "session opened");
    state.session = Some(Session::open(domain, at));
}

/// Periodic tick: day rollover, AFK progress, and the incremental commit.
fn on_tick(at: DateTime<Utc>, settings: &mut Settings, state: &mut RuntimeState) {
    roll_day_if_needed(at, settings, state);

    match state.idle.on_tick(at, settings.afk_threshold_seconds) {
        AfkTick::ThresholdReached => {
            // Final commit up to this instant, then the session closes for
            // the duration of the absence. The commit may raise the
            // visibility flag; nobody is looking, so lower it until the
            // return re-evaluates the context.
            if let Some(session) = state.session.take() {
                commit(at, &session, settings, state);
            }
            state.enforcement_visible = false;
            tracing::info!("away threshold reached; tracking suspended");
        }
        AfkTick::ReturnConfirmed => {
            let context = state.last_context.clone();
            tracing::info!(context = context.as_deref(), "return confirmed; tracking resumed");
            sync_session(at, context.as_deref(), settings, state);
        }
        AfkTick::None => {
            if state.idle.commits_suspended() {
                return;
            }
            // Commit the interval since the last tick and restart the
            // session so no instant is ever counted twice.
            if let Some(session) = state.session.take() {
                commit(at, &session, settings, state);
                state.session = Some(Session::open(session.site, at));
            }
        }
    }
}

/// Commits a session that spans a day boundary at the boundary check, then
/// lets the archive roll.
fn roll_day_if_needed(at: DateTime<Utc>, settings: &mut Settings, state: &mut RuntimeState) {
    let today = at.weekday();
    let crossing = state
        .archive
        .current_day
        .is_some_and(|day| day != today.num_days_from_monday());
    if crossing && !state.idle.commits_suspended() {
        if let Some(session) = state.session.take() {
            commit(at, &session, settings, state);
            state.session = Some(Session::open(session.site, at));
        }
    }
    rollover::check_day(state, today);
}

/// Applies a configuration change: settle the open session under the new
/// rules, prune ledger entries for removed block-list sites, and re-evaluate
/// the current context.
fn react_to_settings_change(
    at: DateTime<Utc>,
    old: Option<&Settings>,
    new: &mut Settings,
    state: &mut RuntimeState,
) {
    if let Some(session) = state.session.take() {
        commit(at, &session, new, state);
    }

    if let Some(old) = old {
        for domain in old.removed_domains(new) {
            if state.blocked_ledger.remove(&domain) {
                tracing::debug!(site = %domain, "blocked-ledger entry pruned");
            }
        }
    }

    if !new.afk_enabled {
        state.idle.clear();
    }

    if new.global_switch {
        let context = state.last_context.clone();
        sync_session(at, context.as_deref(), new, state);
    } else {
        state.enforcement_visible = false;
        state.idle.clear();
    }
    tracing::info!(
        global_switch = new.global_switch,
        enforcement = new.enforcement_active,
        sites = new.block_list.len(),
        "configuration applied"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::afk::IdleStatus;
    use crate::settings::{BlockEntry, EnforcementAction};
    use crate::store::MemoryStore;

    // 2026-03-02 is a Monday.
    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0)
            .single()
            .expect("valid test timestamp")
            + chrono::Duration::seconds(seconds)
    }

    fn domain(s: &str) -> Domain {
        Domain::from_site_entry(s).unwrap()
    }

    fn settings_blocking_youtube(budget: f64) -> Settings {
        Settings {
            enforcement_active: true,
            budget_seconds: budget,
            block_list: vec![BlockEntry {
                id: "1".to_string(),
                domain: "youtube.com".to_string(),
            }],
            ..Settings::default()
        }
    }

    fn governor(settings: Settings) -> Governor<MemoryStore> {
        Governor::new(MemoryStore::with_settings(settings))
    }

    fn navigate(gov: &mut Governor<MemoryStore>, seconds: i64, url: &str) -> EnforcementDecision {
        gov.handle_event(&Event::Navigation {
            at: at(seconds),
            destination: url.to_string(),
        })
    }

    fn tick(gov: &mut Governor<MemoryStore>, seconds: i64) -> EnforcementDecision {
        gov.handle_event(&Event::Tick { at: at(seconds) })
    }

    fn idle(gov: &mut Governor<MemoryStore>, seconds: i64, status: IdleStatus) {
        gov.handle_event(&Event::IdleChanged {
            at: at(seconds),
            status,
        });
    }

    fn runtime(gov: &Governor<MemoryStore>) -> RuntimeState {
        gov.store().load_runtime().unwrap()
    }

    fn settings(gov: &Governor<MemoryStore>) -> Settings {
        gov.store().load_settings().unwrap().unwrap()
    }

    #[test]
    fn unconfigured_store_tracks_nothing() {
        let mut gov = Governor::new(MemoryStore::new());
        let decision = navigate(&mut gov, 0, "https://youtube.com");
        assert_eq!(decision, EnforcementDecision::Allow);

        let state = runtime(&gov);
        assert!(state.session.is_none());
        assert!(state.global_ledger.is_empty());
        // The context is still remembered for a later configuration.
        assert_eq!(state.last_context.as_deref(), Some("https://youtube.com"));
    }

    #[test]
    fn master_switch_off_tracks_nothing() {
        let mut gov = governor(Settings {
            global_switch: false,
            ..settings_blocking_youtube(60.0)
        });
        navigate(&mut gov, 0, "https://youtube.com");
        tick(&mut gov, 30);

        let state = runtime(&gov);
        assert!(state.session.is_none());
        assert!(state.global_ledger.is_empty());
    }

    #[test]
    fn navigation_opens_then_switches_sessions() {
        let mut gov = governor(Settings::default());
        navigate(&mut gov, 0, "https://example.com/a");
        navigate(&mut gov, 30, "https://news.ycombinator.com");

        let state = runtime(&gov);
        assert_eq!(state.global_ledger.seconds_for(&domain("example.com")), 30.0);
        let session = state.session.unwrap();
        assert_eq!(session.site.as_str(), "news.ycombinator.com");
        assert_eq!(session.started_at, at(30));
    }

    #[test]
    fn untrackable_destination_closes_the_session() {
        let mut gov = governor(Settings::default());
        navigate(&mut gov, 0, "https://example.com");
        navigate(&mut gov, 45, "chrome://settings");

        let state = runtime(&gov);
        assert!(state.session.is_none());
        assert_eq!(state.global_ledger.seconds_for(&domain("example.com")), 45.0);
    }

    #[test]
    fn budget_exhaustion_yields_redirect() {
        let mut gov = governor(settings_blocking_youtube(60.0));
        assert_eq!(
            navigate(&mut gov, 0, "https://youtube.com/watch"),
            EnforcementDecision::Allow
        );
        assert_eq!(tick(&mut gov, 90), EnforcementDecision::Redirect);

        let state = runtime(&gov);
        assert!(state.enforcement_visible);
        assert_eq!(settings(&gov).budget_seconds, 0.0);
        assert_eq!(state.blocked_ledger.seconds_for(&domain("youtube.com")), 90.0);
        // Session restarted at the tick instant.
        assert_eq!(state.session.unwrap().started_at, at(90));
    }

    #[test]
    fn warn_action_yields_warn_decision() {
        let mut gov = governor(Settings {
            action: EnforcementAction::Warn,
            ..settings_blocking_youtube(10.0)
        });
        navigate(&mut gov, 0, "https://youtube.com");
        assert_eq!(tick(&mut gov, 30), EnforcementDecision::Warn);
    }

    #[test]
    fn leaving_the_blocked_site_clears_the_overlay() {
        let mut gov = governor(settings_blocking_youtube(10.0));
        navigate(&mut gov, 0, "https://youtube.com");
        assert_eq!(tick(&mut gov, 30), EnforcementDecision::Redirect);
        assert_eq!(
            navigate(&mut gov, 40, "https://example.com"),
            EnforcementDecision::Allow
        );
        assert!(!runtime(&gov).enforcement_visible);
    }

    #[test]
    fn returning_to_an_exhausted_site_restores_the_overlay() {
        let mut gov = governor(settings_blocking_youtube(10.0));
        navigate(&mut gov, 0, "https://youtube.com");
        tick(&mut gov, 30);
        navigate(&mut gov, 40, "https://example.com");
        assert_eq!(
            navigate(&mut gov, 50, "https://www.youtube.com/feed"),
            EnforcementDecision::Redirect
        );
    }

    #[test]
    fn ticks_never_double_count() {
        let mut gov = governor(Settings::default());
        navigate(&mut gov, 0, "https://example.com");
        tick(&mut gov, 30);
        tick(&mut gov, 60);

        let state = runtime(&gov);
        assert_eq!(state.global_ledger.seconds_for(&domain("example.com")), 60.0);
    }

    #[test]
    fn afk_threshold_commits_once_and_suspends() {
        let mut gov = governor(Settings::default());
        navigate(&mut gov, 0, "https://example.com");
        idle(&mut gov, 60, IdleStatus::Idle);
        tick(&mut gov, 360); // 300 idle seconds: threshold reached

        let state = runtime(&gov);
        assert!(state.session.is_none());
        assert!(state.idle.commits_suspended());
        assert_eq!(state.global_ledger.seconds_for(&domain("example.com")), 360.0);

        // Further ticks add nothing while away.
        tick(&mut gov, 600);
        assert_eq!(
            runtime(&gov).global_ledger.seconds_for(&domain("example.com")),
            360.0
        );
    }

    #[test]
    fn navigation_while_away_only_records_context() {
        let mut gov = governor(Settings::default());
        navigate(&mut gov, 0, "https://example.com");
        idle(&mut gov, 0, IdleStatus::Idle);
        tick(&mut gov, 300);

        navigate(&mut gov, 400, "https://news.ycombinator.com");
        let state = runtime(&gov);
        assert!(state.session.is_none());
        assert_eq!(
            state.last_context.as_deref(),
            Some("https://news.ycombinator.com")
        );
    }

    #[test]
    fn confirmed_return_resumes_tracking_from_last_context() {
        let mut gov = governor(Settings::default());
        navigate(&mut gov, 0, "https://example.com");
        idle(&mut gov, 0, IdleStatus::Idle);
        tick(&mut gov, 300);
        idle(&mut gov, 500, IdleStatus::Active);
        tick(&mut gov, 535); // settle window (30s) elapsed

        let state = runtime(&gov);
        assert!(!state.idle.commits_suspended());
        let session = state.session.unwrap();
        assert_eq!(session.site.as_str(), "example.com");
        assert_eq!(session.started_at, at(535));

        // The away interval never reached the ledger.
        assert_eq!(state.global_ledger.seconds_for(&domain("example.com")), 300.0);
    }

    #[test]
    fn flickering_return_stays_suspended() {
        let mut gov = governor(Settings::default());
        navigate(&mut gov, 0, "https://example.com");
        idle(&mut gov, 0, IdleStatus::Idle);
        tick(&mut gov, 300);
        idle(&mut gov, 400, IdleStatus::Active);
        idle(&mut gov, 410, IdleStatus::Idle); // flicker inside the window

        tick(&mut gov, 600);
        let state = runtime(&gov);
        assert!(state.idle.commits_suspended());
        assert!(state.session.is_none());
    }

    #[test]
    fn afk_disabled_ignores_idle_signals() {
        let mut gov = governor(Settings {
            afk_enabled: false,
            ..Settings::default()
        });
        navigate(&mut gov, 0, "https://example.com");
        idle(&mut gov, 0, IdleStatus::Idle);
        tick(&mut gov, 400);

        let state = runtime(&gov);
        assert!(state.session.is_some(), "tracking continues without idle detection");
        assert_eq!(state.global_ledger.seconds_for(&domain("example.com")), 400.0);
    }

    #[test]
    fn day_rollover_archives_and_restarts_the_session() {
        let mut gov = governor(Settings::default());
        tick(&mut gov, 0); // establishes Monday as the current day
        navigate(&mut gov, 0, "https://example.com");

        let next_day = 24 * 3600; // Tuesday 10:00
        tick(&mut gov, next_day);

        let state = runtime(&gov);
        // The spanning session was committed at the boundary check, and that
        // time went to Monday's archive slot.
        let monday = state.archive.global_days.get("Monday").unwrap();
        let archived = monday.as_ref().unwrap().seconds_for(&domain("example.com"));
        assert_eq!(archived, 86_400.0);
        assert!(state.global_ledger.is_empty());
        assert_eq!(state.archive.current_day, Some(1));
        assert_eq!(state.session.unwrap().started_at, at(next_day));
    }

    #[test]
    fn blocklist_removal_prunes_the_blocked_ledger() {
        let mut gov = governor(settings_blocking_youtube(600.0));
        navigate(&mut gov, 0, "https://youtube.com");
        tick(&mut gov, 90);

        let mut edited = settings(&gov);
        edited.block_list.clear();
        gov.handle_event(&Event::ConfigChanged {
            at: at(100),
            settings: edited,
        });

        let state = runtime(&gov);
        assert!(state.blocked_ledger.is_empty());
        // Total history is untouched.
        assert_eq!(state.global_ledger.seconds_for(&domain("youtube.com")), 100.0);
    }

    #[test]
    fn config_change_initializes_an_empty_store() {
        let mut gov = Governor::new(MemoryStore::new());
        gov.handle_event(&Event::ConfigChanged {
            at: at(0),
            settings: settings_blocking_youtube(60.0),
        });
        assert!(gov.store().load_settings().unwrap().is_some());

        navigate(&mut gov, 10, "https://youtube.com");
        assert!(runtime(&gov).session.is_some());
    }

    #[test]
    fn disabling_the_master_switch_settles_the_session() {
        let mut gov = governor(Settings::default());
        navigate(&mut gov, 0, "https://example.com");

        let mut edited = settings(&gov);
        edited.global_switch = false;
        gov.handle_event(&Event::ConfigChanged {
            at: at(120),
            settings: edited,
        });

        let state = runtime(&gov);
        assert!(state.session.is_none());
        assert_eq!(state.global_ledger.seconds_for(&domain("example.com")), 120.0);
        assert!(!state.enforcement_visible);

        // And nothing accumulates afterwards.
        navigate(&mut gov, 200, "https://example.com");
        assert!(runtime(&gov).session.is_none());
    }

    #[test]
    fn re_enabling_resumes_from_the_remembered_context() {
        let mut gov = governor(Settings {
            global_switch: false,
            ..Settings::default()
        });
        navigate(&mut gov, 0, "https://example.com");
        assert!(runtime(&gov).session.is_none());

        let mut edited = settings(&gov);
        edited.global_switch = true;
        gov.handle_event(&Event::ConfigChanged {
            at: at(60),
            settings: edited,
        });

        let session = runtime(&gov).session.unwrap();
        assert_eq!(session.site.as_str(), "example.com");
        assert_eq!(session.started_at, at(60));
    }

    #[test]
    fn budget_refill_clears_the_overlay() {
        let mut gov = governor(settings_blocking_youtube(10.0));
        navigate(&mut gov, 0, "https://youtube.com");
        assert_eq!(tick(&mut gov, 30), EnforcementDecision::Redirect);

        let mut edited = settings(&gov);
        edited.budget_seconds = 1800.0;
        let decision = gov.handle_event(&Event::ConfigChanged {
            at: at(40),
            settings: edited,
        });
        assert_eq!(decision, EnforcementDecision::Allow);
        assert!(!runtime(&gov).enforcement_visible);
        assert!(runtime(&gov).session.is_some());
    }

    #[test]
    fn disabling_enforcement_while_away_clears_the_overlay() {
        let mut gov = governor(settings_blocking_youtube(10.0));
        navigate(&mut gov, 0, "https://youtube.com");
        assert_eq!(tick(&mut gov, 30), EnforcementDecision::Redirect);

        // User walks away with the overlay showing.
        idle(&mut gov, 60, IdleStatus::Idle);
        tick(&mut gov, 360);
        assert!(runtime(&gov).idle.commits_suspended());

        let mut edited = settings(&gov);
        edited.enforcement_active = false;
        let decision = gov.handle_event(&Event::ConfigChanged {
            at: at(400),
            settings: edited,
        });
        assert_eq!(decision, EnforcementDecision::Allow);
        assert!(!runtime(&gov).enforcement_visible);
    }

    #[test]
    fn returning_while_still_exhausted_restores_the_overlay() {
        let mut gov = governor(settings_blocking_youtube(10.0));
        navigate(&mut gov, 0, "https://youtube.com");
        assert_eq!(tick(&mut gov, 30), EnforcementDecision::Redirect);

        idle(&mut gov, 60, IdleStatus::Idle);
        tick(&mut gov, 360);
        assert!(!runtime(&gov).enforcement_visible, "no overlay while away");

        idle(&mut gov, 500, IdleStatus::Active);
        assert_eq!(tick(&mut gov, 535), EnforcementDecision::Redirect);
        assert!(runtime(&gov).enforcement_visible);
    }

    #[test]
    fn context_closed_settles_everything() {
        let mut gov = governor(settings_blocking_youtube(600.0));
        navigate(&mut gov, 0, "https://youtube.com");
        let decision = gov.handle_event(&Event::ContextClosed { at: at(75) });
        assert_eq!(decision, EnforcementDecision::Allow);

        let state = runtime(&gov);
        assert!(state.session.is_none());
        assert!(state.last_context.is_none());
        assert_eq!(state.blocked_ledger.seconds_for(&domain("youtube.com")), 75.0);
        assert_eq!(settings(&gov).budget_seconds, 525.0);
    }

    #[test]
    fn conservation_across_a_mixed_sequence() {
        let mut gov = governor(Settings::default());
        navigate(&mut gov, 0, "https://example.com");
        tick(&mut gov, 25);
        navigate(&mut gov, 40, "https://news.ycombinator.com");
        tick(&mut gov, 70);
        gov.handle_event(&Event::ContextClosed { at: at(100) });

        let state = runtime(&gov);
        let total = state.global_ledger.total_seconds();
        assert_eq!(total, 100.0);
        assert_eq!(state.global_ledger.seconds_for(&domain("example.com")), 40.0);
        assert_eq!(
            state
                .global_ledger
                .seconds_for(&domain("news.ycombinator.com")),
            60.0
        );
    }
}
