//! Session integrity: fullscreen tracking and best-effort input deterrents.
//!
//! Key and context-menu blocking is a deterrent, not a security boundary:
//! browsers cannot reliably intercept everything listed here (Alt+Tab in
//! particular). The monitor classifies what it sees, advises suppression
//! where the platform allows it, and counts violations for diagnostics.
//! Only fullscreen changes ever reach the session state machine.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::debug;

use exam_gateway::GatewayError;

use crate::session::SessionEvent;

//
// ─── SIGNALS ───────────────────────────────────────────────────────────────────
//

/// A key event as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    /// Key name as the platform reports it ("Escape", "F5", "Tab", "c", ...).
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyPress {
    #[must_use]
    pub fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
            alt: false,
            shift: false,
            meta: false,
        }
    }

    #[must_use]
    pub fn ctrl(key: impl Into<String>) -> Self {
        Self {
            ctrl: true,
            ..Self::plain(key)
        }
    }

    #[must_use]
    pub fn alt(key: impl Into<String>) -> Self {
        Self {
            alt: true,
            ..Self::plain(key)
        }
    }
}

/// Raw platform-level signals the monitor observes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegritySignal {
    FullscreenChanged(bool),
    KeyPressed(KeyPress),
    ContextMenu,
    SelectStart,
}

/// Classified violation categories, for counting and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ViolationKind {
    EscapeAttempt,
    FullscreenToggleAttempt,
    RefreshAttempt,
    NewTabAttempt,
    ClipboardAttempt,
    TabSwitchAttempt,
    ContextMenuAttempt,
    TextSelectionAttempt,
}

/// What the caller should do with an observed signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityAction {
    /// Feed this event into the session reducer.
    Forward(SessionEvent),
    /// Swallow the input if the platform allows interception.
    Suppress(ViolationKind),
    /// Not a tracked signal; let it through.
    Allow,
}

//
// ─── MONITOR ───────────────────────────────────────────────────────────────────
//

/// Observes platform signals for one session and classifies them.
#[derive(Debug, Default)]
pub struct IntegrityMonitor {
    violations: BTreeMap<ViolationKind, u32>,
}

impl IntegrityMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies one signal, recording a violation where applicable.
    pub fn observe(&mut self, signal: IntegritySignal) -> IntegrityAction {
        match signal {
            IntegritySignal::FullscreenChanged(active) => {
                IntegrityAction::Forward(SessionEvent::FullscreenChanged(active))
            }
            IntegritySignal::KeyPressed(press) => match classify_key(&press) {
                Some(kind) => {
                    self.record(kind);
                    IntegrityAction::Suppress(kind)
                }
                None => IntegrityAction::Allow,
            },
            IntegritySignal::ContextMenu => {
                self.record(ViolationKind::ContextMenuAttempt);
                IntegrityAction::Suppress(ViolationKind::ContextMenuAttempt)
            }
            IntegritySignal::SelectStart => {
                self.record(ViolationKind::TextSelectionAttempt);
                IntegrityAction::Suppress(ViolationKind::TextSelectionAttempt)
            }
        }
    }

    fn record(&mut self, kind: ViolationKind) {
        let count = self.violations.entry(kind).or_insert(0);
        *count += 1;
        debug!(?kind, count, "integrity violation suppressed");
    }

    /// Per-kind violation counts observed so far.
    #[must_use]
    pub fn violations(&self) -> &BTreeMap<ViolationKind, u32> {
        &self.violations
    }

    /// Total violations across all kinds.
    #[must_use]
    pub fn total_violations(&self) -> u32 {
        self.violations.values().sum()
    }
}

/// Maps a key press to the violation it represents, if any.
#[must_use]
pub fn classify_key(press: &KeyPress) -> Option<ViolationKind> {
    let key = press.key.as_str();
    let letter = key.to_ascii_lowercase();
    let primary = press.ctrl || press.meta;

    match key {
        "Escape" => return Some(ViolationKind::EscapeAttempt),
        "F11" => return Some(ViolationKind::FullscreenToggleAttempt),
        "F5" => return Some(ViolationKind::RefreshAttempt),
        "Tab" if press.alt || press.ctrl => return Some(ViolationKind::TabSwitchAttempt),
        _ => {}
    }

    if primary {
        match letter.as_str() {
            "r" => return Some(ViolationKind::RefreshAttempt),
            "t" | "n" => return Some(ViolationKind::NewTabAttempt),
            "c" | "v" | "x" => return Some(ViolationKind::ClipboardAttempt),
            _ => {}
        }
    }

    None
}

//
// ─── FULLSCREEN SURFACE ────────────────────────────────────────────────────────
//

/// Platform seam for fullscreen control.
///
/// Requests are asynchronous but bounded: the platform resolves or rejects
/// promptly, it never leaves the caller hanging.
#[async_trait]
pub trait FullscreenSurface: Send + Sync {
    /// Ask the platform to enter fullscreen. `Ok(false)` means denied.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the platform surface itself fails.
    async fn request_fullscreen(&self) -> Result<bool, GatewayError>;

    /// Leave fullscreen. Best effort; a failure here never blocks teardown.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the platform surface itself fails.
    async fn exit_fullscreen(&self) -> Result<(), GatewayError>;
}

/// Surface that always grants fullscreen. Counts calls for assertions.
#[derive(Clone, Default)]
pub struct GrantingSurface {
    requests: Arc<AtomicUsize>,
    exits: Arc<AtomicUsize>,
}

impl GrantingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn exit_count(&self) -> usize {
        self.exits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FullscreenSurface for GrantingSurface {
    async fn request_fullscreen(&self) -> Result<bool, GatewayError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn exit_fullscreen(&self) -> Result<(), GatewayError> {
        self.exits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Surface that denies fullscreen until `grant()` is called.
#[derive(Clone, Default)]
pub struct DenyingSurface {
    granting: Arc<AtomicBool>,
}

impl DenyingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent requests succeed, simulating the user granting
    /// permission on retry.
    pub fn grant(&self) {
        self.granting.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl FullscreenSurface for DenyingSurface {
    async fn request_fullscreen(&self) -> Result<bool, GatewayError> {
        Ok(self.granting.load(Ordering::SeqCst))
    }

    async fn exit_fullscreen(&self) -> Result<(), GatewayError> {
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_and_function_keys_are_classified() {
        assert_eq!(
            classify_key(&KeyPress::plain("Escape")),
            Some(ViolationKind::EscapeAttempt)
        );
        assert_eq!(
            classify_key(&KeyPress::plain("F11")),
            Some(ViolationKind::FullscreenToggleAttempt)
        );
        assert_eq!(
            classify_key(&KeyPress::plain("F5")),
            Some(ViolationKind::RefreshAttempt)
        );
    }

    #[test]
    fn primary_modifier_combinations_are_classified() {
        assert_eq!(
            classify_key(&KeyPress::ctrl("r")),
            Some(ViolationKind::RefreshAttempt)
        );
        assert_eq!(
            classify_key(&KeyPress::ctrl("T")),
            Some(ViolationKind::NewTabAttempt)
        );
        for key in ["c", "v", "x"] {
            assert_eq!(
                classify_key(&KeyPress::ctrl(key)),
                Some(ViolationKind::ClipboardAttempt)
            );
        }
        assert_eq!(
            classify_key(&KeyPress::alt("Tab")),
            Some(ViolationKind::TabSwitchAttempt)
        );
        assert_eq!(
            classify_key(&KeyPress::ctrl("Tab")),
            Some(ViolationKind::TabSwitchAttempt)
        );
    }

    #[test]
    fn plain_typing_is_allowed() {
        assert_eq!(classify_key(&KeyPress::plain("a")), None);
        assert_eq!(classify_key(&KeyPress::plain("Tab")), None);
        assert_eq!(classify_key(&KeyPress::plain("Enter")), None);
    }

    #[test]
    fn monitor_counts_violations_per_kind() {
        let mut monitor = IntegrityMonitor::new();
        monitor.observe(IntegritySignal::KeyPressed(KeyPress::ctrl("c")));
        monitor.observe(IntegritySignal::KeyPressed(KeyPress::ctrl("v")));
        monitor.observe(IntegritySignal::ContextMenu);

        assert_eq!(
            monitor.violations()[&ViolationKind::ClipboardAttempt],
            2
        );
        assert_eq!(monitor.total_violations(), 3);
    }

    #[test]
    fn fullscreen_changes_are_forwarded_not_suppressed() {
        let mut monitor = IntegrityMonitor::new();
        let action = monitor.observe(IntegritySignal::FullscreenChanged(false));
        assert_eq!(
            action,
            IntegrityAction::Forward(SessionEvent::FullscreenChanged(false))
        );
        assert_eq!(monitor.total_violations(), 0);
    }

    #[test]
    fn allowed_keys_do_not_count_as_violations() {
        let mut monitor = IntegrityMonitor::new();
        let action = monitor.observe(IntegritySignal::KeyPressed(KeyPress::plain("a")));
        assert_eq!(action, IntegrityAction::Allow);
        assert_eq!(monitor.total_violations(), 0);
    }
}
