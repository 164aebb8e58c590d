use super::{Animator, Pane, PositionMap, ScrollMap, Viewport};

/// Default pull-up of the source end of the scroll map, in pixels.
pub const DEFAULT_END_SLACK: f64 = 5.0;

/// The two panes as seen by [`SyncScroll`].
pub trait ScrollHost {
    fn viewport(&self, pane: Pane) -> Viewport;

    fn set_scroll_top(&mut self, pane: Pane, scroll_top: f64);

    /// Measures both panes and pairs their anchors. Only called when the
    /// cached map was invalidated.
    fn build_map(&self) -> PositionMap;
}

/// Makes the pane the user is not scrolling follow the one they are.
///
/// Exactly one pane drives at a time. Scroll events from the other pane are
/// ignored, so the animated pane never feeds back into the driving one.
#[derive(Debug, Clone)]
pub struct SyncScroll {
    map: ScrollMap,
    source: Animator,
    result: Animator,
    driving: Pane,
}

impl Default for SyncScroll {
    fn default() -> Self {
        Self::new(super::DEFAULT_ANIMATION_MS)
    }
}

impl SyncScroll {
    /// Starts out driven by the source pane.
    pub fn new(animation_ms: f64) -> Self {
        Self {
            map: ScrollMap::new(),
            source: Animator::new(animation_ms),
            result: Animator::new(animation_ms),
            driving: Pane::Source,
        }
    }

    pub fn driving(&self) -> Pane {
        self.driving
    }

    pub fn switch_to(&mut self, pane: Pane) {
        if self.driving != pane {
            log::debug!("scroll sync now driven by {pane:?}");
        }
        self.driving = pane;
    }

    /// Handles a scroll of `pane`. Returns whether the other pane was given
    /// a new target.
    pub fn on_scroll<H: ScrollHost + ?Sized>(&mut self, pane: Pane, host: &H) -> bool {
        if pane != self.driving {
            return false;
        }
        let viewport = host.viewport(pane);
        let target = self.map.position(pane, viewport, || host.build_map());
        let follower = pane.other();
        let current = host.viewport(follower).scroll_top;
        self.animator_mut(follower).set_target(target, current);
        true
    }

    /// Steps both animators to `timestamp` (milliseconds) and applies the
    /// results. Returns whether anything is still moving.
    pub fn frame<H: ScrollHost + ?Sized>(&mut self, timestamp: f64, host: &mut H) -> bool {
        for pane in [Pane::Source, Pane::Result] {
            if let Some(position) = self.animator_mut(pane).frame(timestamp) {
                host.set_scroll_top(pane, position);
            }
        }
        self.is_animating()
    }

    /// Drops the scroll map after the content or layout changed.
    pub fn invalidate(&mut self) {
        if self.map.is_built() {
            log::debug!("scroll map invalidated");
        }
        self.map.reset();
    }

    pub fn stop(&mut self, pane: Pane) {
        self.animator_mut(pane).stop();
    }

    pub fn is_animating(&self) -> bool {
        self.source.is_running() || self.result.is_running()
    }

    pub fn animator(&self, pane: Pane) -> &Animator {
        match pane {
            Pane::Source => &self.source,
            Pane::Result => &self.result,
        }
    }

    fn animator_mut(&mut self, pane: Pane) -> &mut Animator {
        match pane {
            Pane::Source => &mut self.source,
            Pane::Result => &mut self.result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    struct FakeHost {
        source: Viewport,
        result: Viewport,
        builds: Cell<usize>,
    }

    impl FakeHost {
        fn new() -> Self {
            Self {
                source: Viewport {
                    scroll_top: 0.0,
                    height: 100.0,
                },
                result: Viewport {
                    scroll_top: 0.0,
                    height: 100.0,
                },
                builds: Cell::new(0),
            }
        }

        fn scroll(&mut self, pane: Pane, scroll_top: f64) {
            self.set_scroll_top(pane, scroll_top);
        }
    }

    impl ScrollHost for FakeHost {
        fn viewport(&self, pane: Pane) -> Viewport {
            match pane {
                Pane::Source => self.source,
                Pane::Result => self.result,
            }
        }

        fn set_scroll_top(&mut self, pane: Pane, scroll_top: f64) {
            match pane {
                Pane::Source => self.source.scroll_top = scroll_top,
                Pane::Result => self.result.scroll_top = scroll_top,
            }
        }

        fn build_map(&self) -> PositionMap {
            self.builds.set(self.builds.get() + 1);
            PositionMap::new(vec![0.0, 100.0, 300.0, 500.0], vec![0.0, 50.0, 150.0, 400.0])
                .unwrap()
        }
    }

    fn settle(sync: &mut SyncScroll, host: &mut FakeHost, start: f64) -> f64 {
        let mut t = start;
        while sync.frame(t, host) {
            t += 16.0;
            assert!(t < start + 10_000.0, "never settled");
        }
        t
    }

    #[test]
    fn result_follows_source() {
        let mut host = FakeHost::new();
        let mut sync = SyncScroll::default();

        host.scroll(Pane::Source, 150.0);
        assert!(sync.on_scroll(Pane::Source, &host));
        assert!(sync.is_animating());
        settle(&mut sync, &mut host, 0.0);

        assert_eq!(host.result.scroll_top, 50.0);
        assert_eq!(host.source.scroll_top, 150.0);
    }

    #[test]
    fn non_driving_pane_is_ignored() {
        let mut host = FakeHost::new();
        let mut sync = SyncScroll::default();

        host.scroll(Pane::Result, 200.0);
        assert!(!sync.on_scroll(Pane::Result, &host));
        assert!(!sync.is_animating());
        assert_eq!(host.builds.get(), 0);
    }

    #[test]
    fn switching_reverses_the_direction() {
        let mut host = FakeHost::new();
        let mut sync = SyncScroll::default();
        sync.switch_to(Pane::Result);
        assert_eq!(sync.driving(), Pane::Result);

        host.scroll(Pane::Result, 50.0);
        assert!(sync.on_scroll(Pane::Result, &host));
        assert!(!sync.on_scroll(Pane::Source, &host));
        settle(&mut sync, &mut host, 0.0);

        assert_eq!(host.source.scroll_top, 150.0);
    }

    #[test]
    fn map_is_built_once_until_invalidated() {
        let mut host = FakeHost::new();
        let mut sync = SyncScroll::default();

        host.scroll(Pane::Source, 150.0);
        sync.on_scroll(Pane::Source, &host);
        host.scroll(Pane::Source, 160.0);
        sync.on_scroll(Pane::Source, &host);
        assert_eq!(host.builds.get(), 1);

        sync.invalidate();
        sync.on_scroll(Pane::Source, &host);
        assert_eq!(host.builds.get(), 2);
    }

    #[test]
    fn scrolling_back_to_top_needs_no_map() {
        let mut host = FakeHost::new();
        let mut sync = SyncScroll::default();

        host.result.scroll_top = 80.0;
        sync.on_scroll(Pane::Source, &host);
        settle(&mut sync, &mut host, 0.0);

        assert_eq!(host.result.scroll_top, 0.0);
        assert_eq!(host.builds.get(), 0);
    }

    #[test]
    fn stop_freezes_the_follower() {
        let mut host = FakeHost::new();
        let mut sync = SyncScroll::default();

        host.scroll(Pane::Source, 150.0);
        sync.on_scroll(Pane::Source, &host);
        sync.frame(0.0, &mut host);
        sync.frame(50.0, &mut host);
        let frozen = host.result.scroll_top;
        sync.stop(Pane::Result);

        assert!(!sync.frame(66.0, &mut host));
        assert_eq!(host.result.scroll_top, frozen);
        assert!(frozen > 0.0 && frozen < 50.0);
    }
}
