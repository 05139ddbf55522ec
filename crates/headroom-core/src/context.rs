#![forbid(unsafe_code)]

//! Page and device context gating the announcement banner.
//!
//! The router and the viewport are external collaborators. Their facts reach
//! the controller only as a [`PageContext`] value; the controller never reads
//! global router or window state itself.

/// The two facts the chrome sequencer is gated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageContext {
    /// The current route is the one that shows the banner.
    pub is_landing_route: bool,
    /// The viewport is below the mobile breakpoint.
    pub is_mobile_viewport: bool,
}

impl Default for PageContext {
    fn default() -> Self {
        Self::landing_desktop()
    }
}

impl PageContext {
    /// Landing route on a desktop viewport: the banner is eligible.
    #[must_use]
    pub const fn landing_desktop() -> Self {
        Self {
            is_landing_route: true,
            is_mobile_viewport: false,
        }
    }

    /// Whether the banner may render at all.
    #[must_use]
    pub const fn banner_eligible(&self) -> bool {
        self.is_landing_route && !self.is_mobile_viewport
    }
}

/// Rules turning a route and a viewport width into a [`PageContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextRules {
    /// Path of the landing route.
    pub landing_route: String,
    /// Viewports narrower than this many CSS pixels are mobile.
    pub mobile_breakpoint_px: u32,
}

impl Default for ContextRules {
    fn default() -> Self {
        Self {
            landing_route: "/".to_owned(),
            mobile_breakpoint_px: 768,
        }
    }
}

impl ContextRules {
    /// Whether `path` names the landing route.
    ///
    /// Query strings, fragments and a trailing slash are ignored.
    #[must_use]
    pub fn is_landing(&self, path: &str) -> bool {
        normalize_path(path) == normalize_path(&self.landing_route)
    }

    /// Whether a viewport `width_px` wide is mobile.
    #[must_use]
    pub const fn is_mobile(&self, width_px: u32) -> bool {
        width_px < self.mobile_breakpoint_px
    }

    /// Resolve both facts at once.
    #[must_use]
    pub fn resolve(&self, path: &str, width_px: u32) -> PageContext {
        PageContext {
            is_landing_route: self.is_landing(path),
            is_mobile_viewport: self.is_mobile(width_px),
        }
    }
}

fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// Tracks the latest route and viewport width and recomputes the context
/// when either changes.
#[derive(Debug, Clone)]
pub struct ContextTracker {
    rules: ContextRules,
    route: String,
    width_px: u32,
    current: PageContext,
}

impl ContextTracker {
    /// Start tracking from an initial route and width.
    #[must_use]
    pub fn new(rules: ContextRules, route: &str, width_px: u32) -> Self {
        let current = rules.resolve(route, width_px);
        Self {
            rules,
            route: route.to_owned(),
            width_px,
            current,
        }
    }

    /// Current context.
    #[must_use]
    pub const fn current(&self) -> PageContext {
        self.current
    }

    /// Current route.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Current viewport width.
    #[must_use]
    pub const fn width_px(&self) -> u32 {
        self.width_px
    }

    /// Record a route change. Returns the new context if it changed.
    pub fn set_route(&mut self, route: &str) -> Option<PageContext> {
        route.clone_into(&mut self.route);
        self.refresh()
    }

    /// Record a viewport resize. Returns the new context if it changed.
    pub fn set_viewport_width(&mut self, width_px: u32) -> Option<PageContext> {
        self.width_px = width_px;
        self.refresh()
    }

    fn refresh(&mut self) -> Option<PageContext> {
        let next = self.rules.resolve(&self.route, self.width_px);
        if next == self.current {
            return None;
        }
        self.current = next;
        Some(next)
    }
}
