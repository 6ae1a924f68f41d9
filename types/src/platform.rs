//! Social platform enumeration and per-platform planning configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported social media platforms, in fixed enumeration order.
///
/// The planner iterates platforms in this order, so it is part of the
/// deterministic target-selection contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Instagram,
    Facebook,
    Twitter,
    LinkedIn,
    TikTok,
}

impl Platform {
    /// All platforms in planning order.
    pub const ALL: [Platform; 5] = [
        Platform::Instagram,
        Platform::Facebook,
        Platform::Twitter,
        Platform::LinkedIn,
        Platform::TikTok,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::Facebook => "Facebook",
            Platform::Twitter => "Twitter",
            Platform::LinkedIn => "LinkedIn",
            Platform::TikTok => "TikTok",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "instagram" | "ig" => Some(Platform::Instagram),
            "facebook" | "fb" => Some(Platform::Facebook),
            "twitter" | "x" => Some(Platform::Twitter),
            "linkedin" => Some(Platform::LinkedIn),
            "tiktok" => Some(Platform::TikTok),
            _ => None,
        }
    }

    /// Short lowercase tag used inside post ids.
    #[must_use]
    pub const fn id_tag(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Twitter => "twitter",
            Platform::LinkedIn => "linkedin",
            Platform::TikTok => "tiktok",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-platform planning entry: whether the platform participates and how
/// many posts are requested for it.
///
/// A selected platform with `count == 0` contributes no planned posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub platform: Platform,
    pub selected: bool,
    pub count: u32,
}

impl PlatformConfig {
    #[must_use]
    pub const fn new(platform: Platform, selected: bool, count: u32) -> Self {
        Self {
            platform,
            selected,
            count,
        }
    }

    /// Toggle selection. Turning a platform on bumps a zero count to 1 so
    /// a freshly-selected platform immediately plans work; turning it off
    /// zeroes the count.
    pub fn select(&mut self, selected: bool) {
        self.selected = selected;
        self.count = if selected { self.count.max(1) } else { 0 };
    }

    pub fn set_count(&mut self, count: u32) {
        self.count = count;
    }

    /// True when this entry contributes targets to the plan.
    #[must_use]
    pub const fn contributes(&self) -> bool {
        self.selected && self.count > 0
    }
}

/// Default platform set: Instagram selected with one post, everything
/// else off.
#[must_use]
pub fn default_platform_configs() -> Vec<PlatformConfig> {
    Platform::ALL
        .iter()
        .map(|&platform| {
            let on = platform == Platform::Instagram;
            PlatformConfig::new(platform, on, u32::from(on))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_planning_order() {
        assert_eq!(Platform::ALL[0], Platform::Instagram);
        assert_eq!(Platform::ALL[4], Platform::TikTok);
    }

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!(Platform::parse("X"), Some(Platform::Twitter));
        assert_eq!(Platform::parse("ig"), Some(Platform::Instagram));
        assert_eq!(Platform::parse("myspace"), None);
    }

    #[test]
    fn select_on_bumps_zero_count() {
        let mut config = PlatformConfig::new(Platform::Facebook, false, 0);
        config.select(true);
        assert!(config.selected);
        assert_eq!(config.count, 1);
    }

    #[test]
    fn select_on_keeps_existing_count() {
        let mut config = PlatformConfig::new(Platform::Facebook, false, 3);
        config.select(true);
        assert_eq!(config.count, 3);
    }

    #[test]
    fn select_off_zeroes_count() {
        let mut config = PlatformConfig::new(Platform::Facebook, true, 3);
        config.select(false);
        assert!(!config.selected);
        assert_eq!(config.count, 0);
    }

    #[test]
    fn selected_zero_count_does_not_contribute() {
        let config = PlatformConfig::new(Platform::Twitter, true, 0);
        assert!(!config.contributes());
    }

    #[test]
    fn defaults_plan_one_instagram_post() {
        let configs = default_platform_configs();
        assert_eq!(configs.len(), 5);
        let contributing: Vec<_> = configs.iter().filter(|c| c.contributes()).collect();
        assert_eq!(contributing.len(), 1);
        assert_eq!(contributing[0].platform, Platform::Instagram);
        assert_eq!(contributing[0].count, 1);
    }
}
