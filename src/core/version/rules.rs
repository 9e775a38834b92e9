// ─── Rules ───
// Allow/disallow directives that scope libraries and arguments to a platform
// or to launcher feature flags.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::version_file::Library;

/// A rule without an action never grants anything.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    #[default]
    Disallow,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    #[serde(default)]
    pub action: RuleAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<OsRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Features>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OsRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionPattern>,
}

/// Regular expression matched against the host OS version, compiled once
/// when the rule is read. An invalid pattern never matches.
#[derive(Debug, Clone)]
pub struct VersionPattern {
    source: String,
    regex: Option<Regex>,
}

impl VersionPattern {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let regex = Regex::new(&source).ok();
        Self { source, regex }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, version: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(version))
    }
}

impl From<&str> for VersionPattern {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl PartialEq for VersionPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for VersionPattern {}

impl Serialize for VersionPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for VersionPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Feature filter of a rule. Unset entries do not constrain the match.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Features {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_demo_user: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_custom_resolution: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_quick_plays_support: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_quick_play_singleplayer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_quick_play_multiplayer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_quick_play_realms: Option<bool>,
    /// Flags this launcher does not know. They are never enabled.
    #[serde(flatten)]
    pub other: BTreeMap<String, bool>,
}

/// Capability flags enabled for the launch being planned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureSet {
    pub is_demo_user: bool,
    pub has_custom_resolution: bool,
    pub has_quick_plays_support: bool,
    pub is_quick_play_singleplayer: bool,
    pub is_quick_play_multiplayer: bool,
    pub is_quick_play_realms: bool,
}

/// Host description that rules are evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleContext {
    /// Normalized Mojang platform name: `linux`, `windows` or `osx`.
    pub os_name: String,
    pub os_arch: String,
    pub os_version: Option<String>,
    pub features: FeatureSet,
}

impl RuleContext {
    pub fn new(os_name: impl Into<String>, os_arch: impl Into<String>) -> Self {
        Self {
            os_name: os_name.into(),
            os_arch: os_arch.into(),
            os_version: None,
            features: FeatureSet::default(),
        }
    }

    pub fn with_os_version(mut self, version: impl Into<String>) -> Self {
        self.os_version = Some(version.into());
        self
    }

    pub fn with_features(mut self, features: FeatureSet) -> Self {
        self.features = features;
        self
    }

    /// Context describing the machine this binary was built for.
    pub fn current() -> Self {
        Self::new(current_os_name(), std::env::consts::ARCH)
    }
}

/// Get the Mojang OS name for the current platform.
/// Android hosts report as `linux`.
pub fn current_os_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "osx"
    } else {
        "linux"
    }
}

impl OsRule {
    pub fn matches(&self, ctx: &RuleContext) -> bool {
        if let Some(name) = &self.name {
            if *name != ctx.os_name {
                return false;
            }
        }

        if let Some(arch) = &self.arch {
            if !ctx.os_arch.contains(arch.as_str()) {
                return false;
            }
        }

        if let Some(pattern) = &self.version {
            match ctx.os_version.as_deref() {
                Some(version) if pattern.is_match(version) => {}
                _ => return false,
            }
        }

        true
    }
}

impl Features {
    pub fn matches(&self, enabled: &FeatureSet) -> bool {
        let pairs = [
            (self.is_demo_user, enabled.is_demo_user),
            (self.has_custom_resolution, enabled.has_custom_resolution),
            (self.has_quick_plays_support, enabled.has_quick_plays_support),
            (
                self.is_quick_play_singleplayer,
                enabled.is_quick_play_singleplayer,
            ),
            (
                self.is_quick_play_multiplayer,
                enabled.is_quick_play_multiplayer,
            ),
            (self.is_quick_play_realms, enabled.is_quick_play_realms),
        ];

        pairs
            .iter()
            .all(|(wanted, actual)| wanted.map_or(true, |w| w == *actual))
            && self.other.values().all(|wanted| !*wanted)
    }
}

impl Rule {
    /// Whether every filter present on this rule matches the context.
    pub fn matches(&self, ctx: &RuleContext) -> bool {
        let os_matches = self.os.as_ref().map_or(true, |os| os.matches(ctx));
        let features_match = self
            .features
            .as_ref()
            .map_or(true, |f| f.matches(&ctx.features));
        os_matches && features_match
    }
}

/// Evaluate a rule list in order. The last matching rule decides;
/// with no matching rule the result is allow.
pub fn rules_allow(rules: &[Rule], ctx: &RuleContext) -> bool {
    let mut included = true;

    for rule in rules {
        if rule.matches(ctx) {
            included = rule.action == RuleAction::Allow;
        }
    }

    included
}

/// Evaluate the rules of a conditional argument. Unlike libraries, an
/// argument needs a matching `allow`: with rules present and none matching,
/// the argument is dropped.
pub fn argument_rules_allow(rules: &[Rule], ctx: &RuleContext) -> bool {
    if rules.is_empty() {
        return true;
    }

    rules
        .iter()
        .rev()
        .find(|rule| rule.matches(ctx))
        .is_some_and(|rule| rule.action == RuleAction::Allow)
}

/// Whether `library` takes part in a launch on the given host.
pub fn library_is_applicable(library: &Library, ctx: &RuleContext) -> bool {
    rules_allow(&library.rules, ctx)
}
