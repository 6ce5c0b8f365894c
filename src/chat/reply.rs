//! Canned replies picked by keyword.

use rand::Rng;
use rand::seq::IndexedRandom;

/// Which rule produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyCategory {
    Stealth,
    Launch,
    Wet,
    Help,
    /// No rule matched; a random flavor line.
    Flavor,
}

struct Rule {
    keywords: &'static [&'static str],
    category: ReplyCategory,
    text: &'static str,
}

// First match wins.
const RULES: [Rule; 4] = [
    Rule {
        keywords: &["silent", "sbd", "stealth"],
        category: ReplyCategory::Stealth,
        text: "Shhh... that one sneaked past RADAR.",
    },
    Rule {
        keywords: &["rocket", "launch", "blast"],
        category: ReplyCategory::Launch,
        text: "Ignition confirmed. Thrust levels nominal.",
    },
    Rule {
        keywords: &["wet", "squelch", "soggy"],
        category: ReplyCategory::Wet,
        text: "Moisture detected. Mop squad inbound.",
    },
    Rule {
        keywords: &["help", "how"],
        category: ReplyCategory::Help,
        text: "Type anything and I'll rate the rip. Use the Toot Keys for custom blasts!",
    },
];

pub const FLAVOR_LINES: [&str; 6] = [
    "That was a real crowd-mover 💨",
    "Certified Grade-A toot. Notes of cheddar and chaos.",
    "Wind advisory issued. Keep windows open.",
    "Silent but devastating. Respect.",
    "I detect... hints of broccoli and bold ambition.",
    "Launching stink-to-orbit in 3...2...💥",
];

pub const SPICE_GLYPH: &str = "💨";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub category: ReplyCategory,
    pub text: String,
}

/// Match `input` against the rule table, case-insensitively.
pub fn classify(input: &str) -> ReplyCategory {
    let lower = input.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lower.contains(k)))
        .map_or(ReplyCategory::Flavor, |rule| rule.category)
}

/// Decorative suffix: `ceil((len mod 9) / 2)` glyphs, at most six.
pub fn spice(input: &str) -> String {
    let n = input.chars().count() % 9;
    SPICE_GLYPH.repeat(n.div_ceil(2).min(6))
}

/// Build the bot's answer to `input`. Only the flavor pool consumes `rng`.
pub fn generate_reply<R: Rng>(input: &str, rng: &mut R) -> Reply {
    let category = classify(input);
    let line = match RULES.iter().find(|rule| rule.category == category) {
        Some(rule) => rule.text,
        None => FLAVOR_LINES.choose(rng).copied().unwrap_or(FLAVOR_LINES[0]),
    };
    Reply {
        category,
        text: format!("{line} {}", spice(input)),
    }
}
