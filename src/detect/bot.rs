//! Crawler detection from the User-Agent header.

/// Known crawler signatures, matched case-insensitively anywhere in the
/// User-Agent string. Covers search engine indexers, social preview
/// fetchers, SEO tools, and validators. All entries must be lowercase.
pub const BOT_SIGNATURES: &[&str] = &[
    // Search engines
    "googlebot",
    "googlebot-image",
    "google-inspectiontool",
    "bingbot",
    "slurp",
    "duckduckbot",
    "baiduspider",
    "yandexbot",
    "seznambot",
    "sogou",
    "exabot",
    "qwantify",
    "applebot",
    "petalbot",
    // Social preview fetchers
    "facebookexternalhit",
    "facebot",
    "twitterbot",
    "linkedinbot",
    "pinterestbot",
    "whatsapp",
    "telegrambot",
    "discordbot",
    "slackbot",
    "skypeuripreview",
    "redditbot",
    "vkshare",
    "embedly",
    "quora link preview",
    "outbrain",
    // SEO and auditing tools
    "semrushbot",
    "ahrefsbot",
    "mj12bot",
    "dotbot",
    "rogerbot",
    "screaming frog",
    "lighthouse",
    "chrome-lighthouse",
    "google page speed",
    "gtmetrix",
    "pingdom",
    // Validators and archivers
    "w3c_validator",
    "validator.nu",
    "ia_archiver",
];

/// Check whether a User-Agent identifies a known crawler.
///
/// A missing or empty User-Agent is never a bot. Matching is a plain
/// case-insensitive substring containment test against [`BOT_SIGNATURES`];
/// there is no version parsing or anomaly detection.
pub fn is_bot(user_agent: Option<&str>) -> bool {
    let Some(ua) = user_agent else {
        return false;
    };
    if ua.is_empty() {
        return false;
    }
    let ua = ua.to_ascii_lowercase();
    BOT_SIGNATURES.iter().any(|sig| ua.contains(sig))
}
