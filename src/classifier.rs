//! Crawler Classifier
//!
//! Decides from a `User-Agent` value whether the client is a search-engine or
//! link-preview crawler.

/// Lower-case substrings identifying known crawlers.
pub const BOT_USER_AGENT_TOKENS: &[&str] = &[
    // search engines
    "googlebot",
    "bingbot",
    "slurp",
    "duckduckbot",
    "baiduspider",
    "yandexbot",
    "sogou",
    "exabot",
    // social link previews
    "facebot",
    "facebookexternalhit",
    "twitterbot",
    "linkedinbot",
    "pinterest",
    // messaging previews
    "whatsapp",
    "telegrambot",
    "discordbot",
];

/// Returns true when `user_agent` contains any known crawler token,
/// case-insensitively. Empty input is never a bot.
pub fn is_bot(user_agent: &str) -> bool {
    if user_agent.is_empty() {
        return false;
    }
    let ua = user_agent.to_lowercase();
    BOT_USER_AGENT_TOKENS.iter().any(|token| ua.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_crawlers() {
        assert!(is_bot("Googlebot/2.1 (+http://www.google.com/bot.html)"));
        assert!(is_bot(
            "Mozilla/5.0 (compatible; bingbot/2.0; +http://www.bing.com/bingbot.htm)"
        ));
        assert!(is_bot("facebookexternalhit/1.1"));
        assert!(is_bot("WhatsApp/2.23.20.0"));
        assert!(is_bot("TelegramBot (like TwitterBot)"));
    }

    #[test]
    fn test_regular_browsers() {
        assert!(!is_bot(""));
        assert!(!is_bot("Mozilla/5.0 Chrome"));
        assert!(!is_bot(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36"
        ));
    }

    #[test]
    fn test_superstring_matches() {
        assert!(is_bot("xxGOOGLEBOTxx"));
        assert!(is_bot("my-discordbot-fork"));
    }

    fn mixed_case(token: &str, mask: u32) -> String {
        token
            .chars()
            .enumerate()
            .map(|(i, c)| {
                if mask & (1 << (i % 32)) != 0 {
                    c.to_ascii_uppercase()
                } else {
                    c
                }
            })
            .collect()
    }

    proptest! {
        #[test]
        fn prop_any_token_in_any_case_matches(
            idx in 0usize..BOT_USER_AGENT_TOKENS.len(),
            mask in any::<u32>(),
            prefix in "[ -~]{0,32}",
            suffix in "[ -~]{0,32}"
        ) {
            let token = mixed_case(BOT_USER_AGENT_TOKENS[idx], mask);
            let ua = format!("{}{}{}", prefix, token, suffix);
            prop_assert!(is_bot(&ua), "{} should be classified as a bot", ua);
        }

        #[test]
        fn prop_digits_and_punctuation_never_match(ua in "[0-9 ./;()_-]{0,64}") {
            prop_assert!(!is_bot(&ua));
        }
    }
}
