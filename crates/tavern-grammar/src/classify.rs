//! Raw-message classification.
//!
//! Every inbound chat message passes through [`classify`] exactly once.
//! The function is pure: the same text always produces a structurally
//! equal result.

/// The two suffix tokens the bot reacts to.
pub const SUFFIXES: [&str; 2] = ["++", "--"];

/// Outcome of classifying one raw message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified<'a> {
    /// A message starting with `!`: keyword plus remaining argument text.
    Bang {
        /// Command keyword (may be empty for a bare `"!"`).
        keyword: &'a str,
        /// Everything after the first whitespace run, verbatim.
        args: &'a str,
    },
    /// A message ending in `++` or `--`.
    Suffix {
        /// The two-character suffix token.
        suffix: &'a str,
        /// The text before the suffix, whitespace preserved.
        subject: &'a str,
    },
    /// Not a command at all.
    Ignore,
}

/// Classify a raw message.
///
/// Bang detection wins over suffix detection, so `"!foo++"` is the bang
/// command `foo++`. Operates on characters, not bytes, so multi-byte
/// text before a suffix is handled correctly.
pub fn classify(text: &str) -> Classified<'_> {
    if let Some(rest) = text.strip_prefix('!') {
        let (keyword, args) = split_keyword(rest);
        return Classified::Bang { keyword, args };
    }

    for suffix in SUFFIXES {
        if let Some(subject) = text.strip_suffix(suffix) {
            return Classified::Suffix { suffix, subject };
        }
    }

    Classified::Ignore
}

/// Split `"roll 2d6"` into `("roll", "2d6")` on the first whitespace run.
///
/// No whitespace means the whole string is the keyword and the argument
/// text is empty. Trailing whitespace inside the argument text is kept.
fn split_keyword(rest: &str) -> (&str, &str) {
    match rest.find(char::is_whitespace) {
        Some(idx) => {
            let keyword = &rest[..idx];
            let tail = &rest[idx..];
            let args = tail.trim_start();
            (keyword, args)
        }
        None => (rest, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bang_with_argument() {
        assert_eq!(
            classify("!roll 2d6+1"),
            Classified::Bang { keyword: "roll", args: "2d6+1" }
        );
    }

    #[test]
    fn bang_without_argument() {
        assert_eq!(
            classify("!help"),
            Classified::Bang { keyword: "help", args: "" }
        );
    }

    #[test]
    fn bang_collapses_leading_whitespace_run() {
        assert_eq!(
            classify("!roll    2d6, 1d4"),
            Classified::Bang { keyword: "roll", args: "2d6, 1d4" }
        );
    }

    #[test]
    fn bare_bang_yields_empty_keyword() {
        assert_eq!(classify("!"), Classified::Bang { keyword: "", args: "" });
    }

    #[test]
    fn suffix_plus_plus() {
        assert_eq!(
            classify("foo++"),
            Classified::Suffix { suffix: "++", subject: "foo" }
        );
    }

    #[test]
    fn suffix_minus_minus_preserves_interior_whitespace() {
        assert_eq!(
            classify("chat rooms without bots --"),
            Classified::Suffix { suffix: "--", subject: "chat rooms without bots " }
        );
    }

    #[test]
    fn bare_suffix_yields_empty_subject() {
        assert_eq!(classify("++"), Classified::Suffix { suffix: "++", subject: "" });
        assert_eq!(classify("--"), Classified::Suffix { suffix: "--", subject: "" });
    }

    #[test]
    fn plain_text_is_ignored() {
        assert_eq!(classify("no command here"), Classified::Ignore);
        assert_eq!(classify(""), Classified::Ignore);
        assert_eq!(classify("+"), Classified::Ignore);
    }

    #[test]
    fn bang_beats_suffix() {
        assert_eq!(
            classify("!karma++"),
            Classified::Bang { keyword: "karma++", args: "" }
        );
    }

    #[test]
    fn multibyte_subject() {
        assert_eq!(
            classify("café++"),
            Classified::Suffix { suffix: "++", subject: "café" }
        );
    }

    #[test]
    fn classification_is_idempotent() {
        let first = classify("!init add Goblin -r");
        let second = classify("!init add Goblin -r");
        assert_eq!(first, second);
    }
}
