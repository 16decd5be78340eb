use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// `QUESTMASTER_QUIET=1` silences award notifications on the terminal
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("QUESTMASTER_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}
