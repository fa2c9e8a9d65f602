pub const C_RESET: &str = "\x1b[0m";
pub const C_DIM: &str = "\x1b[2m";
pub const C_RED: &str = "\x1b[31m";
pub const C_GREEN: &str = "\x1b[32m";
pub const C_YELLOW: &str = "\x1b[33m";
pub const C_GRAY: &str = "\x1b[90m";

/// Honors https://no-color.org: any non-empty `NO_COLOR` disables ANSI output.
pub fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").map(|v| v.is_empty()).unwrap_or(true)
}

/// Wrap `text` in `color` when colors are enabled.
pub fn paint(color: &str, text: &str) -> String {
    if colors_enabled() {
        format!("{color}{text}{C_RESET}")
    } else {
        text.to_string()
    }
}
