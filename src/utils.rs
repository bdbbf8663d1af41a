pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn cookie(name: &str, value: &str, secure: bool) -> String {
    let secure_attr = if secure { " Secure;" } else { "" };
    format!("{name}={value}; HttpOnly; Max-Age=86400;{secure_attr} Path=/; SameSite=Strict")
}

pub fn clear_cookie(name: &str) -> String {
    format!("{name}=; HttpOnly; Max-Age=0; Path=/; SameSite=Strict")
}

/// Format a second count as `m:ss` for the countdown fragment.
pub fn format_remaining(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
