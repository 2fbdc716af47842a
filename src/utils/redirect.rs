/// Accept only same-origin relative paths as a post-login destination.
///
/// `/courses?page=2` passes; `https://evil.example`, `//evil.example`,
/// `/\evil.example` and anything without a leading slash are refused.
pub fn is_safe_redirect(target: &str) -> bool {
    if !target.starts_with('/') || target.starts_with("//") {
        return false;
    }

    !target
        .chars()
        .any(|c| c == '\\' || c.is_control() || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_relative_paths() {
        assert!(is_safe_redirect("/"));
        assert!(is_safe_redirect("/courses?page=2&level=advanced"));
        assert!(is_safe_redirect("/internships/7/apply"));
    }

    #[test]
    fn refuses_absolute_and_protocol_relative() {
        assert!(!is_safe_redirect(""));
        assert!(!is_safe_redirect("https://evil.example/"));
        assert!(!is_safe_redirect("//evil.example"));
        assert!(!is_safe_redirect("/\\evil.example"));
        assert!(!is_safe_redirect("javascript:alert(1)"));
        assert!(!is_safe_redirect("dashboard"));
        assert!(!is_safe_redirect("/a\r\nLocation: x"));
    }
}
