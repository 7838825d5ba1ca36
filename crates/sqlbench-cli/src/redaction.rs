/// Connection string with the password replaced by `***`, safe to log.
pub fn redact_connection_string(conn: &str) -> String {
    let mut redacted = conn.to_string();

    if let Some(scheme_end) = conn.find("://") {
        let after_scheme = &conn[scheme_end + 3..];
        let authority_end = after_scheme.find(['/', '?']).unwrap_or(after_scheme.len());
        if let Some(at_idx) = after_scheme[..authority_end].rfind('@') {
            let auth_part = &after_scheme[..at_idx];
            if let Some(colon_idx) = auth_part.find(':') {
                let password_start = scheme_end + 3 + colon_idx + 1;
                let password_end = scheme_end + 3 + at_idx;
                redacted.replace_range(password_start..password_end, "***");
            }
        }
    }

    if let Some(query_start) = redacted.find('?') {
        let (base, query) = redacted.split_at(query_start + 1);
        let params = query
            .split('&')
            .map(|param| match param.split_once('=') {
                Some((key, _)) if key.eq_ignore_ascii_case("password") => format!("{key}=***"),
                _ => param.to_string(),
            })
            .collect::<Vec<_>>()
            .join("&");
        redacted = format!("{base}{params}");
    }

    redacted
}
