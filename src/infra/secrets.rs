use std::panic;

const REDACTED: &str = "[REDACTED]";

const SENSITIVE_MARKERS: [&str; 7] = [
    "password", "passwd", "secret", "token", "apikey", "api_key", "bearer",
];

/// Scrubs credential-looking fragments from text that may reach logs or the terminal.
pub fn redact_text(input: &str) -> String {
    let mut redact_next = false;
    input
        .split_whitespace()
        .map(|chunk| {
            let lowered = chunk.to_ascii_lowercase();
            let sensitive = SENSITIVE_MARKERS
                .iter()
                .any(|marker| lowered.contains(marker));
            let scrubbed = if sensitive || redact_next || looks_like_jwt(chunk) {
                REDACTED.to_owned()
            } else {
                chunk.to_owned()
            };
            // `Bearer <token>` splits the secret into its own chunk.
            redact_next = lowered == "bearer";
            scrubbed
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `ana@example.com` becomes `a***@example.com`.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{first}***@{domain}")
        }
        None => REDACTED.to_owned(),
    }
}

pub fn install_panic_redaction_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic payload omitted".to_owned());

        let scrubbed = redact_text(&payload);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "dataconsult panic: {} at {}:{}:{}",
                scrubbed,
                location.file(),
                location.line(),
                location.column()
            );
        } else {
            eprintln!("dataconsult panic: {}", scrubbed);
        }
    }));
}

fn looks_like_jwt(value: &str) -> bool {
    let segments: Vec<_> = value.split('.').collect();
    segments.len() == 3
        && segments.iter().all(|segment| {
            segment.len() >= 8
                && segment
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        })
}
