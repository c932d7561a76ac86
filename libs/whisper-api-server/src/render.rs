use std::fmt::Write;

use whisper_api::{MessageRecord, ReceivedRecord};

const STYLE: &str = r#"
        body { font-family: Arial, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; }
        .container { background-color: #f5f5f5; border-radius: 8px; padding: 20px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        .header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 20px; }
        .message { background-color: white; border: 1px solid #ddd; border-radius: 4px; padding: 10px; margin-bottom: 10px; }
        .meta { color: #666; font-size: 0.8em; margin-top: 8px; padding-top: 8px; border-top: 1px solid #eee; }
        .ok { color: #3c763d; }
        .bad { color: #a94442; }
        button { color: white; border: none; padding: 8px 16px; border-radius: 4px; cursor: pointer; }
        .publish { background-color: #4CAF50; }
        .clear { background-color: #dc3545; }
        #result { margin-top: 20px; }
"#;

/// Escape text for an HTML text node or a quoted attribute.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Unix ms → `YYYY-MM-DD HH:MM:SS` (UTC).
/// Дата по алгоритму Howard Hinnant (civil_from_days).
pub fn datetime_from_ms(ms: i64) -> String {
    let secs = ms.div_euclid(1000);
    let days = secs.div_euclid(86400);
    let tod = secs.rem_euclid(86400);

    let z = days + 719468;
    let era = z.div_euclid(146097);
    let doe = z.rem_euclid(146097);
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };

    format!(
        "{y:04}-{m:02}-{d:02} {:02}:{:02}:{:02}",
        tod / 3600,
        tod % 3600 / 60,
        tod % 60
    )
}

fn page(title: &str, body: &str, script: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n    <title>{title}</title>\n    <style>{STYLE}</style>\n</head>\n<body>\n    <div class=\"container\">\n{body}    </div>\n    <script>{script}</script>\n</body>\n</html>\n",
        title = escape(title),
    )
}

const CLEAR_SCRIPT: &str = r#"
        function clearMessages() {
            const base = window.location.pathname.replace(/\/$/, '');
            fetch(base + '/clear', { method: 'POST' })
                .then(r => r.ok ? window.location.reload() : alert('Failed to clear messages'))
                .catch(() => alert('Failed to clear messages'));
        }
"#;

const PUBLISH_SCRIPT: &str = r#"
        async function publish() {
            const result = document.getElementById('result');
            try {
                const response = await fetch('/whisper', { method: 'POST' });
                const body = await response.json();
                result.className = response.ok ? 'message ok' : 'message bad';
                result.textContent = response.ok
                    ? 'Published ' + body.token + ' (message ' + body.messageId + ')'
                    : 'Error: ' + body.error;
            } catch (e) {
                result.className = 'message bad';
                result.textContent = 'Error: ' + e.message;
            }
        }
"#;

/// Publisher home: publish button plus the recent history, newest last.
pub fn publisher_page(records: &[MessageRecord]) -> String {
    let mut body = String::new();
    body.push_str("        <div class=\"header\">\n            <h1>Message Publisher</h1>\n");
    body.push_str("            <button class=\"publish\" onclick=\"publish()\">Publish Token</button>\n        </div>\n");
    body.push_str("        <div id=\"result\"></div>\n        <h2>Recently published</h2>\n");
    if records.is_empty() {
        body.push_str("        <p>Nothing published yet.</p>\n");
    }
    for r in records {
        let _ = write!(
            body,
            "        <div class=\"message\">\n            <div class=\"content\">{}</div>\n            <div class=\"meta\">Published at {}</div>\n        </div>\n",
            escape(&r.content),
            datetime_from_ms(r.created_at_ms),
        );
    }
    page("Message Publisher", &body, PUBLISH_SCRIPT)
}

/// Subscriber home: received tokens with their validation outcome.
pub fn subscriber_page(records: &[ReceivedRecord]) -> String {
    let mut body = String::new();
    body.push_str("        <div class=\"header\">\n            <h1>Received Messages</h1>\n");
    body.push_str("            <button class=\"clear\" onclick=\"clearMessages()\">Clear Messages</button>\n        </div>\n");
    if records.is_empty() {
        body.push_str("        <p>No messages received yet.</p>\n");
    }
    for r in records {
        let (class, label) = if r.validated {
            ("ok", "validated")
        } else {
            ("bad", "not validated")
        };
        let _ = write!(
            body,
            "        <div class=\"message\">\n            <div class=\"content\">{}</div>\n            <div class=\"meta\">Received at {} &middot; <span class=\"{class}\">{label}</span></div>\n        </div>\n",
            escape(&r.random_value),
            datetime_from_ms(r.received_at_ms),
        );
    }
    page("Received Messages", &body, CLEAR_SCRIPT)
}
