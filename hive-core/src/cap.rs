//! CAP 1.2 record rendering.
//!
//! The rendering is a pure function of the alert's fields plus the
//! configured sender, so a stored record can be re-derived and audited.
//! Only the record itself is produced here; delivery is out of scope.

use crate::constants::CAP_XMLNS;
use crate::types::Alert;

/// Render a CAP 1.2 `<alert>` document for a published alert.
///
/// `identifier` is the alert id, `sent` is the publication instant
/// (falling back to creation time for an unpublished alert, which only
/// happens in previews). Deterministic for a given alert state.
pub fn render_cap_xml(alert: &Alert, sender: &str) -> String {
    let sent = alert
        .published_at
        .unwrap_or(alert.created_at)
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    let mut out = String::with_capacity(640);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!("<alert xmlns=\"{CAP_XMLNS}\">\n"));
    element(&mut out, 1, "identifier", &alert.id.to_string());
    element(&mut out, 1, "sender", sender);
    element(&mut out, 1, "sent", &sent);
    element(&mut out, 1, "status", "Actual");
    element(&mut out, 1, "msgType", "Alert");
    element(&mut out, 1, "scope", "Public");
    out.push_str("  <info>\n");
    element(&mut out, 2, "category", "Safety");
    element(&mut out, 2, "event", &alert.event);
    element(&mut out, 2, "urgency", alert.urgency.as_str());
    element(&mut out, 2, "severity", alert.severity.as_str());
    element(&mut out, 2, "certainty", alert.certainty.as_str());
    element(&mut out, 2, "instruction", &alert.instruction);
    out.push_str("    <area>\n");
    element(&mut out, 3, "areaDesc", &alert.area);
    out.push_str("    </area>\n");
    out.push_str("  </info>\n");
    out.push_str("</alert>\n");
    out
}

fn element(out: &mut String, depth: usize, tag: &str, text: &str) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&escape_xml(text));
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
