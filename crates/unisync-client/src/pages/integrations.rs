use std::fmt::Write as _;

use chrono::{DateTime, Duration, Utc};

use unisync_shared::models::{Integration, IntegrationStatus};

use crate::format::relative_time;

pub const FOOTER: &str =
    "UniSync only accesses data you explicitly allow. Your credentials are never stored.";

pub fn status_label(status: IntegrationStatus) -> &'static str {
    match status {
        IntegrationStatus::Connected => "Connected",
        IntegrationStatus::Pending => "Pending",
        IntegrationStatus::NotConnected => "Not connected",
    }
}

/// Button offered on a card. A connected service only offers Sync once it
/// has synced at least once.
pub fn action(integration: &Integration) -> Option<&'static str> {
    match integration.status {
        IntegrationStatus::Connected if integration.last_sync.is_some() => Some("Sync"),
        IntegrationStatus::Connected => None,
        IntegrationStatus::Pending => Some("Complete Setup"),
        IntegrationStatus::NotConnected => Some("Connect"),
    }
}

pub fn summary(integrations: &[Integration]) -> String {
    let connected = integrations
        .iter()
        .filter(|i| i.status == IntegrationStatus::Connected)
        .count();
    format!("{connected} of {} services connected", integrations.len())
}

fn integration(
    id: &str,
    name: &str,
    icon: &str,
    status: IntegrationStatus,
    last_sync: Option<DateTime<Utc>>,
    permissions: &[&str],
) -> Integration {
    Integration {
        id: id.to_string(),
        name: name.to_string(),
        icon: icon.to_string(),
        status,
        last_sync,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
    }
}

pub fn mock_integrations(now: DateTime<Utc>) -> Vec<Integration> {
    let ago = |m| Some(now - Duration::minutes(m));
    vec![
        integration(
            "canvas",
            "Canvas LMS",
            "📘",
            IntegrationStatus::Connected,
            ago(5),
            &[
                "View assignments and deadlines",
                "Read course announcements",
                "Access grades",
            ],
        ),
        integration(
            "outlook",
            "Outlook Calendar",
            "📅",
            IntegrationStatus::Connected,
            ago(2),
            &["View calendar events", "Read meeting invitations"],
        ),
        integration(
            "email",
            "University Email",
            "📧",
            IntegrationStatus::Connected,
            ago(10),
            &[
                "Read email subjects and summaries",
                "Detect important notifications",
            ],
        ),
        integration(
            "corq",
            "Corq Events",
            "🎓",
            IntegrationStatus::Pending,
            None,
            &["View campus events", "Access event details and locations"],
        ),
        integration(
            "library",
            "Library System",
            "📚",
            IntegrationStatus::NotConnected,
            None,
            &["View due dates", "Check book availability"],
        ),
    ]
}

pub fn render(integrations: &[Integration], now: DateTime<Utc>) -> String {
    let mut out = format!("Integrations\n{}\n", summary(integrations));
    for item in integrations {
        let _ = write!(
            out,
            "\n{} {}  [{}]",
            item.icon,
            item.name,
            status_label(item.status)
        );
        if let Some(action) = action(item) {
            let _ = write!(out, "  <{action}>");
        }
        out.push('\n');
        if let Some(at) = item.last_sync {
            let _ = writeln!(out, "  Last synced {}", relative_time(at, now));
        }
        let _ = writeln!(out, "  Permissions");
        for perm in &item.permissions {
            let _ = writeln!(out, "    - {perm}");
        }
    }
    let _ = writeln!(out, "\n{FOOTER}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_connected() {
        assert_eq!(
            summary(&mock_integrations(Utc::now())),
            "3 of 5 services connected"
        );
        assert_eq!(summary(&[]), "0 of 0 services connected");
    }

    #[test]
    fn test_actions_by_status() {
        let list = mock_integrations(Utc::now());
        let actions: Vec<_> = list.iter().map(action).collect();
        assert_eq!(
            actions,
            vec![
                Some("Sync"),
                Some("Sync"),
                Some("Sync"),
                Some("Complete Setup"),
                Some("Connect")
            ]
        );

        let mut never_synced = list[0].clone();
        never_synced.last_sync = None;
        assert_eq!(action(&never_synced), None);
    }

    #[test]
    fn test_render_shows_labels_and_sync_time() {
        let now = Utc::now();
        let out = render(&mock_integrations(now), now);
        assert!(out.contains("[Not connected]"));
        assert!(out.contains("Last synced 2 minutes ago"));
        assert!(out.contains(FOOTER));
    }
}
