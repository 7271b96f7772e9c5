use std::fmt::Write as _;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use unisync_shared::models::{SourceKind, TimelineItem, TimelineKind};

use crate::components::SourceBadge;

pub const EMPTY_MESSAGE: &str = "Your schedule is clear for now.";

pub fn kind_label(kind: TimelineKind) -> &'static str {
    match kind {
        TimelineKind::Class => "Class",
        TimelineKind::Deadline => "Due",
        TimelineKind::Meeting => "Meeting",
        TimelineKind::Event => "Event",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineGroup {
    pub title: &'static str,
    pub items: Vec<TimelineItem>,
}

/// Split items into Today / Tomorrow / This Week, dropping empty groups.
/// Everything that is neither today nor tomorrow lands in This Week.
pub fn group(items: &[TimelineItem], today: NaiveDate) -> Vec<TimelineGroup> {
    let tomorrow = today.succ_opt();
    let mut groups = [
        TimelineGroup {
            title: "Today",
            items: Vec::new(),
        },
        TimelineGroup {
            title: "Tomorrow",
            items: Vec::new(),
        },
        TimelineGroup {
            title: "This Week",
            items: Vec::new(),
        },
    ];
    for item in items {
        let day = item.date.date_naive();
        let slot = if day == today {
            0
        } else if Some(day) == tomorrow {
            1
        } else {
            2
        };
        groups[slot].items.push(item.clone());
    }
    groups.into_iter().filter(|g| !g.items.is_empty()).collect()
}

fn item(
    id: &str,
    kind: TimelineKind,
    title: &str,
    time: &str,
    date: DateTime<Utc>,
    source: SourceKind,
) -> TimelineItem {
    TimelineItem {
        id: id.to_string(),
        kind,
        title: title.to_string(),
        time: time.to_string(),
        date,
        source,
        course: None,
        location: None,
    }
}

/// Sample week used until a calendar backend exists.
pub fn mock_timeline(now: DateTime<Utc>) -> Vec<TimelineItem> {
    let day = |n| now + Duration::days(n);
    vec![
        TimelineItem {
            location: Some("Engineering Hall 204".into()),
            ..item(
                "1",
                TimelineKind::Class,
                "CS 301 - Algorithms",
                "9:00 AM - 10:30 AM",
                now,
                SourceKind::Calendar,
            )
        },
        TimelineItem {
            location: Some("Library Room 3B".into()),
            ..item(
                "2",
                TimelineKind::Meeting,
                "Study Group Session",
                "3:00 PM - 4:00 PM",
                now,
                SourceKind::Calendar,
            )
        },
        TimelineItem {
            course: Some("CS 301".into()),
            ..item(
                "3",
                TimelineKind::Deadline,
                "Algorithm Analysis Problem Set",
                "11:59 PM",
                day(1),
                SourceKind::Canvas,
            )
        },
        TimelineItem {
            location: Some("Science Building 110".into()),
            ..item(
                "4",
                TimelineKind::Class,
                "MATH 245 - Linear Algebra",
                "11:00 AM - 12:30 PM",
                day(1),
                SourceKind::Calendar,
            )
        },
        TimelineItem {
            location: Some("Student Center Ballroom".into()),
            ..item(
                "5",
                TimelineKind::Event,
                "Career Fair - Tech Companies",
                "1:00 PM - 5:00 PM",
                day(2),
                SourceKind::Events,
            )
        },
        TimelineItem {
            course: Some("MATH 245".into()),
            ..item(
                "6",
                TimelineKind::Deadline,
                "Linear Algebra Exercises",
                "11:59 PM",
                day(3),
                SourceKind::Canvas,
            )
        },
    ]
}

pub fn render(items: &[TimelineItem], today: NaiveDate) -> String {
    let mut out = String::from("Your Schedule\nUpcoming classes, deadlines, and events\n");
    if items.is_empty() {
        let _ = writeln!(out, "\n{EMPTY_MESSAGE}");
        return out;
    }
    for group in group(items, today) {
        let _ = writeln!(out, "\n{}", group.title);
        for item in &group.items {
            let _ = write!(
                out,
                "  {:<20} {:<8} {}",
                item.time,
                kind_label(item.kind),
                item.title
            );
            if let Some(course) = &item.course {
                let _ = write!(out, " ({course})");
            }
            let _ = writeln!(out, "  {}", SourceBadge::for_kind(item.source));
            if let Some(location) = &item.location {
                let _ = writeln!(out, "  {:<20} {:<8} @ {location}", "", "");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 29, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_mock_groups() {
        let now = noon();
        let groups = group(&mock_timeline(now), now.date_naive());
        let titles: Vec<_> = groups.iter().map(|g| g.title).collect();
        assert_eq!(titles, vec!["Today", "Tomorrow", "This Week"]);
        assert_eq!(groups[0].items.len(), 2);
        assert_eq!(groups[1].items.len(), 2);
        assert_eq!(groups[2].items.len(), 2);
    }

    #[test]
    fn test_empty_groups_omitted() {
        let now = noon();
        let only_later: Vec<_> = mock_timeline(now)
            .into_iter()
            .filter(|i| i.date.date_naive() > now.date_naive().succ_opt().unwrap())
            .collect();
        let groups = group(&only_later, now.date_naive());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].title, "This Week");
    }

    #[test]
    fn test_past_items_fall_into_this_week() {
        let now = noon();
        let past = vec![item(
            "x",
            TimelineKind::Event,
            "Old",
            "1:00 PM",
            now - Duration::days(2),
            SourceKind::Events,
        )];
        assert_eq!(group(&past, now.date_naive())[0].title, "This Week");
    }

    #[test]
    fn test_render_empty_and_labels() {
        let today = noon().date_naive();
        assert!(render(&[], today).contains(EMPTY_MESSAGE));
        let out = render(&mock_timeline(noon()), today);
        assert!(out.contains("Due"));
        assert!(out.contains("[Campus Events]"));
        assert!(out.contains("(CS 301)"));
        assert_eq!(kind_label(TimelineKind::Deadline), "Due");
    }
}
