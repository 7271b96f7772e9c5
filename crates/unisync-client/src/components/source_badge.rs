use unisync_shared::models::SourceKind;

/// Label, icon and color token of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceBadge {
    pub kind: SourceKind,
    pub label: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

impl SourceBadge {
    pub fn for_kind(kind: SourceKind) -> Self {
        let (label, icon, color) = match kind {
            SourceKind::Canvas => ("Canvas", "book-open", "source-canvas"),
            SourceKind::Calendar => ("Calendar", "calendar", "source-calendar"),
            SourceKind::Email => ("Email", "mail", "source-email"),
            SourceKind::Events => ("Campus Events", "graduation-cap", "source-events"),
        };
        Self {
            kind,
            label,
            icon,
            color,
        }
    }
}

impl std::fmt::Display for SourceBadge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.label)
    }
}
