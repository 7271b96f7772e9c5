#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Chat,
    Schedule,
    Integrations,
    Settings,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Home,
        Route::Chat,
        Route::Schedule,
        Route::Integrations,
        Route::Settings,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Chat => "/chat",
            Route::Schedule => "/schedule",
            Route::Integrations => "/integrations",
            Route::Settings => "/settings",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Chat => "Chat",
            Route::Schedule => "Schedule",
            Route::Integrations => "Integrations",
            Route::Settings => "Settings",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|r| r.path() == path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub route: Route,
    pub active: bool,
}

pub struct TopNav;

impl TopNav {
    /// Links shown in the bar. Home shows none.
    pub fn links(current: Route) -> Vec<NavLink> {
        if current == Route::Home {
            return Vec::new();
        }
        [Route::Chat, Route::Schedule, Route::Integrations]
            .into_iter()
            .map(|route| NavLink {
                route,
                active: route == current,
            })
            .collect()
    }

    /// Avatar initials from the display name.
    pub fn initials(user_name: &str) -> String {
        user_name
            .split_whitespace()
            .filter_map(|w| w.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }

    pub fn render(current: Route, user_name: &str) -> String {
        let links: Vec<String> = Self::links(current)
            .into_iter()
            .map(|link| {
                if link.active {
                    format!("[{}]", link.route.label())
                } else {
                    link.route.label().to_string()
                }
            })
            .collect();
        format!(
            "UniSync  {}  ({})",
            links.join("  "),
            Self::initials(user_name)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_hides_links() {
        assert!(TopNav::links(Route::Home).is_empty());
    }

    #[test]
    fn test_active_link() {
        let links = TopNav::links(Route::Schedule);
        assert_eq!(links.len(), 3);
        assert!(links.iter().any(|l| l.route == Route::Schedule && l.active));
        assert_eq!(links.iter().filter(|l| l.active).count(), 1);
    }

    #[test]
    fn test_settings_has_no_active_link() {
        assert!(TopNav::links(Route::Settings).iter().all(|l| !l.active));
    }

    #[test]
    fn test_routes_round_trip_paths() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("/nope"), None);
    }

    #[test]
    fn test_initials() {
        assert_eq!(TopNav::initials("Jordan"), "J");
        assert_eq!(TopNav::initials("jordan doe"), "JD");
    }
}
