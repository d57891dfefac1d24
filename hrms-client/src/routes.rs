//! Route table
//!
//! Static description of the dashboard's pages: which are guest-only, which
//! need a session, and which roles may open them. Built once and read-only
//! afterwards.

use std::collections::HashMap;

use shared::{Role, RoleSet};

/// Who may open a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone, no session checks
    Public,
    /// Only visitors without a session (landing, login)
    Guest,
    /// Any logged-in user when `None`, otherwise members of the set
    Protected(Option<RoleSet>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A path pattern such as `/timesheets/:id`
#[derive(Debug, Clone)]
pub struct Route {
    pattern: String,
    segments: Vec<Segment>,
    access: Access,
}

impl Route {
    pub fn new(pattern: impl Into<String>, access: Access) -> Self {
        let pattern = pattern.into();
        let segments = split(&pattern)
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(s.to_string()),
            })
            .collect();
        Self {
            pattern,
            segments,
            access,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn access(&self) -> Access {
        self.access
    }

    /// Required roles, `None` when any logged-in user may enter
    pub fn allowed_roles(&self) -> Option<RoleSet> {
        match self.access {
            Access::Protected(roles) => roles,
            Access::Public | Access::Guest => None,
        }
    }

    fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let parts: Vec<&str> = split(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(params)
    }

    fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }
}

/// A resolved route and its path parameters
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: HashMap<String, String>,
}

impl RouteMatch<'_> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Sidebar entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub title: String,
    pub href: String,
    pub roles: Option<RoleSet>,
}

impl NavItem {
    /// Active on its own path and anything below it
    pub fn is_active(&self, path: &str) -> bool {
        path == self.href
            || path
                .strip_prefix(self.href.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }

    fn visible_to(&self, role: Role) -> bool {
        self.roles.is_none_or(|roles| roles.contains(role))
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    nav: Vec<NavItem>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, pattern: impl Into<String>, access: Access) -> Self {
        self.routes.push(Route::new(pattern, access));
        self
    }

    pub fn guest(self, pattern: impl Into<String>) -> Self {
        self.route(pattern, Access::Guest)
    }

    pub fn protected(self, pattern: impl Into<String>) -> Self {
        self.route(pattern, Access::Protected(None))
    }

    pub fn restricted(self, pattern: impl Into<String>, roles: impl Into<RoleSet>) -> Self {
        self.route(pattern, Access::Protected(Some(roles.into())))
    }

    pub fn nav_item(
        mut self,
        title: impl Into<String>,
        href: impl Into<String>,
        roles: Option<RoleSet>,
    ) -> Self {
        self.nav.push(NavItem {
            title: title.into(),
            href: href.into(),
            roles,
        });
        self
    }

    /// The HRMS dashboard's pages
    pub fn hrms() -> Self {
        let staff = RoleSet::from([Role::Manager, Role::Admin]);
        let admin = RoleSet::from(Role::Admin);

        Self::new()
            .guest("/")
            .guest("/login")
            .protected("/dashboard")
            .protected("/reset-password")
            .protected("/profile")
            .protected("/profile/contact")
            .protected("/profile/pay")
            .protected("/timesheets")
            .protected("/timesheets/history")
            .protected("/timesheets/:id")
            .protected("/payroll")
            .protected("/payroll/:id")
            .restricted("/manager/team", staff)
            .restricted("/manager/timesheets", staff)
            .restricted("/manager/statistics", staff)
            .restricted("/admin/employees", admin)
            .restricted("/admin/employees/create", admin)
            .restricted("/admin/employees/:id", admin)
            .restricted("/admin/payroll", admin)
            .restricted("/admin/payroll/history", admin)
            .nav_item("Dashboard", "/dashboard", None)
            .nav_item("My Profile", "/profile", None)
            .nav_item("Timesheets", "/timesheets", None)
            .nav_item("Payroll", "/payroll", None)
            .nav_item("Direct Reports", "/manager/team", Some(staff))
            .nav_item("Team Timesheets", "/manager/timesheets", Some(staff))
            .nav_item("Statistics", "/manager/statistics", Some(staff))
            .nav_item("Employees", "/admin/employees", Some(admin))
            .nav_item("Create Employee", "/admin/employees/create", Some(admin))
            .nav_item("Payroll Management", "/admin/payroll", Some(admin))
    }

    /// Resolve `path` (query string ignored); literal segments beat params
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let path = strip_query(path);
        self.routes
            .iter()
            .filter_map(|route| route.matches(path).map(|params| (route, params)))
            .max_by_key(|(route, _)| route.literal_count())
            .map(|(route, params)| RouteMatch { route, params })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Navigation entries visible to `role`
    pub fn navigation(&self, role: Role) -> Vec<&NavItem> {
        self.nav.iter().filter(|item| item.visible_to(role)).collect()
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

pub(crate) fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}
