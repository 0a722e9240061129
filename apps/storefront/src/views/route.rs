//! Client-side paths.

use storefront_core::ListingQuery;

use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    SignIn,
    SignUp,
    ForgotPassword,
    Search(ListingQuery),
    Product(String),
    Admin,
    Profile,
    NotFound(String),
}

impl Route {
    /// Parses a path with an optional query string.
    ///
    /// ```rust
    /// use storefront_lib::views::Route;
    ///
    /// assert_eq!(Route::parse("/product/abc"), Route::Product("abc".to_string()));
    /// assert!(matches!(Route::parse("/nowhere"), Route::NotFound(_)));
    /// ```
    pub fn parse(input: &str) -> Self {
        let (path, query) = input.split_once('?').unwrap_or((input, ""));
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        match path {
            "/" => Route::Home,
            "/signin" => Route::SignIn,
            "/signup" => Route::SignUp,
            "/forgot-password" => Route::ForgotPassword,
            "/search" => Route::Search(ListingQuery::parse(query)),
            "/admin" => Route::Admin,
            "/profile" => Route::Profile,
            other => match other.strip_prefix("/product/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Route::Product(id.to_string()),
                _ => Route::NotFound(other.to_string()),
            },
        }
    }

    /// Applies access rules: the admin page is invisible to non-admins and
    /// the profile page sends signed-out visitors to sign in.
    pub fn guard(self, state: &AppState) -> Self {
        match self {
            Route::Admin if !state.user.is_admin() => Route::NotFound("/admin".to_string()),
            Route::Profile if state.user.current.is_none() => Route::SignIn,
            route => route,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Action;
    use chrono::Utc;
    use storefront_core::{Role, User};

    #[test]
    fn test_parse_known_paths() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/signin/"), Route::SignIn);
        assert_eq!(Route::parse("/forgot-password"), Route::ForgotPassword);
        assert_eq!(Route::parse("/profile"), Route::Profile);
    }

    #[test]
    fn test_parse_search_query() {
        let Route::Search(query) = Route::parse("/search?q=shirt&sort=low-to-high") else {
            panic!("expected search route");
        };
        assert_eq!(query.q.as_deref(), Some("shirt"));
        assert_eq!(query.sort.as_deref(), Some("low-to-high"));
    }

    #[test]
    fn test_parse_unknown_paths() {
        assert!(matches!(Route::parse("/product/"), Route::NotFound(_)));
        assert!(matches!(Route::parse("/product/a/b"), Route::NotFound(_)));
        assert!(matches!(Route::parse("/cart"), Route::NotFound(_)));
    }

    #[test]
    fn test_admin_guard() {
        let mut state = AppState::default();
        assert!(matches!(Route::Admin.guard(&state), Route::NotFound(_)));
        assert_eq!(Route::Profile.guard(&state), Route::SignIn);

        let mut admin = User::new("u1", "a@example.com", None, None, Utc::now());
        admin.role = Role::Admin;
        state.apply(Action::SetUser(Some(admin)));
        assert_eq!(Route::Admin.guard(&state), Route::Admin);
        assert_eq!(Route::Profile.guard(&state), Route::Profile);
    }
}
