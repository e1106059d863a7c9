//! Classification of the current location into a route intent.

/// What the current path asks the session controller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteIntent {
    /// `/callback/:type/:id`: a federation provider is returning the user.
    Callback { method: String, id: String },
    /// `/login/:type/:id`: the user picked a federation provider.
    LoginRedirect { method: String, id: String },
    /// Anything else.
    Normal,
}

impl RouteIntent {
    /// Classifies a path. Query string and fragment are ignored, as is a
    /// single trailing slash. Segments are taken verbatim; validating them is
    /// left to the federation handlers.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let path = path.strip_suffix('/').unwrap_or(path);
        let mut segments = path.strip_prefix('/').unwrap_or(path).split('/');

        let (Some(head), Some(method), Some(id), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Self::Normal;
        };
        if method.is_empty() || id.is_empty() {
            return Self::Normal;
        }

        let method = method.to_string();
        let id = id.to_string();
        match head {
            "callback" => Self::Callback { method, id },
            "login" => Self::LoginRedirect { method, id },
            _ => Self::Normal,
        }
    }

    /// Returns true for either federation route.
    #[must_use]
    pub fn is_federation(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}
