//! Route table for the sync API.

use std::fmt;

/// Path prefix shared by every API endpoint.
pub const API_PREFIX: &str = "/api";

/// HTTP methods used by the sync API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Returns the method token as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five protocol endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Poll both resources for changes.
    State,
    /// Replace the shared text.
    Text,
    /// Upload one file as `multipart/form-data`.
    Upload,
    /// Download a file by logical name.
    Download,
    /// Delete a file by logical name.
    Delete,
}

impl Endpoint {
    /// All endpoints, in routing order.
    pub const ALL: [Endpoint; 5] = [
        Endpoint::State,
        Endpoint::Text,
        Endpoint::Upload,
        Endpoint::Download,
        Endpoint::Delete,
    ];

    /// The only method accepted on this endpoint.
    pub fn method(self) -> Method {
        match self {
            Endpoint::State | Endpoint::Download => Method::Get,
            Endpoint::Text | Endpoint::Upload => Method::Post,
            Endpoint::Delete => Method::Delete,
        }
    }

    /// Route pattern, with `{name}` standing for the logical file name.
    pub fn route(self) -> &'static str {
        match self {
            Endpoint::State => "/api/state",
            Endpoint::Text => "/api/text",
            Endpoint::Upload => "/api/files/upload",
            Endpoint::Download => "/api/files/download/{name}",
            Endpoint::Delete => "/api/files/delete/{name}",
        }
    }

    /// Returns true if the route carries a file name.
    pub fn takes_name(self) -> bool {
        matches!(self, Endpoint::Download | Endpoint::Delete)
    }

    /// Builds a request path, percent-encoding `name` into the last segment.
    ///
    /// `name` is ignored for endpoints without a name segment.
    pub fn path_for(self, name: &str) -> String {
        let route = self.route();
        match route.strip_suffix("{name}") {
            Some(prefix) => format!("{prefix}{}", urlencoding::encode(name)),
            None => route.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_under_prefix() {
        for endpoint in Endpoint::ALL {
            assert!(endpoint.route().starts_with(API_PREFIX));
            assert_eq!(endpoint.takes_name(), endpoint.route().ends_with("{name}"));
        }
    }

    #[test]
    fn methods() {
        assert_eq!(Endpoint::State.method(), Method::Get);
        assert_eq!(Endpoint::Text.method(), Method::Post);
        assert_eq!(Endpoint::Delete.method().to_string(), "DELETE");
    }

    #[test]
    fn path_for_encodes_name() {
        assert_eq!(
            Endpoint::Download.path_for("a b.txt"),
            "/api/files/download/a%20b.txt"
        );
        assert_eq!(
            Endpoint::Delete.path_for("../x"),
            "/api/files/delete/..%2Fx"
        );
        assert_eq!(Endpoint::State.path_for("ignored"), "/api/state");
    }
}
