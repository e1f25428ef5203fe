//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `LoanClient` builds `HttpRequest`
//! values and parses `HttpResponse` values without touching the network;
//! a `Transport` performs the actual round trip. Tests swap the transport
//! for one that records requests and replays canned responses.

use std::fmt;

pub const CONTENT_TYPE_JSON: (&str, &str) = ("content-type", "application/json");

/// HTTP method for a request. Every backend endpoint takes a JSON body
/// over POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `path` is the absolute URL, base included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    #[test]
    fn every_2xx_is_success() {
        assert!(response(200).is_success());
        assert!(response(201).is_success());
        assert!(response(299).is_success());
    }

    #[test]
    fn non_2xx_is_not_success() {
        assert!(!response(199).is_success());
        assert!(!response(304).is_success());
        assert!(!response(400).is_success());
        assert!(!response(500).is_success());
    }

    #[test]
    fn method_displays_uppercase() {
        assert_eq!(HttpMethod::Post.to_string(), "POST");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
    }
}
