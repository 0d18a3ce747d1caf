// Cookie as presented by the client
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub comment: Option<String>,
    pub domain: Option<String>,
    /// Seconds
    pub max_age: Option<i64>,
    pub path: Option<String>,
    pub secure: bool,
    pub value: String,
    pub http_only: bool,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Cookie {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }
}

impl From<&cookie::Cookie<'_>> for Cookie {
    fn from(cookie: &cookie::Cookie<'_>) -> Self {
        Cookie {
            name: cookie.name().to_string(),
            comment: None,
            domain: cookie.domain().map(String::from),
            max_age: cookie.max_age().map(|age| age.whole_seconds()),
            path: cookie.path().map(String::from),
            secure: cookie.secure().unwrap_or(false),
            value: cookie.value().to_string(),
            http_only: cookie.http_only().unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parsed_cookie() {
        let parsed =
            cookie::Cookie::parse("id=a3fWa; Domain=example.com; Path=/; Max-Age=60; Secure; HttpOnly")
                .unwrap();
        let cookie = Cookie::from(&parsed);
        assert_eq!(cookie.name, "id");
        assert_eq!(cookie.value, "a3fWa");
        assert_eq!(cookie.domain.as_deref(), Some("example.com"));
        assert_eq!(cookie.path.as_deref(), Some("/"));
        assert_eq!(cookie.max_age, Some(60));
        assert!(cookie.secure);
        assert!(cookie.http_only);
        assert_eq!(cookie.comment, None);
    }
}
