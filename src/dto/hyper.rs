use super::{Attributes, Cookie, HttpDetails, Request, Session};
use base64::{engine::general_purpose::STANDARD, Engine};
use http::header;
use log::debug;
use multimap::MultiMap;
use std::net::SocketAddr;
use url_encoded_data::UrlEncodedData;

/// Name of the cookie (or query parameter) carrying the session id.
pub const SESSION_ID_NAME: &str = "session_id";

const HTTP_PORT: u16 = 80;
const HTTPS_PORT: u16 = 443;

// Transport level facts the http request itself does not carry
#[derive(Clone, Copy, Debug)]
pub struct ConnectionInfo {
    pub remote: SocketAddr,
    pub local: SocketAddr,
    pub secure: bool,
}

impl Request {
    /// Snapshot an `http::Request`. A `Session` or `Attributes` found in the
    /// request extensions is picked up as well.
    pub fn from_http<B>(req: &http::Request<B>, conn: &ConnectionInfo) -> Self {
        let headers = req.headers();

        let scheme = req
            .uri()
            .scheme_str()
            .map(String::from)
            .unwrap_or_else(|| String::from(if conn.secure { "https" } else { "http" }));
        let default_port = if scheme == "https" {
            HTTPS_PORT
        } else {
            HTTP_PORT
        };
        let (server_name, server_port) = extract_host(req)
            .and_then(|host| parse_host_header(&host, default_port).ok())
            .unwrap_or_else(|| (conn.local.ip().to_string(), conn.local.port()));

        let content_type = header_str(headers, header::CONTENT_TYPE);
        let character_encoding = content_type
            .as_deref()
            .and_then(|content_type| content_type.parse::<mime::Mime>().ok())
            .and_then(|parsed| parsed.get_param(mime::CHARSET).map(|charset| charset.to_string()));
        let content_length =
            header_str(headers, header::CONTENT_LENGTH).and_then(|length| length.parse().ok());

        let parameters: MultiMap<String, String> = req
            .uri()
            .query()
            .map(|query| {
                UrlEncodedData::from(query)
                    .as_string_pairs()
                    .iter()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let cookies = parse_cookies(headers);
        let session = req.extensions().get::<Session>().cloned();

        let cookie_session_id = cookies.as_ref().and_then(|cookies| {
            cookies
                .iter()
                .find(|cookie| cookie.name == SESSION_ID_NAME)
                .map(|cookie| cookie.value.clone())
        });
        let url_session_id = parameters.get(SESSION_ID_NAME).cloned();
        let requested_session_id_from_cookie = cookie_session_id.is_some();
        let requested_session_id_from_url =
            !requested_session_id_from_cookie && url_session_id.is_some();
        let requested_session_id = cookie_session_id.or(url_session_id);
        let requested_session_id_valid = match (&session, &requested_session_id) {
            (Some(session), Some(id)) => session.id == *id,
            _ => false,
        };

        let (auth_type, remote_user) = parse_authorization(headers);

        let path = req.uri().path().to_string();
        let port_suffix = if server_port == default_port {
            String::new()
        } else {
            format!(":{}", server_port)
        };
        let request_url = format!("{}://{}{}{}", scheme, server_name, port_suffix, path);

        let http = HttpDetails {
            request_uri: Some(path.clone()),
            query_string: req.uri().query().map(String::from),
            method: Some(req.method().to_string()),
            requested_session_id,
            requested_session_id_valid,
            requested_session_id_from_cookie,
            requested_session_id_from_url,
            session,
            cookies,
            headers: headers.clone(),
            request_url: Some(request_url),
            remote_user,
            auth_type,
            context_path: Some(String::new()),
            servlet_path: Some(path),
            path_info: None,
            path_translated: None,
        };

        let remote_ip = conn.remote.ip().to_string();
        Request {
            remote_addr: Some(remote_ip.clone()),
            remote_host: Some(remote_ip),
            remote_port: conn.remote.port(),
            protocol: Some(format!("{:?}", req.version())),
            secure: scheme == "https",
            scheme: Some(scheme),
            server_name: Some(server_name),
            server_port,
            character_encoding,
            content_length,
            content_type,
            local_addr: Some(conn.local.ip().to_string()),
            local_port: conn.local.port(),
            parameters,
            attributes: req
                .extensions()
                .get::<Attributes>()
                .cloned()
                .unwrap_or_default(),
            http: Some(http),
        }
    }
}

fn header_str(headers: &http::HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(String::from)
}

// None when there is no cookie header at all
fn parse_cookies(headers: &http::HeaderMap) -> Option<Vec<Cookie>> {
    if !headers.contains_key(header::COOKIE) {
        return None;
    }
    let mut cookies = Vec::new();
    for value in headers.get_all(header::COOKIE) {
        let value = match value.to_str() {
            Ok(value) => value,
            Err(_) => {
                debug!("Skipping cookie header that is not valid utf-8");
                continue;
            }
        };
        for parsed in cookie::Cookie::split_parse(value) {
            match parsed {
                Ok(parsed) => cookies.push(Cookie::from(&parsed)),
                Err(e) => debug!("Skipping malformed cookie: {}", e),
            }
        }
    }
    Some(cookies)
}

// Auth scheme and, for basic auth, the user name
fn parse_authorization(headers: &http::HeaderMap) -> (Option<String>, Option<String>) {
    let value = match header_str(headers, header::AUTHORIZATION) {
        Some(value) => value,
        None => return (None, None),
    };
    let (scheme, credentials) = match value.split_once(' ') {
        Some((scheme, credentials)) => (scheme, credentials.trim()),
        None => (value.as_str(), ""),
    };
    let user = if scheme.eq_ignore_ascii_case("basic") {
        STANDARD
            .decode(credentials)
            .ok()
            .and_then(|decoded| String::from_utf8(decoded).ok())
            .and_then(|decoded| decoded.split_once(':').map(|(user, _)| user.to_string()))
    } else {
        None
    };
    (Some(scheme.to_string()), user)
}

// Get host from request
fn extract_host<T>(req: &http::Request<T>) -> Option<String> {
    if let Some(addr) = req.headers().get(header::HOST) {
        if let Ok(addr) = addr.to_str() {
            return Some(String::from(addr));
        }
    }

    req.uri().authority().map(|authority| {
        let authority = authority.as_str();
        // drop userinfo
        match authority.rfind('@') {
            Some(idx) => String::from(&authority[(idx + 1)..]),
            None => String::from(authority),
        }
    })
}

// Parse host header
fn parse_host_header(host: &str, fallback_port: u16) -> Result<(String, u16), String> {
    if host.is_empty() {
        return Err(String::from("empty host"));
    }
    match host.rfind(':') {
        // a colon inside brackets belongs to an ipv6 literal
        Some(idx) if !host[idx..].contains(']') => {
            if idx == host.len() - 1 {
                return Err(String::from("unexpected eol while parsing port"));
            }
            if let Ok(port) = host[(idx + 1)..].parse::<u16>() {
                return Ok((String::from(&host[..idx]), port));
            }
            Err(String::from("invalid host"))
        }
        _ => Ok((String::from(host), fallback_port)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::BaseRequest;

    fn conn(secure: bool) -> ConnectionInfo {
        ConnectionInfo {
            remote: "192.168.1.10:50000".parse().unwrap(),
            local: "192.168.1.1:8080".parse().unwrap(),
            secure,
        }
    }

    #[test]
    fn test_parse_host_header() {
        let positive_tests: Vec<(&str, (&str, u16))> = vec![
            ("example.com", ("example.com", 80)),
            ("example.com:8080", ("example.com", 8080)),
            ("[::1]", ("[::1]", 80)),
            ("[::1]:3000", ("[::1]", 3000)),
        ];
        for (host, (name, port)) in positive_tests {
            let result = parse_host_header(host, 80).unwrap();
            assert_eq!(result, (String::from(name), port));
        }

        let negative_tests = vec!["", "example.com:", "example.com:http", "example.com:70000"];
        for host in negative_tests {
            assert!(parse_host_header(host, 80).is_err(), "{}", host);
        }
    }

    #[test]
    fn test_from_http_base_fields() {
        let req = http::Request::builder()
            .method("POST")
            .uri("/submit?tag=a&tag=b&single=1")
            .header(header::HOST, "example.com:8080")
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .header(header::CONTENT_LENGTH, "12")
            .body(())
            .unwrap();

        let request = Request::from_http(&req, &conn(false));

        assert_eq!(request.remote_addr().as_deref(), Some("192.168.1.10"));
        assert_eq!(request.remote_port(), 50000);
        assert_eq!(request.protocol().as_deref(), Some("HTTP/1.1"));
        assert_eq!(request.scheme().as_deref(), Some("http"));
        assert_eq!(request.server_name().as_deref(), Some("example.com"));
        assert_eq!(request.server_port(), 8080);
        assert!(!request.is_secure());
        assert_eq!(request.character_encoding().as_deref(), Some("utf-8"));
        assert_eq!(request.content_length(), Some(12));
        assert_eq!(request.local_addr().as_deref(), Some("192.168.1.1"));
        assert_eq!(request.local_port(), 8080);
        assert_eq!(
            request.parameters.get_vec("tag"),
            Some(&vec![String::from("a"), String::from("b")])
        );
        assert_eq!(request.parameters.get("single").map(String::as_str), Some("1"));
        assert!(request.attributes.is_empty());

        let web = request.as_web().unwrap();
        assert_eq!(web.method().as_deref(), Some("POST"));
        assert_eq!(web.request_uri().as_deref(), Some("/submit"));
        assert_eq!(web.query_string().as_deref(), Some("tag=a&tag=b&single=1"));
        assert_eq!(
            web.request_url().as_deref(),
            Some("http://example.com:8080/submit")
        );
        assert_eq!(web.cookies().unwrap(), None);
        assert_eq!(web.auth_type(), None);
    }

    #[test]
    fn test_from_http_falls_back_to_local_address() {
        let req = http::Request::builder().uri("/").body(()).unwrap();
        let request = Request::from_http(&req, &conn(true));

        assert_eq!(request.scheme().as_deref(), Some("https"));
        assert!(request.is_secure());
        assert_eq!(request.server_name().as_deref(), Some("192.168.1.1"));
        assert_eq!(request.server_port(), 8080);
        assert_eq!(request.content_length(), None);
        assert_eq!(request.character_encoding(), None);
    }

    #[test]
    fn test_from_http_cookies_and_session() {
        let mut session = Session::new("s-42", 0);
        session.is_new = false;
        let mut attributes = Attributes::new();
        attributes.insert("route", "submit");

        let req = http::Request::builder()
            .uri("/cart")
            .header(header::HOST, "shop.example.com")
            .header(header::COOKIE, "session_id=s-42; theme=dark")
            .extension(session)
            .extension(attributes)
            .body(())
            .unwrap();

        let request = Request::from_http(&req, &conn(false));
        assert_eq!(request.attributes.get("route"), Some("submit"));

        let web = request.as_web().unwrap();
        let cookies = web.cookies().unwrap().unwrap();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0], Cookie::new("session_id", "s-42"));
        assert_eq!(cookies[1], Cookie::new("theme", "dark"));

        assert_eq!(web.requested_session_id().as_deref(), Some("s-42"));
        assert!(web.is_requested_session_id_from_cookie());
        assert!(!web.is_requested_session_id_from_url());
        assert!(web.is_requested_session_id_valid());
        assert_eq!(web.session().unwrap().map(|s| s.id.as_str()), Some("s-42"));
    }

    #[test]
    fn test_from_http_session_id_from_url() {
        let req = http::Request::builder()
            .uri("/cart?session_id=stale")
            .header(header::COOKIE, "")
            .body(())
            .unwrap();

        let request = Request::from_http(&req, &conn(false));
        let web = request.as_web().unwrap();

        assert_eq!(web.cookies().unwrap().map(|cookies| cookies.len()), Some(0));
        assert_eq!(web.requested_session_id().as_deref(), Some("stale"));
        assert!(web.is_requested_session_id_from_url());
        assert!(!web.is_requested_session_id_from_cookie());
        assert!(!web.is_requested_session_id_valid());
    }

    #[test]
    fn test_parse_authorization() {
        let tests: Vec<(Option<&str>, (Option<&str>, Option<&str>))> = vec![
            (None, (None, None)),
            // "alice:secret"
            (Some("Basic YWxpY2U6c2VjcmV0"), (Some("Basic"), Some("alice"))),
            (Some("Bearer abc.def"), (Some("Bearer"), None)),
            (Some("Basic !!!"), (Some("Basic"), None)),
            (Some("Negotiate"), (Some("Negotiate"), None)),
        ];
        for (value, (auth_type, user)) in tests {
            let mut headers = http::HeaderMap::new();
            if let Some(value) = value {
                headers.insert(header::AUTHORIZATION, value.parse().unwrap());
            }
            let (parsed_type, parsed_user) = parse_authorization(&headers);
            assert_eq!(parsed_type.as_deref(), auth_type);
            assert_eq!(parsed_user.as_deref(), user);
        }
    }
}
