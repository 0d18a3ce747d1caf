use super::{Attributes, Cookie, Session};
use crate::trace::{BaseRequest, FieldResult, WebRequest};
use http::HeaderMap;
use multimap::MultiMap;
use std::fmt;

// Snapshot of an inbound request
#[derive(Clone, Default)]
pub struct Request {
    pub remote_addr: Option<String>,
    pub remote_host: Option<String>,
    pub remote_port: u16,
    pub protocol: Option<String>,
    pub scheme: Option<String>,
    pub server_name: Option<String>,
    pub server_port: u16,
    pub secure: bool,
    pub character_encoding: Option<String>,
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    pub local_addr: Option<String>,
    pub local_port: u16,
    pub parameters: MultiMap<String, String>,
    pub attributes: Attributes,
    // Present for requests that came in over HTTP
    pub http: Option<HttpDetails>,
}

#[derive(Clone, Debug, Default)]
pub struct HttpDetails {
    pub request_uri: Option<String>,
    pub query_string: Option<String>,
    pub method: Option<String>,
    pub requested_session_id: Option<String>,
    pub requested_session_id_valid: bool,
    pub requested_session_id_from_cookie: bool,
    pub requested_session_id_from_url: bool,
    pub session: Option<Session>,
    // None when the client sent no cookie header
    pub cookies: Option<Vec<Cookie>>,
    pub headers: HeaderMap,
    pub request_url: Option<String>,
    pub remote_user: Option<String>,
    pub auth_type: Option<String>,
    pub context_path: Option<String>,
    pub servlet_path: Option<String>,
    pub path_info: Option<String>,
    pub path_translated: Option<String>,
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let http = self.http.as_ref();
        f.debug_struct("Request")
            .field("remote_addr", &self.remote_addr)
            .field("method", &http.and_then(|http| http.method.as_ref()))
            .field("request_url", &http.and_then(|http| http.request_url.as_ref()))
            .finish_non_exhaustive()
    }
}

impl BaseRequest for Request {
    fn remote_addr(&self) -> Option<String> {
        self.remote_addr.clone()
    }

    fn remote_host(&self) -> Option<String> {
        self.remote_host.clone()
    }

    fn remote_port(&self) -> u16 {
        self.remote_port
    }

    fn protocol(&self) -> Option<String> {
        self.protocol.clone()
    }

    fn scheme(&self) -> Option<String> {
        self.scheme.clone()
    }

    fn server_name(&self) -> Option<String> {
        self.server_name.clone()
    }

    fn server_port(&self) -> u16 {
        self.server_port
    }

    fn is_secure(&self) -> bool {
        self.secure
    }

    fn character_encoding(&self) -> Option<String> {
        self.character_encoding.clone()
    }

    fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    fn content_type(&self) -> Option<String> {
        self.content_type.clone()
    }

    fn local_addr(&self) -> Option<String> {
        self.local_addr.clone()
    }

    fn local_port(&self) -> u16 {
        self.local_port
    }

    fn parameters(&self) -> FieldResult<Vec<(String, Vec<String>)>> {
        Ok(self
            .parameters
            .iter_all()
            .map(|(name, values)| (name.clone(), values.clone()))
            .collect())
    }

    fn attributes(&self) -> FieldResult<Vec<(String, String)>> {
        Ok(self
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect())
    }

    fn as_web(&self) -> Option<&dyn WebRequest> {
        self.http.as_ref().map(|http| http as &dyn WebRequest)
    }
}

impl WebRequest for HttpDetails {
    fn request_uri(&self) -> Option<String> {
        self.request_uri.clone()
    }

    fn query_string(&self) -> Option<String> {
        self.query_string.clone()
    }

    fn method(&self) -> Option<String> {
        self.method.clone()
    }

    fn requested_session_id(&self) -> Option<String> {
        self.requested_session_id.clone()
    }

    fn is_requested_session_id_valid(&self) -> bool {
        self.requested_session_id_valid
    }

    fn is_requested_session_id_from_cookie(&self) -> bool {
        self.requested_session_id_from_cookie
    }

    fn is_requested_session_id_from_url(&self) -> bool {
        self.requested_session_id_from_url
    }

    fn session(&self) -> FieldResult<Option<&Session>> {
        Ok(self.session.as_ref())
    }

    fn cookies(&self) -> FieldResult<Option<&[Cookie]>> {
        Ok(self.cookies.as_deref())
    }

    fn header_names(&self) -> FieldResult<Vec<String>> {
        Ok(self
            .headers
            .keys()
            .map(|name| name.as_str().to_string())
            .collect())
    }

    // Header values might not be valid utf-8, so they are decoded lossily
    fn headers(&self, name: &str) -> FieldResult<Vec<String>> {
        Ok(self
            .headers
            .get_all(name)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect())
    }

    fn request_url(&self) -> Option<String> {
        self.request_url.clone()
    }

    fn remote_user(&self) -> Option<String> {
        self.remote_user.clone()
    }

    fn auth_type(&self) -> Option<String> {
        self.auth_type.clone()
    }

    fn context_path(&self) -> Option<String> {
        self.context_path.clone()
    }

    fn servlet_path(&self) -> Option<String> {
        self.servlet_path.clone()
    }

    fn path_info(&self) -> Option<String> {
        self.path_info.clone()
    }

    fn path_translated(&self) -> Option<String> {
        self.path_translated.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_capability() {
        let mut request = Request::default();
        assert!(request.as_web().is_none());

        request.http = Some(HttpDetails::default());
        let web = request.as_web().unwrap();
        assert_eq!(web.cookies().unwrap(), None);
        assert!(web.session().unwrap().is_none());
    }

    #[test]
    fn test_header_values_in_order() {
        let mut details = HttpDetails::default();
        details
            .headers
            .append("x-forwarded-for", "10.0.0.1".parse().unwrap());
        details
            .headers
            .append("x-forwarded-for", "10.0.0.2".parse().unwrap());
        details.headers.append(
            "x-raw",
            http::HeaderValue::from_bytes(b"caf\xe9").unwrap(),
        );

        assert_eq!(
            details.header_names().unwrap(),
            vec!["x-forwarded-for", "x-raw"]
        );
        assert_eq!(
            details.headers("x-forwarded-for").unwrap(),
            vec!["10.0.0.1", "10.0.0.2"]
        );
        assert_eq!(details.headers("x-raw").unwrap(), vec!["caf\u{fffd}"]);
        assert!(details.headers("x-missing").unwrap().is_empty());
    }

    #[test]
    fn test_multi_valued_parameters() {
        let mut request = Request::default();
        request.parameters.insert(String::from("tag"), String::from("a"));
        request.parameters.insert(String::from("tag"), String::from("b"));

        let parameters = request.parameters().unwrap();
        assert_eq!(
            parameters,
            vec![(
                String::from("tag"),
                vec![String::from("a"), String::from("b")]
            )]
        );
    }
}
