use std::fmt;

use super::error::FieldResult;
use crate::dto::{Cookie, Session};

/// Read-only view of an inbound request, as seen by the trace formatter.
///
/// Enumerations are fallible so that a partially initialized request can
/// report the problem instead of producing a bogus trace.
pub trait BaseRequest: fmt::Debug {
    fn remote_addr(&self) -> Option<String>;
    fn remote_host(&self) -> Option<String>;
    fn remote_port(&self) -> u16;

    fn protocol(&self) -> Option<String>;
    fn scheme(&self) -> Option<String>;
    fn server_name(&self) -> Option<String>;
    fn server_port(&self) -> u16;
    fn is_secure(&self) -> bool;

    fn character_encoding(&self) -> Option<String>;
    fn content_length(&self) -> Option<u64>;
    fn content_type(&self) -> Option<String>;

    fn local_addr(&self) -> Option<String>;
    fn local_port(&self) -> u16;

    /// Parameter name with all of its values, in the order the underlying
    /// mapping yields them.
    fn parameters(&self) -> FieldResult<Vec<(String, Vec<String>)>>;

    /// Attribute name with its value already rendered as text.
    fn attributes(&self) -> FieldResult<Vec<(String, String)>>;

    /// Web specific part of the request, if this request carries one.
    fn as_web(&self) -> Option<&dyn WebRequest> {
        None
    }
}

/// Protocol specific fields of a web request.
pub trait WebRequest {
    fn request_uri(&self) -> Option<String>;
    fn query_string(&self) -> Option<String>;
    fn method(&self) -> Option<String>;

    fn requested_session_id(&self) -> Option<String>;
    fn is_requested_session_id_valid(&self) -> bool;
    fn is_requested_session_id_from_cookie(&self) -> bool;
    fn is_requested_session_id_from_url(&self) -> bool;

    fn session(&self) -> FieldResult<Option<&Session>>;

    /// `None` when the request carries no cookie collection at all.
    fn cookies(&self) -> FieldResult<Option<&[Cookie]>>;

    fn header_names(&self) -> FieldResult<Vec<String>>;
    fn headers(&self, name: &str) -> FieldResult<Vec<String>>;

    fn request_url(&self) -> Option<String>;
    fn remote_user(&self) -> Option<String>;
    fn auth_type(&self) -> Option<String>;
    fn context_path(&self) -> Option<String>;
    fn servlet_path(&self) -> Option<String>;
    fn path_info(&self) -> Option<String>;
    fn path_translated(&self) -> Option<String>;
}
