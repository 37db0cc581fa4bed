use hyper::{HeaderMap, header::{ACCEPT, USER_AGENT, HeaderValue}};


pub const USER_AGENT_VALUE: &str = concat!("cookie-refresher/", env!("CARGO_PKG_VERSION"));

pub fn add_request_headers(headers: &mut HeaderMap) {
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
}
