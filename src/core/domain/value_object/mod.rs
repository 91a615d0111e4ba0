mod api_base_url;
mod session_cookie;

pub use api_base_url::{ApiBaseUrl, DEFAULT_API_BASE};
pub use session_cookie::SessionCookie;

pub(crate) use session_cookie::validate_session_cookie;
