use axum::http::{HeaderMap, header::COOKIE};
use rand::{Rng, distr::Alphanumeric};

/// Cookie carrying the session id, the key of the session's stored token
pub const SESSION_COOKIE: &str = "genrepie_session";
/// Cookie carrying the OAuth `state` nonce between `/login` and `/callback`
pub const STATE_COOKIE: &str = "genrepie_oauth_state";
const ID_LEN: usize = 32;
// seconds the user has to complete the Spotify consent page
const STATE_MAX_AGE: u32 = 600;

/// Fresh random identifier, used for session ids and OAuth state nonces alike.
pub fn new_session_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}

fn is_valid_id(id: &str) -> bool {
    id.len() == ID_LEN && id.chars().all(|c| c.is_ascii_alphanumeric())
}

fn cookie_value(headers: &HeaderMap, cookie: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie && is_valid_id(value))
        .map(|(_, value)| value.to_string())
}

/// Session id carried by the request's cookies, if any well-formed one is present.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, SESSION_COOKIE)
}

/// OAuth state issued by `/login` to this browser.
pub fn oauth_state(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, STATE_COOKIE)
}

/// `Set-Cookie` value for a session id.
pub fn session_cookie(session_id: &str) -> String {
    format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value for a state nonce; it expires on its own.
pub fn state_cookie(state: &str) -> String {
    format!("{STATE_COOKIE}={state}; Path=/callback; Max-Age={STATE_MAX_AGE}; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value dropping the state nonce once it has been used.
pub fn clear_state_cookie() -> String {
    format!("{STATE_COOKIE}=; Path=/callback; Max-Age=0; HttpOnly; SameSite=Lax")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn generated_ids_are_valid_and_distinct() {
        let a = new_session_id();
        let b = new_session_id();
        assert!(is_valid_id(&a));
        assert_ne!(a, b);
    }

    #[test]
    fn reads_session_among_other_cookies() {
        let id = new_session_id();
        let state = new_session_id();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!(
                "theme=dark; {SESSION_COOKIE}={id}; {STATE_COOKIE}={state}; lang=en"
            ))
            .unwrap(),
        );
        assert_eq!(session_id(&headers), Some(id));
        assert_eq!(oauth_state(&headers), Some(state));
    }

    #[test]
    fn ignores_malformed_session() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("genrepie_session=../../etc/passwd"),
        );
        assert_eq!(session_id(&headers), None);
        assert_eq!(session_id(&HeaderMap::new()), None);
    }

    #[test]
    fn cleared_state_cookie_expires_immediately() {
        assert!(clear_state_cookie().contains("Max-Age=0"));
        assert!(state_cookie("x").contains("Path=/callback"));
    }
}
