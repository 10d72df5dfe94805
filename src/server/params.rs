use axum::extract::RawForm;
use axum::extract::rejection::RawFormRejection;
use axum::http::header::{AUTHORIZATION, PROXY_AUTHORIZATION};
use axum::http::{HeaderMap, HeaderName};
use percent_encoding::percent_decode;
use thiserror::Error;

/// Headers that carry a credential after the scheme
const SCHEMED_CREDENTIALS: [HeaderName; 2] = [AUTHORIZATION, PROXY_AUTHORIZATION];

/// Headers whose whole value is a credential
const OPAQUE_CREDENTIALS: [&str; 4] = [
    "cookie",
    "set-cookie",
    "x-forwarded-access-token",
    "x-auth-request-access-token",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("invalid URL escape {0:?}")]
    InvalidEscape(String),
    #[error("invalid semicolon separator in query")]
    Semicolon,
    #[error("{0}")]
    Body(String),
}

/// Parameters recognised in the query string or a form body
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestParams {
    pub namespace: Option<String>,
    pub token: Option<String>,
}

impl RequestParams {
    /// Combine body and query parameters.
    ///
    /// Body pairs come before query pairs and the first non-empty value of a
    /// key wins, so repeated keys are allowed. Any malformed escape fails the
    /// whole request.
    pub fn from_parts(
        query: Option<&str>,
        form: Result<RawForm, RawFormRejection>,
    ) -> Result<Self, ParamsError> {
        let mut pairs = match form {
            Ok(RawForm(bytes)) => parse_pairs(&String::from_utf8_lossy(&bytes))?,
            // Non-form bodies carry no parameters
            Err(RawFormRejection::InvalidFormContentType(_)) => Vec::new(),
            Err(e) => return Err(ParamsError::Body(e.body_text())),
        };
        pairs.extend(parse_pairs(query.unwrap_or_default())?);

        Ok(Self {
            namespace: first_value(&pairs, "namespace"),
            token: first_value(&pairs, "token"),
        })
    }
}

fn first_value(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(k, v)| k == key && !v.is_empty())
        .map(|(_, v)| v.clone())
}

/// Split `application/x-www-form-urlencoded` text into decoded pairs
fn parse_pairs(raw: &str) -> Result<Vec<(String, String)>, ParamsError> {
    let mut pairs = Vec::new();
    for part in raw.split('&') {
        if part.is_empty() {
            continue;
        }
        if part.contains(';') {
            return Err(ParamsError::Semicolon);
        }
        let (key, value) = part.split_once('=').unwrap_or((part, ""));
        pairs.push((unescape(key)?, unescape(value)?));
    }
    Ok(pairs)
}

fn unescape(raw: &str) -> Result<String, ParamsError> {
    let bytes = raw.as_bytes();
    for (i, _) in raw.match_indices('%') {
        let valid = bytes
            .get(i + 1..i + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            let end = (i + 3).min(bytes.len());
            return Err(ParamsError::InvalidEscape(
                String::from_utf8_lossy(&bytes[i..end]).into_owned(),
            ));
        }
    }
    let spaced = raw.replace('+', " ");
    Ok(percent_decode(spaced.as_bytes())
        .decode_utf8_lossy()
        .into_owned())
}

/// Header names and values for display, with credentials masked
pub fn header_dump(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if SCHEMED_CREDENTIALS.contains(name) {
                match value.to_str().ok().and_then(|v| v.split_once(' ')) {
                    Some((scheme, _)) => format!("{} [REDACTED]", scheme),
                    None => "[REDACTED]".to_string(),
                }
            } else if OPAQUE_CREDENTIALS.contains(&name.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value
                    .to_str()
                    .map(str::to_string)
                    .unwrap_or_else(|_| "<non-utf8>".to_string())
            };
            (name.as_str().to_string(), shown)
        })
        .collect()
}
