//! # Conditional Requests
//!
//! ETag / Last-Modified validators for the job detail resource and the
//! evaluation of `If-Match`, `If-Unmodified-Since`, `If-None-Match` and
//! `If-Modified-Since` against them.
//!
//! Dates compare at whole-second resolution, the precision of an
//! HTTP-date. Unparseable dates are ignored.

use axum::http::header::{
    ETAG, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_UNMODIFIED_SINCE, LAST_MODIFIED,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, NaiveDateTime, Utc};
use sha2::{Digest, Sha256};

use super::errors::{RestError, RestResult};
use crate::model::JobDetails;

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";
const RFC850_DATE_FORMAT: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// Current validators of a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validators {
    /// Quoted strong entity tag
    pub etag: String,
    pub last_modified: DateTime<Utc>,
}

/// Outcome of evaluating the request's preconditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Serve the request normally
    Proceed,
    /// Answer 304 with the validators and no body
    NotModified,
    /// Answer 412
    Failed,
}

impl Validators {
    /// Validators of the job detail representation: a digest of the
    /// serialized body (job, parameters and logs) and the job's
    /// modification time
    pub fn for_details(details: &JobDetails) -> RestResult<Self> {
        let body =
            serde_json::to_vec(details).map_err(|e| RestError::Internal(e.to_string()))?;
        let digest = Sha256::digest(&body);
        let hex: String = digest.iter().take(16).map(|b| format!("{:02x}", b)).collect();
        Ok(Self {
            etag: format!("\"{}\"", hex),
            last_modified: details.job.date_modified,
        })
    }

    /// Set `ETag` and `Last-Modified` on a response
    pub fn apply(&self, headers: &mut HeaderMap) {
        if let Ok(value) = HeaderValue::from_str(&self.etag) {
            headers.insert(ETAG, value);
        }
        if let Ok(value) = HeaderValue::from_str(&format_http_date(self.last_modified)) {
            headers.insert(LAST_MODIFIED, value);
        }
    }

    /// Empty 304 response carrying the validators
    pub fn not_modified(&self) -> Response {
        let mut response = StatusCode::NOT_MODIFIED.into_response();
        self.apply(response.headers_mut());
        response
    }

    /// Evaluate the request's conditional headers
    pub fn evaluate(&self, method: &Method, headers: &HeaderMap) -> Precondition {
        // A present header is never treated as absent, even when malformed
        let if_match = header_str(headers, IF_MATCH).map(parse_etags);
        let if_none_match = header_str(headers, IF_NONE_MATCH).map(parse_etags);
        let if_unmodified_since = header_str(headers, IF_UNMODIFIED_SINCE).and_then(parse_http_date);
        let if_modified_since = header_str(headers, IF_MODIFIED_SINCE).and_then(parse_http_date);
        let safe = *method == Method::GET || *method == Method::HEAD;
        let last_modified = self.last_modified.timestamp();

        match &if_match {
            Some(tags) if !self.if_match_passes(tags) => return Precondition::Failed,
            Some(_) => {}
            None => {
                if let Some(since) = if_unmodified_since {
                    if last_modified > since.timestamp() {
                        return Precondition::Failed;
                    }
                }
            }
        }
        if let Some(tags) = &if_none_match {
            if !self.if_none_match_passes(tags) {
                return if safe {
                    Precondition::NotModified
                } else {
                    Precondition::Failed
                };
            }
        }
        if if_none_match.is_none() && safe {
            if let Some(since) = if_modified_since {
                if last_modified <= since.timestamp() {
                    return Precondition::NotModified;
                }
            }
        }

        Precondition::Proceed
    }

    /// Strong comparison: weak tags never match
    fn if_match_passes(&self, tags: &[String]) -> bool {
        tags.iter().any(|tag| tag == "*" || *tag == self.etag)
    }

    /// Weak comparison; passes when no tag matches
    fn if_none_match_passes(&self, tags: &[String]) -> bool {
        let ours = strip_weak(&self.etag);
        !tags
            .iter()
            .any(|tag| tag == "*" || strip_weak(tag) == ours)
    }
}

fn header_str(headers: &HeaderMap, name: axum::http::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

/// Parse an entity-tag list
///
/// Malformed members are skipped. A value with no well-formed tag at all
/// is kept whole as a single opaque tag, which never equals a quoted
/// entity tag.
pub fn parse_etags(value: &str) -> Vec<String> {
    let value = value.trim();
    if value == "*" {
        return vec!["*".to_string()];
    }

    let mut tags = Vec::new();
    let mut rest = value;
    while let Some(start) = rest.find('"') {
        let weak = rest[..start].trim_end().ends_with("W/");
        let after = &rest[start + 1..];
        let Some(end) = after.find('"') else {
            break;
        };
        let opaque = &after[..end];
        tags.push(if weak {
            format!("W/\"{}\"", opaque)
        } else {
            format!("\"{}\"", opaque)
        });
        rest = &after[end + 1..];
    }
    if tags.is_empty() {
        tags.push(value.to_string());
    }
    tags
}

/// Format as an IMF-fixdate (`Sun, 06 Nov 1994 08:49:37 GMT`)
pub fn format_http_date(ts: DateTime<Utc>) -> String {
    ts.format(HTTP_DATE_FORMAT).to_string()
}

/// Parse any of the three HTTP-date forms
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");
    [HTTP_DATE_FORMAT, RFC850_DATE_FORMAT, ASCTIME_DATE_FORMAT]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&normalized, format).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn validators() -> Validators {
        Validators {
            etag: "\"abc\"".to_string(),
            last_modified: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
        }
    }

    fn headers(pairs: &[(axum::http::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_http_date_round_trip() {
        let ts = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
        assert_eq!(format_http_date(ts), "Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT"), Some(ts));
        assert_eq!(parse_http_date("Sunday, 06-Nov-94 08:49:37 GMT"), Some(ts));
        assert_eq!(parse_http_date("Sun Nov  6 08:49:37 1994"), Some(ts));
        assert_eq!(parse_http_date("yesterday"), None);
    }

    #[test]
    fn test_parse_etags() {
        assert_eq!(parse_etags("*"), vec!["*"]);
        assert_eq!(
            parse_etags("\"a\", W/\"b\",\"c\""),
            vec!["\"a\"", "W/\"b\"", "\"c\""]
        );
        assert_eq!(parse_etags("garbage"), vec!["garbage"]);
        assert_eq!(parse_etags(""), vec![""]);
    }

    #[test]
    fn test_no_conditions_proceeds() {
        assert_eq!(
            validators().evaluate(&Method::GET, &HeaderMap::new()),
            Precondition::Proceed
        );
    }

    #[test]
    fn test_if_none_match() {
        let v = validators();
        let matching = headers(&[(IF_NONE_MATCH, "\"abc\"")]);
        assert_eq!(v.evaluate(&Method::GET, &matching), Precondition::NotModified);
        assert_eq!(v.evaluate(&Method::HEAD, &matching), Precondition::NotModified);
        assert_eq!(v.evaluate(&Method::PUT, &matching), Precondition::Failed);

        let weak = headers(&[(IF_NONE_MATCH, "W/\"abc\"")]);
        assert_eq!(v.evaluate(&Method::GET, &weak), Precondition::NotModified);

        let other = headers(&[(IF_NONE_MATCH, "\"zzz\"")]);
        assert_eq!(v.evaluate(&Method::GET, &other), Precondition::Proceed);

        let any = headers(&[(IF_NONE_MATCH, "*")]);
        assert_eq!(v.evaluate(&Method::PUT, &any), Precondition::Failed);
    }

    #[test]
    fn test_if_match_is_strong() {
        let v = validators();
        let strong = headers(&[(IF_MATCH, "\"abc\"")]);
        assert_eq!(v.evaluate(&Method::PUT, &strong), Precondition::Proceed);

        let weak = headers(&[(IF_MATCH, "W/\"abc\"")]);
        assert_eq!(v.evaluate(&Method::PUT, &weak), Precondition::Failed);

        let stale = headers(&[(IF_MATCH, "\"old\"")]);
        assert_eq!(v.evaluate(&Method::GET, &stale), Precondition::Failed);
    }

    #[test]
    fn test_malformed_if_match_fails() {
        let v = validators();
        let unquoted = headers(&[(IF_MATCH, "abc")]);
        assert_eq!(v.evaluate(&Method::PUT, &unquoted), Precondition::Failed);

        // Still counts as present: If-Unmodified-Since is skipped
        let with_date = headers(&[
            (IF_MATCH, "abc"),
            (IF_UNMODIFIED_SINCE, "Mon, 15 Jan 2024 11:00:00 GMT"),
        ]);
        assert_eq!(v.evaluate(&Method::PUT, &with_date), Precondition::Failed);
    }

    #[test]
    fn test_malformed_if_none_match_skips_if_modified_since() {
        let v = validators();
        let h = headers(&[
            (IF_NONE_MATCH, "abc"),
            (IF_MODIFIED_SINCE, "Mon, 15 Jan 2024 10:00:00 GMT"),
        ]);
        assert_eq!(v.evaluate(&Method::GET, &h), Precondition::Proceed);
    }

    #[test]
    fn test_if_modified_since() {
        let v = validators();
        let same = headers(&[(IF_MODIFIED_SINCE, "Mon, 15 Jan 2024 10:00:00 GMT")]);
        assert_eq!(v.evaluate(&Method::GET, &same), Precondition::NotModified);
        assert_eq!(v.evaluate(&Method::PUT, &same), Precondition::Proceed);

        let earlier = headers(&[(IF_MODIFIED_SINCE, "Mon, 15 Jan 2024 09:59:59 GMT")]);
        assert_eq!(v.evaluate(&Method::GET, &earlier), Precondition::Proceed);

        let invalid = headers(&[(IF_MODIFIED_SINCE, "not a date")]);
        assert_eq!(v.evaluate(&Method::GET, &invalid), Precondition::Proceed);
    }

    #[test]
    fn test_if_none_match_overrides_if_modified_since() {
        let v = validators();
        let h = headers(&[
            (IF_NONE_MATCH, "\"zzz\""),
            (IF_MODIFIED_SINCE, "Mon, 15 Jan 2024 10:00:00 GMT"),
        ]);
        assert_eq!(v.evaluate(&Method::GET, &h), Precondition::Proceed);
    }

    #[test]
    fn test_if_unmodified_since() {
        let v = validators();
        let earlier = headers(&[(IF_UNMODIFIED_SINCE, "Mon, 15 Jan 2024 09:00:00 GMT")]);
        assert_eq!(v.evaluate(&Method::PUT, &earlier), Precondition::Failed);

        let later = headers(&[(IF_UNMODIFIED_SINCE, "Mon, 15 Jan 2024 11:00:00 GMT")]);
        assert_eq!(v.evaluate(&Method::PUT, &later), Precondition::Proceed);

        // If-Match takes precedence
        let both = headers(&[
            (IF_MATCH, "\"abc\""),
            (IF_UNMODIFIED_SINCE, "Mon, 15 Jan 2024 09:00:00 GMT"),
        ]);
        assert_eq!(v.evaluate(&Method::PUT, &both), Precondition::Proceed);
    }

    #[test]
    fn test_sub_second_modification_is_not_newer() {
        let mut v = validators();
        v.last_modified += chrono::Duration::milliseconds(250);
        let h = headers(&[(IF_MODIFIED_SINCE, "Mon, 15 Jan 2024 10:00:00 GMT")]);
        assert_eq!(v.evaluate(&Method::GET, &h), Precondition::NotModified);
    }

    #[test]
    fn test_not_modified_response_has_headers() {
        let response = validators().not_modified();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(response.headers()[ETAG], "\"abc\"");
        assert_eq!(
            response.headers()[LAST_MODIFIED],
            "Mon, 15 Jan 2024 10:00:00 GMT"
        );
    }
}
