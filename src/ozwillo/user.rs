//! Ozwillo user profile

use crate::error::UserInfoError;
use crate::oidc::ResourceOwner;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Read-only view over the claims returned by the Ozwillo userinfo endpoint.
///
/// Every claim is kept verbatim, including provider extensions the typed
/// accessors do not cover; use [`claim`](Self::claim) or
/// [`to_map`](Self::to_map) to reach them.
#[derive(Debug, Clone, PartialEq)]
pub struct OzwilloUser {
    id: String,
    claims: Map<String, Value>,
}

impl OzwilloUser {
    /// Wrap a userinfo document. Fails when the `sub` claim is missing.
    pub fn from_claims(claims: Map<String, Value>) -> Result<Self, UserInfoError> {
        let id = match claims.get("sub") {
            Some(Value::String(sub)) if !sub.is_empty() => sub.clone(),
            Some(Value::Number(sub)) => sub.to_string(),
            _ => return Err(UserInfoError::MissingClaim("sub")),
        };

        Ok(Self { id, claims })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Preferred display name
    pub fn name(&self) -> Result<Cow<'_, str>, UserInfoError> {
        self.required("name")
    }

    pub fn first_name(&self) -> Result<Cow<'_, str>, UserInfoError> {
        self.required("given_name")
    }

    pub fn last_name(&self) -> Result<Cow<'_, str>, UserInfoError> {
        self.required("family_name")
    }

    pub fn locale(&self) -> Option<Cow<'_, str>> {
        self.text("locale")
    }

    pub fn email(&self) -> Option<Cow<'_, str>> {
        self.text("email")
    }

    pub fn phone_number(&self) -> Option<Cow<'_, str>> {
        self.text("phone_number")
    }

    pub fn nickname(&self) -> Option<Cow<'_, str>> {
        self.text("nickname")
    }

    pub fn gender(&self) -> Option<Cow<'_, str>> {
        self.text("gender")
    }

    /// Birthdate as sent, usually `YYYY-MM-DD` or `YYYY`
    pub fn birthdate(&self) -> Option<Cow<'_, str>> {
        self.text("birthdate")
    }

    /// Last profile update as sent
    pub fn updated_at(&self) -> Option<Cow<'_, str>> {
        self.text("updated_at")
    }

    /// Last profile update from epoch seconds (number or numeric string) or RFC 3339
    pub fn updated_at_datetime(&self) -> Option<DateTime<Utc>> {
        match self.claims.get("updated_at")? {
            Value::Number(n) => DateTime::from_timestamp(n.as_i64()?, 0),
            Value::String(s) => match s.parse::<i64>() {
                Ok(secs) => DateTime::from_timestamp(secs, 0),
                Err(_) => DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc)),
            },
            _ => None,
        }
    }

    /// Raw value of any claim
    pub fn claim(&self, key: &str) -> Option<&Value> {
        self.claims.get(key)
    }

    pub fn to_map(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn into_claims(self) -> Map<String, Value> {
        self.claims
    }

    /// Claim rendered as text. Only an absent or null claim has no value.
    fn text(&self, key: &str) -> Option<Cow<'_, str>> {
        match self.claims.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        }
    }

    fn required(&self, key: &'static str) -> Result<Cow<'_, str>, UserInfoError> {
        self.text(key).ok_or(UserInfoError::MissingClaim(key))
    }
}

impl TryFrom<Map<String, Value>> for OzwilloUser {
    type Error = UserInfoError;

    fn try_from(claims: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::from_claims(claims)
    }
}

impl ResourceOwner for OzwilloUser {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_map(&self) -> &Map<String, Value> {
        &self.claims
    }
}

impl Serialize for OzwilloUser {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.claims.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("claims must be an object"),
        }
    }

    #[test]
    fn test_user_defaults() {
        let user = OzwilloUser::from_claims(claims(json!({
            "sub": "12345",
            "email": "mock.name@example.com",
            "name": "mock name",
            "given_name": "mock",
            "family_name": "name",
            "phone_number": "0101010101",
            "gender": "male",
            "locale": "en"
        })))
        .unwrap();

        assert_eq!(user.id(), "12345");
        assert_eq!(user.name().as_deref(), Ok("mock name"));
        assert_eq!(user.first_name().as_deref(), Ok("mock"));
        assert_eq!(user.last_name().as_deref(), Ok("name"));
        assert_eq!(user.locale().as_deref(), Some("en"));
        assert_eq!(user.email().as_deref(), Some("mock.name@example.com"));
        assert_eq!(user.phone_number().as_deref(), Some("0101010101"));
        assert_eq!(user.gender().as_deref(), Some("male"));
    }

    #[test]
    fn test_user_partial_data() {
        let user = OzwilloUser::from_claims(claims(json!({
            "sub": "12345",
            "name": "mock name",
            "given_name": "mock",
            "family_name": "name",
            "email": "mock.name@example.com"
        })))
        .unwrap();

        assert_eq!(user.id(), "12345");
        assert_eq!(user.name().as_deref(), Ok("mock name"));
        assert_eq!(user.locale().as_deref(), None);
        assert_eq!(user.gender().as_deref(), None);
        assert_eq!(user.phone_number().as_deref(), None);
        assert_eq!(user.nickname().as_deref(), None);
        assert_eq!(user.birthdate().as_deref(), None);
        assert_eq!(user.updated_at().as_deref(), None);
    }

    #[test]
    fn test_missing_required_claims() {
        let err = OzwilloUser::from_claims(claims(json!({ "name": "mock name" }))).unwrap_err();
        assert_eq!(err, UserInfoError::MissingClaim("sub"));

        let user = OzwilloUser::from_claims(claims(json!({ "sub": "12345" }))).unwrap();
        assert_eq!(user.name().unwrap_err(), UserInfoError::MissingClaim("name"));
        assert_eq!(user.first_name().unwrap_err(), UserInfoError::MissingClaim("given_name"));
        assert_eq!(user.last_name().unwrap_err(), UserInfoError::MissingClaim("family_name"));
    }

    #[test]
    fn test_numeric_subject() {
        let user = OzwilloUser::from_claims(claims(json!({ "sub": 12345 }))).unwrap();
        assert_eq!(user.id(), "12345");
    }

    #[test]
    fn test_updated_at_datetime_accepts_number_and_string() {
        let expected = DateTime::from_timestamp(1570811822, 0);

        let user = OzwilloUser::from_claims(claims(json!({
            "sub": "1",
            "updated_at": "1570811822"
        })))
        .unwrap();
        assert_eq!(user.updated_at_datetime(), expected);

        let user = OzwilloUser::from_claims(claims(json!({
            "sub": "1",
            "updated_at": 1570811822
        })))
        .unwrap();
        assert_eq!(user.updated_at_datetime(), expected);
    }

    #[test]
    fn test_non_string_claims_are_rendered_as_text() {
        let user = OzwilloUser::from_claims(claims(json!({
            "sub": "1",
            "name": 42,
            "phone_number": 33101010101u64,
            "nickname": true,
            "gender": null
        })))
        .unwrap();

        assert_eq!(user.name().as_deref(), Ok("42"));
        assert_eq!(user.phone_number().as_deref(), Some("33101010101"));
        assert_eq!(user.nickname().as_deref(), Some("true"));
        assert_eq!(user.gender(), None);
    }

    #[test]
    fn test_updated_at_in_rfc3339() {
        let user = OzwilloUser::from_claims(claims(json!({
            "sub": "1",
            "updated_at": "2019-10-11T16:37:02Z"
        })))
        .unwrap();

        assert_eq!(user.updated_at().as_deref(), Some("2019-10-11T16:37:02Z"));
        assert_eq!(
            user.updated_at_datetime(),
            DateTime::from_timestamp(1570811822, 0)
        );
    }

    #[test]
    fn test_updated_at_unparseable_keeps_raw_value() {
        let user = OzwilloUser::from_claims(claims(json!({
            "sub": "1",
            "updated_at": "yesterday"
        })))
        .unwrap();

        assert_eq!(user.updated_at().as_deref(), Some("yesterday"));
        assert_eq!(user.updated_at_datetime(), None);
    }

    #[test]
    fn test_all_claims_are_preserved() {
        let original = claims(json!({
            "sub": "12345",
            "name": "mock name",
            "given_name": "mock",
            "family_name": "name",
            "middle_name": "middle",
            "nickname": "nickname",
            "gender": "female",
            "birthdate": "1985-09-21",
            "locale": "fr-FR",
            "email": "mock.name@example.com",
            "email_verified": true,
            "phone_number": "0101010101",
            "phone_number_verified": true,
            "updated_at": "1570811822"
        }));

        let user = OzwilloUser::try_from(original.clone()).unwrap();

        assert_eq!(user.nickname().as_deref(), Some("nickname"));
        assert_eq!(user.birthdate().as_deref(), Some("1985-09-21"));
        assert_eq!(user.claim("middle_name"), Some(&json!("middle")));
        assert_eq!(user.claim("email_verified"), Some(&json!(true)));
        assert_eq!(user.to_map(), &original);
        assert_eq!(serde_json::to_value(&user).unwrap(), Value::Object(original.clone()));
        assert_eq!(user.into_claims(), original);
    }
}
