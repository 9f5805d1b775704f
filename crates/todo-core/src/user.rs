use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// A user as returned on the wire. Credentials never appear here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "uuid")]
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Body of `POST /api/v1/security/register`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Body of `PATCH /api/v1/user`. Absent fields are left untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /api/v1/security/forgot-password`.
#[derive(Clone, Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serializes_camel_case() {
        let user = User {
            id: UserId::from_raw("user_0191f2f8-0000-7000-8000-000000000000"),
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john.doe@example.com".into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["uuid"], "user_0191f2f8-0000-7000-8000-000000000000");
        assert_eq!(json["firstName"], "John");
        assert_eq!(json["lastName"], "Doe");
    }

    #[test]
    fn register_request_deserializes() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"firstName":"John","lastName":"Doe","email":"j@d.com","password":"12345678"}"#,
        )
        .unwrap();
        assert_eq!(req.first_name, "John");
        assert_eq!(req.password, "12345678");
    }
}
