use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Header name to values.
pub type HttpHeaders = HashMap<String, Vec<String>>;
/// Query parameter name to values.
pub type QueryParams = HashMap<String, Vec<String>>;

/// Credentials used to call an external system.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Auth {
    pub credential: CredentialData,
    pub additional_headers: Option<HttpHeaders>,
    pub additional_query_params: Option<QueryParams>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CredentialData {
    pub basic: Option<BasicCredentialData>,
    pub oauth: Option<OAuthCredentialData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BasicCredentialData {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OAuthCredentialData {
    #[serde(rename = "ClientID")]
    pub client_id: String,
    pub client_secret: String,
    #[serde(rename = "URL")]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuthInput {
    pub credential: Option<CredentialDataInput>,
    pub additional_headers: Option<HttpHeaders>,
    pub additional_query_params: Option<QueryParams>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CredentialDataInput {
    pub basic: Option<BasicCredentialDataInput>,
    pub oauth: Option<OAuthCredentialDataInput>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasicCredentialDataInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OAuthCredentialDataInput {
    pub client_id: String,
    pub client_secret: String,
    pub url: String,
}

impl AuthInput {
    pub fn to_auth(&self) -> Auth {
        Auth {
            credential: self
                .credential
                .as_ref()
                .map(CredentialDataInput::to_credential)
                .unwrap_or_default(),
            additional_headers: self.additional_headers.clone(),
            additional_query_params: self.additional_query_params.clone(),
        }
    }
}

impl CredentialDataInput {
    pub fn to_credential(&self) -> CredentialData {
        CredentialData {
            basic: self.basic.as_ref().map(|b| BasicCredentialData {
                username: b.username.clone(),
                password: b.password.clone(),
            }),
            oauth: self.oauth.as_ref().map(|o| OAuthCredentialData {
                client_id: o.client_id.clone(),
                client_secret: o.client_secret.clone(),
                url: o.url.clone(),
            }),
        }
    }
}

impl Auth {
    /// Inverse of [`AuthInput::to_auth`]
    pub fn to_input(&self) -> AuthInput {
        let credential = &self.credential;
        let credential = if credential.basic.is_none() && credential.oauth.is_none() {
            None
        } else {
            Some(CredentialDataInput {
                basic: credential.basic.as_ref().map(|b| BasicCredentialDataInput {
                    username: b.username.clone(),
                    password: b.password.clone(),
                }),
                oauth: credential.oauth.as_ref().map(|o| OAuthCredentialDataInput {
                    client_id: o.client_id.clone(),
                    client_secret: o.client_secret.clone(),
                    url: o.url.clone(),
                }),
            })
        };
        AuthInput {
            credential,
            additional_headers: self.additional_headers.clone(),
            additional_query_params: self.additional_query_params.clone(),
        }
    }
}
