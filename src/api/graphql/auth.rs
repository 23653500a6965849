use async_graphql::{InputObject, SimpleObject, Union};

use super::scalars::{HttpHeaders, QueryParams};
use crate::model;

#[derive(SimpleObject, Debug, Clone)]
pub struct Auth {
    pub credential: Option<CredentialData>,
    pub additional_headers: Option<HttpHeaders>,
    pub additional_query_params: Option<QueryParams>,
}

#[derive(Union, Debug, Clone)]
pub enum CredentialData {
    Basic(BasicCredentialData),
    OAuth(OAuthCredentialData),
}

#[derive(SimpleObject, Debug, Clone)]
pub struct BasicCredentialData {
    pub username: String,
    pub password: String,
}

#[derive(SimpleObject, Debug, Clone)]
pub struct OAuthCredentialData {
    #[graphql(name = "clientId")]
    pub client_id: String,
    pub client_secret: String,
    pub url: String,
}

impl From<model::Auth> for Auth {
    fn from(auth: model::Auth) -> Self {
        let credential = match (auth.credential.basic, auth.credential.oauth) {
            (Some(basic), _) => Some(CredentialData::Basic(BasicCredentialData {
                username: basic.username,
                password: basic.password,
            })),
            (None, Some(oauth)) => Some(CredentialData::OAuth(OAuthCredentialData {
                client_id: oauth.client_id,
                client_secret: oauth.client_secret,
                url: oauth.url,
            })),
            (None, None) => None,
        };
        Self {
            credential,
            additional_headers: auth.additional_headers.map(HttpHeaders),
            additional_query_params: auth.additional_query_params.map(QueryParams),
        }
    }
}

#[derive(InputObject, Debug, Clone)]
pub struct AuthInput {
    pub credential: Option<CredentialDataInput>,
    pub additional_headers: Option<HttpHeaders>,
    pub additional_query_params: Option<QueryParams>,
}

#[derive(InputObject, Debug, Clone)]
pub struct CredentialDataInput {
    pub basic: Option<BasicCredentialDataInput>,
    pub oauth: Option<OAuthCredentialDataInput>,
}

#[derive(InputObject, Debug, Clone)]
pub struct BasicCredentialDataInput {
    pub username: String,
    pub password: String,
}

#[derive(InputObject, Debug, Clone)]
pub struct OAuthCredentialDataInput {
    #[graphql(name = "clientId")]
    pub client_id: String,
    pub client_secret: String,
    pub url: String,
}

impl From<AuthInput> for model::AuthInput {
    fn from(input: AuthInput) -> Self {
        Self {
            credential: input.credential.map(|c| model::CredentialDataInput {
                basic: c.basic.map(|b| model::BasicCredentialDataInput {
                    username: b.username,
                    password: b.password,
                }),
                oauth: c.oauth.map(|o| model::OAuthCredentialDataInput {
                    client_id: o.client_id,
                    client_secret: o.client_secret,
                    url: o.url,
                }),
            }),
            additional_headers: input.additional_headers.map(|h| h.0),
            additional_query_params: input.additional_query_params.map(|q| q.0),
        }
    }
}
