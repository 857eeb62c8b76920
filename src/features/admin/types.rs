use crate::auth::types::UserSummary;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Platform counters. The backend adds keys freely, so they stay untyped.
pub type Statistics = Map<String, Value>;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct GuideRecord {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub is_approved: bool,
}

/// `/admin/users` may answer with a bare list or `{users: [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum UsersResponse {
    Wrapped { users: Vec<UserSummary> },
    Bare(Vec<UserSummary>),
}

impl From<UsersResponse> for Vec<UserSummary> {
    fn from(response: UsersResponse) -> Self {
        match response {
            UsersResponse::Wrapped { users } | UsersResponse::Bare(users) => users,
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct GuidesResponse {
    #[serde(default)]
    pub guides: Vec<GuideRecord>,
}

#[derive(Deserialize)]
pub(crate) struct ApproveResponse {
    pub guide: GuideRecord,
}
