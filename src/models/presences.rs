use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceResponse {
    pub user_id: i64,
    pub online: bool,
}

#[derive(Debug, Serialize)]
pub struct OnlineCountResponse {
    pub count: usize,
}
