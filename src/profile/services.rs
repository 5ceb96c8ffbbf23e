use tracing::{info, instrument};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::profile::dto::{BiometricProfile, ProfileUpdateResponse, UserProfile};

const PROFILE_PATH: &str = "/user/profile";

/// Remote profile access; keeps the session's cached user current.
#[derive(Clone)]
pub struct ProfileService {
    api: ApiClient,
}

impl ProfileService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self) -> ClientResult<UserProfile> {
        let user: UserProfile = self.api.get_json(PROFILE_PATH).await?;
        self.api.session().cache_user(&user).await;
        Ok(user)
    }

    /// Validate locally, then send only the fields that are present.
    #[instrument(skip(self, profile))]
    pub async fn update(&self, profile: &BiometricProfile) -> ClientResult<UserProfile> {
        profile.validate()?;
        let body = serde_json::to_value(profile)
            .map_err(|e| ClientError::Validation(e.to_string()))?;
        let response: ProfileUpdateResponse = self.api.put_json(PROFILE_PATH, body).await?;
        info!(message = ?response.message, "profile updated");
        self.api.session().cache_user(&response.user).await;
        Ok(response.user)
    }
}
