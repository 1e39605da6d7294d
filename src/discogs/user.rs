use crate::{
    discogs::DiscogsClient,
    error::ApiError,
    types::{Credentials, Folder, FoldersResponse, Identity, UserProfile},
};

impl DiscogsClient {
    /// Resolves the user a token belongs to. Used to verify a token at login,
    /// before any username is known.
    pub async fn identity(&self, token: &str) -> Result<Identity, ApiError> {
        let url = format!("{}/oauth/identity", self.base_url());
        let credentials = Credentials::new("", token);
        self.fetch_json::<Identity>(&url, &credentials).await
    }

    /// Public profile of the credentials' user.
    pub async fn user_profile(&self, credentials: &Credentials) -> Result<UserProfile, ApiError> {
        let url = format!("{}/users/{}", self.base_url(), credentials.username);
        self.fetch_json::<UserProfile>(&url, credentials).await
    }

    /// Lists the collection folders of the credentials' user, folder 0
    /// ("All") included.
    ///
    /// Folders are not paginated by Discogs, so this is a single request.
    ///
    /// # Example
    ///
    /// ```ignore
    /// for folder in client.folders(&credentials).await? {
    ///     println!("{}: {}", folder.name, folder.count);
    /// }
    /// ```
    pub async fn folders(&self, credentials: &Credentials) -> Result<Vec<Folder>, ApiError> {
        let url = format!(
            "{}/users/{}/collection/folders",
            self.base_url(),
            credentials.username
        );
        let response = self.fetch_json::<FoldersResponse>(&url, credentials).await?;
        Ok(response.folders)
    }
}
