use crate::{
    cli::Context,
    config::Settings,
    error, info,
    management::Session,
    success,
    types::Credentials,
    warning,
};

/// Verifies `token` against Discogs and stores it with the identity it
/// belongs to. Falls back to `DISCOGS_TOKEN` when no token is passed.
pub async fn login(token: Option<String>) {
    let ctx = Context::load();

    let token = match token.or_else(Settings::token_from_env) {
        Some(token) => token.trim().to_string(),
        None => error!("No token given. Pass --token or set DISCOGS_TOKEN."),
    };

    let client = ctx.client();
    info!("Verifying token with Discogs...");
    let mut identity = match client.identity(&token).await {
        Ok(identity) => identity,
        Err(e) if e.status() == Some(401) => error!("Discogs rejected the token."),
        Err(e) => error!("Cannot verify token: {}", e),
    };

    let credentials = Credentials::new(identity.username.clone(), token.clone());
    match client.user_profile(&credentials).await {
        Ok(profile) if !profile.avatar_url.is_empty() => {
            identity.avatar_url = Some(profile.avatar_url)
        }
        Ok(_) => {}
        Err(e) => warning!("Cannot load profile of {}: {}", identity.username, e),
    }

    let username = identity.username.clone();
    if let Err(e) = ctx.session.persist(&Session::new(token, identity)).await {
        error!("Cannot store session: {}", e);
    }

    success!("Logged in as {}", username);
}

pub async fn logout() {
    let ctx = Context::load();
    match ctx.session.clear().await {
        Ok(()) => success!("Logged out"),
        Err(e) => error!("Cannot remove session: {}", e),
    }
}
