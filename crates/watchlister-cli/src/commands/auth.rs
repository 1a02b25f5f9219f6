use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;
use watchlister_backend::identity::api as identity_api;
use watchlister_backend::IdentityProvider;

use crate::commands::app::App;
use crate::output::{Output, OutputFormat};
use crate::AuthCommands;

pub async fn run_auth(cmd: AuthCommands, app: &App, output: &Output) -> Result<()> {
    match cmd {
        AuthCommands::Signup { email } => signup(app, &email, output).await,
        AuthCommands::Login { email } => login(app, &email, output).await,
        AuthCommands::LoginExternal { provider, token } => {
            login_external(app, &provider, token, output).await
        }
        AuthCommands::Logout => logout(app, output).await,
        AuthCommands::ResetPassword { email } => reset_password(app, &email, output).await,
        AuthCommands::Status => status(app, output).await,
    }
}

async fn signup(app: &App, email: &str, output: &Output) -> Result<()> {
    let identity = app.identity()?;
    let password = rpassword::prompt_password("Choose a password: ")
        .map_err(|e| eyre!("Failed to read password: {}", e))?;
    let confirm = rpassword::prompt_password("Confirm password: ")
        .map_err(|e| eyre!("Failed to read password: {}", e))?;
    if password != confirm {
        return Err(eyre!("Passwords do not match"));
    }

    identity
        .sign_up(email, &password)
        .await
        .map_err(|e| eyre!("Sign-up failed: {}", e))?;

    // Re-resolve so the document store picks up the new token, then
    // initialize the user's document so the first `list` finds one.
    let session = app.session().await?;
    app.docs()
        .ensure_document(&session.uid, &session.email)
        .await
        .map_err(|e| eyre!("Account created but document setup failed: {}", e))?;

    output.success(format!("Account created and signed in as {}", session.email));
    Ok(())
}

async fn login(app: &App, email: &str, output: &Output) -> Result<()> {
    let identity = app.identity()?;
    let password = rpassword::prompt_password("Password: ")
        .map_err(|e| eyre!("Failed to read password: {}", e))?;

    let session = identity
        .sign_in(email, &password)
        .await
        .map_err(|e| eyre!("Sign-in failed: {}", e))?;

    output.success(format!("Signed in as {}", session.email));
    Ok(())
}

async fn login_external(
    app: &App,
    provider: &str,
    token: Option<String>,
    output: &Output,
) -> Result<()> {
    let identity = app.identity()?;
    let token = match token {
        Some(t) => t,
        None => rpassword::prompt_password("Provider OAuth token: ")
            .map_err(|e| eyre!("Failed to read token: {}", e))?,
    };
    if token.trim().is_empty() {
        return Err(eyre!("Token cannot be empty"));
    }

    identity
        .sign_in_with_provider(&identity_api::provider_id(provider), token.trim())
        .await
        .map_err(|e| eyre!("Sign-in failed: {}", e))?;

    // External sign-in may be this account's first contact; make sure the
    // document exists like signup does.
    let session = app.session().await?;
    app.docs()
        .ensure_document(&session.uid, &session.email)
        .await
        .map_err(|e| eyre!("Signed in but document setup failed: {}", e))?;

    output.success(format!("Signed in as {}", session.email));
    Ok(())
}

async fn logout(app: &App, output: &Output) -> Result<()> {
    let identity = app.identity()?;
    identity
        .sign_out()
        .await
        .map_err(|e| eyre!("Sign-out failed: {}", e))?;
    output.success("Signed out");
    Ok(())
}

async fn reset_password(app: &App, email: &str, output: &Output) -> Result<()> {
    let identity = app.identity()?;
    identity
        .send_password_reset(email)
        .await
        .map_err(|e| eyre!("Failed to send reset email: {}", e))?;
    output.success(format!("Password reset email sent to {}", email));
    Ok(())
}

async fn status(app: &App, output: &Output) -> Result<()> {
    let identity = app.identity()?;
    let session = identity
        .restore_session()
        .await
        .map_err(|e| eyre!("Failed to check session: {}", e))?;

    match output.format() {
        OutputFormat::Human => match session {
            Some(s) => {
                output.success(format!(
                    "Signed in as {} (token valid until {})",
                    s.email,
                    s.expires_at.format("%Y-%m-%d %H:%M UTC")
                ));
            }
            None => output.info("Not signed in"),
        },
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let payload = match session {
                Some(s) => json!({
                    "signed_in": true,
                    "email": s.email,
                    "uid": s.uid,
                    "expires_at": s.expires_at.to_rfc3339(),
                }),
                None => json!({ "signed_in": false }),
            };
            output.json(&payload);
        }
    }
    Ok(())
}
