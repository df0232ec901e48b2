//! Admin account management commands.

use puffshop_admin::services::auth::AuthService;

use super::connect;

/// Create an admin account.
///
/// # Errors
///
/// Returns an error if the database is unreachable, the input fails
/// validation, or the email is already registered.
pub async fn create_user(
    email: &str,
    name: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;

    let admin = AuthService::new(&pool)
        .create_admin(email, name, password)
        .await?;

    tracing::info!("Created admin account: {} <{}>", admin.name, admin.email);
    Ok(())
}
