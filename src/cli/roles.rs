// Role management commands

use crate::stores::CredentialStore;
use crate::types::internal::auth::Role;
use crate::types::internal::context::RequestContext;

/// Set the role of the user named by `identifier`
///
/// `identifier` may be an email address or a username.
pub async fn set_user_role(
    credential_store: &CredentialStore,
    identifier: &str,
    role: Role,
) -> Result<(), Box<dyn std::error::Error>> {
    let command_name = match role {
        Role::Admin => "grant_admin",
        Role::User => "revoke_admin",
    };
    let ctx = RequestContext::for_cli(command_name);

    let user = credential_store
        .set_role(credential_store.db(), identifier, role)
        .await?;

    tracing::info!(
        actor = %ctx.actor_id,
        user_id = %user.id,
        role = role.as_str(),
        "User role updated"
    );
    println!("{} ({}) is now {}", user.username, user.email, role.as_str());

    Ok(())
}
