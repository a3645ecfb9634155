//! Permission gate for command dispatch

use serenity::all::{Guild, Member, Permissions, RoleId};

/// Capabilities from `required` that `held` does not cover
pub fn missing_permissions(required: Permissions, held: Permissions) -> Permissions {
    required & !held
}

/// Human-readable names for a permission set, e.g. `Manage Guild`
pub fn permission_names(perms: Permissions) -> Vec<String> {
    perms
        .iter_names()
        .map(|(name, _)| {
            name.split('_')
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Resolve a member's current effective permission set from guild state.
///
/// The guild owner and members holding Administrator get everything;
/// otherwise the result is the union of the member's role permissions,
/// starting from the implicit everyone role. Resolved fresh on every
/// invocation since roles can change between messages.
pub fn effective_permissions(guild: &Guild, member: &Member) -> Permissions {
    if guild.owner_id == member.user.id {
        return Permissions::all();
    }

    // The everyone role shares the guild's ID
    let everyone = RoleId::new(guild.id.get());
    let mut permissions = guild
        .roles
        .get(&everyone)
        .map(|role| role.permissions)
        .unwrap_or_default();

    for role_id in &member.roles {
        if let Some(role) = guild.roles.get(role_id) {
            permissions |= role.permissions;
        }
    }

    if permissions.contains(Permissions::ADMINISTRATOR) {
        Permissions::all()
    } else {
        permissions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_permissions() {
        let required = Permissions::MANAGE_GUILD | Permissions::MANAGE_MESSAGES;

        assert_eq!(
            missing_permissions(required, Permissions::empty()),
            required
        );
        assert_eq!(
            missing_permissions(required, Permissions::MANAGE_GUILD),
            Permissions::MANAGE_MESSAGES
        );
        assert!(missing_permissions(required, required).is_empty());
        assert!(missing_permissions(required, Permissions::all()).is_empty());
        assert!(missing_permissions(Permissions::empty(), Permissions::empty()).is_empty());
    }

    #[test]
    fn test_permission_names() {
        let names = permission_names(Permissions::MANAGE_GUILD | Permissions::SEND_MESSAGES);
        assert!(names.contains(&"Manage Guild".to_string()));
        assert!(names.contains(&"Send Messages".to_string()));
        assert_eq!(names.len(), 2);

        assert!(permission_names(Permissions::empty()).is_empty());
    }
}
