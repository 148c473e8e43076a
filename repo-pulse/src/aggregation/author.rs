//! Bot author detection.

use crate::devops::IdentityRef;

/// Whether any author field contains `bot_name`, ignoring case.
///
/// Display name, unique name and id are checked; an empty token never matches.
#[must_use]
pub fn is_authored_by(author: &IdentityRef, bot_name: &str) -> bool {
    let token = bot_name.trim().to_lowercase();
    if token.is_empty() {
        return false;
    }

    [&author.display_name, &author.unique_name, &author.id]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&token))
}
