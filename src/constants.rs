//! Fixed costs, tiers, and the built-in demo accounts

use crate::models::UserProfile;

/// Credits charged for a production request that lands in the public gallery
pub const COST_PUBLIC: i64 = 10;
/// Credits charged for a private (exclusive) production request
pub const COST_PRIVATE: i64 = 50;

/// Balance granted when a profile row is created on first login
pub const SIGNUP_CREDITS: i64 = 50;
/// Balance granted to mock-user fallback logins
pub const DEMO_CREDITS: i64 = 500;

/// Access tier that unlocks the post scheduler
pub const PREMIUM_TIER: i32 = 3;
/// Tier assigned to profiles created on first login
pub const DEFAULT_TIER: i32 = PREMIUM_TIER;

/// Reserved id prefix for demo accounts. Sessions with this prefix never
/// touch the database.
pub const DEMO_ID_PREFIX: &str = "mock-";

/// Display names that may sign in without a password check.
/// Kept for demo walkthroughs; see DESIGN.md before removing.
pub const PRIVILEGED_NAMES: [&str; 2] = ["Eunice", "Osmar"];

/// Whether a display name's first name is on the privileged list
pub fn is_privileged_name(display_name: &str) -> bool {
    display_name
        .split_whitespace()
        .next()
        .is_some_and(|first| PRIVILEGED_NAMES.iter().any(|n| n.eq_ignore_ascii_case(first)))
}

/// Static fallback accounts used when identity-provider auth fails
pub fn mock_users() -> Vec<UserProfile> {
    vec![
        UserProfile {
            id: "mock-eunice".to_string(),
            display_name: "Eunice".to_string(),
            email: None,
            credits: 0,
            access_tier: 1,
            phone: Some("(51) 98541-3413".to_string()),
            tax_id: Some("658.834.380-91".to_string()),
            avatar_url: Some("https://i.pravatar.cc/150?u=eunice".to_string()),
        },
        UserProfile {
            id: "mock-nice".to_string(),
            display_name: "Nice Vargas".to_string(),
            email: None,
            credits: 0,
            access_tier: 2,
            phone: Some("51985413413".to_string()),
            tax_id: Some("65883438091".to_string()),
            avatar_url: Some("https://i.pravatar.cc/150?u=nice".to_string()),
        },
        UserProfile {
            id: "mock-osmar".to_string(),
            display_name: "Osmar Teixeira".to_string(),
            email: None,
            credits: 0,
            access_tier: 1,
            phone: None,
            tax_id: None,
            avatar_url: Some("https://i.pravatar.cc/150?u=osmar".to_string()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privileged_name_matches_first_name() {
        assert!(is_privileged_name("Eunice"));
        assert!(is_privileged_name("Osmar Teixeira"));
        assert!(is_privileged_name("osmar teixeira"));
        assert!(!is_privileged_name("Nice Vargas"));
        assert!(!is_privileged_name(""));
    }

    #[test]
    fn test_mock_users_are_demo_ids() {
        assert!(mock_users().iter().all(|u| u.is_demo()));
    }
}
