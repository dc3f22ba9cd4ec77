//! Deterministic credential derivation from a Google identity.
//!
//! There is no stored mapping between Google accounts and ticketing
//! accounts, so credentials are re-derived from the identity on every
//! attempt. The derivation formula changed over the service's history;
//! [`alternative_passwords`] lists every historical variant in a fixed
//! priority order so that accounts created under any of them can still
//! log in. The order is part of the contract: reproducible, never
//! randomized.

use chrono::Utc;
use passerelle_google::GoogleIdentity;
use rand::RngCore;

/// Number of random bytes in a unique-retry password.
const UNIQUE_PASSWORD_BYTES: usize = 12;

/// Ticketing username for a Google identity: the email local part.
#[must_use]
pub fn derive_username(identity: &GoogleIdentity) -> String {
    identity.email_local_part().to_string()
}

/// The current password formula: `GoogleAuth_<google_id>_<local_part>`.
#[must_use]
pub fn primary_password(identity: &GoogleIdentity) -> String {
    format!(
        "GoogleAuth_{}_{}",
        identity.id,
        identity.email_local_part()
    )
}

/// Historical password formulas, in the order they must be tried.
///
/// 1. subject id only
/// 2. local part and id reversed
/// 3. shorter `Google_` prefix
/// 4. lowercased local part
/// 5. local part with dots stripped
#[must_use]
pub fn alternative_passwords(identity: &GoogleIdentity) -> Vec<String> {
    let id = &identity.id;
    let local = identity.email_local_part();
    vec![
        format!("GoogleAuth_{id}"),
        format!("GoogleAuth_{local}_{id}"),
        format!("Google_{id}_{local}"),
        format!("GoogleAuth_{id}_{}", local.to_lowercase()),
        format!("GoogleAuth_{id}_{}", local.replace('.', "")),
    ]
}

/// Username for the unique-retry registration: the local part plus the
/// last four digits of the current unix-millisecond clock.
#[must_use]
pub fn unique_username(identity: &GoogleIdentity) -> String {
    let millis = Utc::now().timestamp_millis().to_string();
    let suffix = &millis[millis.len().saturating_sub(4)..];
    format!("{}_{}", identity.email_local_part(), suffix)
}

/// Random password for the unique-retry registration.
///
/// Not derivable afterwards; a returning user on this account will walk
/// the fallback chain again and may end up with another parallel
/// account. Accepted limitation of the mapping-free design.
#[must_use]
pub fn unique_password() -> String {
    let mut bytes = [0u8; UNIQUE_PASSWORD_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("GoogleAuth_{hex}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> GoogleIdentity {
        GoogleIdentity {
            id: "109876".to_string(),
            email: "Jean.Dupont@example.com".to_string(),
            name: "Jean Dupont".to_string(),
            picture: None,
            verified_email: Some(true),
        }
    }

    #[test]
    fn username_is_email_local_part() {
        assert_eq!(derive_username(&identity()), "Jean.Dupont");
    }

    #[test]
    fn primary_password_formula() {
        assert_eq!(primary_password(&identity()), "GoogleAuth_109876_Jean.Dupont");
    }

    #[test]
    fn alternative_passwords_keep_fixed_order() {
        assert_eq!(
            alternative_passwords(&identity()),
            vec![
                "GoogleAuth_109876",
                "GoogleAuth_Jean.Dupont_109876",
                "Google_109876_Jean.Dupont",
                "GoogleAuth_109876_jean.dupont",
                "GoogleAuth_109876_JeanDupont",
            ]
        );
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = alternative_passwords(&identity());
        let b = alternative_passwords(&identity());
        assert_eq!(a, b);
    }

    #[test]
    fn unique_username_disambiguates_local_part() {
        let username = unique_username(&identity());
        assert!(username.starts_with("Jean.Dupont_"));
        let suffix = username.rsplit('_').next().expect("suffix");
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn unique_passwords_are_random_and_prefixed() {
        let a = unique_password();
        let b = unique_password();
        assert_ne!(a, b);
        assert!(a.starts_with("GoogleAuth_"));
        assert_eq!(a.len(), "GoogleAuth_".len() + UNIQUE_PASSWORD_BYTES * 2);
    }
}
