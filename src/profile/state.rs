use crate::api::auth::Identity;
use crate::domain::Player;
use crate::profile::deep_link::DeepLink;

/// Everything the transition function needs, resolved by the page before
/// the state is derived.
#[derive(Debug, Default)]
pub struct ProfileContext {
    pub deep_link: Option<DeepLink>,
    pub identity: Option<Identity>,
    pub linked_player: Option<Player>,
    pub email_match: Option<Player>,
}

/// The profile page renders exactly one of these.
#[derive(Debug)]
pub enum ProfileState {
    /// Password-recovery deep link: the new-password form, regardless of
    /// the normal flow.
    NewPassword,
    /// Email-confirmation deep link: hold the default resolution until
    /// the provider reports the sign-in.
    AwaitingConfirmation,
    Unauthenticated,
    Unverified { email: String },
    Claim { candidate: Player },
    Register { email: String, prefill_name: Option<String> },
    Profile { player: Box<Player> },
}

/// Single transition function over the resolved context. Deep links are
/// checked first; the remaining rules run in order once an identity is
/// known.
pub fn resolve(ctx: ProfileContext) -> ProfileState {
    match ctx.deep_link {
        Some(DeepLink::Recovery) => return ProfileState::NewPassword,
        Some(DeepLink::EmailConfirmation) => return ProfileState::AwaitingConfirmation,
        None => {}
    }

    let Some(identity) = ctx.identity else {
        return ProfileState::Unauthenticated;
    };

    if !identity.is_verified() {
        return ProfileState::Unverified {
            email: identity.email,
        };
    }

    if let Some(player) = ctx.linked_player {
        return ProfileState::Profile {
            player: Box::new(player),
        };
    }

    if let Some(candidate) = ctx.email_match {
        // Only an unclaimed record with the same email is offered.
        if candidate.is_unclaimed() && candidate.email_matches(&identity.email) {
            return ProfileState::Claim { candidate };
        }
    }

    ProfileState::Register {
        prefill_name: identity.user_metadata.full_name.clone(),
        email: identity.email,
    }
}

/// Single-flag mutual exclusion for state resolution and form
/// submission: a second attempt while one is in flight is dropped, with
/// no queueing.
#[derive(Debug, Default)]
pub struct InFlightGuard {
    in_flight: bool,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the caller acquired the flag; false means another
    /// attempt is already running and this one must be a no-op.
    pub fn try_begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    pub fn finish(&mut self) {
        self.in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity(confirmed: bool) -> Identity {
        let confirmed_at = confirmed.then_some("2025-02-01T10:00:00Z");
        serde_json::from_value(json!({
            "id": "user-1",
            "email": "Ana@Example.com",
            "email_confirmed_at": confirmed_at,
            "user_metadata": { "full_name": "Ana Souza" },
        }))
        .unwrap()
    }

    fn player(user_id: Option<&str>, email: Option<&str>) -> Player {
        Player {
            id: "p1".into(),
            full_name: "Ana Souza".into(),
            email: email.map(str::to_string),
            user_id: user_id.map(str::to_string),
            rating_rapid: Some(1500),
            games_played_rapid: Some(20),
            level: None,
        }
    }

    #[test]
    fn no_identity_is_unauthenticated() {
        let state = resolve(ProfileContext::default());
        assert!(matches!(state, ProfileState::Unauthenticated));
    }

    #[test]
    fn unconfirmed_email_is_unverified() {
        let state = resolve(ProfileContext {
            identity: Some(identity(false)),
            ..Default::default()
        });
        assert!(matches!(state, ProfileState::Unverified { .. }));
    }

    #[test]
    fn linked_player_goes_straight_to_profile() {
        let state = resolve(ProfileContext {
            identity: Some(identity(true)),
            linked_player: Some(player(Some("user-1"), None)),
            email_match: Some(player(None, Some("ana@example.com"))),
            ..Default::default()
        });
        assert!(matches!(state, ProfileState::Profile { .. }));
    }

    #[test]
    fn unclaimed_email_match_offers_claim_not_register() {
        let state = resolve(ProfileContext {
            identity: Some(identity(true)),
            email_match: Some(player(None, Some("ana@example.com"))),
            ..Default::default()
        });
        assert!(matches!(state, ProfileState::Claim { .. }));
    }

    #[test]
    fn claimed_email_match_falls_through_to_register() {
        let state = resolve(ProfileContext {
            identity: Some(identity(true)),
            email_match: Some(player(Some("someone-else"), Some("ana@example.com"))),
            ..Default::default()
        });
        assert!(matches!(state, ProfileState::Register { .. }));
    }

    #[test]
    fn register_prefills_signup_name() {
        let state = resolve(ProfileContext {
            identity: Some(identity(true)),
            ..Default::default()
        });
        match state {
            ProfileState::Register {
                prefill_name,
                email,
            } => {
                assert_eq!(prefill_name.as_deref(), Some("Ana Souza"));
                assert_eq!(email, "Ana@Example.com");
            }
            other => panic!("expected Register, got {:?}", other),
        }
    }

    #[test]
    fn recovery_link_overrides_everything() {
        let state = resolve(ProfileContext {
            deep_link: Some(DeepLink::Recovery),
            identity: Some(identity(true)),
            linked_player: Some(player(Some("user-1"), None)),
            ..Default::default()
        });
        assert!(matches!(state, ProfileState::NewPassword));
    }

    #[test]
    fn confirmation_link_suppresses_normal_resolution() {
        let state = resolve(ProfileContext {
            deep_link: Some(DeepLink::EmailConfirmation),
            ..Default::default()
        });
        assert!(matches!(state, ProfileState::AwaitingConfirmation));
    }

    #[test]
    fn in_flight_guard_drops_reentrant_attempts() {
        let mut guard = InFlightGuard::new();
        assert!(guard.try_begin());
        assert!(!guard.try_begin());
        assert!(!guard.try_begin());
        guard.finish();
        assert!(guard.try_begin());
    }
}
