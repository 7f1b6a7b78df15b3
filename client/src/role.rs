//! Role resolution: who may enter as administrator or voter.
//!
//! Facts (ownership, registration) are always re-read from the ledger at the
//! moment of the attempt. [`decide`] is the pure rule over those facts;
//! [`resolve`] fetches them and turns any lookup failure into a denial.

use serde::Serialize;
use tracing::{info, warn};

use evote_contract::ElectionLedger;
use evote_types::{Identity, OwnershipState, Role};

/// Why an entry attempt was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DenialReason {
    NoWallet,
    VoterCannotClaim,
    AdministratorRequired,
    NotAdministrator,
    AdministratorAsVoter,
    NotRegistered,
    ConnectionError,
}

impl DenialReason {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoWallet => "Please connect a wallet account",
            Self::VoterCannotClaim => "Access Denied: Registered Voters cannot claim Admin access.",
            Self::AdministratorRequired => {
                "System requires an Administrator first. Please wait for an Admin to claim access."
            }
            Self::NotAdministrator => "Access Denied: You are not the Admin.",
            Self::AdministratorAsVoter => "You are Admin. Please log in as Admin.",
            Self::NotRegistered => "Access Denied: You are not registered to vote.",
            Self::ConnectionError => "Connection error. Please try again.",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RoleDecision {
    /// No administrator exists; the caller may claim the role.
    OfferClaim,
    Granted(Role),
    Denied(DenialReason),
}

impl RoleDecision {
    pub fn message(&self) -> &'static str {
        match self {
            Self::OfferClaim => "No Administrator found. Do you want to claim Admin access?",
            Self::Granted(Role::Administrator) => "Welcome, Administrator",
            Self::Granted(Role::Voter) => "Welcome, Voter",
            Self::Denied(reason) => reason.message(),
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }
}

/// Whether [`decide`] looks at the registration fact for this request.
pub fn needs_registration(identity: &Identity, requested: Role, ownership: &OwnershipState) -> bool {
    match (requested, ownership) {
        (Role::Administrator, OwnershipState::Unclaimed) => true,
        (Role::Voter, OwnershipState::Owned(owner)) => owner != identity,
        _ => false,
    }
}

/// The entry rule over freshly read facts.
///
/// `registered` is only consulted where [`needs_registration`] says so.
pub fn decide(
    identity: &Identity,
    requested: Role,
    ownership: &OwnershipState,
    registered: bool,
) -> RoleDecision {
    match (requested, ownership) {
        (Role::Administrator, OwnershipState::Unclaimed) if registered => {
            RoleDecision::Denied(DenialReason::VoterCannotClaim)
        }
        (Role::Administrator, OwnershipState::Unclaimed) => RoleDecision::OfferClaim,
        (Role::Administrator, OwnershipState::Owned(owner)) if owner == identity => {
            RoleDecision::Granted(Role::Administrator)
        }
        (Role::Administrator, OwnershipState::Owned(_)) => {
            RoleDecision::Denied(DenialReason::NotAdministrator)
        }
        (Role::Voter, OwnershipState::Unclaimed) => {
            RoleDecision::Denied(DenialReason::AdministratorRequired)
        }
        (Role::Voter, OwnershipState::Owned(owner)) if owner == identity => {
            RoleDecision::Denied(DenialReason::AdministratorAsVoter)
        }
        (Role::Voter, OwnershipState::Owned(_)) if registered => RoleDecision::Granted(Role::Voter),
        (Role::Voter, OwnershipState::Owned(_)) => RoleDecision::Denied(DenialReason::NotRegistered),
    }
}

/// Fetch fresh facts for the ledger's caller and decide.
pub async fn resolve(ledger: &dyn ElectionLedger, requested: Role) -> RoleDecision {
    let identity = ledger.caller();
    let ownership = match ledger.read_ownership().await {
        Ok(ownership) => ownership,
        Err(e) => {
            warn!(%identity, %requested, error = %e, "owner lookup failed, denying entry");
            return RoleDecision::Denied(DenialReason::ConnectionError);
        }
    };

    let registered = if needs_registration(identity, requested, &ownership) {
        match ledger.is_voter_registered(identity).await {
            Ok(registered) => registered,
            Err(e) => {
                warn!(%identity, %requested, error = %e, "registration lookup failed, denying entry");
                return RoleDecision::Denied(DenialReason::ConnectionError);
            }
        }
    } else {
        false
    };

    let decision = decide(identity, requested, &ownership, registered);
    info!(%identity, %requested, ?decision, "entry decision");
    decision
}

/// Ownership as seen from the connected account, for display only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AccessSummary {
    Unclaimed,
    Owner,
    NotOwner,
}

impl AccessSummary {
    pub fn from_ownership(ownership: &OwnershipState, identity: &Identity) -> Self {
        match ownership {
            OwnershipState::Unclaimed => Self::Unclaimed,
            OwnershipState::Owned(owner) if owner == identity => Self::Owner,
            OwnershipState::Owned(_) => Self::NotOwner,
        }
    }
}
