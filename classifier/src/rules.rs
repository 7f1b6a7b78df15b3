//! Rule tables for failure classification.
//!
//! Both tables are evaluated top to bottom and the first substring match
//! wins, so longer messages that contain shorter ones must come first
//! ("Voting has ended and cannot be restarted" before "Voting has ended").

use serde::Serialize;

/// Business-rule rejections the election contract can emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum RejectionCode {
    OnlyOwnerCanRegisterVoters,
    OwnerCannotBeVoter,
    VoterAlreadyRegistered,
    OnlyOwnerCanAddCandidates,
    CandidatesLockedAfterStart,
    CandidateAlreadyAdded,
    OnlyOwnerCanStart,
    NotEnoughCandidates,
    VotingAlreadyStarted,
    VotingCannotRestart,
    NoVotingOngoing,
    OnlyOwnerCanToggleHide,
    OwnerCannotVote,
    VoterNotRegistered,
    VotingNotActive,
    CandidateNotFound,
    AlreadyVoted,
    VotingEnded,
}

/// Which operator flow a rejection belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum RejectionPath {
    Administrator,
    Voter,
    General,
}

/// One entry of the contract's rejection vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerRejection {
    pub code: RejectionCode,
    pub path: RejectionPath,
    /// Canonical text, exactly as authored in the contract.
    pub message: &'static str,
}

const fn rejection(code: RejectionCode, path: RejectionPath, message: &'static str) -> LedgerRejection {
    LedgerRejection {
        code,
        path,
        message,
    }
}

use RejectionCode as C;
use RejectionPath::{Administrator, General, Voter};

/// The contract's rejection messages, in matching order.
pub const LEDGER_REJECTIONS: &[LedgerRejection] = &[
    // registerVoter
    rejection(C::OnlyOwnerCanRegisterVoters, Administrator, "Only owner can register voters"),
    rejection(C::OwnerCannotBeVoter, Administrator, "Owner cannot be registered as voter"),
    rejection(C::VoterAlreadyRegistered, Administrator, "Voter already registered"),
    // addCandidate
    rejection(
        C::OnlyOwnerCanAddCandidates,
        Administrator,
        "You aren't the owner, Only owner has the right to add candidates",
    ),
    rejection(
        C::CandidatesLockedAfterStart,
        Administrator,
        "Owner was not allowed to add candidates during voting started",
    ),
    rejection(C::CandidateAlreadyAdded, Administrator, "The candidate has been added"),
    // startSession / endSession
    rejection(
        C::OnlyOwnerCanStart,
        Administrator,
        "You aren't the owner, Only owner has the right to initiate the voting",
    ),
    rejection(
        C::NotEnoughCandidates,
        Administrator,
        "Candidates must be more than one or at least two to start the voting",
    ),
    rejection(C::VotingAlreadyStarted, Administrator, "Voting has started"),
    rejection(
        C::VotingCannotRestart,
        Administrator,
        "Voting has ended and cannot be restarted",
    ),
    rejection(C::NoVotingOngoing, Administrator, "No voting is on going"),
    // toggleHideVotes
    rejection(C::OnlyOwnerCanToggleHide, Administrator, "Only owner can toggle hide votes"),
    // castVote
    rejection(C::OwnerCannotVote, Voter, "Owner has no right to vote"),
    rejection(C::VoterNotRegistered, Voter, "You are not registered to vote"),
    rejection(
        C::VotingNotActive,
        Voter,
        "Voting has not started or Voting has ended",
    ),
    rejection(C::CandidateNotFound, Voter, "Candidate not found"),
    rejection(C::AlreadyVoted, Voter, "All voters are only allowed to vote once"),
    rejection(C::VotingEnded, General, "Voting has ended"),
];

/// Wallet and transport conditions below the contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum WalletCondition {
    UserCancelled,
    InsufficientFunds,
    StaleNonce,
    Underpriced,
}

impl WalletCondition {
    pub fn message(&self) -> &'static str {
        match self {
            Self::UserCancelled => "Transaction was cancelled by user",
            Self::InsufficientFunds => "Insufficient ETH balance for gas fees",
            Self::StaleNonce => "Transaction error. Please try again",
            Self::Underpriced => "Network is busy. Please increase gas fee or wait",
        }
    }
}

/// A substring that identifies a [`WalletCondition`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WalletRule {
    pub pattern: &'static str,
    pub condition: WalletCondition,
}

pub const WALLET_CONDITIONS: &[WalletRule] = &[
    WalletRule {
        pattern: "user rejected",
        condition: WalletCondition::UserCancelled,
    },
    WalletRule {
        pattern: "user denied",
        condition: WalletCondition::UserCancelled,
    },
    WalletRule {
        pattern: "insufficient funds",
        condition: WalletCondition::InsufficientFunds,
    },
    WalletRule {
        pattern: "nonce too low",
        condition: WalletCondition::StaleNonce,
    },
    WalletRule {
        pattern: "replacement fee too low",
        condition: WalletCondition::Underpriced,
    },
];

/// First contract rejection whose text occurs in `text`, ignoring case.
pub fn match_rejection(text: &str) -> Option<&'static LedgerRejection> {
    let lower = text.to_lowercase();
    LEDGER_REJECTIONS
        .iter()
        .find(|r| lower.contains(&r.message.to_lowercase()))
}

/// First wallet condition whose pattern occurs in `text`, ignoring case.
pub fn match_wallet(text: &str) -> Option<WalletCondition> {
    let lower = text.to_lowercase();
    WALLET_CONDITIONS
        .iter()
        .find(|r| lower.contains(r.pattern))
        .map(|r| r.condition)
}
