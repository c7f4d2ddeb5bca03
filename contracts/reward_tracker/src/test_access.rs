extern crate std;

use common::Capability;
use soroban_sdk::{testutils::Address as _, Address};

use crate::test::{fund, setup, ONE};
use crate::ContractError;

// ── Capability grants ────────────────────────────────────────────────────────

#[test]
fn test_gov_holds_every_capability_implicitly() {
    let s = setup();
    let user = Address::generate(&s.env);
    fund(&s, &s.deposit_token, &user, ONE);

    // Governance stakes someone else's approved tokens without a grant.
    s.tracker
        .stake_for_account(&s.gov, &user, &user, &s.deposit_token, &ONE);
    assert_eq!(s.tracker.staked_amount(&user), ONE);
}

#[test]
fn test_grant_registers_handler() {
    let s = setup();
    let router = Address::generate(&s.env);

    s.tracker
        .grant_capability(&s.gov, &router, &Capability::StakeForOthers);
    s.tracker
        .grant_capability(&s.gov, &router, &Capability::ClaimForOthers);

    assert!(s.tracker.has_capability(&router, &Capability::StakeForOthers));
    assert!(s.tracker.has_capability(&router, &Capability::ClaimForOthers));
    assert!(!s
        .tracker
        .has_capability(&router, &Capability::TransferWhenPrivate));
    assert_eq!(s.tracker.handlers().len(), 1);
}

#[test]
fn test_revoke_removes_only_that_capability() {
    let s = setup();
    let router = Address::generate(&s.env);
    s.tracker
        .grant_capability(&s.gov, &router, &Capability::StakeForOthers);
    s.tracker
        .grant_capability(&s.gov, &router, &Capability::ClaimForOthers);

    s.tracker
        .revoke_capability(&s.gov, &router, &Capability::StakeForOthers);
    assert!(!s.tracker.has_capability(&router, &Capability::StakeForOthers));
    assert!(s.tracker.has_capability(&router, &Capability::ClaimForOthers));

    s.tracker
        .revoke_capability(&s.gov, &router, &Capability::ClaimForOthers);
    assert_eq!(s.tracker.handlers().len(), 0);
}

#[test]
fn test_revoked_handler_loses_access() {
    let s = setup();
    let router = Address::generate(&s.env);
    let user = Address::generate(&s.env);
    fund(&s, &s.deposit_token, &user, 2 * ONE);

    s.tracker
        .grant_capability(&s.gov, &router, &Capability::StakeForOthers);
    s.tracker
        .stake_for_account(&router, &user, &user, &s.deposit_token, &ONE);

    s.tracker
        .revoke_capability(&s.gov, &router, &Capability::StakeForOthers);
    assert_eq!(
        s.tracker
            .try_stake_for_account(&router, &user, &user, &s.deposit_token, &ONE),
        Err(Ok(ContractError::Unauthorized))
    );
}

#[test]
fn test_only_gov_grants() {
    let s = setup();
    let stranger = Address::generate(&s.env);
    assert_eq!(
        s.tracker
            .try_grant_capability(&stranger, &stranger, &Capability::StakeForOthers),
        Err(Ok(ContractError::Unauthorized))
    );
    assert_eq!(
        s.tracker
            .try_revoke_capability(&stranger, &stranger, &Capability::StakeForOthers),
        Err(Ok(ContractError::Unauthorized))
    );
}

#[test]
fn test_set_gov_transfers_control() {
    let s = setup();
    let next = Address::generate(&s.env);
    s.tracker.set_gov(&s.gov, &next);
    assert_eq!(s.tracker.gov(), next);

    let router = Address::generate(&s.env);
    assert_eq!(
        s.tracker
            .try_grant_capability(&s.gov, &router, &Capability::StakeForOthers),
        Err(Ok(ContractError::Unauthorized))
    );
    s.tracker
        .grant_capability(&next, &router, &Capability::StakeForOthers);
}
