extern crate std;

use common::Capability;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    Address,
};

use crate::test::{setup, stake, ONE};
use crate::{ContractError, TrackerModes};

#[test]
fn test_transfer_moves_shares_not_stake() {
    let s = setup();
    let alice = Address::generate(&s.env);
    let bob = Address::generate(&s.env);
    stake(&s, &alice, 10 * ONE);

    s.tracker.transfer(&alice, &bob, &(4 * ONE));
    assert_eq!(s.tracker.balance(&alice), 6 * ONE);
    assert_eq!(s.tracker.balance(&bob), 4 * ONE);
    assert_eq!(s.tracker.staked_amount(&alice), 10 * ONE);
    assert_eq!(s.tracker.staked_amount(&bob), 0);
    assert_eq!(s.tracker.total_supply(), 10 * ONE);
}

#[test]
fn test_transfer_more_than_balance_fails() {
    let s = setup();
    let alice = Address::generate(&s.env);
    let bob = Address::generate(&s.env);
    stake(&s, &alice, ONE);

    assert_eq!(
        s.tracker.try_transfer(&alice, &bob, &(2 * ONE)),
        Err(Ok(ContractError::InsufficientShares))
    );
}

#[test]
fn test_transfer_from_spends_allowance() {
    let s = setup();
    let alice = Address::generate(&s.env);
    let spender = Address::generate(&s.env);
    stake(&s, &alice, 10 * ONE);

    s.tracker.approve(&alice, &spender, &(3 * ONE), &1_000);
    assert_eq!(s.tracker.allowance(&alice, &spender), 3 * ONE);

    s.tracker.transfer_from(&spender, &alice, &spender, &(2 * ONE));
    assert_eq!(s.tracker.allowance(&alice, &spender), ONE);
    assert_eq!(s.tracker.balance(&spender), 2 * ONE);

    assert_eq!(
        s.tracker
            .try_transfer_from(&spender, &alice, &spender, &(2 * ONE)),
        Err(Ok(ContractError::InsufficientAllowance))
    );
}

#[test]
fn test_expired_allowance_reads_zero() {
    let s = setup();
    let alice = Address::generate(&s.env);
    let spender = Address::generate(&s.env);
    stake(&s, &alice, ONE);

    s.tracker.approve(&alice, &spender, &ONE, &0);
    s.env.ledger().set_sequence_number(5);
    assert_eq!(s.tracker.allowance(&alice, &spender), 0);
    assert_eq!(
        s.tracker.try_approve(&alice, &spender, &ONE, &1),
        Err(Ok(ContractError::InvalidExpiration))
    );
}

#[test]
fn test_handler_skips_allowance() {
    let s = setup();
    let alice = Address::generate(&s.env);
    let handler = Address::generate(&s.env);
    stake(&s, &alice, 5 * ONE);
    s.tracker
        .grant_capability(&s.gov, &handler, &Capability::TransferWhenPrivate);

    s.tracker.transfer_from(&handler, &alice, &handler, &(5 * ONE));
    assert_eq!(s.tracker.balance(&handler), 5 * ONE);
}

#[test]
fn test_private_transfer_mode_blocks_plain_accounts() {
    let s = setup();
    let alice = Address::generate(&s.env);
    let bob = Address::generate(&s.env);
    stake(&s, &alice, 5 * ONE);
    s.tracker.approve(&alice, &bob, &(5 * ONE), &1_000);
    s.tracker.set_modes(
        &s.gov,
        &TrackerModes {
            private_transfer_mode: true,
            ..TrackerModes::default()
        },
    );

    assert_eq!(
        s.tracker.try_transfer(&alice, &bob, &ONE),
        Err(Ok(ContractError::Unauthorized))
    );
    assert_eq!(
        s.tracker.try_transfer_from(&bob, &alice, &bob, &ONE),
        Err(Ok(ContractError::Unauthorized))
    );
}
