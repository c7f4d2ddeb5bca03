use soroban_sdk::{
    testutils::Address as _,
    token::{Client as TokenClient, StellarAssetClient},
    Address,
};

use crate::test::{advance, balance, fund, in_range, stake_token, suite, Suite, DAY, EXPIRY, ONE};
use crate::ContractError;

/// A sender with staked token, compounded escrow and bonus points, staked
/// liquidity and an escrow wallet balance approved to the router.
fn loaded_sender(s: &Suite) -> Address {
    let sender = Address::generate(&s.env);
    stake_token(s, &sender, 1_000 * ONE);
    StellarAssetClient::new(&s.env, &s.basket).mint(&sender, &(100 * ONE));
    s.router
        .mint_and_stake_liquidity(&sender, &s.basket, &(100 * ONE), &0, &0);
    advance(&s.env, DAY);
    s.router.compound(&sender);

    StellarAssetClient::new(&s.env, &s.escrow).mint(&sender, &(10 * ONE));
    TokenClient::new(&s.env, &s.escrow).approve(&sender, &s.router.address, &(10 * ONE), &EXPIRY);
    sender
}

#[test]
fn test_signal_then_accept_moves_everything() {
    let s = suite();
    let sender = loaded_sender(&s);
    let receiver = Address::generate(&s.env);

    let escrow_staked = s.staked.deposit_balance(&sender, &s.escrow);
    let points = s.fee_tracker.deposit_balance(&sender, &s.bonus_points);
    assert!(escrow_staked > 0 && points > 0);

    s.router.signal_transfer(&sender, &receiver);
    assert_eq!(s.router.pending_receiver(&sender), Some(receiver.clone()));

    advance(&s.env, DAY);
    s.router.accept_transfer(&receiver, &sender);
    assert_eq!(s.router.pending_receiver(&sender), None);

    // Staked token and escrow, including the second day compounded on accept.
    assert_eq!(s.staked.deposit_balance(&receiver, &s.token), 1_000 * ONE);
    assert_eq!(s.staked.deposit_balance(&sender, &s.token), 0);
    assert!(s.staked.deposit_balance(&receiver, &s.escrow) > escrow_staked);
    assert_eq!(s.staked.deposit_balance(&sender, &s.escrow), 0);
    assert_eq!(s.staked.staked_amount(&sender), 0);
    assert_eq!(s.fee_tracker.staked_amount(&sender), 0);

    assert!(s.fee_tracker.deposit_balance(&receiver, &s.bonus_points) > points);
    assert_eq!(s.fee_tracker.deposit_balance(&sender, &s.bonus_points), 0);

    assert_eq!(balance(&s, &s.escrow, &receiver), 10 * ONE);
    assert_eq!(balance(&s, &s.escrow, &sender), 0);

    assert_eq!(s.fee_liquidity.deposit_balance(&receiver, &s.liquidity), 100 * ONE);
    assert_eq!(s.staked_liquidity.staked_amount(&receiver), 100 * ONE);
    assert_eq!(s.staked_liquidity.staked_amount(&sender), 0);

    // Nothing is left behind in the router.
    for token in [&s.token, &s.escrow, &s.bonus_points, &s.liquidity] {
        assert_eq!(balance(&s, token, &s.router.address), 0);
    }
}

#[test]
fn test_accept_moves_vesting_history() {
    let s = suite();
    let sender = loaded_sender(&s);
    let receiver = Address::generate(&s.env);

    s.router.signal_transfer(&sender, &receiver);
    s.router.accept_transfer(&receiver, &sender);

    let token_rewards = s.staked.cumulative_rewards(&sender);
    assert!(in_range(token_rewards, 1_785 * ONE, 1_786 * ONE));
    assert_eq!(s.token_vester.transferred_cumulative_rewards(&receiver), token_rewards);
    assert_eq!(s.token_vester.cumulative_reward_deductions(&sender), token_rewards);
    assert_eq!(s.token_vester.get_max_vestable_amount(&sender), 0);
    assert_eq!(s.token_vester.get_max_vestable_amount(&receiver), token_rewards);
    assert_eq!(
        s.token_vester.transferred_avg_staked_amount(&receiver),
        s.staked.average_staked_amount(&sender)
    );

    let liquidity_rewards = s.staked_liquidity.cumulative_rewards(&sender);
    assert!(liquidity_rewards > 0);
    assert_eq!(
        s.liquidity_vester.transferred_cumulative_rewards(&receiver),
        liquidity_rewards
    );
    assert_eq!(s.liquidity_vester.get_max_vestable_amount(&sender), 0);
}

#[test]
fn test_accept_without_signal_fails() {
    let s = suite();
    let sender = loaded_sender(&s);
    let receiver = Address::generate(&s.env);
    assert_eq!(
        s.router.try_accept_transfer(&receiver, &sender),
        Err(Ok(ContractError::TransferNotSignalled))
    );

    let other = Address::generate(&s.env);
    s.router.signal_transfer(&sender, &receiver);
    assert_eq!(
        s.router.try_accept_transfer(&other, &sender),
        Err(Ok(ContractError::TransferNotSignalled))
    );
}

#[test]
fn test_signal_can_be_replaced() {
    let s = suite();
    let sender = loaded_sender(&s);
    let first = Address::generate(&s.env);
    let second = Address::generate(&s.env);

    s.router.signal_transfer(&sender, &first);
    s.router.signal_transfer(&sender, &second);
    assert_eq!(
        s.router.try_accept_transfer(&first, &sender),
        Err(Ok(ContractError::TransferNotSignalled))
    );
    s.router.accept_transfer(&second, &sender);
    assert_eq!(s.staked.deposit_balance(&second, &s.token), 1_000 * ONE);
}

#[test]
fn test_resignal_blocked_while_rewards_accrue() {
    let s = suite();
    let sender = loaded_sender(&s);
    let first = Address::generate(&s.env);
    let second = Address::generate(&s.env);
    s.router.signal_transfer(&sender, &first);

    advance(&s.env, DAY);
    assert!(s.staked.claimable(&sender) > 0);
    assert_eq!(
        s.router.try_signal_transfer(&sender, &second),
        Err(Ok(ContractError::SignalPending))
    );
    // Repeating the same receiver is harmless.
    s.router.signal_transfer(&sender, &first);
    assert_eq!(s.router.pending_receiver(&sender), Some(first.clone()));

    // Compounding clears the live accrual and frees the signal.
    s.router.compound(&sender);
    s.router.signal_transfer(&sender, &second);
    assert_eq!(s.router.pending_receiver(&sender), Some(second));
}

#[test]
fn test_receiver_with_history_is_rejected() {
    let s = suite();
    let sender = loaded_sender(&s);
    let veteran = Address::generate(&s.env);
    stake_token(&s, &veteran, ONE);
    advance(&s.env, DAY);
    s.router.claim(&veteran);

    assert_eq!(
        s.router.try_signal_transfer(&sender, &veteran),
        Err(Ok(ContractError::InvalidReceiver))
    );
}

#[test]
fn test_receiver_gaining_history_after_signal_is_rejected() {
    let s = suite();
    let sender = loaded_sender(&s);
    let receiver = Address::generate(&s.env);
    s.router.signal_transfer(&sender, &receiver);

    stake_token(&s, &receiver, ONE);
    advance(&s.env, DAY);
    s.router.claim(&receiver);

    assert_eq!(
        s.router.try_accept_transfer(&receiver, &sender),
        Err(Ok(ContractError::InvalidReceiver))
    );
}

#[test]
fn test_sender_with_vesting_balance_cannot_signal() {
    let s = suite();
    let sender = Address::generate(&s.env);
    stake_token(&s, &sender, 1_000 * ONE);
    advance(&s.env, DAY);
    let escrow = s.router.claim_escrow(&sender);
    TokenClient::new(&s.env, &s.escrow).approve(&sender, &s.token_vester.address, &escrow, &EXPIRY);
    s.token_vester.deposit(&sender, &escrow);

    let receiver = Address::generate(&s.env);
    assert_eq!(
        s.router.try_signal_transfer(&sender, &receiver),
        Err(Ok(ContractError::SenderHasVestedTokens))
    );

    // Withdrawing the vesting position unblocks migration.
    s.token_vester.withdraw(&sender);
    s.router.signal_transfer(&sender, &receiver);
}

#[test]
fn test_accept_without_escrow_approval_fails() {
    let s = suite();
    let sender = Address::generate(&s.env);
    stake_token(&s, &sender, 100 * ONE);
    fund(&s, &s.escrow, &sender, ONE);
    let receiver = Address::generate(&s.env);

    s.router.signal_transfer(&sender, &receiver);
    assert!(s.router.try_accept_transfer(&receiver, &sender).is_err());
    assert_eq!(s.router.pending_receiver(&sender), Some(receiver));
}
