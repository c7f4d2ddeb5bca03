extern crate std;

use bonus_distributor::{BonusDistributorContract, BonusDistributorContractClient};
use common::Capability;
use reward_distributor::{RewardDistributorContract, RewardDistributorContractClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    vec, Address, Env, String,
};

use crate::{ContractError, RewardTrackerContract, RewardTrackerContractClient, TrackerModes};

pub(crate) const START: u64 = 1_700_000_000;
pub(crate) const DAY: u64 = 24 * 60 * 60;
pub(crate) const ONE: i128 = 1_000_000_000_000_000_000;
pub(crate) const RATE: i128 = 20_667_989_410_000_000;
const EXPIRY: u32 = 1_000;

// ── Test helpers ─────────────────────────────────────────────────────────────

pub(crate) struct Setup {
    pub env: Env,
    pub gov: Address,
    pub tracker: RewardTrackerContractClient<'static>,
    pub distributor: RewardDistributorContractClient<'static>,
    pub deposit_token: Address,
    pub reward_token: Address,
}

/// Deploys a tracker accepting one SAC deposit token, wired to a funded
/// fixed-rate distributor emitting `RATE` per second.
pub(crate) fn setup() -> Setup {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START);

    let deposit_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let reward_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let tracker_id = env.register(RewardTrackerContract, ());
    let distributor_id = env.register(RewardDistributorContract, ());
    let tracker = RewardTrackerContractClient::new(&env, &tracker_id);
    let distributor = RewardDistributorContractClient::new(&env, &distributor_id);

    let gov = Address::generate(&env);
    tracker.initialize(
        &gov,
        &String::from_str(&env, "Staked Token"),
        &String::from_str(&env, "sTKN"),
        &vec![&env, deposit_token.clone()],
        &distributor_id,
    );
    distributor.initialize(&gov, &reward_token, &tracker_id);

    StellarAssetClient::new(&env, &reward_token).mint(&distributor_id, &(50_000 * ONE));
    distributor.set_tokens_per_interval(&gov, &RATE);

    Setup {
        env,
        gov,
        tracker,
        distributor,
        deposit_token,
        reward_token,
    }
}

/// Mints `amount` of `token` to `account` and approves the tracker for it.
pub(crate) fn fund(s: &Setup, token: &Address, account: &Address, amount: i128) {
    StellarAssetClient::new(&s.env, token).mint(account, &amount);
    TokenClient::new(&s.env, token).approve(account, &s.tracker.address, &amount, &EXPIRY);
}

pub(crate) fn stake(s: &Setup, account: &Address, amount: i128) {
    fund(s, &s.deposit_token, account, amount);
    s.tracker.stake(account, &s.deposit_token, &amount);
}

pub(crate) fn advance(env: &Env, seconds: u64) {
    let now = env.ledger().timestamp();
    env.ledger().set_timestamp(now + seconds);
}

// ── Initialisation ───────────────────────────────────────────────────────────

#[test]
fn test_initialize_sets_metadata() {
    let s = setup();
    assert!(s.tracker.is_initialized());
    assert_eq!(s.tracker.name(), String::from_str(&s.env, "Staked Token"));
    assert_eq!(s.tracker.symbol(), String::from_str(&s.env, "sTKN"));
    assert_eq!(s.tracker.decimals(), 18);
    assert_eq!(s.tracker.total_supply(), 0);
    assert_eq!(s.tracker.distributor(), s.distributor.address);
    assert_eq!(s.tracker.reward_token(), s.reward_token);
    assert_eq!(s.tracker.tokens_per_interval(), RATE);
    assert!(s.tracker.is_deposit_token(&s.deposit_token));
    assert_eq!(s.tracker.modes(), TrackerModes::default());
}

#[test]
fn test_initialize_twice_fails() {
    let s = setup();
    let result = s.tracker.try_initialize(
        &s.gov,
        &String::from_str(&s.env, "x"),
        &String::from_str(&s.env, "x"),
        &vec![&s.env, s.deposit_token.clone()],
        &s.distributor.address,
    );
    assert_eq!(result, Err(Ok(ContractError::AlreadyInitialized)));
}

#[test]
fn test_calls_before_initialize_fail() {
    let env = Env::default();
    env.mock_all_auths();
    let tracker_id = env.register(RewardTrackerContract, ());
    let tracker = RewardTrackerContractClient::new(&env, &tracker_id);
    let user = Address::generate(&env);
    let token = Address::generate(&env);

    assert_eq!(
        tracker.try_stake(&user, &token, &ONE),
        Err(Ok(ContractError::NotInitialized))
    );
    assert_eq!(
        tracker.try_claim(&user, &user),
        Err(Ok(ContractError::NotInitialized))
    );
}

// ── Staking ──────────────────────────────────────────────────────────────────

#[test]
fn test_stake_books_position_and_mints_shares() {
    let s = setup();
    let user = Address::generate(&s.env);
    stake(&s, &user, 1_000 * ONE);

    assert_eq!(s.tracker.staked_amount(&user), 1_000 * ONE);
    assert_eq!(s.tracker.deposit_balance(&user, &s.deposit_token), 1_000 * ONE);
    assert_eq!(s.tracker.total_deposit_supply(&s.deposit_token), 1_000 * ONE);
    assert_eq!(s.tracker.balance(&user), 1_000 * ONE);
    assert_eq!(s.tracker.total_supply(), 1_000 * ONE);

    let token = TokenClient::new(&s.env, &s.deposit_token);
    assert_eq!(token.balance(&s.tracker.address), 1_000 * ONE);
    assert_eq!(token.balance(&user), 0);
}

#[test]
fn test_stake_rejects_zero_amount_and_unknown_token() {
    let s = setup();
    let user = Address::generate(&s.env);
    let stray = s
        .env
        .register_stellar_asset_contract_v2(Address::generate(&s.env))
        .address();

    assert_eq!(
        s.tracker.try_stake(&user, &s.deposit_token, &0),
        Err(Ok(ContractError::InvalidAmount))
    );
    assert_eq!(
        s.tracker.try_stake(&user, &stray, &ONE),
        Err(Ok(ContractError::InvalidToken))
    );
}

#[test]
fn test_day_of_staking_earns_expected_reward() {
    let s = setup();
    let user = Address::generate(&s.env);
    stake(&s, &user, 1_000 * ONE);

    advance(&s.env, DAY);
    let claimable = s.tracker.claimable(&user);
    assert!(claimable > 1_785 * ONE && claimable < 1_786 * ONE);

    let receiver = Address::generate(&s.env);
    let paid = s.tracker.claim(&user, &receiver);
    assert_eq!(paid, claimable);
    assert_eq!(TokenClient::new(&s.env, &s.reward_token).balance(&receiver), paid);
    assert_eq!(s.tracker.claimable(&user), 0);
    assert_eq!(s.tracker.cumulative_rewards(&user), paid);
}

#[test]
fn test_rewards_split_by_stake_share() {
    let s = setup();
    let alice = Address::generate(&s.env);
    let bob = Address::generate(&s.env);
    stake(&s, &alice, 3_000 * ONE);
    stake(&s, &bob, 1_000 * ONE);

    advance(&s.env, DAY);
    let a = s.tracker.claimable(&alice);
    let b = s.tracker.claimable(&bob);

    // Within flooring dust of 3:1.
    assert!((a - 3 * b).abs() <= 4);
    assert!(a + b <= RATE * DAY as i128);
}

#[test]
fn test_claim_twice_pays_once() {
    let s = setup();
    let user = Address::generate(&s.env);
    stake(&s, &user, 1_000 * ONE);

    advance(&s.env, DAY);
    let first = s.tracker.claim(&user, &user);
    let second = s.tracker.claim(&user, &user);
    assert!(first > 0);
    assert_eq!(second, 0);
}

#[test]
fn test_claim_with_nothing_owed_returns_zero() {
    let s = setup();
    let user = Address::generate(&s.env);
    assert_eq!(s.tracker.claim(&user, &user), 0);
}

#[test]
fn test_empty_interval_earns_nothing() {
    let s = setup();
    advance(&s.env, DAY);

    let user = Address::generate(&s.env);
    stake(&s, &user, 1_000 * ONE);
    assert_eq!(s.tracker.claimable(&user), 0);

    advance(&s.env, 100);
    let claimable = s.tracker.claimable(&user);
    assert!(claimable <= RATE * 100 && claimable >= RATE * 100 - 1);
}

#[test]
fn test_paid_rewards_never_exceed_distributed() {
    let s = setup();
    let users: std::vec::Vec<Address> = (0..3).map(|_| Address::generate(&s.env)).collect();
    stake(&s, &users[0], 7 * ONE);
    stake(&s, &users[1], 13 * ONE);
    advance(&s.env, 3_333);
    stake(&s, &users[2], 29 * ONE);
    advance(&s.env, 7_777);
    s.tracker.unstake(&users[1], &s.deposit_token, &(5 * ONE));
    advance(&s.env, 1_111);

    let mut paid = 0;
    for user in users.iter() {
        paid += s.tracker.claim(user, user);
    }
    let emitted = RATE * (3_333 + 7_777 + 1_111);
    assert!(paid <= emitted);
    assert!(emitted - paid < 100);
}

#[test]
fn test_rate_change_credits_both_rates() {
    let s = setup();
    let user = Address::generate(&s.env);
    stake(&s, &user, 1_000 * ONE);

    advance(&s.env, DAY);
    s.distributor.set_tokens_per_interval(&s.gov, &(RATE * 2));
    advance(&s.env, DAY);

    let claimable = s.tracker.claimable(&user);
    let expected = RATE * DAY as i128 * 3;
    assert!(claimable <= expected && expected - claimable < 10);
}

#[test]
fn test_new_staker_average_starts_at_stake() {
    let s = setup();
    let user = Address::generate(&s.env);
    assert_eq!(s.tracker.average_staked_amount(&user), 0);
    stake(&s, &user, 250 * ONE);
    assert_eq!(s.tracker.average_staked_amount(&user), 250 * ONE);

    // Topping up before any accrual leaves the opening average alone.
    stake(&s, &user, 250 * ONE);
    assert_eq!(s.tracker.average_staked_amount(&user), 250 * ONE);
}

#[test]
fn test_average_staked_amount_tracks_constant_stake() {
    let s = setup();
    let user = Address::generate(&s.env);
    stake(&s, &user, 1_000 * ONE);

    advance(&s.env, DAY);
    s.tracker.claim(&user, &user);
    assert_eq!(s.tracker.average_staked_amount(&user), 1_000 * ONE);

    stake(&s, &user, 1_000 * ONE);
    advance(&s.env, DAY);
    s.tracker.claim(&user, &user);

    // Equal reward earned at 1000 then 2000.
    let average = s.tracker.average_staked_amount(&user);
    assert!(average > 1_400 * ONE && average < 1_600 * ONE);
}

#[test]
fn test_update_rewards_moves_distribution_into_tracker() {
    let s = setup();
    let user = Address::generate(&s.env);
    stake(&s, &user, 1_000 * ONE);

    advance(&s.env, DAY);
    s.tracker.update_rewards();
    let held = TokenClient::new(&s.env, &s.reward_token).balance(&s.tracker.address);
    assert_eq!(held, RATE * DAY as i128);
    assert_eq!(s.tracker.claimable_reward(&user), 0);
    assert!(s.tracker.claimable(&user) > 1_785 * ONE);
}

// ── Unstaking ────────────────────────────────────────────────────────────────

#[test]
fn test_unstake_returns_tokens_and_keeps_rewards() {
    let s = setup();
    let user = Address::generate(&s.env);
    stake(&s, &user, 1_000 * ONE);

    advance(&s.env, DAY);
    s.tracker.unstake(&user, &s.deposit_token, &(1_000 * ONE));

    assert_eq!(s.tracker.staked_amount(&user), 0);
    assert_eq!(s.tracker.balance(&user), 0);
    assert_eq!(
        TokenClient::new(&s.env, &s.deposit_token).balance(&user),
        1_000 * ONE
    );

    // Reward settled on the way out stays claimable with zero stake.
    let owed = s.tracker.claimable(&user);
    assert!(owed > 1_785 * ONE);
    advance(&s.env, DAY);
    assert_eq!(s.tracker.claimable(&user), owed);
}

#[test]
fn test_unstake_more_than_staked_fails() {
    let s = setup();
    let user = Address::generate(&s.env);
    stake(&s, &user, 100 * ONE);

    assert_eq!(
        s.tracker.try_unstake(&user, &s.deposit_token, &(101 * ONE)),
        Err(Ok(ContractError::InsufficientStake))
    );
}

#[test]
fn test_unstake_checks_deposit_per_token() {
    let s = setup();
    let second = s
        .env
        .register_stellar_asset_contract_v2(Address::generate(&s.env))
        .address();
    s.tracker.set_deposit_token(&s.gov, &second, &true);

    let user = Address::generate(&s.env);
    stake(&s, &user, 100 * ONE);
    fund(&s, &second, &user, 50 * ONE);
    s.tracker.stake(&user, &second, &(50 * ONE));
    assert_eq!(s.tracker.staked_amount(&user), 150 * ONE);

    assert_eq!(
        s.tracker.try_unstake(&user, &second, &(100 * ONE)),
        Err(Ok(ContractError::InsufficientDeposit))
    );
}

#[test]
fn test_unstake_without_shares_fails() {
    let s = setup();
    let user = Address::generate(&s.env);
    let other = Address::generate(&s.env);
    stake(&s, &user, 100 * ONE);
    s.tracker.transfer(&user, &other, &(60 * ONE));

    assert_eq!(
        s.tracker.try_unstake(&user, &s.deposit_token, &(100 * ONE)),
        Err(Ok(ContractError::InsufficientShares))
    );
}

// ── Modes ────────────────────────────────────────────────────────────────────

#[test]
fn test_private_staking_mode_blocks_self_service() {
    let s = setup();
    s.tracker.set_modes(
        &s.gov,
        &TrackerModes {
            private_staking_mode: true,
            ..TrackerModes::default()
        },
    );
    let user = Address::generate(&s.env);
    fund(&s, &s.deposit_token, &user, ONE);

    assert_eq!(
        s.tracker.try_stake(&user, &s.deposit_token, &ONE),
        Err(Ok(ContractError::StakingDisabled))
    );
    assert_eq!(
        s.tracker.try_unstake(&user, &s.deposit_token, &ONE),
        Err(Ok(ContractError::StakingDisabled))
    );
}

#[test]
fn test_handler_stakes_for_account_in_private_mode() {
    let s = setup();
    s.tracker.set_modes(
        &s.gov,
        &TrackerModes {
            private_staking_mode: true,
            ..TrackerModes::default()
        },
    );
    let router = Address::generate(&s.env);
    s.tracker
        .grant_capability(&s.gov, &router, &Capability::StakeForOthers);

    let user = Address::generate(&s.env);
    fund(&s, &s.deposit_token, &user, 10 * ONE);
    s.tracker
        .stake_for_account(&router, &user, &user, &s.deposit_token, &(10 * ONE));
    assert_eq!(s.tracker.staked_amount(&user), 10 * ONE);

    let receiver = Address::generate(&s.env);
    s.tracker
        .unstake_for_account(&router, &user, &s.deposit_token, &(4 * ONE), &receiver);
    assert_eq!(
        TokenClient::new(&s.env, &s.deposit_token).balance(&receiver),
        4 * ONE
    );
}

#[test]
fn test_stake_for_other_requires_capability() {
    let s = setup();
    let funder = Address::generate(&s.env);
    let beneficiary = Address::generate(&s.env);
    let stranger = Address::generate(&s.env);
    fund(&s, &s.deposit_token, &funder, ONE);

    // Funding your own stake for someone else is fine while staking is public.
    s.tracker
        .stake_for_account(&funder, &funder, &beneficiary, &s.deposit_token, &(ONE / 2));
    assert_eq!(s.tracker.staked_amount(&beneficiary), ONE / 2);

    // Pulling someone else's tokens is not.
    assert_eq!(
        s.tracker
            .try_stake_for_account(&stranger, &funder, &stranger, &s.deposit_token, &(ONE / 2)),
        Err(Ok(ContractError::Unauthorized))
    );
}

#[test]
fn test_private_claiming_mode() {
    let s = setup();
    let user = Address::generate(&s.env);
    stake(&s, &user, 1_000 * ONE);
    s.tracker.set_modes(
        &s.gov,
        &TrackerModes {
            private_claiming_mode: true,
            ..TrackerModes::default()
        },
    );
    advance(&s.env, DAY);

    assert_eq!(
        s.tracker.try_claim(&user, &user),
        Err(Ok(ContractError::ClaimingDisabled))
    );

    let router = Address::generate(&s.env);
    assert_eq!(
        s.tracker.try_claim_for_account(&router, &user, &router),
        Err(Ok(ContractError::Unauthorized))
    );
    s.tracker
        .grant_capability(&s.gov, &router, &Capability::ClaimForOthers);
    let paid = s.tracker.claim_for_account(&router, &user, &router);
    assert!(paid > 1_785 * ONE);
}

// ── Chained trackers ─────────────────────────────────────────────────────────

#[test]
fn test_bonus_tracker_stakes_upstream_shares() {
    let s = setup();
    s.tracker.set_modes(
        &s.gov,
        &TrackerModes {
            private_transfer_mode: true,
            ..TrackerModes::default()
        },
    );

    let bonus_token = s
        .env
        .register_stellar_asset_contract_v2(Address::generate(&s.env))
        .address();
    let bonus_tracker_id = s.env.register(RewardTrackerContract, ());
    let bonus_distributor_id = s.env.register(BonusDistributorContract, ());
    let bonus_tracker = RewardTrackerContractClient::new(&s.env, &bonus_tracker_id);
    let bonus_distributor = BonusDistributorContractClient::new(&s.env, &bonus_distributor_id);
    bonus_tracker.initialize(
        &s.gov,
        &String::from_str(&s.env, "Staked + Bonus Token"),
        &String::from_str(&s.env, "sbTKN"),
        &vec![&s.env, s.tracker.address.clone()],
        &bonus_distributor_id,
    );
    bonus_distributor.initialize(&s.gov, &bonus_token, &bonus_tracker_id);
    StellarAssetClient::new(&s.env, &bonus_token).mint(&bonus_distributor_id, &(1_000 * ONE));
    bonus_distributor.set_bonus_multiplier(&s.gov, &10_000);

    // The downstream tracker moves upstream shares without an allowance.
    s.tracker
        .grant_capability(&s.gov, &bonus_tracker_id, &Capability::TransferWhenPrivate);

    let user = Address::generate(&s.env);
    stake(&s, &user, 1_000 * ONE);
    bonus_tracker.stake(&user, &s.tracker.address, &(1_000 * ONE));
    assert_eq!(s.tracker.balance(&user), 0);
    assert_eq!(s.tracker.balance(&bonus_tracker_id), 1_000 * ONE);

    advance(&s.env, DAY);
    let bonus = bonus_tracker.claimable(&user);
    assert!(bonus > 2_730_000_000_000_000_000 && bonus < 2_750_000_000_000_000_000);

    // Shares come back through the private-mode transfer path.
    bonus_tracker.unstake(&user, &s.tracker.address, &(1_000 * ONE));
    assert_eq!(s.tracker.balance(&user), 1_000 * ONE);

    // Plain accounts still cannot move shares.
    let other = Address::generate(&s.env);
    assert_eq!(
        s.tracker.try_transfer(&user, &other, &ONE),
        Err(Ok(ContractError::Unauthorized))
    );
}

// ── Governance ───────────────────────────────────────────────────────────────

#[test]
fn test_governance_setters_reject_strangers() {
    let s = setup();
    let stranger = Address::generate(&s.env);

    assert_eq!(
        s.tracker.try_set_modes(&stranger, &TrackerModes::default()),
        Err(Ok(ContractError::Unauthorized))
    );
    assert_eq!(
        s.tracker
            .try_set_deposit_token(&stranger, &s.deposit_token, &false),
        Err(Ok(ContractError::Unauthorized))
    );
    assert_eq!(
        s.tracker.try_set_gov(&stranger, &stranger),
        Err(Ok(ContractError::Unauthorized))
    );
    assert_eq!(
        s.tracker
            .try_withdraw_token(&stranger, &s.deposit_token, &stranger, &ONE),
        Err(Ok(ContractError::Unauthorized))
    );
}

#[test]
fn test_withdraw_token_rescues_stray_balance() {
    let s = setup();
    let stray = s
        .env
        .register_stellar_asset_contract_v2(Address::generate(&s.env))
        .address();
    StellarAssetClient::new(&s.env, &stray).mint(&s.tracker.address, &(5 * ONE));

    let receiver = Address::generate(&s.env);
    s.tracker
        .withdraw_token(&s.gov, &stray, &receiver, &(5 * ONE));
    assert_eq!(TokenClient::new(&s.env, &stray).balance(&receiver), 5 * ONE);
}

#[test]
fn test_delisted_token_cannot_be_staked() {
    let s = setup();
    s.tracker.set_deposit_token(&s.gov, &s.deposit_token, &false);
    let user = Address::generate(&s.env);
    fund(&s, &s.deposit_token, &user, ONE);

    assert_eq!(
        s.tracker.try_stake(&user, &s.deposit_token, &ONE),
        Err(Ok(ContractError::InvalidToken))
    );
}

#[test]
fn test_error_codes_classify() {
    use common::ErrorClass;
    assert_eq!(ContractError::NotInitialized.class(), Some(ErrorClass::StateGate));
    assert_eq!(ContractError::Unauthorized.class(), Some(ErrorClass::Authorization));
    assert_eq!(
        ContractError::InsufficientStake.class(),
        Some(ErrorClass::InsufficientBalance)
    );
    assert_eq!(ContractError::InvalidToken.class(), Some(ErrorClass::InvalidArgument));
}
