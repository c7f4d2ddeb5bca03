//! Reward router.
//!
//! User-facing entry point of the suite. It fans stakes out over the tracker
//! pipelines, routes every reward type to its destination, wraps the
//! liquidity-pool manager and runs two-phase account migration.
//!
//! The router holds `StakeForOthers` and `ClaimForOthers` on every tracker and
//! `ClaimForOthers` plus `MigrateAccounts` on every vester.

#![no_std]

pub mod events;
pub mod migration;
pub mod pipeline;

use common::access;
use common::interfaces::{LiquidityManagerClient, TrackerClient};
use common::storage::extend_instance;
use common::ReentrancyGuard;
use soroban_sdk::{contract, contractimpl, contracttype, symbol_short, Address, Env, Symbol, Vec};

use pipeline::Pipelines;

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const CONFIG: Symbol = symbol_short!("CONFIG");

/// Upper bound on accounts per governance batch call.
pub const MAX_BATCH: u32 = 50;

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 501,
    AlreadyInitialized = 502,
    TransferNotSignalled = 503,
    Reentrant = 504,
    /// No liquidity manager or native wrapper is configured.
    FeatureDisabled = 505,
    SenderHasVestedTokens = 506,
    /// A different receiver is already signalled and rewards are accruing.
    SignalPending = 507,
    Unauthorized = 520,
    InvalidAmount = 560,
    InvalidConfig = 561,
    InvalidReceiver = 562,
    LengthMismatch = 563,
    BatchTooLarge = 580,
}

impl ContractError {
    pub fn class(&self) -> Option<common::ErrorClass> {
        common::classify(*self as u32)
    }
}

// ── Configuration ────────────────────────────────────────────────────────────

/// Token set and tracker wiring.
///
/// Both pipelines list trackers innermost first. The last tracker of
/// `token_pipeline` must accept `bonus_points_token` as a deposit.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouterConfig {
    pub token: Address,
    pub escrow_token: Address,
    pub bonus_points_token: Address,
    pub fee_token: Address,
    pub liquidity_token: Address,
    pub token_pipeline: Vec<Address>,
    pub liquidity_pipeline: Vec<Address>,
    pub token_vester: Address,
    pub liquidity_vester: Option<Address>,
    pub liquidity_manager: Option<Address>,
    pub native_wrapper: Option<Address>,
}

/// Choices for [`RewardRouterContract::handle_rewards`]. A stake flag only
/// takes effect together with its claim flag.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RewardFlags {
    pub claim_token: bool,
    pub stake_token: bool,
    pub claim_escrow: bool,
    pub stake_escrow: bool,
    pub stake_bonus_points: bool,
    pub claim_fees: bool,
    pub convert_fees_to_native: bool,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct RewardRouterContract;

#[contractimpl]
impl RewardRouterContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    pub fn initialize(env: Env, gov: Address, config: RouterConfig) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        if config.token_pipeline.is_empty() {
            return Err(ContractError::InvalidConfig);
        }

        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&CONFIG, &config);
        access::set_gov(&env, &gov);
        extend_instance(&env);

        events::publish_initialized(&env, gov, config);
        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Stake `account`'s token through the token pipeline. The account must
    /// have approved the first tracker.
    pub fn stake_token(env: Env, account: Address, amount: i128) -> Result<(), ContractError> {
        account.require_auth();
        let (_guard, p) = Self::open(&env)?;
        let token = p.config.token.clone();
        Self::stake_inner(&env, &p, &account, &account, &token, amount)
    }

    /// Governance stakes its own token for `account`.
    pub fn stake_token_for_account(
        env: Env,
        caller: Address,
        account: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_gov(&env, &caller)?;
        let (_guard, p) = Self::open(&env)?;
        let token = p.config.token.clone();
        Self::stake_inner(&env, &p, &caller, &account, &token, amount)
    }

    pub fn batch_stake_token_for_account(
        env: Env,
        caller: Address,
        accounts: Vec<Address>,
        amounts: Vec<i128>,
    ) -> Result<(), ContractError> {
        Self::require_gov(&env, &caller)?;
        if accounts.len() != amounts.len() {
            return Err(ContractError::LengthMismatch);
        }
        if accounts.len() > MAX_BATCH {
            return Err(ContractError::BatchTooLarge);
        }
        let (_guard, p) = Self::open(&env)?;
        let token = p.config.token.clone();
        for (account, amount) in accounts.iter().zip(amounts.iter()) {
            Self::stake_inner(&env, &p, &caller, &account, &token, amount)?;
        }
        Ok(())
    }

    pub fn stake_escrow(env: Env, account: Address, amount: i128) -> Result<(), ContractError> {
        account.require_auth();
        let (_guard, p) = Self::open(&env)?;
        let escrow = p.config.escrow_token.clone();
        Self::stake_inner(&env, &p, &account, &account, &escrow, amount)
    }

    /// Unstake token and burn the matching share of staked bonus points.
    pub fn unstake_token(env: Env, account: Address, amount: i128) -> Result<(), ContractError> {
        account.require_auth();
        let (_guard, p) = Self::open(&env)?;
        let token = p.config.token.clone();
        Self::unstake_inner(&env, &p, &account, &token, amount)
    }

    pub fn unstake_escrow(env: Env, account: Address, amount: i128) -> Result<(), ContractError> {
        account.require_auth();
        let (_guard, p) = Self::open(&env)?;
        let escrow = p.config.escrow_token.clone();
        Self::unstake_inner(&env, &p, &account, &escrow, amount)
    }

    // ── Liquidity ───────────────────────────────────────────────────────────

    /// Mint liquidity from `amount` of `token` and stake it through the
    /// liquidity pipeline. Returns the liquidity minted.
    pub fn mint_and_stake_liquidity(
        env: Env,
        account: Address,
        token: Address,
        amount: i128,
        min_usd: i128,
        min_liquidity: i128,
    ) -> Result<i128, ContractError> {
        account.require_auth();
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        let (_guard, p) = Self::open(&env)?;
        let manager = p
            .config
            .liquidity_manager
            .clone()
            .ok_or(ContractError::FeatureDisabled)?;

        let liquidity = LiquidityManagerClient::new(&env, &manager).add_liquidity_for_account(
            p.router(),
            &account,
            p.router(),
            &token,
            &amount,
            &min_usd,
            &min_liquidity,
        );
        let liquidity_token = p.config.liquidity_token.clone();
        p.stake_held(&p.config.liquidity_pipeline, &account, &liquidity_token, liquidity)?;

        events::publish_liquidity(&env, symbol_short!("MINT"), account, token, amount, liquidity);
        Ok(liquidity)
    }

    /// Unstake liquidity and redeem it for `token_out`, paid to `receiver`.
    pub fn unstake_and_redeem_liquidity(
        env: Env,
        account: Address,
        token_out: Address,
        liquidity_amount: i128,
        min_out: i128,
        receiver: Address,
    ) -> Result<i128, ContractError> {
        account.require_auth();
        if liquidity_amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        let (_guard, p) = Self::open(&env)?;
        let manager = p
            .config
            .liquidity_manager
            .clone()
            .ok_or(ContractError::FeatureDisabled)?;

        let liquidity_token = p.config.liquidity_token.clone();
        p.unstake(
            &p.config.liquidity_pipeline,
            &account,
            &liquidity_token,
            liquidity_amount,
            p.router(),
        )?;
        let amount_out = LiquidityManagerClient::new(&env, &manager).remove_liquidity_for_account(
            p.router(),
            p.router(),
            &token_out,
            &liquidity_amount,
            &min_out,
            &receiver,
        );

        events::publish_liquidity(
            &env,
            symbol_short!("REDEEM"),
            account,
            token_out,
            amount_out,
            liquidity_amount,
        );
        Ok(amount_out)
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Pay escrow and fee rewards to the wallet.
    pub fn claim(env: Env, account: Address) -> Result<(), ContractError> {
        account.require_auth();
        let (_guard, p) = Self::open(&env)?;
        let escrow = p.claim_rewards(&p.config.escrow_token, &account, &account);
        let fees = p.claim_fees(&account, false)?;
        events::publish_rewards_handled(&env, account, 0, escrow, 0, fees);
        Ok(())
    }

    pub fn claim_escrow(env: Env, account: Address) -> Result<i128, ContractError> {
        account.require_auth();
        let (_guard, p) = Self::open(&env)?;
        let escrow = p.claim_rewards(&p.config.escrow_token, &account, &account);
        events::publish_rewards_handled(&env, account, 0, escrow, 0, 0);
        Ok(escrow)
    }

    pub fn claim_fees(env: Env, account: Address) -> Result<i128, ContractError> {
        account.require_auth();
        let (_guard, p) = Self::open(&env)?;
        let fees = p.claim_fees(&account, false)?;
        events::publish_rewards_handled(&env, account, 0, 0, 0, fees);
        Ok(fees)
    }

    pub fn compound(env: Env, account: Address) -> Result<(), ContractError> {
        account.require_auth();
        let (_guard, p) = Self::open(&env)?;
        Self::compound_inner(&env, &p, &account)
    }

    pub fn compound_for_account(
        env: Env,
        caller: Address,
        account: Address,
    ) -> Result<(), ContractError> {
        Self::require_gov(&env, &caller)?;
        let (_guard, p) = Self::open(&env)?;
        Self::compound_inner(&env, &p, &account)
    }

    pub fn batch_compound_for_accounts(
        env: Env,
        caller: Address,
        accounts: Vec<Address>,
    ) -> Result<(), ContractError> {
        Self::require_gov(&env, &caller)?;
        if accounts.len() > MAX_BATCH {
            return Err(ContractError::BatchTooLarge);
        }
        let (_guard, p) = Self::open(&env)?;
        for account in accounts.iter() {
            Self::compound_inner(&env, &p, &account)?;
        }
        Ok(())
    }

    /// Claim, stake and convert rewards in one call.
    pub fn handle_rewards(
        env: Env,
        account: Address,
        flags: RewardFlags,
    ) -> Result<(), ContractError> {
        account.require_auth();
        let (_guard, p) = Self::open(&env)?;
        let router = p.router().clone();

        let mut token_amount = 0;
        if flags.claim_token {
            let receiver = if flags.stake_token { &router } else { &account };
            token_amount = p.claim_vested(&account, receiver);
            if flags.stake_token && token_amount > 0 {
                p.stake_held(&p.config.token_pipeline, &account, &p.config.token, token_amount)?;
            }
        }

        let mut escrow_amount = 0;
        if flags.claim_escrow {
            let receiver = if flags.stake_escrow { &router } else { &account };
            escrow_amount = p.claim_rewards(&p.config.escrow_token, &account, receiver);
            if flags.stake_escrow && escrow_amount > 0 {
                p.stake_held(
                    &p.config.token_pipeline,
                    &account,
                    &p.config.escrow_token,
                    escrow_amount,
                )?;
            }
        }

        let mut bonus_points = 0;
        if flags.stake_bonus_points {
            bonus_points = p.claim_rewards(&p.config.bonus_points_token, &account, &router);
            p.stake_bonus_points(&account, bonus_points)?;
        }

        let mut fees = 0;
        if flags.claim_fees {
            fees = p.claim_fees(&account, flags.convert_fees_to_native)?;
        }

        events::publish_rewards_handled(&env, account, token_amount, escrow_amount, bonus_points, fees);
        Ok(())
    }

    // ── Migration ───────────────────────────────────────────────────────────

    /// First phase: `sender` names the account allowed to take its positions.
    pub fn signal_transfer(env: Env, sender: Address, receiver: Address) -> Result<(), ContractError> {
        sender.require_auth();
        let (_guard, p) = Self::open(&env)?;
        migration::require_nothing_vesting(&p, &env, &sender)?;
        migration::require_replaceable_signal(&p, &env, &sender, &receiver)?;
        migration::validate_receiver(&p, &env, &receiver)?;
        migration::set_pending_receiver(&env, &sender, &receiver);
        events::publish_transfer_signalled(&env, sender, receiver);
        Ok(())
    }

    /// Second phase: `receiver` takes over every position of `sender`.
    ///
    /// The sender must have approved the router for its escrow wallet balance.
    pub fn accept_transfer(env: Env, receiver: Address, sender: Address) -> Result<(), ContractError> {
        receiver.require_auth();
        let (_guard, p) = Self::open(&env)?;
        if migration::pending_receiver(&env, &sender) != Some(receiver.clone()) {
            return Err(ContractError::TransferNotSignalled);
        }
        migration::require_nothing_vesting(&p, &env, &sender)?;
        migration::validate_receiver(&p, &env, &receiver)?;
        migration::clear_pending_receiver(&env, &sender);

        Self::compound_inner(&env, &p, &sender)?;
        let moved = migration::move_positions(&p, &env, &sender, &receiver)?;

        events::publish_transfer_accepted(&env, sender, receiver, moved);
        Ok(())
    }

    pub fn pending_receiver(env: Env, sender: Address) -> Option<Address> {
        migration::pending_receiver(&env, &sender)
    }

    // ── Views and governance ────────────────────────────────────────────────

    pub fn config(env: Env) -> Result<RouterConfig, ContractError> {
        Self::load_config(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    pub fn gov(env: Env) -> Result<Address, ContractError> {
        access::get_gov(&env).ok_or(ContractError::NotInitialized)
    }

    pub fn set_gov(env: Env, caller: Address, new_gov: Address) -> Result<(), ContractError> {
        Self::require_gov(&env, &caller)?;
        access::set_gov(&env, &new_gov);
        events::publish_gov_set(&env, caller, new_gov);
        Ok(())
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn open(env: &Env) -> Result<(ReentrancyGuard<'_>, Pipelines<'_>), ContractError> {
        let config = Self::load_config(env)?;
        extend_instance(env);
        let guard = ReentrancyGuard::enter(env).ok_or(ContractError::Reentrant)?;
        Ok((guard, Pipelines::new(env, config)))
    }

    fn require_gov(env: &Env, caller: &Address) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        caller.require_auth();
        if !access::is_gov(env, caller) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn load_config(env: &Env) -> Result<RouterConfig, ContractError> {
        env.storage()
            .instance()
            .get(&CONFIG)
            .ok_or(ContractError::NotInitialized)
    }

    fn stake_inner(
        env: &Env,
        p: &Pipelines,
        funder: &Address,
        account: &Address,
        token: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        p.stake(&p.config.token_pipeline, funder, account, token, amount);
        events::publish_stake(env, symbol_short!("STAKE"), account.clone(), token.clone(), amount);
        Ok(())
    }

    fn unstake_inner(
        env: &Env,
        p: &Pipelines,
        account: &Address,
        token: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        let first = p
            .config
            .token_pipeline
            .first()
            .ok_or(ContractError::InvalidConfig)?;
        let staked_before = TrackerClient::new(env, &first).staked_amount(account);

        p.unstake(&p.config.token_pipeline, account, token, amount, account)?;
        p.reduce_bonus_points(account, amount, staked_before)?;

        events::publish_stake(env, symbol_short!("UNSTAKE"), account.clone(), token.clone(), amount);
        Ok(())
    }

    fn compound_inner(env: &Env, p: &Pipelines, account: &Address) -> Result<(), ContractError> {
        let compounded = p.compound(account)?;
        events::publish_compounded(
            env,
            account.clone(),
            compounded.escrow,
            compounded.bonus_points,
            compounded.fees,
        );
        Ok(())
    }
}

#[cfg(test)]
mod test_migration;
