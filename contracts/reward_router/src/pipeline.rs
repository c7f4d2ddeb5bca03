//! Tracker pipeline fan-out and reward routing.
//!
//! A pipeline is an ordered list of trackers, innermost first. Staking enters
//! the first tracker with the deposited token and each later tracker with the
//! share of the tracker before it. Unstaking walks the same list backwards.

use common::fixed_point::mul_div;
use common::interfaces::{NativeWrapperClient, TrackerClient, VesterClient};
use soroban_sdk::{token, Address, Env, Vec};

use crate::{ContractError, RouterConfig};

/// Ledgers an approval granted by the router stays valid for.
const APPROVAL_LEDGERS: u32 = 1;

/// Reward totals collected by one compounding pass.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Compounded {
    pub escrow: i128,
    pub bonus_points: i128,
    pub fees: i128,
}

/// The router's view of its wiring for the duration of one call.
pub struct Pipelines<'a> {
    env: &'a Env,
    this: Address,
    pub config: RouterConfig,
}

impl<'a> Pipelines<'a> {
    pub fn new(env: &'a Env, config: RouterConfig) -> Self {
        Self {
            env,
            this: env.current_contract_address(),
            config,
        }
    }

    pub fn router(&self) -> &Address {
        &self.this
    }

    // ── Fan-out ─────────────────────────────────────────────────────────────

    /// Stakes `amount` of `token` for `account` through every tracker of
    /// `pipeline`. Only the first tracker pulls from `funder`; later trackers
    /// pull the freshly minted shares from `account`.
    pub fn stake(
        &self,
        pipeline: &Vec<Address>,
        funder: &Address,
        account: &Address,
        token: &Address,
        amount: i128,
    ) {
        let mut deposit = token.clone();
        for (index, tracker) in pipeline.iter().enumerate() {
            let from = if index == 0 { funder } else { account };
            TrackerClient::new(self.env, &tracker)
                .stake_for_account(&self.this, from, account, &deposit, &amount);
            deposit = tracker;
        }
    }

    /// Stakes tokens the router itself holds.
    pub fn stake_held(
        &self,
        pipeline: &Vec<Address>,
        account: &Address,
        token: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        let first = pipeline.first().ok_or(ContractError::InvalidConfig)?;
        self.approve(token, &first, amount);
        self.stake(pipeline, &self.this, account, token, amount);
        Ok(())
    }

    /// Unstakes `amount` from the outermost tracker inwards. Intermediate
    /// shares return to `account`; the underlying `token` goes to `receiver`.
    pub fn unstake(
        &self,
        pipeline: &Vec<Address>,
        account: &Address,
        token: &Address,
        amount: i128,
        receiver: &Address,
    ) -> Result<(), ContractError> {
        for index in (0..pipeline.len()).rev() {
            let tracker = pipeline.get(index).ok_or(ContractError::InvalidConfig)?;
            let (deposit, to) = if index == 0 {
                (token.clone(), receiver)
            } else {
                let inner = pipeline.get(index - 1).ok_or(ContractError::InvalidConfig)?;
                (inner, account)
            };
            TrackerClient::new(self.env, &tracker)
                .unstake_for_account(&self.this, account, &deposit, &amount, to);
        }
        Ok(())
    }

    // ── Bonus points ────────────────────────────────────────────────────────

    /// Tracker that bonus points are staked into: the last token tracker.
    pub fn bonus_points_tracker(&self) -> Result<Address, ContractError> {
        self.config
            .token_pipeline
            .last()
            .ok_or(ContractError::InvalidConfig)
    }

    /// Stakes bonus points held by the router into the bonus-points tracker.
    pub fn stake_bonus_points(&self, account: &Address, amount: i128) -> Result<(), ContractError> {
        if amount <= 0 {
            return Ok(());
        }
        let tracker = self.bonus_points_tracker()?;
        let bonus_points = &self.config.bonus_points_token;
        self.approve(bonus_points, &tracker, amount);
        TrackerClient::new(self.env, &tracker).stake_for_account(
            &self.this,
            &self.this,
            account,
            bonus_points,
            &amount,
        );
        Ok(())
    }

    /// Claims pending bonus points into the stake, then burns the staked
    /// bonus points in proportion to `amount / staked_before`.
    pub fn reduce_bonus_points(
        &self,
        account: &Address,
        amount: i128,
        staked_before: i128,
    ) -> Result<i128, ContractError> {
        let claimed = self.claim_rewards(&self.config.bonus_points_token, account, &self.this);
        self.stake_bonus_points(account, claimed)?;

        let tracker = self.bonus_points_tracker()?;
        let client = TrackerClient::new(self.env, &tracker);
        let staked = client.deposit_balance(account, &self.config.bonus_points_token);
        if staked <= 0 || staked_before <= 0 {
            return Ok(0);
        }
        let reduction = mul_div(self.env, staked, amount, staked_before).min(staked);
        if reduction > 0 {
            client.unstake_for_account(
                &self.this,
                account,
                &self.config.bonus_points_token,
                &reduction,
                &self.this,
            );
            token::Client::new(self.env, &self.config.bonus_points_token)
                .burn(&self.this, &reduction);
        }
        Ok(reduction)
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Every tracker of both pipelines.
    pub fn trackers(&self) -> Vec<Address> {
        let mut all = self.config.token_pipeline.clone();
        all.append(&self.config.liquidity_pipeline);
        all
    }

    pub fn vesters(&self) -> Vec<Address> {
        let mut all = Vec::from_array(self.env, [self.config.token_vester.clone()]);
        if let Some(vester) = self.config.liquidity_vester.clone() {
            all.push_back(vester);
        }
        all
    }

    /// Claims from every tracker paying `reward_token`. Returns the total.
    pub fn claim_rewards(&self, reward_token: &Address, account: &Address, receiver: &Address) -> i128 {
        let mut total: i128 = 0;
        for tracker in self.trackers().iter() {
            let client = TrackerClient::new(self.env, &tracker);
            if client.reward_token() == *reward_token {
                total = total.saturating_add(client.claim_for_account(&self.this, account, receiver));
            }
        }
        total
    }

    /// Claims vested real token from every vester.
    pub fn claim_vested(&self, account: &Address, receiver: &Address) -> i128 {
        let mut total: i128 = 0;
        for vester in self.vesters().iter() {
            total = total.saturating_add(
                VesterClient::new(self.env, &vester).claim_for_account(&self.this, account, receiver),
            );
        }
        total
    }

    /// Claims fee rewards; with `to_native` they are unwrapped on the way to
    /// `account`.
    pub fn claim_fees(&self, account: &Address, to_native: bool) -> Result<i128, ContractError> {
        let fee_token = self.config.fee_token.clone();
        if !to_native {
            return Ok(self.claim_rewards(&fee_token, account, account));
        }
        let wrapper = self
            .config
            .native_wrapper
            .clone()
            .ok_or(ContractError::FeatureDisabled)?;
        let amount = self.claim_rewards(&fee_token, account, &self.this);
        if amount > 0 {
            self.approve(&fee_token, &wrapper, amount);
            NativeWrapperClient::new(self.env, &wrapper).unwrap(&self.this, account, &amount);
        }
        Ok(amount)
    }

    /// Restakes escrow and bonus points, pays fees to the wallet.
    pub fn compound(&self, account: &Address) -> Result<Compounded, ContractError> {
        let escrow_token = self.config.escrow_token.clone();
        let escrow = self.claim_rewards(&escrow_token, account, &self.this);
        if escrow > 0 {
            self.stake_held(&self.config.token_pipeline, account, &escrow_token, escrow)?;
        }

        let bonus_points =
            self.claim_rewards(&self.config.bonus_points_token, account, &self.this);
        self.stake_bonus_points(account, bonus_points)?;

        let fees = self.claim_fees(account, false)?;
        Ok(Compounded {
            escrow,
            bonus_points,
            fees,
        })
    }

    pub fn approve(&self, token: &Address, spender: &Address, amount: i128) {
        let expiration = self.env.ledger().sequence().saturating_add(APPROVAL_LEDGERS);
        token::Client::new(self.env, token).approve(&self.this, spender, &amount, &expiration);
    }
}
