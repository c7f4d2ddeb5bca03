#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use reward_distributor::{RewardDistributorContract, RewardDistributorContractClient};
use reward_tracker::{RewardTrackerContract, RewardTrackerContractClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    vec, Address, Env, String,
};

const ONE: i128 = 1_000_000_000_000_000_000;
const FUNDING: i128 = 1_000_000 * ONE;

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Stake { user: u8, amount: u64 },
    Unstake { user: u8, amount: u64 },
    Claim { user: u8 },
    Advance { seconds: u32 },
    SetRate { rate: u64 },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();
    env.cost_estimate().budget().reset_unlimited();
    env.ledger().set_timestamp(1_700_000_000);

    let gov = Address::generate(&env);
    let deposit_token = env
        .register_stellar_asset_contract_v2(gov.clone())
        .address();
    let reward_token = env
        .register_stellar_asset_contract_v2(gov.clone())
        .address();

    let tracker = RewardTrackerContractClient::new(&env, &env.register(RewardTrackerContract, ()));
    let distributor = RewardDistributorContractClient::new(
        &env,
        &env.register(RewardDistributorContract, ()),
    );
    tracker.initialize(
        &gov,
        &String::from_str(&env, "Staked"),
        &String::from_str(&env, "sTKN"),
        &vec![&env, deposit_token.clone()],
        &distributor.address,
    );
    distributor.initialize(&gov, &reward_token, &tracker.address);
    StellarAssetClient::new(&env, &reward_token).mint(&distributor.address, &FUNDING);
    distributor.set_tokens_per_interval(&gov, &(ONE / 100));

    let users: std::vec::Vec<Address> = (0..4).map(|_| Address::generate(&env)).collect();
    for user in &users {
        StellarAssetClient::new(&env, &deposit_token).mint(user, &(u64::MAX as i128));
        TokenClient::new(&env, &deposit_token).approve(
            user,
            &tracker.address,
            &(u64::MAX as i128),
            &100_000,
        );
    }

    let mut paid: i128 = 0;
    for action in actions {
        match action {
            FuzzAction::Stake { user, amount } => {
                let user = &users[user as usize % users.len()];
                let _ = tracker.try_stake(user, &deposit_token, &(amount as i128));
            }
            FuzzAction::Unstake { user, amount } => {
                let user = &users[user as usize % users.len()];
                let _ = tracker.try_unstake(user, &deposit_token, &(amount as i128));
            }
            FuzzAction::Claim { user } => {
                let user = &users[user as usize % users.len()];
                if let Ok(Ok(amount)) = tracker.try_claim(user, user) {
                    paid += amount;
                }
            }
            FuzzAction::Advance { seconds } => {
                let now = env.ledger().timestamp();
                env.ledger().set_timestamp(now + u64::from(seconds % 2_592_000));
            }
            FuzzAction::SetRate { rate } => {
                let _ = distributor.try_set_tokens_per_interval(&gov, &(rate as i128));
            }
        }

        let staked: i128 = users.iter().map(|u| tracker.staked_amount(u)).sum();
        assert_eq!(staked, tracker.total_supply());
        assert!(paid <= FUNDING);
    }
});
