#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env, String,
};
use vester::{VesterConfig, VesterContract, VesterContractClient};

const YEAR: u64 = 31_536_000;

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Deposit { user: u8, amount: u32 },
    Claim { user: u8 },
    Withdraw { user: u8 },
    Advance { seconds: u32 },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();
    env.cost_estimate().budget().reset_unlimited();
    env.ledger().set_timestamp(1_700_000_000);

    let gov = Address::generate(&env);
    let escrow = env
        .register_stellar_asset_contract_v2(gov.clone())
        .address();
    let real = env
        .register_stellar_asset_contract_v2(gov.clone())
        .address();

    let vester = VesterContractClient::new(&env, &env.register(VesterContract, ()));
    vester.initialize(
        &gov,
        &VesterConfig {
            name: String::from_str(&env, "Vested"),
            symbol: String::from_str(&env, "vTKN"),
            vesting_duration: YEAR,
            escrow_token: escrow.clone(),
            claimable_token: real.clone(),
            pair_token: None,
            reward_tracker: None,
        },
    );
    StellarAssetClient::new(&env, &real).mint(&vester.address, &i128::from(u64::MAX));

    let users: std::vec::Vec<Address> = (0..3).map(|_| Address::generate(&env)).collect();
    let mut deposited: std::vec::Vec<i128> = std::vec![0; users.len()];
    for user in &users {
        StellarAssetClient::new(&env, &escrow).mint(user, &i128::from(u64::MAX));
        TokenClient::new(&env, &escrow).approve(user, &vester.address, &i128::from(u64::MAX), &100_000);
    }

    for action in actions {
        match action {
            FuzzAction::Deposit { user, amount } => {
                let index = user as usize % users.len();
                if let Ok(Ok(())) = vester.try_deposit(&users[index], &i128::from(amount)) {
                    deposited[index] += i128::from(amount);
                }
            }
            FuzzAction::Claim { user } => {
                let _ = vester.try_claim(&users[user as usize % users.len()]);
            }
            FuzzAction::Withdraw { user } => {
                let index = user as usize % users.len();
                if let Ok(Ok(())) = vester.try_withdraw(&users[index]) {
                    deposited[index] = 0;
                }
            }
            FuzzAction::Advance { seconds } => {
                let now = env.ledger().timestamp();
                env.ledger().set_timestamp(now + u64::from(seconds));
            }
        }

        let mut supply = 0;
        for (index, user) in users.iter().enumerate() {
            let position = vester.position(user);
            assert!(position.balance >= 0);
            assert!(position.claimed_amount <= position.cumulative_claim_amount);
            assert_eq!(position.total_vested(), deposited[index]);
            supply += position.balance;
        }
        assert_eq!(supply, vester.total_supply());
    }
});
