//! Share ledger: balances, supply and allowances of the tracker's own token.

use common::storage::extend_persistent;
use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::ContractError;

const BALANCE: Symbol = symbol_short!("BAL");
const ALLOWANCE: Symbol = symbol_short!("ALLOW");
const SUPPLY: Symbol = symbol_short!("SUPPLY");

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AllowanceValue {
    pub amount: i128,
    pub expiration_ledger: u32,
}

pub fn total_supply(env: &Env) -> i128 {
    env.storage().instance().get(&SUPPLY).unwrap_or(0)
}

pub fn balance(env: &Env, id: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&(BALANCE, id.clone()))
        .unwrap_or(0)
}

fn set_balance(env: &Env, id: &Address, amount: i128) {
    let key = (BALANCE, id.clone());
    env.storage().persistent().set(&key, &amount);
    extend_persistent(env, &key);
}

pub fn mint(env: &Env, to: &Address, amount: i128) -> Result<(), ContractError> {
    let next = balance(env, to)
        .checked_add(amount)
        .ok_or(ContractError::Overflow)?;
    let supply = total_supply(env)
        .checked_add(amount)
        .ok_or(ContractError::Overflow)?;
    set_balance(env, to, next);
    env.storage().instance().set(&SUPPLY, &supply);
    Ok(())
}

pub fn burn(env: &Env, from: &Address, amount: i128) -> Result<(), ContractError> {
    let current = balance(env, from);
    if current < amount {
        return Err(ContractError::InsufficientShares);
    }
    set_balance(env, from, current - amount);
    env.storage()
        .instance()
        .set(&SUPPLY, &(total_supply(env) - amount));
    Ok(())
}

pub fn move_balance(
    env: &Env,
    from: &Address,
    to: &Address,
    amount: i128,
) -> Result<(), ContractError> {
    if amount < 0 {
        return Err(ContractError::InvalidAmount);
    }
    let from_balance = balance(env, from);
    if from_balance < amount {
        return Err(ContractError::InsufficientShares);
    }
    set_balance(env, from, from_balance - amount);
    let to_balance = balance(env, to)
        .checked_add(amount)
        .ok_or(ContractError::Overflow)?;
    set_balance(env, to, to_balance);
    Ok(())
}

fn load_allowance(env: &Env, from: &Address, spender: &Address) -> AllowanceValue {
    let stored: Option<AllowanceValue> = env
        .storage()
        .persistent()
        .get(&(ALLOWANCE, from.clone(), spender.clone()));
    match stored {
        Some(value) if value.expiration_ledger >= env.ledger().sequence() => value,
        _ => AllowanceValue {
            amount: 0,
            expiration_ledger: 0,
        },
    }
}

/// Unexpired allowance from `from` to `spender`.
pub fn allowance(env: &Env, from: &Address, spender: &Address) -> i128 {
    load_allowance(env, from, spender).amount
}

pub fn approve(
    env: &Env,
    from: &Address,
    spender: &Address,
    amount: i128,
    expiration_ledger: u32,
) -> Result<(), ContractError> {
    if amount < 0 {
        return Err(ContractError::InvalidAmount);
    }
    if amount > 0 && expiration_ledger < env.ledger().sequence() {
        return Err(ContractError::InvalidExpiration);
    }
    let key = (ALLOWANCE, from.clone(), spender.clone());
    env.storage().persistent().set(
        &key,
        &AllowanceValue {
            amount,
            expiration_ledger,
        },
    );
    extend_persistent(env, &key);
    Ok(())
}

pub fn spend_allowance(
    env: &Env,
    from: &Address,
    spender: &Address,
    amount: i128,
) -> Result<(), ContractError> {
    let current = load_allowance(env, from, spender);
    if current.amount < amount {
        return Err(ContractError::InsufficientAllowance);
    }
    if amount > 0 {
        env.storage().persistent().set(
            &(ALLOWANCE, from.clone(), spender.clone()),
            &AllowanceValue {
                amount: current.amount - amount,
                expiration_ledger: current.expiration_ledger,
            },
        );
    }
    Ok(())
}
