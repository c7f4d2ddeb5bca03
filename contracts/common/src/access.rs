use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol, Vec};

use crate::storage::extend_persistent;

// ── Storage Keys ─────────────────────────────────────────────────────────────

const GOV: Symbol = symbol_short!("GOV");
const CAPS_PREFIX: Symbol = symbol_short!("CAPS");
const HANDLERS: Symbol = symbol_short!("HANDLERS");

// ── Capability Enum ──────────────────────────────────────────────────────────

/// Rights a non-governance principal (usually another contract) may hold on a
/// component.
///
/// - `StakeForOthers`      – stake or unstake on behalf of another account.
/// - `ClaimForOthers`      – claim rewards or vested tokens for another
///                           account and send them to any receiver.
/// - `TransferWhenPrivate` – move share balances while private transfer mode
///                           is on, and skip allowance checks.
/// - `MigrateAccounts`     – rewrite vesting history during account migration.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Capability {
    StakeForOthers = 1,
    ClaimForOthers = 2,
    TransferWhenPrivate = 4,
    MigrateAccounts = 8,
}

impl Capability {
    /// Bit used for this capability in the stored mask.
    pub fn bit(&self) -> u32 {
        *self as u32
    }
}

// ── Storage Helpers ──────────────────────────────────────────────────────────

fn caps_key(principal: &Address) -> (Symbol, Address) {
    (CAPS_PREFIX, principal.clone())
}

// ── Governance ───────────────────────────────────────────────────────────────

/// Stores the governance address. Callers verify authorisation beforehand.
pub fn set_gov(env: &Env, gov: &Address) {
    env.storage().instance().set(&GOV, gov);
}

pub fn get_gov(env: &Env) -> Option<Address> {
    env.storage().instance().get(&GOV)
}

pub fn is_gov(env: &Env, caller: &Address) -> bool {
    matches!(get_gov(env), Some(gov) if gov == *caller)
}

// ── Capabilities ─────────────────────────────────────────────────────────────

/// Returns the capability mask held by `principal` (0 when none).
pub fn capabilities(env: &Env, principal: &Address) -> u32 {
    let key = caps_key(principal);
    let mask: Option<u32> = env.storage().persistent().get(&key);
    match mask {
        Some(mask) => {
            extend_persistent(env, &key);
            mask
        }
        None => 0,
    }
}

pub fn has_capability(env: &Env, principal: &Address, cap: Capability) -> bool {
    capabilities(env, principal) & cap.bit() != 0
}

/// Adds `cap` to the principal's mask. Callers must have checked governance.
pub fn grant(env: &Env, principal: &Address, cap: Capability) {
    let key = caps_key(principal);
    let mask = capabilities(env, principal) | cap.bit();
    env.storage().persistent().set(&key, &mask);
    extend_persistent(env, &key);
    track_handler(env, principal);
}

/// Removes `cap` from the principal's mask, dropping the entry once empty.
pub fn revoke(env: &Env, principal: &Address, cap: Capability) {
    let key = caps_key(principal);
    let mask = capabilities(env, principal) & !cap.bit();
    if mask == 0 {
        env.storage().persistent().remove(&key);
        untrack_handler(env, principal);
    } else {
        env.storage().persistent().set(&key, &mask);
        extend_persistent(env, &key);
    }
}

/// The single authorisation check used by every privileged entry point:
/// governance always passes, anyone else needs `cap`.
///
/// The caller must already have been authenticated via `require_auth()`.
pub fn authorize(env: &Env, caller: &Address, cap: Capability) -> bool {
    is_gov(env, caller) || has_capability(env, caller, cap)
}

// ── Handler Registry ─────────────────────────────────────────────────────────

/// Returns every principal currently holding at least one capability.
pub fn list_handlers(env: &Env) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&HANDLERS)
        .unwrap_or(Vec::new(env))
}

fn track_handler(env: &Env, principal: &Address) {
    let mut handlers = list_handlers(env);
    if !handlers.contains(principal) {
        handlers.push_back(principal.clone());
        env.storage().persistent().set(&HANDLERS, &handlers);
    }
}

fn untrack_handler(env: &Env, principal: &Address) {
    let handlers = list_handlers(env);
    let mut kept = Vec::new(env);
    for handler in handlers.iter() {
        if handler != *principal {
            kept.push_back(handler);
        }
    }
    env.storage().persistent().set(&HANDLERS, &kept);
}
