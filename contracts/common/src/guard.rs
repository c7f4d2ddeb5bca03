use soroban_sdk::{symbol_short, Env, Symbol};

const ENTERED: Symbol = symbol_short!("ENTERED");

/// Marks the current contract as executing a guarded entry point.
///
/// The flag lives in instance storage and is cleared when the guard drops.
/// A failed call reverts the flag together with every other write.
pub struct ReentrancyGuard<'a> {
    env: &'a Env,
}

impl<'a> ReentrancyGuard<'a> {
    /// Returns `None` when a guarded entry point of this contract is already
    /// on the stack.
    pub fn enter(env: &'a Env) -> Option<Self> {
        if env.storage().instance().has(&ENTERED) {
            return None;
        }
        env.storage().instance().set(&ENTERED, &true);
        Some(Self { env })
    }
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        self.env.storage().instance().remove(&ENTERED);
    }
}
