use soroban_sdk::{Env, IntoVal, Val};

/// Remaining-TTL threshold (in ledgers) below which entries are extended.
pub const TTL_THRESHOLD: u32 = 518_400;
/// TTL (in ledgers) entries are extended to.
pub const TTL_EXTEND_TO: u32 = 3_110_400;

pub fn extend_persistent<K>(env: &Env, key: &K)
where
    K: IntoVal<Env, Val>,
{
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn extend_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}
