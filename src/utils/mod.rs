pub mod policy_cache;
