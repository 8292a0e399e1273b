/// Result type used across the seeder for everything that is not a client invocation. Client
/// failures are reported as [crate::error::ProcessFailure] and can be recovered from the error
/// chain with `downcast_ref`.
pub type SeedResult<T> = anyhow::Result<T>;
