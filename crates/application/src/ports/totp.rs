use authega_core::MfaResult;
use authega_domain::TotpParameters;

/// Port for RFC 6238 one-time code generation.
///
/// Pure computation: no I/O, no side effects, safe under arbitrary
/// concurrency. The returned code is a decimal string; callers pad to
/// the configured digit width before presenting it.
pub trait TotpGenerator: Send + Sync {
    /// Computes the code for `params` at `timestamp` seconds since the
    /// Unix epoch.
    fn generate_at(&self, params: &TotpParameters, timestamp: u64) -> MfaResult<String>;
}
