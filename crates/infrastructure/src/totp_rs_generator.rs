//! TOTP generation backed by the `totp-rs` crate.

use authega_application::TotpGenerator;
use authega_core::{MfaError, MfaResult};
use authega_domain::{TotpAlgorithm, TotpParameters};
use totp_rs::{Algorithm, Secret, TOTP};

/// RFC 6238 code generator.
///
/// Stateless: every call decodes the secret and evaluates the counter
/// for the supplied timestamp, so concurrent use needs no coordination.
#[derive(Debug, Clone, Copy, Default)]
pub struct TotpRsGenerator;

impl TotpRsGenerator {
    /// Creates a generator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TotpGenerator for TotpRsGenerator {
    fn generate_at(&self, params: &TotpParameters, timestamp: u64) -> MfaResult<String> {
        let secret = Secret::Encoded(params.secret.clone())
            .to_bytes()
            .map_err(|error| {
                MfaError::Validation(format!("invalid base32 TOTP secret: {error:?}"))
            })?;

        // Providers issue secrets shorter than the RFC 4226 minimum, so
        // the constructor's hardening checks must not apply here.
        let totp = TOTP::new_unchecked(
            algorithm(params.algorithm),
            params.digits as usize,
            1,
            params.period,
            secret,
        );

        Ok(totp.generate(timestamp))
    }
}

fn algorithm(value: TotpAlgorithm) -> Algorithm {
    match value {
        TotpAlgorithm::Sha1 => Algorithm::SHA1,
        TotpAlgorithm::Sha256 => Algorithm::SHA256,
        TotpAlgorithm::Sha512 => Algorithm::SHA512,
    }
}

#[cfg(test)]
mod tests {
    use authega_application::TotpGenerator;
    use authega_core::{MfaError, MfaResult};
    use authega_domain::{TotpAlgorithm, TotpParameters};

    use super::TotpRsGenerator;

    /// Base32 of the RFC 6238 reference secret `12345678901234567890`.
    const RFC_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    fn params(algorithm: TotpAlgorithm, digits: u32) -> TotpParameters {
        TotpParameters {
            secret: RFC_SECRET.to_owned(),
            algorithm,
            digits,
            period: 30,
        }
    }

    #[test]
    fn matches_the_rfc_6238_sha1_reference_vectors() -> MfaResult<()> {
        let generator = TotpRsGenerator::new();
        let reference = [
            (59_u64, "94287082"),
            (1_111_111_109, "07081804"),
            (1_111_111_111, "14050471"),
            (1_234_567_890, "89005924"),
            (2_000_000_000, "69279037"),
            (20_000_000_000, "65353130"),
        ];

        for (timestamp, expected) in reference {
            let code = generator.generate_at(&params(TotpAlgorithm::Sha1, 8), timestamp)?;
            assert_eq!(code, expected, "timestamp {timestamp}");
        }
        Ok(())
    }

    #[test]
    fn six_digit_code_is_the_low_order_part_of_the_vector() -> MfaResult<()> {
        let generator = TotpRsGenerator::new();
        let code = generator.generate_at(&params(TotpAlgorithm::Sha1, 6), 59)?;
        assert_eq!(code, "287082");
        Ok(())
    }

    #[test]
    fn code_is_stable_within_a_period_and_changes_at_the_boundary() -> MfaResult<()> {
        let generator = TotpRsGenerator::new();
        let sha1 = params(TotpAlgorithm::Sha1, 8);

        // 1111111080..=1111111109 share counter 37037036.
        let window_start = generator.generate_at(&sha1, 1_111_111_080)?;
        let window_end = generator.generate_at(&sha1, 1_111_111_109)?;
        assert_eq!(window_start, "07081804");
        assert_eq!(window_end, "07081804");

        // 1111111110 opens the next counter window.
        let next_window = generator.generate_at(&sha1, 1_111_111_110)?;
        assert_eq!(next_window, "14050471");
        Ok(())
    }

    #[test]
    fn supports_sha256_and_sha512() -> MfaResult<()> {
        let generator = TotpRsGenerator::new();
        for algorithm in [TotpAlgorithm::Sha256, TotpAlgorithm::Sha512] {
            let code = generator.generate_at(&params(algorithm, 6), 59)?;
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
        Ok(())
    }

    #[test]
    fn accepts_secrets_shorter_than_the_rfc_4226_minimum() -> MfaResult<()> {
        let generator = TotpRsGenerator::new();
        let mut short = params(TotpAlgorithm::Sha1, 6);
        // 16 base32 characters decode to 10 bytes, 80 bits.
        short.secret = "JBSWY3DPEHPK3PXP".to_owned();

        let code = generator.generate_at(&short, 59)?;
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
        Ok(())
    }

    #[test]
    fn rejects_a_secret_that_is_not_base32() {
        let generator = TotpRsGenerator::new();
        let mut bad = params(TotpAlgorithm::Sha1, 6);
        bad.secret = "not-base32!!".to_owned();

        let result = generator.generate_at(&bad, 59);
        assert!(matches!(result, Err(MfaError::Validation(_))));
    }
}
