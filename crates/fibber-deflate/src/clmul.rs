//! Carryless (GF(2) polynomial) 64×64→128 multiplication.
//!
//! Hardware paths use `PCLMULQDQ` on x86_64 and `PMULL` on aarch64, selected
//! once at startup. The bit-serial fallback is behaviorally identical, only
//! slower; an equality test pins the paths together so codec correctness can
//! never depend on which one is active.

#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
use std::sync::LazyLock;

#[cfg(target_arch = "x86_64")]
static HAS_CLMUL: LazyLock<bool> =
    LazyLock::new(|| is_x86_feature_detected!("pclmulqdq") && is_x86_feature_detected!("sse4.1"));

#[cfg(target_arch = "aarch64")]
static HAS_CLMUL: LazyLock<bool> =
    LazyLock::new(|| std::arch::is_aarch64_feature_detected!("aes"));

/// Whether a hardware carryless multiply was detected.
#[inline]
pub fn available() -> bool {
    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    {
        *HAS_CLMUL
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        false
    }
}

/// Multiply `x` and `y` as polynomials over GF(2).
#[inline]
pub fn clmul64(x: u64, y: u64) -> u128 {
    #[cfg(target_arch = "x86_64")]
    {
        if *HAS_CLMUL {
            // Safety: the pclmulqdq/sse4.1 probe above succeeded.
            return unsafe { clmul64_pclmul(x, y) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if *HAS_CLMUL {
            // Safety: the aes feature probe above succeeded.
            return unsafe { clmul64_pmull(x, y) };
        }
    }

    clmul64_portable(x, y)
}

/// Bit-serial reference implementation.
pub fn clmul64_portable(x: u64, y: u64) -> u128 {
    let mut r: u128 = 0;
    let x = x as u128;
    let mut y = y;
    while y != 0 {
        let bit = y.trailing_zeros();
        r ^= x << bit;
        y &= y - 1;
    }
    r
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "pclmulqdq,sse4.1")]
unsafe fn clmul64_pclmul(x: u64, y: u64) -> u128 {
    use std::arch::x86_64::*;
    unsafe {
        let a = _mm_cvtsi64_si128(x as i64);
        let b = _mm_cvtsi64_si128(y as i64);
        let r = _mm_clmulepi64_si128::<0x00>(a, b);
        let lo = _mm_cvtsi128_si64(r) as u64;
        let hi = _mm_extract_epi64::<1>(r) as u64;
        ((hi as u128) << 64) | lo as u128
    }
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon,aes")]
unsafe fn clmul64_pmull(x: u64, y: u64) -> u128 {
    use std::arch::aarch64::*;
    unsafe { vmull_p64(x, y) }
}
