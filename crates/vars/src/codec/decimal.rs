//! Arbitrary-precision decimal.
//!
//! A [`Decimal`] is an exact fixed-point number `mantissa / 10^scale`. The
//! mantissa is stored little-endian in base 10,000,000 limbs (seven decimal
//! digits each) and is kept normalized: no high zero limbs and no trailing
//! decimal zeros, so the digit string read from the most significant end is
//! the significant digits of the number.
//!
//! Multiplying and dividing by powers of two ([`Decimal::shift`]) is exact,
//! which is what float formatting needs to produce correctly rounded digits.
//!
//! ```rust
//! use sdk_vars::codec::Decimal;
//!
//! let mut d = Decimal::from_u64(12_345_678);
//! d.shift(-8);
//! assert_eq!(d.to_string(), "48225.3046875");
//! d.round(5);
//! assert_eq!(d.to_string(), "48225");
//! ```

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use super::{lower, underscore_ok};
use crate::error::ValueError;

const BASE: u32 = 10_000_000;
const BASE64: u64 = BASE as u64;
const LIMB_DIGITS: usize = 7;
const POW10: [u32; 8] = [
    1, 10, 100, 1_000, 10_000, 100_000, 1_000_000, 10_000_000,
];

/// Largest left shift applied in one limb pass; `(BASE - 1) << 31` fits in u64.
const MAX_LEFT_SHIFT: i32 = 31;
/// 5^13 is the largest power of five below 2^31.
const MAX_RIGHT_SHIFT: u32 = 13;

/// Significant digits retained when reading text; the rest only set the
/// truncation flag.
pub(crate) const MAX_DIGITS: usize = 800;

/// Bit layout of an IEEE binary float.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FloatInfo {
    pub(crate) mantbits: u32,
    pub(crate) expbits: u32,
    pub(crate) bias: i32,
}

pub(crate) const F32_INFO: FloatInfo = FloatInfo {
    mantbits: 23,
    expbits: 8,
    bias: -127,
};

pub(crate) const F64_INFO: FloatInfo = FloatInfo {
    mantbits: 52,
    expbits: 11,
    bias: -1023,
};

/// Exact decimal number.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Decimal {
    limbs: Vec<u32>,
    scale: i32,
    neg: bool,
    trunc: bool,
}

impl Decimal {
    /// Zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_u64(v: u64) -> Self {
        let mut d = Self::new();
        d.assign(v);
        d
    }

    /// Replace the value with `v`, clearing the sign and truncation flags.
    pub fn assign(&mut self, mut v: u64) {
        self.limbs.clear();
        self.scale = 0;
        self.neg = false;
        self.trunc = false;
        while v > 0 {
            self.limbs.push((v % BASE64) as u32);
            v /= BASE64;
        }
        self.normalize();
    }

    pub fn is_zero(&self) -> bool {
        self.limbs.is_empty()
    }

    pub fn is_negative(&self) -> bool {
        self.neg
    }

    pub fn set_negative(&mut self, neg: bool) {
        self.neg = neg;
    }

    /// True when digits were discarded while reading text, so the stored
    /// value sits slightly below the true magnitude.
    pub fn is_truncated(&self) -> bool {
        self.trunc
    }

    /// Number of significant digits; `0` for zero.
    pub fn num_digits(&self) -> usize {
        match self.limbs.last() {
            None => 0,
            Some(&top) => (self.limbs.len() - 1) * LIMB_DIGITS + limb_digits(top),
        }
    }

    /// Position of the decimal point relative to the first significant
    /// digit: the value is `0.d₀d₁d₂… × 10^decimal_point`.
    pub fn decimal_point(&self) -> i32 {
        self.num_digits() as i32 - self.scale
    }

    /// Significant digit `i` counted from the most significant end, `0`
    /// past the end.
    pub fn digit(&self, i: usize) -> u8 {
        let total = self.num_digits();
        if i >= total {
            return 0;
        }
        let pos = total - 1 - i;
        let limb = self.limbs[pos / LIMB_DIGITS];
        ((limb / POW10[pos % LIMB_DIGITS]) % 10) as u8
    }

    /// Significant digits as ASCII.
    pub fn digits(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.num_digits());
        if let Some((&top, rest)) = self.limbs.split_last() {
            push_limb(&mut out, top, limb_digits(top));
            for &limb in rest.iter().rev() {
                push_limb(&mut out, limb, LIMB_DIGITS);
            }
        }
        out
    }

    /// Multiply by `2^k` (`k > 0`) or divide by `2^-k` (`k < 0`). Exact.
    pub fn shift(&mut self, k: i32) {
        if self.limbs.is_empty() || k == 0 {
            return;
        }
        if k > 0 {
            let mut left = k;
            while left > 0 {
                let c = left.min(MAX_LEFT_SHIFT);
                self.mul_small(1u64 << c);
                left -= c;
            }
        } else {
            // x / 2^n == x * 5^n / 10^n
            let n = k.unsigned_abs();
            self.scale += n as i32;
            let mut left = n;
            while left > 0 {
                let c = left.min(MAX_RIGHT_SHIFT);
                self.mul_small(5u64.pow(c));
                left -= c;
            }
        }
        self.normalize();
    }

    /// Round to `nd` significant digits, ties to even. A truncated value
    /// never sits on an exact tie and rounds up.
    pub fn round(&mut self, nd: i32) {
        if self.out_of_digits(nd) {
            return;
        }
        if self.should_round_up(nd) {
            self.round_up(nd);
        } else {
            self.round_down(nd);
        }
    }

    /// Truncate to `nd` significant digits.
    pub fn round_down(&mut self, nd: i32) {
        if self.out_of_digits(nd) {
            return;
        }
        let drop = self.num_digits() - nd as usize;
        self.drop_digits(drop);
    }

    /// Truncate to `nd` significant digits and add one unit in the last
    /// kept place.
    pub fn round_up(&mut self, nd: i32) {
        if self.out_of_digits(nd) {
            return;
        }
        let dp = self.decimal_point();
        let drop = self.num_digits() - nd as usize;
        self.drop_digits(drop);

        let unit_scale = nd - dp;
        if self.limbs.is_empty() {
            self.limbs.push(1);
            self.scale = unit_scale;
        } else {
            if self.scale < unit_scale {
                self.mul_pow10((unit_scale - self.scale) as usize);
                self.scale = unit_scale;
            }
            self.add_one();
        }
        self.normalize();
    }

    /// Integer part rounded half to even, or `u64::MAX` when the value has
    /// more than twenty integer digits.
    pub fn rounded_integer(&self) -> u64 {
        let dp = self.decimal_point();
        if dp > 20 {
            return u64::MAX;
        }
        let mut n = 0u64;
        for i in 0..dp.max(0) as usize {
            n = n.wrapping_mul(10).wrapping_add(u64::from(self.digit(i)));
        }
        if self.should_round_up(dp) {
            n = n.wrapping_add(1);
        }
        n
    }

    fn out_of_digits(&self, nd: i32) -> bool {
        nd < 0 || nd as usize >= self.num_digits()
    }

    fn should_round_up(&self, nd: i32) -> bool {
        if self.out_of_digits(nd) {
            return false;
        }
        let n = nd as usize;
        let d = self.digit(n);
        if d == 5 && n + 1 == self.num_digits() {
            return self.trunc || (n > 0 && self.digit(n - 1) % 2 == 1);
        }
        d >= 5
    }

    /// Read a decimal literal (`[+-]digits[.digits][e[+-]digits]`, `_`
    /// separators skipped). Returns `false` on malformed input.
    pub(crate) fn set(&mut self, s: &str) -> bool {
        *self = Self::default();
        let b = s.as_bytes();
        let mut i = 0;

        match b.first() {
            None => return false,
            Some(b'+') => i += 1,
            Some(b'-') => {
                self.neg = true;
                i += 1;
            }
            Some(_) => {}
        }

        let mut kept: Vec<u8> = Vec::new();
        let mut nd: i64 = 0;
        let mut dp: i64 = 0;
        let mut saw_dot = false;
        let mut saw_digits = false;
        while i < b.len() {
            match b[i] {
                b'_' => {}
                b'.' => {
                    if saw_dot {
                        return false;
                    }
                    saw_dot = true;
                    dp = nd;
                }
                c @ b'0'..=b'9' => {
                    saw_digits = true;
                    if c == b'0' && nd == 0 {
                        dp -= 1;
                    } else {
                        nd += 1;
                        if kept.len() < MAX_DIGITS {
                            kept.push(c - b'0');
                        } else if c != b'0' {
                            self.trunc = true;
                        }
                    }
                }
                _ => break,
            }
            i += 1;
        }
        if !saw_digits {
            return false;
        }
        if !saw_dot {
            dp = nd;
        }

        if i < b.len() && lower(b[i]) == b'e' {
            i += 1;
            let mut esign = 1;
            match b.get(i) {
                Some(b'+') => i += 1,
                Some(b'-') => {
                    i += 1;
                    esign = -1;
                }
                _ => {}
            }
            if !b.get(i).is_some_and(u8::is_ascii_digit) {
                return false;
            }
            let mut e: i64 = 0;
            while i < b.len() && (b[i].is_ascii_digit() || b[i] == b'_') {
                // Huge exponents only need to push the point far enough.
                if b[i] != b'_' && e < 10_000 {
                    e = e * 10 + i64::from(b[i] - b'0');
                }
                i += 1;
            }
            dp += e * esign;
        }

        if i != b.len() {
            return false;
        }

        self.limbs = kept
            .rchunks(LIMB_DIGITS)
            .map(|chunk| chunk.iter().fold(0u32, |acc, &d| acc * 10 + u32::from(d)))
            .collect();
        self.scale = (kept.len() as i64 - dp) as i32;
        self.normalize();
        true
    }

    /// Nearest binary float with layout `flt`, as raw bits. The flag is set
    /// when the magnitude overflowed to infinity.
    pub(crate) fn float_bits(&mut self, flt: FloatInfo) -> (u64, bool) {
        const POWTAB: [i32; 9] = [1, 3, 6, 9, 13, 16, 19, 23, 26];

        let exp_mask = (1i32 << flt.expbits) - 1;
        let mut overflow = false;

        let (mant, exp) = 'bits: {
            if self.is_zero() {
                break 'bits (0, flt.bias);
            }
            // Bounds for 64-bit floats; f32 overflows later on the exponent check.
            if self.decimal_point() > 310 {
                overflow = true;
                break 'bits (0, exp_mask + flt.bias);
            }
            if self.decimal_point() < -330 {
                break 'bits (0, flt.bias);
            }

            // Scale into [0.5, 1).
            let mut exp = 0i32;
            while self.decimal_point() > 0 {
                let n = POWTAB
                    .get(self.decimal_point() as usize)
                    .copied()
                    .unwrap_or(27);
                self.shift(-n);
                exp += n;
            }
            while self.decimal_point() < 0 || (self.decimal_point() == 0 && self.digit(0) < 5) {
                let n = POWTAB
                    .get(self.decimal_point().unsigned_abs() as usize)
                    .copied()
                    .unwrap_or(27);
                self.shift(n);
                exp -= n;
            }

            // [0.5, 1) to [1, 2).
            exp -= 1;

            if exp < flt.bias + 1 {
                let n = flt.bias + 1 - exp;
                self.shift(-n);
                exp += n;
            }

            if exp - flt.bias >= exp_mask {
                overflow = true;
                break 'bits (0, exp_mask + flt.bias);
            }

            self.shift(1 + flt.mantbits as i32);
            let mut mant = self.rounded_integer();

            // Rounding carried into a new top bit.
            if mant == 2u64 << flt.mantbits {
                mant >>= 1;
                exp += 1;
                if exp - flt.bias >= exp_mask {
                    overflow = true;
                    break 'bits (0, exp_mask + flt.bias);
                }
            }

            if mant & (1u64 << flt.mantbits) == 0 {
                exp = flt.bias;
            }
            (mant, exp)
        };

        let mut bits = mant & ((1u64 << flt.mantbits) - 1);
        bits |= (((exp - flt.bias) & exp_mask) as u64) << flt.mantbits;
        if self.neg {
            bits |= 1u64 << flt.mantbits << flt.expbits;
        }
        (bits, overflow)
    }

    fn mul_small(&mut self, m: u64) {
        let mut carry = 0u64;
        for limb in &mut self.limbs {
            let t = u64::from(*limb) * m + carry;
            *limb = (t % BASE64) as u32;
            carry = t / BASE64;
        }
        while carry > 0 {
            self.limbs.push((carry % BASE64) as u32);
            carry /= BASE64;
        }
    }

    fn div_small(&mut self, m: u32) {
        let m = u64::from(m);
        let mut rem = 0u64;
        for limb in self.limbs.iter_mut().rev() {
            let cur = rem * BASE64 + u64::from(*limb);
            *limb = (cur / m) as u32;
            rem = cur % m;
        }
        self.trim_high();
    }

    fn mul_pow10(&mut self, k: usize) {
        let whole = k / LIMB_DIGITS;
        if whole > 0 {
            self.limbs.splice(0..0, std::iter::repeat_n(0, whole));
        }
        let rest = k % LIMB_DIGITS;
        if rest > 0 {
            self.mul_small(u64::from(POW10[rest]));
        }
    }

    fn add_one(&mut self) {
        for limb in &mut self.limbs {
            *limb += 1;
            if *limb < BASE {
                return;
            }
            *limb = 0;
        }
        self.limbs.push(1);
    }

    /// Discard the `k` least significant digits of the mantissa.
    fn drop_digits(&mut self, k: usize) {
        let whole = k / LIMB_DIGITS;
        if whole >= self.limbs.len() {
            self.limbs.clear();
        } else {
            self.limbs.drain(..whole);
            let rest = k % LIMB_DIGITS;
            if rest > 0 {
                self.div_small(POW10[rest]);
            }
        }
        self.scale -= k as i32;
        self.normalize();
    }

    fn trim_high(&mut self) {
        while self.limbs.last() == Some(&0) {
            self.limbs.pop();
        }
    }

    fn normalize(&mut self) {
        self.trim_high();
        if self.limbs.is_empty() {
            self.scale = 0;
            return;
        }
        let zero_limbs = self.limbs.iter().take_while(|&&l| l == 0).count();
        if zero_limbs > 0 {
            self.limbs.drain(..zero_limbs);
            self.scale -= (zero_limbs * LIMB_DIGITS) as i32;
        }
        let mut low = self.limbs[0];
        let mut tz = 0;
        while low % 10 == 0 {
            low /= 10;
            tz += 1;
        }
        if tz > 0 {
            self.div_small(POW10[tz]);
            self.scale -= tz as i32;
        }
    }
}

/// Decimal digits in a non-zero limb.
fn limb_digits(limb: u32) -> usize {
    POW10[1..]
        .iter()
        .position(|&p| limb < p)
        .map_or(LIMB_DIGITS, |i| i + 1)
}

fn push_limb(out: &mut Vec<u8>, limb: u32, width: usize) {
    for k in (0..width).rev() {
        out.push(b'0' + ((limb / POW10[k]) % 10) as u8);
    }
}

impl Display for Decimal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        let digits = self.digits();
        let nd = digits.len() as i32;
        let dp = self.decimal_point();

        let mut out = String::with_capacity(digits.len() + dp.unsigned_abs() as usize + 3);
        if self.neg {
            out.push('-');
        }
        let ascii = |bytes: &[u8], out: &mut String| out.extend(bytes.iter().map(|&b| char::from(b)));
        if dp <= 0 {
            out.push_str("0.");
            out.extend(std::iter::repeat_n('0', dp.unsigned_abs() as usize));
            ascii(&digits, &mut out);
        } else if dp < nd {
            ascii(&digits[..dp as usize], &mut out);
            out.push('.');
            ascii(&digits[dp as usize..], &mut out);
        } else {
            ascii(&digits, &mut out);
            out.extend(std::iter::repeat_n('0', (dp - nd) as usize));
        }
        f.write_str(&out)
    }
}

impl FromStr for Decimal {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut d = Self::new();
        if !d.set(s) || (s.contains('_') && !underscore_ok(s)) {
            return Err(ValueError::syntax("parse_decimal", s));
        }
        Ok(d)
    }
}
