//! Float formatting.
//!
//! Every conversion goes through the exact [`Decimal`] engine. With a
//! negative precision the output is the shortest digit string that reads
//! back to the same bits at the requested width.

use super::decimal::{F32_INFO, F64_INFO, FloatInfo};
use super::Decimal;

/// Output layout for [`format_float`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FloatFormat {
    /// `-d.dddde±dd`
    Exp,
    /// `-d.ddddE±dd`
    ExpUpper,
    /// `-ddd.dddd`
    Fixed,
    /// `Exp` for large or tiny exponents, `Fixed` otherwise.
    #[default]
    General,
    /// `ExpUpper` for large or tiny exponents, `Fixed` otherwise.
    GeneralUpper,
}

impl FloatFormat {
    const fn exp_char(self) -> u8 {
        match self {
            Self::ExpUpper | Self::GeneralUpper => b'E',
            _ => b'e',
        }
    }
}

/// Format `f` as text.
///
/// `prec` is the number of digits after the point for `Exp` and `Fixed`, or
/// the number of significant digits for `General`; `-1` selects the
/// shortest round-tripping form. `bits` is 32 or 64 and controls which
/// float width the digits must round-trip through.
pub fn format_float(f: f64, fmt: FloatFormat, prec: i32, bits: u32) -> String {
    let mut out = String::with_capacity(24);
    append_float(&mut out, f, fmt, prec, bits);
    out
}

/// Digits and point position copied out of a [`Decimal`].
struct Digits {
    d: Vec<u8>,
    dp: i32,
}

impl Digits {
    fn nd(&self) -> i32 {
        self.d.len() as i32
    }
}

pub(crate) fn append_float(dst: &mut String, f: f64, fmt: FloatFormat, prec: i32, bits: u32) {
    let (raw, flt) = if bits == 32 {
        (u64::from((f as f32).to_bits()), F32_INFO)
    } else {
        (f.to_bits(), F64_INFO)
    };

    let neg = raw >> (flt.expbits + flt.mantbits) != 0;
    let mut exp = ((raw >> flt.mantbits) & ((1u64 << flt.expbits) - 1)) as i32;
    let mut mant = raw & ((1u64 << flt.mantbits) - 1);

    if exp == (1 << flt.expbits) - 1 {
        dst.push_str(match (mant != 0, neg) {
            (true, _) => "NaN",
            (false, true) => "-Inf",
            (false, false) => "+Inf",
        });
        return;
    }
    if exp == 0 {
        // Denormal.
        exp += 1;
    } else {
        mant |= 1u64 << flt.mantbits;
    }
    exp += flt.bias;

    let mut d = Decimal::from_u64(mant);
    d.shift(exp - flt.mantbits as i32);

    let shortest = prec < 0;
    let mut prec = prec;
    if shortest {
        round_shortest(&mut d, mant, exp, flt);
        let digs = digits_of(&d);
        prec = match fmt {
            FloatFormat::Exp | FloatFormat::ExpUpper => digs.nd() - 1,
            FloatFormat::Fixed => (digs.nd() - digs.dp).max(0),
            FloatFormat::General | FloatFormat::GeneralUpper => digs.nd(),
        };
        format_digits(dst, shortest, neg, &digs, prec, fmt);
    } else {
        match fmt {
            FloatFormat::Exp | FloatFormat::ExpUpper => d.round(prec + 1),
            FloatFormat::Fixed => d.round(d.decimal_point() + prec),
            FloatFormat::General | FloatFormat::GeneralUpper => {
                if prec == 0 {
                    prec = 1;
                }
                d.round(prec);
            }
        }
        format_digits(dst, shortest, neg, &digits_of(&d), prec, fmt);
    }
}

fn digits_of(d: &Decimal) -> Digits {
    Digits {
        d: d.digits(),
        dp: if d.is_zero() { 0 } else { d.decimal_point() },
    }
}

/// Trim `d` to the fewest digits that still fall strictly inside the
/// rounding interval of the float `mant × 2^(exp - mantbits)`.
fn round_shortest(d: &mut Decimal, mant: u64, exp: i32, flt: FloatInfo) {
    if mant == 0 {
        *d = Decimal::new();
        return;
    }

    let minexp = flt.bias + 1;
    // Already shortest: the integer is exact and the float spacing above
    // it exceeds one decimal unit.
    let nd = d.num_digits() as i32;
    if exp > minexp && 332 * (d.decimal_point() - nd) >= 100 * (exp - flt.mantbits as i32) {
        return;
    }

    // Halfway to the next float up.
    let mut upper = Decimal::from_u64(mant * 2 + 1);
    upper.shift(exp - flt.mantbits as i32 - 1);

    // Halfway to the next float down; the spacing halves below a power of
    // two unless already at the minimum exponent.
    let (mantlo, explo) = if mant > 1 << flt.mantbits || exp == minexp {
        (mant - 1, exp)
    } else {
        (mant * 2 - 1, exp - 1)
    };
    let mut lower = Decimal::from_u64(mantlo * 2 + 1);
    lower.shift(explo - flt.mantbits as i32 - 1);

    // Bounds are reachable only when round-half-even would land on `mant`.
    let inclusive = mant % 2 == 0;

    let (ud, md, ld) = (upper.digits(), d.digits(), lower.digits());
    let (udp, mdp, ldp) = (
        upper.decimal_point(),
        d.decimal_point(),
        lower.decimal_point(),
    );
    let digit_at = |v: &[u8], i: i32| -> u8 {
        if i >= 0 && (i as usize) < v.len() {
            v[i as usize]
        } else {
            b'0'
        }
    };

    // 0: same digits so far; 1: upper ahead by exactly one followed by
    // 9s against 0s; 2: upper ahead by more.
    let mut upperdelta = 0u8;
    let mut ui: i32 = 0;
    loop {
        let mi = ui - udp + mdp;
        if mi >= md.len() as i32 {
            break;
        }
        let li = ui - udp + ldp;
        let l = digit_at(&ld, li);
        let m = digit_at(&md, mi);
        let u = digit_at(&ud, ui);

        let okdown = l != m || (inclusive && li + 1 == ld.len() as i32);

        if upperdelta == 0 && m + 1 < u {
            upperdelta = 2;
        } else if upperdelta == 0 && m != u {
            upperdelta = 1;
        } else if upperdelta == 1 && (m != b'9' || u != b'0') {
            upperdelta = 2;
        }
        let okup = upperdelta > 0 && (inclusive || upperdelta > 1 || ui + 1 < ud.len() as i32);

        match (okdown, okup) {
            (true, true) => return d.round(mi + 1),
            (true, false) => return d.round_down(mi + 1),
            (false, true) => return d.round_up(mi + 1),
            (false, false) => {}
        }
        ui += 1;
    }
}

fn format_digits(
    dst: &mut String,
    shortest: bool,
    neg: bool,
    digs: &Digits,
    prec: i32,
    fmt: FloatFormat,
) {
    match fmt {
        FloatFormat::Exp | FloatFormat::ExpUpper => fmt_e(dst, neg, digs, prec, fmt.exp_char()),
        FloatFormat::Fixed => fmt_f(dst, neg, digs, prec),
        FloatFormat::General | FloatFormat::GeneralUpper => {
            let mut prec = prec;
            let mut eprec = prec;
            if eprec > digs.nd() && digs.nd() >= digs.dp {
                eprec = digs.nd();
            }
            // Shortest output decides on the %e switch as if precision were 6.
            if shortest {
                eprec = 6;
            }
            let exp = digs.dp - 1;
            if exp < -4 || exp >= eprec {
                if prec > digs.nd() {
                    prec = digs.nd();
                }
                return fmt_e(dst, neg, digs, prec - 1, fmt.exp_char());
            }
            if prec > digs.dp {
                prec = digs.nd();
            }
            fmt_f(dst, neg, digs, (prec - digs.dp).max(0));
        }
    }
}

/// `-d.ddddde±dd`
fn fmt_e(dst: &mut String, neg: bool, d: &Digits, prec: i32, exp_char: u8) {
    if neg {
        dst.push('-');
    }

    dst.push(char::from(d.d.first().copied().unwrap_or(b'0')));

    if prec > 0 {
        dst.push('.');
        let mut i = 1;
        let m = d.nd().min(prec + 1);
        if i < m {
            push_ascii(dst, &d.d[i as usize..m as usize]);
            i = m;
        }
        while i <= prec {
            dst.push('0');
            i += 1;
        }
    }

    dst.push(char::from(exp_char));
    // Zero has exponent 0.
    let exp = if d.d.is_empty() { 0 } else { d.dp - 1 };
    dst.push(if exp < 0 { '-' } else { '+' });
    let exp = exp.unsigned_abs();
    if exp < 10 {
        dst.push('0');
        dst.push(digit_char(exp));
    } else if exp < 100 {
        dst.push(digit_char(exp / 10));
        dst.push(digit_char(exp % 10));
    } else {
        dst.push(digit_char(exp / 100));
        dst.push(digit_char((exp / 10) % 10));
        dst.push(digit_char(exp % 10));
    }
}

/// `-ddddddd.ddddd`
fn fmt_f(dst: &mut String, neg: bool, d: &Digits, prec: i32) {
    if neg {
        dst.push('-');
    }

    if d.dp > 0 {
        let m = d.nd().min(d.dp);
        push_ascii(dst, &d.d[..m as usize]);
        for _ in m..d.dp {
            dst.push('0');
        }
    } else {
        dst.push('0');
    }

    if prec > 0 {
        dst.push('.');
        for i in 1..=prec {
            let j = d.dp + i - 1;
            let ch = if 0 <= j && j < d.nd() { d.d[j as usize] } else { b'0' };
            dst.push(char::from(ch));
        }
    }
}

fn push_ascii(dst: &mut String, bytes: &[u8]) {
    dst.extend(bytes.iter().map(|&b| char::from(b)));
}

fn digit_char(n: u32) -> char {
    char::from(b'0' + n as u8)
}
