//! Conversion of human-readable magnitudes into numbers.
//!
//! Tools such as `df -h` and `free -h` print sizes like `227G`, `2.0Gi`,
//! `290M` or `0B`, and percentages like `20%`. Depending on locale the decimal
//! separator may be a comma (`2,5G`). [`normalize`] turns any of these into a
//! plain `f64` (bytes, or percentage points for `%` tokens).
//!
//! The conversion is total: empty or unrecognized input yields `0.0`. Callers
//! rely on this to do arithmetic (`total = used + available`) without
//! handling errors.

/// Multiplier used for suffixes written without an `i` (`K`, `M`, `G`, ...).
///
/// Suffixes with an `i` (`Ki`, `Mi`, ...) are always powers of 1024.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnitBase {
    /// `G` means 1024^3. This is what `df -h` and `free -h` print.
    #[default]
    Binary,
    /// `G` means 1000^3, as printed by `df -H`.
    Si,
}

impl UnitBase {
    fn factor(self) -> f64 {
        match self {
            UnitBase::Binary => 1024.0,
            UnitBase::Si => 1000.0,
        }
    }
}

/// A classified magnitude token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Magnitude {
    /// Size with a unit suffix, already scaled to bytes.
    Bytes(f64),
    /// `<n>%`, in percentage points.
    Percent(f64),
    /// Bare number without suffix.
    Plain(f64),
    /// Empty or unrecognized.
    Invalid,
}

impl Magnitude {
    /// Numeric value; `0.0` for [`Magnitude::Invalid`].
    pub fn value(self) -> f64 {
        match self {
            Magnitude::Bytes(v) | Magnitude::Percent(v) | Magnitude::Plain(v) => v,
            Magnitude::Invalid => 0.0,
        }
    }
}

/// Normalizes a magnitude token using [`UnitBase::Binary`].
///
/// ```
/// use hostaudit::normalize::normalize;
///
/// assert_eq!(normalize("1.5K"), 1536.0);
/// assert_eq!(normalize("2Gi"), 2.0 * 1024.0 * 1024.0 * 1024.0);
/// assert_eq!(normalize("20%"), 20.0);
/// assert_eq!(normalize("2,5M"), 2.5 * 1024.0 * 1024.0);
/// assert_eq!(normalize(""), 0.0);
/// assert_eq!(normalize("n/a"), 0.0);
/// ```
pub fn normalize(token: &str) -> f64 {
    parse_magnitude(token, UnitBase::Binary).value()
}

/// Normalizes a magnitude token with an explicit base for `K`/`M`/`G`/`T`/`P`.
pub fn normalize_with(token: &str, base: UnitBase) -> f64 {
    parse_magnitude(token, base).value()
}

/// Classifies a magnitude token.
///
/// Accepted forms (case-insensitive suffix, optional space before it):
/// `<n>`, `<n>%`, `<n>B`, `<n>K`, `<n>KB`, `<n>Ki`, `<n>KiB` and the same for
/// `M`, `G`, `T`, `P`. `<n>` is digits with an optional `.` or `,` decimal
/// separator.
pub fn parse_magnitude(token: &str, base: UnitBase) -> Magnitude {
    let token = token.trim().replace(',', ".");
    if token.is_empty() {
        return Magnitude::Invalid;
    }

    let split = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(token.len());
    let (number, suffix) = token.split_at(split);
    if number.is_empty() {
        return Magnitude::Invalid;
    }
    let number = match number.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => return Magnitude::Invalid,
    };

    match suffix.trim_start() {
        "" => Magnitude::Plain(number),
        "%" => Magnitude::Percent(number),
        unit => match unit_multiplier(unit, base).map(|m| number * m) {
            Some(bytes) if bytes.is_finite() => Magnitude::Bytes(bytes),
            _ => Magnitude::Invalid,
        },
    }
}

fn unit_multiplier(unit: &str, base: UnitBase) -> Option<f64> {
    let unit = unit.to_ascii_uppercase();
    if unit == "B" {
        return Some(1.0);
    }

    let mut chars = unit.chars();
    let exponent = match chars.next()? {
        'K' => 1,
        'M' => 2,
        'G' => 3,
        'T' => 4,
        'P' => 5,
        _ => return None,
    };
    let factor = match chars.as_str() {
        "" | "B" => base.factor(),
        "I" | "IB" => 1024.0,
        _ => return None,
    };
    Some(factor.powi(exponent))
}
