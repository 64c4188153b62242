//! Scaled numbers, units and glue.
//!
//! These are the numeric types shared by every part of the Boxworks engine.
//! All of them follow Knuth's definitions in TeX: The Program.

use std::fmt::Write;

/// Scaled numbers.
///
/// This is a fixed-width numeric type used in throughout TeX.
/// This type is defined and described in part 7 "arithmetic with scaled
/// dimensions" starting at TeX.2021.99.
///
/// This numeric type has 15 bits for the integer part,
/// 16 bits for the fractional part, and a single signed bit.
/// The inner value is the number multiplied by 2^16.
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scaled(pub i32);

impl Scaled {
    /// Representation of the number 0 as a [Scaled].
    pub const ZERO: Scaled = Scaled(0);

    /// Representation of the number 1 as a [Scaled].
    pub const ONE: Scaled = Scaled(1 << 16);

    /// Representation of the number 2 as a [Scaled].
    pub const TWO: Scaled = Scaled(1 << 17);

    /// Maximum possible dimension in TeX, which is (2^30-1)/2^16.
    ///
    /// This is _not_ the maximum size of the Rust scaled number type, which is (2^31-1)/2^16.
    ///
    /// Defined in TeX.2021.421.
    pub const MAX_DIMEN: Scaled = Scaled((1 << 30) - 1);

    /// Create a scaled number corresponding the provided integer.
    ///
    /// Scaled numbers are in the range `(-2^14, 2^14)`.
    /// If _i_ is outside this range an overflow error is returned.
    pub fn from_integer(i: i32) -> Result<Scaled, OverflowError> {
        if i >= (1 << 14) || i <= -(1 << 14) {
            Err(OverflowError)
        } else {
            Ok(Scaled(Scaled::ONE.0 * i))
        }
    }

    /// Creates a scaled number from the decimal digits of a fraction.
    ///
    /// The digits `[0, 7, 5]` correspond to the fraction `0.075`.
    /// Only the first 17 digits are significant.
    ///
    /// TeX.2021.102.
    pub fn from_decimal_digits(digits: &[u8]) -> Scaled {
        let mut a = 0;
        for d in digits.iter().take(17).rev() {
            a = (a + (*d as i32) * Scaled::TWO.0) / 10
        }
        Scaled((a + 1) / 2)
    }

    /// Creates a scaled number from an integer part, a fractional part and a unit.
    ///
    /// This is the conversion TeX performs when scanning a dimension like `2.5cm`.
    /// For scaled points the fractional part is silently dropped.
    ///
    /// TeX.2021.458.
    pub fn new(integer: i32, fractional: Scaled, unit: ScaledUnit) -> Result<Scaled, OverflowError> {
        let (integer, fractional) = match unit {
            ScaledUnit::ScaledPoint => {
                let s = Scaled(integer);
                return if s > Scaled::MAX_DIMEN {
                    Err(OverflowError)
                } else {
                    Ok(s)
                };
            }
            ScaledUnit::Point => (integer, fractional),
            _ => {
                let (n, d) = unit.conversion_fraction();
                let (i, remainder) = Scaled(integer).xn_over_d(n, d)?;
                let f = fractional.nx_plus_y(n, Scaled::from_integer(remainder.0)?)? / d;
                (i.0 + f.integer_part(), f.fractional_part())
            }
        };
        Ok(Scaled::from_integer(integer)? + fractional)
    }

    /// Calculates the integer division _xn_/_d_ and remainder, where _x_ is this scaled number
    /// and _n_ and _d_ are integers in the range `[0,2^16]`.
    ///
    /// This function appears in TeX.2021.107. Knuth is working with 32-bit integers
    /// and so calculating this number is tricky without overflowing. E.g. _xn_ may
    /// be larger than `2^32-1` even if the final result is in range.
    /// TeX has an algorithm that calculates the exact value without overflowing,
    /// in the case when the final result is in range.
    ///
    /// Our implementation simply uses 64-bit integers.
    pub fn xn_over_d(&self, n: i32, d: i32) -> Result<(Scaled, Scaled), OverflowError> {
        debug_assert!(n <= 0o200000);
        debug_assert!(d <= 0o200000);
        let mut b: i64 = self.0.into();
        b *= n as i64; // can't overflow because |b|<=2^31 and |n|<=2^16
        let remainder = b % (d as i64);
        b /= d as i64;
        if b < -(Scaled::MAX_DIMEN.0 as i64) || b > Scaled::MAX_DIMEN.0 as i64 {
            return Err(OverflowError);
        }
        // Both casts are lossless: |b| <= MAX_DIMEN and |remainder| < d <= 2^16.
        Ok((Scaled(b as i32), Scaled(remainder as i32)))
    }

    /// TeX.2021.105
    pub fn nx_plus_y(self, mut n: i32, y: Scaled) -> Result<Scaled, OverflowError> {
        let max_answer = Scaled::MAX_DIMEN;
        if n == 0 {
            return Ok(y);
        }
        let mut x = self;
        if n < 0 {
            n = -n;
            x = -x;
        }
        if x <= (max_answer - y) / n && -x <= (max_answer + y) / n {
            Ok(x * n + y)
        } else {
            Err(OverflowError)
        }
    }

    pub fn integer_part(self) -> i32 {
        self.0 / Scaled::ONE.0
    }

    pub fn fractional_part(self) -> Scaled {
        self % Scaled::ONE.0
    }

    pub fn abs(self) -> Scaled {
        Scaled(self.0.abs())
    }

    /// Writes the number the way TeX does, without the trailing `pt`.
    ///
    /// TeX.2021.103
    pub fn display_no_units(self, fm: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = self;
        if s < Scaled::ZERO {
            fm.write_char('-')?;
            s = -s;
        }
        write!(fm, "{}.", s.integer_part())?;
        let mut f = s.fractional_part() * 10 + Scaled(5);
        let mut delta = Scaled(10);
        loop {
            if delta > Scaled::ONE {
                // round the last digit
                f = f + Scaled(0o100000 - 50000);
            }
            let digit = b'0' + (f.integer_part() as u8);
            fm.write_char(digit as char)?;
            f = f.fractional_part() * 10;
            delta = delta * 10;
            if f <= delta {
                break;
            }
        }
        Ok(())
    }

    /// Returns a value that displays this number without units.
    pub fn no_units(self) -> NoUnits {
        NoUnits(self)
    }
}

/// Display adapter returned by [Scaled::no_units].
pub struct NoUnits(Scaled);

impl std::fmt::Display for NoUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.display_no_units(f)
    }
}

/// Error returned when an arithmetic operation leaves the range of TeX dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("arithmetic overflow: dimension too large")]
pub struct OverflowError;

impl std::fmt::Display for Scaled {
    // TeX.2021.103
    fn fmt(&self, fm: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.display_no_units(fm)?;
        write!(fm, "pt")
    }
}

// Addition, subtraction and multiplication saturate at the bounds of i32
// so that summing a very long list can't panic.
// Overflow past [Scaled::MAX_DIMEN] is left to the caller to report.
impl std::ops::Add<Scaled> for Scaled {
    type Output = Scaled;
    fn add(self, rhs: Scaled) -> Self::Output {
        Scaled(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::AddAssign<Scaled> for Scaled {
    fn add_assign(&mut self, rhs: Scaled) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl std::ops::Sub<Scaled> for Scaled {
    type Output = Scaled;
    fn sub(self, rhs: Scaled) -> Self::Output {
        Scaled(self.0.saturating_sub(rhs.0))
    }
}

impl std::ops::SubAssign<Scaled> for Scaled {
    fn sub_assign(&mut self, rhs: Scaled) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl std::ops::Mul<i32> for Scaled {
    type Output = Scaled;
    fn mul(self, rhs: i32) -> Self::Output {
        Scaled(self.0.saturating_mul(rhs))
    }
}

impl std::ops::Div<i32> for Scaled {
    type Output = Scaled;
    fn div(self, rhs: i32) -> Self::Output {
        Scaled(self.0 / rhs)
    }
}

impl std::ops::Rem<i32> for Scaled {
    type Output = Scaled;
    fn rem(self, rhs: i32) -> Self::Output {
        Scaled(self.0 % rhs)
    }
}

impl std::ops::Neg for Scaled {
    type Output = Scaled;
    fn neg(self) -> Self::Output {
        Scaled(self.0.saturating_neg())
    }
}

impl std::iter::Sum for Scaled {
    fn sum<I: Iterator<Item = Scaled>>(iter: I) -> Self {
        iter.fold(Scaled::ZERO, |a, b| a + b)
    }
}

/// Unit used to define a scaled integer
///
/// Defined in TeX.2021.458 and chapter 10 of the TeX book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaledUnit {
    Point,
    Pica,
    Inch,
    BigPoint,
    Centimeter,
    Millimeter,
    DidotPoint,
    Cicero,
    ScaledPoint,
}

impl ScaledUnit {
    /// Parses a unit from a two character abbreviation.
    ///
    /// E.g., `"pc"` is parsed to [`ScaledUnit::Pica`].
    /// These are abreviations are defined in TeX.2021.458 and chapter 10 of the TeX book.
    pub fn parse(s: &str) -> Option<Self> {
        use ScaledUnit::*;
        Some(match s {
            "pt" => Point,
            "pc" => Pica,
            "in" => Inch,
            "bp" => BigPoint,
            "cm" => Centimeter,
            "mm" => Millimeter,
            "dd" => DidotPoint,
            "cc" => Cicero,
            "sp" => ScaledPoint,
            _ => return None,
        })
    }

    /// Returns the fraction needed to convert to/from this unit to points.
    ///
    /// The return value is of the form (_n_, _d_).
    /// If a scaled number represents _x_ in these units (e.g. _x_ [`ScaledUnit::Pica`]),
    ///     then it is _y_=_nx_/_d_ points.
    ///
    /// Defined in TeX.2021.458.
    pub fn conversion_fraction(&self) -> (i32, i32) {
        use ScaledUnit::*;
        match self {
            Point => (1, 1),
            Pica => (12, 1),
            Inch => (7227, 100),
            BigPoint => (7227, 7200),
            Centimeter => (7227, 254),
            Millimeter => (7227, 2540),
            DidotPoint => (1238, 1157),
            Cicero => (14856, 1157),
            ScaledPoint => (1, 1 << 16),
        }
    }
}

/// Glue.
///
/// In Knuth's TeX this struct is not passed around directly; instead
/// Knuth essentially uses `std::rc::Rc<Glue>`.
/// Here glue is a small `Copy` value and is stored inline in nodes.
///
/// Described in TeX.2021.150.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Glue {
    pub width: Scaled,
    pub stretch: Scaled,
    pub stretch_order: GlueOrder,
    pub shrink: Scaled,
    pub shrink_order: GlueOrder,
}

impl Glue {
    /// Glue with the given natural width that neither stretches nor shrinks.
    pub fn fixed(width: Scaled) -> Glue {
        Glue {
            width,
            ..Default::default()
        }
    }

    /// Natural size of the glue, used when a list is measured without being set.
    pub fn natural(&self) -> Scaled {
        self.width
    }

    /// Returns true if all components of the glue are zero.
    pub fn is_zero(&self) -> bool {
        self.width == Scaled::ZERO && self.stretch == Scaled::ZERO && self.shrink == Scaled::ZERO
    }

    /// Writes the glue specification like TeX's `print_spec`.
    ///
    /// The `units` are printed after the width and after any finite stretch or shrink.
    ///
    /// TeX.2021.178
    pub fn display_spec(&self, f: &mut std::fmt::Formatter<'_>, units: &str) -> std::fmt::Result {
        write!(f, "{}{units}", self.width.no_units())?;
        if self.stretch != Scaled::ZERO {
            write!(f, " plus ")?;
            component(f, self.stretch, self.stretch_order, units)?;
        }
        if self.shrink != Scaled::ZERO {
            write!(f, " minus ")?;
            component(f, self.shrink, self.shrink_order, units)?;
        }
        Ok(())
    }
}

// TeX.2021.177
fn component(
    f: &mut std::fmt::Formatter<'_>,
    s: Scaled,
    order: GlueOrder,
    units: &str,
) -> std::fmt::Result {
    s.display_no_units(f)?;
    match order {
        GlueOrder::Normal => write!(f, "{units}"),
        _ => write!(f, "{order}"),
    }
}

impl std::fmt::Display for Glue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.display_spec(f, "pt")
    }
}

/// Order of infinity of a glue stretch or shrink.
///
/// When setting a list of boxes, TeX stretches or shrinks glue boxes.
/// In some cases it is desirable that TeX only stretches some subset of the
/// glue boxes.
/// For example, when setting centered text, TeX only stretches the two glue
/// boxes at each end of the list and leaves all other glue intact.
///
/// To achieve this, each glue stretch or shrink has an order of infinity.
/// If a list contains glue of some order (e.g. [GlueOrder::Fil]),
/// then glues of a lower order (e.g. [GlueOrder::Normal]) are not stretched
/// or shrunk.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum GlueOrder {
    #[default]
    Normal,
    Fil,
    Fill,
    Filll,
}

impl GlueOrder {
    /// Parses an infinite glue order from a keyword.
    pub fn parse(s: &str) -> Option<Self> {
        use GlueOrder::*;
        Some(match s {
            "fil" => Fil,
            "fill" => Fill,
            "filll" => Filll,
            _ => return None,
        })
    }
}

impl std::fmt::Display for GlueOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use GlueOrder::*;
        match self {
            Normal => Ok(()),
            Fil => write!(f, "fil"),
            Fill => write!(f, "fill"),
            Filll => write!(f, "filll"),
        }
    }
}
