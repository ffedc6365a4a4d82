//! Explicit rounding direction for fixed-point arithmetic.

/// Rounding direction of a division or fixed-point multiplication.
///
/// Every division in the router names its direction.  Amounts a pool pays
/// out round down; amounts a pool takes in round up, so the simulated
/// result never promises more than the pool would settle.
///
/// # Examples
///
/// ```
/// use smart_order_router::domain::Rounding;
///
/// let r = Rounding::Up;
/// assert!(r.is_up());
/// assert_eq!(r.opposite(), Rounding::Down);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Round towards positive infinity (ceiling).
    Up,
    /// Round towards zero (floor).
    Down,
}

impl Rounding {
    /// Returns `true` if this is [`Rounding::Up`].
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }

    /// Returns `true` if this is [`Rounding::Down`].
    #[must_use]
    pub const fn is_down(&self) -> bool {
        matches!(self, Self::Down)
    }

    /// The other direction.
    ///
    /// Dividing by a value rounded one way needs the quotient rounded the
    /// other way to stay conservative.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}
