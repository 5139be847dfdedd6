use serde::{Deserialize, Serialize};

/// Cardinality of an association end or attribute
///
/// `upper == None` means unbounded (`*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Multiplicity {
    pub lower: u32,
    pub upper: Option<u32>,
}

impl Multiplicity {
    /// `[1]`
    pub const ONE: Multiplicity = Multiplicity {
        lower: 1,
        upper: Some(1),
    };
    /// `[0..1]`
    pub const OPTIONAL: Multiplicity = Multiplicity {
        lower: 0,
        upper: Some(1),
    };
    /// `[0..*]`
    pub const MANY: Multiplicity = Multiplicity {
        lower: 0,
        upper: None,
    };

    pub fn new(lower: u32, upper: Option<u32>) -> Self {
        Self { lower, upper }
    }

    /// An item with lower bound 0 may be absent from an instance document
    pub fn is_optional(&self) -> bool {
        self.lower == 0
    }
}

impl Default for Multiplicity {
    fn default() -> Self {
        Self::ONE
    }
}

impl std::fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.upper {
            Some(upper) if upper == self.lower => write!(f, "[{}]", self.lower),
            Some(upper) => write!(f, "[{}..{}]", self.lower, upper),
            None => write!(f, "[{}..*]", self.lower),
        }
    }
}
