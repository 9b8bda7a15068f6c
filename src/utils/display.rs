//! Utilities related to displaying things.

use std::fmt;

use num_format::Locale;
use num_format::ToFormattedString;

/// Formats a count with thousands separators, e.g. `4004647` becomes
/// `4,004,647`.
pub fn thousands(count: u64) -> String {
    count.to_formatted_string(&Locale::en)
}

/// Utility struct for displaying percentages. The first item in the struct is
/// the percentage and the second item is the number of decimal places.
pub struct PercentageFormat(pub f64, pub usize);

impl fmt::Display for PercentageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*}%", self.1, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(4004647), "4,004,647");
    }

    #[test]
    fn test_percentage_format() {
        assert_eq!(PercentageFormat(65.4321, 1).to_string(), "65.4%");
        assert_eq!(PercentageFormat(12.34, 2).to_string(), "12.34%");
        assert_eq!(PercentageFormat(0.0, 2).to_string(), "0.00%");
    }
}
