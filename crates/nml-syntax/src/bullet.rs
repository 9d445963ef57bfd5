/*
 * bullet.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! List bullets and counter formatting.

use serde::{Deserialize, Serialize};

/// Numbering scheme of an ordered bullet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumberingKind {
    /// `1`, `2`, `3`
    Number,
    /// `a`, `b`, `c`
    Alpha,
    /// `A`, `B`, `C`
    AlphaCapital,
    /// `i`, `ii`, `iii`
    Roman,
    /// `I`, `II`, `III`
    RomanCapital,
    /// Roman numerals where `i` is written as a dot: `•`, `••`, `•v`
    DotTally,
}

impl NumberingKind {
    /// Marker character that selects this kind in a bullet template
    pub fn marker(self) -> char {
        match self {
            NumberingKind::Number => '1',
            NumberingKind::Alpha => 'a',
            NumberingKind::AlphaCapital => 'A',
            NumberingKind::Roman => 'i',
            NumberingKind::RomanCapital => 'I',
            NumberingKind::DotTally => 'v',
        }
    }

    const ALL: [NumberingKind; 6] = [
        NumberingKind::Number,
        NumberingKind::Alpha,
        NumberingKind::AlphaCapital,
        NumberingKind::Roman,
        NumberingKind::RomanCapital,
        NumberingKind::DotTally,
    ];
}

/// An ordered bullet: `left` + formatted counter + `right`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedBullet {
    pub kind: NumberingKind,
    pub left: String,
    pub right: String,
}

const ROMAN_VALUES: [usize; 13] = [1000, 900, 500, 400, 100, 90, 50, 40, 10, 9, 5, 4, 1];
const ROMAN_LOWER: [&str; 13] = [
    "m", "cm", "d", "cd", "c", "xc", "l", "xl", "x", "ix", "v", "iv", "i",
];
const ROMAN_UPPER: [&str; 13] = [
    "M", "CM", "D", "CD", "C", "XC", "L", "XL", "X", "IX", "V", "IV", "I",
];
const DOT_TALLY: [&str; 13] = [
    "m", "cm", "d", "cd", "c", "xc", "l", "xl", "x", "•x", "v", "•v", "•",
];

fn roman(mut n: usize, symbols: &[&str; 13]) -> String {
    let mut result = String::new();
    for (value, symbol) in ROMAN_VALUES.iter().zip(symbols) {
        while n >= *value {
            result.push_str(symbol);
            n -= value;
        }
    }
    result
}

impl OrderedBullet {
    /// Parse a template such as `1.`, `(a)` or `I -`.
    ///
    /// The earliest marker character (`1 a A i I v`) decides the numbering
    /// kind; the text around it becomes the delimiters. Returns `None` when
    /// the template contains no marker.
    ///
    /// ```
    /// use nml_syntax::{NumberingKind, OrderedBullet};
    ///
    /// let bullet = OrderedBullet::from_template("(a)").unwrap();
    /// assert_eq!(bullet.kind, NumberingKind::Alpha);
    /// assert_eq!(bullet.format(3), "(c)");
    /// ```
    pub fn from_template(template: &str) -> Option<Self> {
        let (position, kind) = NumberingKind::ALL
            .iter()
            .filter_map(|kind| template.find(kind.marker()).map(|pos| (pos, *kind)))
            .min_by_key(|(pos, _)| *pos)?;

        Some(OrderedBullet {
            kind,
            left: template[..position].to_string(),
            right: template[position + 1..].to_string(),
        })
    }

    /// Why `n` cannot be displayed with this bullet, if it cannot.
    pub fn check_representable(&self, n: usize) -> Result<(), String> {
        match self.kind {
            NumberingKind::Number => Ok(()),
            NumberingKind::Alpha | NumberingKind::AlphaCapital => {
                if n == 0 {
                    Err("`0` cannot be represented using letters".to_string())
                } else if n > 26 {
                    Err(format!(
                        "`{}` exceeds the highest representible letter (26 = 'Z')",
                        n
                    ))
                } else {
                    Ok(())
                }
            }
            NumberingKind::Roman | NumberingKind::RomanCapital | NumberingKind::DotTally => {
                if n == 0 {
                    Err("`0` cannot be represented using roman numerals".to_string())
                } else if n > 3999 {
                    Err(format!(
                        "`{}` exceeds the highest representible roman numeral (3999 = 'MMMCMXCIX')",
                        n
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Counter `n` in this bullet's numbering, without delimiters.
    /// Unrepresentable values format as an empty string.
    pub fn number(&self, n: usize) -> String {
        if self.check_representable(n).is_err() {
            return String::new();
        }
        match self.kind {
            NumberingKind::Number => n.to_string(),
            NumberingKind::Alpha => char::from(b'a' + (n - 1) as u8).to_string(),
            NumberingKind::AlphaCapital => char::from(b'A' + (n - 1) as u8).to_string(),
            NumberingKind::Roman => roman(n, &ROMAN_LOWER),
            NumberingKind::RomanCapital => roman(n, &ROMAN_UPPER),
            NumberingKind::DotTally => roman(n, &DOT_TALLY),
        }
    }

    pub fn format(&self, n: usize) -> String {
        format!("{}{}{}", self.left, self.number(n), self.right)
    }
}

/// The bullet a list frame was opened with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bullet {
    /// Literal bullet text, e.g. `*)`
    Unordered(String),
    Ordered(OrderedBullet),
}

impl Bullet {
    pub fn is_ordered(&self) -> bool {
        matches!(self, Bullet::Ordered(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bullet(kind: NumberingKind) -> OrderedBullet {
        OrderedBullet {
            kind,
            left: String::new(),
            right: ".".to_string(),
        }
    }

    #[test]
    fn test_template_picks_earliest_marker() {
        let b = OrderedBullet::from_template("1.").unwrap();
        assert_eq!((b.kind, b.left.as_str(), b.right.as_str()), (NumberingKind::Number, "", "."));

        // 'i' comes before 'a' in this template
        let b = OrderedBullet::from_template("[i] a").unwrap();
        assert_eq!(b.kind, NumberingKind::Roman);
        assert_eq!(b.left, "[");
        assert_eq!(b.right, "] a");

        let b = OrderedBullet::from_template("v)").unwrap();
        assert_eq!(b.kind, NumberingKind::DotTally);

        assert!(OrderedBullet::from_template("*)").is_none());
    }

    #[test]
    fn test_alpha_bounds() {
        let alpha = bullet(NumberingKind::Alpha);
        assert_eq!(
            alpha.check_representable(0),
            Err("`0` cannot be represented using letters".to_string())
        );
        assert_eq!(
            alpha.check_representable(27),
            Err("`27` exceeds the highest representible letter (26 = 'Z')".to_string())
        );
        assert!(alpha.check_representable(26).is_ok());
        assert_eq!(alpha.format(1), "a.");
        assert_eq!(bullet(NumberingKind::AlphaCapital).format(26), "Z.");
    }

    #[test]
    fn test_roman_bounds() {
        let roman = bullet(NumberingKind::RomanCapital);
        assert!(roman.check_representable(0).is_err());
        assert!(roman.check_representable(4000).is_err());
        assert_eq!(roman.number(3999), "MMMCMXCIX");
        assert_eq!(bullet(NumberingKind::Roman).number(14), "xiv");
    }

    #[test]
    fn test_dot_tally() {
        let tally = bullet(NumberingKind::DotTally);
        assert_eq!(tally.number(1), "•");
        assert_eq!(tally.number(3), "•••");
        assert_eq!(tally.number(4), "•v");
        assert_eq!(tally.number(9), "•x");
        assert_eq!(tally.number(12), "x••");
    }

    #[test]
    fn test_numbers_are_unbounded() {
        let number = bullet(NumberingKind::Number);
        assert!(number.check_representable(0).is_ok());
        assert_eq!(number.format(0), "0.");
        assert_eq!(number.format(12345), "12345.");
    }

    #[test]
    fn test_unrepresentable_formats_empty() {
        assert_eq!(bullet(NumberingKind::Alpha).number(0), "");
    }

    proptest! {
        #[test]
        fn roman_numerals_only_use_roman_letters(n in 1usize..4000) {
            let text = bullet(NumberingKind::RomanCapital).number(n);
            prop_assert!(!text.is_empty());
            prop_assert!(text.chars().all(|c| "MDCLXVI".contains(c)));
        }
    }
}
