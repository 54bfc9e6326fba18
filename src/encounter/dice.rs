//! Dice rolling for the table
//!
//! The engine itself only ever needs d20s (initiative and tie-breakers);
//! the notation parser ("2d6+3") is offered to clients for attack and
//! damage rolls. Stored attack strings are never parsed or validated.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

/// Dice notation: optional count, 'd', sides, optional signed modifier
static NOTATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d*)d(\d+)([+-]\d+)?$").unwrap());

/// A parsed dice roll specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceRoll {
    /// Number of dice to roll
    pub count: u32,
    /// Number of sides per die
    pub sides: u32,
    /// Modifier to add/subtract
    pub modifier: i32,
}

impl DiceRoll {
    /// Create a new dice roll
    pub fn new(count: u32, sides: u32, modifier: i32) -> Self {
        Self {
            count,
            sides,
            modifier,
        }
    }

    /// Roll the dice and return the total
    pub fn roll(&self) -> i32 {
        let mut rng = rand::rng();
        let sum: i32 = (0..self.count)
            .map(|_| rng.random_range(1..=self.sides) as i32)
            .sum();
        sum + self.modifier
    }

    /// Minimum possible result
    pub fn min(&self) -> i32 {
        self.count as i32 + self.modifier
    }

    /// Maximum possible result
    pub fn max(&self) -> i32 {
        (self.count * self.sides) as i32 + self.modifier
    }
}

impl FromStr for DiceRoll {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dice(s)
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        if self.modifier > 0 {
            write!(f, "+{}", self.modifier)?;
        } else if self.modifier < 0 {
            write!(f, "{}", self.modifier)?;
        }
        Ok(())
    }
}

/// Parse a dice notation string like "2d6+3"
///
/// A missing count means one die ("d20" == "1d20"). Case and surrounding
/// whitespace are ignored.
pub fn parse_dice(notation: &str) -> Result<DiceRoll, String> {
    let normalized = notation.trim().to_lowercase();

    let caps = NOTATION_REGEX
        .captures(&normalized)
        .ok_or_else(|| format!("Invalid dice notation: {}", notation))?;

    let count: u32 = match &caps[1] {
        "" => 1,
        digits => digits
            .parse()
            .map_err(|_| format!("Invalid dice count: {}", digits))?,
    };
    let sides: u32 = caps[2]
        .parse()
        .map_err(|_| format!("Invalid die sides: {}", &caps[2]))?;
    let modifier: i32 = match caps.get(3) {
        Some(m) => m
            .as_str()
            .parse()
            .map_err(|_| format!("Invalid modifier: {}", m.as_str()))?,
        None => 0,
    };

    if count == 0 {
        return Err("Dice count must be at least 1".to_string());
    }
    if sides == 0 {
        return Err("Die sides must be at least 1".to_string());
    }

    Ok(DiceRoll {
        count,
        sides,
        modifier,
    })
}

/// Roll a single d20
pub fn roll_d20() -> i32 {
    rand::rng().random_range(1..=20)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        assert_eq!(parse_dice("2d6").unwrap(), DiceRoll::new(2, 6, 0));
        assert_eq!(parse_dice("1d20+5").unwrap(), DiceRoll::new(1, 20, 5));
        assert_eq!(parse_dice("3d8-2").unwrap(), DiceRoll::new(3, 8, -2));
    }

    #[test]
    fn test_parse_implicit_count() {
        assert_eq!(parse_dice("d6").unwrap(), DiceRoll::new(1, 6, 0));
    }

    #[test]
    fn test_parse_normalization() {
        assert_eq!(parse_dice("  2D10+3  ").unwrap(), DiceRoll::new(2, 10, 3));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_dice("abc").is_err());
        assert!(parse_dice("2d").is_err());
        assert!(parse_dice("d").is_err());
        assert!(parse_dice("0d6").is_err());
        assert!(parse_dice("2d0").is_err());
        assert!(parse_dice("2d6+").is_err());
        assert!(parse_dice("2d6+3x").is_err());
    }

    #[test]
    fn test_roll_bounds() {
        let roll = DiceRoll::new(2, 6, 3);
        for _ in 0..100 {
            let result = roll.roll();
            assert!(result >= roll.min(), "{} below {}", result, roll.min());
            assert!(result <= roll.max(), "{} above {}", result, roll.max());
        }
    }

    #[test]
    fn test_d20_bounds() {
        for _ in 0..100 {
            let roll = roll_d20();
            assert!((1..=20).contains(&roll));
        }
    }

    #[test]
    fn test_display_round_trips() {
        for notation in ["2d6", "1d20+5", "3d8-2"] {
            let roll: DiceRoll = notation.parse().unwrap();
            assert_eq!(roll.to_string(), notation);
        }
    }
}
