//! Well-known tags.
//!
//! Tags are free-form strings; these are the ones the kernel itself reads or
//! writes.

/// Controlled by the player.
pub const PLAYER: &str = "player";
/// Sector has been discovered by the player.
pub const DISCOVERED: &str = "discovered";
/// Armed ship expected to fight.
pub const ROLE_MILITARY: &str = "role:military";
/// Unarmed or civilian ship.
pub const ROLE_CIVILIAN: &str = "role:civilian";
/// Ship that mines.
pub const ROLE_MINING: &str = "role:mining";
/// Stationary facility.
pub const FACILITY: &str = "facility";
/// Ship.
pub const SHIP: &str = "ship";
/// Tag for the role of a ship.
#[must_use]
pub fn role(name: &str) -> String {
    format!("role:{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_tag_format() {
        assert_eq!(role("military"), ROLE_MILITARY);
    }
}
