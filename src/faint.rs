use crate::battle::Combatant;
use rand::Rng;

pub const ENDURE_FRIENDSHIP_DIVISOR: f64 = 500.0;

pub fn endure_chance(friendship: u8) -> f64 {
    f64::from(friendship) / ENDURE_FRIENDSHIP_DIVISOR
}

/// Checked before damage is applied: a lethal hit on a defender above 1 HP may
/// leave it at exactly 1 HP. Returns the damage to apply and whether the
/// defender endured. No roll is made at zero friendship.
pub fn prevent_ko_if_applicable<R: Rng + ?Sized>(
    defender: &Combatant,
    damage: u32,
    rng: &mut R,
) -> (u32, bool) {
    if defender.current_hp <= 1 || damage < defender.current_hp {
        return (damage, false);
    }
    let friendship = defender.creature.friendship;
    if friendship == 0 {
        return (damage, false);
    }
    if rng.gen::<f64>() < endure_chance(friendship) {
        return (defender.current_hp - 1, true);
    }
    (damage, false)
}
